use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::{issue_token, Identity};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// Development tokens signed with the project secret; defaults come from the
/// same environment the server reads
#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "Identity to put in the token subject")]
    pub user: String,

    #[arg(long, help = "HS256 signing secret (default: SUPABASE_JWT_SECRET)")]
    pub secret: Option<String>,

    #[arg(long, help = "Audience claim, empty for none (default: JWT_AUDIENCE)")]
    pub audience: Option<String>,

    #[arg(long, help = "Lifetime in hours (default: TOKEN_TTL_HOURS)")]
    pub hours: Option<i64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let secret = args
        .secret
        .or(config.security.jwt_secret)
        .context("no signing secret: pass --secret or set SUPABASE_JWT_SECRET")?;
    let audience = args
        .audience
        .or(config.security.jwt_audience)
        .filter(|a| !a.is_empty());
    let hours = args.hours.unwrap_or(config.security.token_ttl_hours);

    let token = issue_token(
        &Identity::new(args.user.as_str()),
        &secret,
        audience.as_deref(),
        lifetime(hours)?,
    )?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            &format!("Token issued for {}", args.user),
            Some(json!({ "token": token, "expires_in_hours": hours })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}

fn lifetime(hours: i64) -> anyhow::Result<chrono::Duration> {
    chrono::Duration::try_hours(hours).with_context(|| format!("token lifetime of {} hours is out of range", hours))
}
