use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_record, output_records, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum FolderCommands {
    #[command(about = "List your folders")]
    List,

    #[command(about = "Show one folder")]
    Show {
        #[arg(help = "Folder ID")]
        id: i64,
    },

    #[command(about = "Create a folder")]
    Create {
        #[arg(help = "Folder name")]
        name: String,
    },

    #[command(about = "Rename a folder")]
    Rename {
        #[arg(help = "Folder ID")]
        id: i64,
        #[arg(help = "New name")]
        name: String,
    },

    #[command(about = "Delete an empty folder")]
    Delete {
        #[arg(help = "Folder ID")]
        id: i64,
    },
}

pub async fn handle(cmd: FolderCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FolderCommands::List => {
            let folders = client.get("/folders").await?;
            output_records(output_format, &folders, "No folders yet")
        }
        FolderCommands::Show { id } => {
            let folder = client.get(&format!("/folders/{}", id)).await?;
            output_record(output_format, &folder)
        }
        FolderCommands::Create { name } => {
            let folder = client.post("/folders", &json!({ "name": name })).await?;
            output_success(output_format, &format!("Created folder #{}", folder["id"]), Some(folder))
        }
        FolderCommands::Rename { id, name } => {
            let folder = client.put(&format!("/folders/{}", id), &json!({ "name": name })).await?;
            output_success(output_format, &format!("Renamed folder #{}", id), Some(folder))
        }
        FolderCommands::Delete { id } => {
            client.delete(&format!("/folders/{}", id)).await?;
            output_success(output_format, &format!("Deleted folder #{}", id), None)
        }
    }
}
