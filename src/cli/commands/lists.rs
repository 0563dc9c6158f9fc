use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_record, output_records, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ListCommands {
    #[command(about = "List your todo lists, optionally only those in one folder")]
    List {
        #[arg(long, help = "Folder ID")]
        folder: Option<i64>,
    },

    #[command(about = "Show one todo list")]
    Show {
        #[arg(help = "List ID")]
        id: i64,
    },

    #[command(about = "Create a todo list")]
    Create {
        #[arg(help = "List name")]
        name: String,
        #[arg(long, help = "File the list under this folder")]
        folder: Option<i64>,
    },

    #[command(about = "Replace a todo list (omitting --folder unfiles it)")]
    Update {
        #[arg(help = "List ID")]
        id: i64,
        #[arg(help = "List name")]
        name: String,
        #[arg(long, help = "Folder ID")]
        folder: Option<i64>,
    },

    #[command(about = "Delete a todo list")]
    Delete {
        #[arg(help = "List ID")]
        id: i64,
    },
}

pub async fn handle(cmd: ListCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ListCommands::List { folder } => {
            let path = match folder {
                Some(folder_id) => format!("/folders/{}/lists", folder_id),
                None => "/lists".to_string(),
            };
            let lists = client.get(&path).await?;
            output_records(output_format, &lists, "No todo lists yet")
        }
        ListCommands::Show { id } => {
            let list = client.get(&format!("/lists/{}", id)).await?;
            output_record(output_format, &list)
        }
        ListCommands::Create { name, folder } => {
            let list = match folder {
                Some(folder_id) => {
                    client
                        .post(&format!("/folders/{}/lists", folder_id), &json!({ "name": name }))
                        .await?
                }
                None => client.post("/lists", &json!({ "name": name })).await?,
            };
            output_success(output_format, &format!("Created todo list #{}", list["id"]), Some(list))
        }
        ListCommands::Update { id, name, folder } => {
            let body = json!({ "name": name, "folder_id": folder });
            let list = client.put(&format!("/lists/{}", id), &body).await?;
            output_success(output_format, &format!("Updated todo list #{}", id), Some(list))
        }
        ListCommands::Delete { id } => {
            client.delete(&format!("/lists/{}", id)).await?;
            output_success(output_format, &format!("Deleted todo list #{}", id), None)
        }
    }
}
