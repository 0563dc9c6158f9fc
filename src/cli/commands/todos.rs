use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_record, output_records, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TodoCommands {
    #[command(about = "List the todos in a list")]
    List {
        #[arg(help = "List ID")]
        list: i64,
    },

    #[command(about = "Show one todo")]
    Show {
        #[arg(help = "Todo ID")]
        id: i64,
    },

    #[command(about = "Add a todo to a list")]
    Add {
        #[arg(help = "List ID")]
        list: i64,
        #[command(flatten)]
        fields: TodoFields,
    },

    #[command(about = "Replace a todo; omitted options fall back to their defaults")]
    Update {
        #[arg(help = "Todo ID")]
        id: i64,
        #[command(flatten)]
        fields: TodoFields,
    },

    #[command(about = "Delete a todo")]
    Delete {
        #[arg(help = "Todo ID")]
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct TodoFields {
    #[arg(help = "Todo title")]
    pub title: String,
    #[arg(long, help = "Longer description")]
    pub description: Option<String>,
    #[arg(long, help = "Due date (YYYY-MM-DD)")]
    pub due: Option<String>,
    #[arg(long, help = "Priority (higher is more urgent)")]
    pub priority: Option<i32>,
    #[arg(long, help = "Mark as completed")]
    pub done: bool,
}

impl TodoFields {
    fn body(&self) -> Value {
        json!({
            "title": self.title,
            "description": self.description,
            "is_completed": self.done,
            "due_date": self.due,
            "priority": self.priority,
        })
    }
}

pub async fn handle(cmd: TodoCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TodoCommands::List { list } => {
            let todos = client.get(&format!("/lists/{}/todos", list)).await?;
            output_records(output_format, &todos, "No todos in this list")
        }
        TodoCommands::Show { id } => {
            let todo = client.get(&format!("/todos/{}", id)).await?;
            output_record(output_format, &todo)
        }
        TodoCommands::Add { list, fields } => {
            let todo = client.post(&format!("/lists/{}/todos", list), &fields.body()).await?;
            output_success(output_format, &format!("Added todo #{}", todo["id"]), Some(todo))
        }
        TodoCommands::Update { id, fields } => {
            let todo = client.put(&format!("/todos/{}", id), &fields.body()).await?;
            output_success(output_format, &format!("Updated todo #{}", id), Some(todo))
        }
        TodoCommands::Delete { id } => {
            client.delete(&format!("/todos/{}", id)).await?;
            output_success(output_format, &format!("Deleted todo #{}", id), None)
        }
    }
}
