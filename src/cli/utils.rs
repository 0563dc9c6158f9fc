use serde_json::{json, Value};

use crate::cli::client::ApiFailure;
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error in the appropriate format, keeping the server's code when there is one
pub fn output_error(output_format: OutputFormat, error: &anyhow::Error) {
    let failure = error.downcast_ref::<ApiFailure>();

    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": failure.map(|f| f.message.clone()).unwrap_or_else(|| error.to_string())
            });

            if let Some(failure) = failure {
                response["error_code"] = json!(failure.code);
                response["status"] = json!(failure.status);
            }

            match serde_json::to_string_pretty(&response) {
                Ok(text) => println!("{}", text),
                Err(_) => eprintln!("Error: {}", error),
            }
        }
        OutputFormat::Text => match failure {
            Some(failure) => eprintln!("Error [{}]: {}", failure.code, failure.message),
            None => eprintln!("Error: {}", error),
        },
    }
}

/// Output one record: pretty JSON, or a single descriptive line
pub fn output_record(output_format: OutputFormat, record: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => println!("{}", describe(record)),
    }
    Ok(())
}

/// Output a collection of records, with a friendly line when it is empty
pub fn output_records(output_format: OutputFormat, records: &Value, empty_message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            let items = records.as_array().map(Vec::as_slice).unwrap_or_default();
            if items.is_empty() {
                println!("{}", empty_message);
            }
            for item in items {
                println!("{}", describe(item));
            }
        }
    }
    Ok(())
}

/// One-line text rendering of a folder, list or todo
pub fn describe(record: &Value) -> String {
    let id = record.get("id").map(Value::to_string).unwrap_or_else(|| "?".to_string());
    let text = |key: &str| record.get(key).and_then(Value::as_str);

    if let Some(title) = text("title") {
        let mark = if record.get("is_completed").and_then(Value::as_bool).unwrap_or(false) {
            "x"
        } else {
            " "
        };
        let mut line = format!("[{}] #{} {}", mark, id, title);
        if let Some(due) = text("due_date") {
            line.push_str(&format!(" (due {})", due));
        }
        match record.get("priority").and_then(Value::as_i64) {
            Some(p) if p != 0 => line.push_str(&format!(" !{}", p)),
            _ => {}
        }
        return line;
    }

    let name = text("name").unwrap_or_default();
    match record.get("folder_id").and_then(Value::as_i64) {
        Some(folder) => format!("#{} {} (folder #{})", id, name, folder),
        None => format!("#{} {}", id, name),
    }
}
