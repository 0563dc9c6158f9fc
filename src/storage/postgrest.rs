use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use super::{check_row, Filters, Row, Storage, StorageError, Table};

/// Storage backed by the BaaS REST interface (`/rest/v1/<table>`)
pub struct PostgrestStore {
    client: Client,
    base: Url,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self, StorageError> {
        if api_key.is_empty() {
            return Err(StorageError::ConfigMissing("SUPABASE_KEY"));
        }

        let mut base = Url::parse(project_url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(project_url.to_string()));
        }
        // Keep any path prefix and make sure `join` appends rather than replaces
        let path = format!("{}/rest/v1/", base.path().trim_end_matches('/'));
        base.set_path(&path);

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key: api_key.to_string(),
        })
    }

    fn table_url(&self, table: Table, filters: &Filters) -> Result<Url, StorageError> {
        let mut url = self
            .base
            .join(table.name())
            .map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        if !filters.is_empty() {
            let mut query = url.query_pairs_mut();
            for (column, value) in filters.iter() {
                query.append_pair(column, &eq_operand(value));
            }
        }
        Ok(url)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
    }

    async fn rows(response: Response) -> Result<Vec<Row>, StorageError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<Value>().await? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    other => Err(StorageError::Decode(other.to_string())),
                })
                .collect(),
            other => Err(StorageError::Decode(other.to_string())),
        }
    }
}

/// PostgREST filter operand for an equality match
fn eq_operand(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

#[async_trait]
impl Storage for PostgrestStore {
    async fn select_where(&self, table: Table, filters: &Filters) -> Result<Vec<Row>, StorageError> {
        filters.check_columns(table)?;
        let mut url = self.table_url(table, filters)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "id.asc");

        let response = self.request(self.client.get(url)).send().await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StorageError> {
        check_row(table, &row)?;
        let url = self.table_url(table, &Filters::new())?;

        let response = self.request(self.client.post(url)).json(&row).send().await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NoRows(table))
    }

    async fn update_where(&self, table: Table, filters: &Filters, values: Row) -> Result<Row, StorageError> {
        filters.check_columns(table)?;
        check_row(table, &values)?;
        let url = self.table_url(table, filters)?;

        let response = self.request(self.client.patch(url)).json(&values).send().await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StorageError::NoRows(table))
    }

    async fn delete_where(&self, table: Table, filters: &Filters) -> Result<(), StorageError> {
        filters.check_columns(table)?;
        let url = self.table_url(table, filters)?;

        let response = self.request(self.client.delete(url)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(StorageError::Backend {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        let mut url = self.table_url(Table::Folders, &Filters::new())?;
        url.query_pairs_mut().append_pair("select", "id").append_pair("limit", "1");

        let response = self.request(self.client.get(url)).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::Backend {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
