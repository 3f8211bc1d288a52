use crate::{
    client_utils::{bearer_headers, get_json},
    errors::ApiResult,
};
use reqwest::Client;
use serde::Deserialize;

/// A connected data source the assistant can run queries against.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct DataSource {
    #[serde(rename = "db_connection_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The data-source registry. The first listed entry is the default
/// selection when the user has not chosen one.
#[async_trait::async_trait]
pub trait DataSourceRegistry: Send + Sync {
    async fn list(&self, credential: &str) -> ApiResult<Vec<DataSource>>;
}

pub struct HttpDataSourceRegistry {
    pub base_url: String,
    pub client: Client,
}

impl HttpDataSourceRegistry {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl DataSourceRegistry for HttpDataSourceRegistry {
    async fn list(&self, credential: &str) -> ApiResult<Vec<DataSource>> {
        let url = format!("{}/databases/connected", self.base_url);
        get_json(&self.client, &url, bearer_headers(credential)?).await
    }
}
