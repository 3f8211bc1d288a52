use crate::{
    client_utils::send_json,
    errors::ApiResult,
    types::ChartAdvice,
};
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::{Map, Value};

/// The graph-type classifier: given the user query and the executed
/// result rows, recommends chart types and may reshape the rows for
/// charting.
#[async_trait::async_trait]
pub trait GraphClassifier: Send + Sync {
    async fn classify(&self, query: &str, rows: &[Map<String, Value>]) -> ApiResult<ChartAdvice>;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    query: &'a str,
    #[serde(rename = "queryResults")]
    query_results: &'a [Map<String, Value>],
}

pub struct HttpGraphClassifier {
    pub base_url: String,
    pub client: Client,
}

impl HttpGraphClassifier {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl GraphClassifier for HttpGraphClassifier {
    async fn classify(&self, query: &str, rows: &[Map<String, Value>]) -> ApiResult<ChartAdvice> {
        let url = format!("{}/graph-type", self.base_url);
        send_json(
            &self.client,
            &url,
            &ClassifyRequest {
                query,
                query_results: rows,
            },
            header::HeaderMap::new(),
        )
        .await
    }
}
