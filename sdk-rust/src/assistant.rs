use std::{
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    client_utils::send_sse_stream,
    errors::ApiResult,
    types::{AssistantStreamInput, StreamItem},
};
use futures::Stream;
use reqwest::{
    header::{self, HeaderValue},
    Client,
};

/// The assistant stream endpoint: accepts the turn history and a data
/// source, returns the streamed message parts of one assistant turn.
/// The stream terminates when the turn is complete.
#[async_trait::async_trait]
pub trait AssistantEndpoint: Send + Sync {
    fn name(&self) -> &'static str;
    async fn stream(&self, input: AssistantStreamInput) -> ApiResult<AssistantStream>;
}

pub struct AssistantStream(Pin<Box<dyn Stream<Item = ApiResult<StreamItem>> + Send>>);

impl AssistantStream {
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = ApiResult<StreamItem>> + Send + 'static,
    {
        Self(Box::pin(stream))
    }
}

impl Stream for AssistantStream {
    type Item = ApiResult<StreamItem>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.as_mut().poll_next(cx)
    }
}

pub struct HttpAssistantEndpoint {
    pub base_url: String,
    pub client: Client,
}

pub struct HttpAssistantEndpointOptions {
    pub base_url: String,
    pub credential: Option<String>,
}

impl HttpAssistantEndpoint {
    /// # Errors
    /// Returns an error if the credential is not a valid header value or
    /// the HTTP client cannot be constructed.
    pub fn new(options: HttpAssistantEndpointOptions) -> ApiResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(credential) = options.credential {
            let mut auth_header_value: HeaderValue =
                format!("Bearer {credential}").parse().map_err(|_| {
                    crate::ApiError::InvalidInput(
                        "credential is not a valid header value".to_string(),
                    )
                })?;
            auth_header_value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth_header_value);
        }

        Ok(Self {
            base_url: options.base_url,
            client: Client::builder()
                .default_headers(headers)
                .build()
                .map_err(crate::ApiError::Transport)?,
        })
    }
}

#[async_trait::async_trait]
impl AssistantEndpoint for HttpAssistantEndpoint {
    fn name(&self) -> &'static str {
        "assistant"
    }

    async fn stream(&self, input: AssistantStreamInput) -> ApiResult<AssistantStream> {
        let url = format!("{}/chat", self.base_url);
        tracing::debug!(
            url = %url,
            history_len = input.messages.len(),
            "opening assistant stream"
        );
        let stream = send_sse_stream::<_, StreamItem>(
            &self.client,
            &url,
            &input,
            header::HeaderMap::new(),
            self.name(),
        )
        .await?;
        Ok(AssistantStream::from_stream(stream))
    }
}
