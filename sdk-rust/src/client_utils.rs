use crate::ApiError;
use eventsource_stream::Eventsource;
use futures::{stream::StreamExt, Stream};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::pin::Pin;

/// Build the header map for a bearer-authenticated call.
///
/// # Errors
/// Returns an error if the credential is not a valid header value.
pub fn bearer_headers(credential: &str) -> Result<reqwest::header::HeaderMap, ApiError> {
    let mut headers = reqwest::header::HeaderMap::new();
    let value = format!("Bearer {credential}")
        .parse()
        .map_err(|_| ApiError::InvalidInput("credential is not a valid header value".to_string()))?;
    headers.insert(reqwest::header::AUTHORIZATION, value);
    Ok(headers)
}

/// Create a JSON request, parse the response.
/// Throws error on non OK status code.
pub async fn send_json<T: Serialize, R: DeserializeOwned>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
) -> Result<R, ApiError> {
    let response = client.post(url).headers(headers).json(data).send().await?;
    if response.status().is_client_error() || response.status().is_server_error() {
        Err(ApiError::StatusCode(
            response.status(),
            response.text().await.unwrap_or_default(),
        ))
    } else {
        Ok(response.json::<R>().await?)
    }
}

/// Create a GET request, parse the JSON response.
/// Throws error on non OK status code.
pub async fn get_json<R: DeserializeOwned>(
    client: &Client,
    url: &str,
    headers: reqwest::header::HeaderMap,
) -> Result<R, ApiError> {
    let response = client.get(url).headers(headers).send().await?;
    if response.status().is_client_error() || response.status().is_server_error() {
        Err(ApiError::StatusCode(
            response.status(),
            response.text().await.unwrap_or_default(),
        ))
    } else {
        Ok(response.json::<R>().await?)
    }
}

/// Create a JSON request that returns an SSE stream.
/// Throws error on non OK status code.
async fn send_sse<T: Serialize>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
) -> Result<
    impl StreamExt<
        Item = Result<
            eventsource_stream::Event,
            eventsource_stream::EventStreamError<reqwest::Error>,
        >,
    >,
    ApiError,
> {
    let response = client.post(url).headers(headers).json(data).send().await?;

    if response.status().is_client_error() || response.status().is_server_error() {
        Err(ApiError::StatusCode(
            response.status(),
            response.text().await.unwrap_or_default(),
        ))
    } else {
        Ok(response.bytes_stream().eventsource())
    }
}

/// Create a JSON request that returns a typed stream of parsed chunks.
/// Handles SSE parsing, JSON deserialization, and error conversion.
/// Automatically handles "[DONE]" termination.
pub async fn send_sse_stream<T: Serialize + 'static, R: DeserializeOwned + Send + 'static>(
    client: &Client,
    url: &str,
    data: &T,
    headers: reqwest::header::HeaderMap,
    endpoint: &'static str,
) -> Result<Pin<Box<dyn Stream<Item = Result<R, ApiError>> + Send>>, ApiError> {
    let mut sse_stream = send_sse(client, url, data, headers).await?;

    let stream = async_stream::try_stream! {
        while let Some(event) = sse_stream.next().await {
            match event {
                Ok(event) => {
                    if event.data.is_empty() {
                        continue; // Skip empty events
                    }
                    if event.data == "[DONE]" {
                        break; // End of stream
                    }

                    let chunk: R = serde_json::from_str(&event.data)
                        .map_err(|e| {
                            ApiError::Invariant(
                                endpoint,
                                format!("Failed to parse stream chunk: {e}")
                            )
                        })?;

                    yield chunk;
                }
                Err(e) => {
                    match e {
                        eventsource_stream::EventStreamError::Utf8(_) => {
                            Err(ApiError::Invariant(
                                endpoint,
                                "Receive invalid UTF-8 sequence for stream data".to_string()
                            ))?;
                        }
                        eventsource_stream::EventStreamError::Parser(error) => {
                            Err(ApiError::Invariant(
                                endpoint,
                                format!("Receive invalid EventStream data: {error}")
                            ))?;
                        },
                        eventsource_stream::EventStreamError::Transport(e) => {
                            Err(ApiError::Transport(e))?;
                        }
                    }
                }
            }
        }
    };

    Ok(Box::pin(stream))
}
