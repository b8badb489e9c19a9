//! HttpTransport - reqwest-backed consumer client

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tracing::{debug, instrument};

use contracts::{
    ConsumerTransport, ContractError, HttpConfig, HttpMethod, OutboundRequest, RemoteResponse,
};

/// Consumer transport over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    /// Fails if the TLS backend cannot be initialised
    pub fn new(config: &HttpConfig) -> Result<Self, ContractError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ContractError::Other(format!("http client build error: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn to_reqwest(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

impl ConsumerTransport for HttpTransport {
    #[instrument(
        name = "http_transport_send",
        skip_all,
        fields(method = %request.method, url = %request.url)
    )]
    async fn send(&self, request: OutboundRequest) -> Result<RemoteResponse, ContractError> {
        let mut builder = self
            .client
            .request(to_reqwest(request.method), &request.url);
        if let Some(body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| {
            ContractError::remote_delivery(
                request.method.as_str(),
                request.url.as_str(),
                None,
                e.to_string(),
            )
        })?;

        let status = response.status().as_u16();
        debug!(status, "Consumer responded");
        Ok(RemoteResponse { status })
    }
}
