//! ConsumerTransport trait - outbound HTTP seam

use bytes::Bytes;

use crate::{ContractError, HttpMethod};

/// One outbound call
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    /// JSON body; `None` sends an empty body
    pub body: Option<Bytes>,
}

/// What the consumer answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client used for consumer calls
#[trait_variant::make(ConsumerTransport: Send)]
pub trait LocalConsumerTransport {
    /// Issue the request
    ///
    /// # Errors
    /// Transport failures only; any HTTP status is returned as a response
    async fn send(&self, request: OutboundRequest) -> Result<RemoteResponse, ContractError>;
}
