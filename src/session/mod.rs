//! Session client seam
//!
//! The real-time client is an external collaborator: it owns the transport,
//! the network session and readiness reporting. This module describes what the
//! console needs from it and ships an HTTP-connecting implementation.

mod http;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

pub use http::{HttpClientFactory, HttpSessionClient};

use crate::Result;
use crate::compose::{RequestData, ServiceConfigBlock, ServiceKind, compile_prompt_only};

/// Connection state reported by a session client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Constructed, not connected
    Idle,
    /// Connect request in flight
    Connecting,
    /// Remote side reported ready
    Ready,
    /// Connect failed or timed out
    Error,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Ready => write!(f, "ready"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Message channel to the remote session
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Deliver a client message
    async fn send(&self, message: &Value) -> Result<()>;
}

/// Transport that only records outgoing messages in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &Value) -> Result<()> {
        tracing::info!(%message, "transport send");
        Ok(())
    }
}

/// Parameters a session client is constructed with
#[derive(Debug)]
pub struct ClientOptions {
    pub transport: Box<dyn Transport>,
    /// Endpoint prefix, e.g. `/api` or `https://host/api`
    pub base_url: String,
    pub request_data: RequestData,
    /// Bound on waiting for the remote side to report ready
    pub timeout: Duration,
}

/// Named auxiliary capability attached to a client
pub trait ClientHelper: Send + Sync + fmt::Debug {
    /// Service the helper talks to
    fn service(&self) -> ServiceKind;

    /// Upcast for typed lookup
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Real-time session client
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Attach a helper under `name`
    ///
    /// # Errors
    ///
    /// Returns error if a helper is already registered under `name`
    fn register_helper(&self, name: &str, helper: Arc<dyn ClientHelper>) -> Result<()>;

    /// Helper registered under `name`
    fn helper(&self, name: &str) -> Option<Arc<dyn ClientHelper>>;

    /// Observable connection state
    fn readiness(&self) -> watch::Receiver<TransportState>;

    /// Current connection state
    fn state(&self) -> TransportState {
        *self.readiness().borrow()
    }

    /// Service map and configuration as currently known to the client
    fn request_data(&self) -> RequestData;

    /// Start the session
    ///
    /// # Errors
    ///
    /// Returns error if the remote side fails or does not become ready in time
    async fn connect(&self) -> Result<()>;

    /// Push configuration blocks, last write wins per `(service, name)`
    ///
    /// # Errors
    ///
    /// Returns error if the update cannot be delivered
    async fn update_config(&self, blocks: &[ServiceConfigBlock]) -> Result<()>;

    /// Reassign service providers; applied on the next connect
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot record the change
    async fn update_services(&self, services: &BTreeMap<ServiceKind, String>) -> Result<()>;
}

/// Builds the transport and client for a session
pub trait ClientFactory {
    fn transport(&self) -> Box<dyn Transport>;

    /// Construct a client
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be constructed
    fn build(&self, options: ClientOptions) -> Result<Arc<dyn SessionClient>>;
}

/// LLM-specific calls routed through an existing session
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmHelper;

impl LlmHelper {
    /// Replace the LLM system prompt on `client`
    ///
    /// # Errors
    ///
    /// Returns error if the client rejects the update
    pub async fn set_prompt(&self, client: &dyn SessionClient, prompt: &str) -> Result<()> {
        tracing::debug!(len = prompt.len(), "updating LLM prompt");
        client.update_config(&compile_prompt_only(prompt)).await
    }
}

impl ClientHelper for LlmHelper {
    fn service(&self) -> ServiceKind {
        ServiceKind::Llm
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_helper_downcasts() {
        let helper: Arc<dyn ClientHelper> = Arc::new(LlmHelper);
        assert_eq!(helper.service(), ServiceKind::Llm);
        assert!(helper.into_any().downcast::<LlmHelper>().is_ok());
    }

    #[tokio::test]
    async fn log_transport_accepts_messages() {
        let transport = LogTransport;
        assert_eq!(transport.name(), "log");
        transport
            .send(&serde_json::json!({"type": "ping"}))
            .await
            .unwrap();
    }

    #[test]
    fn transport_state_display() {
        assert_eq!(TransportState::Ready.to_string(), "ready");
        assert_eq!(TransportState::Connecting.to_string(), "connecting");
    }
}
