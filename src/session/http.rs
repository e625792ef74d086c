//! Session client that starts sessions over HTTP

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::watch;

use super::{
    ClientFactory, ClientHelper, ClientOptions, LogTransport, SessionClient, Transport,
    TransportState,
};
use crate::compose::{RequestData, ServiceConfigBlock, ServiceKind};
use crate::{Error, Result};

/// Message label expected by RTVI-speaking bots
const RTVI_LABEL: &str = "rtvi-ai";

/// Client that POSTs its request data to `{base_url}/connect`
///
/// Configuration updates are merged locally and, once the session is ready,
/// forwarded over the transport as `update-config` messages.
#[derive(Debug)]
pub struct HttpSessionClient {
    http: reqwest::Client,
    transport: Box<dyn Transport>,
    base_url: String,
    timeout: Duration,
    request_data: RwLock<RequestData>,
    helpers: RwLock<HashMap<String, Arc<dyn ClientHelper>>>,
    state: watch::Sender<TransportState>,
    next_id: AtomicU64,
}

impl HttpSessionClient {
    /// Create a client from construction options
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let (state, _) = watch::channel(TransportState::Idle);

        Ok(Self {
            http,
            transport: options.transport,
            base_url: options.base_url,
            timeout: options.timeout,
            request_data: RwLock::new(options.request_data),
            helpers: RwLock::new(HashMap::new()),
            state,
            next_id: AtomicU64::new(1),
        })
    }

    fn connect_url(&self) -> String {
        format!("{}/connect", self.base_url.trim_end_matches('/'))
    }

    fn snapshot(&self) -> Result<RequestData> {
        self.request_data
            .read()
            .map(|d| d.clone())
            .map_err(|_| Error::Session("request data lock poisoned".to_string()))
    }

    async fn post_connect(&self, body: &RequestData) -> Result<()> {
        self.http
            .post(self.connect_url())
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl SessionClient for HttpSessionClient {
    fn register_helper(&self, name: &str, helper: Arc<dyn ClientHelper>) -> Result<()> {
        let mut helpers = self
            .helpers
            .write()
            .map_err(|_| Error::Session("helper registry lock poisoned".to_string()))?;
        if helpers.contains_key(name) {
            return Err(Error::Session(format!("helper already registered: {name}")));
        }
        tracing::debug!(name, service = %helper.service(), "registered client helper");
        helpers.insert(name.to_string(), helper);
        Ok(())
    }

    fn helper(&self, name: &str) -> Option<Arc<dyn ClientHelper>> {
        self.helpers.read().ok()?.get(name).cloned()
    }

    fn readiness(&self) -> watch::Receiver<TransportState> {
        self.state.subscribe()
    }

    fn request_data(&self) -> RequestData {
        self.snapshot().unwrap_or_default()
    }

    async fn connect(&self) -> Result<()> {
        let current = *self.state.borrow();
        match current {
            TransportState::Ready => return Ok(()),
            TransportState::Connecting => {
                return Err(Error::Session("connect already in progress".to_string()));
            }
            TransportState::Idle | TransportState::Error => {}
        }

        let body = self.snapshot()?;
        self.state.send_replace(TransportState::Connecting);
        tracing::info!(
            url = %self.connect_url(),
            transport = self.transport.name(),
            timeout_ms = self.timeout.as_millis(),
            "connecting session"
        );

        match tokio::time::timeout(self.timeout, self.post_connect(&body)).await {
            Ok(Ok(())) => {
                self.state.send_replace(TransportState::Ready);
                tracing::info!("session ready");
                Ok(())
            }
            Ok(Err(e)) => {
                self.state.send_replace(TransportState::Error);
                tracing::warn!(error = %e, "session connect failed");
                Err(e)
            }
            Err(_) => {
                self.state.send_replace(TransportState::Error);
                tracing::warn!(timeout_ms = self.timeout.as_millis(), "session connect timed out");
                Err(Error::Timeout(self.timeout.as_millis()))
            }
        }
    }

    async fn update_config(&self, blocks: &[ServiceConfigBlock]) -> Result<()> {
        self.request_data
            .write()
            .map_err(|_| Error::Session("request data lock poisoned".to_string()))?
            .apply(blocks);

        let current = *self.state.borrow();
        if current != TransportState::Ready {
            tracing::debug!(blocks = blocks.len(), "session not ready, update kept locally");
            return Ok(());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = json!({
            "label": RTVI_LABEL,
            "type": "update-config",
            "id": id.to_string(),
            "data": { "config": blocks },
        });
        self.transport.send(&message).await
    }

    async fn update_services(&self, services: &BTreeMap<ServiceKind, String>) -> Result<()> {
        self.request_data
            .write()
            .map_err(|_| Error::Session("request data lock poisoned".to_string()))?
            .apply_services(services);
        tracing::debug!(?services, "service map updated");
        Ok(())
    }
}

/// Factory producing [`HttpSessionClient`]s over a [`LogTransport`]
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpClientFactory;

impl ClientFactory for HttpClientFactory {
    fn transport(&self) -> Box<dyn Transport> {
        Box::new(LogTransport)
    }

    fn build(&self, options: ClientOptions) -> Result<Arc<dyn SessionClient>> {
        Ok(Arc::new(HttpSessionClient::new(options)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LlmHelper;

    fn client(base_url: &str) -> HttpSessionClient {
        HttpSessionClient::new(ClientOptions {
            transport: Box::new(LogTransport),
            base_url: base_url.to_string(),
            request_data: RequestData::default(),
            timeout: Duration::from_millis(500),
        })
        .unwrap()
    }

    #[test]
    fn connect_url_joins_base() {
        assert_eq!(client("/api").connect_url(), "/api/connect");
        assert_eq!(
            client("http://localhost:7860/api/").connect_url(),
            "http://localhost:7860/api/connect"
        );
    }

    #[test]
    fn duplicate_helper_rejected() {
        let c = client("/api");
        c.register_helper("llm", Arc::new(LlmHelper)).unwrap();
        assert!(c.register_helper("llm", Arc::new(LlmHelper)).is_err());
        assert!(c.helper("llm").is_some());
        assert!(c.helper("tts").is_none());
    }

    #[tokio::test]
    async fn updates_before_ready_are_merged_locally() {
        let c = client("/api");
        c.update_config(&crate::compose::compile_model_only("gpt-4o"))
            .await
            .unwrap();
        assert_eq!(c.state(), TransportState::Idle);
        assert_eq!(
            c.request_data().option(ServiceKind::Llm, "model"),
            Some(&json!("gpt-4o"))
        );
    }

    #[tokio::test]
    async fn relative_base_url_fails_to_connect() {
        let c = client("/api");
        assert!(c.connect().await.is_err());
        assert_eq!(c.state(), TransportState::Error);
    }
}
