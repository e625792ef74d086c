//! One-shot session bootstrap
//!
//! Builds the session client the first time the console is activated, attaches
//! the LLM helper, publishes the client and flips readiness. Later activations
//! return the published client untouched.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::Result;
use crate::catalog::Catalog;
use crate::compose::{BOT_READY_TIMEOUT, LLM_HELPER_NAME, RequestData, default_request_data};
use crate::session::{ClientFactory, ClientOptions, LlmHelper, SessionClient};

/// Bootstrap lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    /// No session constructed; dependents render a placeholder
    Uninitialized,
    /// Session constructed and published
    Ready,
}

/// Owns the single session client for the lifetime of the console
pub struct SessionBootstrapper<F> {
    factory: F,
    base_url: String,
    request_data: RequestData,
    timeout: Duration,
    session: Option<Arc<dyn SessionClient>>,
    state: watch::Sender<BootState>,
}

impl<F: ClientFactory> SessionBootstrapper<F> {
    /// Bootstrapper that will start sessions with the catalog's defaults
    #[must_use]
    pub fn new(factory: F, catalog: &Catalog, base_url: impl Into<String>) -> Self {
        let (state, _) = watch::channel(BootState::Uninitialized);
        Self {
            factory,
            base_url: base_url.into(),
            request_data: default_request_data(catalog),
            timeout: BOT_READY_TIMEOUT,
            session: None,
            state,
        }
    }

    /// Construct and publish the session client, once
    ///
    /// The guard is the ownership slot itself: a client is built only while
    /// the slot is empty, and it is held from the moment it exists. A failed
    /// helper registration leaves the held client in place; the next
    /// activation finishes the bootstrap on that same client.
    ///
    /// # Errors
    ///
    /// Returns error if the client cannot be constructed or the helper cannot
    /// be registered; the bootstrapper then stays uninitialized
    pub fn activate(&mut self) -> Result<Arc<dyn SessionClient>> {
        let client = if let Some(session) = &self.session {
            if self.is_ready() {
                tracing::debug!("session already constructed, skipping bootstrap");
                return Ok(Arc::clone(session));
            }
            tracing::info!("resuming bootstrap of existing session client");
            Arc::clone(session)
        } else {
            tracing::info!(base_url = %self.base_url, "bootstrapping session client");
            let options = ClientOptions {
                transport: self.factory.transport(),
                base_url: self.base_url.clone(),
                request_data: self.request_data.clone(),
                timeout: self.timeout,
            };
            let client = self.factory.build(options)?;
            self.session = Some(Arc::clone(&client));
            client
        };

        if client.helper(LLM_HELPER_NAME).is_none() {
            client.register_helper(LLM_HELPER_NAME, Arc::new(LlmHelper))?;
        }

        self.state.send_replace(BootState::Ready);
        tracing::info!("session client ready");

        Ok(client)
    }

    /// The published session client, if bootstrapped
    #[must_use]
    pub fn session(&self) -> Option<&Arc<dyn SessionClient>> {
        self.session.as_ref()
    }

    /// The LLM helper attached during bootstrap
    #[must_use]
    pub fn llm_helper(&self) -> Option<Arc<LlmHelper>> {
        let helper = self.session.as_ref()?.helper(LLM_HELPER_NAME)?;
        helper.into_any().downcast::<LlmHelper>().ok()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.state.borrow() == BootState::Ready
    }

    /// Readiness observable for dependents
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BootState> {
        self.state.subscribe()
    }

    /// Startup parameters handed to the client
    #[must_use]
    pub const fn request_data(&self) -> &RequestData {
        &self.request_data
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::Error;
    use crate::compose::{ServiceConfigBlock, ServiceKind};
    use crate::session::{
        ClientHelper, HttpClientFactory, HttpSessionClient, Transport, TransportState,
    };

    /// Counts constructions, optionally failing them
    struct CountingFactory {
        built: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ClientFactory for CountingFactory {
        fn transport(&self) -> Box<dyn Transport> {
            HttpClientFactory.transport()
        }

        fn build(&self, options: ClientOptions) -> Result<Arc<dyn SessionClient>> {
            if self.fail {
                return Err(Error::Session("construction refused".to_string()));
            }
            self.built.fetch_add(1, Ordering::SeqCst);
            HttpClientFactory.build(options)
        }
    }

    #[test]
    fn double_activation_constructs_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let factory = CountingFactory {
            built: Arc::clone(&built),
            fail: false,
        };
        let mut boot = SessionBootstrapper::new(factory, Catalog::builtin(), "/api");
        assert!(!boot.is_ready());

        let first = boot.activate().unwrap();
        let second = boot.activate().unwrap();

        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(boot.is_ready());
    }

    #[test]
    fn failed_construction_stays_uninitialized() {
        let built = Arc::new(AtomicUsize::new(0));
        let factory = CountingFactory {
            built: Arc::clone(&built),
            fail: true,
        };
        let mut boot = SessionBootstrapper::new(factory, Catalog::builtin(), "/api");
        let rx = boot.subscribe();

        assert!(boot.activate().is_err());
        assert!(boot.session().is_none());
        assert_eq!(*rx.borrow(), BootState::Uninitialized);
    }

    /// Client whose first helper registration is refused
    struct FlakyRegistrationClient {
        inner: HttpSessionClient,
        refused: AtomicBool,
    }

    #[async_trait]
    impl SessionClient for FlakyRegistrationClient {
        fn register_helper(&self, name: &str, helper: Arc<dyn ClientHelper>) -> Result<()> {
            if !self.refused.swap(true, Ordering::SeqCst) {
                return Err(Error::Session("registry busy".to_string()));
            }
            self.inner.register_helper(name, helper)
        }

        fn helper(&self, name: &str) -> Option<Arc<dyn ClientHelper>> {
            self.inner.helper(name)
        }

        fn readiness(&self) -> watch::Receiver<TransportState> {
            self.inner.readiness()
        }

        fn request_data(&self) -> RequestData {
            self.inner.request_data()
        }

        async fn connect(&self) -> Result<()> {
            self.inner.connect().await
        }

        async fn update_config(&self, blocks: &[ServiceConfigBlock]) -> Result<()> {
            self.inner.update_config(blocks).await
        }

        async fn update_services(&self, services: &BTreeMap<ServiceKind, String>) -> Result<()> {
            self.inner.update_services(services).await
        }
    }

    struct FlakyFactory {
        built: Arc<AtomicUsize>,
    }

    impl ClientFactory for FlakyFactory {
        fn transport(&self) -> Box<dyn Transport> {
            HttpClientFactory.transport()
        }

        fn build(&self, options: ClientOptions) -> Result<Arc<dyn SessionClient>> {
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FlakyRegistrationClient {
                inner: HttpSessionClient::new(options)?,
                refused: AtomicBool::new(false),
            }))
        }
    }

    #[test]
    fn failed_registration_keeps_the_built_client() {
        let built = Arc::new(AtomicUsize::new(0));
        let factory = FlakyFactory {
            built: Arc::clone(&built),
        };
        let mut boot = SessionBootstrapper::new(factory, Catalog::builtin(), "/api");

        assert!(boot.activate().is_err());
        assert!(!boot.is_ready());
        let held = Arc::clone(boot.session().unwrap());

        let client = boot.activate().unwrap();
        assert!(Arc::ptr_eq(&held, &client));
        assert!(boot.is_ready());
        assert!(boot.llm_helper().is_some());

        boot.activate().unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn helper_and_defaults_attached() {
        let mut boot = SessionBootstrapper::new(HttpClientFactory, Catalog::builtin(), "/api");
        let rx = boot.subscribe();
        let client = boot.activate().unwrap();

        assert_eq!(*rx.borrow(), BootState::Ready);
        assert!(boot.llm_helper().is_some());
        assert_eq!(client.request_data(), *boot.request_data());
        assert_eq!(boot.timeout(), BOT_READY_TIMEOUT);
    }
}
