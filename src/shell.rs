//! Headless presentation shell
//!
//! `AppContext` is the single owner of the selection store, the locally held
//! client parameters and the bootstrapper. Each handler runs one complete
//! event turn: setter, compile from the settled store, apply.

use std::collections::BTreeMap;

use crate::bootstrap::SessionBootstrapper;
use crate::catalog::Catalog;
use crate::compose::{
    RequestData, ServiceConfigBlock, ServiceKind, compile_full, compile_model_only,
    compile_prompt_only, compile_vad_only,
};
use crate::session::ClientFactory;
use crate::store::{SelectionState, SelectionStore};
use crate::{Error, Result};

/// What the shell can show
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Non-interactive stand-in until the session is bootstrapped
    Placeholder,
    /// Full interface over the current selections
    Interface(SelectionState),
}

/// Application-wide provider of selection and session state
pub struct AppContext<'a, F> {
    store: SelectionStore<'a>,
    client_params: RequestData,
    bootstrapper: SessionBootstrapper<F>,
}

impl<'a, F: ClientFactory> AppContext<'a, F> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, bootstrapper: SessionBootstrapper<F>) -> Self {
        let client_params = bootstrapper.request_data().clone();
        let store = SelectionStore::from_request_data(catalog, &client_params);
        Self {
            store,
            client_params,
            bootstrapper,
        }
    }

    /// First activation of the page; repeated calls are no-ops
    ///
    /// # Errors
    ///
    /// Returns error if the session client cannot be constructed
    pub fn mount(&mut self) -> Result<()> {
        self.bootstrapper.activate().map(|_| ())
    }

    #[must_use]
    pub fn render(&self) -> View {
        if self.bootstrapper.is_ready() {
            View::Interface(self.store.snapshot())
        } else {
            View::Placeholder
        }
    }

    #[must_use]
    pub const fn store(&self) -> &SelectionStore<'a> {
        &self.store
    }

    #[must_use]
    pub const fn client_params(&self) -> &RequestData {
        &self.client_params
    }

    #[must_use]
    pub const fn bootstrapper(&self) -> &SessionBootstrapper<F> {
        &self.bootstrapper
    }

    /// Connect the bootstrapped session
    ///
    /// # Errors
    ///
    /// Returns error if no session exists or the client fails to connect
    pub async fn connect(&self) -> Result<()> {
        let Some(session) = self.bootstrapper.session() else {
            return Err(Error::Session("session not bootstrapped".to_string()));
        };
        session.connect().await
    }

    /// # Errors
    ///
    /// Returns error if the index is out of range or the update is refused
    pub async fn select_character(&mut self, index: usize) -> Result<()> {
        self.store.set_character(index)?;
        self.recompose().await
    }

    /// # Errors
    ///
    /// Returns error if the index is out of range or the update is refused
    pub async fn select_language(&mut self, index: usize) -> Result<()> {
        self.store.set_language(index)?;
        self.recompose().await
    }

    /// Switch LLM provider; the model follows if the provider lacks it
    ///
    /// # Errors
    ///
    /// Returns error if the provider is unknown or the update is refused
    pub async fn select_llm_provider(&mut self, provider: &str) -> Result<()> {
        self.store.set_llm_provider(provider)?;

        let services = BTreeMap::from([(ServiceKind::Llm, self.store.llm_provider().to_string())]);
        self.client_params.apply_services(&services);
        if let Some(session) = self.bootstrapper.session() {
            session.update_services(&services).await?;
        }

        let blocks = compile_model_only(self.store.llm_model());
        self.apply(&blocks).await
    }

    /// # Errors
    ///
    /// Returns error if the update is refused
    pub async fn select_llm_model(&mut self, model: &str) -> Result<()> {
        let blocks = compile_model_only(self.store.set_llm_model(model));
        self.apply(&blocks).await
    }

    /// Direct system-prompt edit, bypassing character/language composition
    ///
    /// # Errors
    ///
    /// Returns error if the update is refused
    pub async fn edit_prompt(&mut self, prompt: &str) -> Result<()> {
        let blocks = compile_prompt_only(prompt);
        self.client_params.apply(&blocks);

        let Some(session) = self.bootstrapper.session().cloned() else {
            return Ok(());
        };
        match self.bootstrapper.llm_helper() {
            Some(helper) => helper.set_prompt(session.as_ref(), prompt).await,
            None => session.update_config(&blocks).await,
        }
    }

    /// # Errors
    ///
    /// Returns error for negative or non-finite seconds, or if the update is
    /// refused; nothing is compiled for rejected input
    pub async fn set_vad_stop_secs(&mut self, secs: f64) -> Result<()> {
        self.store.set_vad_stop_secs(secs)?;
        let blocks = compile_vad_only(self.store.vad_stop_secs());
        self.apply(&blocks).await
    }

    async fn recompose(&mut self) -> Result<()> {
        let blocks = compile_full(
            self.store.catalog(),
            self.store.character_index(),
            self.store.language_index(),
        );
        self.apply(&blocks).await
    }

    /// Merge into the local client params and hand to the session, if any
    ///
    /// The client keeps updates made before it is ready and sends the rest.
    async fn apply(&mut self, blocks: &[ServiceConfigBlock]) -> Result<()> {
        self.client_params.apply(blocks);
        tracing::debug!(
            services = ?blocks.iter().map(|b| b.service).collect::<Vec<_>>(),
            "applied config update"
        );

        if let Some(session) = self.bootstrapper.session() {
            session.update_config(blocks).await?;
        }
        Ok(())
    }
}
