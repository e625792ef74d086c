//! Session parameter store
//!
//! Single authoritative holder of the user's current selections. Fields are
//! only reachable through the setters, which validate against the catalog.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::compose::{DEFAULT_VAD_STOP_SECS, RequestData, ServiceKind};
use crate::{Error, Result};

/// Owned snapshot of the current selections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    pub character_index: usize,
    pub language_index: usize,
    pub llm_provider: String,
    pub llm_model: String,
    pub vad_stop_secs: f64,
}

/// Current selections, validated against a catalog
#[derive(Debug, Clone)]
pub struct SelectionStore<'a> {
    catalog: &'a Catalog,
    state: SelectionState,
}

impl<'a> SelectionStore<'a> {
    /// Store seeded with catalog defaults
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        let provider = catalog.default_llm_choice();
        Self {
            catalog,
            state: SelectionState {
                character_index: 0,
                language_index: 0,
                llm_provider: provider.value.clone(),
                llm_model: provider.default_model().to_string(),
                vad_stop_secs: DEFAULT_VAD_STOP_SECS,
            },
        }
    }

    /// Store seeded from the client's startup parameters
    ///
    /// Missing or invalid entries fall back to the catalog defaults field by
    /// field.
    #[must_use]
    pub fn from_request_data(catalog: &'a Catalog, data: &RequestData) -> Self {
        let mut store = Self::new(catalog);

        if let Some(provider) = data.services.get(&ServiceKind::Llm) {
            if let Err(e) = store.set_llm_provider(provider) {
                tracing::warn!(error = %e, "ignoring startup LLM provider");
            }
        }

        if let Some(model) = data
            .option(ServiceKind::Llm, "model")
            .and_then(serde_json::Value::as_str)
        {
            store.set_llm_model(model);
        }

        if let Some(secs) = data
            .option(ServiceKind::Vad, "params")
            .and_then(|p| p.get("stop_secs"))
            .and_then(serde_json::Value::as_f64)
        {
            if let Err(e) = store.set_vad_stop_secs(secs) {
                tracing::warn!(error = %e, "ignoring startup VAD stop secs");
            }
        }

        store
    }

    #[must_use]
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    #[must_use]
    pub const fn character_index(&self) -> usize {
        self.state.character_index
    }

    #[must_use]
    pub const fn language_index(&self) -> usize {
        self.state.language_index
    }

    #[must_use]
    pub fn llm_provider(&self) -> &str {
        &self.state.llm_provider
    }

    #[must_use]
    pub fn llm_model(&self) -> &str {
        &self.state.llm_model
    }

    #[must_use]
    pub const fn vad_stop_secs(&self) -> f64 {
        self.state.vad_stop_secs
    }

    #[must_use]
    pub fn snapshot(&self) -> SelectionState {
        self.state.clone()
    }

    /// Select a character preset
    ///
    /// # Errors
    ///
    /// Returns error if `index` is outside the catalog; the selection is kept
    pub fn set_character(&mut self, index: usize) -> Result<()> {
        let len = self.catalog.characters().len();
        if index >= len {
            tracing::warn!(index, len, "rejecting character selection");
            return Err(Error::Selection(format!(
                "character index {index} out of range (0..{len})"
            )));
        }
        self.state.character_index = index;
        Ok(())
    }

    /// Select a language
    ///
    /// # Errors
    ///
    /// Returns error if `index` is outside the catalog; the selection is kept
    pub fn set_language(&mut self, index: usize) -> Result<()> {
        let len = self.catalog.languages().len();
        if index >= len {
            tracing::warn!(index, len, "rejecting language selection");
            return Err(Error::Selection(format!(
                "language index {index} out of range (0..{len})"
            )));
        }
        self.state.language_index = index;
        Ok(())
    }

    /// Select an LLM provider, resetting the model if the provider lacks it
    ///
    /// # Errors
    ///
    /// Returns error if the provider is not in the catalog
    pub fn set_llm_provider(&mut self, provider: &str) -> Result<()> {
        let catalog = self.catalog;
        let Some(choice) = catalog.llm_choice(provider) else {
            tracing::warn!(provider, "rejecting unknown LLM provider");
            return Err(Error::Selection(format!("unknown LLM provider: {provider}")));
        };

        if !choice.contains_model(&self.state.llm_model) {
            tracing::debug!(
                provider,
                model = choice.default_model(),
                "resetting LLM model for new provider"
            );
            self.state.llm_model = choice.default_model().to_string();
        }
        self.state.llm_provider = choice.value.clone();
        Ok(())
    }

    /// Select an LLM model and return the model actually in effect
    ///
    /// A model the current provider does not offer is replaced by the
    /// provider's first model.
    pub fn set_llm_model(&mut self, model: &str) -> &str {
        let catalog = self.catalog;
        let choice = catalog
            .llm_choice(&self.state.llm_provider)
            .unwrap_or_else(|| catalog.default_llm_choice());

        if choice.contains_model(model) {
            self.state.llm_model = model.to_string();
        } else {
            tracing::warn!(
                provider = %choice.value,
                requested = model,
                fallback = choice.default_model(),
                "model not offered by provider, using default"
            );
            self.state.llm_model = choice.default_model().to_string();
        }
        &self.state.llm_model
    }

    /// Set the VAD stop duration in seconds
    ///
    /// # Errors
    ///
    /// Returns error for negative or non-finite values; the previous value is
    /// kept
    pub fn set_vad_stop_secs(&mut self, secs: f64) -> Result<()> {
        if !secs.is_finite() || secs < 0.0 {
            tracing::warn!(secs, "rejecting VAD stop secs");
            return Err(Error::Validation(format!(
                "VAD stop secs must be a non-negative number, got {secs}"
            )));
        }
        self.state.vad_stop_secs = secs;
        Ok(())
    }
}
