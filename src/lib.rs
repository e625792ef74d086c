//! RTVI Console - session configuration and bootstrap for real-time voice AI
//!
//! This library provides the core of a real-time voice session front-end:
//! - Option catalog (languages, LLM providers, character presets)
//! - Selection store validated against the catalog
//! - Configuration compiler producing per-service config blocks
//! - One-shot session bootstrap gated on readiness
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Presentation shell                   │
//! │   select character │ language │ model │ vad │ prompt │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │        Selection store  →  Config compiler          │
//! │              Session bootstrapper                   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            Session client (external)                 │
//! │   Transport  │  TTS  │  LLM  │  STT  │  VAD         │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod bootstrap;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod session;
pub mod shell;
pub mod store;

pub use bootstrap::{BootState, SessionBootstrapper};
pub use catalog::{Catalog, CharacterPreset, LanguageOption, LanguageSelection, LlmChoice, LlmModel};
pub use compose::{
    ConfigOption, RequestData, ServiceConfigBlock, ServiceKind, compile_full, compile_model_only,
    compile_prompt_only, compile_vad_only, default_request_data, normalize_prompt,
};
pub use config::Settings;
pub use error::{Error, Result};
pub use session::{
    ClientFactory, ClientHelper, ClientOptions, HttpClientFactory, HttpSessionClient, LlmHelper,
    LogTransport, SessionClient, Transport, TransportState,
};
pub use shell::{AppContext, View};
pub use store::{SelectionState, SelectionStore};
