//! Session configuration compiler
//!
//! Turns catalog selections into the ordered service blocks the session client
//! applies. Every function here is pure: same catalog and inputs, same output.

mod types;

use std::time::Duration;

use serde_json::json;

pub use types::{
    ConfigOption, LlmMessage, RequestData, Role, ServiceConfigBlock, ServiceKind,
};

use crate::catalog::{Catalog, LanguageSelection};

/// Bound on waiting for the remote side to report ready
pub const BOT_READY_TIMEOUT: Duration = Duration::from_secs(15);

/// Silence, in seconds, before VAD considers the user done speaking
pub const DEFAULT_VAD_STOP_SECS: f64 = 0.3;

/// Capability name the LLM helper is registered under
pub const LLM_HELPER_NAME: &str = "llm";

const LLM_INITIAL_MESSAGES: &str = "initial_messages";

/// Default TTS provider in the startup service map
pub const DEFAULT_TTS_PROVIDER: &str = "cartesia";

/// Default STT provider in the startup service map
pub const DEFAULT_STT_PROVIDER: &str = "deepgram";

/// Trim every line of a prompt and rejoin with `\n`
///
/// The remote LLM is sensitive to leading whitespace in system prompts.
#[must_use]
pub fn normalize_prompt(text: &str) -> String {
    text.split('\n').map(str::trim).collect::<Vec<_>>().join("\n")
}

/// `initial_messages` option holding a single system message
#[must_use]
pub fn initial_messages(prompt: &str) -> ConfigOption {
    let messages = vec![LlmMessage {
        role: Role::System,
        content: normalize_prompt(prompt),
    }];
    ConfigOption::new(LLM_INITIAL_MESSAGES, json!(messages))
}

/// Compile the full tts/llm/stt configuration for a character and language
///
/// A non-default language replaces both the character's voice and its prompt:
/// the prompt becomes the catalog's generic prompt plus a language directive.
///
/// # Panics
///
/// Panics if either index is outside the catalog
#[must_use]
pub fn compile_full(
    catalog: &Catalog,
    character_index: usize,
    language_index: usize,
) -> Vec<ServiceConfigBlock> {
    let character = catalog.character(character_index);
    let selection = catalog.language_selection(language_index);
    let language = selection.option();

    let (voice, prompt) = match selection {
        LanguageSelection::UseCharacterDefault(_) => {
            (character.voice.as_str(), character.prompt.clone())
        }
        LanguageSelection::Language(lang) => (
            lang.default_voice.as_str(),
            format!(
                "{}\nRespond only in {} please.",
                catalog.default_prompt(),
                lang.label
            ),
        ),
    };

    tracing::debug!(
        character = %character.name,
        language = %language.label,
        "compiling full session config"
    );

    vec![
        ServiceConfigBlock::new(
            ServiceKind::Tts,
            vec![
                ConfigOption::new("voice", voice),
                ConfigOption::new("model", language.tts_model.as_str()),
                ConfigOption::new("language", language.value.as_str()),
            ],
        ),
        ServiceConfigBlock::new(ServiceKind::Llm, vec![initial_messages(&prompt)]),
        ServiceConfigBlock::new(
            ServiceKind::Stt,
            vec![
                ConfigOption::new("model", language.stt_model.as_str()),
                ConfigOption::new("language", language.value.as_str()),
            ],
        ),
    ]
}

/// Compile a direct system-prompt edit, leaving voice and models untouched
#[must_use]
pub fn compile_prompt_only(prompt: &str) -> Vec<ServiceConfigBlock> {
    vec![ServiceConfigBlock::new(
        ServiceKind::Llm,
        vec![initial_messages(prompt)],
    )]
}

/// Compile a VAD parameter update
///
/// No clamping happens here; callers pass values already validated by the
/// selection store.
#[must_use]
pub fn compile_vad_only(stop_secs: f64) -> Vec<ServiceConfigBlock> {
    vec![ServiceConfigBlock::new(
        ServiceKind::Vad,
        vec![ConfigOption::new("params", json!({ "stop_secs": stop_secs }))],
    )]
}

/// Compile an LLM model switch
///
/// The llm block carries `model` alone. It is only complete once merged into
/// request data that already holds the llm options, since merging replaces
/// by `(service, name)` and leaves the other llm options as they were.
#[must_use]
pub fn compile_model_only(model: &str) -> Vec<ServiceConfigBlock> {
    vec![ServiceConfigBlock::new(
        ServiceKind::Llm,
        vec![ConfigOption::new("model", model)],
    )]
}

/// Startup service map and configuration
///
/// VAD defaults first, then the character-0/language-0 compilation, then the
/// static LLM defaults merged into the llm block.
#[must_use]
pub fn default_request_data(catalog: &Catalog) -> RequestData {
    let provider = catalog.default_llm_choice();

    let mut data = RequestData::default();
    data.services
        .insert(ServiceKind::Llm, provider.value.clone());
    data.services
        .insert(ServiceKind::Tts, DEFAULT_TTS_PROVIDER.to_string());
    data.services
        .insert(ServiceKind::Stt, DEFAULT_STT_PROVIDER.to_string());

    data.apply(&compile_vad_only(DEFAULT_VAD_STOP_SECS));
    data.apply(&compile_full(catalog, 0, 0));
    data.apply(&[ServiceConfigBlock::new(
        ServiceKind::Llm,
        vec![
            ConfigOption::new("model", provider.default_model()),
            ConfigOption::new("run_on_config", true),
        ],
    )]);
    data
}
