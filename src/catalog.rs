//! Static option catalog: languages, LLM providers and character presets
//!
//! Indices handed out by the catalog are stable for the lifetime of the
//! process. Looking up an index the catalog never produced is a caller bug and
//! panics.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A selectable spoken language
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LanguageOption {
    /// Display label (e.g. "French")
    pub label: String,

    /// Spoken-language code sent to STT and TTS (e.g. "fr")
    pub value: String,

    /// Voice used when this language overrides the character's voice
    pub default_voice: String,

    /// TTS model for this language
    pub tts_model: String,

    /// STT model for this language
    pub stt_model: String,
}

/// An LLM provider and the models it offers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LlmChoice {
    /// Display label
    pub label: String,

    /// Provider identifier used in the service map
    pub value: String,

    /// Offered models, first is the default
    pub models: Vec<LlmModel>,
}

/// A single LLM model entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LlmModel {
    pub label: String,
    pub value: String,
}

impl LlmChoice {
    /// The model used when none has been selected explicitly
    ///
    /// # Panics
    ///
    /// Panics if the model list is empty, which [`Catalog::new`] rules out
    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.models[0].value
    }

    /// Whether `model` is offered by this provider
    #[must_use]
    pub fn contains_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m.value == model)
    }
}

/// A character preset: personality prompt plus voice
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CharacterPreset {
    pub name: String,

    /// System prompt, possibly indented; normalized before transmission
    pub prompt: String,

    /// TTS voice identifier
    pub voice: String,
}

/// Language selection with the index-0 sentinel made explicit
///
/// Both variants carry the language entry, since its models and spoken value
/// are used regardless of which voice and prompt win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSelection<'a> {
    /// Voice and prompt come from the character preset
    UseCharacterDefault(&'a LanguageOption),

    /// Voice and prompt come from the language
    Language(&'a LanguageOption),
}

impl<'a> LanguageSelection<'a> {
    /// The underlying catalog entry
    #[must_use]
    pub const fn option(&self) -> &'a LanguageOption {
        match *self {
            Self::UseCharacterDefault(opt) | Self::Language(opt) => opt,
        }
    }
}

/// Immutable set of selectable options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    languages: Vec<LanguageOption>,
    llm_choices: Vec<LlmChoice>,
    characters: Vec<CharacterPreset>,
    default_prompt: String,
}

impl Catalog {
    /// Build a catalog, checking its invariants
    ///
    /// # Errors
    ///
    /// Returns error if any list is empty or a provider offers no models
    pub fn new(
        languages: Vec<LanguageOption>,
        llm_choices: Vec<LlmChoice>,
        characters: Vec<CharacterPreset>,
        default_prompt: impl Into<String>,
    ) -> Result<Self> {
        if languages.is_empty() {
            return Err(Error::Catalog("at least one language is required".to_string()));
        }
        if characters.is_empty() {
            return Err(Error::Catalog(
                "at least one character preset is required".to_string(),
            ));
        }
        if llm_choices.is_empty() {
            return Err(Error::Catalog(
                "at least one LLM provider is required".to_string(),
            ));
        }
        if let Some(choice) = llm_choices.iter().find(|c| c.models.is_empty()) {
            return Err(Error::Catalog(format!(
                "LLM provider {} offers no models",
                choice.value
            )));
        }

        Ok(Self {
            languages,
            llm_choices,
            characters,
            default_prompt: default_prompt.into(),
        })
    }

    /// The catalog shipped with the console
    ///
    /// # Panics
    ///
    /// Panics if the shipped definitions break a catalog invariant
    #[must_use]
    pub fn builtin() -> &'static Self {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Self::new(
                builtin_languages(),
                builtin_llm_choices(),
                builtin_characters(),
                DEFAULT_LLM_PROMPT,
            )
            .expect("builtin catalog is valid")
        })
    }

    #[must_use]
    pub fn languages(&self) -> &[LanguageOption] {
        &self.languages
    }

    #[must_use]
    pub fn llm_choices(&self) -> &[LlmChoice] {
        &self.llm_choices
    }

    #[must_use]
    pub fn characters(&self) -> &[CharacterPreset] {
        &self.characters
    }

    /// Generic prompt used when a language overrides the character
    #[must_use]
    pub fn default_prompt(&self) -> &str {
        &self.default_prompt
    }

    /// Character preset at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    #[must_use]
    pub fn character(&self, index: usize) -> &CharacterPreset {
        &self.characters[index]
    }

    /// Language entry at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    #[must_use]
    pub fn language(&self, index: usize) -> &LanguageOption {
        &self.languages[index]
    }

    /// Tagged language selection for `index`; index 0 defers to the character
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range
    #[must_use]
    pub fn language_selection(&self, index: usize) -> LanguageSelection<'_> {
        let option = self.language(index);
        if index == 0 {
            LanguageSelection::UseCharacterDefault(option)
        } else {
            LanguageSelection::Language(option)
        }
    }

    /// Provider entry by identifier
    #[must_use]
    pub fn llm_choice(&self, provider: &str) -> Option<&LlmChoice> {
        self.llm_choices.iter().find(|c| c.value == provider)
    }

    /// First provider, the startup default
    #[must_use]
    pub fn default_llm_choice(&self) -> &LlmChoice {
        &self.llm_choices[0]
    }
}

/// Generic system prompt used for language overrides and the default character
pub const DEFAULT_LLM_PROMPT: &str = "You are a friendly voice assistant called Ada.
    Keep your answers brief, clear and conversational.
    Your replies are converted to speech, so avoid special characters other than '!' or '?'.
    Open by briefly introducing yourself.";

fn language(label: &str, value: &str, voice: &str, tts_model: &str) -> LanguageOption {
    LanguageOption {
        label: label.to_string(),
        value: value.to_string(),
        default_voice: voice.to_string(),
        tts_model: tts_model.to_string(),
        stt_model: "nova-2-general".to_string(),
    }
}

fn builtin_languages() -> Vec<LanguageOption> {
    vec![
        language(
            "English",
            "en",
            "79a125e8-cd45-4c13-8a67-188112f4dd22",
            "sonic-english",
        ),
        language(
            "French",
            "fr",
            "a8a1eb38-5f15-4c1d-8722-7ac0f329727d",
            "sonic-multilingual",
        ),
        language(
            "Spanish",
            "es",
            "846d6cb0-2301-48b6-9683-48f5618ea2f6",
            "sonic-multilingual",
        ),
        language(
            "German",
            "de",
            "b9de4a89-2257-424b-94c2-db18ba68c81a",
            "sonic-multilingual",
        ),
    ]
}

fn models(entries: &[(&str, &str)]) -> Vec<LlmModel> {
    entries
        .iter()
        .map(|(label, value)| LlmModel {
            label: (*label).to_string(),
            value: (*value).to_string(),
        })
        .collect()
}

fn builtin_llm_choices() -> Vec<LlmChoice> {
    vec![
        LlmChoice {
            label: "Together AI".to_string(),
            value: "together".to_string(),
            models: models(&[
                (
                    "Meta Llama 3.1 70B Instruct Turbo",
                    "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
                ),
                (
                    "Meta Llama 3.1 8B Instruct Turbo",
                    "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
                ),
                (
                    "Meta Llama 3.1 405B Instruct Turbo",
                    "meta-llama/Meta-Llama-3.1-405B-Instruct-Turbo",
                ),
            ]),
        },
        LlmChoice {
            label: "Anthropic".to_string(),
            value: "anthropic".to_string(),
            models: models(&[("Claude 3.5 Sonnet", "claude-3-5-sonnet-20240620")]),
        },
        LlmChoice {
            label: "Groq".to_string(),
            value: "groq".to_string(),
            models: models(&[
                ("Llama 3.1 70B", "llama-3.1-70b-versatile"),
                ("Llama 3.1 8B", "llama-3.1-8b-instant"),
            ]),
        },
        LlmChoice {
            label: "OpenAI".to_string(),
            value: "openai".to_string(),
            models: models(&[("GPT-4o", "gpt-4o"), ("GPT-4o Mini", "gpt-4o-mini")]),
        },
    ]
}

fn builtin_characters() -> Vec<CharacterPreset> {
    vec![
        CharacterPreset {
            name: "Default".to_string(),
            prompt: DEFAULT_LLM_PROMPT.to_string(),
            voice: "79a125e8-cd45-4c13-8a67-188112f4dd22".to_string(),
        },
        CharacterPreset {
            name: "Chronic one-upper".to_string(),
            prompt: "You are a chronic one-upper called Ned.
                Whatever the user has done, you have done something bigger, and you say so.
                Stay good-natured and keep every reply to two sentences.
                Avoid special characters other than '!' or '?'."
                .to_string(),
            voice: "820a3788-2b37-4d21-847a-b65d8a68c99a".to_string(),
        },
        CharacterPreset {
            name: "Passive-aggressive coworker".to_string(),
            prompt: "You are Joe, a coworker who answers every question with polite passive aggression.
                You are helpful in the end, but never without a small sigh first.
                Keep replies short and avoid special characters other than '!' or '?'."
                .to_string(),
            voice: "a167e0f3-df7e-4d52-a9c3-f949145efdab".to_string(),
        },
        CharacterPreset {
            name: "Pessimistic poet".to_string(),
            prompt: "You are a melancholic poet who answers in short, gloomy verses.
                Never exceed four lines and avoid special characters other than '!' or '?'."
                .to_string(),
            voice: "7360f116-6306-4e9a-b487-1235f35a0f21".to_string(),
        },
        CharacterPreset {
            name: "Medical appointment assistant".to_string(),
            prompt: "You are MedAssist, a professional virtual assistant for a medical center.
                Guide patients through booking an appointment: department, preferred day, preferred time.
                Confirm each step, and always get a final confirmation before booking.
                If a request is outside the available departments or schedules, say you do not know and refocus.
                When listing availability, describe it as time ranges rather than individual slots.
                Do not read out special characters or symbols."
                .to_string(),
            voice: "156fb8d2-335b-4950-9cb3-a2d33befec77".to_string(),
        },
    ]
}
