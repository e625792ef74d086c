//! Shared test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rtvi_console::{
    Catalog, CharacterPreset, ClientFactory, ClientOptions, HttpSessionClient, LanguageOption,
    LlmChoice, LlmModel, SessionClient, Transport,
};
use serde_json::Value;

fn language(label: &str, value: &str, suffix: &str) -> LanguageOption {
    LanguageOption {
        label: label.to_string(),
        value: value.to_string(),
        default_voice: format!("v-{suffix}"),
        tts_model: format!("m-{suffix}"),
        stt_model: format!("s-{suffix}"),
    }
}

fn model(value: &str) -> LlmModel {
    LlmModel {
        label: value.to_uppercase(),
        value: value.to_string(),
    }
}

/// Small catalog with known values
///
/// Character 0 is "Assistant" with an indented two-line prompt; language 2 is
/// French with `v-fr`/`m-fr`/`s-fr`.
#[must_use]
pub fn fixture_catalog() -> Catalog {
    Catalog::new(
        vec![
            language("English", "en-US", "en"),
            language("Spanish", "es-ES", "es"),
            language("French", "fr-FR", "fr"),
        ],
        vec![
            LlmChoice {
                label: "Together".to_string(),
                value: "together".to_string(),
                models: vec![model("llama-big"), model("llama-small")],
            },
            LlmChoice {
                label: "OpenAI".to_string(),
                value: "openai".to_string(),
                models: vec![model("gpt-4o")],
            },
        ],
        vec![
            CharacterPreset {
                name: "Assistant".to_string(),
                prompt: "  Hello\n  World".to_string(),
                voice: "voice-assistant".to_string(),
            },
            CharacterPreset {
                name: "Pirate".to_string(),
                prompt: "    Talk like a pirate.\n\tNever break character.  ".to_string(),
                voice: "voice-pirate".to_string(),
            },
        ],
        "   You are a helpful assistant.\n   Keep it short.",
    )
    .expect("fixture catalog is valid")
}

/// Transport that keeps every message it is asked to send
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    pub sent: Arc<Mutex<Vec<Value>>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &Value) -> rtvi_console::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Factory building HTTP clients over a shared recording transport
#[derive(Debug, Default, Clone)]
pub struct RecordingFactory {
    pub transport: RecordingTransport,
    pub built: Arc<AtomicUsize>,
}

impl RecordingFactory {
    pub fn sent(&self) -> Vec<Value> {
        self.transport.sent.lock().unwrap().clone()
    }

    pub fn built(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

impl ClientFactory for RecordingFactory {
    fn transport(&self) -> Box<dyn Transport> {
        Box::new(self.transport.clone())
    }

    fn build(&self, options: ClientOptions) -> rtvi_console::Result<Arc<dyn SessionClient>> {
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(HttpSessionClient::new(options)?))
    }
}

/// Serve `/api/connect` on an ephemeral port, recording request bodies
pub async fn spawn_connect_server() -> (String, Arc<Mutex<Vec<Value>>>) {
    use axum::{Json, Router, routing::post};

    let bodies: Arc<Mutex<Vec<Value>>> = Arc::default();
    let seen = Arc::clone(&bodies);
    let app = Router::new().route(
        "/api/connect",
        post(move |Json(body): Json<Value>| {
            let seen = Arc::clone(&seen);
            async move {
                seen.lock().unwrap().push(body);
                Json(serde_json::json!({ "room_url": "https://example.daily.co/test" }))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), bodies)
}
