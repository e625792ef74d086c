//! Configuration payload types exchanged with the session client

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Backend service a configuration block targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Tts,
    Llm,
    Stt,
    Vad,
}

impl ServiceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tts => "tts",
            Self::Llm => "llm",
            Self::Stt => "stt",
            Self::Vad => "vad",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single named option inside a service block
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConfigOption {
    pub name: String,
    pub value: Value,
}

impl ConfigOption {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered options destined for one service
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceConfigBlock {
    pub service: ServiceKind,
    pub options: Vec<ConfigOption>,
}

impl ServiceConfigBlock {
    #[must_use]
    pub const fn new(service: ServiceKind, options: Vec<ConfigOption>) -> Self {
        Self { service, options }
    }

    /// Option value by name
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
    }
}

/// Message role in an LLM context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message as carried in `initial_messages`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LlmMessage {
    pub role: Role,
    pub content: String,
}

/// Service map plus configuration handed to the client at startup
///
/// Also serves as the locally held client parameters that later updates are
/// merged into.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RequestData {
    pub services: BTreeMap<ServiceKind, String>,
    pub config: Vec<ServiceConfigBlock>,
}

impl RequestData {
    /// Merge configuration blocks, last write wins per `(service, name)`
    ///
    /// Existing options keep their position; new options and new services are
    /// appended in the order given.
    pub fn apply(&mut self, blocks: &[ServiceConfigBlock]) {
        for block in blocks {
            let Some(existing) = self.config.iter_mut().find(|b| b.service == block.service)
            else {
                self.config.push(block.clone());
                continue;
            };

            for option in &block.options {
                match existing.options.iter_mut().find(|o| o.name == option.name) {
                    Some(slot) => slot.value = option.value.clone(),
                    None => existing.options.push(option.clone()),
                }
            }
        }
    }

    /// Merge service-provider assignments, last write wins per service
    pub fn apply_services(&mut self, services: &BTreeMap<ServiceKind, String>) {
        for (service, provider) in services {
            self.services.insert(*service, provider.clone());
        }
    }

    /// Configuration block for `service`
    #[must_use]
    pub fn block(&self, service: ServiceKind) -> Option<&ServiceConfigBlock> {
        self.config.iter().find(|b| b.service == service)
    }

    /// Option value for `(service, name)`
    #[must_use]
    pub fn option(&self, service: ServiceKind, name: &str) -> Option<&Value> {
        self.block(service).and_then(|b| b.option(name))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn block(service: ServiceKind, options: &[(&str, Value)]) -> ServiceConfigBlock {
        ServiceConfigBlock::new(
            service,
            options
                .iter()
                .map(|(n, v)| ConfigOption::new(*n, v.clone()))
                .collect(),
        )
    }

    #[test]
    fn apply_replaces_in_place_and_appends() {
        let mut data = RequestData::default();
        data.apply(&[block(
            ServiceKind::Tts,
            &[("voice", json!("a")), ("model", json!("m1"))],
        )]);
        data.apply(&[
            block(
                ServiceKind::Tts,
                &[("model", json!("m2")), ("language", json!("fr"))],
            ),
            block(ServiceKind::Vad, &[("params", json!({"stop_secs": 0.5}))]),
        ]);

        let tts = data.block(ServiceKind::Tts).unwrap();
        let names: Vec<_> = tts.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["voice", "model", "language"]);
        assert_eq!(tts.option("model"), Some(&json!("m2")));
        assert_eq!(data.config.len(), 2);
        assert_eq!(
            data.option(ServiceKind::Vad, "params"),
            Some(&json!({"stop_secs": 0.5}))
        );
    }

    #[test]
    fn later_block_in_same_batch_wins() {
        let mut data = RequestData::default();
        data.apply(&[
            block(ServiceKind::Llm, &[("model", json!("first"))]),
            block(ServiceKind::Llm, &[("model", json!("second"))]),
        ]);
        assert_eq!(data.option(ServiceKind::Llm, "model"), Some(&json!("second")));
        assert_eq!(data.config.len(), 1);
    }

    #[test]
    fn block_serializes_to_client_shape() {
        let b = block(ServiceKind::Stt, &[("language", json!("en"))]);
        assert_eq!(
            serde_json::to_value(&b).unwrap(),
            json!({"service": "stt", "options": [{"name": "language", "value": "en"}]})
        );
    }

    #[test]
    fn apply_services_overwrites() {
        let mut data = RequestData::default();
        data.services.insert(ServiceKind::Llm, "together".to_string());
        data.services.insert(ServiceKind::Tts, "cartesia".to_string());
        data.apply_services(&BTreeMap::from([(ServiceKind::Llm, "groq".to_string())]));
        assert_eq!(data.services[&ServiceKind::Llm], "groq");
        assert_eq!(data.services[&ServiceKind::Tts], "cartesia");
    }
}
