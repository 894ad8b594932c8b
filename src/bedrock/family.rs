//! Model family adapters
//!
//! Each Bedrock model family has its own request body layout and response
//! shape. [`ModelFamily`] turns a prompt into the family's wire body and pulls
//! the generated text back out of the family's response.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::bedrock::types::{ClaudeResponse, GenerationParams, NovaResponse, TitanResponse};
use crate::error::DispatchError;

/// Default generation budget shared by every family
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default sampling temperature for families that always send one
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Default nucleus sampling mass for Titan
pub const DEFAULT_TITAN_TOP_P: f64 = 0.9;

/// Anthropic API version pinned by Bedrock
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Supported model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    /// Amazon Titan text models (flat `inputText` body)
    Titan,
    /// Amazon Nova models (chat-style content blocks)
    Nova,
    /// Anthropic Claude models (messages API)
    Claude,
}

impl ModelFamily {
    /// Short identifier used in logs and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::Titan => "titan",
            ModelFamily::Nova => "nova",
            ModelFamily::Claude => "claude",
        }
    }

    /// Bedrock model ID used when none is configured
    pub fn default_model_id(&self) -> &'static str {
        match self {
            ModelFamily::Titan => "amazon.titan-text-express-v1",
            ModelFamily::Nova => "amazon.nova-pro-v1:0",
            ModelFamily::Claude => "anthropic.claude-3-haiku-20240307-v1:0",
        }
    }

    /// Build the family's request body for a prompt
    pub fn serialize(&self, prompt: &str, params: &GenerationParams) -> Value {
        let max_tokens = params.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS);

        match self {
            ModelFamily::Titan => json!({
                "inputText": prompt,
                "textGenerationConfig": {
                    "maxTokenCount": max_tokens,
                    "temperature": params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                    "topP": params.top_p.unwrap_or(DEFAULT_TITAN_TOP_P)
                }
            }),
            ModelFamily::Nova => {
                let mut body = json!({
                    "messages": [{"role": "user", "content": [{"text": prompt}]}],
                    "max_tokens": max_tokens,
                    "temperature": params.temperature.unwrap_or(DEFAULT_TEMPERATURE)
                });
                if let (Some(top_p), Some(obj)) = (params.top_p, body.as_object_mut()) {
                    obj.insert("top_p".to_string(), json!(top_p));
                }
                body
            }
            ModelFamily::Claude => {
                let mut body = Map::new();
                body.insert("anthropic_version".to_string(), json!(ANTHROPIC_VERSION));
                body.insert("max_tokens".to_string(), json!(max_tokens));
                body.insert(
                    "messages".to_string(),
                    json!([{"role": "user", "content": prompt}]),
                );
                if let Some(temperature) = params.temperature {
                    body.insert("temperature".to_string(), json!(temperature));
                }
                if let Some(top_p) = params.top_p {
                    body.insert("top_p".to_string(), json!(top_p));
                }
                Value::Object(body)
            }
        }
    }

    /// Extract the generated text from the family's response body
    pub fn deserialize(&self, body: Value) -> Result<String, DispatchError> {
        match self {
            ModelFamily::Titan => {
                let resp: TitanResponse = self.parse(body)?;
                resp.results
                    .into_iter()
                    .next()
                    .map(|r| r.output_text)
                    .ok_or_else(|| self.shape_error("'results' is empty"))
            }
            ModelFamily::Nova => {
                let resp: NovaResponse = self.parse(body)?;
                resp.output
                    .message
                    .content
                    .into_iter()
                    .next()
                    .map(|b| b.text)
                    .ok_or_else(|| self.shape_error("'output.message.content' is empty"))
            }
            ModelFamily::Claude => {
                let resp: ClaudeResponse = self.parse(body)?;
                resp.content
                    .into_iter()
                    .next()
                    .map(|b| b.text)
                    .ok_or_else(|| self.shape_error("'content' is empty"))
            }
        }
    }

    fn parse<T: DeserializeOwned>(&self, body: Value) -> Result<T, DispatchError> {
        serde_json::from_value(body).map_err(|e| self.shape_error(e.to_string()))
    }

    fn shape_error(&self, message: impl Into<String>) -> DispatchError {
        DispatchError::UnrecognizedResponseShape {
            family: self.as_str().to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titan_body_uses_defaults() {
        let body = ModelFamily::Titan.serialize("hello", &GenerationParams::default());
        assert_eq!(body["inputText"], "hello");
        let cfg = &body["textGenerationConfig"];
        assert_eq!(cfg["maxTokenCount"], 2000);
        assert!((cfg["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((cfg["topP"].as_f64().unwrap() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_nova_body_shape() {
        let params = GenerationParams {
            max_output_tokens: Some(512),
            temperature: None,
            top_p: Some(0.5),
        };
        let body = ModelFamily::Nova.serialize("hello", &params);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "hello");
        assert_eq!(body["max_tokens"], 512);
        assert!((body["top_p"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_nova_body_omits_unset_top_p() {
        let body = ModelFamily::Nova.serialize("hello", &GenerationParams::default());
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_claude_body_shape() {
        let body = ModelFamily::Claude.serialize("hello", &GenerationParams::default());
        assert_eq!(body["anthropic_version"], ANTHROPIC_VERSION);
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["content"], "hello");
        assert!(body.get("temperature").is_none());
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_extracts_text_per_family() {
        let fixtures = [
            (ModelFamily::Titan, json!({"results": [{"outputText": "titan says"}]})),
            (
                ModelFamily::Nova,
                json!({"output": {"message": {"role": "assistant", "content": [{"text": "nova says"}]}}}),
            ),
            (ModelFamily::Claude, json!({"content": [{"type": "text", "text": "claude says"}]})),
        ];

        for (family, body) in fixtures {
            let text = family.deserialize(body).unwrap();
            assert_eq!(text, format!("{} says", family));
        }
    }

    #[test]
    fn test_wrong_shape_is_unrecognized() {
        let titan_body = json!({"results": [{"outputText": "x"}]});
        let err = ModelFamily::Claude.deserialize(titan_body).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UnrecognizedResponseShape { ref family, .. } if family == "claude"
        ));

        let err = ModelFamily::Titan.deserialize(json!({"results": []})).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
