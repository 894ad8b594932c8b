//! Bedrock runtime wire types
//!
//! Generation parameters plus the response bodies of each supported model family.

use serde::{Deserialize, Serialize};

/// Generation options shared by every model family.
///
/// Unset fields fall back to the defaults of the family serving the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Sampling randomness in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Nucleus sampling mass in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

impl GenerationParams {
    /// Layer `other` on top of `self`, keeping our values where `other` is unset
    pub fn merged_with(self, other: GenerationParams) -> Self {
        Self {
            max_output_tokens: other.max_output_tokens.or(self.max_output_tokens),
            temperature: other.temperature.or(self.temperature),
            top_p: other.top_p.or(self.top_p),
        }
    }

    /// Check that every set field is within its legal range
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_output_tokens == Some(0) {
            return Err("max_output_tokens must be greater than zero".to_string());
        }
        for (name, value) in [("temperature", self.temperature), ("top_p", self.top_p)] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("{} must be within [0, 1], got {}", name, v));
                }
            }
        }
        Ok(())
    }
}

/// Titan text response: `{"results": [{"outputText": ...}]}`
#[derive(Debug, Deserialize)]
pub struct TitanResponse {
    pub results: Vec<TitanResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanResult {
    pub output_text: String,
}

/// Nova chat response: `{"output": {"message": {"content": [{"text": ...}]}}}`
#[derive(Debug, Deserialize)]
pub struct NovaResponse {
    pub output: NovaOutput,
}

#[derive(Debug, Deserialize)]
pub struct NovaOutput {
    pub message: NovaMessage,
}

#[derive(Debug, Deserialize)]
pub struct NovaMessage {
    pub content: Vec<TextBlock>,
}

/// Anthropic messages response: `{"content": [{"type": "text", "text": ...}]}`
#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    pub content: Vec<TextBlock>,
}

/// Content block carrying generated text
#[derive(Debug, Deserialize)]
pub struct TextBlock {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_override() {
        let base = GenerationParams {
            max_output_tokens: Some(1000),
            temperature: Some(0.2),
            top_p: None,
        };
        let merged = base.merged_with(GenerationParams {
            temperature: Some(0.5),
            ..Default::default()
        });
        assert_eq!(merged.max_output_tokens, Some(1000));
        assert_eq!(merged.temperature, Some(0.5));
        assert_eq!(merged.top_p, None);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(GenerationParams::default().validate().is_ok());
        let bad = GenerationParams {
            top_p: Some(1.5),
            ..Default::default()
        };
        assert!(bad.validate().unwrap_err().contains("top_p"));
        let zero = GenerationParams {
            max_output_tokens: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_claude_response_ignores_block_type() {
        let json = r#"{"id":"msg_1","content":[{"type":"text","text":"Hi"}],"stop_reason":"end_turn"}"#;
        let resp: ClaudeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.content[0].text, "Hi");
    }
}
