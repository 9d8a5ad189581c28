use serde::Serialize;

use super::persona::{compose_prompt, Persona};

pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 1200;
pub const MAX_TOKENS_STEP: u32 = 50;
pub const DEFAULT_MAX_TOKENS: u32 = 350;

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 1.0;
pub const TEMPERATURE_STEP: f64 = 0.05;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// One prompt plus its generation budget. Built per submission, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Always within 100..=1200.
    pub max_tokens: u32,
    /// Always within 0.0..=1.0.
    pub temperature: f64,
}

impl GenerationRequest {
    /// Clamps the budget into the slider ranges.
    pub fn new(prompt: impl Into<String>, max_tokens: u32, temperature: f64) -> Self {
        let clamped_tokens = max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS);
        if clamped_tokens != max_tokens {
            tracing::warn!(requested = max_tokens, used = clamped_tokens, "max_tokens out of range");
        }

        let clamped_temp = if temperature.is_nan() {
            DEFAULT_TEMPERATURE
        } else {
            temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
        };
        if clamped_temp != temperature {
            tracing::warn!(requested = temperature, used = clamped_temp, "temperature out of range");
        }

        Self {
            prompt: prompt.into(),
            max_tokens: clamped_tokens,
            temperature: clamped_temp,
        }
    }

    pub fn for_persona(persona: Persona, user_input: &str, max_tokens: u32, temperature: f64) -> Self {
        Self::new(compose_prompt(persona, user_input), max_tokens, temperature)
    }

    /// JSON body of the generation call.
    pub fn payload(&self) -> GenerationPayload<'_> {
        GenerationPayload {
            input: &self.prompt,
            parameters: GenerationParameters {
                max_new_tokens: self.max_tokens,
                temperature: self.temperature,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerationPayload<'a> {
    pub input: &'a str,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_values_are_kept() {
        let req = GenerationRequest::new("p", 350, 0.2);
        assert_eq!(req.max_tokens, 350);
        assert_eq!(req.temperature, 0.2);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let low = GenerationRequest::new("p", 10, -0.5);
        assert_eq!(low.max_tokens, MIN_MAX_TOKENS);
        assert_eq!(low.temperature, MIN_TEMPERATURE);

        let high = GenerationRequest::new("p", 5000, 1.7);
        assert_eq!(high.max_tokens, MAX_MAX_TOKENS);
        assert_eq!(high.temperature, MAX_TEMPERATURE);
    }

    #[test]
    fn test_nan_temperature_uses_default() {
        let req = GenerationRequest::new("p", 350, f64::NAN);
        assert_eq!(req.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_payload_shape() {
        let req = GenerationRequest::new("hello", 400, 0.5);
        let json = serde_json::to_value(req.payload()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input": "hello",
                "parameters": { "max_new_tokens": 400, "temperature": 0.5 }
            })
        );
    }
}
