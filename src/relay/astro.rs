use tracing::info;

use super::Relay;
use super::prompts::{Lang, astro_system_prompt};
use crate::error::{AppError, AppResult};
use crate::models::AstroRequest;
use crate::upstream::CompletionRequest;

impl Relay {
    /// Validates a birth chart and builds its completion request.
    ///
    /// The user message is the projected chart as pretty-printed JSON.
    pub fn astro_completion(&self, request: &AstroRequest) -> AppResult<CompletionRequest> {
        let chart = request.chart_prompt()?;
        let lang = Lang::from_tag(request.lang.as_deref());
        let user = serde_json::to_string_pretty(&chart)
            .map_err(|e| AppError::Internal(format!("failed to serialize chart: {e}")))?;

        Ok(self.completion(
            &self.config.astro,
            request.model.as_deref(),
            astro_system_prompt(lang),
            user,
        ))
    }

    /// Interprets a precomputed natal chart.
    pub async fn astro(&self, request: &AstroRequest) -> AppResult<String> {
        let completion = self.astro_completion(request)?;
        info!("Relaying natal chart to {}", completion.model);
        self.send(completion).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::relay::prompts::{ASTRO_SYSTEM_EN, ASTRO_SYSTEM_RO};
    use serde_json::{Value, json};

    fn relay(pairs: &[(&str, &str)]) -> Relay {
        Relay::new(Config::from_pairs(pairs).unwrap().upstream).unwrap()
    }

    fn request(body: Value) -> AstroRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_astro_completion_default_language() {
        let relay = relay(&[]);
        let completion = relay
            .astro_completion(&request(json!({
                "birthChart": { "planets": [{ "name": "Sun", "sign": "Leo", "degree": 12.3 }] }
            })))
            .unwrap();

        assert_eq!(completion.system, ASTRO_SYSTEM_RO);
        let user: Value = serde_json::from_str(&completion.user).unwrap();
        assert_eq!(
            user,
            json!({ "planets": [{ "name": "Sun", "sign": "Leo", "degree": 12.3 }] })
        );
        assert_eq!(completion.max_tokens, relay.config().astro.max_tokens);
        assert!(completion.timeout > relay.config().magicball.timeout);
    }

    #[test]
    fn test_astro_completion_english_with_focus() {
        let relay = relay(&[("OPENAI_ASTRO_MODEL", "gpt-4o")]);
        let completion = relay
            .astro_completion(&request(json!({
                "birthChart": {
                    "planets": [{ "name": "Moon", "sign": "Cancer", "degree": 1.5, "house": 4 }],
                    "houses": [{ "house": 1, "sign": "Aries" }]
                },
                "lang": "EN",
                "question": " relationships "
            })))
            .unwrap();

        assert_eq!(completion.system, ASTRO_SYSTEM_EN);
        assert_eq!(completion.model, "gpt-4o");
        let user: Value = serde_json::from_str(&completion.user).unwrap();
        assert_eq!(user["focus"], "relationships");
        assert_eq!(user["houses"], json!([{ "house": 1, "sign": "Aries" }]));
        assert!(user["planets"][0].get("house").is_none());
    }

    #[test]
    fn test_astro_completion_requires_planets() {
        let relay = relay(&[]);
        let err = relay
            .astro_completion(&request(json!({ "birthChart": { "planets": [] } })))
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(msg) if msg == "Missing birthChart.planets"));
    }
}
