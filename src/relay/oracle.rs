use tracing::info;

use super::Relay;
use super::prompts::{Lang, oracle_system_prompt};
use crate::error::AppResult;
use crate::models::OracleRequest;
use crate::upstream::CompletionRequest;

impl Relay {
    /// Validates an oracle question and builds its completion request.
    pub fn oracle_completion(&self, request: &OracleRequest) -> AppResult<CompletionRequest> {
        let question = request.validated_question()?;
        let lang = Lang::from_tag(request.lang.as_deref());

        Ok(self.completion(
            &self.config.magicball,
            request.model.as_deref(),
            oracle_system_prompt(lang),
            question.to_string(),
        ))
    }

    /// Answers a free-form question through the symbolic oracle persona.
    pub async fn magicball(&self, request: &OracleRequest) -> AppResult<String> {
        let completion = self.oracle_completion(request)?;
        info!(
            "Relaying oracle question ({} chars) to {}",
            completion.user.chars().count(),
            completion.model
        );
        self.send(completion).await
    }
}
