use sqlx::PgPool;
use uuid::Uuid;

use crate::db::text_generation_queries;
use crate::errors::AppError;
use crate::models::llm::CompletionRequest;
use crate::models::{CreateTextGeneration, GenerationParameters, TextGenerationResult};
use crate::services::llm_service::LlmProvider;
use crate::services::request_tracker::{RequestTracker, TEXT_GENERATION_SERVICE};

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

fn completion_request(prompt: &str, model: &str, parameters: GenerationParameters) -> CompletionRequest {
    CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        prompt: prompt.to_string(),
        model: model.to_string(),
        max_tokens: parameters.max_tokens,
        temperature: parameters.temperature,
    }
}

pub struct TextGenerationService<'a> {
    pool: &'a PgPool,
    llm: &'a dyn LlmProvider,
}

impl<'a> TextGenerationService<'a> {
    pub fn new(pool: &'a PgPool, llm: &'a dyn LlmProvider) -> Self {
        Self { pool, llm }
    }

    /// Generate a completion for `prompt` and store it.
    ///
    /// Provider failures (including a missing API key) are recorded on the
    /// request and returned as [`AppError::Llm`].
    pub async fn generate(
        &self,
        prompt: &str,
        parameters: GenerationParameters,
        user_id: Option<Uuid>,
    ) -> Result<TextGenerationResult, AppError> {
        let tracker = RequestTracker::for_service(self.pool, TEXT_GENERATION_SERVICE).await?;
        let model = self.llm.default_model().to_string();

        tracker
            .track(user_id, prompt, async {
                let completion = self
                    .llm
                    .complete(completion_request(prompt, &model, parameters))
                    .await?;

                let stored = text_generation_queries::insert(
                    self.pool,
                    CreateTextGeneration {
                        prompt: prompt.to_string(),
                        generated_text: completion.content.clone(),
                        model_used: model.clone(),
                        parameters,
                    },
                )
                .await?;

                Ok::<_, AppError>(TextGenerationResult {
                    generated_text: completion.content,
                    model_used: model.clone(),
                    parameters,
                    generation_id: stored.id,
                })
            })
            .await
    }
}
