//! Bounded retry loop around one structured model call.

use crate::error::GenerationError;
use crate::generation::schema::{parse_response, StructuredOutput};
use crate::pipeline::PipelineStage;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use std::sync::Arc;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are an accomplished novelist and storyteller. \
Follow the requested output format exactly and answer only with the requested JSON.";

/// Sends a rendered prompt and parses the reply into `T`, retrying parse failures.
pub struct GenerationCaller {
    client: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
    max_attempts: u32,
}

impl GenerationCaller {
    /// `max_attempts` is the total number of model calls per stage; values below 1 become 1.
    pub fn new(client: Arc<dyn ModelProviderClient>, options: CompletionOptions, max_attempts: u32) -> Self {
        Self {
            client,
            options,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Call the model until the reply parses as `T` or the attempt budget runs out.
    ///
    /// Transport failures are returned on the spot. Each attempt sends the same prompt.
    pub async fn call<T: StructuredOutput>(
        &self,
        stage: PipelineStage,
        prompt: &str,
    ) -> Result<T, GenerationError> {
        let mut last_reason = String::new();
        let mut last_raw = String::new();

        for attempt in 1..=self.max_attempts {
            debug!(
                stage = %stage,
                attempt,
                max_attempts = self.max_attempts,
                schema = T::SCHEMA.name,
                "Calling model"
            );
            let messages = vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt),
            ];
            let response = self.client.complete(messages, self.options.clone()).await?;

            match parse_response::<T>(&response.content) {
                Ok(parsed) => {
                    debug!(stage = %stage, attempt, "Model output accepted");
                    return Ok(parsed);
                }
                Err(reason) => {
                    warn!(
                        stage = %stage,
                        attempt,
                        max_attempts = self.max_attempts,
                        reason = %reason,
                        "Model output did not match schema"
                    );
                    last_reason = reason;
                    last_raw = response.content;
                }
            }
        }

        Err(GenerationError::Parse {
            schema: T::SCHEMA.name,
            attempts: self.max_attempts,
            reason: last_reason,
            raw_response: last_raw,
        })
    }
}
