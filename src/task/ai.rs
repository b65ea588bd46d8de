use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EngineConfig;
use crate::error::TaskError;
use crate::llm::{CompletionProvider, CompletionRequest};
use crate::prompt::PromptContextBuilder;

use super::{ResultMap, TaskConfig, TaskData, TaskHandler, TaskResult};

/// Task type handled by [`AiTaskHandler`].
pub const AI_TASK_TYPE: &str = "aiTask";

/// Built-in handler for AI completion nodes.
///
/// Builds the effective prompt from upstream results, makes exactly one
/// provider call (no retries at this layer), and normalizes provider
/// failures into failed results with a human-readable message.
pub struct AiTaskHandler {
    provider: Arc<dyn CompletionProvider>,
    prompts: PromptContextBuilder,
    config: EngineConfig,
}

impl AiTaskHandler {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            prompts: PromptContextBuilder::new(),
            config,
        }
    }
}

#[async_trait]
impl TaskHandler for AiTaskHandler {
    async fn execute(
        &self,
        config: &TaskConfig,
        previous: &ResultMap,
    ) -> Result<TaskResult, TaskError> {
        let params = &config.parameters;
        let prompt = self.prompts.build(
            &params.prompt,
            &config.node_id,
            params.inject_context,
            previous,
        );

        let request = CompletionRequest {
            model: params
                .model
                .clone()
                .unwrap_or_else(|| self.config.default_model.clone()),
            prompt,
            max_tokens: Some(params.max_tokens.unwrap_or(self.config.default_max_tokens)),
            temperature: Some(
                params
                    .temperature
                    .unwrap_or(self.config.default_temperature),
            ),
            api_key: config.api_key.clone(),
        };

        match self.provider.complete(request).await {
            Ok(response) => Ok(TaskResult::succeeded(
                &config.node_id,
                TaskData {
                    text: response.text,
                    tokens: response.total_tokens,
                    model: response.model,
                },
            )),
            Err(e) => Ok(TaskResult::failed(
                &config.node_id,
                format!("Completion request failed: {}", e),
            )),
        }
    }
}
