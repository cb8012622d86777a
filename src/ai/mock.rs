//! Scripted advisor model for tests and offline development

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;

use super::AdvisorModel;

/// Returns a canned answer and records every prompt it was given.
pub struct MockModel {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt submitted so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt lock poisoned").clone()
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new("This is a mock analysis. Configure GEMINI_API_KEY for real answers.")
    }
}

#[async_trait]
impl AdvisorModel for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompt lock poisoned")
            .push(prompt.to_string());
        Ok(self.response.clone())
    }
}
