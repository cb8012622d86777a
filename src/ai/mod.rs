//! Generative-AI advisory layer
//!
//! A fixed prompt template embeds the property details and the caller's
//! question; the model's raw text answer is relayed unmodified.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiClient;
pub use mock::MockModel;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Property;

/// The model behind property Q&A. Could be Gemini or a test script.
#[async_trait]
pub trait AdvisorModel: Send + Sync {
    /// Submit a prompt and return the completion text unmodified.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the analysis prompt for a property and question.
///
/// Address, price and deal type are dereferenced directly and must be
/// present; only the description defaults to a placeholder.
pub fn build_prompt(property: &Property, question: &str) -> Result<String> {
    let address = property
        .address
        .as_deref()
        .ok_or(Error::MissingField("address"))?;
    let price = property
        .price
        .as_ref()
        .ok_or(Error::MissingField("price"))?;
    let deal_type = property
        .deal_type
        .as_deref()
        .ok_or(Error::MissingField("dealType"))?;
    let description = property.description.as_deref().unwrap_or("N/A");

    Ok(format!(
        r#"As a real estate investment expert, analyze this property and answer the following question:

Property Details:
- Address: {address}
- Price: ${price}
- Deal Type: {deal_type}
- Description: {description}

Question: {question}

Please provide a detailed analysis considering market conditions, potential risks, and opportunities."#,
        price = render_price(price),
    ))
}

/// Prices arrive as numbers or strings; render both without JSON quoting.
fn render_price(price: &Value) -> String {
    match price {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
