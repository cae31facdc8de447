//! Advice generation: turns the computed pricing figures into a prompt,
//! sends it to an OpenAI-style chat-completions endpoint, and returns the
//! generated coaching text.
//!
//! Strictly downstream of the engine: it reads one snapshot of the engine's
//! output at request time and performs no computation of its own. A
//! client-side cooldown caps how often the upstream API can be hit.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::AdvisorConfig;
use crate::error::AppError;
use crate::models::{CalculatedPricing, CalculationMode, ProductConfig};

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

pub struct Advisor {
    config: AdvisorConfig,
    client: Client,
    last_call: Mutex<Option<Instant>>,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            last_call: Mutex::new(None),
        }
    }

    /// Generate pricing advice for the given snapshot.
    pub async fn advise(
        &self,
        product: &ProductConfig,
        pricing: &CalculatedPricing,
    ) -> Result<String, AppError> {
        if !self.config.enabled || self.config.api_key.is_empty() {
            return Err(AppError::AdvisorDisabled(
                "advice generation is not configured (set advisor.enabled and advisor.api_key)"
                    .to_string(),
            ));
        }

        self.reserve_slot().await?;

        let prompt = build_prompt(product, pricing);
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        tracing::info!(model = %self.config.model, product = %product.name, "Requesting pricing advice");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError {
                status,
                message: error_text,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError {
                status: reqwest::StatusCode::BAD_GATEWAY,
                message: format!("Malformed completion response: {}", e),
            })?;

        let advice = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::UpstreamError {
                status: reqwest::StatusCode::BAD_GATEWAY,
                message: "Completion response contained no text".to_string(),
            })?;

        Ok(advice)
    }

    /// Enforce the minimum interval between upstream calls. The slot is
    /// taken when the call starts; a failed call still consumes it.
    async fn reserve_slot(&self) -> Result<(), AppError> {
        let cooldown = Duration::from_secs(self.config.cooldown_seconds);
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < cooldown {
                let remaining = (cooldown - elapsed).as_secs().max(1);
                return Err(AppError::AdviceCooldown(format!(
                    "please wait {}s before requesting advice again",
                    remaining
                )));
            }
        }

        *last_call = Some(Instant::now());
        Ok(())
    }
}

const SYSTEM_PROMPT: &str = "You are a pricing coach for small product makers. \
Given a product's cost breakdown and pricing strategy, give short, concrete \
advice: whether the price is sustainable, what stands out in the cost \
structure, and one or two actionable suggestions. Answer in plain prose.";

/// Serialize the engine output into the natural-language prompt.
/// Every number the coaching text may refer to is spelled out here; the
/// model receives no other data.
pub fn build_prompt(product: &ProductConfig, pricing: &CalculatedPricing) -> String {
    let product_name = if product.name.trim().is_empty() {
        "(unnamed product)"
    } else {
        product.name.trim()
    };

    let strategy = match product.mode {
        CalculationMode::Margin => format!(
            "target margin of {:.1}% of the final price",
            product.target_margin
        ),
        CalculationMode::Price => format!("fixed target price of {:.2}", product.target_price),
    };

    format!(
        "Product: {name}\n\
         Cost breakdown per unit:\n\
         - materials: {materials:.2}\n\
         - packaging: {packaging:.2}\n\
         - labor: {labor:.2} (hourly rate {rate:.2})\n\
         - other fees: {fees:.2}\n\
         - total base cost: {base:.2}\n\
         Pricing strategy: {strategy}\n\
         Price before discount: {final_price:.2}\n\
         Discount: {discount:.1}%\n\
         Final price: {discounted:.2}\n\
         Profit per unit: {profit:.2}\n\
         Margin: {margin:.1}%",
        name = product_name,
        materials = pricing.material_cost,
        packaging = pricing.packaging_cost,
        labor = pricing.labor_cost,
        rate = product.hourly_rate,
        fees = pricing.fees_cost,
        base = pricing.base_cost,
        strategy = strategy,
        final_price = pricing.final_price,
        discount = product.discount,
        discounted = pricing.discounted_price,
        profit = pricing.profit,
        margin = pricing.margin,
    )
}
