//! Token usage accounting for text-generation calls
//!
//! Each [`ClaudeClient`](super::ClaudeClient) owns one accountant. A call
//! overwrites the recorded total; it is never accumulated across calls.

use serde::{Deserialize, Serialize};

const TOKENS_PER_MILLION: f64 = 1_000_000.0;
const COST_DECIMALS: usize = 4;

/// Per-million-token rates and the assumed input/output split.
///
/// The API reports a single total per call, so the split is an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default = "default_input_per_million")]
    pub input_per_million: f64,
    #[serde(default = "default_output_per_million")]
    pub output_per_million: f64,
    #[serde(default = "default_input_share")]
    pub input_share: f64,
    #[serde(default = "default_output_share")]
    pub output_share: f64,
}

fn default_input_per_million() -> f64 {
    3.00
}
fn default_output_per_million() -> f64 {
    15.00
}
fn default_input_share() -> f64 {
    0.7
}
fn default_output_share() -> f64 {
    0.3
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_million: default_input_per_million(),
            output_per_million: default_output_per_million(),
            input_share: default_input_share(),
            output_share: default_output_share(),
        }
    }
}

/// Tracks the token total of the most recent generation call.
#[derive(Debug, Clone, Default)]
pub struct UsageAccountant {
    tokens_used: u64,
    pricing: Pricing,
}

impl UsageAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing(pricing: Pricing) -> Self {
        Self {
            tokens_used: 0,
            pricing,
        }
    }

    /// Store the total for the latest call, replacing the previous value.
    pub fn record_usage(&mut self, total_tokens: u64) {
        self.tokens_used = total_tokens;
    }

    pub fn tokens_used(&self) -> u64 {
        self.tokens_used
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Estimated cost of the recorded call, rounded to 4 decimal places.
    ///
    /// Input and output shares are floored independently, so they need not
    /// add back up to the recorded total.
    pub fn estimate_cost(&self) -> f64 {
        let total = self.tokens_used as f64;
        let input_tokens = (total * self.pricing.input_share).floor();
        let output_tokens = (total * self.pricing.output_share).floor();

        let input_cost = input_tokens / TOKENS_PER_MILLION * self.pricing.input_per_million;
        let output_cost = output_tokens / TOKENS_PER_MILLION * self.pricing.output_per_million;

        round_to(input_cost + output_cost, COST_DECIMALS)
    }

    pub fn reset(&mut self) {
        self.tokens_used = 0;
    }
}

/// Rounds the exact binary value of `value`, not a scaled copy of it
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}
