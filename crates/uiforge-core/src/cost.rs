//! Token cost estimates under a per-1K-token pricing model.

use serde::{Deserialize, Serialize};

use uiforge_config::PricingConfig;

use crate::llm::types::Usage;

/// Default price per 1K input tokens.
pub const DEFAULT_INPUT_COST_PER_1K: f64 = 0.003;
/// Default price per 1K output tokens.
pub const DEFAULT_OUTPUT_COST_PER_1K: f64 = 0.015;

/// Fixed input/output token rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingModel {
    pub input_cost_per_1k: f64,
    pub output_cost_per_1k: f64,
}

impl Default for PricingModel {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_COST_PER_1K, DEFAULT_OUTPUT_COST_PER_1K)
    }
}

impl PricingModel {
    pub fn new(input_cost_per_1k: f64, output_cost_per_1k: f64) -> Self {
        Self {
            input_cost_per_1k,
            output_cost_per_1k,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.input_cost_per_1k, config.output_cost_per_1k)
    }

    /// Cost of the given token counts.
    pub fn calculate(&self, input_tokens: u64, output_tokens: u64) -> CostBreakdown {
        let input_cost = input_tokens as f64 / 1000.0 * self.input_cost_per_1k;
        let output_cost = output_tokens as f64 / 1000.0 * self.output_cost_per_1k;
        CostBreakdown {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    /// Cost of an optional usage record; absent usage costs nothing.
    pub fn calculate_usage(&self, usage: Option<&Usage>) -> CostBreakdown {
        match usage {
            Some(u) => self.calculate(u.input_tokens, u.output_tokens),
            None => CostBreakdown::default(),
        }
    }
}

/// Itemised cost of a token count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Usage summary of one conversation, as returned to callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub api_calls: u32,
    pub estimated_cost: f64,
}

impl TokenUsage {
    /// Snapshot conversation totals and price them.
    pub fn from_totals(
        input_tokens: u64,
        output_tokens: u64,
        api_calls: u32,
        pricing: &PricingModel,
    ) -> Self {
        let cost = pricing.calculate(input_tokens, output_tokens);
        Self {
            input_tokens,
            output_tokens,
            total_tokens: cost.total_tokens,
            api_calls,
            estimated_cost: cost.total_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_usage_costs_nothing() {
        let cost = PricingModel::default().calculate(0, 0);
        assert_eq!(cost, CostBreakdown::default());
        assert_eq!(cost.total_cost, 0.0);
    }

    #[test]
    fn test_absent_usage_costs_nothing() {
        let cost = PricingModel::default().calculate_usage(None);
        assert_eq!(cost, CostBreakdown::default());
    }

    #[test]
    fn test_one_thousand_tokens_each() {
        let pricing = PricingModel::default();
        let cost = pricing.calculate(1000, 1000);
        assert_eq!(cost.input_cost, DEFAULT_INPUT_COST_PER_1K);
        assert_eq!(cost.output_cost, DEFAULT_OUTPUT_COST_PER_1K);
        assert_eq!(
            cost.total_cost,
            DEFAULT_INPUT_COST_PER_1K + DEFAULT_OUTPUT_COST_PER_1K
        );
        assert_eq!(cost.total_tokens, 2000);
    }

    #[test]
    fn test_custom_rates_from_config() {
        let pricing = PricingModel::from_config(&PricingConfig {
            input_cost_per_1k: 1.0,
            output_cost_per_1k: 2.0,
        });
        let cost = pricing.calculate_usage(Some(&Usage {
            input_tokens: 500,
            output_tokens: 250,
        }));
        assert_eq!(cost.input_cost, 0.5);
        assert_eq!(cost.output_cost, 0.5);
        assert_eq!(cost.total_cost, 1.0);
    }

    #[test]
    fn test_token_usage_totals() {
        let usage = TokenUsage::from_totals(1200, 300, 3, &PricingModel::new(1.0, 2.0));
        assert_eq!(usage.total_tokens, usage.input_tokens + usage.output_tokens);
        assert_eq!(usage.api_calls, 3);
        assert_eq!(usage.estimated_cost, 1.2 + 0.6);
    }

    #[test]
    fn test_token_usage_wire_names() {
        let usage = TokenUsage::from_totals(0, 0, 1, &PricingModel::default());
        let wire = serde_json::to_value(usage).unwrap();
        for key in ["inputTokens", "outputTokens", "totalTokens", "apiCalls", "estimatedCost"] {
            assert!(wire.get(key).is_some(), "missing {key}");
        }
    }
}
