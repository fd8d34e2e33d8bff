//! StatValue - The five-phase modifier container (Add → MultiplyBase → MultiplyTotal → Average)

use super::StatOp;
use serde::{Deserialize, Serialize};

/// Collected modifiers for one stat
///
/// Final value is calculated as:
/// `((base + Σadd + base × Σadd_multiplied) × Π(1 + multiply_base)) × (1 + Σmultiply_total) + mean(average)`
///
/// - `base`: The stat's catalog base value
/// - `add`: Sum of all flat additions
/// - `add_multiplied`: Sum of base-relative additions (as decimal, 0.25 = +25% of base)
/// - `multiply_base`: Compounding multipliers, applied in collection order
/// - `multiply_total`: Sum of multipliers against the finished total, applied once
/// - `average`: Samples whose arithmetic mean is added last
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatValue {
    pub base: f64,
    pub add: f64,
    pub add_multiplied: f64,
    pub multiply_base: Vec<f64>,
    pub multiply_total: f64,
    pub average: Vec<f64>,
}

impl StatValue {
    /// Create a new StatValue with the given base
    pub fn with_base(base: f64) -> Self {
        StatValue {
            base,
            ..StatValue::default()
        }
    }

    /// Route a modifier magnitude to its phase
    pub fn push(&mut self, op: StatOp, magnitude: f64) {
        match op {
            StatOp::Add => self.add += magnitude,
            StatOp::AddMultiplied => self.add_multiplied += magnitude,
            StatOp::MultiplyBase => self.multiply_base.push(magnitude),
            StatOp::MultiplyTotal => self.multiply_total += magnitude,
            StatOp::Average => self.average.push(magnitude),
        }
    }

    /// Calculate the unclamped final value
    pub fn compute(&self) -> f64 {
        let mut value = StatOp::Add.apply(self.base, self.add) + self.base * self.add_multiplied;
        for m in &self.multiply_base {
            value = StatOp::MultiplyBase.apply(value, *m);
        }
        value = StatOp::MultiplyTotal.apply(value, self.multiply_total);
        if let Some(mean) = self.average_mean() {
            value = StatOp::Average.apply(value, mean);
        }
        value
    }

    /// Get the additive baseline (base + flat + base-relative additions)
    pub fn total_additive(&self) -> f64 {
        self.base + self.add + self.base * self.add_multiplied
    }

    /// Get the product of all multiply-base factors
    pub fn total_multiply_base(&self) -> f64 {
        self.multiply_base.iter().map(|m| 1.0 + m).product()
    }

    /// Mean of the average samples, if any were collected
    pub fn average_mean(&self) -> Option<f64> {
        if self.average.is_empty() {
            return None;
        }
        Some(self.average.iter().sum::<f64>() / self.average.len() as f64)
    }
}
