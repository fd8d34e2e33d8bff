//! Synergy - how well the tiers of an assembly's parts fit together

use crate::config::SynergyConstants;

/// Pluggable synergy formula
///
/// Receives the MAIN part's tier and the tiers of every other root part.
/// Implementations must return a value inside their own bounded range and
/// 1.0 when either input is absent.
pub trait SynergyFormula: Send + Sync {
    fn synergy(&self, main_tier: Option<u32>, other_tiers: &[u32]) -> f64;
}

/// Default formula: rewards parts above the main tier, penalizes spread
///
/// With deviations `d = other - main`, mean `μ` and variance `σ²`:
/// `clamp(1 + tier_bonus × μ - variance_penalty × σ², min, max)`
#[derive(Debug, Clone, PartialEq)]
pub struct TierVarianceSynergy {
    pub tier_bonus: f64,
    pub variance_penalty: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for TierVarianceSynergy {
    fn default() -> Self {
        TierVarianceSynergy::from(&SynergyConstants::default())
    }
}

impl From<&SynergyConstants> for TierVarianceSynergy {
    fn from(c: &SynergyConstants) -> Self {
        TierVarianceSynergy {
            tier_bonus: c.tier_bonus,
            variance_penalty: c.variance_penalty,
            min: c.min,
            max: c.max,
        }
    }
}

impl SynergyFormula for TierVarianceSynergy {
    fn synergy(&self, main_tier: Option<u32>, other_tiers: &[u32]) -> f64 {
        let Some(main) = main_tier else {
            return 1.0;
        };
        if other_tiers.is_empty() {
            return 1.0;
        }

        let n = other_tiers.len() as f64;
        let deviations: Vec<f64> = other_tiers
            .iter()
            .map(|t| *t as f64 - main as f64)
            .collect();
        let mean = deviations.iter().sum::<f64>() / n;
        let variance = deviations.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;

        let raw = 1.0 + self.tier_bonus * mean - self.variance_penalty * variance;
        // min wins when the bounds are inverted
        raw.min(self.max).max(self.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_inputs_are_neutral() {
        let formula = TierVarianceSynergy::default();
        assert!((formula.synergy(None, &[1, 2]) - 1.0).abs() < f64::EPSILON);
        assert!((formula.synergy(Some(2), &[]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_matching_tiers_are_neutral() {
        let formula = TierVarianceSynergy::default();
        assert!((formula.synergy(Some(3), &[3, 3, 3]) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_spread_is_penalized() {
        let formula = TierVarianceSynergy::default();
        let tight = formula.synergy(Some(2), &[2, 2]);
        let spread = formula.synergy(Some(2), &[0, 4]);
        assert!(spread < tight);
    }

    #[test]
    fn test_result_is_bounded() {
        let formula = TierVarianceSynergy::default();
        let low = formula.synergy(Some(0), &[0, 50]);
        let high = formula.synergy(Some(0), &[40, 40, 40]);
        assert!(low >= formula.min);
        assert!(high <= formula.max);
    }

    #[test]
    fn test_inverted_bounds_do_not_panic() {
        let formula = TierVarianceSynergy {
            min: 1.2,
            max: 0.8,
            ..TierVarianceSynergy::default()
        };
        assert!((formula.synergy(Some(1), &[1, 1]) - 1.2).abs() < f64::EPSILON);
        assert!((formula.synergy(Some(0), &[0, 50]) - 1.2).abs() < f64::EPSILON);
    }
}
