//! Gas-limit elasticity policy
//!
//! Each block's gas limit may move only a bounded distance from its
//! parent's, and a concrete recommendation is computed from observed
//! usage. The arithmetic here is consensus-critical: the raw adjustment
//! range is an exclusive limit, and the ±1 corrections convert it to the
//! inclusive bounds validators agree on.

use crate::config::ProtocolParams;
use crate::error::{ChainError, Result};
use tracing::debug;

/// Inclusive legal range for a child block's gas limit, derived from one
/// parent gas limit. A computed value, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimitBounds {
    pub lower: u64,
    pub upper: u64,
}

/// Gas-limit rules parameterized by the protocol constants.
#[derive(Debug, Clone)]
pub struct GasLimitPolicy {
    params: ProtocolParams,
}

impl GasLimitPolicy {
    pub fn new(params: ProtocolParams) -> Self {
        GasLimitPolicy { params }
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Compute the inclusive [lower, upper] range the next gas limit may
    /// occupy, given the previous block's limit.
    ///
    /// For any `previous_limit` within the absolute [minimum, maximum]
    /// range, the result satisfies `lower <= previous_limit <= upper` and
    /// both bounds stay within the absolute range. Validated parameter
    /// sets keep the minimum at or above the adjustment factor, so the
    /// boundary range is never zero on that domain; inputs below the
    /// minimum (which no valid header records) are answered without
    /// panicking but carry no bracket guarantee.
    pub fn compute_bounds(&self, previous_limit: u64) -> GasLimitBounds {
        let boundary_range = previous_limit / self.params.gas_limit_adjustment_factor;

        // The boundary range is the exclusive limit, therefore the inclusive
        // bounds are (boundary_range - 1) and (boundary_range + 1) for upper
        // and lower bounds, respectively.
        let upper = self
            .params
            .gas_limit_maximum
            .min((previous_limit + boundary_range).saturating_sub(1));
        let lower = self
            .params
            .gas_limit_minimum
            .max(previous_limit.saturating_sub(boundary_range) + 1);
        GasLimitBounds { lower, upper }
    }

    /// Recommend a gas limit for the next block.
    ///
    /// For each block: decrease by 1/EMA of the parent's limit and
    /// increase proportionally to the parent's gas usage. A result below
    /// `genesis_limit` trends back up by the decay magnitude instead of
    /// the usage-based value; a result below the protocol minimum clamps
    /// to the minimum. The below-genesis branch is deliberate policy to
    /// avoid oscillation near the floor, not a simplification.
    ///
    /// `parent` is the parent block's `(gas_limit, gas_used)`; `None`
    /// means genesis, which returns `genesis_limit` unchanged. A valid
    /// parent limit sits at or above the configured minimum, which
    /// validated parameter sets keep at or above the EMA denominator, so
    /// the decay is nonzero and the pull-back branch never lands below
    /// the parent's limit.
    pub fn compute_next_limit(&self, parent: Option<(u64, u64)>, genesis_limit: u64) -> Result<u64> {
        let minimum = self.params.gas_limit_minimum;
        if genesis_limit < minimum {
            return Err(ChainError::InvalidArgument(format!(
                "Genesis gas limit {} is below the protocol minimum {}",
                genesis_limit, minimum
            )));
        }

        let (parent_limit, parent_used) = match parent {
            None => return Ok(genesis_limit),
            Some(state) => state,
        };

        let decay = parent_limit / self.params.gas_limit_ema_denominator;

        let usage_increase = if parent_used > 0 {
            // Widened: the usage product can exceed u64 near the ceiling.
            (u128::from(parent_used) * u128::from(self.params.gas_limit_usage_numerator)
                / u128::from(self.params.gas_limit_usage_denominator)
                / u128::from(self.params.gas_limit_ema_denominator)) as u64
        } else {
            0
        };

        // + 1 because the decay is an exclusive limit we have to remain inside of
        let gas_limit = minimum.max(parent_limit - decay + 1 + usage_increase);

        if gas_limit < minimum {
            Ok(minimum)
        } else if gas_limit < genesis_limit {
            debug!(gas_limit, genesis_limit, "recommendation below genesis floor, trending up");
            // - 1 because the decay is an exclusive limit we have to remain inside of
            Ok(parent_limit + decay - 1)
        } else {
            Ok(gas_limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> GasLimitPolicy {
        GasLimitPolicy::new(ProtocolParams::default())
    }

    #[test]
    fn test_bounds_bracket_previous_limit() {
        let policy = policy();
        let minimum = policy.params().gas_limit_minimum;
        let maximum = policy.params().gas_limit_maximum;

        // Representative sweep across the absolute range, edges included.
        let samples = [
            minimum,
            minimum + 1,
            10_000,
            1_000_000,
            8_000_000,
            1 << 32,
            maximum / 2,
            maximum - 1,
            maximum,
        ];
        for previous_limit in samples {
            let bounds = policy.compute_bounds(previous_limit);
            assert!(
                bounds.lower <= previous_limit && previous_limit <= bounds.upper,
                "bounds {:?} do not bracket {}",
                bounds,
                previous_limit
            );
            assert!(bounds.lower >= minimum);
            assert!(bounds.upper <= maximum);
        }
    }

    #[test]
    fn test_bounds_exclusive_to_inclusive_conversion() {
        let policy = policy();
        let bounds = policy.compute_bounds(1_024_000);
        // boundary_range = 1_024_000 / 1_024 = 1_000
        assert_eq!(bounds.upper, 1_024_000 + 1_000 - 1);
        assert_eq!(bounds.lower, 1_024_000 - 1_000 + 1);
    }

    #[test]
    fn test_bounds_clamp_at_absolute_minimum() {
        let policy = policy();
        let minimum = policy.params().gas_limit_minimum;
        let bounds = policy.compute_bounds(minimum);
        assert_eq!(bounds.lower, minimum);
    }

    #[test]
    fn test_bounds_clamp_at_absolute_maximum() {
        let policy = policy();
        let maximum = policy.params().gas_limit_maximum;
        let bounds = policy.compute_bounds(maximum);
        assert_eq!(bounds.upper, maximum);
    }

    #[test]
    fn test_genesis_limit_passes_through() {
        let policy = policy();
        assert_eq!(policy.compute_next_limit(None, 8_000_000).unwrap(), 8_000_000);
        assert_eq!(policy.compute_next_limit(None, 5_000).unwrap(), 5_000);
    }

    #[test]
    fn test_genesis_limit_below_minimum_rejected() {
        let policy = policy();
        let result = policy.compute_next_limit(None, 4_999);
        assert!(matches!(result, Err(ChainError::InvalidArgument(_))));

        // A bad genesis limit fails even when a parent exists.
        let result = policy.compute_next_limit(Some((1_000_000, 0)), 4_999);
        assert!(matches!(result, Err(ChainError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_parent_decays() {
        let policy = policy();
        // No usage: pure decay, so the limit must shrink.
        let next = policy
            .compute_next_limit(Some((1_000_000, 0)), 5_000)
            .unwrap();
        assert!(next < 1_000_000);
        // decay = 976, candidate = 1_000_000 - 976 + 1
        assert_eq!(next, 999_025);
    }

    #[test]
    fn test_saturated_parent_grows() {
        let policy = policy();
        // Fully used parent: usage increase outweighs the decay.
        let next = policy
            .compute_next_limit(Some((1_000_000, 1_000_000)), 5_000)
            .unwrap();
        assert!(next >= 1_000_000);
    }

    #[test]
    fn test_decay_clamps_at_minimum() {
        let policy = policy();
        let minimum = policy.params().gas_limit_minimum;
        // A parent at the floor with no usage cannot fall below it.
        let next = policy
            .compute_next_limit(Some((minimum, 0)), minimum)
            .unwrap();
        assert!(next >= minimum);
    }

    #[test]
    fn test_below_genesis_trends_back_up() {
        let policy = policy();
        // Parent below the genesis floor: the recommendation is the
        // decay-corrected pull-back, not the usage-based candidate.
        let parent_limit = 1_000_000u64;
        let genesis_limit = 2_000_000u64;
        let decay = parent_limit / policy.params().gas_limit_ema_denominator;
        let next = policy
            .compute_next_limit(Some((parent_limit, 0)), genesis_limit)
            .unwrap();
        assert_eq!(next, parent_limit + decay - 1);
        assert!(next > parent_limit);
    }

    #[test]
    fn test_usage_increase_arithmetic() {
        let policy = policy();
        let parent_limit = 8_000_000u64;
        let parent_used = 4_000_000u64;
        let decay = parent_limit / 1_024;
        let usage_increase = parent_used * 3 / 2 / 1_024;
        let expected = parent_limit - decay + 1 + usage_increase;
        let next = policy
            .compute_next_limit(Some((parent_limit, parent_used)), 5_000)
            .unwrap();
        assert_eq!(next, expected);
    }

    #[test]
    fn test_no_overflow_near_ceiling() {
        let policy = policy();
        let maximum = policy.params().gas_limit_maximum;
        // Saturated parent at the absolute ceiling must not overflow u64.
        let next = policy
            .compute_next_limit(Some((maximum, maximum)), 5_000)
            .unwrap();
        assert!(next > 0);
    }

    #[test]
    fn test_bounds_bracket_with_floor_at_divisors() {
        // The tightest loadable configuration: minimum equal to the
        // adjustment factor. The bracket property must hold at the floor.
        let params =
            ProtocolParams::from_toml_str("gas_limit_minimum = 1024\n").unwrap();
        let policy = GasLimitPolicy::new(params);

        for previous_limit in [1_024u64, 1_025, 2_047, 2_048, 10_000] {
            let bounds = policy.compute_bounds(previous_limit);
            assert!(
                bounds.lower <= previous_limit && previous_limit <= bounds.upper,
                "bounds {:?} do not bracket {}",
                bounds,
                previous_limit
            );
        }
    }

    #[test]
    fn test_pull_back_stays_at_or_above_minimum() {
        let params =
            ProtocolParams::from_toml_str("gas_limit_minimum = 1024\n").unwrap();
        let policy = GasLimitPolicy::new(params);

        // Parent just above the floor, below the genesis limit: the
        // pull-back must not fall under the minimum or the parent.
        let next = policy.compute_next_limit(Some((1_100, 0)), 2_048).unwrap();
        assert!(next >= 1_100);
        assert!(next >= policy.params().gas_limit_minimum);
    }

    #[test]
    fn test_bounds_degenerate_input_does_not_panic() {
        // Zero is outside any valid header's range; it must still be
        // answered rather than underflow.
        let bounds = policy().compute_bounds(0);
        assert!(bounds.lower >= 1);
    }

    #[test]
    fn test_custom_params_respected() {
        let params = ProtocolParams {
            gas_limit_minimum: 100,
            gas_limit_adjustment_factor: 10,
            gas_limit_ema_denominator: 10,
            ..Default::default()
        };
        let policy = GasLimitPolicy::new(params);

        let bounds = policy.compute_bounds(1_000);
        assert_eq!(bounds.upper, 1_000 + 100 - 1);
        assert_eq!(bounds.lower, 1_000 - 100 + 1);

        assert_eq!(policy.compute_next_limit(None, 100).unwrap(), 100);
        assert!(policy.compute_next_limit(None, 99).is_err());
    }
}
