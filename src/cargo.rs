//! Cargo hold pricing and capacity extension.

use crate::config::{CargoConfig, ExtendPricing};
use crate::error::EconomyError;
use crate::state::GameState;

/// Bundles already purchased at the given capacity.
#[must_use]
pub fn bundles_owned(cfg: &CargoConfig, capacity: u32) -> u32 {
    if cfg.extend_step == 0 {
        return 0;
    }
    capacity.saturating_sub(cfg.base_capacity) / cfg.extend_step
}

/// Price of the next capacity extension at the given capacity.
///
/// Linear: `base + base * factor * bundles`. Exponential:
/// `base * factor^bundles`. The first extension costs the base either way.
#[must_use]
pub fn extend_cost(cfg: &CargoConfig, capacity: u32) -> i64 {
    let bundles = bundles_owned(cfg, capacity);
    let base = cfg.extend_base_cost as f64;
    let raw = match cfg.extend_pricing {
        ExtendPricing::Linear => base + base * cfg.extend_cost_factor * f64::from(bundles),
        ExtendPricing::Exponential => base * cfg.extend_cost_factor.powi(bundles as i32),
    };
    #[allow(clippy::cast_possible_truncation)]
    let cost = raw.round() as i64;
    cost.max(cfg.extend_base_cost)
}

/// Receipt for one capacity extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExtension {
    pub new_capacity: u32,
    pub cost_paid: i64,
    /// What the bundle after this one will cost.
    pub next_cost: i64,
}

/// Buys one capacity extension. Atomic: either the fee is paid and the
/// capacity grows by one step, or nothing changes.
pub fn extend_capacity(
    state: &mut GameState,
    cfg: &CargoConfig,
) -> Result<CapacityExtension, EconomyError> {
    let cost = extend_cost(cfg, state.capacity);
    if cost > state.cash {
        return Err(EconomyError::InsufficientFunds {
            needed: cost,
            have: state.cash,
        });
    }
    state.cash -= cost;
    state.capacity += cfg.extend_step;
    let capacity = state.capacity;
    state.log_info(
        "cargo",
        &format!("Cargo hold extended to {capacity} slots for ${cost}"),
    );
    Ok(CapacityExtension {
        new_capacity: capacity,
        cost_paid: cost,
        next_cost: extend_cost(cfg, capacity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::default_cities;

    #[test]
    fn linear_curve_matches_bundle_count() {
        let cfg = CargoConfig::default();
        assert_eq!(extend_cost(&cfg, 50), 10_000);
        assert_eq!(extend_cost(&cfg, 60), 30_000);
        assert_eq!(extend_cost(&cfg, 70), 50_000);
    }

    #[test]
    fn exponential_curve_doubles_per_bundle() {
        let cfg = CargoConfig {
            extend_pricing: ExtendPricing::Exponential,
            ..CargoConfig::default()
        };
        assert_eq!(extend_cost(&cfg, 50), 10_000);
        assert_eq!(extend_cost(&cfg, 60), 20_000);
        assert_eq!(extend_cost(&cfg, 80), 80_000);
    }

    #[test]
    fn extension_is_atomic() {
        let cfg = CargoConfig::default();
        let mut state = GameState::new(default_cities(), cfg.base_capacity);
        state.cash = 9_999;

        let err = extend_capacity(&mut state, &cfg).unwrap_err();
        assert!(matches!(err, EconomyError::InsufficientFunds { .. }));
        assert_eq!(state.capacity, 50);
        assert_eq!(state.cash, 9_999);

        state.cash = 10_000;
        let receipt = extend_capacity(&mut state, &cfg).unwrap();
        assert_eq!(
            receipt,
            CapacityExtension {
                new_capacity: 60,
                cost_paid: 10_000,
                next_cost: 30_000,
            }
        );
        assert_eq!(state.capacity, 60);
        assert_eq!(state.cash, 0);
    }

    #[test]
    fn successive_extensions_reprice() {
        let cfg = CargoConfig::default();
        let mut state = GameState::new(default_cities(), cfg.base_capacity);
        state.cash = 100_000;
        assert_eq!(extend_capacity(&mut state, &cfg).unwrap().cost_paid, 10_000);
        let receipt = extend_capacity(&mut state, &cfg).unwrap();
        assert_eq!(receipt.cost_paid, 30_000);
        assert_eq!(receipt.next_cost, 50_000);
        assert_eq!(state.capacity, 70);
        assert_eq!(state.cash, 60_000);
    }
}
