//! Turn orchestration: the daily pipeline and city-to-city travel.

use rand::Rng;
use smallvec::SmallVec;

use crate::assets::{generate_asset_prices, Asset};
use crate::bank;
use crate::config::GameConfig;
use crate::error::EconomyError;
use crate::events::{trigger_events, EventContext, EventOutcome, EventSpec};
use crate::goods::{generate_prices, Good};
use crate::portfolio;
use crate::seed::RngBundle;
use crate::state::GameState;

fn regenerate_goods_prices(
    state: &mut GameState,
    goods: &[Good],
    cfg: &GameConfig,
    rng: &mut impl Rng,
) {
    let city = state.current_city().clone();
    let mut modifiers = std::mem::take(&mut state.price_modifiers);
    state.goods_prices = generate_prices(goods, &city, &mut modifiers, &cfg.pricing, rng);
}

/// Runs the daily pipeline in ledger order: clock, rates, loan interest,
/// bank interest, lot aging, goods prices, asset prices.
pub fn advance_day(
    state: &mut GameState,
    cfg: &GameConfig,
    goods: &[Good],
    assets: &[Asset],
    rngs: &mut RngBundle,
) {
    state.clock.advance_day();
    bank::randomize_loan_offer(state, &cfg.bank, &mut rngs.rates);
    bank::accrue_loan_interest(state);
    bank::accrue_bank_interest(state, &cfg.bank, &mut rngs.rates);
    portfolio::age_lots(state);
    regenerate_goods_prices(state, goods, cfg, &mut rngs.market);
    state.asset_prices = generate_asset_prices(assets, &cfg.pricing, &mut rngs.market);
}

/// Travel fee for the current load.
#[must_use]
pub fn travel_fee(state: &GameState, cfg: &GameConfig) -> i64 {
    cfg.travel.base_fee
        + cfg
            .travel
            .fee_per_cargo_unit
            .saturating_mul(i64::from(state.used_slots()))
}

/// Travels to another city and plays out the arrival.
///
/// The fee is charged up front; if cash cannot cover it nothing changes.
/// After the move the daily pipeline runs, arrival events fire, any
/// modifiers they set are folded into a fresh price pass, and scheduled
/// dividends pay out. Returns the events that fired.
pub fn travel_to(
    state: &mut GameState,
    cfg: &GameConfig,
    goods: &[Good],
    assets: &[Asset],
    registry: &[EventSpec],
    rngs: &mut RngBundle,
    city_index: usize,
) -> Result<SmallVec<[EventOutcome; 4]>, EconomyError> {
    if city_index >= state.cities.len() {
        return Err(EconomyError::UnknownItem {
            name: format!("city #{city_index}"),
        });
    }
    let fee = travel_fee(state, cfg);
    if fee > state.cash {
        return Err(EconomyError::InsufficientFunds {
            needed: fee,
            have: state.cash,
        });
    }
    state.cash -= fee;
    state.city_index = city_index;
    let city = state.city_name().to_string();
    state.log_info("travel", &format!("Paid ${fee} and set out for {city}"));

    advance_day(state, cfg, goods, assets, rngs);

    let ctx = EventContext {
        goods,
        assets,
        cfg: &cfg.events,
    };
    let outcomes = trigger_events(state, registry, &ctx, &mut rngs.events);

    // Arrival events may have queued one-day modifiers; reprice so they
    // bite today, not tomorrow.
    if !state.price_modifiers.is_empty() {
        regenerate_goods_prices(state, goods, cfg, &mut rngs.market);
    }

    portfolio::accrue_dividends(state, assets, &cfg.investments, &mut rngs.market);

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::default_assets;
    use crate::cities::default_cities;
    use crate::events::default_registry;
    use crate::goods::default_goods;

    fn setup() -> (GameState, GameConfig, Vec<Good>, Vec<Asset>) {
        let mut state = GameState::new(default_cities(), 50);
        state.cash = 10_000;
        (state, GameConfig::default(), default_goods(), default_assets())
    }

    #[test]
    fn advance_day_populates_both_markets() {
        let (mut state, cfg, goods, assets) = setup();
        let mut rngs = RngBundle::from_seed(1);
        advance_day(&mut state, &cfg, &goods, &assets, &mut rngs);
        assert_eq!(state.clock.day, 2);
        assert_eq!(state.goods_prices.len(), goods.len());
        assert_eq!(state.asset_prices.len(), assets.len());
        assert!(state.loan_apr_offer >= 0.01 && state.loan_apr_offer <= 0.20);
    }

    #[test]
    fn travel_fee_scales_with_load() {
        let (mut state, cfg, goods, assets) = setup();
        let mut rngs = RngBundle::from_seed(2);
        advance_day(&mut state, &cfg, &goods, &assets, &mut rngs);
        assert_eq!(travel_fee(&state, &cfg), 100);
        crate::goods::buy_good(&mut state, &goods, "TV", 4).unwrap();
        assert_eq!(travel_fee(&state, &cfg), 112);
    }

    #[test]
    fn unpayable_fee_aborts_without_changes() {
        let (mut state, cfg, goods, assets) = setup();
        state.cash = 50;
        let mut rngs = RngBundle::from_seed(3);
        let err = travel_to(&mut state, &cfg, &goods, &assets, &default_registry(), &mut rngs, 1)
            .unwrap_err();
        assert!(matches!(err, EconomyError::InsufficientFunds { needed: 100, .. }));
        assert_eq!(state.cash, 50);
        assert_eq!(state.city_index, 0);
        assert_eq!(state.clock.day, 1);
    }

    #[test]
    fn unknown_city_rejected() {
        let (mut state, cfg, goods, assets) = setup();
        let mut rngs = RngBundle::from_seed(3);
        let err = travel_to(&mut state, &cfg, &goods, &assets, &default_registry(), &mut rngs, 99)
            .unwrap_err();
        assert!(matches!(err, EconomyError::UnknownItem { .. }));
    }

    #[test]
    fn travel_moves_charges_and_advances() {
        let (mut state, cfg, goods, assets) = setup();
        // Silence arrival events so the cash delta is just the fee.
        state.cities[2].events.probability = 0.0;
        let mut rngs = RngBundle::from_seed(4);
        travel_to(&mut state, &cfg, &goods, &assets, &default_registry(), &mut rngs, 2).unwrap();
        assert_eq!(state.city_index, 2);
        assert_eq!(state.clock.day, 2);
        assert_eq!(state.cash, 9_900);
        assert!(state.price_modifiers.is_empty());
    }

    #[test]
    fn fixed_seed_reproduces_a_day() {
        let run = |seed: u64| {
            let (mut state, cfg, goods, assets) = setup();
            let mut rngs = RngBundle::from_seed(seed);
            let registry = default_registry();
            for target in [1usize, 3, 5] {
                travel_to(&mut state, &cfg, &goods, &assets, &registry, &mut rngs, target)
                    .unwrap();
            }
            state
        };
        assert_eq!(run(99), run(99));
    }
}
