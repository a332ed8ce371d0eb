//! Goods catalogue, daily price generation, and the FIFO purchase ledger.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cities::City;
use crate::config::PricingConfig;
use crate::error::EconomyError;
use crate::state::GameState;

/// Market tier of a good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoodTier {
    Regular,
    Contraband,
}

/// One tradeable good in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    pub name: String,
    /// Anchor price daily prices are generated around.
    pub base_price: i64,
    /// Fractional daily swing, e.g. 0.3 for +/-30%.
    pub variance: f64,
    /// Cargo slots one unit occupies.
    pub size: u32,
    pub tier: GoodTier,
}

impl Good {
    fn new(name: &str, base_price: i64, variance: f64, size: u32, tier: GoodTier) -> Self {
        Self {
            name: name.to_string(),
            base_price,
            variance,
            size,
            tier,
        }
    }
}

/// Built-in goods catalogue.
#[must_use]
pub fn default_goods() -> Vec<Good> {
    use GoodTier::{Contraband, Regular};
    vec![
        Good::new("Cigars", 80, 0.30, 1, Regular),
        Good::new("Perfume", 150, 0.30, 1, Regular),
        Good::new("Whisky", 120, 0.25, 2, Regular),
        Good::new("Smartphone", 600, 0.35, 1, Regular),
        Good::new("Laptop", 900, 0.35, 2, Regular),
        Good::new("TV", 400, 0.30, 3, Regular),
        Good::new("Jewelry", 1500, 0.40, 1, Regular),
        Good::new("Car Parts", 700, 0.25, 5, Regular),
        Good::new("Antique Furniture", 2500, 0.45, 8, Regular),
        Good::new("Sports Car", 60_000, 0.35, 30, Regular),
        Good::new("Unlicensed Arms", 4000, 0.50, 10, Contraband),
        Good::new("Bootleg Spirits", 1800, 0.50, 15, Contraband),
    ]
}

/// Looks a good up by name.
#[must_use]
pub fn find_good<'a>(catalog: &'a [Good], name: &str) -> Option<&'a Good> {
    catalog.iter().find(|g| g.name == name)
}

/// A FIFO purchase lot. Losses and sales drain `quantity`;
/// `initial_quantity` and `lost_quantity` keep the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLot {
    pub good: String,
    pub quantity: u32,
    pub initial_quantity: u32,
    pub lost_quantity: u32,
    pub unit_price: i64,
    /// Cargo slots one unit occupies, copied from the catalogue at buy time.
    pub unit_size: u32,
    pub day: u32,
    pub city: String,
}

/// Direction of a trade record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeKind {
    Buy,
    Sell,
}

/// One entry in the trade history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TradeKind,
    pub good: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub total: i64,
    pub day: u32,
    pub city: String,
}

/// Generates the day's unit prices for every good.
///
/// Each price is `base * swing * city_multiplier * modifier`, floored at
/// the configured minimum. Modifiers are one-day: the map is drained here
/// so the next generation runs clean.
pub fn generate_prices(
    catalog: &[Good],
    city: &City,
    modifiers: &mut HashMap<String, f64>,
    pricing: &PricingConfig,
    rng: &mut impl Rng,
) -> HashMap<String, i64> {
    let mut prices = HashMap::with_capacity(catalog.len());
    for good in catalog {
        let swing = rng.gen_range(1.0 - good.variance..=1.0 + good.variance);
        let city_mult = city.multiplier_for(&good.name);
        let modifier = modifiers.remove(&good.name).unwrap_or(1.0);
        let raw = (good.base_price as f64) * swing * city_mult * modifier;
        #[allow(clippy::cast_possible_truncation)]
        let price = (raw.round() as i64).max(pricing.min_unit_price);
        prices.insert(good.name.clone(), price);
    }
    modifiers.clear();
    prices
}

/// Buys `quantity` units at the current city price.
///
/// Checks funds and cargo room, then appends a purchase lot and a buy
/// record. Returns the total paid.
pub fn buy_good(
    state: &mut GameState,
    catalog: &[Good],
    name: &str,
    quantity: u32,
) -> Result<i64, EconomyError> {
    if quantity == 0 {
        return Err(EconomyError::InvalidAmount { amount: 0 });
    }
    let good = find_good(catalog, name).ok_or_else(|| EconomyError::UnknownItem {
        name: name.to_string(),
    })?;
    let unit_price = state.goods_price(name)?;
    let total = unit_price.saturating_mul(i64::from(quantity));
    if total > state.cash {
        return Err(EconomyError::InsufficientFunds {
            needed: total,
            have: state.cash,
        });
    }
    if !state.can_carry(good.size, quantity) {
        return Err(EconomyError::LimitExceeded {
            requested: i64::from(good.size.saturating_mul(quantity)),
            ceiling: i64::from(state.free_slots()),
        });
    }

    state.cash -= total;
    let day = state.clock.day;
    let city = state.city_name().to_string();
    state.lots.push(PurchaseLot {
        good: good.name.clone(),
        quantity,
        initial_quantity: quantity,
        lost_quantity: 0,
        unit_price,
        unit_size: good.size,
        day,
        city: city.clone(),
    });
    state.transactions.push(Transaction {
        kind: TradeKind::Buy,
        good: good.name.clone(),
        quantity,
        unit_price,
        total,
        day,
        city,
    });
    let ts = state.clock.timestamp();
    state.messages.info(
        &ts,
        "trade",
        &format!("Bought {quantity} x {name} at ${unit_price}"),
    );
    Ok(total)
}

/// Sells `quantity` units at the current city price, draining purchase
/// lots oldest-first. Returns the proceeds.
pub fn sell_good(
    state: &mut GameState,
    name: &str,
    quantity: u32,
) -> Result<i64, EconomyError> {
    if quantity == 0 {
        return Err(EconomyError::InvalidAmount { amount: 0 });
    }
    let held = state.holdings(name);
    if quantity > held {
        return Err(EconomyError::InsufficientHoldings {
            requested: quantity,
            held,
        });
    }
    let unit_price = state.goods_price(name)?;

    drain_fifo(&mut state.lots, name, quantity, false);

    let total = unit_price.saturating_mul(i64::from(quantity));
    state.cash += total;
    let day = state.clock.day;
    let city = state.city_name().to_string();
    state.transactions.push(Transaction {
        kind: TradeKind::Sell,
        good: name.to_string(),
        quantity,
        unit_price,
        total,
        day,
        city,
    });
    let ts = state.clock.timestamp();
    state.messages.info(
        &ts,
        "trade",
        &format!("Sold {quantity} x {name} at ${unit_price}"),
    );
    Ok(total)
}

/// Removes up to `quantity` units of `name` oldest-first, marking them
/// lost. Returns the number of units actually removed.
pub fn record_loss_fifo(state: &mut GameState, name: &str, quantity: u32) -> u32 {
    let held = state.holdings(name);
    let take = quantity.min(held);
    if take > 0 {
        drain_fifo(&mut state.lots, name, take, true);
    }
    take
}

/// Removes units from the most recent buy, newest lot first. Returns the
/// good name and the units removed, or `None` when there is no buy to hit.
pub fn record_loss_from_last(state: &mut GameState) -> Option<(String, u32)> {
    let last_buy = state
        .transactions
        .iter()
        .rev()
        .find(|t| t.kind == TradeKind::Buy)?;
    let name = last_buy.good.clone();
    let wanted = last_buy.quantity;
    let held = state.holdings(&name);
    let take = wanted.min(held);
    if take == 0 {
        return None;
    }
    let mut remaining = take;
    for lot in state.lots.iter_mut().rev() {
        if remaining == 0 {
            break;
        }
        if lot.good != name {
            continue;
        }
        let hit = lot.quantity.min(remaining);
        lot.quantity -= hit;
        lot.lost_quantity += hit;
        remaining -= hit;
    }
    state.lots.retain(|l| l.quantity > 0);
    Some((name, take))
}

fn drain_fifo(lots: &mut Vec<PurchaseLot>, name: &str, quantity: u32, as_loss: bool) {
    let mut remaining = quantity;
    for lot in lots.iter_mut() {
        if remaining == 0 {
            break;
        }
        if lot.good != name {
            continue;
        }
        let hit = lot.quantity.min(remaining);
        lot.quantity -= hit;
        if as_loss {
            lot.lost_quantity += hit;
        }
        remaining -= hit;
    }
    lots.retain(|l| l.quantity > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::default_cities;
    use crate::state::GameState;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn fresh_state() -> GameState {
        let mut state = GameState::new(default_cities(), 50);
        state.cash = 100_000;
        for good in default_goods() {
            state.goods_prices.insert(good.name, good.base_price);
        }
        state
    }

    #[test]
    fn prices_respect_floor_and_clear_modifiers() {
        let catalog = vec![Good::new("Scrap", 1, 0.9, 1, GoodTier::Regular)];
        let cities = default_cities();
        let mut modifiers = HashMap::new();
        modifiers.insert("Scrap".to_string(), 0.01);
        let mut rng = SmallRng::seed_from_u64(7);
        let prices = generate_prices(
            &catalog,
            &cities[0],
            &mut modifiers,
            &PricingConfig::default(),
            &mut rng,
        );
        assert_eq!(prices["Scrap"], 1);
        assert!(modifiers.is_empty());
    }

    #[test]
    fn buy_records_lot_and_transaction() {
        let mut state = fresh_state();
        let catalog = default_goods();
        let paid = buy_good(&mut state, &catalog, "TV", 4).unwrap();
        assert_eq!(paid, 1600);
        assert_eq!(state.cash, 98_400);
        assert_eq!(state.holdings("TV"), 4);
        assert_eq!(state.used_slots(), 12);
        assert_eq!(state.transactions.len(), 1);
    }

    #[test]
    fn buy_rejects_overflowing_cargo() {
        let mut state = fresh_state();
        let catalog = default_goods();
        let err = buy_good(&mut state, &catalog, "TV", 17).unwrap_err();
        assert!(matches!(err, EconomyError::LimitExceeded { .. }));
        assert_eq!(state.cash, 100_000);
        assert!(state.lots.is_empty());
    }

    #[test]
    fn sell_drains_oldest_lot_first() {
        let mut state = fresh_state();
        let catalog = default_goods();
        buy_good(&mut state, &catalog, "Cigars", 10).unwrap();
        state.clock.advance_day();
        buy_good(&mut state, &catalog, "Cigars", 5).unwrap();

        sell_good(&mut state, "Cigars", 12).unwrap();
        assert_eq!(state.holdings("Cigars"), 3);
        assert_eq!(state.lots.len(), 1);
        assert_eq!(state.lots[0].day, 2);
    }

    #[test]
    fn sell_more_than_held_fails() {
        let mut state = fresh_state();
        let catalog = default_goods();
        buy_good(&mut state, &catalog, "Cigars", 3).unwrap();
        let err = sell_good(&mut state, "Cigars", 5).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientHoldings {
                requested: 5,
                held: 3
            }
        );
    }

    #[test]
    fn loss_fifo_conserves_units() {
        let mut state = fresh_state();
        let catalog = default_goods();
        buy_good(&mut state, &catalog, "Whisky", 8).unwrap();
        buy_good(&mut state, &catalog, "Whisky", 4).unwrap();

        let removed = record_loss_fifo(&mut state, "Whisky", 10);
        assert_eq!(removed, 10);
        assert_eq!(state.holdings("Whisky"), 2);
        let lost: u32 = state
            .lots
            .iter()
            .map(|l| l.lost_quantity)
            .sum::<u32>();
        // The fully drained first lot is gone; the survivor carries its own losses.
        assert_eq!(lost, 2);
    }

    #[test]
    fn loss_fifo_caps_at_holdings() {
        let mut state = fresh_state();
        let catalog = default_goods();
        buy_good(&mut state, &catalog, "Perfume", 3).unwrap();
        let removed = record_loss_fifo(&mut state, "Perfume", 99);
        assert_eq!(removed, 3);
        assert_eq!(state.holdings("Perfume"), 0);
    }

    #[test]
    fn loss_from_last_targets_latest_buy() {
        let mut state = fresh_state();
        let catalog = default_goods();
        buy_good(&mut state, &catalog, "Cigars", 6).unwrap();
        buy_good(&mut state, &catalog, "Laptop", 2).unwrap();

        let (name, taken) = record_loss_from_last(&mut state).unwrap();
        assert_eq!(name, "Laptop");
        assert_eq!(taken, 2);
        assert_eq!(state.holdings("Laptop"), 0);
        assert_eq!(state.holdings("Cigars"), 6);
    }

    #[test]
    fn loss_from_last_none_without_buys() {
        let mut state = fresh_state();
        assert!(record_loss_from_last(&mut state).is_none());
    }
}
