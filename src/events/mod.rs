//! Travel event engine: gate, per-category draws, weighted
//! no-replacement selection, and per-event application.

mod gain;
mod loss;
mod neutral;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::assets::{Asset, AssetKind};
use crate::config::EventsConfig;
use crate::goods::Good;
use crate::state::GameState;

// Shared by the boom/crash family: rescale a set of asset prices in
// place, flooring at one unit. Returns how many symbols were touched.
fn rescale_asset_prices(state: &mut GameState, symbols: &[String], factor: f64) -> usize {
    let mut touched = 0;
    for symbol in symbols {
        if let Some(price) = state.asset_prices.get_mut(symbol) {
            #[allow(clippy::cast_possible_truncation)]
            let scaled = (((*price) as f64) * factor).round() as i64;
            *price = scaled.max(1);
            touched += 1;
        }
    }
    touched
}

fn kind_of(ctx: &EventContext<'_>, symbol: &str) -> Option<AssetKind> {
    ctx.assets.iter().find(|a| a.symbol == symbol).map(|a| a.kind)
}

// Catalogue symbols of one type that have a price today.
fn priced_symbols_of_kind(
    state: &GameState,
    ctx: &EventContext<'_>,
    kind: AssetKind,
) -> Vec<String> {
    ctx.assets
        .iter()
        .filter(|a| a.kind == kind && state.asset_prices.contains_key(&a.symbol))
        .map(|a| a.symbol.clone())
        .collect()
}

// The player's held symbols of one type, deduplicated across lots.
fn held_symbols_of_kind(
    state: &GameState,
    ctx: &EventContext<'_>,
    kind: AssetKind,
) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for lot in &state.investments {
        if lot.quantity == 0 || symbols.iter().any(|s| s == &lot.symbol) {
            continue;
        }
        if kind_of(ctx, &lot.symbol) == Some(kind) {
            symbols.push(lot.symbol.clone());
        }
    }
    symbols
}

// Distinct asset types in the player's portfolio, in catalogue order.
fn held_asset_kinds(state: &GameState, ctx: &EventContext<'_>) -> Vec<AssetKind> {
    let mut kinds: Vec<AssetKind> = Vec::new();
    for kind in [AssetKind::Stock, AssetKind::Commodity, AssetKind::Crypto] {
        if !held_symbols_of_kind(state, ctx, kind).is_empty() {
            kinds.push(kind);
        }
    }
    kinds
}

/// Outcome family of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Loss,
    Gain,
    Neutral,
}

impl EventCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loss => "loss",
            Self::Gain => "gain",
            Self::Neutral => "neutral",
        }
    }
}

/// Every event the engine can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Robbery,
    Fire,
    Flood,
    DefectiveBatch,
    CustomsDuty,
    StolenLastBuy,
    CashDamage,
    PortfolioCrash,
    BonusDividend,
    ContestWin,
    BankCorrection,
    PortfolioBoom,
    Promotion,
    Oversupply,
    Shortage,
    LoyalDiscount,
    MarketBoom,
    MarketCrash,
}

impl EventKind {
    #[must_use]
    pub const fn category(self) -> EventCategory {
        match self {
            Self::Robbery
            | Self::Fire
            | Self::Flood
            | Self::DefectiveBatch
            | Self::CustomsDuty
            | Self::StolenLastBuy
            | Self::CashDamage
            | Self::PortfolioCrash => EventCategory::Loss,
            Self::BonusDividend
            | Self::ContestWin
            | Self::BankCorrection
            | Self::PortfolioBoom => EventCategory::Gain,
            Self::Promotion
            | Self::Oversupply
            | Self::Shortage
            | Self::LoyalDiscount
            | Self::MarketBoom
            | Self::MarketCrash => EventCategory::Neutral,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Robbery => "robbery",
            Self::Fire => "fire",
            Self::Flood => "flood",
            Self::DefectiveBatch => "defective_batch",
            Self::CustomsDuty => "customs_duty",
            Self::StolenLastBuy => "stolen_last_buy",
            Self::CashDamage => "cash_damage",
            Self::PortfolioCrash => "portfolio_crash",
            Self::BonusDividend => "bonus_dividend",
            Self::ContestWin => "contest_win",
            Self::BankCorrection => "bank_correction",
            Self::PortfolioBoom => "portfolio_boom",
            Self::Promotion => "promotion",
            Self::Oversupply => "oversupply",
            Self::Shortage => "shortage",
            Self::LoyalDiscount => "loyal_discount",
            Self::MarketBoom => "market_boom",
            Self::MarketCrash => "market_crash",
        }
    }
}

/// Registry entry: an event and its selection weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpec {
    pub kind: EventKind,
    pub weight: u32,
}

/// Built-in event roster with the stock weights.
#[must_use]
pub fn default_registry() -> Vec<EventSpec> {
    use EventKind::*;
    [
        (Robbery, 8),
        (Fire, 5),
        (Flood, 4),
        (DefectiveBatch, 5),
        (CustomsDuty, 6),
        (StolenLastBuy, 5),
        (CashDamage, 4),
        (PortfolioCrash, 3),
        (BonusDividend, 6),
        (ContestWin, 3),
        (BankCorrection, 4),
        (PortfolioBoom, 3),
        (Promotion, 5),
        (Oversupply, 4),
        (Shortage, 4),
        (LoyalDiscount, 1),
        (MarketBoom, 8),
        (MarketCrash, 8),
    ]
    .into_iter()
    .map(|(kind, weight)| EventSpec { kind, weight })
    .collect()
}

/// What one fired event did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub kind: EventKind,
    pub category: EventCategory,
    pub text: String,
}

/// Read-only context every event application gets.
pub struct EventContext<'a> {
    pub goods: &'a [Good],
    pub assets: &'a [Asset],
    pub cfg: &'a EventsConfig,
}

/// Pure weighted selection without replacement.
///
/// Draws one index from `weights`, skipping excluded indices and zero
/// weights. Returns `None` when nothing is drawable.
pub fn pick_weighted(
    rng: &mut impl Rng,
    weights: &[u32],
    excluded: &HashSet<usize>,
) -> Option<usize> {
    let total: u64 = weights
        .iter()
        .enumerate()
        .filter(|(i, w)| !excluded.contains(i) && **w > 0)
        .map(|(_, w)| u64::from(*w))
        .sum();
    if total == 0 {
        return None;
    }
    let mut remaining = rng.gen_range(0..total);
    for (i, w) in weights.iter().enumerate() {
        if excluded.contains(&i) || *w == 0 {
            continue;
        }
        let w = u64::from(*w);
        if remaining < w {
            return Some(i);
        }
        remaining -= w;
    }
    None
}

/// Whether an event makes sense against the current state.
#[must_use]
pub fn can_trigger(kind: EventKind, state: &GameState) -> bool {
    match kind {
        EventKind::Robbery
        | EventKind::Fire
        | EventKind::Flood
        | EventKind::DefectiveBatch
        | EventKind::CustomsDuty => state.inventory_count() > 0,
        EventKind::StolenLastBuy => state
            .transactions
            .iter()
            .rev()
            .find(|t| t.kind == crate::goods::TradeKind::Buy)
            .is_some_and(|t| state.holdings(&t.good) > 0),
        EventKind::CashDamage => state.cash > 0,
        EventKind::PortfolioCrash | EventKind::PortfolioBoom | EventKind::BonusDividend => {
            !state.investments.is_empty()
        }
        EventKind::BankCorrection => state.bank.balance > 0,
        EventKind::MarketBoom | EventKind::MarketCrash => !state.asset_prices.is_empty(),
        EventKind::ContestWin
        | EventKind::Promotion
        | EventKind::Oversupply
        | EventKind::Shortage
        | EventKind::LoyalDiscount => true,
    }
}

/// Applies one event. Returns `None` when the precondition no longer
/// holds; earlier events in the same arrival may have consumed it.
pub fn apply(
    kind: EventKind,
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<EventOutcome> {
    let text = match kind {
        EventKind::Robbery => loss::robbery(state, ctx, rng)?,
        EventKind::Fire => loss::fire(state, ctx, rng)?,
        EventKind::Flood => loss::flood(state, ctx, rng)?,
        EventKind::DefectiveBatch => loss::defective_batch(state, rng)?,
        EventKind::CustomsDuty => loss::customs_duty(state, ctx, rng)?,
        EventKind::StolenLastBuy => loss::stolen_last_buy(state)?,
        EventKind::CashDamage => loss::cash_damage(state, ctx, rng)?,
        EventKind::PortfolioCrash => loss::portfolio_crash(state, ctx, rng)?,
        EventKind::BonusDividend => gain::bonus_dividend(state, ctx, rng)?,
        EventKind::ContestWin => gain::contest_win(state, rng)?,
        EventKind::BankCorrection => gain::bank_correction(state, ctx, rng)?,
        EventKind::PortfolioBoom => gain::portfolio_boom(state, ctx, rng)?,
        EventKind::Promotion => neutral::promotion(state, ctx, rng)?,
        EventKind::Oversupply => neutral::oversupply(state, ctx, rng)?,
        EventKind::Shortage => neutral::shortage(state, ctx, rng)?,
        EventKind::LoyalDiscount => neutral::loyal_discount(state, ctx, rng)?,
        EventKind::MarketBoom => neutral::market_boom(state, ctx, rng)?,
        EventKind::MarketCrash => neutral::market_crash(state, ctx, rng)?,
    };
    let category = kind.category();
    state.log_info(kind.as_str(), &text);
    Some(EventOutcome {
        kind,
        category,
        text,
    })
}

/// Runs the arrival pipeline for the current city.
///
/// One gate roll decides whether anything fires. Then each category
/// draws its attempt count from the city profile, and each attempt
/// samples the eligible remainder by weight. An event is marked used
/// only when it actually applied, so a declined draw does not burn the
/// slot for eligibility purposes. The combined list is shuffled so
/// category order leaks nothing.
pub fn trigger_events(
    state: &mut GameState,
    registry: &[EventSpec],
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> SmallVec<[EventOutcome; 4]> {
    let mut results: SmallVec<[EventOutcome; 4]> = SmallVec::new();
    let profile = state.current_city().events.clone();
    if rng.gen::<f64>() >= profile.probability {
        return results;
    }

    let weights: Vec<u32> = registry.iter().map(|s| s.weight).collect();
    let mut used: HashSet<usize> = HashSet::new();

    for (category, (min, max)) in [
        (EventCategory::Loss, profile.loss),
        (EventCategory::Gain, profile.gain),
        (EventCategory::Neutral, profile.neutral),
    ] {
        let attempts = if min >= max {
            min
        } else {
            rng.gen_range(min..=max)
        };
        for _ in 0..attempts {
            let mut excluded = used.clone();
            for (i, spec) in registry.iter().enumerate() {
                if spec.kind.category() != category || !can_trigger(spec.kind, state) {
                    excluded.insert(i);
                }
            }
            let Some(idx) = pick_weighted(rng, &weights, &excluded) else {
                continue;
            };
            if let Some(outcome) = apply(registry[idx].kind, state, ctx, rng) {
                used.insert(idx);
                results.push(outcome);
            } else {
                log::debug!(
                    "event {} declined after selection",
                    registry[idx].kind.as_str()
                );
            }
        }
    }

    results.shuffle(rng);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn pick_weighted_skips_excluded_and_zero() {
        let weights = [0, 5, 0, 3];
        let mut excluded = HashSet::new();
        excluded.insert(3);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..100 {
            let idx = pick_weighted(&mut rng, &weights, &excluded).unwrap();
            assert_eq!(idx, 1);
        }
    }

    #[test]
    fn pick_weighted_empty_pool_is_none() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(pick_weighted(&mut rng, &[], &HashSet::new()), None);
        assert_eq!(pick_weighted(&mut rng, &[0, 0], &HashSet::new()), None);
        let all: HashSet<usize> = [0, 1].into_iter().collect();
        assert_eq!(pick_weighted(&mut rng, &[4, 4], &all), None);
    }

    #[test]
    fn pick_weighted_favors_heavy_entries() {
        let weights = [90, 10];
        let mut rng = SmallRng::seed_from_u64(2);
        let mut heavy = 0;
        for _ in 0..1000 {
            if pick_weighted(&mut rng, &weights, &HashSet::new()) == Some(0) {
                heavy += 1;
            }
        }
        assert!(heavy > 800, "heavy index drawn {heavy}/1000");
    }

    #[test]
    fn registry_covers_all_categories() {
        let registry = default_registry();
        assert_eq!(registry.len(), 18);
        for category in [
            EventCategory::Loss,
            EventCategory::Gain,
            EventCategory::Neutral,
        ] {
            assert!(registry.iter().any(|s| s.kind.category() == category));
        }
    }
}
