//! Gain events: windfalls credited to cash or the bank account.

use rand::Rng;

use super::{held_asset_kinds, held_symbols_of_kind, rescale_asset_prices, EventContext};
use crate::bank::{self, TxKind};
use crate::state::GameState;

const CONTESTS: &[(&str, i64)] = &[
    ("City Trade Fair raffle", 3000),
    ("Merchants' Guild lottery", 2000),
    ("Harbor festival tombola", 1200),
    ("Chamber of Commerce quiz", 800),
];

// Lower places are far more common.
const PLACE_WEIGHTS: [u64; 3] = [10, 30, 60];

pub(super) fn bonus_dividend(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let value = state.portfolio_value();
    if value <= 0 {
        return None;
    }
    let range = ctx.cfg.dividend_pct;
    let pct = rng.gen_range(range.0..=range.1);
    #[allow(clippy::cast_possible_truncation)]
    let amount = (((value as f64) * pct).floor() as i64).max(1);
    bank::credit(state, TxKind::Dividend, amount, "Special dividend");
    Some(format!("Special dividend declared: ${amount} to your account"))
}

pub(super) fn contest_win(state: &mut GameState, rng: &mut impl Rng) -> Option<String> {
    let (name, base) = CONTESTS[rng.gen_range(0..CONTESTS.len())];
    let total: u64 = PLACE_WEIGHTS.iter().sum();
    let roll = rng.gen_range(0..total);
    let (place, prize) = if roll < PLACE_WEIGHTS[0] {
        (1, base)
    } else if roll < PLACE_WEIGHTS[0] + PLACE_WEIGHTS[1] {
        (2, (base + 1) / 2)
    } else {
        (3, (base + 3) / 4)
    };
    state.cash += prize;
    Some(format!("You took place {place} in the {name}: ${prize} prize"))
}

pub(super) fn bank_correction(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    if state.bank.balance <= 0 {
        return None;
    }
    let range = ctx.cfg.bank_correction_pct;
    let pct = rng.gen_range(range.0..=range.1);
    #[allow(clippy::cast_possible_truncation)]
    let raw = ((state.bank.balance as f64) * pct).round() as i64;
    let amount = raw.max(ctx.cfg.bank_correction_min);
    bank::credit(state, TxKind::Interest, amount, "Bank correction");
    Some(format!(
        "The bank corrected an accounting error in your favor: ${amount}"
    ))
}

/// One asset type the player holds rallies; only the held symbols of
/// that type reprice.
pub(super) fn portfolio_boom(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let kinds = held_asset_kinds(state, ctx);
    if kinds.is_empty() {
        return None;
    }
    let kind = kinds[rng.gen_range(0..kinds.len())];
    let symbols = held_symbols_of_kind(state, ctx, kind);
    let range = ctx.cfg.boom_multiplier;
    let factor = rng.gen_range(range.0..=range.1);
    if rescale_asset_prices(state, &symbols, factor) == 0 {
        return None;
    }
    Some(format!(
        "Investor frenzy around your {} positions: prices jump to {:.0}% of yesterday",
        kind.as_str(),
        factor * 100.0
    ))
}
