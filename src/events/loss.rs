//! Loss events: cargo destruction, duties, and market hits.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{held_asset_kinds, held_symbols_of_kind, rescale_asset_prices, EventContext};
use crate::goods::{record_loss_fifo, record_loss_from_last};
use crate::state::GameState;

fn held_goods(state: &GameState) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for lot in &state.lots {
        if lot.quantity > 0 && !names.iter().any(|n| n == &lot.good) {
            names.push(lot.good.clone());
        }
    }
    names
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn share_of(held: u32, pct: f64) -> u32 {
    ((f64::from(held) * pct).round() as u32).clamp(1, held)
}

/// Robbers target one good, taking 10-40% of it (at least one unit).
pub(super) fn robbery(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let names = held_goods(state);
    if names.is_empty() {
        return None;
    }
    let name = names[rng.gen_range(0..names.len())].clone();
    let range = ctx.cfg.robbery_loss_pct;
    let pct = rng.gen_range(range.0..=range.1);
    let held = state.holdings(&name);
    let lost = record_loss_fifo(state, &name, share_of(held, pct));
    Some(format!("Robbery on the road! Lost {lost} x {name}"))
}

// Draws a destruction budget as a share of the whole inventory, then
// spreads it across goods in random order. Per-good hits roll their own
// rate but never exceed what is left of the budget, so the total stays
// inside the configured ceiling.
fn blaze(
    state: &mut GameState,
    rng: &mut impl Rng,
    total_pct: (f64, f64),
    per_good_pct: (f64, f64),
) -> Option<u32> {
    let mut names = held_goods(state);
    if names.is_empty() {
        return None;
    }
    names.shuffle(rng);
    let count = state.inventory_count();
    let pct = rng.gen_range(total_pct.0..=total_pct.1);
    let mut budget = share_of(count, pct);
    let mut lost = 0u32;
    for name in names {
        if budget == 0 {
            break;
        }
        let held = state.holdings(&name);
        let pg = rng.gen_range(per_good_pct.0..=per_good_pct.1);
        let want = share_of(held, pg).min(budget);
        let taken = record_loss_fifo(state, &name, want);
        lost += taken;
        budget -= taken;
    }
    Some(lost)
}

pub(super) fn fire(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let lost = blaze(state, rng, ctx.cfg.fire_total_pct, ctx.cfg.fire_per_good_pct)?;
    Some(format!("Fire in the cargo hold! {lost} units burned"))
}

pub(super) fn flood(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let lost = blaze(
        state,
        rng,
        ctx.cfg.flood_total_pct,
        ctx.cfg.flood_per_good_pct,
    )?;
    Some(format!("Flooded warehouse! {lost} units ruined"))
}

/// One whole batch goes bad: the newest lot of a random held good.
pub(super) fn defective_batch(state: &mut GameState, rng: &mut impl Rng) -> Option<String> {
    let names = held_goods(state);
    if names.is_empty() {
        return None;
    }
    let name = names[rng.gen_range(0..names.len())].clone();
    let idx = state
        .lots
        .iter()
        .rposition(|l| l.good == name && l.quantity > 0)?;
    let lost = state.lots[idx].quantity;
    state.lots[idx].quantity = 0;
    state.lots[idx].lost_quantity += lost;
    state.lots.retain(|l| l.quantity > 0);
    Some(format!("Defective batch: {lost} x {name} unsellable"))
}

pub(super) fn customs_duty(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let value = state.inventory_value();
    if value <= 0 {
        return None;
    }
    let range = ctx.cfg.customs_duty_pct;
    let pct = rng.gen_range(range.0..=range.1);
    #[allow(clippy::cast_possible_truncation)]
    let duty = (((value as f64) * pct).round() as i64).max(1);
    state.cash -= duty;
    Some(format!("Customs inspection: duty of ${duty} charged"))
}

pub(super) fn stolen_last_buy(state: &mut GameState) -> Option<String> {
    let (name, taken) = record_loss_from_last(state)?;
    Some(format!("Thieves hit your latest purchase: {taken} x {name} gone"))
}

pub(super) fn cash_damage(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    if state.cash <= 0 {
        return None;
    }
    let range = ctx.cfg.cash_damage_pct;
    let pct = rng.gen_range(range.0..=range.1);
    #[allow(clippy::cast_possible_truncation)]
    let raw = ((state.cash as f64) * pct).round() as i64;
    let (lo, hi) = ctx.cfg.cash_damage_clamp;
    let amount = raw.clamp(lo, hi);
    state.cash -= amount;
    Some(format!("Vehicle breakdown: repairs cost ${amount}"))
}

/// One asset type the player holds takes a hit; only the held symbols
/// of that type reprice.
pub(super) fn portfolio_crash(
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
    let range = ctx.cfg.crash_multiplier;
    let factor = rng.gen_range(range.0..=range.1);
    if rescale_asset_prices(state, &symbols, factor) == 0 {
        return None;
    }
    Some(format!(
        "Bad news for your {} positions: prices drop to {:.0}% of yesterday",
        kind.as_str(),
        factor * 100.0
    ))
}
