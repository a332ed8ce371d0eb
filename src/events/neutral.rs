//! Neutral events: repricing shocks that touch no player ledger.
//!
//! The goods-side events write one-day multipliers into
//! `price_modifiers` for the next price generation to consume; the
//! market boom/crash pair rescales one whole asset type in place.

use rand::Rng;

use super::{priced_symbols_of_kind, rescale_asset_prices, EventContext};
use crate::assets::AssetKind;
use crate::state::GameState;

fn random_good(ctx: &EventContext<'_>, rng: &mut impl Rng) -> Option<String> {
    if ctx.goods.is_empty() {
        return None;
    }
    Some(ctx.goods[rng.gen_range(0..ctx.goods.len())].name.clone())
}

fn single_good_modifier(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
    range: (f64, f64),
) -> Option<(String, f64)> {
    let name = random_good(ctx, rng)?;
    let factor = rng.gen_range(range.0..=range.1);
    state.price_modifiers.insert(name.clone(), factor);
    Some((name, factor))
}

// One random asset type, every priced symbol of it, one factor.
fn market_wide_rescale(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
    range: (f64, f64),
) -> Option<(AssetKind, f64)> {
    let kinds = [AssetKind::Stock, AssetKind::Commodity, AssetKind::Crypto];
    let kind = kinds[rng.gen_range(0..kinds.len())];
    let symbols = priced_symbols_of_kind(state, ctx, kind);
    if symbols.is_empty() {
        return None;
    }
    let factor = rng.gen_range(range.0..=range.1);
    rescale_asset_prices(state, &symbols, factor);
    Some((kind, factor))
}

pub(super) fn promotion(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let (name, _) = single_good_modifier(state, ctx, rng, ctx.cfg.promo_multiplier)?;
    Some(format!("Promotional sale: {name} goes cheap today"))
}

pub(super) fn oversupply(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let (name, _) = single_good_modifier(state, ctx, rng, ctx.cfg.oversupply_multiplier)?;
    Some(format!("Oversupply floods the market: {name} prices slump"))
}

pub(super) fn shortage(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let (name, _) = single_good_modifier(state, ctx, rng, ctx.cfg.shortage_multiplier)?;
    Some(format!("Shortage reported: {name} prices spike"))
}

pub(super) fn loyal_discount(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let name = random_good(ctx, rng)?;
    let factor = 1.0 - ctx.cfg.loyal_discount_rate;
    state.price_modifiers.insert(name.clone(), factor);
    Some(format!("A loyal supplier offers a discount on {name}"))
}

pub(super) fn market_boom(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let (kind, factor) = market_wide_rescale(state, ctx, rng, ctx.cfg.boom_multiplier)?;
    Some(format!(
        "Market boom! Every {} trades around {:.0}% of yesterday",
        kind.as_str(),
        factor * 100.0
    ))
}

pub(super) fn market_crash(
    state: &mut GameState,
    ctx: &EventContext<'_>,
    rng: &mut impl Rng,
) -> Option<String> {
    let (kind, factor) = market_wide_rescale(state, ctx, rng, ctx.cfg.crash_multiplier)?;
    Some(format!(
        "Market crash! Every {} trades around {:.0}% of yesterday",
        kind.as_str(),
        factor * 100.0
    ))
}
