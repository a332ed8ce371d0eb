//! Investment portfolio: FIFO lots, commissions, the wealth gate, and
//! scheduled dividends.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assets::{find_asset, Asset, AssetKind};
use crate::bank::{self, TxKind};
use crate::config::InvestmentsConfig;
use crate::error::EconomyError;
use crate::state::GameState;

/// One FIFO investment lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentLot {
    pub symbol: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub day: u32,
    /// Full days this lot has been held.
    #[serde(default)]
    pub holding_days: u32,
}

/// Units of one symbol across all lots.
#[must_use]
pub fn asset_holdings(state: &GameState, symbol: &str) -> u32 {
    state
        .investments
        .iter()
        .filter(|l| l.symbol == symbol)
        .map(|l| l.quantity)
        .sum()
}

fn commission(value: i64, rate: f64, floor: i64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let fee = ((value as f64) * rate).round() as i64;
    fee.max(floor)
}

fn ensure_unlocked(state: &GameState, cfg: &InvestmentsConfig) -> Result<(), EconomyError> {
    let wealth = state.net_worth();
    if wealth < cfg.min_wealth_to_unlock_trading {
        return Err(EconomyError::TradingLocked {
            wealth,
            threshold: cfg.min_wealth_to_unlock_trading,
        });
    }
    Ok(())
}

/// Buys `quantity` units at today's price plus the buy commission.
///
/// Requires the wealth gate. Returns the total debited from cash.
pub fn buy_asset(
    state: &mut GameState,
    catalog: &[Asset],
    cfg: &InvestmentsConfig,
    symbol: &str,
    quantity: u32,
) -> Result<i64, EconomyError> {
    if quantity == 0 {
        return Err(EconomyError::InvalidAmount { amount: 0 });
    }
    ensure_unlocked(state, cfg)?;
    let asset = find_asset(catalog, symbol).ok_or_else(|| EconomyError::UnknownItem {
        name: symbol.to_string(),
    })?;
    let unit_price = state.asset_price(symbol)?;
    let value = unit_price.saturating_mul(i64::from(quantity));
    let fee = commission(value, cfg.buy_fee_rate, cfg.buy_fee_min);
    let total = value + fee;
    if total > state.cash {
        return Err(EconomyError::InsufficientFunds {
            needed: total,
            have: state.cash,
        });
    }
    state.cash -= total;
    let day = state.clock.day;
    state.investments.push(InvestmentLot {
        symbol: asset.symbol.clone(),
        quantity,
        unit_price,
        day,
        holding_days: 0,
    });
    state.log_info(
        "portfolio",
        &format!("Bought {quantity} x {symbol} at ${unit_price} (fee ${fee})"),
    );
    Ok(total)
}

/// Sells `quantity` units at today's price, draining lots oldest-first.
/// The sell commission comes off the gross proceeds. Returns the net
/// credited to cash.
pub fn sell_asset(
    state: &mut GameState,
    cfg: &InvestmentsConfig,
    symbol: &str,
    quantity: u32,
) -> Result<i64, EconomyError> {
    if quantity == 0 {
        return Err(EconomyError::InvalidAmount { amount: 0 });
    }
    let held = asset_holdings(state, symbol);
    if quantity > held {
        return Err(EconomyError::InsufficientHoldings {
            requested: quantity,
            held,
        });
    }
    let unit_price = state.asset_price(symbol)?;

    let mut remaining = quantity;
    for lot in state.investments.iter_mut() {
        if remaining == 0 {
            break;
        }
        if lot.symbol != symbol {
            continue;
        }
        let hit = lot.quantity.min(remaining);
        lot.quantity -= hit;
        remaining -= hit;
    }
    state.investments.retain(|l| l.quantity > 0);

    let gross = unit_price.saturating_mul(i64::from(quantity));
    let fee = commission(gross, cfg.sell_fee_rate, cfg.sell_fee_min);
    let net = gross - fee;
    state.cash += net;
    state.log_info(
        "portfolio",
        &format!("Sold {quantity} x {symbol} at ${unit_price} (fee ${fee})"),
    );
    Ok(net)
}

/// Ages every lot by one day.
pub fn age_lots(state: &mut GameState) {
    for lot in &mut state.investments {
        lot.holding_days = lot.holding_days.saturating_add(1);
    }
}

/// Pays the scheduled dividend when the interval has elapsed.
///
/// Only stock lots held at least the minimum period earn. The payout is
/// credited to the bank account, not cash. Returns the total paid.
pub fn accrue_dividends(
    state: &mut GameState,
    catalog: &[Asset],
    cfg: &InvestmentsConfig,
    rng: &mut impl Rng,
) -> i64 {
    let day = state.clock.day;
    if day.saturating_sub(state.last_dividend_day) < cfg.dividend_interval_days {
        return 0;
    }
    state.last_dividend_day = day;

    let mut total = 0i64;
    let eligible: Vec<(String, i64)> = state
        .investments
        .iter()
        .filter(|lot| lot.holding_days >= cfg.dividend_min_holding_days)
        .filter(|lot| {
            find_asset(catalog, &lot.symbol).is_some_and(|a| a.kind == AssetKind::Stock)
        })
        .map(|lot| {
            let unit = state
                .asset_prices
                .get(&lot.symbol)
                .copied()
                .unwrap_or(lot.unit_price);
            (lot.symbol.clone(), unit.saturating_mul(i64::from(lot.quantity)))
        })
        .collect();

    for (symbol, value) in eligible {
        let rate = rng.gen_range(cfg.dividend_rate_range.0..=cfg.dividend_rate_range.1);
        #[allow(clippy::cast_possible_truncation)]
        let amount = ((value as f64) * rate).floor() as i64;
        if amount > 0 {
            // Scheduled payouts ride the interest rail; only windfall
            // dividends use the dividend transaction kind.
            bank::credit(
                state,
                TxKind::Interest,
                amount,
                &format!("Dividend: {symbol}"),
            );
            total += amount;
        }
    }
    if total > 0 {
        state.log_info("portfolio", &format!("Dividends paid: ${total}"));
    }
    total
}
