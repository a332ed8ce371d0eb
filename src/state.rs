//! Aggregate game state shared by every ledger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bank::{BankAccount, Loan};
use crate::cities::{default_cities, City};
use crate::clock::Clock;
use crate::error::EconomyError;
use crate::goods::{PurchaseLot, Transaction};
use crate::messages::MessageLog;
use crate::portfolio::InvestmentLot;

/// Everything a running game owns. Serde round-trips losslessly so the
/// host can persist it wherever it likes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameState {
    pub cash: i64,
    pub clock: Clock,
    pub cities: Vec<City>,
    pub city_index: usize,
    /// Cargo slots currently owned.
    pub capacity: u32,
    pub lots: Vec<PurchaseLot>,
    pub transactions: Vec<Transaction>,
    pub bank: BankAccount,
    pub loans: Vec<Loan>,
    pub next_loan_id: u32,
    pub investments: Vec<InvestmentLot>,
    pub goods_prices: HashMap<String, i64>,
    pub asset_prices: HashMap<String, i64>,
    /// One-day price multipliers, consumed by the next price generation.
    pub price_modifiers: HashMap<String, f64>,
    /// Savings APR drawn at the latest accrual.
    pub bank_apr: f64,
    /// Loan APR offered today.
    pub loan_apr_offer: f64,
    /// Day the last scheduled dividend run happened.
    pub last_dividend_day: u32,
    pub messages: MessageLog,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(default_cities(), 50)
    }
}

impl GameState {
    #[must_use]
    pub fn new(cities: Vec<City>, base_capacity: u32) -> Self {
        Self {
            cash: 0,
            clock: Clock::new(),
            cities,
            city_index: 0,
            capacity: base_capacity,
            lots: Vec::new(),
            transactions: Vec::new(),
            bank: BankAccount::default(),
            loans: Vec::new(),
            next_loan_id: 1,
            investments: Vec::new(),
            goods_prices: HashMap::new(),
            asset_prices: HashMap::new(),
            price_modifiers: HashMap::new(),
            bank_apr: 0.0,
            loan_apr_offer: 0.0,
            last_dividend_day: 1,
            messages: MessageLog::default(),
        }
    }

    #[must_use]
    pub fn current_city(&self) -> &City {
        // city_index is kept in range by travel; clamp guards stale saves.
        let idx = self.city_index.min(self.cities.len().saturating_sub(1));
        &self.cities[idx]
    }

    #[must_use]
    pub fn city_name(&self) -> &str {
        &self.current_city().name
    }

    /// Units of one good across all purchase lots.
    #[must_use]
    pub fn holdings(&self, good: &str) -> u32 {
        self.lots
            .iter()
            .filter(|l| l.good == good)
            .map(|l| l.quantity)
            .sum()
    }

    /// Total units held across all goods.
    #[must_use]
    pub fn inventory_count(&self) -> u32 {
        self.lots.iter().map(|l| l.quantity).sum()
    }

    /// Cargo slots currently occupied, size-weighted.
    #[must_use]
    pub fn used_slots(&self) -> u32 {
        self.lots
            .iter()
            .map(|l| l.quantity.saturating_mul(l.unit_size))
            .sum()
    }

    #[must_use]
    pub fn free_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.used_slots())
    }

    /// Whether `quantity` units of the given slot size would still fit.
    #[must_use]
    pub fn can_carry(&self, unit_size: u32, quantity: u32) -> bool {
        unit_size.saturating_mul(quantity) <= self.free_slots()
    }

    /// Today's unit price for a good.
    pub fn goods_price(&self, name: &str) -> Result<i64, EconomyError> {
        self.goods_prices
            .get(name)
            .copied()
            .ok_or_else(|| EconomyError::UnknownItem {
                name: name.to_string(),
            })
    }

    /// Today's unit price for an asset.
    pub fn asset_price(&self, symbol: &str) -> Result<i64, EconomyError> {
        self.asset_prices
            .get(symbol)
            .copied()
            .ok_or_else(|| EconomyError::UnknownItem {
                name: symbol.to_string(),
            })
    }

    /// Outstanding debt across all open loans.
    #[must_use]
    pub fn total_debt(&self) -> i64 {
        self.loans.iter().map(|l| l.remaining).sum()
    }

    /// Portfolio value at today's asset prices. Symbols without a price
    /// today value at the lot's purchase price.
    #[must_use]
    pub fn portfolio_value(&self) -> i64 {
        self.investments
            .iter()
            .map(|lot| {
                let unit = self
                    .asset_prices
                    .get(&lot.symbol)
                    .copied()
                    .unwrap_or(lot.unit_price);
                unit.saturating_mul(i64::from(lot.quantity))
            })
            .sum()
    }

    /// Inventory value at today's goods prices. Goods without a price
    /// today value at the lot's purchase price.
    #[must_use]
    pub fn inventory_value(&self) -> i64 {
        self.lots
            .iter()
            .map(|lot| {
                let unit = self
                    .goods_prices
                    .get(&lot.good)
                    .copied()
                    .unwrap_or(lot.unit_price);
                unit.saturating_mul(i64::from(lot.quantity))
            })
            .sum()
    }

    /// Gross wealth: cash, savings, inventory, and portfolio. Debt is
    /// not subtracted; the trading gate measures assets, not equity.
    #[must_use]
    pub fn net_worth(&self) -> i64 {
        self.cash + self.bank.balance + self.inventory_value() + self.portfolio_value()
    }

    /// Shorthand for an info line stamped with today's date.
    pub fn log_info(&mut self, tag: &str, text: &str) {
        let ts = self.clock.timestamp();
        self.messages.info(&ts, tag, text);
    }

    /// Shorthand for a warning line stamped with today's date.
    pub fn log_warn(&mut self, tag: &str, text: &str) {
        let ts = self.clock.timestamp();
        self.messages.warn(&ts, tag, text);
    }
}
