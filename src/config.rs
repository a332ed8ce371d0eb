//! Immutable game configuration, complete at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} range invalid: min {min} must not exceed max {max}")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be at least {min}, got {value}")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
}

fn check_range(field: &'static str, range: (f64, f64)) -> Result<(), ConfigError> {
    if range.0 > range.1 || range.0 < 0.0 {
        return Err(ConfigError::RangeViolation {
            field,
            min: range.0,
            max: range.1,
        });
    }
    Ok(())
}

fn check_min(field: &'static str, min: f64, value: f64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::MinViolation { field, min, value });
    }
    Ok(())
}

/// Bank ledger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Daily-rate annualized range the bank APR is redrawn from each day.
    pub bank_apr_range: (f64, f64),
    /// Fallback bank APR when the configured range is unusable.
    pub bank_apr_fallback: f64,
    /// Range the daily loan APR offer is drawn from.
    pub loan_apr_range: (f64, f64),
    /// Fallback loan APR when the configured range is unusable.
    pub loan_apr_fallback: f64,
    /// Largest single loan principal.
    pub loan_max_amount: i64,
    /// Commission rate on a freshly issued loan.
    pub loan_commission_rate: f64,
    /// Commission rate once the open-loan count exceeds the threshold.
    pub loan_commission_rate_high: f64,
    /// Open-loan count beyond which the high commission applies.
    pub loan_commission_threshold: usize,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            bank_apr_range: (0.01, 0.03),
            bank_apr_fallback: 0.02,
            loan_apr_range: (0.01, 0.20),
            loan_apr_fallback: 0.10,
            loan_max_amount: 10_000,
            loan_commission_rate: 0.10,
            loan_commission_rate_high: 0.30,
            loan_commission_threshold: 10,
        }
    }
}

impl BankConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("bank_apr_range", self.bank_apr_range)?;
        check_range("loan_apr_range", self.loan_apr_range)?;
        check_min("loan_max_amount", 1.0, self.loan_max_amount as f64)?;
        check_min("loan_commission_rate", 0.0, self.loan_commission_rate)?;
        check_min(
            "loan_commission_rate_high",
            0.0,
            self.loan_commission_rate_high,
        )?;
        Ok(())
    }
}

/// Pricing curve for capacity extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendPricing {
    /// `base + base * factor * bundles`
    Linear,
    /// `base * factor^bundles`
    Exponential,
}

/// Cargo hold parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoConfig {
    /// Slots every new game starts with.
    pub base_capacity: u32,
    /// Slots added per purchased extension.
    pub extend_step: u32,
    /// Price of the first extension.
    pub extend_base_cost: i64,
    /// Growth factor applied per already-purchased bundle.
    pub extend_cost_factor: f64,
    pub extend_pricing: ExtendPricing,
}

impl Default for CargoConfig {
    fn default() -> Self {
        Self {
            base_capacity: 50,
            extend_step: 10,
            extend_base_cost: 10_000,
            extend_cost_factor: 2.0,
            extend_pricing: ExtendPricing::Linear,
        }
    }
}

impl CargoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("base_capacity", 1.0, f64::from(self.base_capacity))?;
        check_min("extend_step", 1.0, f64::from(self.extend_step))?;
        check_min("extend_base_cost", 1.0, self.extend_base_cost as f64)?;
        check_min("extend_cost_factor", 1.0, self.extend_cost_factor)?;
        Ok(())
    }
}

/// Investment trading parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestmentsConfig {
    /// Commission rate on purchases.
    pub buy_fee_rate: f64,
    /// Commission floor on purchases.
    pub buy_fee_min: i64,
    /// Commission rate on sales, applied to gross proceeds.
    pub sell_fee_rate: f64,
    /// Commission floor on sales.
    pub sell_fee_min: i64,
    /// Days between scheduled dividend payouts.
    pub dividend_interval_days: u32,
    /// A lot must be held this many days to earn a dividend.
    pub dividend_min_holding_days: u32,
    /// Scheduled dividend rate range on eligible lot value.
    pub dividend_rate_range: (f64, f64),
    /// Net worth required before trading unlocks.
    pub min_wealth_to_unlock_trading: i64,
}

impl Default for InvestmentsConfig {
    fn default() -> Self {
        Self {
            buy_fee_rate: 0.001,
            buy_fee_min: 1,
            sell_fee_rate: 0.003,
            sell_fee_min: 1,
            dividend_interval_days: 11,
            dividend_min_holding_days: 10,
            dividend_rate_range: (0.005, 0.02),
            min_wealth_to_unlock_trading: 60_000,
        }
    }
}

impl InvestmentsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("buy_fee_rate", 0.0, self.buy_fee_rate)?;
        check_min("sell_fee_rate", 0.0, self.sell_fee_rate)?;
        check_min(
            "dividend_interval_days",
            1.0,
            f64::from(self.dividend_interval_days),
        )?;
        check_range("dividend_rate_range", self.dividend_rate_range)?;
        check_min(
            "min_wealth_to_unlock_trading",
            0.0,
            self.min_wealth_to_unlock_trading as f64,
        )?;
        Ok(())
    }
}

/// Travel event tuning: loss/gain percentages and modifier ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub robbery_loss_pct: (f64, f64),
    pub fire_total_pct: (f64, f64),
    pub fire_per_good_pct: (f64, f64),
    pub flood_total_pct: (f64, f64),
    pub flood_per_good_pct: (f64, f64),
    pub customs_duty_pct: (f64, f64),
    pub cash_damage_pct: (f64, f64),
    /// Absolute clamp on cash-damage repair bills.
    pub cash_damage_clamp: (i64, i64),
    pub dividend_pct: (f64, f64),
    /// Bank-correction credit rate on the account balance.
    pub bank_correction_pct: (f64, f64),
    /// Floor on the bank-correction credit.
    pub bank_correction_min: i64,
    /// Promotional price multiplier range (below 1).
    pub promo_multiplier: (f64, f64),
    pub oversupply_multiplier: (f64, f64),
    pub shortage_multiplier: (f64, f64),
    pub loyal_discount_rate: f64,
    /// Portfolio and market boom multiplier range.
    pub boom_multiplier: (f64, f64),
    /// Portfolio and market crash multiplier range.
    pub crash_multiplier: (f64, f64),
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            robbery_loss_pct: (0.10, 0.40),
            fire_total_pct: (0.20, 0.60),
            fire_per_good_pct: (0.20, 0.60),
            flood_total_pct: (0.30, 0.80),
            flood_per_good_pct: (0.30, 0.80),
            customs_duty_pct: (0.05, 0.15),
            cash_damage_pct: (0.01, 0.05),
            cash_damage_clamp: (50, 2000),
            dividend_pct: (0.005, 0.02),
            bank_correction_pct: (0.01, 0.05),
            bank_correction_min: 10,
            promo_multiplier: (0.4, 0.7),
            oversupply_multiplier: (0.3, 0.6),
            shortage_multiplier: (1.8, 2.2),
            loyal_discount_rate: 0.05,
            boom_multiplier: (1.5, 3.0),
            crash_multiplier: (0.3, 0.7),
        }
    }
}

impl EventsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("robbery_loss_pct", self.robbery_loss_pct)?;
        check_range("fire_total_pct", self.fire_total_pct)?;
        check_range("fire_per_good_pct", self.fire_per_good_pct)?;
        check_range("flood_total_pct", self.flood_total_pct)?;
        check_range("flood_per_good_pct", self.flood_per_good_pct)?;
        check_range("customs_duty_pct", self.customs_duty_pct)?;
        check_range("cash_damage_pct", self.cash_damage_pct)?;
        check_range("dividend_pct", self.dividend_pct)?;
        check_range("bank_correction_pct", self.bank_correction_pct)?;
        check_range("promo_multiplier", self.promo_multiplier)?;
        check_range("oversupply_multiplier", self.oversupply_multiplier)?;
        check_range("shortage_multiplier", self.shortage_multiplier)?;
        check_range("boom_multiplier", self.boom_multiplier)?;
        check_range("crash_multiplier", self.crash_multiplier)?;
        check_min("loyal_discount_rate", 0.0, self.loyal_discount_rate)?;
        Ok(())
    }
}

/// Price generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Floor every generated unit price is clamped to.
    pub min_unit_price: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self { min_unit_price: 1 }
    }
}

impl PricingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("min_unit_price", 1.0, self.min_unit_price as f64)
    }
}

/// Travel fee parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    pub base_fee: i64,
    /// Added per occupied cargo slot.
    pub fee_per_cargo_unit: i64,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            base_fee: 100,
            fee_per_cargo_unit: 1,
        }
    }
}

impl TravelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("base_fee", 0.0, self.base_fee as f64)?;
        check_min("fee_per_cargo_unit", 0.0, self.fee_per_cargo_unit as f64)?;
        Ok(())
    }
}

/// Aggregate configuration injected into the engine at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cash a new game starts with.
    pub starting_cash: i64,
    pub bank: BankConfig,
    pub cargo: CargoConfig,
    pub investments: InvestmentsConfig,
    pub events: EventsConfig,
    pub pricing: PricingConfig,
    pub travel: TravelConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_cash: 1000,
            bank: BankConfig::default(),
            cargo: CargoConfig::default(),
            investments: InvestmentsConfig::default(),
            events: EventsConfig::default(),
            pricing: PricingConfig::default(),
            travel: TravelConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("starting_cash", 0.0, self.starting_cash as f64)?;
        self.bank.validate()?;
        self.cargo.validate()?;
        self.investments.validate()?;
        self.events.validate()?;
        self.pricing.validate()?;
        self.travel.validate()?;
        Ok(())
    }
}
