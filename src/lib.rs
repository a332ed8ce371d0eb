//! Merchant Game Engine
//!
//! Platform-agnostic core logic for a single-player trading game.
//! This crate provides the economic ledgers, travel events, and daily
//! pipeline without UI or platform-specific dependencies.

pub mod assets;
pub mod bank;
pub mod cargo;
pub mod cities;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod goods;
pub mod messages;
pub mod portfolio;
pub mod seed;
pub mod state;
pub mod travel;

// Re-export commonly used types
pub use assets::{default_assets, find_asset, generate_asset_prices, Asset, AssetKind};
pub use bank::{
    accrue_bank_interest, accrue_loan_interest, deposit, issue_loan, randomize_loan_offer,
    repay, withdraw, BankAccount, BankTransaction, Loan, TxKind,
};
pub use cargo::{bundles_owned, extend_capacity, extend_cost, CapacityExtension};
pub use cities::{default_cities, City, TravelEventProfile};
pub use clock::Clock;
pub use config::{
    BankConfig, CargoConfig, ConfigError, EventsConfig, ExtendPricing, GameConfig,
    InvestmentsConfig, PricingConfig, TravelConfig,
};
pub use error::EconomyError;
pub use events::{
    can_trigger, default_registry, pick_weighted, trigger_events, EventCategory, EventContext,
    EventKind, EventOutcome, EventSpec,
};
pub use goods::{
    buy_good, default_goods, find_good, generate_prices, record_loss_fifo,
    record_loss_from_last, sell_good, Good, GoodTier, PurchaseLot, TradeKind, Transaction,
};
pub use messages::{Message, MessageLevel, MessageLog};
pub use portfolio::{
    accrue_dividends, age_lots, asset_holdings, buy_asset, sell_asset, InvestmentLot,
};
pub use seed::{derive_stream_seed, RngBundle};
pub use state::GameState;
pub use travel::{advance_day, travel_fee, travel_to};

use smallvec::SmallVec;

/// Trait for abstracting save persistence.
/// Platform-specific implementations should provide this.
pub trait SaveStorage {
    /// Persist the state under a slot name.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or stored.
    fn save(&mut self, slot: &str, state: &GameState) -> anyhow::Result<()>;

    /// Load the state stored under a slot name, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored payload cannot be read or parsed.
    fn load(&self, slot: &str) -> anyhow::Result<Option<GameState>>;
}

/// In-memory storage, useful for tests and hosts without a filesystem.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: std::collections::HashMap<String, String>,
}

impl SaveStorage for MemoryStorage {
    fn save(&mut self, slot: &str, state: &GameState) -> anyhow::Result<()> {
        let payload = serde_json::to_string(state)?;
        self.slots.insert(slot.to_string(), payload);
        Ok(())
    }

    fn load(&self, slot: &str) -> anyhow::Result<Option<GameState>> {
        match self.slots.get(slot) {
            Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
            None => Ok(None),
        }
    }
}

/// Facade wiring config, catalogs, state, and the seeded RNG streams.
pub struct GameEngine<S: SaveStorage> {
    config: GameConfig,
    goods: Vec<Good>,
    assets: Vec<Asset>,
    registry: Vec<EventSpec>,
    rngs: RngBundle,
    state: GameState,
    storage: S,
}

impl<S: SaveStorage> GameEngine<S> {
    /// Builds an engine with the default catalogs and opens day one.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: GameConfig, user_seed: u64, storage: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut engine = Self {
            state: GameState::new(default_cities(), config.cargo.base_capacity),
            goods: default_goods(),
            assets: default_assets(),
            registry: default_registry(),
            rngs: RngBundle::from_seed(user_seed),
            config,
            storage,
        };
        engine.state.cash = engine.config.starting_cash;
        engine.open_markets();
        Ok(engine)
    }

    // Day-one rates and prices, without advancing the clock.
    fn open_markets(&mut self) {
        bank::randomize_loan_offer(&mut self.state, &self.config.bank, &mut self.rngs.rates);
        let city = self.state.current_city().clone();
        let mut modifiers = std::mem::take(&mut self.state.price_modifiers);
        self.state.goods_prices = generate_prices(
            &self.goods,
            &city,
            &mut modifiers,
            &self.config.pricing,
            &mut self.rngs.market,
        );
        self.state.asset_prices =
            generate_asset_prices(&self.assets, &self.config.pricing, &mut self.rngs.market);
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn goods(&self) -> &[Good] {
        &self.goods
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Travels to the city at `city_index` and plays out the arrival.
    ///
    /// # Errors
    ///
    /// Propagates fee and destination failures; on error nothing changed.
    pub fn travel_to(
        &mut self,
        city_index: usize,
    ) -> Result<SmallVec<[EventOutcome; 4]>, EconomyError> {
        travel_to(
            &mut self.state,
            &self.config,
            &self.goods,
            &self.assets,
            &self.registry,
            &mut self.rngs,
            city_index,
        )
    }

    /// # Errors
    ///
    /// See [`goods::buy_good`].
    pub fn buy_good(&mut self, name: &str, quantity: u32) -> Result<i64, EconomyError> {
        buy_good(&mut self.state, &self.goods, name, quantity)
    }

    /// # Errors
    ///
    /// See [`goods::sell_good`].
    pub fn sell_good(&mut self, name: &str, quantity: u32) -> Result<i64, EconomyError> {
        sell_good(&mut self.state, name, quantity)
    }

    /// # Errors
    ///
    /// See [`cargo::extend_capacity`].
    pub fn extend_capacity(&mut self) -> Result<CapacityExtension, EconomyError> {
        extend_capacity(&mut self.state, &self.config.cargo)
    }

    /// # Errors
    ///
    /// See [`bank::deposit`].
    pub fn deposit(&mut self, amount: i64) -> Result<(), EconomyError> {
        deposit(&mut self.state, amount)
    }

    /// # Errors
    ///
    /// See [`bank::withdraw`].
    pub fn withdraw(&mut self, amount: i64) -> Result<(), EconomyError> {
        withdraw(&mut self.state, amount)
    }

    /// # Errors
    ///
    /// See [`bank::issue_loan`].
    pub fn take_loan(&mut self, amount: i64) -> Result<i64, EconomyError> {
        issue_loan(&mut self.state, &self.config.bank, amount)
    }

    /// # Errors
    ///
    /// See [`bank::repay`].
    pub fn repay_loan(&mut self, loan_id: u32, amount: i64) -> Result<i64, EconomyError> {
        repay(&mut self.state, loan_id, amount)
    }

    /// # Errors
    ///
    /// See [`portfolio::buy_asset`].
    pub fn buy_asset(&mut self, symbol: &str, quantity: u32) -> Result<i64, EconomyError> {
        buy_asset(
            &mut self.state,
            &self.assets,
            &self.config.investments,
            symbol,
            quantity,
        )
    }

    /// # Errors
    ///
    /// See [`portfolio::sell_asset`].
    pub fn sell_asset(&mut self, symbol: &str, quantity: u32) -> Result<i64, EconomyError> {
        sell_asset(&mut self.state, &self.config.investments, symbol, quantity)
    }

    /// Persists the current state under a slot name.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn save(&mut self, slot: &str) -> anyhow::Result<()> {
        self.storage.save(slot, &self.state)
    }

    /// Replaces the current state with a stored one, if present.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub fn load(&mut self, slot: &str) -> anyhow::Result<bool> {
        match self.storage.load(slot)? {
            Some(state) => {
                self.state = state;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_opens_with_prices_and_rates() {
        let engine = GameEngine::new(GameConfig::default(), 1, MemoryStorage::default())
            .unwrap();
        let state = engine.state();
        assert_eq!(state.cash, 1000);
        assert_eq!(state.clock.day, 1);
        assert_eq!(state.goods_prices.len(), engine.goods().len());
        assert_eq!(state.asset_prices.len(), engine.assets().len());
        assert!(state.loan_apr_offer > 0.0);
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let cfg = GameConfig {
            bank: BankConfig {
                bank_apr_range: (0.9, 0.1),
                ..BankConfig::default()
            },
            ..GameConfig::default()
        };
        assert!(GameEngine::new(cfg, 1, MemoryStorage::default()).is_err());
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut engine =
            GameEngine::new(GameConfig::default(), 7, MemoryStorage::default()).unwrap();
        engine.take_loan(5000).unwrap();
        engine.save("slot1").unwrap();
        let snapshot = engine.state().clone();

        engine.travel_to(1).unwrap();
        assert_ne!(engine.state(), &snapshot);

        assert!(engine.load("slot1").unwrap());
        assert_eq!(engine.state(), &snapshot);
        assert!(!engine.load("missing").unwrap());
    }

    #[test]
    fn same_seed_same_opening_prices() {
        let a = GameEngine::new(GameConfig::default(), 42, MemoryStorage::default()).unwrap();
        let b = GameEngine::new(GameConfig::default(), 42, MemoryStorage::default()).unwrap();
        assert_eq!(a.state().goods_prices, b.state().goods_prices);
        assert_eq!(a.state().asset_prices, b.state().asset_prices);
    }
}
