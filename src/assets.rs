//! Investable asset catalogue and daily asset price generation.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Stock,
    Commodity,
    Crypto,
}

impl AssetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Commodity => "commodity",
            Self::Crypto => "crypto",
        }
    }
}

/// One investable instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub symbol: String,
    pub name: String,
    pub base_price: i64,
    /// Fractional daily swing around the base price.
    pub variance: f64,
    pub kind: AssetKind,
}

impl Asset {
    fn new(symbol: &str, name: &str, base_price: i64, variance: f64, kind: AssetKind) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            base_price,
            variance,
            kind,
        }
    }
}

/// Built-in asset catalogue.
#[must_use]
pub fn default_assets() -> Vec<Asset> {
    use AssetKind::{Commodity, Crypto, Stock};
    vec![
        Asset::new("NTR", "Nordtrade Logistics", 120, 0.15, Stock),
        Asset::new("HVN", "Havenport Shipping", 85, 0.20, Stock),
        Asset::new("ARX", "Arxon Industries", 240, 0.25, Stock),
        Asset::new("VLT", "Veltbank Group", 160, 0.12, Stock),
        Asset::new("GOLD", "Gold", 1900, 0.08, Commodity),
        Asset::new("SILV", "Silver", 25, 0.12, Commodity),
        Asset::new("OIL", "Crude Oil", 80, 0.18, Commodity),
        Asset::new("BTC", "Bitcoin", 45_000, 0.40, Crypto),
        Asset::new("ETH", "Ether", 2800, 0.45, Crypto),
    ]
}

/// Looks an asset up by symbol.
#[must_use]
pub fn find_asset<'a>(catalog: &'a [Asset], symbol: &str) -> Option<&'a Asset> {
    catalog.iter().find(|a| a.symbol == symbol)
}

/// Generates the day's asset prices around each base price.
pub fn generate_asset_prices(
    catalog: &[Asset],
    pricing: &PricingConfig,
    rng: &mut impl Rng,
) -> HashMap<String, i64> {
    let mut prices = HashMap::with_capacity(catalog.len());
    for asset in catalog {
        let swing = rng.gen_range(1.0 - asset.variance..=1.0 + asset.variance);
        let raw = (asset.base_price as f64) * swing;
        #[allow(clippy::cast_possible_truncation)]
        let price = (raw.round() as i64).max(pricing.min_unit_price);
        prices.insert(asset.symbol.clone(), price);
    }
    prices
}
