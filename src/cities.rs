//! City catalogue: price multipliers and per-city travel event profiles.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How event-prone a city is. Counts are inclusive `[min, max]` draws
/// per category for one arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelEventProfile {
    /// Chance that any events fire at all on arrival.
    pub probability: f64,
    pub loss: (u32, u32),
    pub gain: (u32, u32),
    pub neutral: (u32, u32),
}

impl Default for TravelEventProfile {
    fn default() -> Self {
        Self {
            probability: 0.25,
            loss: (0, 1),
            gain: (0, 1),
            neutral: (0, 1),
        }
    }
}

/// One destination. Goods not named in `multipliers` trade at 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub multipliers: HashMap<String, f64>,
    pub events: TravelEventProfile,
}

impl City {
    #[must_use]
    pub fn multiplier_for(&self, good: &str) -> f64 {
        self.multipliers.get(good).copied().unwrap_or(1.0)
    }
}

fn city(
    name: &str,
    country: &str,
    multipliers: &[(&str, f64)],
    probability: f64,
    loss: (u32, u32),
    gain: (u32, u32),
    neutral: (u32, u32),
) -> City {
    City {
        name: name.to_string(),
        country: country.to_string(),
        multipliers: multipliers
            .iter()
            .map(|(g, m)| ((*g).to_string(), *m))
            .collect(),
        events: TravelEventProfile {
            probability,
            loss,
            gain,
            neutral,
        },
    }
}

/// Built-in city list.
#[must_use]
pub fn default_cities() -> Vec<City> {
    vec![
        city(
            "Warsaw",
            "Poland",
            &[("Cigars", 0.9), ("Whisky", 1.1), ("Car Parts", 0.85)],
            0.30,
            (0, 1),
            (0, 2),
            (1, 1),
        ),
        city(
            "Berlin",
            "Germany",
            &[("Laptop", 0.9), ("Car Parts", 0.8), ("Jewelry", 1.1)],
            0.25,
            (0, 2),
            (0, 1),
            (0, 1),
        ),
        city(
            "Amsterdam",
            "Netherlands",
            &[("Perfume", 1.15), ("Bootleg Spirits", 0.8)],
            0.32,
            (1, 3),
            (1, 3),
            (1, 2),
        ),
        city(
            "Paris",
            "France",
            &[("Perfume", 0.85), ("Jewelry", 1.2), ("Antique Furniture", 1.15)],
            0.28,
            (0, 2),
            (0, 2),
            (0, 1),
        ),
        city(
            "London",
            "United Kingdom",
            &[("Whisky", 0.8), ("Smartphone", 1.1), ("Sports Car", 1.2)],
            0.27,
            (0, 2),
            (0, 2),
            (0, 2),
        ),
        city(
            "Stockholm",
            "Sweden",
            &[("TV", 0.9), ("Smartphone", 0.95)],
            0.15,
            (0, 1),
            (0, 1),
            (0, 1),
        ),
        city(
            "Prague",
            "Czechia",
            &[("Whisky", 0.9), ("Antique Furniture", 0.8)],
            0.22,
            (0, 1),
            (0, 2),
            (0, 1),
        ),
        city(
            "Madrid",
            "Spain",
            &[("Cigars", 0.8), ("TV", 1.1), ("Unlicensed Arms", 1.2)],
            0.24,
            (0, 2),
            (0, 1),
            (0, 2),
        ),
    ]
}
