//! Crafting materials, the Abidos recipe and the exchange table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Market purchases and sell-side listings move in lots of this size.
pub const LOT_SIZE: u64 = 100;
pub const MAX_CRAFT: u32 = 40;
pub const DEFAULT_CRAFT: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Material {
    Wood,
    SoftWood,
    SturdyWood,
    AbidosWood,
    Dust,
}

impl Material {
    pub const PURCHASABLE: [Material; 4] = [
        Material::Wood,
        Material::SoftWood,
        Material::SturdyWood,
        Material::AbidosWood,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Material::Wood => "Timber",
            Material::SoftWood => "Tender Timber",
            Material::SturdyWood => "Sturdy Timber",
            Material::AbidosWood => "Abidos Timber",
            Material::Dust => "Timber Powder",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Material::Wood => "🪵",
            Material::SoftWood => "🌿",
            Material::SturdyWood => "🔴",
            Material::AbidosWood => "✨",
            Material::Dust => "💨",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.name())
    }
}

/// Per-craft consumption and yield. Never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub abidos_wood: u64,
    pub soft_wood: u64,
    pub wood: u64,
    pub gold: u64,
    pub output: u64,
}

pub const RECIPE: Recipe = Recipe {
    abidos_wood: 33,
    soft_wood: 45,
    wood: 86,
    gold: 0,
    output: 15,
};

/// Consume `from` units of the source to produce `to` units of the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeRate {
    pub from: u64,
    pub to: u64,
}

impl ExchangeRate {
    const fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Source units needed to produce at least `amount`, in whole lots.
    pub fn input_for(&self, amount: u64) -> u64 {
        amount.div_ceil(self.to) * self.from
    }

    /// Largest part of `held` that converts in whole lots.
    pub fn usable(&self, held: u64) -> u64 {
        held / self.from * self.from
    }

    pub fn output_of(&self, input: u64) -> u64 {
        input / self.from * self.to
    }
}

pub const SOFT_TO_WOOD: ExchangeRate = ExchangeRate::new(25, 50);
pub const STURDY_TO_WOOD: ExchangeRate = ExchangeRate::new(5, 50);
pub const WOOD_TO_DUST: ExchangeRate = ExchangeRate::new(100, 80);
pub const SOFT_TO_DUST: ExchangeRate = ExchangeRate::new(50, 80);
pub const DUST_TO_SOFT: ExchangeRate = ExchangeRate::new(100, 50);
pub const DUST_TO_STURDY: ExchangeRate = ExchangeRate::new(100, 10);
pub const DUST_TO_ABIDOS: ExchangeRate = ExchangeRate::new(100, 10);

/// Wood made from one dust lot, routed through sturdy timber.
pub const DUST_TO_WOOD: ExchangeRate = ExchangeRate::new(
    DUST_TO_STURDY.from,
    DUST_TO_STURDY.to / STURDY_TO_WOOD.from * STURDY_TO_WOOD.to,
);

/// Round up to the market lot size.
pub fn ceil_to_lot(amount: u64) -> u64 {
    amount.div_ceil(LOT_SIZE) * LOT_SIZE
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Inventory {
    pub wood: u64,
    pub soft_wood: u64,
    pub sturdy_wood: u64,
    pub abidos_wood: u64,
    pub dust: u64,
}

impl Inventory {
    pub fn get(&self, material: Material) -> u64 {
        match material {
            Material::Wood => self.wood,
            Material::SoftWood => self.soft_wood,
            Material::SturdyWood => self.sturdy_wood,
            Material::AbidosWood => self.abidos_wood,
            Material::Dust => self.dust,
        }
    }

    pub fn get_mut(&mut self, material: Material) -> &mut u64 {
        match material {
            Material::Wood => &mut self.wood,
            Material::SoftWood => &mut self.soft_wood,
            Material::SturdyWood => &mut self.sturdy_wood,
            Material::AbidosWood => &mut self.abidos_wood,
            Material::Dust => &mut self.dust,
        }
    }

    /// Remove up to `amount`, returning what was actually taken.
    pub fn take(&mut self, material: Material, amount: u64) -> u64 {
        let held = self.get_mut(material);
        let taken = amount.min(*held);
        *held -= taken;
        taken
    }
}

/// Unit prices per 100 units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceTable {
    pub wood: f64,
    pub soft_wood: f64,
    pub sturdy_wood: f64,
    pub abidos_wood: f64,
}

impl PriceTable {
    pub fn per_lot(&self, material: Material) -> f64 {
        match material {
            Material::Wood => self.wood,
            Material::SoftWood => self.soft_wood,
            Material::SturdyWood => self.sturdy_wood,
            Material::AbidosWood => self.abidos_wood,
            Material::Dust => 0.0,
        }
    }
}

/// Quantities bought on the market, always whole lots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchases {
    pub wood: u64,
    pub soft_wood: u64,
    pub sturdy_wood: u64,
    pub abidos_wood: u64,
}

impl Purchases {
    pub fn get(&self, material: Material) -> u64 {
        match material {
            Material::Wood => self.wood,
            Material::SoftWood => self.soft_wood,
            Material::SturdyWood => self.sturdy_wood,
            Material::AbidosWood => self.abidos_wood,
            Material::Dust => 0,
        }
    }

    /// Record a market buy, rounded up to whole lots. Returns the rounded amount.
    pub(crate) fn buy(&mut self, material: Material, amount: u64) -> u64 {
        let lots = ceil_to_lot(amount);
        match material {
            Material::Wood => self.wood += lots,
            Material::SoftWood => self.soft_wood += lots,
            Material::SturdyWood => self.sturdy_wood += lots,
            Material::AbidosWood => self.abidos_wood += lots,
            Material::Dust => return 0,
        }
        lots
    }

    pub fn total_units(&self) -> u64 {
        self.wood + self.soft_wood + self.sturdy_wood + self.abidos_wood
    }

    pub fn cost(&self, prices: &PriceTable) -> f64 {
        Material::PURCHASABLE
            .iter()
            .map(|&m| (self.get(m) as f64 / LOT_SIZE as f64) * prices.per_lot(m))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dust_reaches_wood_through_sturdy() {
        assert_eq!(DUST_TO_WOOD, ExchangeRate { from: 100, to: 100 });
    }

    #[test]
    fn exchange_rounds_to_whole_lots() {
        assert_eq!(SOFT_TO_WOOD.input_for(51), 50);
        assert_eq!(SOFT_TO_WOOD.input_for(50), 25);
        assert_eq!(STURDY_TO_WOOD.usable(13), 10);
        assert_eq!(SOFT_TO_WOOD.output_of(75), 150);
        assert_eq!(ceil_to_lot(0), 0);
        assert_eq!(ceil_to_lot(2580), 2600);
    }

    #[test]
    fn take_never_goes_negative() {
        let mut inv = Inventory {
            dust: 40,
            ..Default::default()
        };
        assert_eq!(inv.take(Material::Dust, 100), 40);
        assert_eq!(inv.dust, 0);
    }

    #[test]
    fn purchases_cost_uses_per_lot_prices() {
        let mut purchases = Purchases::default();
        purchases.buy(Material::Wood, 2580);
        purchases.buy(Material::AbidosWood, 990);
        let prices = PriceTable {
            wood: 10.0,
            abidos_wood: 50.0,
            ..Default::default()
        };
        assert_eq!(purchases.wood, 2600);
        assert_eq!(purchases.cost(&prices), 260.0 + 500.0);
        assert_eq!(purchases.total_units(), 3600);
    }
}
