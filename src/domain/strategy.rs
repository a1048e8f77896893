//! Static catalog of ways to source each top-level material.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::materials::{
    ExchangeRate, Material, DUST_TO_ABIDOS, DUST_TO_SOFT, DUST_TO_WOOD, SOFT_TO_DUST,
    SOFT_TO_WOOD, STURDY_TO_WOOD, WOOD_TO_DUST,
};

/// Material that converts straight into wood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intermediate {
    SoftWood,
    SturdyWood,
}

impl Intermediate {
    pub fn material(&self) -> Material {
        match self {
            Intermediate::SoftWood => Material::SoftWood,
            Intermediate::SturdyWood => Material::SturdyWood,
        }
    }

    pub fn to_wood(&self) -> ExchangeRate {
        match self {
            Intermediate::SoftWood => SOFT_TO_WOOD,
            Intermediate::SturdyWood => STURDY_TO_WOOD,
        }
    }
}

/// Material ground into dust when held dust runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DustOrigin {
    Wood,
    SoftWood,
}

impl DustOrigin {
    pub fn material(&self) -> Material {
        match self {
            DustOrigin::Wood => Material::Wood,
            DustOrigin::SoftWood => Material::SoftWood,
        }
    }

    pub fn to_dust(&self) -> ExchangeRate {
        match self {
            DustOrigin::Wood => WOOD_TO_DUST,
            DustOrigin::SoftWood => SOFT_TO_DUST,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "camelCase")]
pub enum SourcingStrategy {
    DirectPurchase,
    ConvertFromIntermediate(Intermediate),
    ConvertFromDust(DustOrigin),
}

impl SourcingStrategy {
    pub fn is_direct(&self) -> bool {
        matches!(self, SourcingStrategy::DirectPurchase)
    }

    /// Short label used when composing combination titles.
    pub fn label(&self) -> &'static str {
        match self {
            SourcingStrategy::DirectPurchase => "direct",
            SourcingStrategy::ConvertFromIntermediate(Intermediate::SoftWood) => "tender swap",
            SourcingStrategy::ConvertFromIntermediate(Intermediate::SturdyWood) => "sturdy swap",
            SourcingStrategy::ConvertFromDust(DustOrigin::Wood) => "powder (timber)",
            SourcingStrategy::ConvertFromDust(DustOrigin::SoftWood) => "powder (tender)",
        }
    }
}

impl fmt::Display for SourcingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dust lot → target conversion for a dust-sourced material.
pub fn dust_rate(target: Material) -> Option<ExchangeRate> {
    match target {
        Material::Wood => Some(DUST_TO_WOOD),
        Material::SoftWood => Some(DUST_TO_SOFT),
        Material::AbidosWood => Some(DUST_TO_ABIDOS),
        Material::SturdyWood | Material::Dust => None,
    }
}

const DUST_ORIGINS: [SourcingStrategy; 2] = [
    SourcingStrategy::ConvertFromDust(DustOrigin::Wood),
    SourcingStrategy::ConvertFromDust(DustOrigin::SoftWood),
];

pub const WOOD_STRATEGIES: [SourcingStrategy; 5] = [
    SourcingStrategy::DirectPurchase,
    SourcingStrategy::ConvertFromIntermediate(Intermediate::SoftWood),
    SourcingStrategy::ConvertFromIntermediate(Intermediate::SturdyWood),
    DUST_ORIGINS[0],
    DUST_ORIGINS[1],
];

pub const SOFT_WOOD_STRATEGIES: [SourcingStrategy; 3] = [
    SourcingStrategy::DirectPurchase,
    DUST_ORIGINS[0],
    DUST_ORIGINS[1],
];

pub const ABIDOS_WOOD_STRATEGIES: [SourcingStrategy; 3] = [
    SourcingStrategy::DirectPurchase,
    DUST_ORIGINS[0],
    DUST_ORIGINS[1],
];

/// One chosen strategy per top-level material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySet {
    pub wood: SourcingStrategy,
    pub soft_wood: SourcingStrategy,
    pub abidos_wood: SourcingStrategy,
}

impl StrategySet {
    pub const ALL_DIRECT: StrategySet = StrategySet {
        wood: SourcingStrategy::DirectPurchase,
        soft_wood: SourcingStrategy::DirectPurchase,
        abidos_wood: SourcingStrategy::DirectPurchase,
    };

    pub fn for_material(&self, material: Material) -> SourcingStrategy {
        match material {
            Material::Wood => self.wood,
            Material::SoftWood => self.soft_wood,
            Material::AbidosWood => self.abidos_wood,
            Material::SturdyWood | Material::Dust => SourcingStrategy::DirectPurchase,
        }
    }

    pub fn title(&self) -> String {
        let parts: Vec<String> = [
            (Material::Wood, self.wood),
            (Material::SoftWood, self.soft_wood),
            (Material::AbidosWood, self.abidos_wood),
        ]
        .iter()
        .filter(|(_, strategy)| !strategy.is_direct())
        .map(|(material, strategy)| format!("{}{}", material.emoji(), strategy.label()))
        .collect();

        if parts.is_empty() {
            "💰 All direct purchase".to_string()
        } else {
            format!("🔧 {}", parts.join(" + "))
        }
    }
}

/// Every strategy triple in catalog order (wood outermost).
pub fn all_strategy_sets() -> impl Iterator<Item = StrategySet> {
    WOOD_STRATEGIES.into_iter().flat_map(|wood| {
        SOFT_WOOD_STRATEGIES.into_iter().flat_map(move |soft_wood| {
            ABIDOS_WOOD_STRATEGIES.into_iter().map(move |abidos_wood| StrategySet {
                wood,
                soft_wood,
                abidos_wood,
            })
        })
    })
}
