//! Abidos crafting cost optimizer.
//!
//! Every combination of sourcing strategies is evaluated independently:
//! shortages are computed against held stock, then each material's strategy
//! is walked into a market purchase plan in whole lots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::materials::{
    ExchangeRate, Inventory, Material, PriceTable, Purchases, DEFAULT_CRAFT, LOT_SIZE, MAX_CRAFT,
    RECIPE,
};
use super::strategy::{all_strategy_sets, dust_rate, DustOrigin, SourcingStrategy, StrategySet};

/// Rarest first: higher tiers draw on shared dust before lower tiers can.
const PROCESS_ORDER: [Material; 3] = [Material::AbidosWood, Material::SoftWood, Material::Wood];

/// Craft count and success bonus as entered by the user.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftRequest {
    pub count: u32,
    /// Great-success bonus in percent; scales output only.
    pub bonus_rate: f64,
}

impl Default for CraftRequest {
    fn default() -> Self {
        Self {
            count: DEFAULT_CRAFT,
            bonus_rate: 0.0,
        }
    }
}

impl CraftRequest {
    /// Zero falls back to the default count; anything else is clamped to `1..=MAX_CRAFT`.
    pub fn new(count: u32, bonus_rate: f64) -> Self {
        let count = if count == 0 { DEFAULT_CRAFT } else { count };
        let bonus_rate = if bonus_rate.is_finite() && bonus_rate > 0.0 {
            bonus_rate
        } else {
            0.0
        };
        Self {
            count: count.clamp(1, MAX_CRAFT),
            bonus_rate,
        }
    }

    pub fn total_needed(&self) -> TotalNeeded {
        let count = u64::from(self.count);
        TotalNeeded {
            abidos_wood: count * RECIPE.abidos_wood,
            soft_wood: count * RECIPE.soft_wood,
            wood: count * RECIPE.wood,
            gold: count * RECIPE.gold,
            count: self.count,
        }
    }

    pub fn total_output(&self) -> f64 {
        f64::from(self.count) * RECIPE.output as f64 * (1.0 + self.bonus_rate / 100.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalNeeded {
    pub abidos_wood: u64,
    pub soft_wood: u64,
    pub wood: u64,
    pub gold: u64,
    pub count: u32,
}

impl TotalNeeded {
    pub fn get(&self, material: Material) -> u64 {
        match material {
            Material::Wood => self.wood,
            Material::SoftWood => self.soft_wood,
            Material::AbidosWood => self.abidos_wood,
            Material::SturdyWood | Material::Dust => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Purchase,
    Inventory,
    Conversion,
}

/// One line of a purchase plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    /// Shortage bought directly, rounded up to market lots.
    Buy {
        material: Material,
        shortage: u64,
        quantity: u64,
    },
    /// Held stock fed into a conversion.
    UseHeld {
        material: Material,
        quantity: u64,
        into: Material,
        yields: Option<u64>,
    },
    /// Market purchase fed into a conversion.
    BuyForConversion {
        material: Material,
        quantity: u64,
        into: Material,
    },
    /// Dust exchanged into the target, through `via` when set.
    ConvertDust {
        dust: u64,
        target: Material,
        via: Option<Material>,
        covers: u64,
    },
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Buy { .. } => StepKind::Purchase,
            Step::UseHeld { .. } => StepKind::Inventory,
            Step::BuyForConversion { .. } | Step::ConvertDust { .. } => StepKind::Conversion,
        }
    }

    pub fn is_conversion(&self) -> bool {
        self.kind() == StepKind::Conversion
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Buy {
                material,
                shortage,
                quantity,
            } => write!(f, "{material}: short {shortage} → buy {quantity}"),
            Step::UseHeld {
                material,
                quantity,
                into,
                yields: Some(yields),
            } => write!(f, "{material} {quantity} (held) → {into} {yields}"),
            Step::UseHeld {
                material,
                quantity,
                into,
                yields: None,
            } => write!(f, "{material} {quantity} (held) → {into}"),
            Step::BuyForConversion {
                material,
                quantity,
                into,
            } => write!(f, "{material} buy {quantity} → {into}"),
            Step::ConvertDust {
                dust,
                target,
                via: Some(via),
                covers,
            } => write!(
                f,
                "{} {dust} → {via} → {target} {covers}",
                Material::Dust
            ),
            Step::ConvertDust {
                dust,
                target,
                via: None,
                covers,
            } => write!(f, "{} {dust} → {target} {covers}", Material::Dust),
        }
    }
}

/// Outcome of evaluating one strategy triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationResult {
    pub title: String,
    pub strategies: StrategySet,
    pub steps: Vec<Step>,
    pub purchases: Purchases,
    pub material_cost: f64,
    pub craft_fee: f64,
    pub cost: f64,
    pub cost_per_item: f64,
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

/// Evaluate every strategy triple in the catalog. Results come back in
/// catalog order, valid or not.
pub fn generate_all_combinations(
    needed: &TotalNeeded,
    inventory: &Inventory,
    prices: &PriceTable,
    bonus_rate: f64,
) -> Vec<CombinationResult> {
    all_strategy_sets()
        .map(|strategies| calculate_combination(needed, inventory, prices, strategies, bonus_rate))
        .collect()
}

pub fn calculate_combination(
    needed: &TotalNeeded,
    inventory: &Inventory,
    prices: &PriceTable,
    strategies: StrategySet,
    bonus_rate: f64,
) -> CombinationResult {
    let mut plan = Plan {
        held: *inventory,
        purchases: Purchases::default(),
        steps: Vec::new(),
        warnings: Vec::new(),
    };

    let mut shortages = [0_u64; 3];
    for (slot, &material) in shortages.iter_mut().zip(PROCESS_ORDER.iter()) {
        let need = needed.get(material);
        let held = plan.held.get_mut(material);
        *slot = need.saturating_sub(*held);
        *held = (*held).saturating_sub(need);
    }

    for (&shortage, &material) in shortages.iter().zip(PROCESS_ORDER.iter()) {
        if shortage > 0 {
            plan.source(material, shortage, strategies.for_material(material));
        }
    }

    let material_cost = plan.purchases.cost(prices);
    let craft_fee = needed.gold as f64;
    let cost = material_cost + craft_fee;
    let request = CraftRequest {
        count: needed.count,
        bonus_rate,
    };
    let output = request.total_output();
    let cost_per_item = if output > 0.0 { cost / output } else { 0.0 };

    let mut warnings = plan.warnings;
    warnings.extend(price_warnings(&plan.purchases, prices));

    CombinationResult {
        title: strategies.title(),
        strategies,
        warnings,
        steps: plan.steps,
        purchases: plan.purchases,
        material_cost,
        craft_fee,
        cost,
        cost_per_item,
        is_valid: true,
    }
}

fn price_warnings(purchases: &Purchases, prices: &PriceTable) -> Vec<String> {
    Material::PURCHASABLE
        .iter()
        .filter(|&&m| purchases.get(m) > 0 && prices.per_lot(m) <= 0.0)
        .map(|m| format!("{} has no price; cost is understated", m.name()))
        .collect()
}

/// Working state for one combination.
struct Plan {
    held: Inventory,
    purchases: Purchases,
    steps: Vec<Step>,
    warnings: Vec<String>,
}

impl Plan {
    fn source(&mut self, target: Material, amount: u64, strategy: SourcingStrategy) {
        match strategy {
            SourcingStrategy::DirectPurchase => {
                let quantity = self.purchases.buy(target, amount);
                self.steps.push(Step::Buy {
                    material: target,
                    shortage: amount,
                    quantity,
                });
            }
            SourcingStrategy::ConvertFromIntermediate(source) => {
                // Only wood has an intermediate route.
                if target != Material::Wood {
                    self.unsourced(target, amount, strategy);
                    return;
                }
                let rate = source.to_wood();
                self.convert(source.material(), rate, rate.input_for(amount), target, |used| {
                    Some(rate.output_of(used))
                });
            }
            SourcingStrategy::ConvertFromDust(origin) => self.from_dust(target, amount, origin),
        }
    }

    fn unsourced(&mut self, target: Material, amount: u64, strategy: SourcingStrategy) {
        self.warnings.push(format!(
            "{} has no {} route; {amount} left unsourced",
            target.name(),
            strategy.label()
        ));
    }

    /// Draw `needed` units of `material` from held stock in whole `rate.from`
    /// lots, buying the remainder.
    fn convert(
        &mut self,
        material: Material,
        rate: ExchangeRate,
        needed: u64,
        into: Material,
        yields: impl Fn(u64) -> Option<u64>,
    ) {
        let used = rate.usable(self.held.get(material).min(needed));
        let to_buy = needed - used;

        if used > 0 {
            self.held.take(material, used);
            self.steps.push(Step::UseHeld {
                material,
                quantity: used,
                into,
                yields: yields(used),
            });
        }
        if to_buy > 0 {
            let quantity = self.purchases.buy(material, to_buy);
            self.steps.push(Step::BuyForConversion {
                material,
                quantity,
                into,
            });
        }
    }

    fn from_dust(&mut self, target: Material, amount: u64, origin: DustOrigin) {
        let Some(rate) = dust_rate(target) else {
            self.unsourced(target, amount, SourcingStrategy::ConvertFromDust(origin));
            return;
        };
        let dust_needed = amount.div_ceil(rate.to) * LOT_SIZE;

        let from_held = self.held.take(Material::Dust, dust_needed);
        if from_held > 0 {
            self.steps.push(Step::UseHeld {
                material: Material::Dust,
                quantity: from_held,
                into: target,
                yields: None,
            });
        }

        let remaining = dust_needed - from_held;
        if remaining > 0 {
            let path = origin.to_dust();
            self.convert(
                origin.material(),
                path,
                path.input_for(remaining),
                Material::Dust,
                |_| None,
            );
        }

        let via = (target == Material::Wood).then_some(Material::SturdyWood);
        self.steps.push(Step::ConvertDust {
            dust: dust_needed,
            target,
            via,
            covers: amount,
        });
    }
}

/// Cheapest material to grind into dust, by cost per 100 dust.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DustSource {
    pub origin: DustOrigin,
    pub cost_per_100_dust: f64,
}

pub fn best_dust_origin(prices: &PriceTable) -> DustSource {
    let candidates = [DustOrigin::Wood, DustOrigin::SoftWood].map(|origin| {
        let rate = origin.to_dust();
        let units_per_100_dust = rate.from as f64 * LOT_SIZE as f64 / rate.to as f64;
        DustSource {
            origin,
            cost_per_100_dust: prices.per_lot(origin.material()) * units_per_100_dust
                / LOT_SIZE as f64,
        }
    });

    candidates
        .iter()
        .copied()
        .filter(|c| c.cost_per_100_dust > 0.0)
        .min_by(|a, b| a.cost_per_100_dust.total_cmp(&b.cost_per_100_dust))
        .unwrap_or(candidates[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::Intermediate;

    fn scenario_prices() -> PriceTable {
        PriceTable {
            wood: 10.0,
            soft_wood: 20.0,
            sturdy_wood: 5.0,
            abidos_wood: 50.0,
        }
    }

    #[test]
    fn all_direct_reference_scenario() {
        let needed = CraftRequest::new(30, 0.0).total_needed();
        assert_eq!((needed.wood, needed.soft_wood, needed.abidos_wood), (2580, 1350, 990));

        let result = calculate_combination(
            &needed,
            &Inventory::default(),
            &scenario_prices(),
            StrategySet::ALL_DIRECT,
            0.0,
        );

        assert_eq!(result.purchases.wood, 2600);
        assert_eq!(result.purchases.soft_wood, 1400);
        assert_eq!(result.purchases.abidos_wood, 1000);
        assert_eq!(result.material_cost, 1040.0);
        assert_eq!(result.cost, 1040.0);
        assert!((result.cost_per_item - 1040.0 / 450.0).abs() < 1e-9);
        assert_eq!(result.purchases.sturdy_wood, 0);
        assert_eq!(result.steps.len(), 3);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn request_clamps_count() {
        assert_eq!(CraftRequest::new(0, 0.0).count, DEFAULT_CRAFT);
        assert_eq!(CraftRequest::new(99, 0.0).count, MAX_CRAFT);
        assert_eq!(CraftRequest::new(1, -5.0).bonus_rate, 0.0);
    }

    #[test]
    fn bonus_scales_output_not_consumption() {
        let request = CraftRequest::new(10, 50.0);
        assert_eq!(request.total_needed().wood, 860);
        assert_eq!(request.total_output(), 225.0);
    }

    #[test]
    fn held_stock_covers_shortage() {
        let needed = CraftRequest::new(1, 0.0).total_needed();
        let inventory = Inventory {
            wood: 100,
            soft_wood: 45,
            abidos_wood: 40,
            ..Default::default()
        };
        let result = calculate_combination(
            &needed,
            &inventory,
            &scenario_prices(),
            StrategySet::ALL_DIRECT,
            0.0,
        );
        assert_eq!(result.purchases.total_units(), 0);
        assert_eq!(result.cost, 0.0);
        assert!(result.steps.is_empty());
    }

    #[test]
    fn soft_swap_uses_held_in_whole_lots() {
        // 1 craft: wood short 86 → 2 swaps of 25 soft = 50 soft.
        let needed = CraftRequest::new(1, 0.0).total_needed();
        let inventory = Inventory {
            soft_wood: 45 + 30,
            ..Default::default()
        };
        let strategies = StrategySet {
            wood: SourcingStrategy::ConvertFromIntermediate(Intermediate::SoftWood),
            ..StrategySet::ALL_DIRECT
        };
        let result =
            calculate_combination(&needed, &inventory, &scenario_prices(), strategies, 0.0);

        // 30 soft left after the recipe; 25 usable, 25 more bought as one lot.
        assert_eq!(
            result.steps[1],
            Step::UseHeld {
                material: Material::SoftWood,
                quantity: 25,
                into: Material::Wood,
                yields: Some(50),
            }
        );
        assert_eq!(result.purchases.soft_wood, 100);
        assert_eq!(result.purchases.wood, 0);
    }

    #[test]
    fn dust_route_for_abidos_buys_origin_lots() {
        // 1 craft: abidos short 33 → 4 dust lots = 400 dust → 5 sets of 100 wood.
        let needed = CraftRequest::new(1, 0.0).total_needed();
        let strategies = StrategySet {
            abidos_wood: SourcingStrategy::ConvertFromDust(DustOrigin::Wood),
            ..StrategySet::ALL_DIRECT
        };
        let result = calculate_combination(
            &needed,
            &Inventory::default(),
            &scenario_prices(),
            strategies,
            0.0,
        );

        assert_eq!(result.purchases.abidos_wood, 0);
        assert_eq!(result.purchases.wood, 500 + 100);
        assert!(matches!(
            result.steps.first(),
            Some(Step::BuyForConversion {
                material: Material::Wood,
                quantity: 500,
                into: Material::Dust,
            })
        ));
        assert!(result.steps[1].is_conversion());
    }

    #[test]
    fn held_dust_is_claimed_by_higher_tier_first() {
        let needed = CraftRequest::new(1, 0.0).total_needed();
        let inventory = Inventory {
            dust: 400,
            ..Default::default()
        };
        let strategies = StrategySet {
            wood: SourcingStrategy::ConvertFromDust(DustOrigin::SoftWood),
            soft_wood: SourcingStrategy::DirectPurchase,
            abidos_wood: SourcingStrategy::ConvertFromDust(DustOrigin::SoftWood),
        };
        let result =
            calculate_combination(&needed, &inventory, &scenario_prices(), strategies, 0.0);

        assert_eq!(
            result.steps[0],
            Step::UseHeld {
                material: Material::Dust,
                quantity: 400,
                into: Material::AbidosWood,
                yields: None,
            }
        );
        // Wood then needs 100 dust from scratch: 2 sets of 50 soft.
        assert!(result.steps.iter().any(|s| matches!(
            s,
            Step::ConvertDust {
                dust: 100,
                target: Material::Wood,
                via: Some(Material::SturdyWood),
                covers: 86,
            }
        )));
        assert_eq!(result.purchases.soft_wood, 100 + 100);
    }

    #[test]
    fn sturdy_swap_draws_held_in_fives() {
        // Wood short 2580 → 52 swaps = 260 sturdy; 13 held, 10 usable.
        let needed = CraftRequest::new(30, 0.0).total_needed();
        let inventory = Inventory {
            sturdy_wood: 13,
            ..Default::default()
        };
        let strategies = StrategySet {
            wood: SourcingStrategy::ConvertFromIntermediate(Intermediate::SturdyWood),
            ..StrategySet::ALL_DIRECT
        };
        let result =
            calculate_combination(&needed, &inventory, &scenario_prices(), strategies, 0.0);

        assert!(result.steps.contains(&Step::UseHeld {
            material: Material::SturdyWood,
            quantity: 10,
            into: Material::Wood,
            yields: Some(100),
        }));
        assert_eq!(result.purchases.sturdy_wood, 300);
        assert_eq!(result.purchases.wood, 0);
    }

    #[test]
    fn held_origin_feeds_dust_in_whole_sets() {
        // Abidos short 990 → 9900 dust. Wood sets take 100, tender sets take 50.
        let needed = CraftRequest::new(30, 0.0).total_needed();
        let cases = [
            (DustOrigin::Wood, Material::Wood, 200, 12_200),
            (DustOrigin::SoftWood, Material::SoftWood, 100, 6_100),
        ];
        for (origin, material, used, bought) in cases {
            let inventory = Inventory {
                wood: needed.wood + 250,
                soft_wood: needed.soft_wood + 120,
                ..Default::default()
            };
            let strategies = StrategySet {
                abidos_wood: SourcingStrategy::ConvertFromDust(origin),
                ..StrategySet::ALL_DIRECT
            };
            let result =
                calculate_combination(&needed, &inventory, &scenario_prices(), strategies, 0.0);

            assert_eq!(
                result.steps[0],
                Step::UseHeld {
                    material,
                    quantity: used,
                    into: Material::Dust,
                    yields: None,
                }
            );
            assert_eq!(result.purchases.get(material), bought);
        }
    }

    #[test]
    fn strategy_without_route_is_flagged() {
        let needed = CraftRequest::new(1, 0.0).total_needed();
        let strategies = StrategySet {
            soft_wood: SourcingStrategy::ConvertFromIntermediate(Intermediate::SturdyWood),
            ..StrategySet::ALL_DIRECT
        };
        let result =
            calculate_combination(&needed, &Inventory::default(), &scenario_prices(), strategies, 0.0);

        assert_eq!(result.purchases.soft_wood, 0);
        assert_eq!(
            result.warnings,
            vec!["Tender Timber has no sturdy swap route; 45 left unsourced".to_string()]
        );
    }

    #[test]
    fn missing_price_is_reported_as_warning() {
        let needed = CraftRequest::new(1, 0.0).total_needed();
        let prices = PriceTable {
            wood: 10.0,
            ..Default::default()
        };
        let result =
            calculate_combination(&needed, &Inventory::default(), &prices, StrategySet::ALL_DIRECT, 0.0);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn generator_returns_whole_catalog() {
        let needed = CraftRequest::default().total_needed();
        let results =
            generate_all_combinations(&needed, &Inventory::default(), &scenario_prices(), 0.0);
        assert_eq!(results.len(), 45);
        assert!(results.iter().all(|r| r.is_valid));
    }

    #[test]
    fn best_dust_origin_prefers_cheaper_source() {
        let prices = PriceTable {
            wood: 10.0,
            soft_wood: 15.0,
            ..Default::default()
        };
        let source = best_dust_origin(&prices);
        assert_eq!(source.origin, DustOrigin::SoftWood);
        assert!((source.cost_per_100_dust - 9.375).abs() < 1e-9);

        // Equal cost keeps the first candidate.
        assert_eq!(best_dust_origin(&scenario_prices()).origin, DustOrigin::Wood);

        let free = best_dust_origin(&PriceTable::default());
        assert_eq!(free.origin, DustOrigin::Wood);
    }
}
