//! Cheapest-combination selection and display ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::crafting::{
    best_dust_origin, generate_all_combinations, CombinationResult, CraftRequest, DustSource,
    TotalNeeded,
};
use super::materials::{Inventory, PriceTable};

/// Costs closer than this are treated as the same price.
pub const COST_TOLERANCE: f64 = 0.1;
pub const DEFAULT_DISPLAY_LIMIT: usize = 5;

/// Display order of a report's combinations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportOrder {
    /// Cheapest first, near ties by purchase volume.
    #[default]
    Cost,
    /// Strategy catalog order.
    Catalog,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCombination {
    #[serde(flatten)]
    pub result: CombinationResult,
    pub is_cheapest: bool,
}

impl RankedCombination {
    pub fn total_purchased(&self) -> u64 {
        self.result.purchases.total_units()
    }
}

/// Drop invalid results and flag every result within tolerance of the minimum.
pub fn mark_cheapest(results: Vec<CombinationResult>) -> Vec<RankedCombination> {
    let valid: Vec<CombinationResult> = results.into_iter().filter(|r| r.is_valid).collect();
    let min_cost = valid
        .iter()
        .map(|r| r.cost)
        .min_by(|a, b| a.total_cmp(b))
        .unwrap_or(0.0);

    valid
        .into_iter()
        .map(|result| RankedCombination {
            is_cheapest: (result.cost - min_cost).abs() < COST_TOLERANCE,
            result,
        })
        .collect()
}

/// Sort by cost. Runs of results within tolerance of the run's cheapest entry
/// are ordered by total purchased units, smallest first.
pub fn sort_by_cost(ranked: &mut [RankedCombination]) {
    ranked.sort_by(|a, b| a.result.cost.total_cmp(&b.result.cost));

    let mut start = 0;
    while start < ranked.len() {
        let anchor = ranked[start].result.cost;
        let end = ranked[start..]
            .iter()
            .position(|r| r.result.cost - anchor >= COST_TOLERANCE)
            .map(|offset| start + offset)
            .unwrap_or(ranked.len());
        ranked[start..end].sort_by(|a, b| match a.total_purchased().cmp(&b.total_purchased()) {
            Ordering::Equal => a.result.cost.total_cmp(&b.result.cost),
            other => other,
        });
        start = end;
    }
}

/// Full optimizer pass for one set of inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CraftingReport {
    pub request: CraftRequest,
    pub total_needed: TotalNeeded,
    pub inventory: Inventory,
    pub combinations: Vec<RankedCombination>,
    pub best_dust_source: DustSource,
}

impl CraftingReport {
    pub fn build(request: CraftRequest, inventory: Inventory, prices: &PriceTable) -> Self {
        Self::build_ordered(request, inventory, prices, ReportOrder::Cost)
    }

    pub fn build_ordered(
        request: CraftRequest,
        inventory: Inventory,
        prices: &PriceTable,
        order: ReportOrder,
    ) -> Self {
        let total_needed = request.total_needed();
        let results =
            generate_all_combinations(&total_needed, &inventory, prices, request.bonus_rate);
        let mut combinations = mark_cheapest(results);
        if order == ReportOrder::Cost {
            sort_by_cost(&mut combinations);
        }

        tracing::debug!(
            target: "crafting",
            count = request.count,
            combinations = combinations.len(),
            cheapest = combinations.first().map(|c| c.result.cost),
            "crafting report built"
        );

        Self {
            request,
            total_needed,
            inventory,
            combinations,
            best_dust_source: best_dust_origin(prices),
        }
    }

    pub fn has_valid_method(&self) -> bool {
        !self.combinations.is_empty()
    }

    pub fn cheapest(&self) -> Option<&RankedCombination> {
        self.combinations.iter().find(|c| c.is_cheapest)
    }

    pub fn top(&self, limit: usize) -> &[RankedCombination] {
        &self.combinations[..limit.min(self.combinations.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::materials::Purchases;
    use crate::domain::strategy::StrategySet;

    fn result(cost: f64, units: u64) -> CombinationResult {
        CombinationResult {
            title: format!("{cost}/{units}"),
            strategies: StrategySet::ALL_DIRECT,
            steps: Vec::new(),
            purchases: Purchases {
                wood: units,
                ..Default::default()
            },
            material_cost: cost,
            craft_fee: 0.0,
            cost,
            cost_per_item: 0.0,
            is_valid: true,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn near_ties_are_all_cheapest() {
        let ranked = mark_cheapest(vec![result(10.0, 0), result(10.05, 0), result(10.2, 0)]);
        let flags: Vec<bool> = ranked.iter().map(|r| r.is_cheapest).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn invalid_results_are_dropped() {
        let mut bad = result(1.0, 0);
        bad.is_valid = false;
        let ranked = mark_cheapest(vec![bad, result(5.0, 0)]);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].is_cheapest);
    }

    #[test]
    fn ties_prefer_smaller_purchase_volume() {
        let mut ranked = mark_cheapest(vec![
            result(20.0, 100),
            result(10.0, 900),
            result(10.05, 300),
            result(15.0, 0),
        ]);
        sort_by_cost(&mut ranked);
        let titles: Vec<&str> = ranked.iter().map(|r| r.result.title.as_str()).collect();
        assert_eq!(titles, vec!["10.05/300", "10/900", "15/0", "20/100"]);
    }

    #[test]
    fn report_is_sorted_cheapest_first() {
        let prices = PriceTable {
            wood: 10.0,
            soft_wood: 20.0,
            sturdy_wood: 5.0,
            abidos_wood: 50.0,
        };
        let report = CraftingReport::build(CraftRequest::default(), Inventory::default(), &prices);
        assert_eq!(report.combinations.len(), 45);
        assert!(report.has_valid_method());
        let cheapest = report.cheapest().map(|c| c.result.cost).unwrap_or_default();
        assert!(report
            .combinations
            .iter()
            .all(|c| c.result.cost >= cheapest - COST_TOLERANCE));
        assert_eq!(report.top(DEFAULT_DISPLAY_LIMIT).len(), 5);
    }

    #[test]
    fn catalog_order_keeps_generation_order() {
        let prices = PriceTable {
            wood: 10.0,
            soft_wood: 20.0,
            sturdy_wood: 5.0,
            abidos_wood: 50.0,
        };
        let by_cost =
            CraftingReport::build(CraftRequest::default(), Inventory::default(), &prices);
        let catalog = CraftingReport::build_ordered(
            CraftRequest::default(),
            Inventory::default(),
            &prices,
            ReportOrder::Catalog,
        );

        assert_eq!(catalog.combinations[0].result.strategies, StrategySet::ALL_DIRECT);
        assert_eq!(catalog.combinations.len(), by_cost.combinations.len());
        let cheapest = catalog.cheapest().map(|c| c.result.cost);
        assert!(cheapest.is_some());
        let gap = cheapest.unwrap_or_default() - by_cost.combinations[0].result.cost;
        assert!(gap.abs() < COST_TOLERANCE);
    }
}
