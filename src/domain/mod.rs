//! Calculator logic for every tool lives here.

pub mod auction;
pub mod crafting;
pub mod dispatch;
pub mod materials;
pub mod ranking;
pub mod recent_tools;
pub mod strategy;

pub use auction::{AuctionQuote, BidAnalysis, BidOutcome, DEFAULT_PARTY_SIZE, PARTY_SIZES};
pub use crafting::{
    best_dust_origin, calculate_combination, generate_all_combinations, CombinationResult,
    CraftRequest, DustSource, Step, StepKind, TotalNeeded,
};
pub use dispatch::{rank_missions, Mission, MissionBoard, MissionSort, RankedMission};
pub use materials::{Inventory, Material, PriceTable, Purchases};
pub use ranking::{mark_cheapest, sort_by_cost, CraftingReport, RankedCombination, ReportOrder};
pub use recent_tools::{RecentTools, Tool, ToolVisit};
pub use strategy::{DustOrigin, Intermediate, SourcingStrategy, StrategySet};
