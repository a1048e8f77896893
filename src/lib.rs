//! Calculators for Lost Ark players: Abidos crafting cost optimizer, dispatch
//! mission comparator and auction break-even, plus the page server.

pub mod app;
pub mod domain;
pub mod infra;
pub mod util;
