pub mod recent_store;
