pub mod assets;
pub mod format;
pub mod input;
pub mod persistence;
pub mod version;
