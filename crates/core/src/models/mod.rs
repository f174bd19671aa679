pub mod asset;
pub mod defaults;
pub mod group;
pub mod metrics;
pub mod portfolio;
pub mod settings;
pub mod tag;
