pub mod aggregator;
pub mod charts;
pub mod escalation;
pub mod listing;
pub mod lpo;
pub mod settings;
