pub mod clock;
pub mod dashboard;
pub mod escalations;
pub mod lists;
pub mod preferences;
pub mod settings;
