pub mod charts;
pub mod dashboard;
pub mod emails;
pub mod escalations;
pub mod notifications;
pub mod queue;
pub mod settings;
pub mod widgets;
