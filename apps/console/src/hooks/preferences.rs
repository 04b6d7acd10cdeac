//! UI preferences kept in browser local storage.

use gloo_storage::{LocalStorage, Storage};
use tracing::warn;

use crate::config::clamp_page_size;
use crate::services::settings::ResourceKind;

const QUEUE_PAGE_SIZE_KEY: &str = "lpo-console.queue.page-size";
const SETTINGS_TAB_KEY: &str = "lpo-console.settings.tab";

pub fn queue_page_size(default: u32) -> u32 {
    LocalStorage::get::<u64>(QUEUE_PAGE_SIZE_KEY)
        .map(clamp_page_size)
        .unwrap_or(default)
}

pub fn store_queue_page_size(size: u32) {
    if let Err(err) = LocalStorage::set(QUEUE_PAGE_SIZE_KEY, size) {
        warn!(%err, "failed to persist queue page size");
    }
}

pub fn settings_tab() -> ResourceKind {
    LocalStorage::get::<ResourceKind>(SETTINGS_TAB_KEY).unwrap_or(ResourceKind::PriceTolerance)
}

pub fn store_settings_tab(kind: ResourceKind) {
    if let Err(err) = LocalStorage::set(SETTINGS_TAB_KEY, kind) {
        warn!(%err, "failed to persist settings tab");
    }
}
