use std::time::Duration;

use time::OffsetDateTime;

/// Hour of day (0-23) in the browser's local time zone.
#[cfg(target_arch = "wasm32")]
pub fn current_hour() -> u8 {
    js_sys::Date::new_0().get_hours() as u8
}

#[cfg(not(target_arch = "wasm32"))]
pub fn current_hour() -> u8 {
    OffsetDateTime::now_utc().hour()
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
