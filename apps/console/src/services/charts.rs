//! Shapes raw dashboard arrays into chart-ready series.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{HourlyVolume, StatusCount};

const HOURS_PER_DAY: u8 = 24;
const WINDOW_PADDING: u8 = 2;
const FALLBACK_SPAN: u8 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourBucket {
    pub hour: u8,
    pub volume: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// 12-hour clock label: `0 -> "12AM"`, `12 -> "12PM"`, `13 -> "1PM"`.
pub fn hour_label(hour: u8) -> String {
    let hour = hour % HOURS_PER_DAY;
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let display = match hour % 12 {
        0 => 12,
        other => other,
    };
    format!("{display}{suffix}")
}

/// Reads the hour out of an `"H:MM"` / `"HH:MM"` bucket label.
pub fn parse_hour(raw: &str) -> Option<u8> {
    let hour = raw.trim().split(':').next()?.trim().parse::<u8>().ok()?;
    (hour < HOURS_PER_DAY).then_some(hour)
}

/// Expands a sparse hourly series to the fixed 24 buckets.
pub fn fill_day(raw: &[HourlyVolume]) -> Vec<HourBucket> {
    let mut volumes: BTreeMap<u8, u64> = BTreeMap::new();
    for entry in raw {
        match parse_hour(&entry.hour) {
            Some(hour) => *volumes.entry(hour).or_default() += entry.volume,
            None => debug!(hour = %entry.hour, "skipping unparsable hourly bucket"),
        }
    }
    (0..HOURS_PER_DAY)
        .map(|hour| HourBucket {
            hour,
            volume: volumes.get(&hour).copied().unwrap_or(0),
        })
        .collect()
}

/// Trims a day of buckets to the interesting part.
///
/// With activity: every bucket between the first and last non-empty hour,
/// padded by two hours on each side and clamped to the day. Without any
/// activity: the eight hours ending at `current_hour`.
pub fn window_buckets(buckets: &[HourBucket], current_hour: u8) -> Vec<HourBucket> {
    let active = buckets.iter().filter(|bucket| bucket.volume > 0);
    let bounds = active.fold(None, |acc: Option<(u8, u8)>, bucket| match acc {
        None => Some((bucket.hour, bucket.hour)),
        Some((lo, hi)) => Some((lo.min(bucket.hour), hi.max(bucket.hour))),
    });

    let (start, end) = match bounds {
        Some((min_hour, max_hour)) => (
            min_hour.saturating_sub(WINDOW_PADDING),
            (max_hour + WINDOW_PADDING).min(HOURS_PER_DAY - 1),
        ),
        None => {
            let current = current_hour.min(HOURS_PER_DAY - 1);
            (current.saturating_sub(FALLBACK_SPAN - 1), current)
        }
    };

    buckets
        .iter()
        .filter(|bucket| (start..=end).contains(&bucket.hour))
        .copied()
        .collect()
}

pub fn hourly_window(raw: &[HourlyVolume], current_hour: u8) -> Vec<HourBucket> {
    window_buckets(&fill_day(raw), current_hour)
}

pub fn hourly_series(raw: &[HourlyVolume], current_hour: u8) -> ChartSeries {
    let window = hourly_window(raw, current_hour);
    ChartSeries {
        labels: window.iter().map(|bucket| hour_label(bucket.hour)).collect(),
        values: window.iter().map(|bucket| bucket.volume).collect(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusColor {
    Red,
    Orange,
    Yellow,
    Green,
    Gray,
}

impl StatusColor {
    /// Substring heuristic over free-form backend status names; distinct
    /// statuses can share a colour.
    pub fn for_status(status: &str) -> Self {
        let status = status.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|needle| status.contains(needle));

        if has(&["critical", "urgent"]) {
            Self::Red
        } else if has(&["high", "processing"]) {
            Self::Orange
        } else if has(&["medium", "pending"]) {
            Self::Yellow
        } else if has(&["low", "complete"]) {
            Self::Green
        } else {
            Self::Gray
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Red => "#ef4444",
            Self::Orange => "#f97316",
            Self::Yellow => "#eab308",
            Self::Green => "#22c55e",
            Self::Gray => "#94a3b8",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusSlice {
    pub label: String,
    pub count: u64,
    pub color: StatusColor,
}

pub fn status_slices(distribution: &[StatusCount]) -> Vec<StatusSlice> {
    distribution
        .iter()
        .map(|entry| StatusSlice {
            label: entry.status.clone(),
            count: entry.count,
            color: StatusColor::for_status(&entry.status),
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChartKind {
    Bars,
    Distribution,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<&'static str>,
}

impl ChartSpec {
    pub fn bars(title: impl Into<String>, series: ChartSeries) -> Self {
        let colors = vec!["#3b82f6"; series.values.len()];
        Self {
            kind: ChartKind::Bars,
            title: title.into(),
            labels: series.labels,
            values: series.values,
            colors,
        }
    }

    pub fn distribution(title: impl Into<String>, slices: &[StatusSlice]) -> Self {
        Self {
            kind: ChartKind::Distribution,
            title: title.into(),
            labels: slices.iter().map(|slice| slice.label.clone()).collect(),
            values: slices.iter().map(|slice| slice.count).collect(),
            colors: slices.iter().map(|slice| slice.color.hex()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|value| *value == 0)
    }

    pub fn max_value(&self) -> u64 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }
}

/// Charts owned by one mounted view, keyed by name.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<String, ChartSpec>,
}

impl ChartRegistry {
    /// Registering under an existing name replaces (and returns) the old chart.
    pub fn register(&mut self, name: impl Into<String>, spec: ChartSpec) -> Option<ChartSpec> {
        self.charts.insert(name.into(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&ChartSpec> {
        self.charts.get(name)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Releases every chart; returns how many were held.
    pub fn dispose(&mut self) -> usize {
        let released = self.charts.len();
        for name in self.charts.keys() {
            debug!(chart = %name, "disposing chart");
        }
        self.charts.clear();
        released
    }
}
