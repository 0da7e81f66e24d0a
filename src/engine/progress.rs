//! Planting-progress estimator
//!
//! Turns a crop's transplant and harvest months plus the time elapsed since
//! planting into a 0-100 completion figure for display. Every month counts
//! as exactly 30 days.

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::month::month0_from_name;

const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Progress {
    pub transplant_month0: u32,
    pub harvest_month0: u32,
    pub total_duration_days: i64,
    pub days_since_planting: i64,
    /// Always within 0..=100
    pub percent: u8,
}

/// Estimate how far a planted crop is toward harvest at `now`
///
/// Month names that cannot be resolved fall back to the month of
/// `planted_date`. Never fails.
pub fn estimate(
    plan_month: Option<&str>,
    harvest_month: Option<&str>,
    planted_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Progress {
    let planted_month0 = planted_date.month0();
    let transplant_month0 = plan_month
        .and_then(month0_from_name)
        .unwrap_or(planted_month0);
    let harvest_month0 = harvest_month
        .and_then(month0_from_name)
        .unwrap_or(planted_month0);

    let total_duration_days = duration_days(transplant_month0, harvest_month0);

    // Future planting dates (clock skew, bad data) count as not started
    let days_since_planting = (now - planted_date).num_days().max(0);

    Progress {
        transplant_month0,
        harvest_month0,
        total_duration_days,
        days_since_planting,
        percent: percent_complete(days_since_planting, total_duration_days),
    }
}

/// Nominal growing duration, wrapping into the next year when harvest
/// comes before transplant (Nov -> Feb is 90 days)
pub fn duration_days(transplant_month0: u32, harvest_month0: u32) -> i64 {
    let (t, h) = (transplant_month0 as i64, harvest_month0 as i64);
    let months = if h >= t { h - t } else { 12 - t + h };
    months * DAYS_PER_MONTH
}

fn percent_complete(days_since_planting: i64, total_duration_days: i64) -> u8 {
    if total_duration_days <= 0 {
        return 0;
    }
    // Ratio first, then scale: 87/300 is 28%, not 29%
    let percent = (days_since_planting.max(0) as f64 / total_duration_days as f64 * 100.0).floor();
    percent.clamp(0.0, 100.0) as u8
}
