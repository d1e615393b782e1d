use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::social::Platform;

/// Target depth of the near-term queue, in days of scheduled posts.
pub const TARGET_QUEUE_DAYS: i64 = 7;

/// Hard cap on AI generations per organization per pass.
pub const MAX_GENERATIONS_PER_PASS: usize = 3;

/// Publishing slots, one per day offset, cycled modulo 4.
pub const BEST_HOURS: [u32; 4] = [9, 12, 17, 20];

/// How many posts to generate this pass given the count already scheduled
/// within the next `TARGET_QUEUE_DAYS` days.
pub fn posts_needed(scheduled_count: i64) -> usize {
    let needed = (TARGET_QUEUE_DAYS - scheduled_count).max(0) as usize;
    needed.min(MAX_GENERATIONS_PER_PASS)
}

/// Deterministic slot for the i-th post of a batch: tomorrow + i, at the
/// best hour for that offset, on the hour UTC.
pub fn slot_for_offset(today: NaiveDate, offset: usize) -> DateTime<Utc> {
    let date = today + chrono::Duration::days(offset as i64 + 1);
    let hour = BEST_HOURS[offset % BEST_HOURS.len()];
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).expect("valid best-hour slot"))
}

/// Platform for the i-th post: round-robin over the organization's
/// connected platforms, Instagram when none are connected.
pub fn platform_for_offset(connected: &[Platform], offset: usize) -> Platform {
    if connected.is_empty() {
        Platform::Instagram
    } else {
        connected[offset % connected.len()]
    }
}
