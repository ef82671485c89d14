use crate::models::{AppData, SummaryResponse};
use crate::state::Clock;
use chrono::NaiveDateTime;
use std::collections::HashSet;

pub fn build_summary(data: &AppData, client_id: Option<u64>, clock: &Clock) -> SummaryResponse {
    build_summary_at(data, client_id, clock.now())
}

pub fn build_summary_at(
    data: &AppData,
    client_id: Option<u64>,
    now: NaiveDateTime,
) -> SummaryResponse {
    let today = now.date();

    let mut total_alerts = 0u64;
    let mut alerts_today = 0u64;
    let mut keywords = HashSet::new();
    let mut subreddits = HashSet::new();
    let mut latest_alert_at: Option<NaiveDateTime> = None;

    for alert in data.alerts_for(client_id) {
        total_alerts = total_alerts.saturating_add(1);
        if alert.sent_at.date() == today && alert.sent_at <= now {
            alerts_today = alerts_today.saturating_add(1);
        }
        keywords.insert(alert.matched_keyword.to_lowercase());
        subreddits.insert(alert.subreddit.to_lowercase());
        latest_alert_at = latest_alert_at.max(Some(alert.sent_at));
    }

    SummaryResponse {
        total_alerts,
        alerts_today,
        unique_keywords: keywords.len() as u64,
        total_subreddits: subreddits.len() as u64,
        latest_alert_at,
    }
}
