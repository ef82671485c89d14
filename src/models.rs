use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One alert sent to a client. Only `sent_at` matters to aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub client_id: u64,
    pub keyword_id: u64,
    pub post_id: String,
    pub post_title: String,
    pub post_url: String,
    pub subreddit: String,
    pub matched_keyword: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Reporting window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Week, Period::Month, Period::Year];

    /// Number of buckets in a series for this period.
    pub const fn bucket_count(self) -> usize {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 12,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: String,
    pub label: String,
    pub full_label: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct NewAlertRequest {
    pub client_id: u64,
    pub keyword_id: u64,
    pub post_id: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default)]
    pub post_url: String,
    pub subreddit: String,
    pub matched_keyword: String,
    pub sent_at: NaiveDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertQuery {
    pub client_id: Option<u64>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngagementQuery {
    #[serde(default)]
    pub period: Period,
    pub client_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub client_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EngagementResponse {
    pub period: Period,
    pub generated_at: NaiveDateTime,
    pub window_start: NaiveDateTime,
    pub total: u64,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub total_alerts: u64,
    pub alerts_today: u64,
    pub unique_keywords: u64,
    pub total_subreddits: u64,
    pub latest_alert_at: Option<NaiveDateTime>,
}
