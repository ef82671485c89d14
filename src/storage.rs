use crate::errors::AppError;
use crate::models::{Alert, AlertQuery, AppData, NewAlertRequest};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Reads the alert store. A missing file starts an empty store; an unreadable
/// one is logged and also starts empty.
pub async fn load_data(path: &Path) -> AppData {
    match read_store(path).await {
        Ok(Some(data)) => {
            info!("loaded {} alerts from {}", data.alerts.len(), path.display());
            data
        }
        Ok(None) => {
            info!("no alert store at {}, starting empty", path.display());
            AppData::default()
        }
        Err(err) => {
            error!("alert store {} is unusable: {}", path.display(), err.message);
            AppData::default()
        }
    }
}

async fn read_store(path: &Path) -> Result<Option<AppData>, AppError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Writes the whole store to `<path>.tmp`, then renames it over `path`.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    if let Err(err) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

impl AppData {
    pub fn insert(&mut self, request: NewAlertRequest) -> Alert {
        // stores written before `next_id` existed still get unique ids
        let max_id = self.alerts.iter().map(|alert| alert.id).max().unwrap_or(0);
        let id = self.next_id.max(max_id).saturating_add(1);
        self.next_id = id;

        let alert = Alert {
            id,
            client_id: request.client_id,
            keyword_id: request.keyword_id,
            post_id: request.post_id.trim().to_string(),
            post_title: request.post_title,
            post_url: request.post_url,
            subreddit: request.subreddit.trim().to_string(),
            matched_keyword: request.matched_keyword.trim().to_string(),
            sent_at: request.sent_at,
        };
        self.alerts.push(alert.clone());
        alert
    }

    pub fn alerts_for(&self, client_id: Option<u64>) -> impl Iterator<Item = &Alert> {
        self.alerts
            .iter()
            .filter(move |alert| client_id.is_none_or(|id| alert.client_id == id))
    }

    /// Newest first, then paged by `offset`/`limit`.
    pub fn query(&self, query: &AlertQuery) -> Vec<Alert> {
        let mut alerts: Vec<&Alert> = self.alerts_for(query.client_id).collect();
        alerts.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then(b.id.cmp(&a.id)));

        alerts
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
