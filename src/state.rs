use crate::models::AppData;
use chrono::{Local, NaiveDateTime};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Source of "now" for everything time-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Self::System => Local::now().naive_local(),
            Self::Fixed(now) => *now,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, clock: Clock) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            clock,
        }
    }
}
