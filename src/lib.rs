pub mod app;
pub mod config;
pub mod engagement;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use engagement::{aggregate, aggregate_at};
pub use state::{AppState, Clock};
pub use storage::load_data;
