use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;

pub type SharedState = Arc<AppState>;

/// Owned for the life of the process and handed to every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}
