//! Shared application state: one store per server instance.

use crate::store::UserStore;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Per-request limits applied while reading bodies.
#[derive(Clone, Copy, Debug)]
pub struct RequestLimits {
    pub body_timeout: Duration,
    pub max_body_bytes: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        RequestLimits {
            body_timeout: Duration::from_secs(30),
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// Only the handlers mutate the store; locks are never held across an await.
    pub store: Arc<RwLock<UserStore>>,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(store: UserStore, limits: RequestLimits) -> Self {
        AppState {
            store: Arc::new(RwLock::new(store)),
            limits,
        }
    }
}
