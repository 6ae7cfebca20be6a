//! Users API: a minimal REST service for one resource type kept in memory.
//!
//! Requests are classified structurally by [`routes::match_route`], handled by
//! [`handlers::dispatch`], and answered with JSON bodies or [`error::HttpError`] objects. The
//! [`store::UserStore`] is owned by the [`state::AppState`] of one server instance.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod identifier;
pub mod model;
pub mod response;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ConfigError, HttpError, ServeError};
pub use model::{NewUser, User, UserPatch};
pub use routes::{match_route, user_routes, RouteShape};
pub use server::{serve, serve_one};
pub use state::{AppState, RequestLimits};
pub use store::{IdGenerator, UserStore, UuidV4};
