//! HTTP handlers for the users resource.

pub mod users;
pub use users::*;
