//! Request extractors.

pub mod request_target;
pub use request_target::RequestTarget;
