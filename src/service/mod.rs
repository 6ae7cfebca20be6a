//! Request payload checks.

mod validation;
pub use validation::{
    has_updatable_field, is_valid_user, parse_new_user, parse_patch, ValidationError, USER_FIELDS,
    USER_SHAPE,
};
