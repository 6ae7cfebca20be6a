//! Payload validation for user creation and update.

use crate::model::{NewUser, UserPatch};
use serde_json::{Map, Value};
use thiserror::Error;

/// The only keys a user payload may carry.
pub const USER_FIELDS: [&str; 3] = ["username", "age", "hobbies"];

/// Details attached to every rejected creation payload.
pub const USER_SHAPE: &str =
    "The only required fields are: username (string), age (number), hobbies (string[])";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} has the wrong type")]
    WrongType(&'static str),
}

/// True iff the payload is an object with exactly `username` (string), `age` (number) and
/// `hobbies` (array of strings).
pub fn is_valid_user(payload: &Value) -> bool {
    let Some(obj) = payload.as_object() else {
        return false;
    };
    if obj.keys().any(|k| !USER_FIELDS.contains(&k.as_str())) {
        return false;
    }
    obj.get("username").is_some_and(Value::is_string)
        && obj.get("age").is_some_and(Value::is_number)
        && obj.get("hobbies").is_some_and(is_string_array)
}

/// Decode a creation payload, or `None` when it fails [`is_valid_user`].
pub fn parse_new_user(payload: Value) -> Option<NewUser> {
    if !is_valid_user(&payload) {
        return None;
    }
    serde_json::from_value(payload).ok()
}

/// Whether at least one of the updatable fields is present with a truthy value.
pub fn has_updatable_field(payload: &Map<String, Value>) -> bool {
    USER_FIELDS
        .iter()
        .any(|field| payload.get(*field).is_some_and(is_truthy))
}

/// Build a patch from every recognised field present in the body. Unknown keys, `id` included,
/// are ignored.
pub fn parse_patch(payload: &Map<String, Value>) -> Result<UserPatch, ValidationError> {
    let mut patch = UserPatch::default();
    if let Some(v) = payload.get("username") {
        let s = v.as_str().ok_or(ValidationError::WrongType("username"))?;
        patch.username = Some(s.to_string());
    }
    if let Some(v) = payload.get("age") {
        let Value::Number(n) = v else {
            return Err(ValidationError::WrongType("age"));
        };
        patch.age = Some(n.clone());
    }
    if let Some(v) = payload.get("hobbies") {
        if !is_string_array(v) {
            return Err(ValidationError::WrongType("hobbies"));
        }
        patch.hobbies = serde_json::from_value(v.clone()).ok();
    }
    Ok(patch)
}

fn is_string_array(v: &Value) -> bool {
    v.as_array()
        .is_some_and(|items| items.iter().all(Value::is_string))
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
