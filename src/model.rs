//! User resource types.

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A stored user. `id` is assigned by the store and never changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub age: Number,
    pub hobbies: Vec<String>,
}

/// Creation payload: every field of a user except the id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub age: Number,
    pub hobbies: Vec<String>,
}

/// Partial update. Absent fields leave the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub age: Option<Number>,
    pub hobbies: Option<Vec<String>>,
}

impl User {
    pub fn from_new(id: String, new: NewUser) -> Self {
        User {
            id,
            username: new.username,
            age: new.age,
            hobbies: new.hobbies,
        }
    }

    /// Overwrite every field the patch carries.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(username) = patch.username {
            self.username = username;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(hobbies) = patch.hobbies {
            self.hobbies = hobbies;
        }
    }
}
