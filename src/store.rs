//! In-memory user store. Owns the collection; callers go through its operations.

use crate::model::{NewUser, User, UserPatch};

/// Source of fresh user ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs in canonical lowercase form.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidV4;

impl IdGenerator for UuidV4 {
    fn next_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Insertion-ordered collection of users. No internal locking.
pub struct UserStore {
    users: Vec<User>,
    ids: Box<dyn IdGenerator>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self::with_generator(UuidV4)
    }

    pub fn with_generator(ids: impl IdGenerator + 'static) -> Self {
        UserStore {
            users: Vec::new(),
            ids: Box::new(ids),
        }
    }

    /// Seed the store with existing records, e.g. fixtures.
    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    /// Store a new user under a fresh id and return it.
    pub fn create(&mut self, fields: NewUser) -> User {
        let mut id = self.ids.next_id();
        while self.users.iter().any(|u| u.id == id) {
            tracing::warn!(id = %id, "generated id already in use, drawing another");
            id = self.ids.next_id();
        }
        let user = User::from_new(id, fields);
        tracing::debug!(id = %user.id, "user created");
        self.users.push(user.clone());
        user
    }

    pub fn get_by_id(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn get_all(&self) -> &[User] {
        &self.users
    }

    /// Merge the patch onto the matching user in place. Returns false when no user has `id`.
    pub fn update(&mut self, id: &str, patch: UserPatch) -> bool {
        match self.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.apply(patch);
                tracing::debug!(id = %id, "user updated");
                true
            }
            None => false,
        }
    }

    /// Remove the matching user. Returns false when no user has `id`.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        let removed = self.users.len() != before;
        if removed {
            tracing::debug!(id = %id, "user deleted");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
