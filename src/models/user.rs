use serde::Serialize;
use sqlx::FromRow;

use super::UserId;

/// Maximum length of a registered email address
pub const MAX_EMAIL_LEN: usize = 64;
/// Maximum length of a zipcode
pub const MAX_ZIPCODE_LEN: usize = 15;
/// Conflict message when an email already belongs to an account
pub const EMAIL_TAKEN: &str = "Your email has been registered already!";

/// A registered user of the ratings site
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    /// Argon2 PHC string, never sent to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

/// Validated fields for a user that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

impl NewUser {
    /// Assigns an id, producing the stored user
    pub fn into_user(self, user_id: UserId) -> User {
        User {
            user_id,
            email: self.email,
            password_hash: self.password_hash,
            age: self.age,
            zipcode: self.zipcode,
        }
    }
}
