use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{RatingsStore, SessionStore, SessionToken},
    error::{AppError, AppResult},
    models::{
        user::{EMAIL_TAKEN, MAX_EMAIL_LEN, MAX_ZIPCODE_LEN},
        NewUser, User, UserId,
    },
};

const MAX_AGE: i32 = 150;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: SessionToken,
    pub user_id: UserId,
}

/// Hashes a password into an Argon2 PHC string with a fresh salt
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Checks a password against a stored PHC string
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Validates a registration form, returning the trimmed email
fn validate_registration(request: &RegisterRequest) -> AppResult<String> {
    let email = request.email.trim();

    if email.is_empty() {
        return Err(AppError::InvalidInput("Email is required".to_string()));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::InvalidInput(format!(
            "email cannot be more than {} characters",
            MAX_EMAIL_LEN
        )));
    }
    if request.password.is_empty() {
        return Err(AppError::InvalidInput("Password is required".to_string()));
    }
    if request.password != request.password_confirm {
        return Err(AppError::InvalidInput("passwords must match".to_string()));
    }
    if let Some(age) = request.age {
        if !(0..=MAX_AGE).contains(&age) {
            return Err(AppError::InvalidInput(format!(
                "age must be between 0 and {}",
                MAX_AGE
            )));
        }
    }
    if let Some(zipcode) = &request.zipcode {
        if zipcode.chars().count() > MAX_ZIPCODE_LEN {
            return Err(AppError::InvalidInput(format!(
                "zipcode cannot be more than {} characters",
                MAX_ZIPCODE_LEN
            )));
        }
    }

    Ok(email.to_string())
}

/// Registers a new user
pub async fn register(store: &dyn RatingsStore, request: RegisterRequest) -> AppResult<User> {
    let email = validate_registration(&request)?;

    if store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let new_user = NewUser {
        email,
        password_hash: hash_password(&request.password)?,
        age: request.age,
        zipcode: request
            .zipcode
            .map(|z| z.trim().to_string())
            .filter(|z| !z.is_empty()),
    };

    let user = store.create_user(new_user).await?;
    tracing::info!(user_id = user.user_id, "User registered");

    Ok(user)
}

/// Verifies credentials and opens a session
pub async fn login(
    store: &dyn RatingsStore,
    sessions: &dyn SessionStore,
    request: LoginRequest,
) -> AppResult<LoginResponse> {
    let email = request.email.trim();

    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::InvalidInput("Email is not registered!".to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        tracing::warn!(user_id = user.user_id, "Login rejected: incorrect password");
        return Err(AppError::Unauthorized("Incorrect password".to_string()));
    }

    let token = sessions.create(user.user_id).await?;
    tracing::info!(user_id = user.user_id, "Logged in");

    Ok(LoginResponse {
        token,
        user_id: user.user_id,
    })
}

/// Ends a session
pub async fn logout(sessions: &dyn SessionStore, token: &SessionToken) -> AppResult<()> {
    sessions.revoke(token).await
}
