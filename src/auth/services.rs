use anyhow::anyhow;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        jwt::JwtKeys,
        repo_types::NewUser,
    },
    config::AdminBootstrap,
    error::{AppError, AppResult},
    models::UserRole,
    store::Store,
};

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash failed");
            anyhow!(e.to_string())
        })
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "stored password hash is malformed");
        anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

fn issue_tokens(keys: &JwtKeys, user: PublicUser) -> AppResult<AuthResponse> {
    Ok(AuthResponse {
        access_token: keys.sign_access(user.id, user.role)?,
        refresh_token: keys.sign_refresh(user.id, user.role)?,
        user,
    })
}

pub async fn register(
    store: &dyn Store,
    keys: &JwtKeys,
    mut payload: RegisterRequest,
) -> AppResult<AuthResponse> {
    payload.normalize();
    payload.validate()?;

    let role = payload.role.unwrap_or_default();
    if role == UserRole::Admin {
        warn!(email = %payload.email, "self-registration as admin refused");
        return Err(AppError::Validation("Cannot register as admin".into()));
    }

    if store.find_user_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::Duplicate("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = store
        .create_user(NewUser {
            email: payload.email,
            password_hash,
            name: payload.name,
            role,
            phone: payload.phone,
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    issue_tokens(keys, user.into())
}

pub async fn login(
    store: &dyn Store,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> AppResult<AuthResponse> {
    let email = payload.email.trim().to_lowercase();
    let invalid = || AppError::Unauthorized("Invalid credentials".into());

    let Some(user) = store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(AppError::Forbidden("Account is disabled".into()));
    }

    info!(user_id = %user.id, role = %user.role, "user logged in");
    issue_tokens(keys, user.into())
}

pub async fn refresh(store: &dyn Store, keys: &JwtKeys, token: &str) -> AppResult<AuthResponse> {
    let claims = keys
        .verify_refresh(token)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    // Re-read the user so role changes and deactivation take effect.
    let user = store
        .get_user(claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;

    issue_tokens(keys, user.into())
}

pub async fn me(store: &dyn Store, user_id: Uuid) -> AppResult<PublicUser> {
    store
        .get_user(user_id)
        .await?
        .map(PublicUser::from)
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

/// Creates the configured admin account unless a user with that email exists.
pub async fn ensure_admin(store: &dyn Store, admin: &AdminBootstrap) -> anyhow::Result<bool> {
    let email = admin.email.trim().to_lowercase();
    if store.find_user_by_email(&email).await?.is_some() {
        info!(email = %email, "admin user already present");
        return Ok(false);
    }
    let user = store
        .create_user(NewUser {
            email,
            password_hash: hash_password(&admin.password)?,
            name: admin.name.clone(),
            role: UserRole::Admin,
            phone: None,
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "admin user created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, state::AppState};
    use axum::extract::FromRef;

    fn keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    fn register_body(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "hunter22".into(),
            name: "Sana".into(),
            phone: None,
            role: None,
        }
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("Secur3P@ssw0rd!").expect("hashing should succeed");
        assert!(verify_password("Secur3P@ssw0rd!", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
        assert!(verify_password("anything", "not-a-valid-hash").is_err());
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = MemoryStore::new();
        let keys = keys();

        let res = register(&store, &keys, register_body("  Sana@Example.com "))
            .await
            .unwrap();
        assert_eq!(res.user.email, "sana@example.com");
        assert_eq!(res.user.role, UserRole::Donor);

        let res = login(
            &store,
            &keys,
            LoginRequest {
                email: "SANA@example.com".into(),
                password: "hunter22".into(),
            },
        )
        .await
        .unwrap();
        let claims = keys.verify(&res.access_token).unwrap();
        assert_eq!(claims.sub, res.user.id);
    }

    #[tokio::test]
    async fn register_rejects_admin_and_duplicates() {
        let store = MemoryStore::new();
        let keys = keys();

        let mut body = register_body("root@example.com");
        body.role = Some(UserRole::Admin);
        assert!(matches!(
            register(&store, &keys, body).await,
            Err(AppError::Validation(_))
        ));

        register(&store, &keys, register_body("dup@example.com")).await.unwrap();
        assert!(matches!(
            register(&store, &keys, register_body("dup@example.com")).await,
            Err(AppError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let store = MemoryStore::new();
        let keys = keys();
        register(&store, &keys, register_body("x@example.com")).await.unwrap();
        let err = login(
            &store,
            &keys,
            LoginRequest {
                email: "x@example.com".into(),
                password: "nope-nope".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let store = MemoryStore::new();
        let admin = AdminBootstrap {
            email: "Admin@BloodConnect.com".into(),
            password: "change-me".into(),
            name: "System Administrator".into(),
        };
        assert!(ensure_admin(&store, &admin).await.unwrap());
        assert!(!ensure_admin(&store, &admin).await.unwrap());
        let user = store
            .find_user_by_email("admin@bloodconnect.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, UserRole::Admin);
    }
}
