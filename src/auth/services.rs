use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    claims::Identity,
    jwt::JwtKeys,
    password::{hash_password, verify_decoy, verify_password},
    repo::{UserStore, UserStoreError},
    repo_types::{NewUser, User},
    role::Role,
};
use crate::{
    config::AdminSignup,
    error::{AppError, AppResult},
};

/// Trimmed, lowercased form under which emails are stored and looked up.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Pull `email` and `password` out of a request body, normalising the email.
pub(crate) fn credentials(
    email: Option<&str>,
    password: Option<&str>,
) -> AppResult<(String, String)> {
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::Validation("email and password required".into()));
    };
    let email = normalize_email(email);
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("email and password required".into()));
    }
    Ok((email, password.to_string()))
}

/// Registration only: login treats a badly shaped email as an unknown account.
pub(crate) fn ensure_email_shape(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    Ok(())
}

/// Decide whether `caller` may obtain `requested` at registration.
pub fn check_signup_role(
    policy: AdminSignup,
    requested: Role,
    caller: Option<&Identity>,
) -> AppResult<()> {
    match (requested, policy) {
        (Role::User, _) | (Role::Admin, AdminSignup::Open) => Ok(()),
        (Role::Admin, AdminSignup::AdminOnly) => match caller {
            Some(c) if c.is_admin() => Ok(()),
            _ => Err(AppError::Forbidden(
                "Only an admin may create admin accounts".into(),
            )),
        },
    }
}

pub async fn register(
    users: &dyn UserStore,
    email: String,
    password: String,
    role: Role,
) -> AppResult<User> {
    let hash = hash_password(password).await?;

    let user = users
        .insert(NewUser {
            email,
            password_hash: hash,
            role,
        })
        .await
        .map_err(|e| match e {
            UserStoreError::DuplicateEmail => {
                warn!("email already registered");
                AppError::Conflict("Email already exists".into())
            }
            UserStoreError::Other(e) => AppError::Internal(e),
        })?;

    if user.role == Role::Admin {
        warn!(user_id = %user.id, "admin account registered");
    }
    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok(user)
}

pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: String,
    password: String,
) -> AppResult<String> {
    let Some(user) = users.find_by_email(&email).await? else {
        verify_decoy(password).await;
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let identity = Identity {
        id: user.id,
        email: user.email,
        role: user.role,
    };
    let token = keys.issue(&identity)?;
    info!(user_id = %identity.id, "user logged in");
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  A@B.com "), "a@b.com");
        assert_eq!(normalize_email("a@B.com"), normalize_email("A@b.com"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(matches!(
            credentials(None, Some("pw")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            credentials(Some("a@b.com"), None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            credentials(Some("   "), Some("pw")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            credentials(Some("a@b.com"), Some("")),
            Err(AppError::Validation(_))
        ));
        let (email, _) = credentials(Some(" Ana@Example.COM"), Some("pw")).unwrap();
        assert_eq!(email, "ana@example.com");
        // shape is not checked here; login must answer 401 for these
        let (email, _) = credentials(Some("Bob"), Some("pw")).unwrap();
        assert_eq!(email, "bob");
    }

    #[test]
    fn registration_rejects_malformed_email() {
        assert!(ensure_email_shape("ana@example.com").is_ok());
        assert!(matches!(
            ensure_email_shape("bob"),
            Err(AppError::Validation(msg)) if msg == "Invalid email"
        ));
    }

    #[tokio::test]
    async fn login_with_unknown_or_malformed_email_is_invalid_credentials() {
        let users = crate::fakes::MemoryUserStore::default();
        let keys = JwtKeys::from(&crate::state::AppState::test_config().jwt);
        for email in ["nobody@example.com", "bob"] {
            let err = login(&users, &keys, email.into(), "x".into())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials));
        }
    }

    #[test]
    fn admin_signup_policy() {
        let admin = Identity {
            id: Uuid::new_v4(),
            email: "root@example.com".into(),
            role: Role::Admin,
        };
        let user = Identity {
            role: Role::User,
            ..admin.clone()
        };

        assert!(check_signup_role(AdminSignup::Open, Role::Admin, None).is_ok());
        assert!(check_signup_role(AdminSignup::AdminOnly, Role::User, None).is_ok());
        assert!(check_signup_role(AdminSignup::AdminOnly, Role::Admin, Some(&admin)).is_ok());
        assert!(matches!(
            check_signup_role(AdminSignup::AdminOnly, Role::Admin, Some(&user)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_signup_role(AdminSignup::AdminOnly, Role::Admin, None),
            Err(AppError::Forbidden(_))
        ));
    }
}
