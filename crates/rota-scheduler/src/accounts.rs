use rota_auth::{PasswordHasher, TokenVerifier};
use rota_core::{AuthFailure, DefinedError};
use rota_errors::ErrorHandler;
use rota_storage::{
    QueryExecutor, UserRepository,
    models::{User, new_id, timestamp},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::forms::{Registration, SignIn};

const COMPONENT: &str = "auth_service";

/// Successful sign-in
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIn {
    pub access_token: String,
    pub user: User,
}

/// Account registration, sign-in, and lookup
#[derive(Debug, Clone)]
pub struct AccountService {
    users: UserRepository,
    errors: ErrorHandler,
    tokens: TokenVerifier,
    hasher: PasswordHasher,
    token_ttl: chrono::Duration,
}

impl AccountService {
    pub fn new(db: &QueryExecutor, tokens: TokenVerifier, hasher: PasswordHasher, token_ttl: chrono::Duration) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            errors: db.errors().clone(),
            tokens,
            hasher,
            token_ttl,
        }
    }

    fn wrap<E>(&self, error: E) -> DefinedError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.errors.handle_unknown_service_error(error, COMPONENT)
    }

    fn refuse(&self, failure: AuthFailure, message: String, user_id: Option<&str>) -> DefinedError {
        let mut error = DefinedError::client_auth(failure).message(message);
        if let Some(id) = user_id {
            error = error.user_id(id);
        }
        self.errors.handle_error(error.build(), COMPONENT)
    }

    /// Create an account; emails compare case-insensitively
    ///
    /// # Errors
    ///
    /// `DuplicateRegistration` when the email is already registered
    pub async fn register(&self, form: Registration) -> Result<User, DefinedError> {
        let email = form.email.trim().to_lowercase();

        if self.users.find_by_email(&email).await.map_err(|e| self.wrap(e))?.is_some() {
            return Err(self.refuse(
                AuthFailure::DuplicateRegistration,
                format!("Email \"{email}\" is already registered"),
                None,
            ));
        }

        let hasher = self.hasher.clone();
        let password = form.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| self.wrap(e))?
            .map_err(|e| self.wrap(e))?;

        let now = timestamp();
        let user = User {
            id: new_id(),
            first_name: form.first_name.trim().to_owned(),
            last_name: form.last_name.trim().to_owned(),
            email,
            password_hash,
            color: form.color,
            image: form.image,
            phone_number: form.phone_number,
            create_date: now.clone(),
            modify_date: now,
        };

        self.users.create(&user).await.map_err(|e| self.wrap(e))?;
        tracing::info!(user_id = %user.id, "account registered");

        Ok(user)
    }

    /// Check credentials and issue an access token
    ///
    /// # Errors
    ///
    /// `InvalidEmail` when no account uses the email, `InvalidPassword` when
    /// the password does not match
    pub async fn sign_in(&self, form: SignIn) -> Result<SignedIn, DefinedError> {
        let email = form.email.trim().to_lowercase();

        let Some(user) = self.users.find_by_email(&email).await.map_err(|e| self.wrap(e))? else {
            return Err(self.refuse(
                AuthFailure::InvalidEmail,
                format!("No account is registered for \"{email}\""),
                None,
            ));
        };

        if !self.password_matches(form.password, &user.password_hash).await? {
            return Err(self.refuse(
                AuthFailure::InvalidPassword,
                "Password does not match".to_owned(),
                Some(&user.id),
            ));
        }

        let access_token = self.tokens.issue(&user.id, self.token_ttl).map_err(|e| self.wrap(e))?;
        tracing::info!(user_id = %user.id, "signed in");

        Ok(SignedIn { access_token, user })
    }

    /// Account behind a verified token
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when the account no longer exists
    pub async fn me(&self, user_id: &str) -> Result<User, DefinedError> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(|e| self.wrap(e))?
            .ok_or_else(|| {
                self.refuse(
                    AuthFailure::InvalidCredentials,
                    "Token names an account that does not exist".to_owned(),
                    Some(user_id),
                )
            })
    }

    async fn password_matches(&self, password: SecretString, stored: &str) -> Result<bool, DefinedError> {
        let hasher = self.hasher.clone();
        let stored = stored.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &stored))
            .await
            .map_err(|e| self.wrap(e))
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use rota_core::ErrorKind;

    use super::*;
    use crate::test_support;

    const SECRET: &str = "accounts-test-secret";

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(&SecretString::from(SECRET.to_owned()))
    }

    async fn service() -> AccountService {
        let db = test_support::executor().await;
        AccountService::new(
            &db,
            verifier(),
            PasswordHasher::new(NonZeroU32::new(1_000).unwrap()),
            chrono::Duration::minutes(5),
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            email: email.into(),
            password: SecretString::from("correct horse".to_owned()),
            color: "#1e90ff".into(),
            image: None,
            phone_number: None,
        }
    }

    fn sign_in(email: &str, password: &str) -> SignIn {
        SignIn {
            email: email.into(),
            password: SecretString::from(password.to_owned()),
        }
    }

    fn failure(error: &DefinedError) -> AuthFailure {
        match error.kind() {
            ErrorKind::ClientAuth { failure, .. } => *failure,
            other => panic!("expected a client auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_then_sign_in() {
        let service = service().await;

        let user = service.register(registration("Ana@Example.com")).await.unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert!(user.password_hash.starts_with("pbkdf2-sha256$"));

        let signed_in = service.sign_in(sign_in("ana@example.com", "correct horse")).await.unwrap();
        assert_eq!(signed_in.user.id, user.id);
        assert_eq!(verifier().verify(&signed_in.access_token).unwrap(), user.id);

        assert_eq!(service.me(&user.id).await.unwrap().email, "ana@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_refused() {
        let service = service().await;
        service.register(registration("ana@example.com")).await.unwrap();

        let error = service.register(registration("ANA@example.com")).await.unwrap_err();

        assert_eq!(failure(&error), AuthFailure::DuplicateRegistration);
        assert_eq!(error.message_code(), "A0008");
        assert_eq!(error.http_status().as_u16(), 409);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password() {
        let service = service().await;
        let user = service.register(registration("ana@example.com")).await.unwrap();

        let unknown = service.sign_in(sign_in("bea@example.com", "correct horse")).await.unwrap_err();
        assert_eq!(failure(&unknown), AuthFailure::InvalidEmail);
        assert_eq!(unknown.http_status().as_u16(), 400);

        let wrong = service.sign_in(sign_in("ana@example.com", "wrong horse")).await.unwrap_err();
        assert_eq!(failure(&wrong), AuthFailure::InvalidPassword);
        assert_eq!(wrong.kind().diagnostics(), Some(format!("user_id={}", user.id)));
    }

    #[tokio::test]
    async fn token_for_missing_account_is_invalid_credentials() {
        let service = service().await;

        let error = service.me("gone").await.unwrap_err();

        assert_eq!(failure(&error), AuthFailure::InvalidCredentials);
        assert_eq!(error.http_status().as_u16(), 401);
    }
}
