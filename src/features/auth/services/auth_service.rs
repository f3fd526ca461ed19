use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, RegisterRequestDto, UserResponseDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::password::{
    hash_password, verify_dummy_password, verify_password,
};
use crate::features::auth::services::token_service::TokenService;
use crate::features::users::{NewUser, Role, UserRepository};

/// Fixture accounts created by `seed_default_users`
const DEFAULT_USERS: &[(&str, &str, Role)] = &[
    ("testuser", "test@example.com", Role::User),
    ("editor", "editor@example.com", Role::Editor),
    ("admin", "admin@example.com", Role::Admin),
];
const DEFAULT_PASSWORD: &str = "password123";

/// Service for authentication operations (register, login, token resolution)
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, token_service: Arc<TokenService>) -> Self {
        Self {
            users,
            token_service,
        }
    }

    /// Register a new user with the default `user` role.
    ///
    /// Expects an already validated DTO.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<UserResponseDto> {
        let password_hash = hash_password(&dto.password)?;

        let user = self
            .users
            .create(NewUser {
                username: dto.username,
                email: dto.email,
                password_hash,
                role: Role::User,
            })
            .await?;

        tracing::info!("User registered: id={}, username={}", user.id, user.username);

        Ok(user.into())
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let Some(user) = self.users.find_by_email(&dto.email).await? else {
            verify_dummy_password(&dto.password);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        };

        if !verify_password(&dto.password, &user.password_hash) {
            tracing::debug!("Password mismatch for user {}", user.id);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let issued = self.token_service.create_token(user.id)?;

        Ok(AuthResponseDto {
            token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }

    /// Resolve a bearer token to the current user record.
    ///
    /// The user is re-read on every call so tokens of deleted accounts stop working.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let user_id = self.token_service.validate_token(token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        Ok(user.into())
    }

    /// Get current user info (for /me endpoint)
    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<UserResponseDto> {
        Ok(user.into())
    }

    /// Create the fixture accounts that do not exist yet
    pub async fn seed_default_users(&self) -> Result<usize> {
        let mut created = 0;

        for (username, email, role) in DEFAULT_USERS {
            if self.users.find_by_email(email).await?.is_some() {
                continue;
            }

            self.users
                .create(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash: hash_password(DEFAULT_PASSWORD)?,
                    role: *role,
                })
                .await?;

            tracing::info!("Seeded {} account {}", role, email);
            created += 1;
        }

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_auth_config, InMemoryUserRepository};

    fn service() -> AuthService {
        let users = Arc::new(InMemoryUserRepository::default());
        let tokens = Arc::new(TokenService::new(&test_auth_config()));
        AuthService::new(users, tokens)
    }

    fn register_dto(username: &str, email: &str) -> RegisterRequestDto {
        RegisterRequestDto {
            username: username.to_string(),
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    fn login_dto(email: &str, password: &str) -> LoginRequestDto {
        LoginRequestDto {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login_and_authenticate() {
        let service = service();
        let user = service
            .register(register_dto("alice", "alice@x.com"))
            .await
            .unwrap();
        assert_eq!(user.role, Role::User);

        let auth = service
            .login(login_dto("alice@x.com", "password123"))
            .await
            .unwrap();
        assert_eq!(auth.user.id, user.id);
        assert_eq!(auth.token_type, "Bearer");

        let resolved = service.authenticate(&auth.token).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_failures_are_unauthorized() {
        let service = service();
        service
            .register(register_dto("alice", "alice@x.com"))
            .await
            .unwrap();

        let wrong_password = service.login(login_dto("alice@x.com", "password124")).await;
        assert!(matches!(wrong_password, Err(AppError::Unauthorized(_))));

        let unknown = service.login(login_dto("bob@x.com", "password123")).await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_validation_error() {
        let service = service();
        service
            .register(register_dto("alice", "alice@x.com"))
            .await
            .unwrap();

        let duplicate = service.register(register_dto("alice2", "alice@x.com")).await;
        assert!(matches!(duplicate, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_token_of_deleted_user_is_rejected() {
        let users = Arc::new(InMemoryUserRepository::default());
        let tokens = Arc::new(TokenService::new(&test_auth_config()));
        let service = AuthService::new(users.clone(), tokens);

        let user = service
            .register(register_dto("alice", "alice@x.com"))
            .await
            .unwrap();
        let auth = service
            .login(login_dto("alice@x.com", "password123"))
            .await
            .unwrap();

        users.remove(user.id);

        let result = service.authenticate(&auth.token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let service = service();
        assert_eq!(service.seed_default_users().await.unwrap(), 3);
        assert_eq!(service.seed_default_users().await.unwrap(), 0);

        let editor = service
            .login(login_dto("editor@example.com", DEFAULT_PASSWORD))
            .await
            .unwrap();
        assert_eq!(editor.user.role, Role::Editor);
    }
}
