// src/services/user.rs - Accounts, credentials and avatars
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::{
    AvatarDto, CreateUserDto, LoginDto, NewUser, PageRequest, SetPasswordDto, User, UserRow,
};
use crate::repositories::UserRepositoryTrait;
use crate::utils::images::ImageStore;
use crate::utils::password::{generate_token, hash_password, verify_password};

type Result<T> = std::result::Result<T, ServiceError>;

const AVATAR_DIR: &str = "users";

#[async_trait]
pub trait UserServiceTrait {
    async fn register(&self, dto: CreateUserDto) -> Result<User>;
    /// Exchanges credentials for the user's auth token
    async fn login(&self, dto: LoginDto) -> Result<String>;
    async fn logout(&self, token: &str) -> Result<()>;
    /// Resolves an auth token, `Unauthorized` if it is unknown
    async fn authenticate(&self, token: &str) -> Result<User>;
    async fn get(&self, id: i64, viewer: Option<i64>) -> Result<UserRow>;
    async fn list(&self, viewer: Option<i64>, page: PageRequest) -> Result<(Vec<UserRow>, i64)>;
    async fn set_password(&self, user_id: i64, dto: SetPasswordDto) -> Result<()>;
    /// Stores a new avatar and returns its media path
    async fn set_avatar(&self, user_id: i64, dto: AvatarDto) -> Result<String>;
    async fn delete_avatar(&self, user_id: i64) -> Result<()>;
}

pub struct UserService<T: UserRepositoryTrait> {
    repository: Arc<T>,
    images: ImageStore,
}

impl<T: UserRepositoryTrait> UserService<T> {
    pub fn new(repository: Arc<T>, images: ImageStore) -> Self {
        Self { repository, images }
    }
}

#[async_trait]
impl<T: UserRepositoryTrait + Send + Sync> UserServiceTrait for UserService<T> {
    async fn register(&self, dto: CreateUserDto) -> Result<User> {
        dto.validate()?;

        let new_user = NewUser {
            email: dto.email.trim().to_lowercase(),
            username: dto.username,
            first_name: dto.first_name,
            last_name: dto.last_name,
            password_hash: hash_password(&dto.password),
        };

        let user = self.repository.create(&new_user).await?;
        info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    async fn login(&self, dto: LoginDto) -> Result<String> {
        dto.validate()?;

        let invalid = || {
            ServiceError::ValidationError("Unable to log in with provided credentials".to_string())
        };

        let credentials = self
            .repository
            .find_credentials_by_email(dto.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&dto.password, &credentials.password_hash) {
            debug!("Wrong password for user {}", credentials.id);
            return Err(invalid());
        }

        let token = self
            .repository
            .get_or_create_token(credentials.id, &generate_token())
            .await?;
        Ok(token)
    }

    async fn logout(&self, token: &str) -> Result<()> {
        if !self.repository.delete_token(token).await? {
            debug!("Logout with a token that was already gone");
        }
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<User> {
        self.repository
            .find_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid token.".to_string()))
    }

    async fn get(&self, id: i64, viewer: Option<i64>) -> Result<UserRow> {
        self.repository
            .find_by_id(id, viewer)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    async fn list(&self, viewer: Option<i64>, page: PageRequest) -> Result<(Vec<UserRow>, i64)> {
        let count = self.repository.count().await?;
        let users = self
            .repository
            .find_all(viewer, page.limit, page.offset())
            .await?;
        Ok((users, count))
    }

    async fn set_password(&self, user_id: i64, dto: SetPasswordDto) -> Result<()> {
        dto.validate()?;

        let credentials = self
            .repository
            .find_credentials_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        if !verify_password(&dto.current_password, &credentials.password_hash) {
            return Err(ServiceError::ValidationError(
                "current_password: Wrong password".to_string(),
            ));
        }

        self.repository
            .update_password(user_id, &hash_password(&dto.new_password))
            .await?;
        info!("Password changed for user {}", user_id);
        Ok(())
    }

    async fn set_avatar(&self, user_id: i64, dto: AvatarDto) -> Result<String> {
        dto.validate()?;

        let path = self.images.save_data_uri(AVATAR_DIR, &dto.avatar).await?;
        let previous = match self.repository.update_avatar(user_id, Some(path.clone())).await {
            Ok(previous) => previous,
            Err(e) => {
                self.images.delete(&path).await;
                return Err(e.into());
            }
        };

        if let Some(previous) = previous {
            self.images.delete(&previous).await;
        }
        Ok(path)
    }

    async fn delete_avatar(&self, user_id: i64) -> Result<()> {
        match self.repository.update_avatar(user_id, None).await? {
            Some(previous) => self.images.delete(&previous).await,
            None => warn!("User {} has no avatar to delete", user_id),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fake::faker::internet::en::{Password, SafeEmail, Username};
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    use super::*;
    use crate::models::UserCredentials;
    use crate::repositories::user::MockUserRepositoryTrait;

    fn service(mock: MockUserRepositoryTrait) -> UserService<MockUserRepositoryTrait> {
        let root = std::env::temp_dir().join(format!("recipe-share-users-{}", uuid::Uuid::new_v4()));
        UserService::new(Arc::new(mock), ImageStore::new(root))
    }

    fn fake_user(id: i64) -> User {
        User {
            id,
            email: SafeEmail().fake(),
            username: Username().fake(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            avatar: None,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn register_dto() -> CreateUserDto {
        CreateUserDto {
            email: SafeEmail().fake(),
            username: Username().fake(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            password: Password(10..20).fake(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let dto = register_dto();
        let password = dto.password.clone();

        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_create()
            .withf(move |user: &NewUser| {
                user.password_hash != password && verify_password(&password, &user.password_hash)
            })
            .times(1)
            .returning(|_| Ok(fake_user(1)));

        let user = service(mock).register(dto).await.unwrap();
        assert_eq!(user.id, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_reserved_username() {
        let mut dto = register_dto();
        dto.username = "me".to_string();

        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_create().never();

        let err = service(mock).register(dto).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let hash = hash_password("correct horse");

        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_find_credentials_by_email()
            .withf(|email| email == "cook@example.com")
            .returning(move |_| {
                Ok(Some(UserCredentials {
                    id: 5,
                    password_hash: hash.clone(),
                }))
            });
        mock.expect_get_or_create_token()
            .withf(|user_id, key| *user_id == 5 && key.len() == 40)
            .returning(|_, _| Ok("existing-token".to_string()));

        let token = service(mock)
            .login(LoginDto {
                email: "cook@example.com".to_string(),
                password: "correct horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(token, "existing-token");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let hash = hash_password("correct horse");

        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_find_credentials_by_email().returning(move |_| {
            Ok(Some(UserCredentials {
                id: 5,
                password_hash: hash.clone(),
            }))
        });
        mock.expect_get_or_create_token().never();

        let err = service(mock)
            .login(LoginDto {
                email: "cook@example.com".to_string(),
                password: "battery staple".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_find_by_token().returning(|_| Ok(None));

        let err = service(mock).authenticate("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_set_password_checks_current() {
        let hash = hash_password("old password");

        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_find_credentials_by_id().returning(move |id| {
            Ok(Some(UserCredentials {
                id,
                password_hash: hash.clone(),
            }))
        });
        mock.expect_update_password().never();

        let err = service(mock)
            .set_password(
                3,
                SetPasswordDto {
                    new_password: "brand new password".to_string(),
                    current_password: "guess".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let mut mock = MockUserRepositoryTrait::new();
        mock.expect_find_by_id().returning(|_, _| Ok(None));

        let err = service(mock).get(42, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
