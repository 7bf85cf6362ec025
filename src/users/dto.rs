use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::User;

/// Request body for user creation. Fields are optional so presence
/// can be reported as a 400 instead of a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for editing a user, keyed by email.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Public part of the user returned to clients. Never carries the
/// password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            image_path: u.image_path,
        }
    }
}

/// Response for create and login: the issued session token plus the
/// public user.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct Confirmation {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user(image_path: Option<String>) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "John Doe".into(),
            email: "john@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            image_path,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_user_uses_camel_case_and_drops_the_hash() {
        let json = serde_json::to_string(&PublicUser::from(sample_user(None))).unwrap();
        assert!(json.contains("\"fullName\":\"John Doe\""));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn image_path_is_omitted_when_absent() {
        let without = serde_json::to_string(&PublicUser::from(sample_user(None))).unwrap();
        assert!(!without.contains("imagePath"));

        let with = serde_json::to_string(&PublicUser::from(sample_user(Some(
            "/images/abc.jpg".into(),
        ))))
        .unwrap();
        assert!(with.contains("\"imagePath\":\"/images/abc.jpg\""));
    }

    #[test]
    fn requests_tolerate_missing_fields() {
        let req: CreateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.full_name.is_none());
        assert!(req.email.is_none());
        assert!(req.password.is_none());

        let req: CreateUserRequest =
            serde_json::from_str(r#"{"fullName":"Jo","email":"a@b.co"}"#).unwrap();
        assert_eq!(req.full_name.as_deref(), Some("Jo"));
        assert!(req.password.is_none());
    }

    #[test]
    fn upload_response_field_is_image_url() {
        let json = serde_json::to_string(&UploadResponse {
            image_url: "/images/x.png".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"imageUrl":"/images/x.png"}"#);
    }
}
