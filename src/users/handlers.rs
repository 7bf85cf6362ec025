use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, password},
    error::ApiError,
    state::AppState,
    storage::StorageClient,
    users::{
        dto::{
            AuthResponse, Confirmation, CreateUserRequest, DeleteUserRequest, LoginRequest,
            PublicUser, UpdateUserRequest, UploadResponse,
        },
        repo_types::User,
        validate::{is_strong_password, is_valid_email, is_valid_name},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(create_user))
        .route("/edit", put(update_user))
        .route("/delete", delete(delete_user))
        .route("/getAll", get(get_all_users))
        .route("/login", post(login_user))
        .route("/uploadImage", post(upload_image))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}

/// Drop a stored object whose owning record is gone. Best effort:
/// failures are logged, never surfaced.
async fn discard_object(storage: &dyn StorageClient, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        warn!(error = %e, key = %key, "failed to delete stored image");
    }
}

/// Presence check: an absent or empty field counts as missing.
fn required<'a>(value: Option<&'a str>, message: &'static str) -> Result<&'a str, ApiError> {
    value
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::MissingField(message))
}

/// POST /user/create
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let full_name = required(payload.full_name.as_deref(), "All fields are required.")?;
    let email = required(payload.email.as_deref(), "All fields are required.")?;
    let plain = required(payload.password.as_deref(), "All fields are required.")?;

    if !is_valid_name(full_name) {
        warn!("invalid full name");
        return Err(ApiError::InvalidName);
    }
    if !is_valid_email(email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::InvalidEmail);
    }
    if !is_strong_password(plain) {
        warn!("weak password");
        return Err(ApiError::WeakPassword);
    }

    // Advisory check; the unique constraint on users.email catches
    // the race between two concurrent creates.
    if User::find_by_email(&state.db, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = password::hash_password(plain)?;
    let user = User::create(&state.db, full_name, email, &hash).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user created");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully.".into(),
            token,
            user: PublicUser::from(user),
        }),
    ))
}

/// PUT /user/edit — partial update of name and/or password, keyed by
/// email. Untouched fields keep their stored values.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Confirmation>, ApiError> {
    let email = required(payload.email.as_deref(), "Email is required.")?;

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ApiError::NotFound)?;

    let full_name = payload.full_name.as_deref().filter(|s| !s.is_empty());
    if let Some(name) = full_name {
        if !is_valid_name(name) {
            warn!(user_id = %user.id, "invalid full name");
            return Err(ApiError::InvalidName);
        }
    }

    let password_hash = match payload.password.as_deref().filter(|s| !s.is_empty()) {
        Some(plain) => {
            if !is_strong_password(plain) {
                warn!(user_id = %user.id, "weak password");
                return Err(ApiError::WeakPassword);
            }
            Some(password::hash_password(plain)?)
        }
        None => None,
    };

    User::update_by_email(&state.db, email, full_name, password_hash.as_deref()).await?;

    info!(user_id = %user.id, email = %email, "user updated");
    Ok(Json(Confirmation {
        message: "User updated successfully.".into(),
    }))
}

/// DELETE /user/delete
#[instrument(skip(state, payload))]
pub async fn delete_user(
    State(state): State<AppState>,
    Json(payload): Json<DeleteUserRequest>,
) -> Result<Json<Confirmation>, ApiError> {
    let email = required(payload.email.as_deref(), "Email is required.")?;

    let user = User::find_by_email(&state.db, email)
        .await?
        .ok_or(ApiError::NotFound)?;

    let deleted = User::delete_by_email(&state.db, email).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound);
    }

    // The account is gone either way.
    if let Some(path) = user.image_path {
        discard_object(state.storage.as_ref(), path.trim_start_matches('/')).await;
    }

    info!(user_id = %user.id, email = %email, "user deleted");
    Ok(Json(Confirmation {
        message: "User deleted successfully.".into(),
    }))
}

/// GET /user/getAll — every record, password hash excluded.
#[instrument(skip(state))]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

/// POST /user/login
#[instrument(skip(state, payload))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = required(payload.email.as_deref(), "Email and password are required.")?;
    let plain = required(
        payload.password.as_deref(),
        "Email and password are required.",
    )?;

    let user = match User::find_by_email(&state.db, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::NotFound);
        }
    };

    if !password::verify_password(plain, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful.".into(),
        token,
        user: PublicUser::from(user),
    }))
}

/// POST /user/uploadImage (multipart)
/// Field `image` carries the file; optional text field `email` links
/// the stored path to that user's record.
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(Bytes, String, Option<String>)> = None;
    let mut email: Option<String> = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("image") => {
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Internal(e.into()))?;
                file = Some((data, content_type, filename));
            }
            Some("email") => {
                email = field.text().await.ok().filter(|s| !s.is_empty());
            }
            _ => {}
        }
    }

    let Some((body, content_type, filename)) = file else {
        return Err(ApiError::MissingFile);
    };

    let ext = filename
        .as_deref()
        .and_then(ext_from_filename)
        .or_else(|| ext_from_mime(&content_type))
        .unwrap_or("bin");
    let key = format!("images/{}.{}", Uuid::new_v4(), ext);
    state.storage.put_object(&key, body, &content_type).await?;

    let image_url = format!("/{}", key);
    if let Some(email) = email {
        let updated = User::set_image_path(&state.db, &email, &image_url).await?;
        if updated == 0 {
            warn!(email = %email, "image uploaded for unknown user");
            // Nothing references the object now; don't orphan it.
            discard_object(state.storage.as_ref(), &key).await;
            return Err(ApiError::NotFound);
        }
    }

    info!(key = %key, "image stored");
    Ok(Json(UploadResponse { image_url }))
}

fn ext_from_filename(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;
    use std::sync::Mutex;

    /// Records deletions and fails puts, for exercising the cleanup
    /// path without real storage.
    struct RecordingStorage {
        deleted: Mutex<Vec<String>>,
        fail_delete: bool,
    }

    impl RecordingStorage {
        fn new(fail_delete: bool) -> Self {
            Self {
                deleted: Mutex::new(Vec::new()),
                fail_delete,
            }
        }
    }

    #[async_trait]
    impl StorageClient for RecordingStorage {
        async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
            Ok(())
        }
        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            if self.fail_delete {
                anyhow::bail!("delete refused");
            }
            self.deleted.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn discard_object_deletes_the_given_key() {
        let storage = RecordingStorage::new(false);
        discard_object(&storage, "images/abc.jpg").await;
        assert_eq!(
            storage.deleted.lock().unwrap().as_slice(),
            ["images/abc.jpg".to_string()]
        );
    }

    #[tokio::test]
    async fn discard_object_swallows_storage_failures() {
        let storage = RecordingStorage::new(true);
        // Must not panic or propagate: cleanup is best effort.
        discard_object(&storage, "images/abc.jpg").await;
        assert!(storage.deleted.lock().unwrap().is_empty());
    }

    #[test]
    fn required_rejects_absent_and_empty() {
        assert!(required(None, "Email is required.").is_err());
        assert!(required(Some(""), "Email is required.").is_err());
        assert_eq!(required(Some("a@b.co"), "x").unwrap(), "a@b.co");
    }

    #[test]
    fn ext_from_filename_takes_the_last_segment() {
        assert_eq!(ext_from_filename("photo.jpg"), Some("jpg"));
        assert_eq!(ext_from_filename("archive.tar.gz"), Some("gz"));
        assert_eq!(ext_from_filename("no-extension"), None);
        assert_eq!(ext_from_filename("trailing."), None);
        assert_eq!(ext_from_filename("weird.j pg"), None);
    }

    #[test]
    fn ext_from_mime_covers_image_types() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }
}
