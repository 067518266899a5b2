/**
 * Media Routes
 * Image upload, listing and deletion for block media fields
 */
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path as FsPath, PathBuf};

use crate::error::{CmsError, CmsResult};
use crate::render::{MediaResolver, PublicMediaResolver};
use crate::routes::auth::BearerAuth;
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Reference to store in a block's media field.
    pub key: String,
    pub url: String,
    pub size: usize,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MediaListResponse {
    pub media: Vec<MediaInfo>,
    pub total: usize,
}

/// Sniff the image type from the leading bytes.
fn detect_image_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Content-addressed file name: identical uploads share one file.
fn content_key(bytes: &[u8], mime: &str) -> String {
    let digest = Sha256::digest(bytes);
    let hex: String = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
    format!("{}.{}", hex, extension_for(mime))
}

fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains("..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

fn media_url(state: &AppState, key: &str) -> String {
    PublicMediaResolver::new(state.config.media_base_url.clone())
        .resolve(key)
        .unwrap_or_else(|| format!("/uploads/{}", key))
}

fn upload_dir(state: &AppState) -> PathBuf {
    state.config.upload_dir.clone()
}

/// POST /api/media (multipart, field `file`)
pub async fn upload_media(
    State(state): State<AppState>,
    auth: BearerAuth,
    mut multipart: Multipart,
) -> CmsResult<(StatusCode, Json<UploadResponse>)> {
    let user = auth.require()?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| CmsError::InvalidInput(format!("invalid multipart data: {}", e)))?
        .ok_or_else(|| CmsError::InvalidInput("no file provided".to_string()))?;

    let original_name = field.file_name().unwrap_or("unknown").to_string();
    let original_ext = original_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&original_ext.as_str()) {
        return Err(CmsError::InvalidInput(
            "unsupported file type; allowed: JPEG, PNG, WebP, GIF".to_string(),
        ));
    }

    let bytes = field
        .bytes()
        .await
        .map_err(|e| CmsError::InvalidInput(format!("failed to read file data: {}", e)))?;
    if bytes.is_empty() {
        return Err(CmsError::InvalidInput("empty file".to_string()));
    }
    if bytes.len() > state.config.max_upload_bytes {
        return Err(CmsError::InvalidInput(format!(
            "file too large; maximum size is {} bytes",
            state.config.max_upload_bytes
        )));
    }
    let mime = detect_image_type(&bytes).ok_or_else(|| {
        CmsError::InvalidInput("file content does not match an allowed image type".to_string())
    })?;

    let dir = upload_dir(&state);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| CmsError::Internal(format!("failed to create upload directory: {}", e)))?;

    let key = content_key(&bytes, mime);
    let path = dir.join(&key);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CmsError::Internal(format!("failed to save file: {}", e)))?;
    }

    tracing::info!(key = %key, size = bytes.len(), user = %user.email, "media uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: media_url(&state, &key),
            key,
            size: bytes.len(),
            mime_type: mime.to_string(),
        }),
    ))
}

/// GET /api/media
pub async fn list_media(
    State(state): State<AppState>,
    auth: BearerAuth,
) -> CmsResult<Json<MediaListResponse>> {
    auth.require()?;
    let dir = upload_dir(&state);
    let mut media = Vec::new();

    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Json(MediaListResponse {
                media,
                total: 0,
            }))
        }
        Err(e) => return Err(CmsError::Internal(format!("failed to list media: {}", e))),
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let Some(key) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let ext = FsPath::new(&key)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let created_at = metadata
            .created()
            .or_else(|_| metadata.modified())
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339())
            .unwrap_or_default();

        media.push(MediaInfo {
            url: media_url(&state, &key),
            key,
            size: metadata.len(),
            created_at,
        });
    }

    media.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = media.len();
    Ok(Json(MediaListResponse { media, total }))
}

/// DELETE /api/media/{key}
pub async fn delete_media(
    State(state): State<AppState>,
    auth: BearerAuth,
    Path(key): Path<String>,
) -> CmsResult<StatusCode> {
    let user = auth.require()?;
    if !is_safe_key(&key) {
        return Err(CmsError::InvalidInput("invalid media key".to_string()));
    }

    let path = upload_dir(&state).join(&key);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(key = %key, user = %user.email, "media deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CmsError::NotFound(key))
        }
        Err(e) => Err(CmsError::Internal(format!("failed to delete media: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::routes::test_support::{bearer, get_request, send};
    use axum::{body::Body, http::Request, routing::{delete, get}, Router};

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn router(dir: PathBuf) -> Router {
        let config = AppConfig {
            upload_dir: dir,
            ..AppConfig::default()
        };
        Router::new()
            .route("/api/media", get(list_media).post(upload_media))
            .route("/api/media/{key}", delete(delete_media))
            .with_state(AppState::in_memory(config))
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("physio-cms-{}-{}", name, uuid::Uuid::new_v4()))
    }

    fn multipart_request(auth: Option<&str>, filename: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "X-PHYSIO-BOUNDARY";
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = boundary,
            f = filename
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let mut builder = Request::post("/api/media").header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        );
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[test]
    fn test_detect_image_type() {
        assert_eq!(detect_image_type(PNG), Some("image/png"));
        assert_eq!(detect_image_type(b"<svg></svg>"), None);
        assert_eq!(detect_image_type(&[]), None);
    }

    #[test]
    fn test_content_key_is_stable() {
        assert_eq!(content_key(PNG, "image/png"), content_key(PNG, "image/png"));
        assert!(content_key(PNG, "image/png").ends_with(".png"));
    }

    #[test]
    fn test_unsafe_keys() {
        assert!(is_safe_key("abc123.png"));
        assert!(!is_safe_key("../secret"));
        assert!(!is_safe_key("a/b.png"));
        assert!(!is_safe_key(""));
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let (status, _) = send(router(temp_dir("noauth")), multipart_request(None, "a.png", PNG)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_list_delete() {
        let dir = temp_dir("roundtrip");
        let app = router(dir.clone());
        let auth = bearer();

        let (status, bytes) = send(app.clone(), multipart_request(Some(&auth), "praxis.png", PNG)).await;
        assert_eq!(status, StatusCode::CREATED);
        let uploaded: UploadResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(uploaded.mime_type, "image/png");
        assert_eq!(uploaded.url, format!("/uploads/{}", uploaded.key));

        let (_, bytes) = send(app.clone(), get_request("/api/media", Some(&auth))).await;
        let list: MediaListResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(list.total, 1);

        let req = Request::delete(format!("/api/media/{}", uploaded.key))
            .header("authorization", &auth)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_mismatched_content_is_rejected() {
        let auth = bearer();
        let (status, _) = send(
            router(temp_dir("mismatch")),
            multipart_request(Some(&auth), "fake.png", b"not really an image"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
