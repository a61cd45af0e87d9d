//! Media download addresses and multipart parsing shared by upload routes

use axum::{
    Router,
    extract::{Multipart, Path, State, multipart::Field},
    http::header,
    response::IntoResponse,
    routing::get,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::article::CreateArticleForm;
use crate::models::media::{SignedUrl, UploadedFile};
use crate::response::ApiResponse;
use crate::state::AppState;

pub fn member_routes() -> Router<AppState> {
    Router::new()
        .route("/media/:uuid/url", get(signed_url))
        .route("/media/:uuid/content", get(content))
}

pub async fn signed_url(
    State(state): State<AppState>,
    Path(uuid): Path<Uuid>,
) -> ApiResult<ApiResponse<SignedUrl>> {
    let signed = state
        .services
        .media
        .signed_url(uuid)
        .await
        .map_err(|e| e.logged("Failed to sign media url"))?;

    Ok(ApiResponse::ok("Signed url", signed))
}

/// Stream the stored object back through the API
pub async fn content(State(state): State<AppState>, Path(uuid): Path<Uuid>) -> ApiResult<impl IntoResponse> {
    let (content_type, bytes) = state
        .services
        .media
        .content(uuid)
        .await
        .map_err(|e| e.logged("Failed to download media"))?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

fn malformed(e: impl std::fmt::Display) -> ApiError {
    ApiError::BadRequest(format!("Malformed multipart body: {}", e))
}

async fn read_file(field: Field<'_>) -> ApiResult<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field.bytes().await.map_err(malformed)?;

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

/// The `file` part of an upload body
pub(crate) async fn file_part(mut multipart: Multipart) -> ApiResult<UploadedFile> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() == Some("file") {
            return read_file(field).await;
        }
    }
    Err(ApiError::bad_request("Missing file"))
}

/// `title`, `content`, optional `file`, and repeated `category` parts
pub(crate) async fn article_form(mut multipart: Multipart) -> ApiResult<CreateArticleForm> {
    let mut form = CreateArticleForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = field.text().await.map_err(malformed)?,
            "content" => form.content = field.text().await.map_err(malformed)?,
            "file" => form.file = Some(read_file(field).await?),
            "category" => {
                let text = field.text().await.map_err(malformed)?;
                let uuid = Uuid::parse_str(text.trim())
                    .map_err(|_| ApiError::BadRequest(format!("Invalid category: {}", text)))?;
                form.categories.push(uuid);
            }
            _ => {}
        }
    }

    Ok(form)
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::routes::test_support::*;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};

    pub const BOUNDARY: &str = "carenet-boundary";

    /// Text parts plus an optional png `file` part
    pub fn multipart_request(uri: &str, token: &str, texts: &[(&str, &str)], file: Option<&str>) -> Request<Body> {
        let file = file.map(|name| (name, "image/png", b"PNGDATA".as_slice()));
        multipart_with(uri, token, texts, file)
    }

    /// A lone `file` part with arbitrary bytes
    pub fn file_upload_request(uri: &str, token: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        multipart_with(uri, token, &[], Some((file_name, content_type, bytes)))
    }

    fn multipart_with(
        uri: &str,
        token: &str,
        texts: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in texts {
            body.extend_from_slice(
                format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        if let Some((file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_media_is_404() {
        let state = AppState::in_memory();
        let token = token_for(&state, "ana@example.com", false).await;

        let request = empty_request(
            "GET",
            "/api/v1/media/00000000-0000-4000-8000-000000000000/url",
            Some(&token),
        );
        assert_eq!(send(&state, request).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn uploaded_photo_can_be_downloaded() {
        let state = AppState::in_memory();
        let token = token_for(&state, "ana@example.com", false).await;

        let create = json_request(
            "POST",
            "/api/v1/reminders",
            Some(&token),
            serde_json::json!({ "title": "Shot", "remind_at": "2030-01-01T09:00:00Z" }),
        );
        let body = body_json(send(&state, create).await).await;
        let reminder = body["data"]["uuid"].as_str().unwrap().to_string();

        let upload = multipart_request(
            &format!("/api/v1/reminders/{}/media", reminder),
            &token,
            &[],
            Some("shot.png"),
        );
        let body = body_json(send(&state, upload).await).await;
        let media = body["data"]["uuid"].as_str().unwrap().to_string();

        let download = empty_request("GET", &format!("/api/v1/media/{}/content", media), Some(&token));
        let response = send(&state, download).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(response).await, b"PNGDATA".to_vec());
    }
}
