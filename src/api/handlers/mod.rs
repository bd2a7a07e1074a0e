//! API handlers and shared utilities for GatherGuru.
//!
//! This module organizes the service's route handlers and provides the
//! multipart image intake shared by event banners and profile pictures.

pub mod auth;
pub mod events;
pub mod health;
pub mod profile;
pub mod root;
pub mod types;

use axum::{body::Bytes, extract::Multipart};
use tracing::debug;

use crate::{
    api::handlers::types::ApiError,
    upload::{MAX_UPLOAD_BYTES, extension_for},
};

/// Pull the first file field out of a multipart body and return its bytes
/// together with the declared content type.
///
/// Non-file fields are skipped so browsers can send captions or CSRF tokens
/// alongside the image without breaking the upload.
pub(crate) async fn read_image_field(
    mut multipart: Multipart,
) -> Result<(Bytes, String), ApiError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                debug!("Failed to read multipart field: {}", error);

                return Err(ApiError::BadRequest(
                    "Please upload an image file".to_string(),
                ));
            }
        };

        if field.file_name().is_none() {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if extension_for(&content_type).is_none() {
            return Err(ApiError::BadRequest(
                "Only JPEG and PNG images are allowed".to_string(),
            ));
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!("Failed to buffer multipart field: {}", error);

                return Err(ApiError::BadRequest(
                    "Please upload an image file".to_string(),
                ));
            }
        };

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::BadRequest("File too large".to_string()));
        }

        if bytes.is_empty() {
            return Err(ApiError::BadRequest(
                "Please upload an image file".to_string(),
            ));
        }

        return Ok((bytes, content_type));
    }

    Err(ApiError::BadRequest(
        "Please upload an image file".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::{FromRequest, Request},
        http::header::CONTENT_TYPE,
    };

    const BOUNDARY: &str = "gatherguru-test-boundary";

    fn file_part(name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
        let mut part = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        part.extend_from_slice(bytes);
        part.extend_from_slice(b"\r\n");
        part
    }

    fn text_part(name: &str, value: &str) -> Vec<u8> {
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .into_bytes()
    }

    async fn multipart_from(parts: Vec<Vec<u8>>) -> Multipart {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(&part);
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn accepts_png_and_skips_text_fields() {
        let multipart = multipart_from(vec![
            text_part("caption", "launch party"),
            file_part("image", "banner.png", "image/png", b"png-bytes"),
        ])
        .await;

        let (bytes, content_type) = read_image_field(multipart).await.unwrap();
        assert_eq!(bytes.as_ref(), b"png-bytes");
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn rejects_unsupported_content_type() {
        let multipart = multipart_from(vec![file_part(
            "image",
            "banner.gif",
            "image/gif",
            b"gif-bytes",
        )])
        .await;

        match read_image_field(multipart).await {
            Err(ApiError::BadRequest(message)) => {
                assert_eq!(message, "Only JPEG and PNG images are allowed");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_body_without_file_field() {
        let multipart = multipart_from(vec![text_part("caption", "no image here")]).await;

        match read_image_field(multipart).await {
            Err(ApiError::BadRequest(message)) => {
                assert_eq!(message, "Please upload an image file");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_empty_file() {
        let multipart =
            multipart_from(vec![file_part("image", "banner.png", "image/png", b"")]).await;

        match read_image_field(multipart).await {
            Err(ApiError::BadRequest(message)) => {
                assert_eq!(message, "Please upload an image file");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    // Extracting straight from a hand-built request leaves axum's stock 2MB
    // body cap in place, so the oversized case goes through the same layer the
    // router uses to raise it.
    #[tokio::test]
    async fn rejects_oversized_file() {
        use axum::extract::DefaultBodyLimit;
        use std::convert::Infallible;
        use tower::{Layer, Service, ServiceExt};

        let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let mut body = file_part("image", "banner.jpg", "image/jpeg", &oversized);
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let service = tower::service_fn(|request: Request| async move {
            let multipart = Multipart::from_request(request, &()).await.unwrap();
            Ok::<_, Infallible>(read_image_field(multipart).await)
        });
        let mut service = DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2).layer(service);

        let result = service.ready().await.unwrap().call(request).await.unwrap();
        match result {
            Err(ApiError::BadRequest(message)) => {
                assert_eq!(message, "File too large");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }
}
