//! HTTP surface: routes, upload decoding, and response mapping.

use crate::ai::mime;
use crate::models::{ErrorBody, UploadedImage};
use crate::pipeline::{IdentificationPipeline, ProductOutcome};
use crate::{Error, Result};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{error, info_span, warn, Instrument};
use uuid::Uuid;

/// Name of the multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Shared, immutable per-process state: one pipeline per endpoint.
pub struct AppState {
    pub identify: IdentificationPipeline,
    pub candidates: IdentificationPipeline,
    pub redirect: IdentificationPipeline,
}

pub fn router(state: Arc<AppState>, max_upload_bytes: Option<usize>) -> Router {
    let router = Router::new()
        .route("/api/find", post(find_product))
        .route("/api/products", post(find_candidates))
        .route("/api/redirect", post(redirect_to_product))
        .route("/api/health", get(|| async { "OK" }))
        .with_state(state);

    // Without a configured cap, uploads are bounded only by the host.
    match max_upload_bytes {
        Some(limit) => router.layer(DefaultBodyLimit::max(limit)),
        None => router.layer(DefaultBodyLimit::disable()),
    }
}

async fn find_product(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    handle(&state.identify, multipart).await
}

async fn find_candidates(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    handle(&state.candidates, multipart).await
}

async fn redirect_to_product(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    handle(&state.redirect, multipart).await
}

async fn handle(
    pipeline: &IdentificationPipeline,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let span = info_span!(
        "find",
        mode = %pipeline.mode(),
        request_id = %Uuid::new_v4()
    );

    async move {
        let multipart = match multipart {
            Ok(multipart) => multipart,
            Err(rejection) => return Error::InvalidUpload(rejection.body_text()).into_response(),
        };

        let image = match read_image(multipart).await {
            Ok(image) => image,
            Err(e) => return e.into_response(),
        };

        match pipeline.run(&image).await {
            Ok(outcome) => outcome.into_response(),
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

/// Pull the `image` field out of the form. Other fields are ignored.
pub async fn read_image(mut multipart: Multipart) -> Result<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Failed to read multipart field", e))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read image", e))?;

        let mime_type = mime::resolve_mime(declared.as_deref(), &bytes);
        tracing::debug!("Received image: {} bytes, {}", bytes.len(), mime_type);
        return Ok(UploadedImage::new(bytes.to_vec(), mime_type));
    }

    Err(Error::MissingInput)
}

fn upload_error(context: &str, e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        Error::InvalidUpload(format!("{}: {}", context, e))
    }
}

impl IntoResponse for ProductOutcome {
    fn into_response(self) -> Response {
        match self {
            ProductOutcome::Links(links) => Json(links).into_response(),
            ProductOutcome::Candidates(list) => Json(list).into_response(),
            // 302 Found, with no body.
            ProductOutcome::Redirect(url) => match HeaderValue::from_str(&url) {
                Ok(location) => {
                    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
                }
                Err(_) => Error::NotAnAmazonUrl { raw: url }.into_response(),
            },
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        if matches!(self, Error::PayloadTooLarge(_)) {
            StatusCode::PAYLOAD_TOO_LARGE
        } else if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            raw: self.raw().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}
