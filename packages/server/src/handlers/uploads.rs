use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::filename::validate_flat_filename;

#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "Uploads",
    operation_id = "serveUpload",
    summary = "Fetch an uploaded image",
    params(("filename" = String, Path, description = "Stored image basename")),
    responses(
        (status = 200, description = "Raw image bytes"),
        (status = 404, description = "No such image (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Anything that is not a plain basename stays a 404; the upload
    // directory is the only filesystem surface this route exposes.
    let filename = validate_flat_filename(&filename)
        .map_err(|_| AppError::NotFound("Image not found".into()))?;

    let content = state.images.read(filename).await?;
    let mime = mime_guess::from_path(filename).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}
