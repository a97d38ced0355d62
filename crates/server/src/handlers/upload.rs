//! `POST /up`: store a file sent as multipart form data.

use crate::error::{ApiResult, FetchError};
use crate::fetch::Upload;
use crate::state::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use tracing::Instrument;

/// POST /up - Store the multipart field `file` and return its public URL.
///
/// The copy runs on its own task, so a client that goes away mid-request
/// ends it through the body stream failing, never by abandoning it.
#[tracing::instrument(skip_all)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<String> {
    let multipart = multipart.map_err(|e| FetchError::Multipart(e.body_text()))?;
    tokio::spawn(store_upload(state, multipart).in_current_span()).await?
}

async fn store_upload(state: AppState, mut multipart: Multipart) -> ApiResult<String> {
    while let Some(field) = multipart.next_field().await.map_err(FetchError::from)? {
        let Some(upload) = Upload::from_field(field) else {
            continue;
        };
        tracing::debug!(filename = %upload.filename, "Receiving upload");
        let filename = state.store.store(upload.stream, &upload.filename).await?;
        return Ok(state.public_url(&filename));
    }

    Err(FetchError::MissingFileField.into())
}
