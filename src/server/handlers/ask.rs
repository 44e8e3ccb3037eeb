use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::core::errors::ApiError;
use crate::documents::UploadedDocument;
use crate::pipeline::{AskMode, AskOutcome, AskRequest};
use crate::state::AppState;

/// `POST /api/ask` (multipart).
///
/// Fields: `query` (required), `mode` (`fallback` | `grounded`), and any
/// number of `files` parts carrying a file name.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AskOutcome>, ApiError> {
    let mut query = String::new();
    let mut mode = AskMode::default();
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "query" => {
                query = field.text().await.map_err(multipart_error)?;
            }
            "mode" => {
                mode = field.text().await.map_err(multipart_error)?.parse()?;
            }
            "files" | "file" => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    return Err(ApiError::BadRequest(
                        "File part is missing a file name".to_string(),
                    ));
                };
                let bytes = field.bytes().await.map_err(multipart_error)?;
                documents.push(UploadedDocument::new(file_name, bytes.to_vec()));
            }
            other => {
                tracing::debug!("Ignoring unknown multipart field {:?}", other);
            }
        }
    }

    tracing::info!(
        "Ask request: {} document(s), mode={:?}",
        documents.len(),
        mode
    );

    let outcome = state
        .ask
        .ask(AskRequest {
            query,
            documents,
            mode,
        })
        .await?;

    Ok(Json(outcome))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
