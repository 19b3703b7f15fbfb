//! Photo serving for record folders
//!
//! The folder path component is validated against the record identity
//! charset before any filesystem access, so traversal sequences never
//! reach the disk.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::fs;

use crate::error::{ApiError, ApiResult};
use crate::store::is_valid_folder_name;
use crate::AppState;

/// GET /patient-photos/:folder/photo.jpg
pub async fn get_photo(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> ApiResult<Response> {
    if !is_valid_folder_name(&folder) {
        return Err(ApiError::NotFound(format!("No photo for {}", folder)));
    }

    match fs::read(state.store.photo_path(&folder)).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ApiError::NotFound(format!("No photo for {}", folder)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Build photo routes
pub fn photo_routes() -> Router<AppState> {
    Router::new().route("/patient-photos/:folder/photo.jpg", get(get_photo))
}
