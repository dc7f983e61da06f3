use crate::dbs::DbError;
use crate::images::ImageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shared::models::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Player not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("The sheet was changed meanwhile, reload and try again")]
    Conflict,

    #[error("Malformed request: {0}")]
    MalformedInput(String),

    #[error("Store error: {0}")]
    Store(DbError),

    #[error("Image error: {0}")]
    Images(#[from] ImageError),
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(_) => ApiError::NotFound,
            DbError::Conflict(_) => ApiError::Conflict,
            e => ApiError::Store(e),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        ApiError::MalformedInput(e.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Images(ImageError::UnsupportedType(_) | ImageError::TooLarge { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(_) | ApiError::Images(ImageError::Io(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}
