use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

/// SQLSTATE for `string_data_right_truncation`.
const PG_VALUE_TOO_LONG: &str = "22001";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error("value too long: {0}")]
    ValueTooLong(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = error {
            return StoreError::NotFound;
        }

        let classified = match error.as_database_error() {
            Some(db_err) => match db_err.kind() {
                ErrorKind::NotNullViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::CheckViolation => {
                    Some(StoreError::Integrity(db_err.message().to_string()))
                }
                _ if db_err.code().as_deref() == Some(PG_VALUE_TOO_LONG) => {
                    Some(StoreError::ValueTooLong(db_err.message().to_string()))
                }
                _ => None,
            },
            None => None,
        };

        classified.unwrap_or(StoreError::Database(error))
    }
}

#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Survey not found")]
    SurveyNotFound,
    #[error("Question not found")]
    QuestionNotFound,
    #[error("Answer not found")]
    AnswerNotFound,
    #[error("No record for key {0:?}")]
    UnknownKey(String),
    #[error("Survey is not open for voting")]
    SurveyNotActive,
    #[error("Integrity error: {0}")]
    Integrity(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for SurveyError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            SurveyError::SurveyNotFound => (StatusCode::NOT_FOUND, "Survey not found"),
            SurveyError::QuestionNotFound => (StatusCode::NOT_FOUND, "Question not found"),
            SurveyError::AnswerNotFound => (StatusCode::NOT_FOUND, "Answer not found"),
            SurveyError::UnknownKey(_) => (StatusCode::NOT_FOUND, "Not found"),
            SurveyError::SurveyNotActive => (StatusCode::BAD_REQUEST, "Survey is not active"),
            SurveyError::Integrity(_) => (StatusCode::BAD_REQUEST, "Integrity error"),
            SurveyError::DatabaseError(msg) => {
                error!("store failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for SurveyError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Integrity(msg) | StoreError::ValueTooLong(msg) => {
                SurveyError::Integrity(msg)
            }
            StoreError::NotFound => SurveyError::SurveyNotFound,
            StoreError::Database(e) => SurveyError::DatabaseError(e.to_string()),
        }
    }
}

// Missing or mistyped body fields are the same failure as a null column.
impl From<JsonRejection> for SurveyError {
    fn from(rejection: JsonRejection) -> Self {
        SurveyError::Integrity(rejection.body_text())
    }
}

impl From<PathRejection> for SurveyError {
    fn from(rejection: PathRejection) -> Self {
        SurveyError::UnknownKey(rejection.body_text())
    }
}
