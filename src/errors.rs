use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};

#[derive(Debug)]
pub enum RequestError {
    NotFound,
    /// Unauthenticated access to a protected path. Carries the original
    /// path + query so the login page can send the user back.
    AuthRequired(String),
    ValidationFailed(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct RequestErrorJsonWrapper {
    errors: RequestErrorJson,
}

#[derive(serde::Serialize)]
pub struct RequestErrorJson {
    body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(RequestErrorJsonWrapper::new("Not Found")),
            )
                .into_response(),
            RequestError::AuthRequired(next) => {
                Redirect::to(&format!("/auth/login?next={next}")).into_response()
            }
            RequestError::ValidationFailed(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RequestErrorJsonWrapper::new("Internal Server Error")),
            )
                .into_response(),
            RequestError::DatabaseError(error) => {
                tracing::error!("Database error: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RequestErrorJsonWrapper::new("Internal Server Error")),
                )
                    .into_response()
            }
        }
    }
}
