use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AppError;

pub const NOT_JSON: &str = "Please send a JSON request body.";
pub const INVALID_BODY: &str = "Invalid input data. Please check the request body.";

/// JSON body extractor whose rejection is an [`AppError::Validation`], so a
/// malformed body gets the same 400 envelope as any other bad input.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "request body rejected");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::validation(NOT_JSON),
            _ => AppError::validation(INVALID_BODY),
        }
    }
}
