use axum::{
    Json,
    extract::{FromRequest, Request},
};
use peopledesk_services::validation::FormSchema;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body that has already passed its form schema.
///
/// Malformed JSON is a 400; rule violations are a 422 listing every failing
/// field, so nothing downstream ever sees an unchecked form.
#[derive(Debug, Clone)]
pub struct ValidForm<T>(pub T);

impl<S, T> FromRequest<S> for ValidForm<T>
where
    T: DeserializeOwned + FormSchema,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(form) = Json::<T>::from_request(req, state).await?;
        form.check()?;
        Ok(ValidForm(form))
    }
}
