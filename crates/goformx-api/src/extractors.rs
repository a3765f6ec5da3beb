//! # Request Extraction
//!
//! Helpers that turn request bodies into domain values, mapping every
//! failure to an [`ApiError`].
//!
//! ```ignore
//! async fn create_form(
//!     State(state): State<AppState>,
//!     body: Result<Json<FormDraft>, JsonRejection>,
//! ) -> Result<Json<FormDefinition>, ApiError> {
//!     let form = extract_validated_form(body, state.user_id, &state.validator)?;
//!     // persist form...
//! }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::Json;
use goformx_core::UserId;
use goformx_form::{FormDefinition, FormDraft, FormValidator};

use crate::error::ApiError;

/// Extract a JSON body, mapping deserialization errors to `BAD_REQUEST`.
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| ApiError::bad_request(err.body_text()))
}

/// Extract a form draft, build the form record for `owner` and validate it.
pub fn extract_validated_form(
    result: Result<Json<FormDraft>, JsonRejection>,
    owner: UserId,
    validator: &FormValidator,
) -> Result<FormDefinition, ApiError> {
    let form = extract_json(result)?
        .into_form(owner)
        .map_err(|e| ApiError::from(e).with_user_id(owner))?;
    validator
        .validate(&form)
        .map_err(|e| ApiError::from(e).with_user_id(owner))?;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::{Request, StatusCode};
    use goformx_core::{ErrorCode, Sentinel};

    async fn draft_body(body: &str) -> Result<Json<FormDraft>, JsonRejection> {
        let request = Request::builder()
            .method("POST")
            .uri("/forms")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        Json::<FormDraft>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let err = extract_json(draft_body("{ not json").await).unwrap_err();
        assert_eq!(err.domain().code(), ErrorCode::BadRequest);
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_form_is_built_for_owner() {
        let owner = UserId::new();
        let body = r#"{
            "title": "Contact Us",
            "schema": {
                "title": "Contact Us",
                "description": "",
                "fields": [{ "type": "email", "name": "email", "label": "Email" }]
            }
        }"#;
        let form = extract_validated_form(draft_body(body).await, owner, &FormValidator::default())
            .unwrap();
        assert_eq!(form.owner_id(), owner);
        assert!(form.is_active());
    }

    #[tokio::test]
    async fn missing_schema_surfaces_sentinel() {
        let err = extract_validated_form(
            draft_body(r#"{ "title": "Survey" }"#).await,
            UserId::new(),
            &FormValidator::default(),
        )
        .unwrap_err();
        assert!(err.domain().is(Sentinel::SchemaRequired));
    }

    #[tokio::test]
    async fn non_object_schema_is_invalid_input() {
        let err = extract_validated_form(
            draft_body(r#"{ "title": "Survey", "schema": "fields" }"#).await,
            UserId::new(),
            &FormValidator::default(),
        )
        .unwrap_err();
        assert_eq!(err.domain().code(), ErrorCode::ValidationInvalidInput);
    }
}
