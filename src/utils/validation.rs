use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest},
    http::Request,
    Json, RequestExt,
};
use serde_json::{Map, Value as JsonValue};
use validator::{Validate, ValidationError, ValidationErrors};

use super::AppError;
use crate::constants::OTP_LENGTH;

/// Custom validator function to check an otp code
pub fn validate_otp_code(code: &str) -> Result<(), ValidationError> {
    // otp must be exactly OTP_LENGTH chars long
    if code.len() != OTP_LENGTH as usize {
        let mut err = ValidationError::new("otp");
        err.message = Some(format!("The code must be {OTP_LENGTH} digits.").into());
        return Err(err);
    }
    // otp must be all numeric chars
    if !code.chars().all(|ch| ch.is_ascii_digit()) {
        let mut err = ValidationError::new("otp");
        err.message = Some("The code must contain only digits.".into());
        return Err(err);
    }

    Ok(())
}

fn describe(field: &str, err: &ValidationError) -> String {
    if let Some(msg) = &err.message {
        return msg.to_string();
    }
    match err.code.as_ref() {
        "email" => format!("The {field} must be a valid email address."),
        "length" => format!("The {field} has an invalid length."),
        "must_match" => format!("The {field} does not match."),
        code => format!("The {field} is invalid ({code})."),
    }
}

/// Field level error messages keyed by field name
pub fn field_errors_json(errors: &ValidationErrors) -> JsonValue {
    let mut map = Map::new();
    for (field, errs) in errors.field_errors() {
        let msgs = errs
            .iter()
            .map(|err| JsonValue::String(describe(field, err)))
            .collect();
        map.insert(field.to_string(), JsonValue::Array(msgs));
    }
    JsonValue::Object(map)
}

impl AppError {
    pub fn validation(errors: &ValidationErrors) -> Self {
        let fields = field_errors_json(errors);
        Self::ValidationErr("The given data was invalid.".into(), Some(fields))
    }
}

/// JSON body extractor which also runs the `validator` rules of the body type
pub struct ValidatedBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for ValidatedBody<T>
where
    B: Send + 'static,
    S: Send + Sync,
    T: Validate + 'static,
    Json<T>: FromRequest<(), B, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request<B>, _state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = req
            .extract::<Json<T>, _>()
            .await
            .map_err(|rejection| AppError::ValidationErr(rejection.body_text(), None))?;
        data.validate().map_err(|err| AppError::validation(&err))?;
        Ok(Self(data))
    }
}
