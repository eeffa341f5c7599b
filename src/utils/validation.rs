use axum::{
    async_trait,
    extract::FromRequest,
    http::{Request, StatusCode},
    Json, RequestExt,
};
use lazy_static::lazy_static;
use regex::Regex;
use validator::{Validate, ValidationError};

lazy_static! {
    // phone must start with +7 or 8 followed by 10 digits
    static ref PHONE_RE: Regex = Regex::new(r"^(\+7|8)\d{10}$").expect("invalid phone regex");
}

/// Custom validator function to check phone number
pub fn validate_phonenumber(phone: &str) -> Result<(), ValidationError> {
    if !PHONE_RE.is_match(phone) {
        let mut err = ValidationError::new("phone");
        err.message = Some(
            format!("Phone must start with +7 or 8 followed by 10 digits, received: {phone}")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

pub struct ValidatedBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for ValidatedBody<T>
where
    B: Send + 'static,
    S: Send + Sync,
    T: Validate + 'static,
    Json<T>: FromRequest<(), B>,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request<B>, _state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = req
            .extract::<Json<T>, _>()
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid JSON body".to_owned()))?;
        data.validate()
            .map_err(|err| (StatusCode::BAD_REQUEST, format!("Validation failed: {err}")))?;
        Ok(Self(data))
    }
}
