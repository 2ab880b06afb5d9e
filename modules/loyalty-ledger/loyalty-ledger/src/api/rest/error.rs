use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::problem::{Problem, ValidationViolation};
use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 problem.
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        DomainError::NotFound { entity, .. } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{entity} not found"), e.to_string())
                .with_code("NOT_FOUND")
        }
        DomainError::Inactive { .. } => Problem::new(
            StatusCode::BAD_REQUEST,
            "Merchant is not active",
            e.to_string(),
        )
        .with_code("MERCHANT_INACTIVE"),
        DomainError::InsufficientMerchantFunds { available, .. } => Problem::new(
            StatusCode::BAD_REQUEST,
            "Merchant has insufficient wallet balance for rewards",
            e.to_string(),
        )
        .with_code("INSUFFICIENT_MERCHANT_FUNDS")
        .with_available(*available),
        DomainError::InsufficientPoints { available, .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Insufficient points", e.to_string())
                .with_code("INSUFFICIENT_POINTS")
                .with_available(*available)
        }
        DomainError::InsufficientBalance { available, .. } => {
            Problem::new(StatusCode::BAD_REQUEST, "Insufficient balance", e.to_string())
                .with_code("INSUFFICIENT_BALANCE")
                .with_available(*available)
        }
        DomainError::Validation { field, message } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation failed",
            format!("Validation error on '{field}': {message}"),
        )
        .with_code("VALIDATION")
        .with_errors(vec![ValidationViolation {
            field: field.clone(),
            message: message.clone(),
        }]),
        DomainError::Store { message } => {
            tracing::error!(error = %message, "Store failure while serving request");
            Problem::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error",
                "An internal storage error occurred",
            )
            .with_code("STORE_FAILURE")
        }
    };

    problem.with_instance(instance).with_trace_id(trace_id)
}

/// Handler error: a domain error bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    error: DomainError,
    instance: String,
}

impl ApiError {
    #[must_use]
    pub fn new(error: DomainError, instance: impl Into<String>) -> Self {
        Self {
            error,
            instance: instance.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::new(error, "/")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        domain_error_to_problem(&self.error, &self.instance).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (DomainError::customer_not_found("1"), StatusCode::NOT_FOUND),
            (
                DomainError::inactive(Uuid::nil()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::InsufficientPoints {
                    requested: 2,
                    available: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::validation("amount", "must be greater than zero"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::store("disk full"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(domain_error_to_problem(&err, "/x").status, status);
        }
    }

    #[test]
    fn store_details_are_not_leaked() {
        let p = domain_error_to_problem(&DomainError::store("password=hunter2"), "/x");
        assert!(!p.detail.contains("hunter2"));
        assert_eq!(p.instance, "/x");
    }

    #[test]
    fn insufficient_funds_carry_available() {
        let p = domain_error_to_problem(
            &DomainError::InsufficientMerchantFunds {
                required: 10,
                available: 5,
            },
            "/loyalty/v1/transactions/earn",
        );
        assert_eq!(p.available, Some(5));
        assert_eq!(p.code, "INSUFFICIENT_MERCHANT_FUNDS");
    }
}
