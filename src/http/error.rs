//! Error translation.
//!
//! Every failure a request can hit ends here and becomes a single HTTP
//! response with a `{"message": ...}` body.
//!
//! # Design Decisions
//! - Binding failures happen before dispatch and are always 400
//! - Backend failures go through the status code mapping
//! - Routing failures are 404/405, with an `Allow` header on 405
//! - A body over the size limit is 413, whether or not it declared a length

use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::binding::BindError;
use crate::rpc::{DispatchError, FailureDescriptor};

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Any failure while serving a gateway request.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed(Vec<Method>),

    #[error("Payload Too Large")]
    PayloadTooLarge,

    #[error("failed to read request body: {0}")]
    Body(#[source] BytesRejection),

    #[error(transparent)]
    Binding(#[from] BindError),

    #[error("{}", .0.message)]
    Rpc(FailureDescriptor),
}

impl From<DispatchError> for GatewayError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Bind(err) => GatewayError::Binding(err),
            DispatchError::Failed(failure) => GatewayError::Rpc(failure),
        }
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Body(_) | GatewayError::Binding(_) => StatusCode::BAD_REQUEST,
            GatewayError::Rpc(failure) => failure.code.http_status(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let allow = match &self {
            GatewayError::MethodNotAllowed(methods) => {
                let joined = methods.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                HeaderValue::from_str(&joined).ok()
            }
            _ => None,
        };

        let body = ErrorBody {
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(allow) = allow {
            response.headers_mut().insert(header::ALLOW, allow);
        }
        response
    }
}
