//! # Axum Response

use axum::body::Body;
use credibil_vci_issuer::{Response as IssuerResponse, Result};
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use serde::Serialize;

/// Trait for converting a handler `Result` into an HTTP response.
pub trait IntoHttp {
    /// Convert into an HTTP response.
    fn into_http(self) -> Response<Body>;
}

impl<T: Serialize> IntoHttp for Result<IssuerResponse<T>> {
    fn into_http(self) -> Response<Body> {
        let (status, body) = match self {
            Ok(r) => (r.status, serde_json::to_vec(&r.body)),
            Err(e) => {
                let status = if e.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    tracing::error!("{e}");
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, serde_json::to_vec(&e))
            }
        };

        let result = match body {
            Ok(body) => Response::builder()
                .status(status)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            Err(e) => {
                tracing::error!("serializing response: {e}");
                Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR).body(Body::empty())
            }
        };
        result.unwrap_or_default()
    }
}
