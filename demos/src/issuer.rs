//! # Issuance API
//!
//! A (naive) HTTP server for the credential issuer.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use credibil_vci_issuer::{
    AuthorizationHeader, CredentialRequest, DiscoveryRequest, Error, Issuer, Request,
};
use test_utils::Realm;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::http::IntoHttp;

#[derive(Clone)]
struct AppState {
    issuer: Arc<Issuer>,
    provider: Realm,
}

/// Serve the issuer at `addr` (`host:port`).
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn serve(addr: &str, issuer: Issuer, provider: Realm) -> Result<JoinHandle<()>> {
    let router = router(issuer, provider);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on {addr}");

    let jh = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("server stopped: {e}");
        }
    });

    Ok(jh)
}

/// The issuer's routes and middleware.
#[must_use]
pub fn router(issuer: Issuer, provider: Realm) -> Router {
    let state = AppState {
        issuer: Arc::new(issuer),
        provider,
    };

    Router::new()
        .route("/.well-known/openid-configuration", get(discovery))
        .route("/credential", post(credential))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any).allow_headers(Any))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store"),
        ))
        .with_state(state)
}

#[axum::debug_handler]
async fn discovery(State(state): State<AppState>) -> impl IntoResponse {
    credibil_vci_issuer::handle(&state.issuer, DiscoveryRequest, &state.provider).await.into_http()
}

#[axum::debug_handler]
async fn credential(
    State(state): State<AppState>, headers: HeaderMap,
    body: Result<Json<CredentialRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(e) => return rejected(Error::InvalidRequest(e.body_text())),
    };
    let headers = match AuthorizationHeader::try_from(&headers) {
        Ok(headers) => headers,
        Err(e) => return rejected(e),
    };
    let request = Request { body: req, headers };
    credibil_vci_issuer::handle(&state.issuer, request, &state.provider).await.into_http()
}

fn rejected(e: Error) -> axum::response::Response {
    Err::<credibil_vci_issuer::Response<()>, _>(e).into_http()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use test_utils::keys;
    use test_utils::realm::NORMAL_USER;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        router(keys::issuer(keys::ED25519, None, false), Realm::new())
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_credential(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/credential")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {NORMAL_USER}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn issues_credential() {
        let req = post_credential(r#"{"format":"jwt_vc","types":["ProofOfAge"]}"#);
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["format"], "jwt_vc");
        assert!(json["credential"].is_string());
    }

    // A malformed body gets the same error object as any other failure.
    #[tokio::test]
    async fn malformed_body() {
        let resp = app().oneshot(post_credential(r#"{"format":"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

        let json = body_json(resp).await;
        assert_eq!(json["error"], "invalid_credential_request");
        assert!(json["error_description"].is_string());
    }

    #[tokio::test]
    async fn missing_token() {
        let req = Request::builder()
            .method("POST")
            .uri("/credential")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"format":"jwt_vc","types":["ProofOfAge"]}"#))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "invalid_credential_request");
    }
}
