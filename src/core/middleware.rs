use crate::core::error::AppError;
use crate::features::auth::AuthService;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// CORS for the citizen and admin front-ends; "*" allows any origin
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Gate the API docs behind HTTP basic auth
///
/// `credentials` is the expected "username:password" pair.
pub async fn basic_auth_middleware(
    State(credentials): State<Arc<String>>,
    req: Request,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .and_then(|encoded| BASE64_STANDARD.decode(encoded.trim()).ok())
        .is_some_and(|decoded| decoded == credentials.as_bytes());

    if authorized {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Rail Madad API docs\"")],
        "Unauthorized",
    )
        .into_response()
}

/// Resolve `Authorization: Token <key>` (or `Bearer <key>`) into the request principal.
///
/// Requests without such a header continue anonymously; an unknown key is rejected.
pub async fn principal_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(token_from_header)
        .map(str::to_string);

    if let Some(token) = token {
        let user = auth_service
            .resolve_token(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}

/// Extract the key from a "Token <key>" or "Bearer <key>" header value
fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(key.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_header() {
        assert_eq!(token_from_header("Token abc123"), Some("abc123"));
        assert_eq!(token_from_header("Bearer abc123"), Some("abc123"));
        assert_eq!(token_from_header("token  abc123 "), Some("abc123"));
        assert_eq!(token_from_header("Basic dXNlcjpwYXNz"), None);
        assert_eq!(token_from_header("abc123"), None);
    }

    fn docs_router(credentials: &str) -> axum::Router {
        axum::Router::new()
            .route("/docs", axum::routing::get(|| async { "docs" }))
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(credentials.to_string()),
                basic_auth_middleware,
            ))
    }

    #[tokio::test]
    async fn test_basic_auth_gate() {
        let server = axum_test::TestServer::new(docs_router("admin:secret")).unwrap();

        let response = server.get("/docs").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response
            .header(header::WWW_AUTHENTICATE)
            .to_str()
            .unwrap()
            .starts_with("Basic"));

        let wrong = BASE64_STANDARD.encode("admin:guess");
        server
            .get("/docs")
            .add_header(header::AUTHORIZATION, format!("Basic {}", wrong))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let right = BASE64_STANDARD.encode("admin:secret");
        let response = server
            .get("/docs")
            .add_header(header::AUTHORIZATION, format!("Basic {}", right))
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "docs");
    }

    #[tokio::test]
    async fn test_principal_middleware_leaves_other_schemes_anonymous() {
        use crate::features::auth::model::AuthenticatedUser;

        async fn whoami(user: Option<axum::Extension<AuthenticatedUser>>) -> String {
            user.map(|axum::Extension(u)| u.username)
                .unwrap_or_else(|| "anonymous".to_string())
        }

        let auth = Arc::new(AuthService::new(crate::shared::test_helpers::lazy_pool()));
        let router = axum::Router::new()
            .route("/whoami", axum::routing::get(whoami))
            .layer(axum::middleware::from_fn_with_state(auth, principal_middleware));
        let server = axum_test::TestServer::new(router).unwrap();

        assert_eq!(server.get("/whoami").await.text(), "anonymous");
        let response = server
            .get("/whoami")
            .add_header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "anonymous");
    }

    #[test]
    fn test_cors_layer_accepts_wildcard_and_list() {
        let _any = cors_layer(&["*".to_string()]);
        let _list = cors_layer(&["http://localhost:5173".to_string(), "not a url\n".to_string()]);
    }
}
