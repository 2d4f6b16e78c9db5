use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Path prefixes served as JSON APIs. Everything else is treated as a static
/// page and gets a CSP that lets the bundled front-end load its own assets.
const API_PREFIXES: &[&str] = &["/generate-", "/health", "/ready", "/metrics"];

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let path = req.uri().path();
    let is_api_route = API_PREFIXES.iter().any(|prefix| path.starts_with(prefix));

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("no-referrer"),
    );

    if is_api_route {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data: blob:; \
                 media-src 'self' blob:; \
                 connect-src 'self'",
            ),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("SAMEORIGIN"),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http, middleware, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/index.html", get(|| async { "<html></html>" }))
            .layer(middleware::from_fn(security_headers_middleware))
    }

    async fn csp_for(path: &str) -> String {
        let response = app()
            .oneshot(http::Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(header::CONTENT_SECURITY_POLICY)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn api_routes_get_strict_csp() {
        assert_eq!(
            csp_for("/health").await,
            "default-src 'none'; frame-ancestors 'none'"
        );
    }

    #[tokio::test]
    async fn static_pages_may_load_own_assets() {
        assert!(csp_for("/index.html").await.starts_with("default-src 'self'"));
    }
}
