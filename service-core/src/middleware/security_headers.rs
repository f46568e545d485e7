use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Paths whose responses are fetched by external tooling (action importers,
/// schema viewers) and therefore must not be framed-blocked or CSP-locked.
const DOCUMENT_PATHS: &[&str] = &["/openapi.json"];

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let is_document_route = DOCUMENT_PATHS.contains(&req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        header::HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    if is_document_route {
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("public, max-age=300"),
        );
    } else {
        // API responses are JSON only.
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
    }

    response
}
