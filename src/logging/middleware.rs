use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

/// Which part of the API a path belongs to, recorded on every request line.
pub fn surface(path: &str) -> &'static str {
    if path.starts_with("/api/admin") {
        "admin"
    } else if path.starts_with("/api/auth") {
        "auth"
    } else if path.starts_with("/health") {
        "health"
    } else if path.starts_with("/api/") {
        "public"
    } else {
        "other"
    }
}

/// One line per request; 5xx at error, 4xx at warn, the rest at info.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let req_id: String = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;
    let surface = surface(&path);

    match status {
        s if s.is_server_error() => tracing::error!(
            request_id = %req_id,
            method = %method,
            path = %path,
            surface,
            status = s.as_u16(),
            duration_ms,
            "request failed"
        ),
        s if s.is_client_error() && s != StatusCode::NOT_FOUND => tracing::warn!(
            request_id = %req_id,
            method = %method,
            path = %path,
            surface,
            status = s.as_u16(),
            duration_ms,
            "request rejected"
        ),
        s => tracing::info!(
            request_id = %req_id,
            method = %method,
            path = %path,
            surface,
            status = s.as_u16(),
            duration_ms,
            "request completed"
        ),
    }

    response
}

pub fn request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::routes::test_support::{app_with, get};
    use std::sync::Arc;

    #[test]
    fn test_surface_classification() {
        assert_eq!(surface("/api/admin/quotes/1"), "admin");
        assert_eq!(surface("/api/auth/login"), "auth");
        assert_eq!(surface("/health/database"), "health");
        assert_eq!(surface("/api/site-data"), "public");
        assert_eq!(surface("/favicon.ico"), "other");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let (_, headers, _) = get(app_with(Arc::new(MemoryStore::new())), "/health", None).await;
        let id = headers.get("x-request-id").unwrap().to_str().unwrap();
        assert!(!id.is_empty());
    }
}
