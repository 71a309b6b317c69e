//! JSON body extractor for Axum
//!
//! `JsonBody<T>` works like `axum::Json<T>`, but rejections (bad JSON,
//! wrong content type, type mismatches) come back as a 400 in the
//! service's `{"status": "error", "message": ...}` shape instead of
//! axum's plain-text defaults.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::Json;
use serde::de::DeserializeOwned;

use super::ApiError;

pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                ApiError::bad_request(format!("Invalid JSON body: {}", rejection.body_text()))
            })?;

        Ok(JsonBody(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestBody {
        #[allow(dead_code)]
        name: String,
    }

    async fn handler(JsonBody(_body): JsonBody<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn send(req: Request<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let resp = send(json_request(r#"{"name": "Alice"}"#)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400_json() {
        let resp = send(json_request("not json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn type_mismatch_returns_400() {
        let resp = send(json_request(r#"{"name": 5}"#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_returns_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .body(Body::from(r#"{"name": "Alice"}"#))
            .unwrap();
        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
