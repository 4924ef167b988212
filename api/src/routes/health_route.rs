use axum::Json;

use crate::core::http::response_envelope::HealthResponse;

/// Handler: GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ai_llm_service::{ProviderResult, TextGenerator};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        core::{api_config::CorsOrigins, app_state::AppState},
        create_router,
    };

    struct Unused;

    #[async_trait]
    impl TextGenerator for Unused {
        async fn generate(&self, _prompt: &str, _request_id: &str) -> ProviderResult {
            Ok("unused".into())
        }
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let router = create_router(AppState::new(Arc::new(Unused)), &CorsOrigins::Any);
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
    }
}
