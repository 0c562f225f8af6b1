//! API routes

mod health;
mod refresh;
mod translate;

use axum::Router;

use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(translate::routes())
        .merge(refresh::routes())
        .merge(health::routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use relay_client::{ClientError, Translation};
    use relay_core::{
        Adapter, DispatchEngine, Family, PoolRefresher, TranslateRequest, UpstreamPool,
    };
    use std::io::Write;
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Succeeds with fixed text, or fails every call when `data` is None.
    struct StaticAdapter {
        data: Option<String>,
    }

    #[async_trait]
    impl Adapter for StaticAdapter {
        async fn translate(
            &self,
            _family: Family,
            _upstream: &str,
            _request: &TranslateRequest,
        ) -> Result<Translation, ClientError> {
            match &self.data {
                Some(text) => Ok(Translation {
                    data: text.clone(),
                    alternatives: vec![text.clone()],
                }),
                None => Err(ClientError::Status(502)),
            }
        }

        async fn fallback(&self, _request: &TranslateRequest) -> Result<String, ClientError> {
            Err(ClientError::Status(400))
        }
    }

    /// Fails the test if any upstream call is made.
    struct UnreachableAdapter;

    #[async_trait]
    impl Adapter for UnreachableAdapter {
        async fn translate(
            &self,
            _family: Family,
            _upstream: &str,
            _request: &TranslateRequest,
        ) -> Result<Translation, ClientError> {
            panic!("no upstream call expected");
        }

        async fn fallback(&self, _request: &TranslateRequest) -> Result<String, ClientError> {
            panic!("no fallback call expected");
        }
    }

    fn app(keys: &[&str], adapter: Arc<dyn Adapter>) -> (Router, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "roster-key").unwrap();

        let pool = Arc::new(UpstreamPool::new());
        pool.replace(keys.iter().map(|k| k.to_string()).collect(), vec![]);

        let refresher = Arc::new(PoolRefresher::new(
            pool.clone(),
            adapter.clone(),
            file.path().to_path_buf(),
        ));
        let engine = Arc::new(DispatchEngine::new(pool, refresher.clone(), adapter, false));

        (create_router(AppState::new(engine, refresher)), file)
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn translate_returns_deeplx_shape() {
        let (app, _file) = app(
            &["key-a"],
            Arc::new(StaticAdapter {
                data: Some("你好".to_string()),
            }),
        );

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text":"hello","target_lang":"zh"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["code"], 200);
        assert_eq!(parsed["id"], 0);
        assert_eq!(parsed["data"], "你好");
        assert_eq!(parsed["alternatives"][0], "你好");
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_any_upstream_call() {
        let (app, _file) = app(&["key-a"], Arc::new(UnreachableAdapter));

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text": 42}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "invalid request body");
    }

    #[tokio::test]
    async fn exhausted_pool_reports_no_upstreams() {
        let (app, _file) = app(&[], Arc::new(StaticAdapter { data: None }));

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"text":"hello","target_lang":"zh"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "no available keys and urls");
    }

    #[tokio::test]
    async fn check_alive_reports_counts() {
        let (app, _file) = app(
            &[],
            Arc::new(StaticAdapter {
                data: Some("测试".to_string()),
            }),
        );

        let response = app
            .oneshot(Request::get("/check-alive").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_string(response).await,
            "all keys count:1, available keys count:1, all urls count:0, available urls count:0\n"
        );
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _file) = app(&["key-a"], Arc::new(UnreachableAdapter));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
