//! HTTP server — axum router over TCP.
//!
//! Binds a TCP listener and exposes the JSON API: query resolution on
//! `/execute`, catalog introspection on `/functions` and `/rules`, and
//! lifecycle routes (`/health`, `/status`, `/config`, `/stop`). Every
//! response carries the configured cross-origin headers so browser
//! clients can call the API directly.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use parlance_config::AppConfig;

use super::types::*;
use crate::resolver::Resolver;

/// Shutdown signal sent via broadcast channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal;

/// Shared state accessible to all route handlers.
pub struct AppState {
    pub config: AppConfig,
    pub resolver: Resolver,
    pub shutdown_tx: broadcast::Sender<ShutdownSignal>,
    pub started_at: Instant,
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/execute", get(handle_execute))
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/functions", get(handle_functions))
        .route("/rules", get(handle_rules))
        .route("/config", get(handle_config))
        .route("/stop", post(handle_stop))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .with_state(state)
}

/// Start the server on the given address.
///
/// Runs until the shutdown signal is received.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "parlance server listening");

    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("server shutting down");
        })
        .await?;

    Ok(())
}

/// Resolve the listen address from config.
pub fn listen_addr(config: &AppConfig) -> Result<SocketAddr, std::net::AddrParseError> {
    format!(
        "{}:{}",
        config.server.listen_addr, config.server.listen_port
    )
    .parse()
}

// ── CORS ────────────────────────────────────────────────────────────────

/// Attach cross-origin headers to every response and answer `OPTIONS`
/// preflight requests directly.
async fn cors(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let origin = state.config.server.cors_allow_origin.clone();

    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut(), &origin);
        return response;
    }

    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut(), &origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}

// ── Route handlers ──────────────────────────────────────────────────────

async fn handle_execute(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExecuteParams>,
) -> Result<Json<ExecuteResponse>, (StatusCode, Json<ErrorResponse>)> {
    let descriptor = state.resolver.resolve(&params.q).map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
                kind: err.kind().to_string(),
            }),
        )
    })?;

    let arguments = descriptor.arguments.to_json().map_err(|err| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to serialize arguments: {err}"),
                kind: "configuration_error".to_string(),
            }),
        )
    })?;

    Ok(Json(ExecuteResponse {
        name: descriptor.name,
        arguments,
    }))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let _ = state; // health doesn't need state
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::build_info::VERSION.to_string(),
        git_hash: crate::build_info::GIT_HASH.to_string(),
        build_profile: crate::build_info::BUILD_PROFILE.to_string(),
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let uptime = state.started_at.elapsed().as_secs();
    let catalog = state.resolver.catalog();

    Json(StatusResponse {
        running: true,
        version: crate::build_info::VERSION.to_string(),
        uptime_secs: uptime,
        listen_addr: state.config.server.listen_addr.clone(),
        listen_port: state.config.server.listen_port,
        log_level: state.config.logging.level.clone(),
        functions_count: catalog.registry().len(),
        rules_count: catalog.rules().len(),
        pid: std::process::id(),
    })
}

async fn handle_functions(State(state): State<Arc<AppState>>) -> Json<FunctionsResponse> {
    let functions = state
        .resolver
        .catalog()
        .registry()
        .functions()
        .iter()
        .map(|signature| FunctionInfo {
            name: signature.name().to_string(),
            params: signature
                .params()
                .iter()
                .map(|param| ParamInfo {
                    name: param.name.clone(),
                    ty: param.ty.as_str().to_string(),
                })
                .collect(),
        })
        .collect();
    Json(FunctionsResponse { functions })
}

async fn handle_rules(State(state): State<Arc<AppState>>) -> Json<RulesResponse> {
    let rules = state
        .resolver
        .catalog()
        .rule_summaries()
        .into_iter()
        .map(|(pattern, function)| RuleInfo {
            pattern: pattern.to_string(),
            function: function.to_string(),
        })
        .collect();
    Json(RulesResponse { rules })
}

async fn handle_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConfigResponse>, (StatusCode, Json<ErrorResponse>)> {
    match toml::to_string_pretty(&state.config) {
        Ok(toml_str) => Ok(Json(ConfigResponse { toml: toml_str })),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to serialize config: {e}"),
                kind: "configuration_error".to_string(),
            }),
        )),
    }
}

async fn handle_stop(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StopResponse>) {
    info!("stop requested via HTTP");
    let _ = state.shutdown_tx.send(ShutdownSignal);
    (
        StatusCode::OK,
        Json(StopResponse {
            acknowledged: true,
            message: "Shutdown initiated".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use axum::body::Body;
    use axum::http::Request;
    use parlance_test_utils::config::TestConfigBuilder;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let config = TestConfigBuilder::new().build();
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Arc::new(AppState {
            config,
            resolver: Resolver::new(Catalog::builtin().unwrap()),
            shutdown_tx,
            started_at: Instant::now(),
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = router(test_state());
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_execute_success() {
        let app = router(test_state());
        let req = Request::get("/execute?q=What%20is%20the%20status%20of%20ticket%2083742%3F")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let execute: ExecuteResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(execute.name, "get_ticket_status");
        assert_eq!(execute.arguments, r#"{"ticket_id":83742}"#);
    }

    #[tokio::test]
    async fn test_execute_preserves_argument_order() {
        let app = router(test_state());
        let req = Request::get("/execute?q=what%20bonus%20for%20emp%2027756%20in%202025%3F")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let execute: ExecuteResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(execute.name, "get_employee_bonus");
        assert_eq!(execute.arguments, r#"{"emp_id":27756,"year":2025}"#);
    }

    #[tokio::test]
    async fn test_execute_unrecognized_input() {
        let app = router(test_state());
        let req = Request::get("/execute?q=banana")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.kind, "unrecognized_input");
    }

    #[tokio::test]
    async fn test_execute_sets_cors_headers() {
        let app = router(test_state());
        let req = Request::get("/execute?q=banana")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let app = router(test_state());
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/execute")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            "GET, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_functions_endpoint() {
        let app = router(test_state());
        let req = Request::get("/functions").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let functions: FunctionsResponse = serde_json::from_slice(&body).unwrap();
        let bonus = functions
            .functions
            .iter()
            .find(|f| f.name == "get_employee_bonus")
            .unwrap();
        assert_eq!(bonus.params[0].name, "emp_id");
        assert_eq!(bonus.params[0].ty, "int");
        assert_eq!(bonus.params[1].name, "year");
    }

    #[tokio::test]
    async fn test_rules_endpoint_in_order() {
        let app = router(test_state());
        let req = Request::get("/rules").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let rules: RulesResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(rules.rules[0].function, "get_ticket_status");
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = router(test_state());
        let req = Request::get("/status").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();
        assert!(status.running);
        assert_eq!(status.functions_count, 9);
        assert_eq!(status.rules_count, 9);
    }

    #[tokio::test]
    async fn test_config_endpoint() {
        let app = router(test_state());
        let req = Request::get("/config").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let config_resp: ConfigResponse = serde_json::from_slice(&body).unwrap();
        assert!(config_resp.toml.contains("listen_port"));
    }

    #[tokio::test]
    async fn test_stop_endpoint() {
        let state = test_state();
        let mut rx = state.shutdown_tx.subscribe();
        let app = router(state);

        let req = Request::post("/stop").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let stop: StopResponse = serde_json::from_slice(&body).unwrap();
        assert!(stop.acknowledged);

        // Verify shutdown signal was sent
        let signal = rx.try_recv();
        assert!(signal.is_ok());
    }
}
