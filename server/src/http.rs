use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use platform_api::ApiError;
use platform_directory::EmployeeSource;
use products_roster::{
    Designation, EmployeeRecord, HierarchyEntry, Role, RoleDirectory, RosterEntry, RosterQuery,
    Visibility,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, instrument};

use crate::{config::AppConfig, graphql::SchemaType};

#[derive(Clone)]
pub struct AppState {
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
    pub directory: Arc<RoleDirectory>,
    pub source: Arc<dyn EmployeeSource>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "roster service listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/roles", get(roles_handler))
        .route("/api/roster", get(directory_roster_handler).post(supplied_roster_handler))
        .route("/graphql", post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
struct RoleView<'a> {
    name: &'static str,
    #[serde(flatten)]
    hierarchy: &'a HierarchyEntry,
    visibility: &'a Visibility,
}

async fn roles_handler(State(state): State<AppState>) -> Response {
    let roles = Role::ALL
        .into_iter()
        .map(|role| RoleView {
            name: role.as_str(),
            hierarchy: state.directory.hierarchy.lookup(role),
            visibility: state.directory.visibility.lookup(role),
        })
        .collect::<Vec<_>>();
    Json(roles).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterParams {
    viewer: String,
    q: Option<String>,
    #[serde(default)]
    approved_only: bool,
}

impl RosterParams {
    fn split(self) -> (Designation, RosterQuery) {
        (
            Designation::parse(&self.viewer),
            RosterQuery {
                search: self.q,
                approved_only: self.approved_only,
            },
        )
    }
}

#[derive(Debug, Deserialize)]
struct SuppliedRoster {
    #[serde(flatten)]
    params: RosterParams,
    employees: Vec<EmployeeRecord>,
}

#[instrument(name = "http.roster.directory", skip_all)]
async fn directory_roster_handler(
    State(state): State<AppState>,
    params: Result<Query<RosterParams>, QueryRejection>,
) -> HttpResult<Json<Vec<RosterEntry>>> {
    let Query(params) = params.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;
    debug!(viewer = %params.viewer, "roster requested");
    let employees = state
        .source
        .list_employees()
        .await
        .map_err(ApiError::from)?;
    let (viewer, query) = params.split();
    Ok(Json(state.directory.roster(&viewer, &employees, &query)))
}

#[instrument(name = "http.roster.supplied", skip_all)]
async fn supplied_roster_handler(
    State(state): State<AppState>,
    body: Result<Json<SuppliedRoster>, JsonRejection>,
) -> HttpResult<Json<Vec<RosterEntry>>> {
    let Json(SuppliedRoster { params, employees }) =
        body.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;
    debug!(viewer = %params.viewer, listed = employees.len(), "supplied roster");
    let (viewer, query) = params.split();
    Ok(Json(state.directory.roster(&viewer, &employees, &query)))
}

async fn graphql_handler(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match err {
            ApiError::UnknownRole(_) | ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::DirectoryUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "code": self.code, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
    info!("shutdown signal received");
}
