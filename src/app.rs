// app.rs - Shared request state and the HTTP router

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::authz::AuthorizationFacade;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, NasStore, TenantStore};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, tenant_gate_middleware};
use crate::tenant::TenantLifecycleGate;
use crate::vpn::{ConnectivityProbe, VpnConnectivityMonitor};

#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<AuthorizationFacade>,
    pub monitor: Arc<VpnConnectivityMonitor>,
    pub database: Option<DatabaseManager>,
    pub jwt_secret: Arc<str>,
    pub radius_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        facade: Arc<AuthorizationFacade>,
        monitor: Arc<VpnConnectivityMonitor>,
        jwt_secret: impl Into<Arc<str>>,
        radius_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            facade,
            monitor,
            database: None,
            jwt_secret: jwt_secret.into(),
            radius_secret: radius_secret.into(),
        }
    }

    /// Wire the gate, facade and monitor over the given stores
    pub fn from_parts(
        tenants: Arc<dyn TenantStore>,
        nas: Arc<dyn NasStore>,
        probe: Arc<dyn ConnectivityProbe>,
        config: &AppConfig,
    ) -> Self {
        let facade = Arc::new(AuthorizationFacade::new(TenantLifecycleGate::new(tenants)));
        let monitor = Arc::new(VpnConnectivityMonitor::from_config(probe, nas, &config.monitor));
        Self::new(
            facade,
            monitor,
            config.security.jwt_secret.as_str(),
            config.radius.shared_secret.as_str(),
        )
    }

    pub fn with_database(mut self, database: DatabaseManager) -> Self {
        self.database = Some(database);
        self
    }
}

pub fn router(state: AppState, enable_cors: bool) -> Router {
    let protected = Router::new()
        .route("/api/auth/permissions", get(protected::auth::permissions_get))
        .route("/api/vpn/status", get(protected::vpn::status_get))
        .route("/api/vpn/status/:nas_id", get(protected::vpn::nas_status_get))
        .route("/api/vpn/reconcile", post(protected::vpn::reconcile_post))
        // Outermost layer runs first: JWT, then the tenant gate
        .layer(from_fn_with_state(state.clone(), tenant_gate_middleware))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut app = Router::new()
        .route("/health", get(public::health))
        .route("/radius/authorize", post(public::radius_authorize))
        .merge(protected)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    app.with_state(state)
}
