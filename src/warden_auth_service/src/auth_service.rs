use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header, request},
    middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use warden_application::AuthUseCases;
use warden_axum::{
    routes::{change_password, health, login, logout, oauth_login, refresh, register, validate},
    timeout_error_body,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// Origins allowed to call the service from a browser.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins(Vec<HeaderValue>);

impl AllowedOrigins {
    /// Unparseable entries are skipped with a warning.
    pub fn new<I, T>(origins: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.as_ref().trim()) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = origin.as_ref(), "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        Self(origins)
    }

    pub fn contains(&self, origin: &HeaderValue) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// HTTP surface of the authentication core.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    pub fn new<A: AuthUseCases>(auth: A) -> Self {
        let router = Router::new()
            .route("/register", post(register::<A>))
            .route("/login", post(login::<A>))
            .route("/oauth/login", post(oauth_login::<A>))
            .route("/refresh", post(refresh::<A>))
            .route("/validate", post(validate::<A>))
            .route("/change-password", post(change_password::<A>))
            .route("/logout", post(logout::<A>))
            .route("/health", get(health))
            .with_state(auth);

        Self { router }
    }

    /// Requests running longer than `timeout` are dropped, cancelling every
    /// store and provider call they still have in flight. The client gets a
    /// 408 with code `REQUEST_TIMEOUT`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(timeout))
            .layer(middleware::map_response(timeout_error_body));
        self
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Convert the AuthService into a router that can be mounted on another router
    pub fn as_nested_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins.filter(|origins| !origins.is_empty()) {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains(origin)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run the auth service as a standalone server
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}
