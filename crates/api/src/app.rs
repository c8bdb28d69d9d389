use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::services::{LifecyclePolicy, MemberMailer};
use persistence::repositories::{
    ConnectionRepository, CourseRepository, ForumRepository, IndustryRepository,
    MemberRepository, NotificationRepository, SettingsRepository,
};
use shared::jwt::{JwtError, SessionTokenConfig};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_session,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    admin, auth, connections, courses, directory, forum, health, industries, members,
    notifications,
};
use crate::services::{
    EmailService, GoogleIdentityProvider, IdentityProvider, ImageStore, LocalImageStore,
    SessionCookie,
};

/// External collaborators, replaceable in tests.
#[derive(Clone)]
pub struct Services {
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn MemberMailer>,
    pub images: Arc<dyn ImageStore>,
}

impl Services {
    /// Production collaborators built from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            identity: Arc::new(GoogleIdentityProvider::new(&config.identity)),
            mailer: Arc::new(EmailService::new(config.email.clone())),
            images: Arc::new(LocalImageStore::new(&config.uploads)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub members: MemberRepository,
    pub courses: CourseRepository,
    pub industries: IndustryRepository,
    pub connections: ConnectionRepository,
    pub forum: ForumRepository,
    pub notifications: NotificationRepository,
    pub settings: SettingsRepository,
    pub sessions: Arc<SessionTokenConfig>,
    pub session_cookie: SessionCookie,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn MemberMailer>,
    pub images: Arc<dyn ImageStore>,
    pub policy: LifecyclePolicy,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, services: Services) -> Result<Self, JwtError> {
        let sessions = SessionTokenConfig::with_leeway(
            &config.session.secret,
            config.session.ttl_secs,
            config.session.leeway_secs,
        )?;

        Ok(Self {
            members: MemberRepository::new(pool.clone()),
            courses: CourseRepository::new(pool.clone()),
            industries: IndustryRepository::new(pool.clone()),
            connections: ConnectionRepository::new(pool.clone()),
            forum: ForumRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool.clone()),
            sessions: Arc::new(sessions),
            session_cookie: SessionCookie::from_config(&config.session),
            identity: services.identity,
            mailer: services.mailer,
            images: services.images,
            policy: LifecyclePolicy::new(config.membership.edit_lock_days),
            rate_limiter: RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new),
            config: Arc::new(config),
            pool,
        })
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let services = Services::from_config(&config);
    create_app_with(config, pool, services)
}

pub fn create_app_with(config: Config, pool: PgPool, services: Services) -> Result<Router, JwtError> {
    let state = AppState::new(config, pool, services)?;
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Credentialed requests need explicit origins, methods and headers.
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
            .allow_credentials(true)
    };

    // Routes for any signed-in member. Session runs first, then rate limiting.
    let member_routes = Router::new()
        .route(
            "/api/v1/members/me",
            get(members::get_me)
                .put(members::update_me)
                .delete(members::delete_me),
        )
        .route("/api/v1/members/me/submit", post(members::submit))
        .route(
            "/api/v1/members/me/avatar",
            put(members::upload_avatar).layer(DefaultBodyLimit::max(config.uploads.max_bytes)),
        )
        .route(
            "/api/v1/members/me/settings",
            get(members::get_settings).put(members::update_settings),
        )
        .route("/api/v1/courses", get(courses::list_courses))
        .route(
            "/api/v1/courses/:code/registration",
            post(courses::register).delete(courses::unregister),
        )
        .route("/api/v1/industries", get(industries::list_industries))
        .route("/api/v1/directory", get(directory::search))
        .route("/api/v1/directory/:member_id", get(directory::get_entry))
        .route(
            "/api/v1/connections",
            get(connections::list_connections).post(connections::send_request),
        )
        .route(
            "/api/v1/connections/status/:member_id",
            get(connections::status_with),
        )
        .route("/api/v1/connections/:id/accept", post(connections::accept))
        .route("/api/v1/connections/:id/reject", post(connections::reject))
        .route("/api/v1/forum/posts", get(forum::list_posts))
        .route("/api/v1/forum/posts/:id", get(forum::get_post))
        .route("/api/v1/forum/posts/:id/comments", post(forum::add_comment))
        .route("/api/v1/forum/comments/:id", delete(forum::delete_comment))
        .route("/api/v1/notifications", get(notifications::list))
        .route(
            "/api/v1/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/api/v1/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/v1/notifications/:id/read", post(notifications::mark_read))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    // Administrator routes: session, then role check, then rate limiting.
    let admin_routes = Router::new()
        .route("/api/v1/admin/members", get(admin::list_members))
        .route("/api/v1/admin/members/pending", get(admin::list_pending))
        .route("/api/v1/admin/members/export.csv", get(admin::export_csv))
        .route("/api/v1/admin/members/bulk-approve", post(admin::bulk_approve))
        .route("/api/v1/admin/members/bulk-reject", post(admin::bulk_reject))
        .route("/api/v1/admin/members/:id", delete(admin::delete_member))
        .route("/api/v1/admin/members/:id/approve", post(admin::approve))
        .route("/api/v1/admin/members/:id/reject", post(admin::reject))
        .route("/api/v1/admin/courses", post(courses::create_course))
        .route("/api/v1/admin/courses/:code", delete(courses::delete_course))
        .route("/api/v1/admin/industries", post(industries::create_industry))
        .route("/api/v1/admin/industries/:id", delete(industries::delete_industry))
        .route("/api/v1/admin/forum/posts", post(forum::create_post))
        .route("/api/v1/admin/forum/posts/:id", delete(forum::delete_post))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/v1/auth/session",
            post(auth::sign_in).delete(auth::sign_out),
        );

    let mut router = Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes);

    // Locally stored uploads are served by the API itself.
    let upload_prefix = config.uploads.public_base_url.trim_end_matches('/');
    if upload_prefix.starts_with('/') && upload_prefix.len() > 1 {
        router = router.nest_service(upload_prefix, ServeDir::new(&config.uploads.dir));
    }

    Ok(router
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
