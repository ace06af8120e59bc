mod admin;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod listings;
mod messages;
mod profiles;
mod query;
mod validation;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, RequireRole, TokenService, UserRepository};
use config::AppConfig;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::me,
        admin::handlers::verify_admin,
        admin::handlers::list_applications,
        admin::handlers::approve_application,
        admin::handlers::reject_application,
        profiles::handlers::get_own_profile,
        profiles::handlers::update_own_profile,
        profiles::handlers::apply_as_freelancer,
        profiles::handlers::get_public_profile,
        listings::handlers::list_services,
        listings::handlers::get_service,
        listings::handlers::list_own_services,
        listings::handlers::create_service,
        listings::handlers::update_service,
        listings::handlers::delete_service,
        messages::handlers::send_message,
        messages::handlers::list_conversations,
        messages::handlers::get_thread,
        messages::handlers::mark_thread_read,
        messages::handlers::unread_count,
    ),
    components(
        schemas(
            auth::models::Role,
            auth::models::UserResponse,
            auth::models::RegisterRequest,
            auth::models::LoginRequest,
            auth::models::AuthResponse,
            admin::models::ApplicationStatus,
            admin::models::FreelancerApplication,
            admin::models::AdminVerifyResponse,
            admin::models::AdminVerifyUser,
            profiles::models::OwnProfile,
            profiles::models::PublicProfile,
            profiles::models::UpdateProfileRequest,
            profiles::models::ApplyRequest,
            listings::models::Service,
            listings::models::CreateServiceRequest,
            listings::models::UpdateServiceRequest,
            messages::models::Message,
            messages::models::SendMessageRequest,
            messages::models::ConversationSummary,
            messages::models::UnreadCount,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login, and current-user endpoints"),
        (name = "admin", description = "Admin verification and application moderation"),
        (name = "profiles", description = "Profile management and freelancer applications"),
        (name = "services", description = "Service listing browsing and management"),
        (name = "messages", description = "Direct messaging between users")
    ),
    info(
        title = "Marketplace API",
        version = "1.0.0",
        description = "RESTful API for a freelance services marketplace"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: AuthService,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: PgPool, jwt_secret: &str) -> Self {
        let tokens = TokenService::new(jwt_secret.to_string());
        let auth = AuthService::new(UserRepository::new(db.clone()), tokens.clone());
        Self { db, auth, tokens }
    }
}

/// Lets the authenticated-user extractor pull the token service out of state
impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Applies an access gate to every route in the router
///
/// Authorization happens here, at registration time; handlers behind the
/// gate never re-check the role themselves.
fn guarded(router: Router<AppState>, gate: RequireRole) -> Router<AppState> {
    router.route_layer(middleware::from_fn(
        move |request: axum::extract::Request, next: middleware::Next| {
            let gate = gate.clone();
            async move { gate.handle(request, next).await }
        },
    ))
}

/// Builds the application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_routes = guarded(
        Router::new()
            .route("/verify", get(admin::handlers::verify_admin))
            .route("/applications", get(admin::handlers::list_applications))
            .route(
                "/applications/:id/approve",
                post(admin::handlers::approve_application),
            )
            .route(
                "/applications/:id/reject",
                post(admin::handlers::reject_application),
            ),
        RequireRole::admin(state.tokens.clone()),
    );

    let freelancer_routes = guarded(
        Router::new()
            .route(
                "/services",
                get(listings::handlers::list_own_services)
                    .post(listings::handlers::create_service),
            )
            .route(
                "/services/:id",
                put(listings::handlers::update_service)
                    .delete(listings::handlers::delete_service),
            ),
        RequireRole::freelancer(state.tokens.clone()),
    );

    let profile_routes = guarded(
        Router::new()
            .route(
                "/",
                get(profiles::handlers::get_own_profile)
                    .put(profiles::handlers::update_own_profile),
            )
            .route("/apply", post(profiles::handlers::apply_as_freelancer)),
        RequireRole::authenticated(state.tokens.clone()),
    );

    let message_routes = guarded(
        Router::new()
            .route("/", post(messages::handlers::send_message))
            .route(
                "/conversations",
                get(messages::handlers::list_conversations),
            )
            .route("/with/:user_id", get(messages::handlers::get_thread))
            .route(
                "/with/:user_id/read",
                put(messages::handlers::mark_thread_read),
            )
            .route("/unread", get(messages::handlers::unread_count)),
        RequireRole::authenticated(state.tokens.clone()),
    );

    Router::new()
        // Swagger UI
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        // Public routes
        .route("/api/auth/register", post(auth::handlers::register))
        .route("/api/auth/login", post(auth::handlers::login))
        .route("/api/auth/me", get(auth::handlers::me))
        .route("/api/services", get(listings::handlers::list_services))
        .route("/api/services/:id", get(listings::handlers::get_service))
        .route("/api/users/:id", get(profiles::handlers::get_public_profile))
        // Gated routes
        .nest("/api/admin", admin_routes)
        .nest("/api/my", freelancer_routes)
        .nest("/api/profile", profile_routes)
        .nest("/api/messages", message_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_api=debug".into()),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Marketplace API - Starting...");

    // Startup aborts here when JWT_SECRET or DATABASE_URL is missing
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = AppState::new(db_pool, &config.jwt_secret);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Marketplace API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
