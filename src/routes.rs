use crate::handlers::{self, AppState};
use crate::models::{CreateUserRequest, DeleteUserResponse, UpdateUserRequest, User};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Maximum accepted request body.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Enrichment API",
        description = "Stores users and enriches them with age, gender and nationality."
    ),
    paths(
        handlers::health,
        handlers::create_user,
        handlers::list_users,
        handlers::update_user,
        handlers::delete_user
    ),
    components(schemas(User, CreateUserRequest, UpdateUserRequest, DeleteUserResponse)),
    tags(
        (name = "users", description = "User CRUD with enrichment"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

/// Builds the full application router.
///
/// Each user operation is reachable through its dedicated path and through
/// `/user`; any other method on those paths is answered with 400.
pub fn build_router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route(
            "/createuser",
            post(handlers::create_user).fallback(handlers::invalid_method),
        )
        .route(
            "/updateuser",
            put(handlers::update_user).fallback(handlers::invalid_method),
        )
        .route(
            "/deleteuser",
            delete(handlers::delete_user).fallback(handlers::invalid_method),
        )
        .route(
            "/user",
            get(handlers::list_users)
                .post(handlers::create_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user)
                .fallback(handlers::invalid_method),
        )
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES)));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(user_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
