use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    BoxError, Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    constants::*, handlers::*, models::ErrorResponse, state::AppState, swagger::ApiDoc,
};

/// Build the application router with every route, the middlewares and the 404 fallback
pub fn build_app(state: AppState) -> Router {
    tracing::debug!("Initializing the app");
    let otp_routes = Router::new()
        .route("/send", post(send_otp_handler))
        .route("/resend", post(resend_otp_handler))
        .route("/verify", post(verify_otp_handler))
        .route("/check", post(check_otp_handler));

    let user_routes = Router::new()
        .route(
            "/:id/available-punishments",
            get(available_punishments_handler),
        )
        .route("/:id/suspend", post(suspend_user_handler))
        .route("/:id/suspensions", get(punishment_history_handler))
        .route("/:id/revoke-suspension", post(revoke_suspension_handler));

    let middlewares = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(HandleErrorLayer::new(handle_timeout_error))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(default_route_handler))
        .route("/ping", get(ping_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/login/purok-leader", post(purok_leader_login_handler))
        .route("/token/refresh", post(refresh_token_handler))
        .route("/password/reset", post(reset_password_handler))
        .nest("/otp", otp_routes)
        .nest("/user", user_routes)
        .fallback(global_404_handler)
        .layer(middlewares)
        .with_state(state)
}

async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request took too long".to_owned())
    } else {
        tracing::error!("Unhandled middleware error: {err}");
        let msg = "Something went wrong. Please try again later.".to_owned();
        (StatusCode::INTERNAL_SERVER_ERROR, msg)
    };
    let res = ErrorResponse {
        success: false,
        message,
        errors: None,
    };
    (status, Json(res))
}
