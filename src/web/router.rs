use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::{
    modules,
    web::{AppState, admin, auth, landing},
};

const ROBOTS_TXT_BODY: &str = include_str!("../../robots.txt");

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing::landing_page))
        .route("/login", get(auth::login_page).post(auth::process_login))
        .route("/logout", post(auth::logout))
        .route(
            "/password",
            get(auth::password_page).post(auth::process_password_change),
        )
        .route("/healthz", get(healthz))
        .route("/robots.txt", get(robots_txt))
        .route("/dashboard", get(admin::dashboard))
        .route("/dashboard/users", post(admin::create_user))
        .route("/dashboard/users/remove", post(admin::remove_user))
        .route(
            "/dashboard/users/password",
            post(admin::reset_user_password),
        )
        .merge(modules::itinerary::router())
        .with_state(state)
}

async fn robots_txt() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ROBOTS_TXT_BODY,
    )
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
