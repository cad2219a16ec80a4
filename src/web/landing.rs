use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::web::{
    AppState,
    admin_utils::compose_flash_message,
    auth::current_session,
    session::{Role, Session},
    templates::render_login_page,
};

/// Top-level view a signed-in user lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Admin,
    Staff,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            View::Admin => "/dashboard",
            View::Staff => "/builder",
        }
    }
}

/// Dispatch on role alone.
pub fn route(session: &Session) -> View {
    match session.role {
        Role::Admin => View::Admin,
        Role::Staff => View::Staff,
    }
}

#[derive(Default, Deserialize)]
pub struct LandingQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

pub async fn landing_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LandingQuery>,
) -> Response {
    match current_session(&state, &jar).await {
        Some((_, session)) if session.password_change_required => {
            Redirect::to("/password").into_response()
        }
        Some((_, session)) => Redirect::to(route(&session).path()).into_response(),
        None => {
            let flash = compose_flash_message(params.status.as_deref(), params.error.as_deref());
            let config = state.config();
            Html(render_login_page(
                &config.company_name,
                config.support_contact.as_deref(),
                &flash,
            ))
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_depends_only_on_role() {
        let mut session = Session {
            authenticated: true,
            current_user: Some("admin01".to_string()),
            role: Role::Admin,
            ..Session::default()
        };
        assert_eq!(route(&session), View::Admin);
        assert_eq!(route(&session).path(), "/dashboard");

        session.role = Role::Staff;
        assert_eq!(route(&session), View::Staff);
        assert_eq!(route(&session).path(), "/builder");
    }
}
