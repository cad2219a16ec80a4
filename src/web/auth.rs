use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::{AdminNames, AppConfig},
    directory::{self, AccountStatus, CredentialRecord, DirectoryError, UserDirectory},
    web::{
        AppState,
        admin_utils::compose_flash_message,
        landing::route,
        session::{Role, Session},
        templates::{render_login_page, render_password_page},
    },
};

pub const SESSION_COOKIE: &str = "itinerary_session";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user directory is unavailable")]
    StoreUnavailable,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::StoreUnavailable => "store_unavailable",
        }
    }
}

/// Outcome of a successful credential check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    pub role: Role,
    pub display_name: String,
    pub password_change_required: bool,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordChangeForm {
    pub new_password: String,
    pub confirm_password: String,
}

/// Checks a credential pair against the directory rows.
///
/// Passwords are stored and compared as plain strings, case-sensitively.
/// The admin role goes to reserved names only, matched case-insensitively.
pub fn authenticate(
    records: &[CredentialRecord],
    admin_names: &AdminNames,
    require_password_change: bool,
    username: &str,
    password: &str,
) -> Result<Grant, AuthError> {
    let username = username.trim();
    let record = directory::find(records, username).ok_or(AuthError::InvalidCredentials)?;
    if record.password != password {
        return Err(AuthError::InvalidCredentials);
    }

    let role = if admin_names.contains(username) {
        Role::Admin
    } else {
        Role::Staff
    };

    Ok(Grant {
        role,
        display_name: record.username.clone(),
        password_change_required: require_password_change && record.status == AccountStatus::New,
    })
}

/// Runs the login gate and, on success, marks `session` as signed in.
/// A failed attempt leaves `session` untouched.
pub fn sign_in(
    directory: &dyn UserDirectory,
    config: &AppConfig,
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<Grant, AuthError> {
    let records = directory.read().map_err(|err| {
        warn!(%err, "user directory unavailable during login");
        AuthError::StoreUnavailable
    })?;

    let grant = authenticate(
        &records,
        &config.admin_names,
        config.require_password_change,
        username,
        password,
    )?;

    *session = Session {
        authenticated: true,
        role: grant.role,
        current_user: Some(grant.display_name.clone()),
        password_change_required: grant.password_change_required,
        ..Session::default()
    };

    Ok(grant)
}

pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Result<Html<String>, Redirect> {
    if current_session(&state, &jar).await.is_some() {
        return Err(Redirect::to("/"));
    }

    let config = state.config();
    Ok(Html(render_login_page(
        &config.company_name,
        config.support_contact.as_deref(),
        "",
    )))
}

pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let config = state.shared_config();
    let username = form.username.clone();
    let password = form.password.clone();
    let outcome = state
        .blocking_directory(move |directory| {
            let mut session = Session::default();
            Ok(sign_in(directory, &config, &mut session, &username, &password)
                .map(|grant| (grant, session)))
        })
        .await
        .unwrap_or(Err(AuthError::StoreUnavailable));

    let (grant, session) = match outcome {
        Ok(signed_in) => signed_in,
        Err(err) => {
            let status = match err {
                AuthError::InvalidCredentials => {
                    warn!(username = %form.username.trim(), "rejected login");
                    StatusCode::UNAUTHORIZED
                }
                AuthError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            };
            let message = compose_flash_message(None, Some(err.code()));
            let config = state.config();
            return Err((
                status,
                Html(render_login_page(
                    &config.company_name,
                    config.support_contact.as_deref(),
                    &message,
                )),
            ));
        }
    };

    if let Some(previous) = session_token(&jar) {
        state.sessions().remove(previous).await;
    }

    info!(username = %grant.display_name, role = grant.role.label(), "user signed in");
    let token = state.sessions().create(session).await;
    let jar = jar.add(session_cookie(token, state.config().session_ttl_hours));

    Ok((jar, Redirect::to("/")))
}

/// Always succeeds: the whole session, itinerary included, is discarded.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(token) = session_token(&jar) {
        state.sessions().remove(token).await;
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (jar.remove(removal), Redirect::to("/?status=logged_out"))
}

pub async fn password_page(State(state): State<AppState>, jar: CookieJar) -> Result<Html<String>, Redirect> {
    let (_, session) = current_session(&state, &jar)
        .await
        .ok_or_else(|| Redirect::to("/login"))?;
    if !session.password_change_required {
        return Err(Redirect::to("/"));
    }

    Ok(Html(render_password_page(
        &state.config().company_name,
        session.username(),
        "",
    )))
}

pub async fn process_password_change(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<PasswordChangeForm>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let Some((token, session)) = current_session(&state, &jar).await else {
        return Ok(Redirect::to("/login"));
    };
    if !session.password_change_required {
        return Ok(Redirect::to("/"));
    }

    let username = session.username().to_string();
    let changed = state
        .blocking_directory(move |directory| {
            directory::change_password(
                directory,
                &username,
                &form.new_password,
                &form.confirm_password,
            )
        })
        .await;
    if let Err(err) = changed {
        let status = match err {
            DirectoryError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        };
        let message = compose_flash_message(None, Some(err.code()));
        return Err((
            status,
            Html(render_password_page(
                &state.config().company_name,
                session.username(),
                &message,
            )),
        ));
    }

    let updated = state
        .sessions()
        .update(token, |session| {
            session.password_change_required = false;
            route(session).path()
        })
        .await;

    Ok(match updated {
        Some(path) => Redirect::to(&format!("{path}?status=password_changed")),
        None => Redirect::to("/login"),
    })
}

pub fn session_token(jar: &CookieJar) -> Option<Uuid> {
    let cookie = jar.get(SESSION_COOKIE)?;
    Uuid::parse_str(cookie.value()).ok()
}

/// Looks up the caller's session, whatever its stage.
pub async fn current_session(state: &AppState, jar: &CookieJar) -> Option<(Uuid, Session)> {
    let token = session_token(jar)?;
    let session = state.sessions().get(token).await?;
    Some((token, session))
}

/// Gate for every signed-in page. Sends pending password changes to `/password`.
pub async fn require_session(state: &AppState, jar: &CookieJar) -> Result<(Uuid, Session), Redirect> {
    let (token, session) = current_session(state, jar)
        .await
        .ok_or_else(|| Redirect::to("/login"))?;

    if !session.authenticated {
        return Err(Redirect::to("/login"));
    }
    if session.password_change_required {
        return Err(Redirect::to("/password"));
    }

    Ok((token, session))
}

fn session_cookie(token: Uuid, ttl_hours: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(CookieDuration::hours(ttl_hours));
    cookie
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{http::header, response::IntoResponse};

    use super::*;
    use crate::directory::MemoryDirectory;

    fn records() -> Vec<CredentialRecord> {
        vec![
            CredentialRecord::active("admin01", "s3cret"),
            CredentialRecord::active("staff_amal", "1234"),
            CredentialRecord::new("staff_nimal", "temp"),
        ]
    }

    fn test_state(records: Vec<CredentialRecord>) -> AppState {
        AppState::with_directory(
            AppConfig::default(),
            Arc::new(MemoryDirectory::with_records(records)),
        )
    }

    fn location(redirect: Redirect) -> String {
        redirect.into_response().headers()[header::LOCATION]
            .to_str()
            .unwrap()
            .to_string()
    }

    fn login_form(username: &str, password: &str) -> Form<LoginForm> {
        Form(LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    #[test]
    fn wrong_password_is_rejected_and_session_stays_signed_out() {
        let directory = MemoryDirectory::with_records(records());
        let mut session = Session::default();
        let err = sign_in(&directory, &AppConfig::default(), &mut session, "admin01", "wrongpass")
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert!(!session.authenticated);
        assert!(session.current_user.is_none());
    }

    #[test]
    fn roles_follow_reserved_admin_names() {
        let admins = AdminNames::default();
        let grant = authenticate(&records(), &admins, true, "admin01", "s3cret").unwrap();
        assert_eq!(grant.role, Role::Admin);

        let grant = authenticate(&records(), &admins, true, "staff_amal", "1234").unwrap();
        assert_eq!(grant.role, Role::Staff);
        assert!(!grant.password_change_required);
    }

    #[test]
    fn admin_name_match_ignores_case() {
        let rows = vec![CredentialRecord::active("Admin", "pw")];
        let grant = authenticate(&rows, &AdminNames::default(), true, "Admin", "pw").unwrap();
        assert_eq!(grant.role, Role::Admin);
    }

    #[test]
    fn password_comparison_is_exact() {
        let admins = AdminNames::default();
        assert!(authenticate(&records(), &admins, true, "admin01", "S3CRET").is_err());
        assert!(authenticate(&records(), &admins, true, "admin01", "s3cret ").is_err());
        assert!(authenticate(&records(), &admins, true, "ghost", "").is_err());
    }

    #[test]
    fn new_accounts_need_a_password_change_when_enabled() {
        let admins = AdminNames::default();
        let grant = authenticate(&records(), &admins, true, "staff_nimal", "temp").unwrap();
        assert!(grant.password_change_required);
        let grant = authenticate(&records(), &admins, false, "staff_nimal", "temp").unwrap();
        assert!(!grant.password_change_required);
    }

    #[test]
    fn unreachable_store_is_reported_separately() {
        struct Offline;
        impl UserDirectory for Offline {
            fn read(&self) -> Result<Vec<CredentialRecord>, DirectoryError> {
                Err(DirectoryError::Unavailable("timeout".to_string()))
            }
            fn write(&self, _: &[CredentialRecord]) -> Result<(), DirectoryError> {
                Ok(())
            }
        }

        let mut session = Session::default();
        let err = sign_in(&Offline, &AppConfig::default(), &mut session, "admin01", "s3cret")
            .unwrap_err();
        assert_eq!(err, AuthError::StoreUnavailable);
        assert!(!session.authenticated);
    }

    #[tokio::test]
    async fn added_password_authenticates_exactly_as_typed() {
        let state = test_state(records());
        directory::add_user(state.directory(), "staff_ruwan", " pw12 ").unwrap();

        let trimmed = process_login(
            State(state.clone()),
            CookieJar::new(),
            login_form("staff_ruwan", "pw12"),
        )
        .await;
        assert_eq!(trimmed.err().unwrap().0, StatusCode::UNAUTHORIZED);

        let (jar, _) = process_login(
            State(state.clone()),
            CookieJar::new(),
            login_form("staff_ruwan", " pw12 "),
        )
        .await
        .unwrap_or_else(|_| panic!("login with the typed password should succeed"));
        let (_, session) = current_session(&state, &jar).await.unwrap();
        assert_eq!(session.username(), "staff_ruwan");
        assert!(session.password_change_required);
    }

    #[tokio::test]
    async fn login_sets_cookie_and_logout_discards_session() {
        let state = test_state(records());
        let (jar, redirect) = process_login(
            State(state.clone()),
            CookieJar::new(),
            login_form("staff_amal", "1234"),
        )
        .await
        .unwrap_or_else(|_| panic!("login should succeed"));
        assert_eq!(location(redirect), "/");

        let token = session_token(&jar).unwrap();
        let session = state.sessions().get(token).await.unwrap();
        assert!(session.authenticated);
        assert_eq!(session.role, Role::Staff);
        assert_eq!(session.username(), "staff_amal");

        let (_, redirect) = logout(State(state.clone()), jar).await;
        assert_eq!(location(redirect), "/?status=logged_out");
        assert!(state.sessions().get(token).await.is_none());
    }

    #[tokio::test]
    async fn failed_login_creates_no_session() {
        let state = test_state(records());
        let result = process_login(
            State(state.clone()),
            CookieJar::new(),
            login_form("admin01", "wrongpass"),
        )
        .await;

        let (status, Html(body)) = result.err().unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid username or password."));
        assert_eq!(state.sessions().len().await, 0);
    }

    #[tokio::test]
    async fn forced_change_gates_access_until_completed() {
        let state = test_state(records());
        let (jar, _) = process_login(
            State(state.clone()),
            CookieJar::new(),
            login_form("staff_nimal", "temp"),
        )
        .await
        .unwrap_or_else(|_| panic!("login should succeed"));

        let redirect = require_session(&state, &jar).await.unwrap_err();
        assert_eq!(location(redirect), "/password");

        let rejected = process_password_change(
            State(state.clone()),
            jar.clone(),
            Form(PasswordChangeForm {
                new_password: "abc".to_string(),
                confirm_password: "abc".to_string(),
            }),
        )
        .await;
        let (status, _) = rejected.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let redirect = process_password_change(
            State(state.clone()),
            jar.clone(),
            Form(PasswordChangeForm {
                new_password: "n3wpass".to_string(),
                confirm_password: "n3wpass".to_string(),
            }),
        )
        .await
        .unwrap_or_else(|_| panic!("password change should succeed"));
        assert_eq!(location(redirect), "/builder?status=password_changed");

        let (_, session) = require_session(&state, &jar).await.ok().unwrap();
        assert!(!session.password_change_required);

        let stored = state.directory().read().unwrap();
        let record = directory::find(&stored, "staff_nimal").unwrap();
        assert_eq!(record.password, "n3wpass");
        assert_eq!(record.status, AccountStatus::Active);
    }
}
