//! Itinerary builder: the per-session day list, its page, and the document
//! downloads.

pub mod accumulator;
pub mod export;
mod page;

use axum::{
    Json, Router,
    extract::{Form, Path as AxumPath, Query, State},
    http::StatusCode,
    response::{Html, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::web::{
    AppState,
    admin_utils::compose_flash_message,
    auth::require_session,
    responses::{ApiMessage, attachment, json_error},
};

pub use accumulator::{DayEntry, DayInput, Itinerary, MAX_ACTIVITIES};

use export::ExportFormat;
use page::{BuilderView, render_builder};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/builder", get(builder_page))
        .route("/builder/days", post(add_day))
        .route("/builder/days/remove", post(remove_day))
        .route("/builder/clear", post(clear_itinerary))
        .route("/builder/title", post(save_title))
        .route("/builder/export/:format", get(download_export))
        .route("/api/itinerary", get(itinerary_json))
}

#[derive(Default, Deserialize)]
pub struct BuilderQuery {
    pub status: Option<String>,
    pub error: Option<String>,
    pub activities: Option<String>,
}

/// Entry form fields. Activity inputs arrive as `activity_1..activity_N`, so
/// the form is read as raw pairs.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddDayForm {
    pub title: Option<String>,
    pub route: String,
    pub distance: String,
    pub duration: String,
    pub description: String,
    pub activity_count: usize,
    pub activities: Vec<String>,
}

impl AddDayForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = AddDayForm::default();
        let mut activities: Vec<(usize, String)> = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "title" => form.title = Some(value),
                "route" => form.route = value,
                "distance" => form.distance = value,
                "duration" => form.duration = value,
                "description" => form.description = value,
                "activity_count" => form.activity_count = parse_activity_count(Some(&value)),
                other => {
                    let slot = other
                        .strip_prefix("activity_")
                        .and_then(|n| n.parse::<usize>().ok())
                        .filter(|n| (1..=MAX_ACTIVITIES).contains(n));
                    if let Some(slot) = slot {
                        activities.push((slot, value));
                    }
                }
            }
        }

        activities.sort_by_key(|(slot, _)| *slot);
        form.activities = activities.into_iter().map(|(_, value)| value).collect();
        form
    }

    fn into_input(self) -> DayInput {
        DayInput::new(self.route, self.distance, self.duration, self.description)
            .with_activities(self.activities)
    }
}

#[derive(Deserialize)]
pub struct RemoveDayForm {
    #[serde(default)]
    pub index: Option<String>,
}

#[derive(Deserialize)]
pub struct TitleForm {
    #[serde(default)]
    pub title: String,
}

#[derive(Serialize)]
pub struct ItineraryPayload {
    pub title: String,
    pub days: Vec<DayEntry>,
}

/// Accepts 0 through `MAX_ACTIVITIES`; anything else falls back to 0.
fn parse_activity_count(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .map(|count| count.min(MAX_ACTIVITIES))
        .unwrap_or(0)
}

fn builder_redirect(query: &str, activity_count: usize) -> Redirect {
    if activity_count == 0 {
        Redirect::to(&format!("/builder?{query}"))
    } else {
        Redirect::to(&format!("/builder?{query}&activities={activity_count}"))
    }
}

pub async fn builder_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<BuilderQuery>,
) -> Result<Html<String>, Redirect> {
    let (_, session) = require_session(&state, &jar).await?;

    let flash_html = compose_flash_message(params.status.as_deref(), params.error.as_deref());
    let activity_count = parse_activity_count(params.activities.as_deref());

    Ok(Html(render_builder(BuilderView {
        company_name: &state.config().company_name,
        session: &session,
        activity_count,
        flash_html,
    })))
}

pub async fn add_day(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Redirect, Redirect> {
    let (token, _) = require_session(&state, &jar).await?;
    let form = AddDayForm::from_pairs(pairs);
    let activity_count = form.activity_count;

    let added = state
        .sessions()
        .update(token, move |session| {
            if let Some(title) = form.title.as_deref() {
                session.title = title.trim().to_string();
            }
            session.itinerary.add_day(form.into_input())
        })
        .await
        .ok_or_else(|| Redirect::to("/login"))?;

    if added {
        Ok(builder_redirect("status=day_added", activity_count))
    } else {
        Ok(builder_redirect("error=missing_route", activity_count))
    }
}

pub async fn remove_day(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RemoveDayForm>,
) -> Result<Redirect, Redirect> {
    let (token, _) = require_session(&state, &jar).await?;
    let index = form
        .index
        .as_deref()
        .and_then(|raw| raw.trim().parse::<usize>().ok());

    let removed = state
        .sessions()
        .update(token, |session| {
            index.and_then(|index| session.itinerary.remove_day(index))
        })
        .await
        .ok_or_else(|| Redirect::to("/login"))?;

    Ok(match removed {
        Some(_) => Redirect::to("/builder?status=day_removed"),
        None => Redirect::to("/builder"),
    })
}

pub async fn clear_itinerary(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Redirect, Redirect> {
    let (token, _) = require_session(&state, &jar).await?;

    state
        .sessions()
        .update(token, |session| session.itinerary.clear_all())
        .await
        .ok_or_else(|| Redirect::to("/login"))?;

    Ok(Redirect::to("/builder?status=cleared"))
}

pub async fn save_title(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<TitleForm>,
) -> Result<Redirect, Redirect> {
    let (token, _) = require_session(&state, &jar).await?;
    let title = form.title.trim().to_string();

    state
        .sessions()
        .update(token, move |session| session.title = title)
        .await
        .ok_or_else(|| Redirect::to("/login"))?;

    Ok(Redirect::to("/builder?status=title_saved"))
}

pub async fn download_export(
    State(state): State<AppState>,
    jar: CookieJar,
    AxumPath(format): AxumPath<String>,
) -> Result<Response, Redirect> {
    let (_, session) = require_session(&state, &jar).await?;

    let format: ExportFormat = format
        .parse()
        .map_err(|_| Redirect::to("/builder?error=unknown_format"))?;
    if session.itinerary.is_empty() {
        return Err(Redirect::to("/builder?error=empty_itinerary"));
    }

    let entries = session.itinerary.snapshot();
    let title = session.title.clone();
    let company_name = state.config().company_name.clone();

    let file = tokio::task::spawn_blocking(move || {
        export::export(format, &title, &entries, &company_name)
    })
    .await
    .map_err(|err| {
        error!(?err, "export task panicked");
        Redirect::to("/builder?error=export_failed")
    })?
    .map_err(|err| {
        error!(?err, format = format.extension(), "failed to render export");
        Redirect::to("/builder?error=export_failed")
    })?;

    info!(
        username = %session.username(),
        format = format.extension(),
        days = session.itinerary.len(),
        "served itinerary export"
    );

    attachment(file).map_err(|_| Redirect::to("/builder?error=export_failed"))
}

pub async fn itinerary_json(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<ItineraryPayload>, (StatusCode, Json<ApiMessage>)> {
    let (_, session) = require_session(&state, &jar)
        .await
        .map_err(|_| json_error(StatusCode::UNAUTHORIZED, "Sign in to view the itinerary."))?;

    Ok(Json(ItineraryPayload {
        title: session.title.clone(),
        days: session.itinerary.snapshot(),
    }))
}
