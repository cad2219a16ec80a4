use crate::web::{
    session::Session,
    templates::{NavLink, PageLayout, escape_html, render_page},
};

use super::{
    accumulator::{DayEntry, MAX_ACTIVITIES},
    export::{ExportFormat, detail_line},
};

pub(crate) struct BuilderView<'a> {
    pub company_name: &'a str,
    pub session: &'a Session,
    pub activity_count: usize,
    pub flash_html: String,
}

pub(crate) fn render_builder(view: BuilderView<'_>) -> String {
    let BuilderView {
        company_name,
        session,
        activity_count,
        flash_html,
    } = view;

    let activity_count = activity_count.min(MAX_ACTIVITIES);
    let title = escape_html(&session.title);

    let count_options: String = (0..=MAX_ACTIVITIES)
        .map(|count| {
            let selected = if count == activity_count { " selected" } else { "" };
            format!("<option value=\"{count}\"{selected}>{count}</option>")
        })
        .collect();

    let activity_inputs: String = (1..=activity_count)
        .map(|n| {
            format!(
                r#"<label for="activity-{n}">Activity {n}</label>
                <input id="activity-{n}" name="activity_{n}">
                "#
            )
        })
        .collect();

    let day_cards = render_day_cards(session.itinerary.entries());
    let downloads = if session.itinerary.is_empty() {
        "<p class=\"note\">Add at least one day to enable downloads.</p>".to_string()
    } else {
        let links: String = ExportFormat::ALL
            .iter()
            .map(|format| {
                format!(
                    "<a href=\"/builder/export/{ext}\">Download {label}</a>",
                    ext = format.extension(),
                    label = format.label(),
                )
            })
            .collect();
        format!(
            r#"<div class="downloads">{links}</div>
            <form method="post" action="/builder/clear" onsubmit="return confirm('Clear every day from this itinerary?');">
                <button type="submit" class="danger">Clear All</button>
            </form>"#
        )
    };

    let body_html = format!(
        r#"        <section class="panel">
            <h2>Add a Day</h2>
            <form method="get" action="/builder">
                <label for="activity-count">Number of activities</label>
                <select id="activity-count" name="activities" onchange="this.form.submit()">
                    {count_options}
                </select>
            </form>
            <form method="post" action="/builder/days">
                <label for="tour-title">Tour title</label>
                <input id="tour-title" name="title" value="{title}" placeholder="Sri Lanka Highlights">
                <input type="hidden" name="activity_count" value="{activity_count}">
                <label for="route">Route</label>
                <input id="route" name="route" placeholder="Colombo to Kandy" required>
                <div class="field-row">
                    <div>
                        <label for="distance">Distance</label>
                        <input id="distance" name="distance" placeholder="115 km">
                    </div>
                    <div>
                        <label for="duration">Duration</label>
                        <input id="duration" name="duration" placeholder="3 hours">
                    </div>
                </div>
                {activity_inputs}
                <label for="description">Description</label>
                <textarea id="description" name="description"></textarea>
                <button type="submit">Add Day</button>
                <button type="submit" formaction="/builder/title" formnovalidate>Save Title Only</button>
            </form>
        </section>
        <section class="panel">
            <h2>Itinerary</h2>
            {day_cards}
            {downloads}
        </section>"#
    );

    let nav_link = session.is_admin().then_some(NavLink {
        href: "/dashboard",
        label: "Admin Dashboard",
    });

    render_page(PageLayout {
        meta_title: "Itinerary Builder",
        page_heading: "Itinerary Builder",
        company_name,
        username: session.username(),
        role_label: session.role.label(),
        nav_link,
        flash_html,
        body_html,
    })
}

fn render_day_cards(entries: &[DayEntry]) -> String {
    if entries.is_empty() {
        return "<p class=\"note\">No days added yet.</p>".to_string();
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let details = detail_line(entry)
                .map(|line| format!("<p class=\"details\">{}</p>", escape_html(&line)))
                .unwrap_or_default();
            let description = if entry.description.is_empty() {
                String::new()
            } else {
                format!(
                    "<p class=\"description\">{}</p>",
                    escape_html(&entry.description)
                )
            };
            format!(
                r#"<div class="itinerary-card">
                <h3>Day {day}: {route}</h3>
                {details}
                {description}
                <form method="post" action="/builder/days/remove" class="inline-form">
                    <input type="hidden" name="index" value="{index}">
                    <button type="submit" class="btn-sm danger">Remove Day {day}</button>
                </form>
            </div>"#,
                day = index + 1,
                route = escape_html(&entry.route),
            )
        })
        .collect()
}
