use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{
    config::AdminNames,
    directory::CredentialRecord,
    web::{
        AppState,
        admin_utils::compose_flash_message,
        templates::{NavLink, PageLayout, escape_html, render_page},
    },
};

use super::{auth::require_admin_user, types::DashboardQuery};

pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<DashboardQuery>,
) -> Result<Html<String>, Redirect> {
    let (_, admin) = require_admin_user(&state, &jar).await?;

    let (users, store_error) = match state.blocking_directory(|directory| directory.read()).await {
        Ok(users) => (users, None),
        Err(err) => {
            warn!(%err, "failed to load dashboard users");
            (Vec::new(), Some("store_unavailable"))
        }
    };

    let mut message_block =
        compose_flash_message(params.status.as_deref(), params.error.as_deref());
    if message_block.is_empty() {
        message_block = compose_flash_message(None, store_error);
    }

    let admin_names = &state.config().admin_names;
    let body_html = render_dashboard_body(&users, admin_names, admin.username());

    Ok(Html(render_page(PageLayout {
        meta_title: "Admin Dashboard",
        page_heading: "User Management",
        company_name: &state.config().company_name,
        username: admin.username(),
        role_label: admin.role.label(),
        nav_link: Some(NavLink {
            href: "/builder",
            label: "Itinerary Builder",
        }),
        flash_html: message_block,
        body_html,
    })))
}

fn render_dashboard_body(
    users: &[CredentialRecord],
    admin_names: &AdminNames,
    current_user: &str,
) -> String {
    let mut table_rows = String::new();
    if users.is_empty() {
        table_rows.push_str("<tr><td colspan=\"3\">No users yet.</td></tr>");
    }
    for user in users {
        let role = if admin_names.contains(&user.username) {
            "Admin"
        } else {
            "Staff"
        };
        let highlight = if user.username == current_user {
            " class=\"current-user\""
        } else {
            ""
        };
        table_rows.push_str(&format!(
            "<tr{highlight}><td>{name}</td><td>{status}</td><td>{role}</td></tr>",
            name = escape_html(&user.username),
            status = user.status,
        ));
    }

    let removable_options: String = users
        .iter()
        .filter(|user| !admin_names.contains(&user.username) && user.username != current_user)
        .map(|user| {
            format!(
                "<option value=\"{name}\">{name}</option>",
                name = escape_html(&user.username)
            )
        })
        .collect();
    let remove_panel = if removable_options.is_empty() {
        "<p class=\"note\">There are no removable users.</p>".to_string()
    } else {
        format!(
            r#"<form method="post" action="/dashboard/users/remove">
                <label for="remove-username">User</label>
                <select id="remove-username" name="username" required>
                    {removable_options}
                </select>
                <label><input type="checkbox" name="confirm" value="on">I understand this removes the account permanently</label>
                <button type="submit" class="danger">Remove User</button>
            </form>"#
        )
    };

    let reset_options: String = users
        .iter()
        .map(|user| {
            format!(
                "<option value=\"{name}\">{name}</option>",
                name = escape_html(&user.username)
            )
        })
        .collect();

    format!(
        r#"        <section class="panel">
            <h2>Users</h2>
            <table>
                <thead><tr><th>Username</th><th>Status</th><th>Role</th></tr></thead>
                <tbody>{table_rows}</tbody>
            </table>
        </section>
        <section class="panel">
            <h2>Add User</h2>
            <p class="note">New accounts must choose their own password at first login.</p>
            <form method="post" action="/dashboard/users">
                <label for="new-username">Username</label>
                <input id="new-username" name="username" required>
                <label for="new-password">Temporary password</label>
                <input id="new-password" type="password" name="password" required>
                <button type="submit">Add User</button>
            </form>
        </section>
        <section class="panel">
            <h2>Remove User</h2>
            {remove_panel}
        </section>
        <section class="panel">
            <h2>Reset Password</h2>
            <form method="post" action="/dashboard/users/password">
                <label for="reset-username">User</label>
                <select id="reset-username" name="username" required>
                    {reset_options}
                </select>
                <label for="reset-password">Temporary password</label>
                <input id="reset-password" type="password" name="password" required>
                <button type="submit">Reset Password</button>
            </form>
        </section>"#
    )
}
