use chrono::{Datelike, Utc};

const PAGE_BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f4f7f9; color: #0f172a; }
        header { background: #ffffff; padding: 1.75rem 1.5rem; border-bottom: 1px solid #e2e8f0; }
        .header-bar { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; max-width: 960px; margin: 0 auto; }
        .header-bar h1 { margin: 0; font-size: 1.6rem; }
        .header-actions { display: flex; gap: 0.75rem; align-items: center; flex-wrap: wrap; }
        .header-actions span { color: #475569; font-size: 0.95rem; }
        .nav-link { display: inline-flex; align-items: center; color: #1d4ed8; text-decoration: none; font-weight: 600; background: #e0f2fe; padding: 0.5rem 0.95rem; border-radius: 999px; border: 1px solid #bfdbfe; }
        .nav-link:hover { background: #bfdbfe; }
        .logout-form button { padding: 0.5rem 1.1rem; border-radius: 999px; }
        main { padding: 2rem 1.5rem; max-width: 960px; margin: 0 auto; box-sizing: border-box; }
        section { margin-bottom: 2rem; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 4px 20px rgba(0, 0, 0, 0.08); }
        .panel h2 { margin-top: 0; }
        label { display: block; margin: 0.75rem 0 0.4rem; font-weight: 600; }
        input, select, textarea { width: 100%; padding: 0.7rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; box-sizing: border-box; font-size: 0.95rem; }
        textarea { min-height: 6rem; resize: vertical; }
        input[type="checkbox"] { width: auto; margin-right: 0.5rem; }
        .field-row { display: grid; grid-template-columns: 2fr 1fr 1fr; gap: 1rem; }
        button { margin-top: 1rem; padding: 0.75rem 1.2rem; border: none; border-radius: 8px; background: #6495ed; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #4f7fd9; }
        button.danger { background: #dc2626; }
        button.danger:hover { background: #b91c1c; }
        button.btn-sm { margin-top: 0; padding: 0.4rem 0.8rem; font-size: 0.85rem; }
        .inline-form { display: inline; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .itinerary-card { background: #ffffff; padding: 1.1rem 1.25rem; border-radius: 12px; margin-bottom: 1rem; border: 1px solid #e2e8f0; border-left: 6px solid #6495ed; }
        .itinerary-card h3 { margin: 0 0 0.35rem; font-size: 1.05rem; }
        .itinerary-card .details { color: #475569; font-size: 0.9rem; margin: 0 0 0.5rem; }
        .itinerary-card .description { white-space: pre-line; margin: 0 0 0.5rem; }
        .downloads a { color: #2563eb; text-decoration: none; margin-right: 1rem; font-weight: 600; }
        .downloads a:hover { text-decoration: underline; }
        .note { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        table { width: 100%; border-collapse: collapse; margin-top: 1rem; background: #ffffff; border: 1px solid #e2e8f0; }
        th, td { padding: 0.7rem 1rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
        th { background: #f1f5f9; font-weight: 600; }
        tr.current-user td { background: #f0f9ff; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
        @media (max-width: 768px) {
            header { padding: 1.25rem 1rem; }
            main { padding: 1.5rem 1rem; }
            .field-row { grid-template-columns: 1fr; }
        }
"#;

pub struct NavLink<'a> {
    pub href: &'a str,
    pub label: &'a str,
}

pub struct PageLayout<'a> {
    pub meta_title: &'a str,
    pub page_heading: &'a str,
    pub company_name: &'a str,
    pub username: &'a str,
    pub role_label: &'a str,
    pub nav_link: Option<NavLink<'a>>,
    pub flash_html: String,
    pub body_html: String,
}

/// Shell shared by the builder and the admin dashboard.
pub fn render_page(layout: PageLayout<'_>) -> String {
    let PageLayout {
        meta_title,
        page_heading,
        company_name,
        username,
        role_label,
        nav_link,
        flash_html,
        body_html,
    } = layout;

    let nav_html = nav_link
        .map(|link| {
            format!(
                r#"<a class="nav-link" href="{href}">{label}</a>"#,
                href = link.href,
                label = escape_html(link.label),
            )
        })
        .unwrap_or_default();
    let footer = render_footer(company_name);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{meta_title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <div class="header-bar">
            <h1>{page_heading}</h1>
            <div class="header-actions">
                <span>Signed in as <strong>{username}</strong> ({role_label})</span>
                {nav_html}
                <form class="logout-form inline-form" method="post" action="/logout">
                    <button type="submit" class="btn-sm">Logout</button>
                </form>
            </div>
        </div>
    </header>
    <main>
        {flash_html}
{body_html}
        {footer}
    </main>
</body>
</html>"#,
        meta_title = escape_html(meta_title),
        styles = PAGE_BASE_STYLES,
        page_heading = escape_html(page_heading),
        username = escape_html(username),
        role_label = role_label,
        nav_html = nav_html,
        flash_html = flash_html,
        body_html = body_html,
        footer = footer,
    )
}

/// Login form. `message_html` is an already composed flash block.
pub fn render_login_page(
    company_name: &str,
    support_contact: Option<&str>,
    message_html: &str,
) -> String {
    let support = support_contact
        .and_then(support_href)
        .map(|href| {
            format!(
                r#"<p class="description"><a href="{href}">Unable to sign in?</a></p>"#,
                href = escape_html(&href)
            )
        })
        .unwrap_or_default();

    let form = format!(
        r#"<form method="post" action="/login">
                <label for="username">Username</label>
                <input id="username" name="username" autocomplete="username" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password" autocomplete="current-password" required>
                <button type="submit">Sign In</button>
            </form>
            {support}"#
    );
    render_standalone_form(company_name, "Sign in to your account", message_html, &form)
}

/// Email addresses become `mailto:` links; only http(s) URLs are linked as-is.
fn support_href(contact: &str) -> Option<String> {
    let contact = contact.trim();
    let lower = contact.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        Some(contact.to_string())
    } else if contact.contains('@') && !contact.contains(char::is_whitespace) {
        Some(format!("mailto:{}", contact.trim_start_matches("mailto:")))
    } else {
        None
    }
}

pub fn render_password_page(company_name: &str, username: &str, message_html: &str) -> String {
    let form = format!(
        r#"<p class="description">Welcome, <strong>{username}</strong>. Choose a new password before continuing.</p>
            <form method="post" action="/password">
                <label for="new-password">New password</label>
                <input id="new-password" type="password" name="new_password" autocomplete="new-password" required>
                <label for="confirm-password">Confirm password</label>
                <input id="confirm-password" type="password" name="confirm_password" autocomplete="new-password" required>
                <button type="submit">Update Password</button>
            </form>
            <form method="post" action="/logout">
                <button type="submit" class="secondary">Logout</button>
            </form>"#,
        username = escape_html(username),
    );
    render_standalone_form(company_name, "Set a new password", message_html, &form)
}

fn render_standalone_form(
    company_name: &str,
    heading: &str,
    message_html: &str,
    form_html: &str,
) -> String {
    let company = escape_html(company_name);
    let footer = render_footer(company_name);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{company} Itinerary Portal</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
        :root {{ color-scheme: light; }}
        body {{ font-family: "Helvetica Neue", Arial, sans-serif; display: flex; flex-direction: column; align-items: center; justify-content: center; min-height: 100vh; margin: 0; background: #f4f7f9; color: #0f172a; padding: 1.5rem; box-sizing: border-box; }}
        main {{ width: 100%; max-width: 440px; display: flex; flex-direction: column; align-items: center; gap: 1.5rem; }}
        .brand {{ font-size: 1.5rem; font-weight: 700; color: #334155; text-align: center; }}
        h1 {{ margin: 0; font-size: 1.35rem; font-weight: 400; color: #555; text-align: center; }}
        section {{ width: 100%; }}
        p.description {{ color: #475569; text-align: center; font-size: 0.95rem; }}
        label {{ display: block; margin-top: 1rem; font-weight: 600; }}
        input {{ width: 100%; padding: 0.8rem; margin-top: 0.5rem; border-radius: 5px; border: 1px solid #ddd; background: #ffffff; font-size: 1rem; box-sizing: border-box; }}
        button {{ margin-top: 1.5rem; width: 100%; height: 45px; border: none; border-radius: 5px; background: #6495ed; color: #ffffff; font-weight: 600; font-size: 1rem; cursor: pointer; }}
        button.secondary {{ margin-top: 0.75rem; background: #94a3b8; }}
        .flash {{ padding: 0.9rem 1.1rem; border-radius: 8px; font-weight: 600; border: 1px solid transparent; }}
        .flash.success {{ background: #ecfdf3; border-color: #bbf7d0; color: #166534; }}
        .flash.error {{ background: #fef2f2; border-color: #fecaca; color: #b91c1c; }}
        .app-footer {{ margin-top: 2.5rem; text-align: center; font-size: 0.85rem; color: #888; }}
    </style>
</head>
<body>
    <main>
        <div class="brand">{company}</div>
        <h1>{heading}</h1>
        {message_html}
        <section>
            {form_html}
        </section>
        {footer}
    </main>
</body>
</html>"#,
        company = company,
        heading = escape_html(heading),
        message_html = message_html,
        form_html = form_html,
        footer = footer,
    )
}

pub fn render_footer(company_name: &str) -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} {company} Itinerary Portal, internal use only</footer>"#,
        year = current_year,
        company = escape_html(company_name),
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
