//! Server-rendered HTML pages.
//!
//! Pages are written straight into a `String` with `write!`. Every dynamic
//! value goes through [`Esc`] before it reaches the output.

use std::fmt::{self, Write};

use axum::response::Html;

use crate::{codec::slug, services::navigation::NavLinks, session::Session};

/// Administration pages: panel, users and entity forms.
pub mod admin;
/// Login and password change pages.
pub mod auth;
/// Branded 404 and 500 pages.
pub mod errors;
/// Leaderboard, score entry and score removal pages.
pub mod leaderboard;
/// Link builders shared by pages and redirects.
pub mod urls;

/// Outcome of rendering a page.
pub type Rendered = Result<Html<String>, fmt::Error>;

/// HTML-escaping display wrapper.
pub struct Esc<'a>(pub &'a str);

impl fmt::Display for Esc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(index) = rest.find(['&', '<', '>', '"', '\'']) {
            f.write_str(&rest[..index])?;
            f.write_str(match rest.as_bytes()[index] {
                b'&' => "&amp;",
                b'<' => "&lt;",
                b'>' => "&gt;",
                b'"' => "&quot;",
                _ => "&#39;",
            })?;
            rest = &rest[index + 1..];
        }
        f.write_str(rest)
    }
}

/// Escaped display form of a slug.
pub struct DisplayName<'a>(pub &'a str);

impl fmt::Display for DisplayName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Esc(&slug::to_display(self.0)).fmt(f)
    }
}

/// Data every page needs besides its own content.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Page heading and `<title>`.
    pub title: String,
    /// Logged-in username, if any.
    pub user: Option<String>,
    /// Whether the user is the admin account.
    pub is_admin: bool,
    /// Notices consumed from the session.
    pub flashes: Vec<String>,
    /// Games and their categories for the menu.
    pub nav: NavLinks,
}

impl PageContext {
    /// Context for a page rendered for `session`; drains its pending notices.
    pub fn new(title: impl Into<String>, session: &Session, nav: NavLinks) -> Self {
        Self {
            title: title.into(),
            user: session.user(),
            is_admin: session.is_admin(),
            flashes: session.take_flashes(),
            nav,
        }
    }
}

const STYLE: &str = r#"
  body{margin:0;font-family:system-ui,sans-serif;background:#14161a;color:#e8e8e8}
  a{color:#7cc4ff}
  header{background:#1f232a;padding:.5rem 1rem;display:flex;flex-wrap:wrap;gap:1rem;align-items:flex-start}
  header .brand{font-weight:700;font-size:1.2rem;color:#fff;text-decoration:none}
  nav ul{list-style:none;margin:0;padding:0;display:flex;flex-wrap:wrap;gap:1rem}
  nav li ul{display:block}
  nav li ul li{font-size:.9rem}
  .session{margin-left:auto;display:flex;gap:.75rem}
  main{max-width:60rem;margin:0 auto;padding:1rem}
  .flash{background:#2e4b2e;border-radius:6px;padding:.5rem 1rem;margin:.5rem 0}
  table{border-collapse:collapse;width:100%}
  th,td{text-align:left;padding:.4rem;border-bottom:1px solid #333}
  form label{display:block;margin-top:.75rem}
  form input,form select,form textarea{width:100%;max-width:30rem;padding:.3rem}
  .time input{width:4rem}
  footer{text-align:center;color:#888;padding:2rem 0 1rem}
"#;

/// Render a full page around `body`.
pub fn render(ctx: &PageContext, body: impl FnOnce(&mut String) -> fmt::Result) -> Rendered {
    let mut out = String::with_capacity(4096);
    let title = Esc(&ctx.title);
    write!(
        out,
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Runboard</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<a class="brand" href="/">Runboard</a>
"#
    )?;
    write_nav(&mut out, ctx)?;
    out.push_str("</header>\n<main>\n");
    for flash in &ctx.flashes {
        writeln!(out, r#"<p class="flash">{}</p>"#, Esc(flash))?;
    }
    writeln!(out, "<h1>{title}</h1>")?;
    body(&mut out)?;
    write!(
        out,
        r#"</main>
<footer>&copy; {} Runboard</footer>
</body>
</html>
"#,
        time::OffsetDateTime::now_utc().year()
    )?;
    Ok(Html(out))
}

fn write_nav(out: &mut String, ctx: &PageContext) -> fmt::Result {
    out.push_str("<nav><ul>\n");
    for (game, categories) in &ctx.nav {
        writeln!(out, "<li>{}<ul>", DisplayName(game))?;
        for category in categories {
            writeln!(
                out,
                r#"<li><a href="{}">{}</a></li>"#,
                Esc(&urls::leaderboard(game, &category.name)),
                DisplayName(&category.name)
            )?;
        }
        out.push_str("</ul></li>\n");
    }
    out.push_str("</ul></nav>\n<div class=\"session\">\n");
    match &ctx.user {
        Some(user) => {
            writeln!(out, "<span>{}</span>", Esc(user))?;
            out.push_str("<a href=\"/admin\">Admin</a>\n");
            if ctx.is_admin {
                out.push_str("<a href=\"/manage_users\">Users</a>\n");
            }
            out.push_str("<a href=\"/update_password\">Password</a>\n<a href=\"/logout\">Logout</a>\n");
        }
        None => out.push_str("<a href=\"/login\">Login</a>\n"),
    }
    out.push_str("</div>\n");
    Ok(())
}

/// `<label>` plus `<input>` pair.
pub(crate) fn input(
    out: &mut String,
    label: &str,
    kind: &str,
    name: &str,
    value: &str,
    required: bool,
) -> fmt::Result {
    writeln!(
        out,
        r#"<label for="{name}">{label}</label>
<input type="{kind}" id="{name}" name="{name}" value="{value}"{required}>"#,
        name = Esc(name),
        label = Esc(label),
        kind = Esc(kind),
        value = Esc(value),
        required = if required { " required" } else { "" },
    )
}

/// Link that asks for confirmation before following a destructive GET route.
///
/// `what` only lands in the `title` attribute; the inline script is constant.
pub(crate) fn delete_link(out: &mut String, href: &str, what: &str) -> fmt::Result {
    write!(
        out,
        r#"<a href="{}" title="Delete {}" onclick="return confirm('Delete this entry?')">Delete</a>"#,
        Esc(href),
        Esc(what)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            Esc(r#"<b>"Tom" & 'Jerry'</b>"#).to_string(),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(Esc("plain").to_string(), "plain");
        assert_eq!(DisplayName("A_<b>").to_string(), "A &lt;b&gt;");
    }

    #[test]
    fn layout_shows_flashes_and_session_links() {
        let ctx = PageContext {
            title: "Admin <Panel>".into(),
            user: Some("admin".into()),
            is_admin: true,
            flashes: vec!["Game added.".into()],
            nav: NavLinks::new(),
        };
        let Html(page) = render(&ctx, |out| out.write_str("<p>body</p>")).unwrap();

        assert!(page.contains("<title>Admin &lt;Panel&gt; | Runboard</title>"));
        assert!(page.contains(r#"<p class="flash">Game added.</p>"#));
        assert!(page.contains(r#"<a href="/manage_users">Users</a>"#));
        assert!(page.contains("<p>body</p>"));
    }

    #[test]
    fn delete_link_keeps_names_out_of_the_script() {
        let mut out = String::new();
        delete_link(&mut out, "/delete_player/1", "x');alert(document.domain);('").unwrap();

        assert_eq!(
            out,
            r#"<a href="/delete_player/1" title="Delete x&#39;);alert(document.domain);(&#39;" onclick="return confirm('Delete this entry?')">Delete</a>"#
        );
    }

    #[test]
    fn visitors_get_a_login_link() {
        let Html(page) = render(&PageContext::default(), |_| Ok(())).unwrap();
        assert!(page.contains(r#"<a href="/login">Login</a>"#));
        assert!(!page.contains("/logout"));
    }
}
