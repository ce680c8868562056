//! Admin panel, user management and the entity forms.

use std::fmt::Write;

use crate::{
    codec::slug,
    dao::models::{CategoryEntity, GameEntity, PlayerEntity, UserEntity},
    services::{
        game_service::GameOverview,
        player_service::{TWITCH_PREFIX, YOUTUBE_PREFIX},
    },
    session::ADMIN_USERNAME,
    views::{DisplayName, Esc, PageContext, Rendered, delete_link, input, render, urls},
};

/// Admin panel listing games with their categories, and players.
pub fn panel(ctx: &PageContext, games: &[GameOverview], players: &[PlayerEntity]) -> Rendered {
    render(ctx, |out| {
        out.push_str(
            r#"<p><a href="/add_game">Add Game</a> | <a href="/add_category">Add Category</a> | <a href="/add_player">Add Player</a></p>
<h2>Games</h2>
"#,
        );
        if games.is_empty() {
            out.push_str("<p>No games yet.</p>\n");
        }
        for GameOverview { game, categories } in games {
            let id = game.id.to_hex();
            write!(
                out,
                r#"<h3>{}</h3>
<p><a href="/edit_game/{id}">Edit</a> "#,
                DisplayName(&game.name)
            )?;
            delete_link(out, &format!("/delete_game/{id}"), &slug::to_display(&game.name))?;
            writeln!(out, r#" | <a href="/add_category?id={id}">Add Category</a></p>"#)?;

            if categories.is_empty() {
                continue;
            }
            out.push_str("<table>\n<tbody>\n");
            for category in categories {
                let category_id = category.id.to_hex();
                write!(
                    out,
                    r#"<tr><td><a href="{}">{}</a></td><td><a href="/add_score/{category_id}">Add Score</a> <a href="/delete_scores/{category_id}">Scores</a> <a href="/edit_category/{id}/{category_id}">Edit</a> "#,
                    Esc(&urls::leaderboard(&game.name, &category.name)),
                    DisplayName(&category.name)
                )?;
                delete_link(
                    out,
                    &format!("/delete_category/{category_id}"),
                    &slug::to_display(&category.name),
                )?;
                out.push_str("</td></tr>\n");
            }
            out.push_str("</tbody>\n</table>\n");
        }

        out.push_str("<h2>Players</h2>\n");
        if players.is_empty() {
            out.push_str("<p>No players yet.</p>\n");
            return Ok(());
        }
        out.push_str("<table>\n<tbody>\n");
        for player in players {
            let id = player.id.to_hex();
            write!(
                out,
                r#"<tr><td>{}</td><td><a href="/edit_player/{id}">Edit</a> "#,
                Esc(&player.name)
            )?;
            delete_link(out, &format!("/delete_player/{id}"), &player.name)?;
            out.push_str("</td></tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
        Ok(())
    })
}

/// User list with edit and delete links.
pub fn users(ctx: &PageContext, users: &[UserEntity]) -> Rendered {
    render(ctx, |out| {
        out.push_str("<p><a href=\"/add_user\">Add User</a></p>\n<table>\n<tbody>\n");
        for user in users {
            let id = user.id.to_hex();
            write!(
                out,
                r#"<tr><td>{}</td><td><a href="/edit_user/{id}">Change password</a> "#,
                Esc(&user.username)
            )?;
            if user.username != ADMIN_USERNAME {
                delete_link(out, &format!("/delete_user/{id}"), &user.username)?;
            }
            out.push_str("</td></tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
        Ok(())
    })
}

/// New user form.
pub fn add_user(ctx: &PageContext) -> Rendered {
    render(ctx, |out| {
        out.push_str("<form method=\"post\" action=\"/add_user\">\n");
        input(out, "Username", "text", "username", "", true)?;
        input(out, "Password", "password", "password", "", true)?;
        out.push_str("<button type=\"submit\">Add User</button>\n</form>\n");
        Ok(())
    })
}

/// Password reset form for one user.
pub fn edit_user(ctx: &PageContext, user: &UserEntity) -> Rendered {
    render(ctx, |out| {
        writeln!(
            out,
            r#"<p>Set a new password for <strong>{}</strong>.</p>
<form method="post" action="/edit_user/{}">"#,
            Esc(&user.username),
            user.id.to_hex()
        )?;
        input(out, "New password", "password", "password", "", true)?;
        out.push_str("<button type=\"submit\">Update Password</button>\n</form>\n");
        Ok(())
    })
}

/// Add or edit game form; `game` is the game being edited.
pub fn game_form(ctx: &PageContext, game: Option<&GameEntity>) -> Rendered {
    render(ctx, |out| {
        let (action, name, button) = match game {
            Some(game) => (
                format!("/edit_game/{}", game.id.to_hex()),
                slug::to_display(&game.name),
                "Update Game",
            ),
            None => ("/add_game".to_owned(), String::new(), "Add Game"),
        };
        writeln!(out, r#"<form method="post" action="{}">"#, Esc(&action))?;
        input(out, "Name", "text", "name", &name, true)?;
        writeln!(out, "<button type=\"submit\">{button}</button>\n</form>")
    })
}

/// Add or edit category form.
///
/// `selected` preselects the owning game; `category` is the category being edited.
pub fn category_form(
    ctx: &PageContext,
    games: &[GameEntity],
    selected: Option<&str>,
    category: Option<&CategoryEntity>,
) -> Rendered {
    render(ctx, |out| {
        if games.is_empty() {
            out.push_str(r#"<p>Add a game first: <a href="/add_game">Add Game</a></p>"#);
            return Ok(());
        }
        let (action, name, desc, button) = match category {
            Some(category) => (
                format!(
                    "/edit_category/{}/{}",
                    category.game_id.to_hex(),
                    category.id.to_hex()
                ),
                slug::to_display(&category.name),
                category.description.as_str(),
                "Update Category",
            ),
            None => ("/add_category".to_owned(), String::new(), "", "Add Category"),
        };
        writeln!(
            out,
            r#"<form method="post" action="{}">
<label for="game_id">Game</label>
<select id="game_id" name="game_id" required>"#,
            Esc(&action)
        )?;
        for game in games {
            let id = game.id.to_hex();
            let chosen = if selected == Some(id.as_str()) { " selected" } else { "" };
            writeln!(
                out,
                r#"<option value="{id}"{chosen}>{}</option>"#,
                DisplayName(&game.name)
            )?;
        }
        out.push_str("</select>\n");
        input(out, "Name", "text", "name", &name, true)?;
        writeln!(
            out,
            r#"<label for="desc">Description</label>
<textarea id="desc" name="desc" rows="3">{}</textarea>
<button type="submit">{button}</button>
</form>"#,
            Esc(desc)
        )
    })
}

/// Add or edit player form; stored channel URLs are shown as bare handles.
pub fn player_form(ctx: &PageContext, player: Option<&PlayerEntity>) -> Rendered {
    render(ctx, |out| {
        let handle = |value: Option<&String>, prefix: &str| {
            value
                .map(|url| url.strip_prefix(prefix).unwrap_or(url).to_owned())
                .unwrap_or_default()
        };
        let (action, name, twitch, youtube, link, button) = match player {
            Some(player) => (
                format!("/edit_player/{}", player.id.to_hex()),
                player.name.clone(),
                handle(player.links.twitch.as_ref(), TWITCH_PREFIX),
                handle(player.links.youtube.as_ref(), YOUTUBE_PREFIX),
                player.links.link.clone().unwrap_or_default(),
                "Update Player",
            ),
            None => (
                "/add_player".to_owned(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                "Add Player",
            ),
        };
        writeln!(out, r#"<form method="post" action="{}">"#, Esc(&action))?;
        input(out, "Name", "text", "name", &name, true)?;
        input(out, "Twitch username", "text", "twitch", &twitch, false)?;
        input(out, "YouTube channel", "text", "youtube", &youtube, false)?;
        input(out, "Other link", "url", "link", &link, false)?;
        writeln!(out, "<button type=\"submit\">{button}</button>\n</form>")
    })
}
