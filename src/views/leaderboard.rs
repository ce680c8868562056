use std::fmt::Write;

use crate::{
    codec::time,
    dao::models::PlayerEntity,
    dto::forms::validate_web_address,
    services::{
        leaderboard_service::{CategoryScores, Leaderboard},
        score_service::ScoreFormData,
    },
    views::{DisplayName, Esc, PageContext, Rendered, delete_link, render},
};

fn player_cell(out: &mut String, player: &PlayerEntity) -> std::fmt::Result {
    write!(out, "{}", Esc(&player.name))?;
    for (label, url) in player.links.present() {
        if validate_web_address(url).is_err() {
            continue;
        }
        write!(
            out,
            r#" <a href="{}" rel="noopener" target="_blank">{label}</a>"#,
            Esc(url)
        )?;
    }
    Ok(())
}

/// Public leaderboard: rank, player with links, best time.
pub fn leaderboard(ctx: &PageContext, board: &Leaderboard) -> Rendered {
    render(ctx, |out| {
        if !board.category.description.is_empty() {
            writeln!(out, "<p>{}</p>", Esc(&board.category.description))?;
        }
        if board.standings.is_empty() {
            out.push_str("<p>No times have been submitted yet.</p>\n");
            return Ok(());
        }
        out.push_str("<table>\n<thead><tr><th>Rank</th><th>Player</th><th>Time</th></tr></thead>\n<tbody>\n");
        for (index, standing) in board.standings.iter().enumerate() {
            write!(out, "<tr><td>{}</td><td>", index + 1)?;
            player_cell(out, &standing.player)?;
            writeln!(out, "</td><td>{}</td></tr>", time::encode(standing.score))?;
        }
        out.push_str("</tbody>\n</table>\n");
        Ok(())
    })
}

/// Score entry form for one category.
pub fn add_score(ctx: &PageContext, data: &ScoreFormData) -> Rendered {
    render(ctx, |out| {
        writeln!(
            out,
            "<p>{} &ndash; {}</p>",
            DisplayName(&data.game.name),
            DisplayName(&data.category.name)
        )?;
        if data.players.is_empty() {
            out.push_str(r#"<p>Add a player first: <a href="/add_player">Add Player</a></p>"#);
            return Ok(());
        }
        writeln!(
            out,
            r#"<form method="post" action="/add_score/{}">
<label for="player_name">Player</label>
<select id="player_name" name="player_name" required>"#,
            data.category.id.to_hex()
        )?;
        for player in &data.players {
            writeln!(
                out,
                r#"<option value="{}">{}</option>"#,
                player.id.to_hex(),
                Esc(&player.name)
            )?;
        }
        out.push_str("</select>\n<fieldset class=\"time\"><legend>Time</legend>\n");
        for (name, max) in [("hours", 23), ("minutes", 59), ("seconds", 59), ("centiseconds", 99)] {
            writeln!(
                out,
                r#"<label for="{name}">{name}</label><input type="number" id="{name}" name="{name}" min="0" max="{max}" value="0" required>"#
            )?;
        }
        out.push_str("</fieldset>\n<button type=\"submit\">Add Score</button>\n</form>\n");
        Ok(())
    })
}

/// Every run of a category with a delete link per run.
pub fn delete_scores(ctx: &PageContext, scores: &CategoryScores) -> Rendered {
    render(ctx, |out| {
        writeln!(
            out,
            "<p>{} &ndash; {}</p>",
            DisplayName(&scores.game.name),
            DisplayName(&scores.category.name)
        )?;
        if scores.lines.is_empty() {
            out.push_str("<p>This category has no scores.</p>\n");
            return Ok(());
        }
        out.push_str("<table>\n<thead><tr><th>Player</th><th>Time</th><th></th></tr></thead>\n<tbody>\n");
        for line in &scores.lines {
            let encoded = time::encode(line.score.score);
            write!(
                out,
                "<tr><td>{}</td><td>{encoded}</td><td>",
                Esc(&line.player.name)
            )?;
            delete_link(
                out,
                &format!("/delete_score/{}", line.score.id.to_hex()),
                &format!("{} {encoded}", line.player.name),
            )?;
            out.push_str("</td></tr>\n");
        }
        out.push_str("</tbody>\n</table>\n");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use axum::response::Html;
    use bson::oid::ObjectId;

    use super::*;
    use crate::{
        dao::models::{CategoryEntity, GameEntity, PlayerLinks},
        services::leaderboard_service::Standing,
    };

    #[test]
    fn rows_show_rank_links_and_time() {
        let game = GameEntity {
            id: ObjectId::new(),
            name: "Mario".into(),
        };
        let board = Leaderboard {
            category: CategoryEntity {
                id: ObjectId::new(),
                game_id: game.id,
                name: "Any%".into(),
                description: "Reach the credits".into(),
            },
            game,
            standings: vec![Standing {
                player: PlayerEntity {
                    id: ObjectId::new(),
                    name: "<runner>".into(),
                    links: PlayerLinks {
                        twitch: Some("https://www.twitch.tv/runner".into()),
                        youtube: None,
                        link: Some("javascript:alert(1)".into()),
                    },
                },
                score: 372_345,
            }],
        };

        let Html(page) = leaderboard(&PageContext::default(), &board).unwrap();
        assert!(page.contains("<td>1</td><td>&lt;runner&gt;"));
        assert!(page.contains(r#"href="https://www.twitch.tv/runner""#));
        assert!(!page.contains("javascript:"));
        assert!(page.contains("<td>1:02:03.45</td>"));
        assert!(page.contains("Reach the credits"));
    }
}
