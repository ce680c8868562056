use crate::views::{PageContext, Rendered, render};

/// Branded 404 page.
pub fn not_found(ctx: &PageContext) -> Rendered {
    render(ctx, |out| {
        out.push_str(
            "<p>The page you were looking for does not exist. Pick a leaderboard from the menu or go back <a href=\"/\">home</a>.</p>\n",
        );
        Ok(())
    })
}

/// Branded 500 page.
pub fn internal(ctx: &PageContext) -> Rendered {
    render(ctx, |out| {
        out.push_str(
            "<p>Something went wrong on our side. Please try again in a moment or go back <a href=\"/\">home</a>.</p>\n",
        );
        Ok(())
    })
}
