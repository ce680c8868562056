use crate::codec::slug::to_path_segment;

/// Public leaderboard of a category, addressed by slugs.
pub fn leaderboard(game: &str, category: &str) -> String {
    format!("/{}/{}", to_path_segment(game), to_path_segment(category))
}
