//! Conversion between display names and their URL form.
//!
//! Names are stored in slug form: spaces become underscores. The mapping is
//! not a true inverse for names that already contain underscores.

/// Replace every underscore with a space.
pub fn to_display(slug: &str) -> String {
    slug.replace('_', " ")
}

/// Replace every space with an underscore.
pub fn to_slug(text: &str) -> String {
    text.replace(' ', "_")
}

/// Percent-encode a slug so it can be used as a single path segment.
///
/// Category names such as `Any%` are valid slugs but not valid URL text.
pub fn to_path_segment(slug: &str) -> String {
    let mut encoded = String::with_capacity(slug.len());
    for byte in slug.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_both_ways() {
        assert_eq!(to_slug("Super Mario 64"), "Super_Mario_64");
        assert_eq!(to_display("Super_Mario_64"), "Super Mario 64");
    }

    #[test]
    fn slug_round_trip_is_idempotent() {
        for text in ["Any%", "120 Star", "already_slugged name", "  padded  ", ""] {
            let slug = to_slug(text);
            assert_eq!(to_slug(&to_display(&slug)), slug);
        }
    }

    #[test]
    fn path_segments_escape_reserved_characters() {
        assert_eq!(to_path_segment("Any%"), "Any%25");
        assert_eq!(to_path_segment("16_Star"), "16_Star");
        assert_eq!(to_path_segment("a/b?c"), "a%2Fb%3Fc");
        assert_eq!(to_path_segment("Pokémon"), "Pok%C3%A9mon");
    }
}
