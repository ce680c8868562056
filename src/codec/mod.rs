//! Pure text conversions shared by the services and the HTML views.

/// Display names and URL slugs.
pub mod slug;
/// Centisecond run times.
pub mod time;
