//! Node identifier utilities.
//!
//! Graph nodes are keyed by a prefixed string so that user ids and track
//! ids can never collide inside one graph: `user_<id>` for users and
//! `music_<id>` for tracks. Track ids are opaque tokens (numeric or not).

/// Prefix for user node identifiers.
pub const USER_PREFIX: &str = "user_";

/// Prefix for music (track) node identifiers.
pub const MUSIC_PREFIX: &str = "music_";

/// Build the node identifier for a user.
///
/// # Examples
///
/// ```
/// use netmusic_core::util::ids::user_node_id;
///
/// assert_eq!(user_node_id(42), "user_42");
/// ```
pub fn user_node_id(user_id: i64) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Build the node identifier for a track.
///
/// The raw id is trimmed; no other normalization is applied.
///
/// # Examples
///
/// ```
/// use netmusic_core::util::ids::music_node_id;
///
/// assert_eq!(music_node_id("186016"), "music_186016");
/// assert_eq!(music_node_id(" abc "), "music_abc");
/// ```
pub fn music_node_id(music_id: &str) -> String {
    format!("{MUSIC_PREFIX}{}", music_id.trim())
}
