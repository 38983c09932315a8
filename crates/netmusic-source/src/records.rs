//! Typed rows of the source tables.
//!
//! Each struct mirrors one table's declared schema. Columns that appear in a
//! file but not in the schema are ignored by the loader.

use serde::{Deserialize, Serialize};

/// One row of the `/`-delimited user profile table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    /// The fifteen undocumented columns between `name` and `description`,
    /// kept verbatim.
    pub extra: Vec<String>,
    /// Empty when the row omits it.
    pub description: String,
}

/// One row of `user_follow`: `user_id` follows `follow_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollow {
    pub user_id: i64,
    pub follow_id: i64,
    pub followed_type: i64,
    pub followed_gender: i64,
    pub timestamp: i64,
}

/// One row of `user_followed`: `followed_id` follows `user_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFollowed {
    pub user_id: i64,
    pub followed_id: i64,
    pub followed_type: i64,
    pub followed_gender: i64,
    pub timestamp: i64,
}

/// One row of `music_data`, indexed by `num`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MusicData {
    pub num: i64,
    /// Track id, kept as an opaque token.
    pub id: String,
    pub singer: Option<String>,
    pub album: Option<String>,
    pub comment_num: Option<i64>,
    pub playlist: Option<String>,
}

/// One row of `music_comments`: a user's comment on a track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicComment {
    pub music_id: String,
    pub user_id: i64,
    pub timestamp: i64,
    pub comment_id: i64,
    pub liked_count: i64,
}
