//! In-memory table source.

use netmusic_core::Result;

use crate::records::{MusicComment, MusicData, UserFollow, UserFollowed, UserInfo};
use crate::TableSource;

/// Source tables held in memory.
///
/// Built with chained `with_*` calls:
///
/// ```
/// use netmusic_source::{MemorySource, TableSource};
///
/// let source = MemorySource::new()
///     .with_users([1, 2])
///     .with_follow(1, 2, 100)
///     .with_tracks(["t1"])
///     .with_comment("t1", 2, 200, 0);
///
/// assert_eq!(source.user_id_list().unwrap(), vec![1, 2]);
/// assert_eq!(source.music_comments().unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    pub user_ids: Vec<i64>,
    pub user_info: Vec<UserInfo>,
    pub follows: Vec<UserFollow>,
    pub followed: Vec<UserFollowed>,
    pub music_ids: Vec<String>,
    pub music_data: Vec<MusicData>,
    pub comments: Vec<MusicComment>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares users.
    pub fn with_users(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.user_ids.extend(ids);
        self
    }

    /// Adds a `user_follow` row: `user_id` follows `follow_id`.
    pub fn with_follow(mut self, user_id: i64, follow_id: i64, timestamp: i64) -> Self {
        self.follows.push(UserFollow {
            user_id,
            follow_id,
            followed_type: 0,
            followed_gender: 0,
            timestamp,
        });
        self
    }

    /// Adds a `user_followed` row: `followed_id` follows `user_id`.
    pub fn with_followed(mut self, user_id: i64, followed_id: i64, timestamp: i64) -> Self {
        self.followed.push(UserFollowed {
            user_id,
            followed_id,
            followed_type: 0,
            followed_gender: 0,
            timestamp,
        });
        self
    }

    /// Declares tracks.
    pub fn with_tracks<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.music_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds a `music_data` row.
    pub fn with_music_data(mut self, row: MusicData) -> Self {
        self.music_data.push(row);
        self
    }

    /// Adds a `userInfo` row.
    pub fn with_user_info(mut self, row: UserInfo) -> Self {
        self.user_info.push(row);
        self
    }

    /// Adds a `music_comments` row. The comment id is the row position.
    pub fn with_comment(
        mut self,
        music_id: impl Into<String>,
        user_id: i64,
        timestamp: i64,
        liked_count: i64,
    ) -> Self {
        let comment_id = self.comments.len() as i64;
        self.comments.push(MusicComment {
            music_id: music_id.into(),
            user_id,
            timestamp,
            comment_id,
            liked_count,
        });
        self
    }
}

impl TableSource for MemorySource {
    fn user_id_list(&self) -> Result<Vec<i64>> {
        Ok(self.user_ids.clone())
    }

    fn user_info(&self) -> Result<Vec<UserInfo>> {
        Ok(self.user_info.clone())
    }

    fn user_follow(&self) -> Result<Vec<UserFollow>> {
        Ok(self.follows.clone())
    }

    fn user_followed(&self) -> Result<Vec<UserFollowed>> {
        Ok(self.followed.clone())
    }

    fn music_id_list(&self) -> Result<Vec<String>> {
        Ok(self.music_ids.clone())
    }

    fn music_data(&self) -> Result<Vec<MusicData>> {
        Ok(self.music_data.clone())
    }

    fn music_comments(&self) -> Result<Vec<MusicComment>> {
        Ok(self.comments.clone())
    }
}
