//! Netmusic source tables.
//!
//! This crate turns the raw dataset files into typed records:
//!
//! - [`DataLoader`]: resolves each file role under a root directory and
//!   parses it, failing loudly on missing files or malformed rows
//! - [`MemorySource`]: the same tables held in memory, for tests and
//!   synthetic experiments
//!
//! Both implement [`TableSource`], the seam the graph builder consumes.

pub mod loader;
pub mod memory;
pub mod records;

pub use loader::DataLoader;
pub use memory::MemorySource;
pub use records::{MusicComment, MusicData, UserFollow, UserFollowed, UserInfo};

use netmusic_core::Result;

/// Provider of the seven source tables.
///
/// Each accessor yields the full table or an error; implementations never
/// return partial tables.
pub trait TableSource {
    /// User ids, one per declared user.
    fn user_id_list(&self) -> Result<Vec<i64>>;

    /// User profiles.
    fn user_info(&self) -> Result<Vec<UserInfo>>;

    /// Outgoing follow relationships.
    fn user_follow(&self) -> Result<Vec<UserFollow>>;

    /// Incoming follow relationships.
    fn user_followed(&self) -> Result<Vec<UserFollowed>>;

    /// Track ids, one per declared track.
    fn music_id_list(&self) -> Result<Vec<String>>;

    /// Track metadata rows.
    fn music_data(&self) -> Result<Vec<MusicData>>;

    /// Comment rows linking users to tracks.
    fn music_comments(&self) -> Result<Vec<MusicComment>>;
}
