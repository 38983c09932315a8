//! File-backed loader for the source tables.
//!
//! `DataLoader` resolves each [`FileRole`] to a path under a root directory
//! and parses that file into typed records. Missing files and malformed rows
//! are errors: no stage downstream can work from a partial dataset.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use netmusic_core::config::DataConfig;
use netmusic_core::{Error, FileNames, FileRole, NetmusicConfig, Result};
use serde::de::DeserializeOwned;

use crate::TableSource;
use crate::records::{MusicComment, MusicData, UserFollow, UserFollowed, UserInfo};

/// Number of undocumented columns between `name` and `description` in the
/// user-info table.
pub const USER_INFO_EXTRA_COLUMNS: usize = 15;

const USER_INFO_COLUMNS: usize = USER_INFO_EXTRA_COLUMNS + 3;

/// Loads source tables from a directory.
#[derive(Clone, Debug)]
pub struct DataLoader {
    paths: HashMap<FileRole, PathBuf>,
}

impl DataLoader {
    /// Creates a loader resolving every role under `root`.
    pub fn new(root: impl AsRef<Path>, files: &FileNames) -> Self {
        Self::from_data(&DataConfig {
            root: root.as_ref().to_path_buf(),
            files: files.clone(),
        })
    }

    /// Creates a loader from the `[data]` section of a configuration.
    pub fn from_config(config: &NetmusicConfig) -> Self {
        Self::from_data(&config.data)
    }

    fn from_data(data: &DataConfig) -> Self {
        let paths = FileRole::ALL
            .iter()
            .map(|&role| (role, data.source_path(role)))
            .collect();
        Self { paths }
    }

    /// Path the loader reads for a role.
    pub fn path(&self, role: FileRole) -> &Path {
        // Every role is inserted in `from_data`.
        self.paths[&role].as_path()
    }

    fn open(&self, role: FileRole) -> Result<(PathBuf, File)> {
        let path = self.path(role).to_path_buf();
        let file = File::open(&path).map_err(|e| Error::io_with_path(e, &path))?;
        log::debug!("Loading {role} from {}", path.display());
        Ok((path, file))
    }

    fn load_csv<T: DeserializeOwned>(&self, role: FileRole) -> Result<Vec<T>> {
        let (path, file) = self.open(role)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for record in reader.deserialize() {
            let row: T =
                record.map_err(|e| Error::parse(format!("{}: {e}", path.display())))?;
            rows.push(row);
        }
        log::info!("Loaded {} rows of {role}", rows.len());
        Ok(rows)
    }

    fn load_tokens(&self, role: FileRole) -> Result<Vec<(usize, String)>> {
        let (path, mut file) = self.open(role)?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::io_with_path(e, &path))?;
        Ok(content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim().to_string()))
            .filter(|(_, token)| !token.is_empty())
            .collect())
    }

    /// Newline-delimited user ids.
    pub fn load_user_id_list(&self) -> Result<Vec<i64>> {
        let role = FileRole::UserIdList;
        let ids = self
            .load_tokens(role)?
            .into_iter()
            .map(|(line, token)| {
                token.parse::<i64>().map_err(|e| {
                    Error::parse(format!(
                        "{}:{line}: invalid user id '{token}': {e}",
                        self.path(role).display()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::info!("Loaded {} user ids", ids.len());
        Ok(ids)
    }

    /// `/`-delimited user profiles without a header row.
    pub fn load_user_info(&self) -> Result<Vec<UserInfo>> {
        let role = FileRole::UserInfo;
        let (path, file) = self.open(role)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'/')
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let line = i + 1;
            if record.len() < 2 || record.len() > USER_INFO_COLUMNS {
                return Err(Error::parse(format!(
                    "{}:{line}: expected between 2 and {USER_INFO_COLUMNS} fields, found {}",
                    path.display(),
                    record.len()
                )));
            }
            let id = record[0].trim().parse::<i64>().map_err(|e| {
                Error::parse(format!(
                    "{}:{line}: invalid user id '{}': {e}",
                    path.display(),
                    &record[0]
                ))
            })?;
            let extra_end = record.len().min(USER_INFO_COLUMNS - 1);
            rows.push(UserInfo {
                id,
                name: record[1].to_string(),
                extra: (2..extra_end).map(|c| record[c].to_string()).collect(),
                description: record
                    .get(USER_INFO_COLUMNS - 1)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        log::info!("Loaded {} rows of {role}", rows.len());
        Ok(rows)
    }

    /// Who each user follows.
    pub fn load_user_follow(&self) -> Result<Vec<UserFollow>> {
        self.load_csv(FileRole::UserFollow)
    }

    /// Who follows each user.
    pub fn load_user_followed(&self) -> Result<Vec<UserFollowed>> {
        self.load_csv(FileRole::UserFollowed)
    }

    /// Newline-delimited track ids, kept as opaque tokens.
    pub fn load_music_id_list(&self) -> Result<Vec<String>> {
        let ids: Vec<String> = self
            .load_tokens(FileRole::MusicIdList)?
            .into_iter()
            .map(|(_, token)| token)
            .collect();
        log::info!("Loaded {} music ids", ids.len());
        Ok(ids)
    }

    /// Track metadata.
    pub fn load_music_data(&self) -> Result<Vec<MusicData>> {
        self.load_csv(FileRole::MusicData)
    }

    /// User comments on tracks.
    pub fn load_music_comments(&self) -> Result<Vec<MusicComment>> {
        self.load_csv(FileRole::MusicComments)
    }
}

impl TableSource for DataLoader {
    fn user_id_list(&self) -> Result<Vec<i64>> {
        self.load_user_id_list()
    }

    fn user_info(&self) -> Result<Vec<UserInfo>> {
        self.load_user_info()
    }

    fn user_follow(&self) -> Result<Vec<UserFollow>> {
        self.load_user_follow()
    }

    fn user_followed(&self) -> Result<Vec<UserFollowed>> {
        self.load_user_followed()
    }

    fn music_id_list(&self) -> Result<Vec<String>> {
        self.load_music_id_list()
    }

    fn music_data(&self) -> Result<Vec<MusicData>> {
        self.load_music_data()
    }

    fn music_comments(&self) -> Result<Vec<MusicComment>> {
        self.load_music_comments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{TempDir, tempdir};

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    fn loader(dir: &TempDir) -> DataLoader {
        DataLoader::new(dir.path(), &FileNames::default())
    }

    // ------------------------------------------------------------------------
    // Path resolution
    // ------------------------------------------------------------------------

    #[test]
    fn test_paths_resolve_under_root() {
        let mut files = FileNames::default();
        files.music_comments = "comments_v2.csv".to_string();
        let loader = DataLoader::new("/data", &files);

        assert_eq!(
            loader.path(FileRole::MusicComments),
            Path::new("/data/comments_v2.csv")
        );
        assert_eq!(
            loader.path(FileRole::UserIdList),
            Path::new("/data/user_id_list.txt")
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = NetmusicConfig::default();
        config.data.root = PathBuf::from("/srv");
        let loader = DataLoader::from_config(&config);
        assert_eq!(loader.path(FileRole::UserInfo), Path::new("/srv/userInfo.txt"));
    }

    // ------------------------------------------------------------------------
    // Id lists
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_user_id_list() {
        let dir = tempdir().unwrap();
        write(&dir, "user_id_list.txt", "1\n2\n\n 3 \n");

        let ids = loader(&dir).load_user_id_list().unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_load_user_id_list_rejects_garbage() {
        let dir = tempdir().unwrap();
        write(&dir, "user_id_list.txt", "1\nabc\n");

        let err = loader(&dir).load_user_id_list().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(":2:"), "{msg}");
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_load_music_id_list_keeps_tokens() {
        let dir = tempdir().unwrap();
        write(&dir, "music_id_list.txt", "186016\nabc-1\n");

        let ids = loader(&dir).load_music_id_list().unwrap();
        assert_eq!(ids, vec!["186016".to_string(), "abc-1".to_string()]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = loader(&dir).load_music_id_list().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    // ------------------------------------------------------------------------
    // User info
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_user_info_full_row() {
        let dir = tempdir().unwrap();
        let extra = vec!["x"; USER_INFO_EXTRA_COLUMNS].join("/");
        write(&dir, "userInfo.txt", &format!("7/alice/{extra}/likes jazz\n"));

        let rows = loader(&dir).load_user_info().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 7);
        assert_eq!(rows[0].name, "alice");
        assert_eq!(rows[0].extra.len(), USER_INFO_EXTRA_COLUMNS);
        assert_eq!(rows[0].description, "likes jazz");
    }

    #[test]
    fn test_load_user_info_defaults_description() {
        let dir = tempdir().unwrap();
        write(&dir, "userInfo.txt", "8/bob/a/b\n");

        let rows = loader(&dir).load_user_info().unwrap();
        assert_eq!(rows[0].name, "bob");
        assert_eq!(rows[0].extra, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(rows[0].description, "");
    }

    #[test]
    fn test_load_user_info_too_many_fields() {
        let dir = tempdir().unwrap();
        let extra = vec!["x"; USER_INFO_EXTRA_COLUMNS + 2].join("/");
        write(&dir, "userInfo.txt", &format!("7/alice/{extra}/desc\n"));

        assert!(loader(&dir).load_user_info().is_err());
    }

    // ------------------------------------------------------------------------
    // Headered tables
    // ------------------------------------------------------------------------

    #[test]
    fn test_load_user_follow() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "user_follow.csv",
            "user_id,follow_id,followed_type,followed_gender,timestamp\n1,2,0,1,1600000000\n",
        );

        let rows = loader(&dir).load_user_follow().unwrap();
        assert_eq!(
            rows,
            vec![UserFollow {
                user_id: 1,
                follow_id: 2,
                followed_type: 0,
                followed_gender: 1,
                timestamp: 1_600_000_000,
            }]
        );
    }

    #[test]
    fn test_load_user_followed() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "user_followed.csv",
            "user_id,followed_id,followed_type,followed_gender,timestamp\n2,3,0,2,5\n",
        );

        let rows = loader(&dir).load_user_followed().unwrap();
        assert_eq!(rows[0].user_id, 2);
        assert_eq!(rows[0].followed_id, 3);
    }

    #[test]
    fn test_load_music_data_optional_columns() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "music_data.csv",
            "num,id,singer,album,comment_num,playlist,unknown\n\
             0,t1,Faye,Eyes,12,p1,zzz\n\
             1,t2,,,,,\n",
        );

        let rows = loader(&dir).load_music_data().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].singer.as_deref(), Some("Faye"));
        assert_eq!(rows[0].comment_num, Some(12));
        assert_eq!(rows[1].singer, None);
        assert_eq!(rows[1].comment_num, None);
    }

    #[test]
    fn test_load_music_comments() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "music_comments.csv",
            "music_id,user_id,timestamp,comment_id,liked_count\nt1,1,100,9,3\n",
        );

        let rows = loader(&dir).load_music_comments().unwrap();
        assert_eq!(rows[0].music_id, "t1");
        assert_eq!(rows[0].liked_count, 3);
    }

    #[test]
    fn test_malformed_row_is_parse_error() {
        let dir = tempdir().unwrap();
        write(
            &dir,
            "music_comments.csv",
            "music_id,user_id,timestamp,comment_id,liked_count\nt1,notanumber,100,9,3\n",
        );

        let err = loader(&dir).load_music_comments().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("music_comments.csv"));
    }
}
