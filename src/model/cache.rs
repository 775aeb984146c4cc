//! Cache of liked track ids for fast "is liked" lookups without API calls

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;

pub const LIKED_TRACKS_CACHE_FILE: &str = "liked_tracks.json";

#[derive(Clone)]
pub struct LikedTracksCache {
    path: PathBuf,
    liked_ids: Arc<RwLock<HashSet<String>>>,
}

impl LikedTracksCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            liked_ids: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Returns whether a cache file was found.
    pub async fn load_from_disk(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let content = fs::read_to_string(&self.path)?;
        let ids: Vec<String> = serde_json::from_str(&content)?;
        *self.liked_ids.write().await = ids.into_iter().collect();
        Ok(true)
    }

    pub async fn save_to_disk(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let liked_ids = self.liked_ids.read().await;
        let mut ids: Vec<&String> = liked_ids.iter().collect();
        ids.sort();
        fs::write(&self.path, serde_json::to_string(&ids)?)?;
        Ok(())
    }

    pub async fn update(&self, track_ids: Vec<String>) {
        *self.liked_ids.write().await = track_ids.into_iter().collect();
    }

    pub async fn is_liked(&self, track_id: &str) -> bool {
        self.liked_ids.read().await.contains(track_id)
    }

    pub async fn add(&self, track_id: String) {
        self.liked_ids.write().await.insert(track_id);
    }

    pub async fn remove(&self, track_id: &str) {
        self.liked_ids.write().await.remove(track_id);
    }

    pub async fn clear(&self) {
        self.liked_ids.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.liked_ids.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn survives_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join(LIKED_TRACKS_CACHE_FILE);

        let cache = LikedTracksCache::new(path.clone());
        assert!(!cache.load_from_disk().await.unwrap());

        cache.update(vec!["1".into(), "2".into()]).await;
        cache.add("3".into()).await;
        cache.remove("1").await;
        cache.save_to_disk().await.unwrap();

        let reloaded = LikedTracksCache::new(path);
        assert!(reloaded.load_from_disk().await.unwrap());
        assert_eq!(reloaded.len().await, 2);
        assert!(reloaded.is_liked("2").await);
        assert!(reloaded.is_liked("3").await);
        assert!(!reloaded.is_liked("1").await);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LIKED_TRACKS_CACHE_FILE);
        fs::write(&path, "not json").unwrap();

        assert!(LikedTracksCache::new(path).load_from_disk().await.is_err());
    }
}
