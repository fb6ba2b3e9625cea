//! Catalog store module
//!
//! One read-only data-access interface with two interchangeable backends:
//! - `SqliteStore`: relational store on a local SQLite database
//! - `RestStore`: hosted PostgREST-style query API
//!
//! Both must return the same shapes for the same data so that loaders and
//! the renderer never know which one is in use.

mod error;
mod rest;
mod seed;
mod sqlite;
mod wire;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
pub(crate) use seed::fixtures as seed_fixtures;

use async_trait::async_trait;
use std::sync::Arc;

use crate::catalog::{
    AlbumCard, AlbumDetail, ArtistCard, ArtistDetail, EntityKind, PlaylistCard, PlaylistDetail,
    User,
};
use crate::config::{BackendConfig, BackendKind};

pub use error::StoreError;
pub use rest::RestStore;
pub use seed::Seed;
pub use sqlite::SqliteStore;

/// Read access to the catalog
///
/// List methods take an optional row limit. Detail methods return
/// `StoreError::NotFound` when the id is unknown.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// The first user, with playlist summaries
    async fn current_user(&self) -> Result<Option<User>, StoreError>;

    async fn artists(&self, limit: Option<usize>) -> Result<Vec<ArtistCard>, StoreError>;

    async fn albums(&self, limit: Option<usize>) -> Result<Vec<AlbumCard>, StoreError>;

    async fn playlists(&self, limit: Option<usize>) -> Result<Vec<PlaylistCard>, StoreError>;

    async fn album(&self, id: &str) -> Result<AlbumDetail, StoreError>;

    async fn artist(&self, id: &str) -> Result<ArtistDetail, StoreError>;

    async fn playlist(&self, id: &str) -> Result<PlaylistDetail, StoreError>;

    /// Every known id of an entity kind, used for static path enumeration
    async fn ids(&self, kind: EntityKind) -> Result<Vec<String>, StoreError>;
}

/// Shared handle to the configured backend
pub type SharedStore = Arc<dyn CatalogStore>;

/// Build the backend selected in configuration
pub fn open(config: &BackendConfig) -> Result<SharedStore, StoreError> {
    match config.kind {
        BackendKind::Sqlite => {
            let store = SqliteStore::open(&config.database_path)?;
            if let Some(path) = &config.seed_file {
                let seed = Seed::load(path)?;
                store.apply_seed(&seed)?;
            }
            Ok(Arc::new(store))
        }
        BackendKind::Rest => {
            let url = config.rest_url.as_deref().ok_or_else(|| {
                StoreError::Backend("backend.rest_url is required for the rest backend".to_string())
            })?;
            let api_key = config.rest_api_key.clone().unwrap_or_default();
            Ok(Arc::new(RestStore::new(url, api_key)?))
        }
    }
}
