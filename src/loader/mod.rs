//! Page loader module
//!
//! One loader per page. Each fetches exactly the projection its page needs
//! together with the current user, issuing both fetches concurrently, and
//! returns a flat result. Aggregation is left to the render step.

mod error;

use serde::Serialize;

use crate::catalog::{
    AlbumCard, AlbumDetail, ArtistCard, ArtistDetail, EntityKind, PlaylistCard, PlaylistDetail,
    User,
};
use crate::config::PagesConfig;
use crate::routing::{encode_segment, Page};
use crate::store::SharedStore;

pub use error::LoadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomePage {
    pub artists: Vec<ArtistCard>,
    pub albums: Vec<AlbumCard>,
    pub playlists: Vec<PlaylistCard>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumListPage {
    pub albums: Vec<AlbumCard>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumPage {
    pub album: AlbumDetail,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistListPage {
    pub artists: Vec<ArtistCard>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistPage {
    pub artist: ArtistDetail,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistListPage {
    pub playlists: Vec<PlaylistCard>,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistPage {
    pub playlist: PlaylistDetail,
    pub user: Option<User>,
}

/// Loader output for any page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageData {
    Home(HomePage),
    AlbumList(AlbumListPage),
    Album(AlbumPage),
    ArtistList(ArtistListPage),
    Artist(ArtistPage),
    PlaylistList(PlaylistListPage),
    Playlist(PlaylistPage),
}

/// Loader output plus how it was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageProps {
    #[serde(flatten)]
    pub data: PageData,
    /// True when rendered for the static page cache
    pub is_caching: bool,
}

/// What to do with a cached-namespace path that was not enumerated up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Render on first request, then serve the stored copy
    Blocking,
    /// Only enumerated paths exist
    Disabled,
}

/// Static path enumeration result for one entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPaths {
    pub kind: EntityKind,
    pub paths: Vec<String>,
    pub fallback: Fallback,
}

/// Page loaders over one catalog backend
pub struct PageLoader {
    store: SharedStore,
    limits: PagesConfig,
}

/// A detail page needs a non-empty id; anything else is not found
fn require_id(id: Option<&str>) -> Result<&str, LoadError> {
    match id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(LoadError::NotFound),
    }
}

impl PageLoader {
    pub fn new(store: SharedStore, limits: PagesConfig) -> Self {
        Self { store, limits }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    /// Policy for cached-namespace detail paths outside the enumeration
    pub const fn fallback(&self) -> Fallback {
        if self.limits.blocking_fallback {
            Fallback::Blocking
        } else {
            Fallback::Disabled
        }
    }

    /// True when the backend answers a cheap query
    pub async fn ping(&self) -> bool {
        self.store.current_user().await.is_ok()
    }

    /// Load the data of any routed page
    pub async fn load(&self, page: &Page) -> Result<PageData, LoadError> {
        Ok(match page {
            Page::Home => PageData::Home(self.home().await?),
            Page::AlbumList => PageData::AlbumList(self.albums().await?),
            Page::Album(id) => PageData::Album(self.album(id.as_deref()).await?),
            Page::ArtistList => PageData::ArtistList(self.artists().await?),
            Page::Artist(id) => PageData::Artist(self.artist(id.as_deref()).await?),
            Page::PlaylistList => PageData::PlaylistList(self.playlists().await?),
            Page::Playlist(id) => PageData::Playlist(self.playlist(id.as_deref()).await?),
        })
    }

    pub async fn home(&self) -> Result<HomePage, LoadError> {
        let (user, artists, albums, playlists) = tokio::try_join!(
            self.store.current_user(),
            self.store.artists(Some(self.limits.featured_artists)),
            self.store.albums(Some(self.limits.new_albums)),
            self.store.playlists(Some(self.limits.featured_playlists)),
        )?;
        Ok(HomePage {
            artists,
            albums,
            playlists,
            user,
        })
    }

    pub async fn albums(&self) -> Result<AlbumListPage, LoadError> {
        let (user, albums) =
            tokio::try_join!(self.store.current_user(), self.store.albums(None))?;
        Ok(AlbumListPage { albums, user })
    }

    pub async fn album(&self, id: Option<&str>) -> Result<AlbumPage, LoadError> {
        let id = require_id(id)?;
        let (user, album) = tokio::try_join!(self.store.current_user(), self.store.album(id))?;
        Ok(AlbumPage { album, user })
    }

    pub async fn artists(&self) -> Result<ArtistListPage, LoadError> {
        let (user, artists) =
            tokio::try_join!(self.store.current_user(), self.store.artists(None))?;
        Ok(ArtistListPage { artists, user })
    }

    pub async fn artist(&self, id: Option<&str>) -> Result<ArtistPage, LoadError> {
        let id = require_id(id)?;
        let (user, artist) = tokio::try_join!(self.store.current_user(), self.store.artist(id))?;
        Ok(ArtistPage { artist, user })
    }

    pub async fn playlists(&self) -> Result<PlaylistListPage, LoadError> {
        let (user, playlists) =
            tokio::try_join!(self.store.current_user(), self.store.playlists(None))?;
        Ok(PlaylistListPage { playlists, user })
    }

    pub async fn playlist(&self, id: Option<&str>) -> Result<PlaylistPage, LoadError> {
        let id = require_id(id)?;
        let (user, playlist) =
            tokio::try_join!(self.store.current_user(), self.store.playlist(id))?;
        Ok(PlaylistPage { playlist, user })
    }

    /// Every detail path of `kind` under the cached namespace `prefix`
    pub async fn static_paths(
        &self,
        kind: EntityKind,
        prefix: &str,
    ) -> Result<StaticPaths, LoadError> {
        let prefix = prefix.trim_end_matches('/');
        let paths = self
            .store
            .ids(kind)
            .await?
            .into_iter()
            .map(|id| format!("{prefix}/{}/{}", kind.segment(), encode_segment(&id)))
            .collect();
        Ok(StaticPaths {
            kind,
            paths,
            fallback: self.fallback(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed_fixtures::demo_seed;
    use crate::store::testing::{demo_tables, spawn_fake_backend, test_client, TEST_API_KEY};
    use crate::store::{CatalogStore, RestStore, SqliteStore, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Wraps a store and counts every backend call
    struct CountingStore {
        inner: SqliteStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CatalogStore for CountingStore {
        fn name(&self) -> &'static str {
            "counting"
        }
        async fn current_user(&self) -> Result<Option<User>, StoreError> {
            self.hit();
            self.inner.current_user().await
        }
        async fn artists(&self, limit: Option<usize>) -> Result<Vec<ArtistCard>, StoreError> {
            self.hit();
            self.inner.artists(limit).await
        }
        async fn albums(&self, limit: Option<usize>) -> Result<Vec<AlbumCard>, StoreError> {
            self.hit();
            self.inner.albums(limit).await
        }
        async fn playlists(&self, limit: Option<usize>) -> Result<Vec<PlaylistCard>, StoreError> {
            self.hit();
            self.inner.playlists(limit).await
        }
        async fn album(&self, id: &str) -> Result<AlbumDetail, StoreError> {
            self.hit();
            self.inner.album(id).await
        }
        async fn artist(&self, id: &str) -> Result<ArtistDetail, StoreError> {
            self.hit();
            self.inner.artist(id).await
        }
        async fn playlist(&self, id: &str) -> Result<PlaylistDetail, StoreError> {
            self.hit();
            self.inner.playlist(id).await
        }
        async fn ids(&self, kind: EntityKind) -> Result<Vec<String>, StoreError> {
            self.hit();
            self.inner.ids(kind).await
        }
    }

    /// Always fails, standing in for an unreachable backend
    struct BrokenStore;

    #[async_trait]
    impl CatalogStore for BrokenStore {
        fn name(&self) -> &'static str {
            "broken"
        }
        async fn current_user(&self) -> Result<Option<User>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn artists(&self, _: Option<usize>) -> Result<Vec<ArtistCard>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn albums(&self, _: Option<usize>) -> Result<Vec<AlbumCard>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn playlists(&self, _: Option<usize>) -> Result<Vec<PlaylistCard>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn album(&self, _: &str) -> Result<AlbumDetail, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn artist(&self, _: &str) -> Result<ArtistDetail, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn playlist(&self, _: &str) -> Result<PlaylistDetail, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        async fn ids(&self, _: EntityKind) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
    }

    fn counting() -> Arc<CountingStore> {
        let inner = SqliteStore::open_in_memory().unwrap();
        inner.apply_seed(&demo_seed()).unwrap();
        Arc::new(CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    fn sqlite_loader() -> PageLoader {
        let store = SqliteStore::open_in_memory().unwrap();
        store.apply_seed(&demo_seed()).unwrap();
        PageLoader::new(Arc::new(store), PagesConfig::default())
    }

    async fn rest_loader() -> PageLoader {
        let url = spawn_fake_backend(demo_tables()).await;
        let store = RestStore::with_client(&url, TEST_API_KEY.to_string(), test_client());
        PageLoader::new(Arc::new(store), PagesConfig::default())
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found_without_backend_call() {
        let store = counting();
        let loader = PageLoader::new(store.clone(), PagesConfig::default());

        assert!(matches!(loader.album(None).await, Err(LoadError::NotFound)));
        assert!(matches!(loader.artist(Some("")).await, Err(LoadError::NotFound)));
        assert!(matches!(loader.playlist(Some("  ")).await, Err(LoadError::NotFound)));
        assert!(matches!(
            loader.load(&Page::Album(None)).await,
            Err(LoadError::NotFound)
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_detail_fetches_user_and_entity() {
        let store = counting();
        let loader = PageLoader::new(store.clone(), PagesConfig::default());

        let page = loader.album(Some("al1")).await.unwrap();
        assert_eq!(page.album.name, "Closures");
        assert_eq!(page.user.unwrap().name, "Ada");
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let loader = sqlite_loader();
        assert!(matches!(loader.artist(Some("zzz")).await, Err(LoadError::NotFound)));
    }

    #[tokio::test]
    async fn test_home_respects_limits() {
        let store = counting();
        let limits = PagesConfig {
            featured_artists: 1,
            new_albums: 1,
            featured_playlists: 1,
            warm_on_start: false,
            blocking_fallback: true,
        };
        let loader = PageLoader::new(store, limits);
        let home = loader.home().await.unwrap();
        assert_eq!(home.artists.len(), 1);
        assert_eq!(home.albums.len(), 1);
        assert_eq!(home.playlists.len(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let loader = PageLoader::new(Arc::new(BrokenStore), PagesConfig::default());
        assert!(matches!(loader.home().await, Err(LoadError::Backend(_))));
        assert!(matches!(
            loader.playlist(Some("p1")).await,
            Err(LoadError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_static_paths() {
        let loader = sqlite_loader();
        let paths = loader
            .static_paths(EntityKind::Playlist, "/ssg")
            .await
            .unwrap();
        assert_eq!(paths.paths, vec!["/ssg/playlist/p1", "/ssg/playlist/p2"]);
        assert_eq!(paths.fallback, Fallback::Blocking);

        let paths = loader.static_paths(EntityKind::Album, "/ssg/").await.unwrap();
        assert_eq!(paths.paths[0], "/ssg/album/al1");
    }

    #[tokio::test]
    async fn test_backends_produce_identical_pages() {
        let sqlite = sqlite_loader();
        let rest = rest_loader().await;

        let pages = [
            Page::Home,
            Page::AlbumList,
            Page::Album(Some("al1".to_string())),
            Page::Album(Some("al2".to_string())),
            Page::ArtistList,
            Page::Artist(Some("ar1".to_string())),
            Page::Artist(Some("ar2".to_string())),
            Page::PlaylistList,
            Page::Playlist(Some("p1".to_string())),
            Page::Playlist(Some("p2".to_string())),
        ];
        for page in &pages {
            let from_sqlite = sqlite.load(page).await.unwrap();
            let from_rest = rest.load(page).await.unwrap();
            assert_eq!(from_sqlite, from_rest, "page {page:?} differs between backends");
        }

        for kind in EntityKind::ALL {
            assert_eq!(
                sqlite.static_paths(kind, "/ssg").await.unwrap(),
                rest.static_paths(kind, "/ssg").await.unwrap()
            );
        }
    }

    #[test]
    fn test_props_serialize_flat() {
        let props = PageProps {
            data: PageData::AlbumList(AlbumListPage {
                albums: vec![],
                user: None,
            }),
            is_caching: true,
        };
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["page"], "album_list");
        assert_eq!(json["isCaching"], true);
        assert!(json["albums"].is_array());
    }
}
