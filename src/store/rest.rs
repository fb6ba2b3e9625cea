//! Hosted backend over a PostgREST-style query API
//!
//! Each projection is one `GET <base>/rest/v1/<Table>?select=...` request with
//! embedded relations; rows are decoded by the `wire` module.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::wire::{
    self, AlbumCardRow, AlbumDetailRow, ArtistCardRow, ArtistDetailRow, IdRow, PlaylistCardRow,
    PlaylistDetailRow, UserRow,
};
use super::{CatalogStore, StoreError};
use crate::catalog::{
    AlbumCard, AlbumDetail, ArtistCard, ArtistDetail, EntityKind, PlaylistCard, PlaylistDetail,
    User,
};

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: String) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(base_url, api_key, client))
    }

    pub fn with_client(base_url: &str, api_key: String, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch rows of `table` projected by `select`
    ///
    /// `id` adds an `id=eq.<id>` filter.
    async fn fetch<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let mut query = vec![("select", select.to_string())];
        if let Some(id) = id {
            query.push(("id", format!("eq.{id}")));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/rest/v1/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<Vec<T>>().await?)
    }

    async fn fetch_one<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        id: &str,
    ) -> Result<T, StoreError> {
        self.fetch(table, select, Some(id), Some(1))
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl CatalogStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        let rows: Vec<UserRow> = self.fetch("User", wire::USER_SELECT, None, Some(1)).await?;
        Ok(rows.into_iter().next().map(User::from))
    }

    async fn artists(&self, limit: Option<usize>) -> Result<Vec<ArtistCard>, StoreError> {
        let rows: Vec<ArtistCardRow> = self
            .fetch("Artist", wire::ARTIST_CARD_SELECT, None, limit)
            .await?;
        Ok(rows.into_iter().map(ArtistCard::from).collect())
    }

    async fn albums(&self, limit: Option<usize>) -> Result<Vec<AlbumCard>, StoreError> {
        let rows: Vec<AlbumCardRow> = self
            .fetch("Album", wire::ALBUM_CARD_SELECT, None, limit)
            .await?;
        Ok(rows.into_iter().map(AlbumCard::from).collect())
    }

    async fn playlists(&self, limit: Option<usize>) -> Result<Vec<PlaylistCard>, StoreError> {
        let rows: Vec<PlaylistCardRow> = self
            .fetch("Playlist", wire::PLAYLIST_CARD_SELECT, None, limit)
            .await?;
        Ok(rows.into_iter().map(PlaylistCard::from).collect())
    }

    async fn album(&self, id: &str) -> Result<AlbumDetail, StoreError> {
        let row: AlbumDetailRow = self
            .fetch_one("Album", wire::ALBUM_DETAIL_SELECT, id)
            .await?;
        Ok(row.into())
    }

    async fn artist(&self, id: &str) -> Result<ArtistDetail, StoreError> {
        let row: ArtistDetailRow = self
            .fetch_one("Artist", wire::ARTIST_DETAIL_SELECT, id)
            .await?;
        Ok(row.into())
    }

    async fn playlist(&self, id: &str) -> Result<PlaylistDetail, StoreError> {
        let row: PlaylistDetailRow = self
            .fetch_one("Playlist", wire::PLAYLIST_DETAIL_SELECT, id)
            .await?;
        Ok(row.into())
    }

    async fn ids(&self, kind: EntityKind) -> Result<Vec<String>, StoreError> {
        let table = match kind {
            EntityKind::Album => "Album",
            EntityKind::Artist => "Artist",
            EntityKind::Playlist => "Playlist",
        };
        let rows: Vec<IdRow> = self.fetch(table, wire::ID_SELECT, None, None).await?;
        Ok(rows.into_iter().map(|r| r.id).collect())
    }
}
