// Catalog read models
// Fixed projections returned by every store backend

use serde::{Deserialize, Serialize};

/// Lightweight `{ id, name }` reference to another entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityLink {
    pub id: String,
    pub name: String,
}

/// The user shown in the sidebar of every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub playlists: Vec<EntityLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistCard {
    pub id: String,
    pub name: String,
    pub picture: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumCard {
    pub id: String,
    pub name: String,
    pub cover: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCard {
    pub id: String,
    pub name: String,
    pub cover: String,
    /// Name of the owning user, when the playlist has one
    pub owner: Option<String>,
}

/// One play-count record attached to a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub play_count: u64,
}

/// Song row as listed on album and artist pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub name: String,
    /// Length in seconds
    pub length: u32,
    pub interactions: Vec<Interaction>,
}

/// Album as listed on an artist page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistAlbum {
    pub id: String,
    pub name: String,
    pub cover: String,
    /// RFC 3339 timestamp
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub id: String,
    pub name: String,
    pub cover: String,
    pub artists: Vec<EntityLink>,
    pub songs: Vec<Song>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    pub picture: String,
    pub songs: Vec<Song>,
    pub albums: Vec<ArtistAlbum>,
}

/// Song entry of a playlist, carrying its album and artist links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistTrack {
    pub id: String,
    pub name: String,
    pub length: u32,
    pub album: Option<EntityLink>,
    pub artist: EntityLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDetail {
    pub id: String,
    pub name: String,
    pub cover: String,
    pub owner: String,
    pub tracks: Vec<PlaylistTrack>,
}

/// Entity kinds that have a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Album,
    Artist,
    Playlist,
}

impl EntityKind {
    pub const ALL: [Self; 3] = [Self::Album, Self::Artist, Self::Playlist];

    /// Path segment used by the page routes (`/album/<id>`)
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Playlist => "playlist",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.segment() == segment)
    }
}
