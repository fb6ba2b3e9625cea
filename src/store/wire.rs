// Hosted backend payloads
// PostgREST rows with embedded relations, converted into catalog models

use serde::Deserialize;

use crate::catalog::{
    AlbumCard, AlbumDetail, ArtistAlbum, ArtistCard, ArtistDetail, EntityLink, Interaction,
    PlaylistCard, PlaylistDetail, PlaylistTrack, Song, User,
};

// Select clauses, one per projection
pub const USER_SELECT: &str = "name, Playlist (id, name)";
pub const ARTIST_CARD_SELECT: &str = "id, name, picture";
pub const ALBUM_CARD_SELECT: &str = "id, name, cover";
pub const PLAYLIST_CARD_SELECT: &str = "id, name, cover, User (name)";
pub const ALBUM_DETAIL_SELECT: &str =
    "id, name, cover, Song (id, name, length, Interaction (playCount)), _AlbumToArtist (Artist (id, name))";
pub const ARTIST_DETAIL_SELECT: &str =
    "id, name, picture, Song (id, name, length, Interaction (playCount)), _AlbumToArtist (Album (id, name, cover, createdAt))";
pub const PLAYLIST_DETAIL_SELECT: &str =
    "id, name, cover, User (name), _PlaylistToSong (Song (id, name, length, Album (id, name), Artist (id, name)))";
pub const ID_SELECT: &str = "id";

#[derive(Debug, Deserialize)]
pub struct IdRow {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct NameRow {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UserRow {
    name: String,
    #[serde(rename = "Playlist", default)]
    playlists: Vec<EntityLink>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            name: row.name,
            playlists: row.playlists,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ArtistCardRow {
    id: String,
    name: String,
    picture: String,
}

impl From<ArtistCardRow> for ArtistCard {
    fn from(row: ArtistCardRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            picture: row.picture,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AlbumCardRow {
    id: String,
    name: String,
    cover: String,
}

impl From<AlbumCardRow> for AlbumCard {
    fn from(row: AlbumCardRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            cover: row.cover,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaylistCardRow {
    id: String,
    name: String,
    cover: String,
    #[serde(rename = "User", default)]
    user: Option<NameRow>,
}

impl From<PlaylistCardRow> for PlaylistCard {
    fn from(row: PlaylistCardRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            cover: row.cover,
            owner: row.user.map(|u| u.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    #[serde(rename = "playCount")]
    play_count: u64,
}

#[derive(Debug, Deserialize)]
struct SongRow {
    id: String,
    name: String,
    length: u32,
    #[serde(rename = "Interaction", default)]
    interactions: Vec<InteractionRow>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            length: row.length,
            interactions: row
                .interactions
                .into_iter()
                .map(|i| Interaction {
                    play_count: i.play_count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlbumArtistLink {
    #[serde(rename = "Artist")]
    artist: EntityLink,
}

#[derive(Debug, Deserialize)]
pub struct AlbumDetailRow {
    id: String,
    name: String,
    cover: String,
    #[serde(rename = "Song", default)]
    songs: Vec<SongRow>,
    #[serde(rename = "_AlbumToArtist", default)]
    artists: Vec<AlbumArtistLink>,
}

impl From<AlbumDetailRow> for AlbumDetail {
    fn from(row: AlbumDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            cover: row.cover,
            artists: row.artists.into_iter().map(|l| l.artist).collect(),
            songs: row.songs.into_iter().map(Song::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    id: String,
    name: String,
    cover: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct ArtistAlbumLink {
    #[serde(rename = "Album")]
    album: AlbumRef,
}

#[derive(Debug, Deserialize)]
pub struct ArtistDetailRow {
    id: String,
    name: String,
    picture: String,
    #[serde(rename = "Song", default)]
    songs: Vec<SongRow>,
    #[serde(rename = "_AlbumToArtist", default)]
    albums: Vec<ArtistAlbumLink>,
}

impl From<ArtistDetailRow> for ArtistDetail {
    fn from(row: ArtistDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            picture: row.picture,
            songs: row.songs.into_iter().map(Song::from).collect(),
            albums: row
                .albums
                .into_iter()
                .map(|l| ArtistAlbum {
                    id: l.album.id,
                    name: l.album.name,
                    cover: l.album.cover,
                    created_at: l.album.created_at,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrackSongRow {
    id: String,
    name: String,
    length: u32,
    #[serde(rename = "Album", default)]
    album: Option<EntityLink>,
    #[serde(rename = "Artist")]
    artist: EntityLink,
}

#[derive(Debug, Deserialize)]
struct PlaylistSongLink {
    #[serde(rename = "Song")]
    song: TrackSongRow,
}

#[derive(Debug, Deserialize)]
pub struct PlaylistDetailRow {
    id: String,
    name: String,
    cover: String,
    #[serde(rename = "User", default)]
    user: Option<NameRow>,
    #[serde(rename = "_PlaylistToSong", default)]
    songs: Vec<PlaylistSongLink>,
}

impl From<PlaylistDetailRow> for PlaylistDetail {
    fn from(row: PlaylistDetailRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            cover: row.cover,
            owner: row.user.map(|u| u.name).unwrap_or_default(),
            tracks: row
                .songs
                .into_iter()
                .map(|l| PlaylistTrack {
                    id: l.song.id,
                    name: l.song.name,
                    length: l.song.length,
                    album: l.song.album,
                    artist: l.song.artist,
                })
                .collect(),
        }
    }
}
