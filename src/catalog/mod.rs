//! Catalog module
//!
//! Read models for users, artists, albums, playlists and songs, plus the
//! aggregation and formatting helpers used when rendering them.

pub mod aggregate;
pub mod format;
pub mod model;

pub use model::{
    AlbumCard, AlbumDetail, ArtistAlbum, ArtistCard, ArtistDetail, EntityKind, EntityLink,
    Interaction, PlaylistCard, PlaylistDetail, PlaylistTrack, Song, User,
};
