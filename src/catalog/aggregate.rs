//! Aggregations over loaded catalog data
//!
//! Pure sums computed by the render step; nothing here is cached between requests.

use super::model::{AlbumDetail, PlaylistDetail, Song};

/// Sum of song lengths in seconds
pub fn total_length<I>(lengths: I) -> u64
where
    I: IntoIterator<Item = u32>,
{
    lengths.into_iter().map(u64::from).sum()
}

/// Total number of plays recorded for a song
pub fn play_count(song: &Song) -> u64 {
    song.interactions.iter().map(|i| i.play_count).sum()
}

impl AlbumDetail {
    pub fn total_length(&self) -> u64 {
        total_length(self.songs.iter().map(|s| s.length))
    }
}

impl PlaylistDetail {
    pub fn total_length(&self) -> u64 {
        total_length(self.tracks.iter().map(|t| t.length))
    }
}

impl Song {
    pub fn play_count(&self) -> u64 {
        play_count(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::{EntityLink, Interaction, PlaylistTrack};

    fn song(id: &str, length: u32, plays: &[u64]) -> Song {
        Song {
            id: id.to_string(),
            name: format!("Song {id}"),
            length,
            interactions: plays
                .iter()
                .map(|&play_count| Interaction { play_count })
                .collect(),
        }
    }

    #[test]
    fn test_total_length() {
        assert_eq!(total_length([125, 200, 95]), 420);
        assert_eq!(total_length(Vec::<u32>::new()), 0);
    }

    #[test]
    fn test_total_length_does_not_overflow_u32() {
        assert_eq!(total_length([u32::MAX, 1]), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_play_count() {
        assert_eq!(song("1", 10, &[10, 0, 5]).play_count(), 15);
        assert_eq!(song("2", 10, &[]).play_count(), 0);
    }

    #[test]
    fn test_album_total_length() {
        let album = AlbumDetail {
            id: "a".to_string(),
            name: "Album".to_string(),
            cover: String::new(),
            artists: vec![],
            songs: vec![song("1", 125, &[]), song("2", 200, &[]), song("3", 95, &[])],
        };
        assert_eq!(album.total_length(), 420);
    }

    #[test]
    fn test_playlist_total_length() {
        let artist = EntityLink {
            id: "ar".to_string(),
            name: "Artist".to_string(),
        };
        let playlist = PlaylistDetail {
            id: "p".to_string(),
            name: "Mix".to_string(),
            cover: String::new(),
            owner: "someone".to_string(),
            tracks: [125, 200, 95]
                .iter()
                .enumerate()
                .map(|(i, &length)| PlaylistTrack {
                    id: i.to_string(),
                    name: format!("Track {i}"),
                    length,
                    album: None,
                    artist: artist.clone(),
                })
                .collect(),
        };
        assert_eq!(playlist.total_length(), 420);
    }
}
