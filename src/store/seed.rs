// Seed data for the relational backend
// A TOML document describing the whole catalog, applied at startup

use serde::Deserialize;
use std::path::Path;

use super::StoreError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub artists: Vec<SeedArtist>,
    #[serde(default)]
    pub albums: Vec<SeedAlbum>,
    #[serde(default)]
    pub songs: Vec<SeedSong>,
    #[serde(default)]
    pub playlists: Vec<SeedPlaylist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedArtist {
    pub id: String,
    pub name: String,
    pub picture: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAlbum {
    pub id: String,
    pub name: String,
    pub cover: String,
    pub created_at: String,
    /// Artist ids credited on the album
    #[serde(default)]
    pub artists: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSong {
    pub id: String,
    pub name: String,
    pub length: u32,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    /// One interaction record per entry
    #[serde(default)]
    pub plays: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedPlaylist {
    pub id: String,
    pub name: String,
    pub cover: String,
    /// User id; playlists may have no owner
    #[serde(default)]
    pub owner: Option<String>,
    /// Song ids in playlist order
    #[serde(default)]
    pub songs: Vec<String>,
}

impl Seed {
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        toml::from_str(content).map_err(|e| StoreError::Backend(format!("invalid seed file: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Backend(format!("failed to read seed file '{}': {e}", path.display()))
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::Seed;

    pub const DEMO_SEED: &str = r#"
[[users]]
id = "u1"
name = "Ada"

[[artists]]
id = "ar1"
name = "The Lambdas"
picture = "/img/lambdas.jpg"

[[artists]]
id = "ar2"
name = "Borrow Checkers"
picture = "/img/borrow.jpg"

[[albums]]
id = "al1"
name = "Closures"
cover = "/img/closures.jpg"
created_at = "2021-03-14T10:00:00Z"
artists = ["ar1", "ar2"]

[[albums]]
id = "al2"
name = "Lifetimes"
cover = "/img/lifetimes.jpg"
created_at = "2019-07-01T08:30:00Z"
artists = ["ar2"]

[[songs]]
id = "s1"
name = "Move Semantics"
length = 125
artist = "ar1"
album = "al1"
plays = [10, 0, 5]

[[songs]]
id = "s2"
name = "Fn Once"
length = 200
artist = "ar1"
album = "al1"
plays = [1200]

[[songs]]
id = "s3"
name = "Static Dispatch"
length = 95
artist = "ar2"
album = "al1"

[[songs]]
id = "s4"
name = "Single"
length = 180
artist = "ar2"

[[playlists]]
id = "p1"
name = "Focus"
cover = "/img/focus.jpg"
owner = "u1"
songs = ["s2", "s4", "s1"]

[[playlists]]
id = "p2"
name = "Empty"
cover = "/img/empty.jpg"
owner = "u1"
"#;

    pub fn demo_seed() -> Seed {
        Seed::parse(DEMO_SEED).expect("demo seed parses")
    }
}
