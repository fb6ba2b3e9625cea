//! Relational backend on SQLite
//!
//! Queries run on the blocking pool; the single connection is guarded by a
//! mutex so concurrent loader fetches are serialized here.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::seed::Seed;
use super::{CatalogStore, StoreError};
use crate::catalog::{
    AlbumCard, AlbumDetail, ArtistAlbum, ArtistCard, ArtistDetail, EntityKind, EntityLink,
    Interaction, PlaylistCard, PlaylistDetail, PlaylistTrack, Song, User,
};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id   TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS artists (
    id      TEXT PRIMARY KEY,
    name    TEXT NOT NULL,
    picture TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS albums (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    cover      TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS album_artists (
    album_id  TEXT NOT NULL REFERENCES albums(id),
    artist_id TEXT NOT NULL REFERENCES artists(id),
    PRIMARY KEY (album_id, artist_id)
);
CREATE TABLE IF NOT EXISTS songs (
    id        TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    length    INTEGER NOT NULL,
    artist_id TEXT NOT NULL REFERENCES artists(id),
    album_id  TEXT REFERENCES albums(id)
);
CREATE TABLE IF NOT EXISTS interactions (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    song_id    TEXT NOT NULL REFERENCES songs(id),
    play_count INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS playlists (
    id      TEXT PRIMARY KEY,
    name    TEXT NOT NULL,
    cover   TEXT NOT NULL,
    user_id TEXT REFERENCES users(id)
);
CREATE TABLE IF NOT EXISTS playlist_songs (
    playlist_id TEXT NOT NULL REFERENCES playlists(id),
    song_id     TEXT NOT NULL REFERENCES songs(id),
    position    INTEGER NOT NULL,
    PRIMARY KEY (playlist_id, position)
);
";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert or replace every entity of the seed in one transaction
    ///
    /// Link rows (album credits, interactions, playlist entries) of seeded
    /// entities are replaced, so applying the same seed twice is a no-op.
    pub fn apply_seed(&self, seed: &Seed) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for user in &seed.users {
            tx.execute(
                "INSERT OR REPLACE INTO users (id, name) VALUES (?1, ?2)",
                params![user.id, user.name],
            )?;
        }
        for artist in &seed.artists {
            tx.execute(
                "INSERT OR REPLACE INTO artists (id, name, picture) VALUES (?1, ?2, ?3)",
                params![artist.id, artist.name, artist.picture],
            )?;
        }
        for album in &seed.albums {
            tx.execute(
                "INSERT OR REPLACE INTO albums (id, name, cover, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![album.id, album.name, album.cover, album.created_at],
            )?;
            tx.execute(
                "DELETE FROM album_artists WHERE album_id = ?1",
                params![album.id],
            )?;
            for artist_id in &album.artists {
                tx.execute(
                    "INSERT INTO album_artists (album_id, artist_id) VALUES (?1, ?2)",
                    params![album.id, artist_id],
                )?;
            }
        }
        for song in &seed.songs {
            tx.execute(
                "INSERT OR REPLACE INTO songs (id, name, length, artist_id, album_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![song.id, song.name, song.length, song.artist, song.album],
            )?;
            tx.execute("DELETE FROM interactions WHERE song_id = ?1", params![song.id])?;
            for &plays in &song.plays {
                let plays = i64::try_from(plays)
                    .map_err(|_| StoreError::Backend(format!("play count {plays} out of range")))?;
                tx.execute(
                    "INSERT INTO interactions (song_id, play_count) VALUES (?1, ?2)",
                    params![song.id, plays],
                )?;
            }
        }
        for playlist in &seed.playlists {
            tx.execute(
                "INSERT OR REPLACE INTO playlists (id, name, cover, user_id) VALUES (?1, ?2, ?3, ?4)",
                params![playlist.id, playlist.name, playlist.cover, playlist.owner],
            )?;
            tx.execute(
                "DELETE FROM playlist_songs WHERE playlist_id = ?1",
                params![playlist.id],
            )?;
            for (position, song_id) in playlist.songs.iter().enumerate() {
                let position = i64::try_from(position).unwrap_or(i64::MAX);
                tx.execute(
                    "INSERT INTO playlist_songs (playlist_id, song_id, position) VALUES (?1, ?2, ?3)",
                    params![playlist.id, song_id, position],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))
    }

    /// Run a query closure on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("sqlite task failed: {e}")))?
    }
}

/// `LIMIT -1` means no limit in SQLite
fn sql_limit(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX))
}

fn interactions(conn: &Connection, song_id: &str) -> Result<Vec<Interaction>, StoreError> {
    let mut stmt =
        conn.prepare_cached("SELECT play_count FROM interactions WHERE song_id = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![song_id], |row| row.get::<_, i64>(0))?;
    let mut out = Vec::new();
    for plays in rows {
        let plays = plays?;
        let play_count = u64::try_from(plays).map_err(|_| {
            StoreError::Backend(format!("song {song_id} has negative play count {plays}"))
        })?;
        out.push(Interaction { play_count });
    }
    Ok(out)
}

/// Songs matching `column = id`, each with its interactions
fn songs_where(conn: &Connection, column: &str, id: &str) -> Result<Vec<Song>, StoreError> {
    let sql = format!("SELECT id, name, length FROM songs WHERE {column} = ?1 ORDER BY rowid");
    let mut stmt = conn.prepare(&sql)?;
    let heads = stmt
        .query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    heads
        .into_iter()
        .map(|(id, name, length)| {
            let interactions = interactions(conn, &id)?;
            Ok(Song {
                id,
                name,
                length,
                interactions,
            })
        })
        .collect()
}

fn query_user(conn: &Connection) -> Result<Option<User>, StoreError> {
    let head = conn
        .query_row("SELECT id, name FROM users ORDER BY rowid LIMIT 1", [], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .optional()?;
    let Some((user_id, name)) = head else {
        return Ok(None);
    };

    let mut stmt =
        conn.prepare("SELECT id, name FROM playlists WHERE user_id = ?1 ORDER BY rowid")?;
    let playlists = stmt
        .query_map(params![user_id], |row| {
            Ok(EntityLink {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(User { name, playlists }))
}

fn query_album(conn: &Connection, id: &str) -> Result<AlbumDetail, StoreError> {
    let (id, name, cover) = conn
        .query_row(
            "SELECT id, name, cover FROM albums WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?
        .ok_or(StoreError::NotFound)?;

    let mut stmt = conn.prepare(
        "SELECT ar.id, ar.name FROM album_artists aa \
         JOIN artists ar ON ar.id = aa.artist_id \
         WHERE aa.album_id = ?1 ORDER BY aa.rowid",
    )?;
    let artists = stmt
        .query_map(params![id], |row| {
            Ok(EntityLink {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let songs = songs_where(conn, "album_id", &id)?;

    Ok(AlbumDetail {
        id,
        name,
        cover,
        artists,
        songs,
    })
}

fn query_artist(conn: &Connection, id: &str) -> Result<ArtistDetail, StoreError> {
    let (id, name, picture) = conn
        .query_row(
            "SELECT id, name, picture FROM artists WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?
        .ok_or(StoreError::NotFound)?;

    let songs = songs_where(conn, "artist_id", &id)?;

    let mut stmt = conn.prepare(
        "SELECT al.id, al.name, al.cover, al.created_at FROM album_artists aa \
         JOIN albums al ON al.id = aa.album_id \
         WHERE aa.artist_id = ?1 ORDER BY aa.rowid",
    )?;
    let albums = stmt
        .query_map(params![id], |row| {
            Ok(ArtistAlbum {
                id: row.get(0)?,
                name: row.get(1)?,
                cover: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ArtistDetail {
        id,
        name,
        picture,
        songs,
        albums,
    })
}

fn query_playlist(conn: &Connection, id: &str) -> Result<PlaylistDetail, StoreError> {
    let (id, name, cover, owner) = conn
        .query_row(
            "SELECT p.id, p.name, p.cover, u.name FROM playlists p \
             LEFT JOIN users u ON u.id = p.user_id WHERE p.id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            },
        )
        .optional()?
        .ok_or(StoreError::NotFound)?;

    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.length, al.id, al.name, ar.id, ar.name \
         FROM playlist_songs ps \
         JOIN songs s ON s.id = ps.song_id \
         JOIN artists ar ON ar.id = s.artist_id \
         LEFT JOIN albums al ON al.id = s.album_id \
         WHERE ps.playlist_id = ?1 ORDER BY ps.position",
    )?;
    let tracks = stmt
        .query_map(params![id], |row| {
            let album_id: Option<String> = row.get(3)?;
            let album_name: Option<String> = row.get(4)?;
            Ok(PlaylistTrack {
                id: row.get(0)?,
                name: row.get(1)?,
                length: row.get(2)?,
                album: album_id
                    .zip(album_name)
                    .map(|(id, name)| EntityLink { id, name }),
                artist: EntityLink {
                    id: row.get(5)?,
                    name: row.get(6)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PlaylistDetail {
        id,
        name,
        cover,
        owner: owner.unwrap_or_default(),
        tracks,
    })
}

#[async_trait]
impl CatalogStore for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn current_user(&self) -> Result<Option<User>, StoreError> {
        self.with_conn(query_user).await
    }

    async fn artists(&self, limit: Option<usize>) -> Result<Vec<ArtistCard>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, picture FROM artists ORDER BY rowid LIMIT ?1")?;
            let rows = stmt.query_map(params![sql_limit(limit)], |row| {
                Ok(ArtistCard {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    picture: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn albums(&self, limit: Option<usize>) -> Result<Vec<AlbumCard>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, cover FROM albums ORDER BY rowid LIMIT ?1")?;
            let rows = stmt.query_map(params![sql_limit(limit)], |row| {
                Ok(AlbumCard {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    cover: row.get(2)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn playlists(&self, limit: Option<usize>) -> Result<Vec<PlaylistCard>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.name, p.cover, u.name FROM playlists p \
                 LEFT JOIN users u ON u.id = p.user_id ORDER BY p.rowid LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![sql_limit(limit)], |row| {
                Ok(PlaylistCard {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    cover: row.get(2)?,
                    owner: row.get(3)?,
                })
            })?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }

    async fn album(&self, id: &str) -> Result<AlbumDetail, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| query_album(conn, &id)).await
    }

    async fn artist(&self, id: &str) -> Result<ArtistDetail, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| query_artist(conn, &id)).await
    }

    async fn playlist(&self, id: &str) -> Result<PlaylistDetail, StoreError> {
        let id = id.to_string();
        self.with_conn(move |conn| query_playlist(conn, &id)).await
    }

    async fn ids(&self, kind: EntityKind) -> Result<Vec<String>, StoreError> {
        let table = match kind {
            EntityKind::Album => "albums",
            EntityKind::Artist => "artists",
            EntityKind::Playlist => "playlists",
        };
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT id FROM {table} ORDER BY rowid"))?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
        .await
    }
}
