// HTML rendering of loaded pages
// Aggregates (durations, play counts) are computed here, never in loaders

use chrono::{DateTime, Datelike};
use std::fmt::Write;

use crate::catalog::format::{format_count, format_duration, format_duration_short};
use crate::catalog::{AlbumCard, ArtistCard, PlaylistCard, Song, User};
use crate::loader::{
    AlbumListPage, AlbumPage, ArtistListPage, ArtistPage, HomePage, PageData, PageProps,
    PlaylistListPage, PlaylistPage,
};
use crate::routing::encode_segment;

/// Songs listed on an artist page
const ARTIST_TOP_SONGS: usize = 5;

/// Render a complete HTML document
pub fn render_document(props: &PageProps, site_title: &str) -> String {
    let (title, user, body) = match &props.data {
        PageData::Home(page) => (site_title.to_string(), &page.user, home(page)),
        PageData::AlbumList(page) => (
            format!("Albums | {site_title}"),
            &page.user,
            album_list(page),
        ),
        PageData::Album(page) => (
            format!("{} | Albums | {site_title}", page.album.name),
            &page.user,
            album(page),
        ),
        PageData::ArtistList(page) => (
            format!("Artists | {site_title}"),
            &page.user,
            artist_list(page),
        ),
        PageData::Artist(page) => (
            format!("{} | Artists | {site_title}", page.artist.name),
            &page.user,
            artist(page),
        ),
        PageData::PlaylistList(page) => (
            format!("Playlists | {site_title}"),
            &page.user,
            playlist_list(page),
        ),
        PageData::Playlist(page) => (
            format!("{} | Playlists | {site_title}", page.playlist.name),
            &page.user,
            playlist(page),
        ),
    };

    let footer = if props.is_caching {
        "Served from the static page cache"
    } else {
        "Rendered on request"
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n{}<main>\n{body}</main>\n\
         <footer data-caching=\"{}\">{footer}</footer>\n</body>\n</html>\n",
        escape(&title),
        sidebar(user.as_ref()),
        props.is_caching,
    )
}

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// An id as it appears inside an href
fn link_id(id: &str) -> String {
    escape(&encode_segment(id))
}

fn sidebar(user: Option<&User>) -> String {
    let mut out = String::from("<nav>\n<a href=\"/\">Home</a> <a href=\"/artist\">Artists</a> \
        <a href=\"/album\">Albums</a> <a href=\"/playlist\">Playlists</a>\n");
    if let Some(user) = user {
        let _ = writeln!(out, "<p class=\"user\">{}</p>\n<ul>", escape(&user.name));
        for playlist in &user.playlists {
            let _ = writeln!(
                out,
                "<li><a href=\"/playlist/{}\">{}</a></li>",
                link_id(&playlist.id),
                escape(&playlist.name)
            );
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</nav>\n");
    out
}

fn card(out: &mut String, href: &str, image: &str, name: &str) {
    let _ = writeln!(
        out,
        "<div class=\"card\"><a href=\"{href}\"><img src=\"{}\" width=\"250\" height=\"250\" alt=\"\"></a>\
         <a href=\"{href}\">{}</a></div>",
        escape(image),
        escape(name)
    );
}

fn artist_cards(out: &mut String, artists: &[ArtistCard]) {
    for a in artists {
        card(out, &format!("/artist/{}", link_id(&a.id)), &a.picture, &a.name);
    }
}

fn album_cards(out: &mut String, albums: &[AlbumCard]) {
    for a in albums {
        card(out, &format!("/album/{}", link_id(&a.id)), &a.cover, &a.name);
    }
}

fn playlist_cards(out: &mut String, playlists: &[PlaylistCard]) {
    for p in playlists {
        card(out, &format!("/playlist/{}", link_id(&p.id)), &p.cover, &p.name);
        if let Some(owner) = &p.owner {
            let _ = writeln!(out, "<div class=\"owner\">Created by {}</div>", escape(owner));
        }
    }
}

fn home(page: &HomePage) -> String {
    let mut out = String::from("<h2>Home</h2>\n<h3>Featured Artists</h3>\n");
    artist_cards(&mut out, &page.artists);
    out.push_str("<h3>New Albums</h3>\n");
    album_cards(&mut out, &page.albums);
    out.push_str("<h3>Featured Playlists</h3>\n");
    playlist_cards(&mut out, &page.playlists);
    out
}

fn album_list(page: &AlbumListPage) -> String {
    let mut out = String::from("<h2>Albums</h2>\n");
    album_cards(&mut out, &page.albums);
    out
}

fn artist_list(page: &ArtistListPage) -> String {
    let mut out = String::from("<h2>Artists</h2>\n");
    artist_cards(&mut out, &page.artists);
    out
}

fn playlist_list(page: &PlaylistListPage) -> String {
    let mut out = String::from("<h2>Playlists</h2>\n");
    playlist_cards(&mut out, &page.playlists);
    out
}

/// Song table with play counts, as on album and artist pages
fn song_table<'a>(out: &mut String, songs: impl IntoIterator<Item = &'a Song>) {
    out.push_str("<table class=\"songs\">\n<tr><th>Title</th><th>Played</th><th>Length</th></tr>\n");
    for song in songs {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&song.name),
            format_count(song.play_count()),
            format_duration_short(u64::from(song.length))
        );
    }
    out.push_str("</table>\n");
}

fn album(page: &AlbumPage) -> String {
    let album = &page.album;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<img src=\"{}\" width=\"300\" height=\"300\" alt=\"\">\n<h4>Album</h4>\n<h1>{}</h1>",
        escape(&album.cover),
        escape(&album.name)
    );
    let credits: Vec<String> = album
        .artists
        .iter()
        .map(|a| format!("<a href=\"/artist/{}\">{}</a>", link_id(&a.id), escape(&a.name)))
        .collect();
    let _ = writeln!(
        out,
        "<p class=\"summary\">Created by {} - {} songs, {}</p>",
        credits.join(", "),
        album.songs.len(),
        format_duration(album.total_length())
    );
    song_table(&mut out, &album.songs);
    out
}

fn artist(page: &ArtistPage) -> String {
    let artist = &page.artist;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<header style=\"background-image: url({})\"><h4>Artist</h4><h1>{}</h1></header>",
        escape(&artist.picture),
        escape(&artist.name)
    );
    song_table(&mut out, artist.songs.iter().take(ARTIST_TOP_SONGS));
    out.push_str("<h3>Albums</h3>\n");
    for album in &artist.albums {
        let href = format!("/album/{}", link_id(&album.id));
        card(&mut out, &href, &album.cover, &album.name);
        if let Ok(created) = DateTime::parse_from_rfc3339(&album.created_at) {
            let _ = writeln!(out, "<div class=\"year\">{}</div>", created.year());
        }
    }
    out
}

fn playlist(page: &PlaylistPage) -> String {
    let playlist = &page.playlist;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<img src=\"{}\" width=\"300\" height=\"300\" alt=\"\">\n<h4>Playlist</h4>\n<h1>{}</h1>",
        escape(&playlist.cover),
        escape(&playlist.name)
    );
    let _ = writeln!(
        out,
        "<p class=\"summary\">Created by {} - {} songs, {}</p>",
        escape(&playlist.owner),
        playlist.tracks.len(),
        format_duration(playlist.total_length())
    );
    out.push_str(
        "<table class=\"songs\">\n<tr><th>Title</th><th>Artist</th><th>Album</th><th>Length</th></tr>\n",
    );
    for track in &playlist.tracks {
        let album = track.album.as_ref().map_or_else(String::new, |a| {
            format!("<a href=\"/album/{}\">{}</a>", link_id(&a.id), escape(&a.name))
        });
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td><a href=\"/artist/{}\">{}</a></td><td>{album}</td><td>{}</td></tr>",
            escape(&track.name),
            link_id(&track.artist.id),
            escape(&track.artist.name),
            format_duration_short(u64::from(track.length))
        );
    }
    out.push_str("</table>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AlbumDetail, ArtistAlbum, ArtistDetail, EntityLink, Interaction};

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

    fn album_props(is_caching: bool) -> PageProps {
        PageProps {
            data: PageData::Album(AlbumPage {
                album: AlbumDetail {
                    id: "al1".to_string(),
                    name: "Rock & Roll".to_string(),
                    cover: "/c.jpg".to_string(),
                    artists: vec![EntityLink {
                        id: "ar1".to_string(),
                        name: "<Band>".to_string(),
                    }],
                    songs: vec![
                        song("1", 125, &[10, 0, 5]),
                        song("2", 200, &[1000, 234]),
                        song("3", 95, &[]),
                    ],
                },
                user: Some(User {
                    name: "Ada".to_string(),
                    playlists: vec![],
                }),
            }),
            is_caching,
        }
    }

    #[test]
    fn test_album_page_aggregates() {
        let html = render_document(&album_props(false), "Catalog");
        assert!(html.contains("<title>Rock &amp; Roll | Albums | Catalog</title>"));
        assert!(html.contains("3 songs, 7:00"));
        assert!(html.contains("<td>15</td>"));
        assert!(html.contains("<td>1,234</td>"));
        assert!(html.contains("<td>2:05</td>"));
        assert!(html.contains("&lt;Band&gt;"));
        assert!(html.contains("Rendered on request"));
    }

    #[test]
    fn test_caching_footer() {
        let html = render_document(&album_props(true), "Catalog");
        assert!(html.contains("data-caching=\"true\""));
        assert!(html.contains("static page cache"));
    }

    #[test]
    fn test_artist_page_limits_songs_and_shows_year() {
        let props = PageProps {
            data: PageData::Artist(ArtistPage {
                artist: ArtistDetail {
                    id: "ar1".to_string(),
                    name: "Band".to_string(),
                    picture: "/p.jpg".to_string(),
                    songs: (0..8).map(|i| song(&i.to_string(), 60, &[])).collect(),
                    albums: vec![ArtistAlbum {
                        id: "al1".to_string(),
                        name: "First".to_string(),
                        cover: "/c.jpg".to_string(),
                        created_at: "2021-03-14T10:00:00Z".to_string(),
                    }],
                },
                user: None,
            }),
            is_caching: false,
        };
        let html = render_document(&props, "Catalog");
        assert!(html.contains("Song 4"));
        assert!(!html.contains("Song 5"));
        assert!(html.contains("<div class=\"year\">2021</div>"));
        assert!(!html.contains("class=\"user\""));
    }

    #[test]
    fn test_links_percent_encode_ids() {
        let mut props = album_props(false);
        if let PageData::Album(page) = &mut props.data {
            page.album.artists[0].id = "Nova Drift & co".to_string();
        }
        let html = render_document(&props, "Catalog");
        assert!(html.contains("href=\"/artist/Nova%20Drift%20&amp;%20co\""));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
