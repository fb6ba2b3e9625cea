//! Page route matching module
//!
//! Maps a request path (after the edge rule) to the page it names.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::catalog::EntityKind;

/// Bytes escaped when an id is written into a path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode an id for use as one path segment
pub fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT).to_string()
}

/// A routable page; detail pages carry their optional id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    AlbumList,
    Album(Option<String>),
    ArtistList,
    Artist(Option<String>),
    PlaylistList,
    Playlist(Option<String>),
}

impl Page {
    fn list(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Album => Self::AlbumList,
            EntityKind::Artist => Self::ArtistList,
            EntityKind::Playlist => Self::PlaylistList,
        }
    }

    fn detail(kind: EntityKind, id: Option<String>) -> Self {
        match kind {
            EntityKind::Album => Self::Album(id),
            EntityKind::Artist => Self::Artist(id),
            EntityKind::Playlist => Self::Playlist(id),
        }
    }

    /// Entity kind of a detail page
    pub const fn detail_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Album(_) => Some(EntityKind::Album),
            Self::Artist(_) => Some(EntityKind::Artist),
            Self::Playlist(_) => Some(EntityKind::Playlist),
            Self::Home | Self::AlbumList | Self::ArtistList | Self::PlaylistList => None,
        }
    }
}

/// A matched page and the namespace it was requested in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRoute {
    pub page: Page,
    /// True for paths under the cached (statically generated) namespace
    pub cached: bool,
}

/// Match a path against the page routes
///
/// Trailing slashes are ignored and detail ids are percent-decoded. Returns
/// `None` for paths that name no page, or ids that do not decode to UTF-8.
pub fn match_page(path: &str, cached_prefix: &str) -> Option<PageRoute> {
    let (rest, cached) = strip_namespace(path, cached_prefix);

    let mut segments = rest.trim_matches('/').split('/');
    let page = match (segments.next(), segments.next(), segments.next()) {
        (Some(""), None, None) => Page::Home,
        (Some(kind), None, None) => Page::list(EntityKind::from_segment(kind)?),
        (Some(kind), Some(id), None) => {
            let id = percent_decode_str(id).decode_utf8().ok()?;
            let id = (!id.is_empty()).then(|| id.into_owned());
            Page::detail(EntityKind::from_segment(kind)?, id)
        }
        _ => return None,
    };

    Some(PageRoute { page, cached })
}

/// Canonical path of a page under `prefix` (empty prefix for the request-time pages)
pub fn page_path(page: &Page, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    match page {
        Page::Home => format!("{prefix}/"),
        Page::AlbumList => format!("{prefix}/album"),
        Page::ArtistList => format!("{prefix}/artist"),
        Page::PlaylistList => format!("{prefix}/playlist"),
        Page::Album(id) | Page::Artist(id) | Page::Playlist(id) => {
            let kind = page.detail_kind().map_or("", EntityKind::segment);
            let id = id.as_deref().map(encode_segment).unwrap_or_default();
            format!("{prefix}/{kind}/{id}")
        }
    }
}

fn strip_namespace<'a>(path: &'a str, cached_prefix: &str) -> (&'a str, bool) {
    let prefix = cached_prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return (path, false);
    }
    match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => (rest, true),
        _ => (path, false),
    }
}
