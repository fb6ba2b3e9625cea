// Test support: a local hyper server standing in for the hosted backend
// Its tables hold the same catalog as the demo seed of the relational store

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::seed::fixtures::demo_seed;
use super::{Seed, SharedStore, SqliteStore};

pub const TEST_API_KEY: &str = "test-key";

/// In-memory relational store loaded with the demo seed
pub fn seeded_sqlite() -> SharedStore {
    let store = SqliteStore::open_in_memory().expect("in-memory database");
    store.apply_seed(&demo_seed()).expect("demo seed applies");
    Arc::new(store)
}

/// Demo catalog plus the entities of `extra` (seed TOML)
pub fn seeded_sqlite_with(extra: &str) -> SharedStore {
    let store = SqliteStore::open_in_memory().expect("in-memory database");
    store.apply_seed(&demo_seed()).expect("demo seed applies");
    store
        .apply_seed(&Seed::parse(extra).expect("extra seed parses"))
        .expect("extra seed applies");
    Arc::new(store)
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client builds")
}

/// PostgREST tables mirroring `seed::fixtures::DEMO_SEED`
///
/// Rows carry the union of every projection's fields; unknown fields are
/// ignored by the decoders.
pub fn demo_tables() -> HashMap<&'static str, Value> {
    let closures = json!({ "id": "al1", "name": "Closures" });
    let lambdas = json!({ "id": "ar1", "name": "The Lambdas" });
    let borrow = json!({ "id": "ar2", "name": "Borrow Checkers" });

    let s1 = json!({ "id": "s1", "name": "Move Semantics", "length": 125,
        "Interaction": [{ "playCount": 10 }, { "playCount": 0 }, { "playCount": 5 }] });
    let s2 = json!({ "id": "s2", "name": "Fn Once", "length": 200,
        "Interaction": [{ "playCount": 1200 }] });
    let s3 = json!({ "id": "s3", "name": "Static Dispatch", "length": 95, "Interaction": [] });
    let s4 = json!({ "id": "s4", "name": "Single", "length": 180, "Interaction": [] });

    let al1 = json!({ "id": "al1", "name": "Closures", "cover": "/img/closures.jpg",
        "createdAt": "2021-03-14T10:00:00Z" });
    let al2 = json!({ "id": "al2", "name": "Lifetimes", "cover": "/img/lifetimes.jpg",
        "createdAt": "2019-07-01T08:30:00Z" });

    let ada = json!({ "name": "Ada" });

    let mut tables = HashMap::new();
    tables.insert(
        "User",
        json!([{ "id": "u1", "name": "Ada", "Playlist": [
            { "id": "p1", "name": "Focus" },
            { "id": "p2", "name": "Empty" }
        ] }]),
    );
    tables.insert(
        "Artist",
        json!([
            { "id": "ar1", "name": "The Lambdas", "picture": "/img/lambdas.jpg",
              "Song": [s1, s2], "_AlbumToArtist": [{ "Album": al1 }] },
            { "id": "ar2", "name": "Borrow Checkers", "picture": "/img/borrow.jpg",
              "Song": [s3, s4], "_AlbumToArtist": [{ "Album": al1 }, { "Album": al2 }] }
        ]),
    );
    tables.insert(
        "Album",
        json!([
            { "id": "al1", "name": "Closures", "cover": "/img/closures.jpg",
              "createdAt": "2021-03-14T10:00:00Z", "Song": [s1, s2, s3],
              "_AlbumToArtist": [{ "Artist": lambdas }, { "Artist": borrow }] },
            { "id": "al2", "name": "Lifetimes", "cover": "/img/lifetimes.jpg",
              "createdAt": "2019-07-01T08:30:00Z", "Song": [],
              "_AlbumToArtist": [{ "Artist": borrow }] }
        ]),
    );
    tables.insert(
        "Playlist",
        json!([
            { "id": "p1", "name": "Focus", "cover": "/img/focus.jpg", "User": ada,
              "_PlaylistToSong": [
                { "Song": { "id": "s2", "name": "Fn Once", "length": 200,
                            "Album": closures, "Artist": lambdas } },
                { "Song": { "id": "s4", "name": "Single", "length": 180,
                            "Album": null, "Artist": borrow } },
                { "Song": { "id": "s1", "name": "Move Semantics", "length": 125,
                            "Album": closures, "Artist": lambdas } }
              ] },
            { "id": "p2", "name": "Empty", "cover": "/img/empty.jpg", "User": ada,
              "_PlaylistToSong": [] }
        ]),
    );
    tables
}

/// Start the fake backend on an ephemeral port and return its base URL
pub async fn spawn_fake_backend(tables: HashMap<&'static str, Value>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    let tables = Arc::new(tables);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tables = Arc::clone(&tables);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let tables = Arc::clone(&tables);
                    async move { Ok::<_, Infallible>(respond(&tables, &req)) }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    format!("http://{addr}")
}

fn respond(tables: &HashMap<&'static str, Value>, req: &Request<Incoming>) -> Response<Full<Bytes>> {
    let authorized = req
        .headers()
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TEST_API_KEY);
    if !authorized {
        return reply(401, &json!({ "message": "invalid api key" }));
    }

    let Some(table) = req.uri().path().strip_prefix("/rest/v1/") else {
        return reply(404, &json!({ "message": "unknown route" }));
    };
    let Some(Value::Array(rows)) = tables.get(table) else {
        return reply(404, &json!({ "message": "unknown table" }));
    };

    let mut rows = rows.clone();
    let mut limit = None;
    for pair in req.uri().query().unwrap_or("").split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        if key == "limit" {
            limit = value.parse::<usize>().ok();
        } else if let Some(expected) = value.strip_prefix("eq.") {
            rows.retain(|row| row.get(key).and_then(Value::as_str) == Some(expected));
        }
    }
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    reply(200, &Value::Array(rows))
}

fn reply(status: u16, body: &Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("valid fake response")
}
