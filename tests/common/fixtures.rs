//! Raw dataset fixtures written to a temporary directory

use super::constants::*;
use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// A NextSong event by the default test user.
pub fn next_song_event(song: &str, artist: &str, ts: i64, level: &str) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Ada",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Lovelace",
        "length": 218.93179,
        "level": level,
        "location": "London, UK",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540919166796.0,
        "sessionId": 100,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": USER_ID.to_string()
    })
}

/// A page view that is not a song play.
pub fn home_event(user_id: &str, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged In",
        "firstName": "Bob",
        "gender": "M",
        "itemInSession": 1,
        "lastName": "Builder",
        "length": null,
        "level": "free",
        "location": "Leeds, UK",
        "method": "GET",
        "page": "Home",
        "registration": 1540919166796.0,
        "sessionId": 200,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

pub fn song_record(song_id: &str, title: &str, artist_id: &str, artist_name: &str) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": 218.93179,
        "year": 2021
    })
}

pub fn test_song() -> Value {
    song_record(SONG_1_ID, SONG_1_TITLE, ARTIST_1_ID, ARTIST_1_NAME)
}

/// Writes the event log as newline-delimited JSON and every song record in
/// its own file, nested the way the song dataset is.
pub fn write_datasets(root: &Path, events: &[Value], songs: &[Value]) -> Result<()> {
    let log_dir = root.join("log_data").join("2021").join("01");
    fs::create_dir_all(&log_dir)?;
    let lines: Vec<String> = events.iter().map(Value::to_string).collect();
    fs::write(log_dir.join("2021-01-01-events.json"), lines.join("\n"))?;

    let song_dir = root.join("song_data").join("A").join("B");
    fs::create_dir_all(&song_dir)?;
    for (index, song) in songs.iter().enumerate() {
        fs::write(song_dir.join(format!("TR{:04}.json", index)), song.to_string())?;
    }
    Ok(())
}

/// JSONPaths file selecting every staging_events column by its field name.
pub fn write_jsonpaths(path: &Path, columns: &[&str]) -> Result<()> {
    let paths: Vec<String> = columns.iter().map(|c| format!("$['{}']", c)).collect();
    fs::write(path, json!({ "jsonpaths": paths }).to_string())?;
    Ok(())
}

pub fn write_config(
    path: &Path,
    root: &Path,
    db_path: &Path,
    log_jsonpath: Option<&Path>,
) -> Result<()> {
    let jsonpath_line = log_jsonpath
        .map(|p| format!("LOG_JSONPATH = '{}'\n", p.display()))
        .unwrap_or_default();
    let content = format!(
        r#"[S3]
LOG_DATA = '{}'
{}SONG_DATA = '{}'

[WAREHOUSE]
backend = "sqlite"
sqlite_path = '{}'
"#,
        root.join("log_data").display(),
        jsonpath_line,
        root.join("song_data").display(),
        db_path.display()
    );
    fs::write(path, content)?;
    Ok(())
}
