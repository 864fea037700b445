//! Local mirror of the subscribed database location.
//!
//! The streaming API sends the full value once (`put` at `/`) and then
//! incremental `put`/`patch` updates at sub-paths. Applying them to a local
//! JSON tree yields the current value after every event.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::FeedError;
use super::sse::SseEvent;
use crate::source::FeedEvent;

/// A decoded database event.
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseEvent {
    /// Replace the value at `path`.
    Put { path: String, data: Value },
    /// Merge the children of `data` into the value at `path`.
    Patch { path: String, data: Value },
    KeepAlive,
    Cancel,
    AuthRevoked,
}

#[derive(Deserialize)]
struct PathPayload {
    path: String,
    data: Value,
}

impl DatabaseEvent {
    /// Interpret a server-sent event. Unknown event types yield `None`.
    pub fn from_sse(event: &SseEvent) -> Result<Option<Self>, FeedError> {
        let parse = |data: &str| {
            serde_json::from_str::<PathPayload>(data).map_err(|e| FeedError::Parse(e.to_string()))
        };

        let decoded = match event.event.as_str() {
            "put" => {
                let payload = parse(&event.data)?;
                DatabaseEvent::Put {
                    path: payload.path,
                    data: payload.data,
                }
            }
            "patch" => {
                let payload = parse(&event.data)?;
                DatabaseEvent::Patch {
                    path: payload.path,
                    data: payload.data,
                }
            }
            "keep-alive" => DatabaseEvent::KeepAlive,
            "cancel" => DatabaseEvent::Cancel,
            "auth_revoked" => DatabaseEvent::AuthRevoked,
            _ => return Ok(None),
        };
        Ok(Some(decoded))
    }
}

/// The current value of the subscribed location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedDocument {
    root: Value,
}

impl FeedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Replace the value at `path`; `null` deletes it.
    pub fn put(&mut self, path: &str, data: Value) {
        let segments = segments(path);
        match segments.split_last() {
            None => self.root = data,
            Some((last, parents)) => {
                if data.is_null() {
                    if let Some(Value::Object(map)) = lookup_mut(&mut self.root, parents) {
                        map.remove(*last);
                    }
                } else {
                    object_at(&mut self.root, parents).insert(last.to_string(), data);
                }
            }
        }
        prune(&mut self.root);
    }

    /// Merge the children of `data` into the value at `path`.
    pub fn patch(&mut self, path: &str, data: Value) {
        let Value::Object(children) = data else {
            self.put(path, data);
            return;
        };

        let base = path.trim_end_matches('/');
        for (key, value) in children {
            self.put(&format!("{}/{}", base, key), value);
        }
    }

    /// Apply a decoded event. Returns true if the document may have changed.
    pub fn apply(&mut self, event: DatabaseEvent) -> bool {
        match event {
            DatabaseEvent::Put { path, data } => {
                self.put(&path, data);
                true
            }
            DatabaseEvent::Patch { path, data } => {
                self.patch(&path, data);
                true
            }
            _ => false,
        }
    }

    /// Interpret the current value as a feed event.
    pub fn to_event(&self) -> Result<FeedEvent, serde_json::Error> {
        FeedEvent::from_value(self.root.clone())
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn lookup_mut<'a>(mut current: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    for segment in segments {
        current = current.as_object_mut()?.get_mut(*segment)?;
    }
    Some(current)
}

/// Walk to `segments`, turning anything in the way into an object.
fn object_at<'a>(mut current: &'a mut Value, segments: &[&str]) -> &'a mut Map<String, Value> {
    for segment in segments {
        current = ensure_object(current)
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }
    ensure_object(current)
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

/// The database has no empty objects or null children: drop them.
fn prune(value: &mut Value) {
    if let Value::Object(map) = value {
        for child in map.values_mut() {
            prune(child);
        }
        map.retain(|_, child| !child.is_null());
        if map.is_empty() {
            *value = Value::Null;
        }
    }
}
