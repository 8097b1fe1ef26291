//! Response envelopes and shape validation.
//!
//! The remote API wraps almost everything in a `Listing`:
//!
//! ```json
//! {"kind": "Listing", "data": {"after": "t3_abc", "children": [{"kind": "t3", "data": {..}}]}}
//! ```
//!
//! Community `about` pages return a single thing (`{"kind": "t5", "data": {..}}`)
//! and thread pages return a two-element array: the post listing followed by
//! the comment listing.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::AttemptError;

/// Expected structure of a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{"data": {"children": [..]}}`
    Listing,
    /// `{"kind": .., "data": {..}}`
    Thing,
    /// `[listing, listing]`
    Thread,
}

impl Shape {
    /// Check that `payload` has this shape.
    ///
    /// An empty `children` array is a valid listing.
    pub fn validate(self, payload: &Value) -> Result<(), AttemptError> {
        let ok = match self {
            Shape::Listing => is_listing(payload),
            Shape::Thing => payload.get("data").is_some_and(Value::is_object),
            Shape::Thread => payload
                .as_array()
                .and_then(|parts| parts.first())
                .is_some_and(is_listing),
        };
        if ok {
            Ok(())
        } else {
            Err(AttemptError::Malformed(format!(
                "expected {} envelope",
                self.as_str()
            )))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::Listing => "listing",
            Shape::Thing => "thing",
            Shape::Thread => "thread",
        }
    }
}

fn is_listing(payload: &Value) -> bool {
    payload
        .get("data")
        .and_then(|data| data.get("children"))
        .is_some_and(Value::is_array)
}

/// A typed child of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing<T = Value> {
    pub kind: String,
    pub data: T,
}

/// The `data` part of a listing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T = Value> {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default = "Vec::new")]
    pub children: Vec<Thing<T>>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            after: None,
            before: None,
            children: Vec::new(),
        }
    }
}

impl Listing {
    /// Read a listing out of a raw envelope.
    ///
    /// Children that are not `{kind, data}` objects are skipped. Returns
    /// `None` if the envelope is not a listing at all.
    pub fn from_envelope(envelope: &Value) -> Option<Self> {
        if !is_listing(envelope) {
            return None;
        }
        let data = &envelope["data"];
        let after = data
            .get("after")
            .and_then(Value::as_str)
            .map(str::to_string);
        let before = data
            .get("before")
            .and_then(Value::as_str)
            .map(str::to_string);
        let children = data["children"]
            .as_array()
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| serde_json::from_value(child.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            after,
            before,
            children,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Envelope returned for requests that resolve without a network call.
pub fn empty_listing() -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": null,
            "before": null,
            "dist": 0,
            "children": []
        }
    })
}

/// Split a thread payload into its post listing and comment listing.
pub fn thread_parts(payload: &Value) -> Option<(Listing, Listing)> {
    let parts = payload.as_array()?;
    let post = Listing::from_envelope(parts.first()?)?;
    let comments = parts
        .get(1)
        .and_then(Listing::from_envelope)
        .unwrap_or_default();
    Some((post, comments))
}
