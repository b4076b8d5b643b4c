//! Scene payload codec.
//!
//! The wire format is standard base64 over the UTF-8 bytes of a pretty
//! JSON envelope. Remote contents APIs store and return the base64 text
//! directly, so encoding here is the last step before transport and
//! decoding the first step after it.

use super::{StoreError, StoreResult};
use crate::scene::{Attachment, AttachmentId, Element, SceneSnapshot, ViewerState};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Format tag identifying an InkVault scene file.
pub const FORMAT_TAG: &str = "inkvault-scene";

/// Current format version.
pub const FORMAT_VERSION: u32 = 2;

/// Provenance string written into every payload.
const SOURCE: &str = concat!("inkvault/", env!("CARGO_PKG_VERSION"));

/// On-disk envelope around a snapshot.
#[derive(Serialize, Deserialize)]
struct SceneFile {
    #[serde(rename = "type")]
    format: String,
    version: u32,
    source: String,
    elements: Vec<Element>,
    #[serde(rename = "viewerState")]
    viewer_state: ViewerState,
    #[serde(default)]
    files: HashMap<AttachmentId, Attachment>,
}

/// Encode a snapshot into the transport-safe payload text.
///
/// Attachments are written as given; callers prune orphans first via
/// [`live_attachments`](crate::scene::live_attachments).
pub fn encode_scene(snapshot: &SceneSnapshot) -> StoreResult<String> {
    let file = SceneFile {
        format: FORMAT_TAG.to_string(),
        version: FORMAT_VERSION,
        source: SOURCE.to_string(),
        elements: snapshot.elements.clone(),
        viewer_state: snapshot.viewer.clone(),
        files: snapshot.attachments.clone(),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| StoreError::MalformedPayload(format!("serialize failed: {e}")))?;
    Ok(STANDARD.encode(json.as_bytes()))
}

/// Decode payload text back into a snapshot.
///
/// The remote contents API wraps base64 with newlines, so ASCII
/// whitespace is stripped before decoding. Fails closed on anything
/// that is not a recognizable scene file.
pub fn decode_scene(payload: &str) -> StoreResult<SceneSnapshot> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| StoreError::MalformedPayload(format!("invalid base64: {e}")))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| StoreError::MalformedPayload(format!("invalid utf-8: {e}")))?;
    let file: SceneFile = serde_json::from_str(&json)
        .map_err(|e| StoreError::MalformedPayload(format!("invalid scene json: {e}")))?;

    if file.format != FORMAT_TAG {
        return Err(StoreError::MalformedPayload(format!(
            "unrecognized format tag: {}",
            file.format
        )));
    }
    if file.version > FORMAT_VERSION {
        log::warn!(
            "scene file version {} is newer than supported {}",
            file.version,
            FORMAT_VERSION
        );
    }

    Ok(SceneSnapshot {
        elements: file.elements,
        viewer: file.viewer_state,
        attachments: file.files,
    })
}
