//! Scene snapshot model shared between the host application and storage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Identifier for a binary attachment.
pub type AttachmentId = String;

/// A single drawing element as supplied by the host application.
///
/// Only the fields the bridge inspects are typed. Everything else the
/// host puts on an element is preserved verbatim in `extra`, so a round
/// trip through storage does not lose host data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Host-assigned element identifier.
    pub id: String,
    /// Soft-delete marker. Deleted elements keep no claim on attachments.
    #[serde(default, rename = "isDeleted")]
    pub is_deleted: bool,
    /// Attachment referenced by this element, if any.
    #[serde(
        default,
        rename = "attachmentId",
        skip_serializing_if = "Option::is_none"
    )]
    pub attachment_id: Option<AttachmentId>,
    /// Remaining host-owned properties, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A binary attachment (e.g. a pasted image) referenced by elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Data URL holding the binary content.
    #[serde(rename = "dataUrl")]
    pub data_url: String,
    /// Creation time, epoch milliseconds.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Last retrieval time, epoch milliseconds.
    #[serde(
        default,
        rename = "lastRetrievedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_retrieved_at: Option<i64>,
}

/// The subset of viewer state worth persisting.
///
/// The host tracks far more (zoom, scroll, tool selection); only these
/// two fields survive a save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    /// Grid spacing; absent when the grid is off.
    #[serde(default, rename = "gridSize", skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
}

/// Full serializable state of a document at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub elements: Vec<Element>,
    pub viewer: ViewerState,
    pub attachments: HashMap<AttachmentId, Attachment>,
}

/// Keep exactly the attachments referenced by at least one live element.
///
/// Prevents a payload from accumulating orphaned binaries after their
/// elements are deleted.
pub fn live_attachments(
    elements: &[Element],
    attachments: &HashMap<AttachmentId, Attachment>,
) -> HashMap<AttachmentId, Attachment> {
    let referenced: HashSet<&AttachmentId> = elements
        .iter()
        .filter(|e| !e.is_deleted)
        .filter_map(|e| e.attachment_id.as_ref())
        .collect();

    attachments
        .iter()
        .filter(|(id, _)| referenced.contains(id))
        .map(|(id, attachment)| (id.clone(), attachment.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, deleted: bool, attachment: Option<&str>) -> Element {
        Element {
            id: id.to_string(),
            is_deleted: deleted,
            attachment_id: attachment.map(String::from),
            extra: Map::new(),
        }
    }

    fn attachment(id: &str) -> Attachment {
        Attachment {
            id: id.to_string(),
            mime_type: "image/png".to_string(),
            data_url: format!("data:image/png;base64,{id}"),
            created_at: 1_700_000_000_000,
            last_retrieved_at: None,
        }
    }

    #[test]
    fn test_filter_keeps_live_drops_deleted() {
        let elements = vec![
            element("1", false, Some("a")),
            element("2", true, Some("b")),
        ];
        let attachments = HashMap::from([
            ("a".to_string(), attachment("a")),
            ("b".to_string(), attachment("b")),
        ]);

        let kept = live_attachments(&elements, &attachments);

        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("a"));
    }

    #[test]
    fn test_filter_drops_unreferenced() {
        let elements = vec![element("1", false, None)];
        let attachments = HashMap::from([("orphan".to_string(), attachment("orphan"))]);

        assert!(live_attachments(&elements, &attachments).is_empty());
    }

    #[test]
    fn test_filter_keeps_shared_attachment() {
        let elements = vec![
            element("1", true, Some("a")),
            element("2", false, Some("a")),
        ];
        let attachments = HashMap::from([("a".to_string(), attachment("a"))]);

        assert_eq!(live_attachments(&elements, &attachments).len(), 1);
    }

    #[test]
    fn test_element_preserves_host_properties() {
        let json = r##"{
            "id": "el-1",
            "isDeleted": false,
            "strokeColor": "#ff0000",
            "points": [[0, 0], [10, 20]]
        }"##;

        let parsed: Element = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.extra["strokeColor"], "#ff0000");

        // Flattened fields come back at the top level.
        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["strokeColor"], "#ff0000");
        assert_eq!(value["points"][1][1], 20);
    }

    #[test]
    fn test_element_missing_flags_default() {
        let parsed: Element = serde_json::from_str(r#"{"id": "el-1"}"#).unwrap();
        assert!(!parsed.is_deleted);
        assert!(parsed.attachment_id.is_none());
    }
}
