//! InkVault Core Library
//!
//! Platform-agnostic scene model and persistence logic for the InkVault
//! drawing bridge: attachment pruning, payload encoding, debounced
//! remote saving, and the session gate.

pub mod gate;
pub mod scene;
pub mod storage;

pub use gate::SessionGate;
pub use scene::{Attachment, AttachmentId, Element, SceneSnapshot, ViewerState, live_attachments};
pub use storage::{
    BoxFuture, DEFAULT_QUIET_PERIOD_MS, MemoryStore, RemoteStore, SaveManager, StoreError,
    StoreResult, decode_scene, encode_scene,
};
