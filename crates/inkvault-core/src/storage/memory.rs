//! In-memory remote store for tests and ephemeral use.

use super::{BoxFuture, RemoteStore, StoreError, StoreResult};
use std::sync::{Arc, RwLock};

/// The shared "remote side": current payload plus a revision counter
/// backing the version tokens.
#[derive(Default)]
struct Slot {
    payload: Option<String>,
    revision: u64,
}

fn rev_token(revision: u64) -> String {
    format!("rev-{revision}")
}

/// In-memory store mimicking a remote contents API, including its
/// overwrite discipline: a write must carry the version token from the
/// latest read or write of the file, or no token at all when creating.
///
/// [`fork`](MemoryStore::fork) produces a second handle onto the same
/// stored file with its own held token, which is how a stale-writer
/// conflict is reproduced in tests.
pub struct MemoryStore {
    slot: Arc<RwLock<Slot>>,
    token: RwLock<Option<String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a store with no file yet.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot::default())),
            token: RwLock::new(None),
        }
    }

    /// Second client of the same stored file, holding no token yet.
    pub fn fork(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            token: RwLock::new(None),
        }
    }

    /// Number of writes the file has received.
    pub fn revision(&self) -> u64 {
        self.slot.read().map(|s| s.revision).unwrap_or(0)
    }

    /// Currently stored payload, if any.
    pub fn payload(&self) -> Option<String> {
        self.slot.read().ok().and_then(|s| s.payload.clone())
    }
}

impl RemoteStore for MemoryStore {
    fn is_configured(&self) -> bool {
        true
    }

    fn fetch(&self) -> BoxFuture<'_, StoreResult<Option<String>>> {
        Box::pin(async move {
            let (payload, revision) = {
                let slot = self
                    .slot
                    .read()
                    .map_err(|e| StoreError::RemoteUnavailable(format!("lock poisoned: {e}")))?;
                (slot.payload.clone(), slot.revision)
            };

            let Some(payload) = payload else {
                return Ok(None);
            };

            let mut token = self
                .token
                .write()
                .map_err(|e| StoreError::RemoteUnavailable(format!("lock poisoned: {e}")))?;
            *token = Some(rev_token(revision));
            Ok(Some(payload))
        })
    }

    fn store(&self, payload: &str) -> BoxFuture<'_, StoreResult<()>> {
        let payload = payload.to_string();
        Box::pin(async move {
            let held = self
                .token
                .read()
                .map_err(|e| StoreError::RemoteUnavailable(format!("lock poisoned: {e}")))?
                .clone();

            let new_token = {
                let mut slot = self
                    .slot
                    .write()
                    .map_err(|e| StoreError::RemoteUnavailable(format!("lock poisoned: {e}")))?;

                let expected = slot.payload.is_some().then(|| rev_token(slot.revision));
                if held != expected {
                    return Err(StoreError::RemoteUnavailable(format!(
                        "version conflict: held {held:?}, expected {expected:?}"
                    )));
                }

                slot.revision += 1;
                slot.payload = Some(payload);
                rev_token(slot.revision)
            };

            let mut token = self
                .token
                .write()
                .map_err(|e| StoreError::RemoteUnavailable(format!("lock poisoned: {e}")))?;
            *token = Some(new_token);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        // Simple blocking executor for tests
        use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

        fn dummy_raw_waker() -> RawWaker {
            fn no_op(_: *const ()) {}
            fn clone(_: *const ()) -> RawWaker {
                dummy_raw_waker()
            }
            static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
            RawWaker::new(std::ptr::null(), &VTABLE)
        }

        let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
        let mut cx = Context::from_waker(&waker);
        let mut f = std::pin::pin!(f);

        loop {
            match f.as_mut().poll(&mut cx) {
                Poll::Ready(result) => return result,
                Poll::Pending => {}
            }
        }
    }

    #[test]
    fn test_fetch_empty_is_none() {
        let store = MemoryStore::new();
        assert!(block_on(store.fetch()).unwrap().is_none());
    }

    #[test]
    fn test_create_then_fetch() {
        let store = MemoryStore::new();

        block_on(store.store("payload-1")).unwrap();
        assert_eq!(store.revision(), 1);
        assert_eq!(
            block_on(store.fetch()).unwrap().as_deref(),
            Some("payload-1")
        );
    }

    #[test]
    fn test_successive_writes_chain_tokens() {
        let store = MemoryStore::new();

        block_on(store.store("one")).unwrap();
        block_on(store.store("two")).unwrap();

        assert_eq!(store.revision(), 2);
        assert_eq!(store.payload().as_deref(), Some("two"));
    }

    #[test]
    fn test_fresh_client_must_fetch_before_overwrite() {
        let store = MemoryStore::new();
        block_on(store.store("one")).unwrap();

        // A fork holds no token, so blind overwrite is rejected.
        let other = store.fork();
        let result = block_on(other.store("clobber"));
        assert!(matches!(result, Err(StoreError::RemoteUnavailable(_))));

        // After fetching the current revision the write goes through.
        block_on(other.fetch()).unwrap();
        block_on(other.store("two")).unwrap();
        assert_eq!(store.payload().as_deref(), Some("two"));
    }

    #[test]
    fn test_stale_token_conflicts() {
        let store = MemoryStore::new();
        block_on(store.store("one")).unwrap();

        let other = store.fork();
        block_on(other.fetch()).unwrap();
        block_on(other.store("two")).unwrap();

        // The first client's token still names revision 1.
        let result = block_on(store.store("three"));
        assert!(matches!(result, Err(StoreError::RemoteUnavailable(_))));
        assert_eq!(store.payload().as_deref(), Some("two"));
    }
}
