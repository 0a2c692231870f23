//! # Two-Way Binding Adapter
//!
//! Decouples UI-local state from the synchronizer. The binding holds the
//! current board and two independent listener sets: "external" listeners
//! fire on load/reload (the document changed underneath the UI), "internal"
//! listeners fire on UI-driven edits. Keeping the sets separate prevents an
//! internally-originated edit from being mistaken for an external one,
//! which would loop updates back into the UI that produced them.

use std::sync::{Arc, Mutex};

use boardwalk_parser::Entity;

type Listener = Arc<dyn Fn(&Entity) + Send + Sync>;

/// Handle returned on registration; passing it back unsubscribes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(usize);

#[derive(Default)]
struct BindingInner {
    board: Option<Entity>,
    external: Vec<(usize, Listener)>,
    internal: Vec<(usize, Listener)>,
    next_handle: usize,
}

/// Shared board state with origin-separated change notification
pub struct BoardBinding {
    inner: Mutex<BindingInner>,
}

impl BoardBinding {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(BindingInner::default()),
        }
    }

    /// Snapshot of the current board, if one has been published
    pub fn board(&self) -> Option<Entity> {
        self.inner.lock().unwrap().board.clone()
    }

    /// Register a listener for externally-originated updates (load, reload
    /// after an on-disk change)
    pub fn on_external(&self, listener: impl Fn(&Entity) + Send + Sync + 'static) -> ListenerHandle {
        let mut inner = self.inner.lock().unwrap();
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.external.push((handle, Arc::new(listener)));
        ListenerHandle(handle)
    }

    /// Register a listener for internally-originated updates (UI edits)
    pub fn on_internal(&self, listener: impl Fn(&Entity) + Send + Sync + 'static) -> ListenerHandle {
        let mut inner = self.inner.lock().unwrap();
        let handle = inner.next_handle;
        inner.next_handle += 1;
        inner.internal.push((handle, Arc::new(listener)));
        ListenerHandle(handle)
    }

    pub fn unsubscribe(&self, handle: ListenerHandle) {
        let mut inner = self.inner.lock().unwrap();
        inner.external.retain(|(id, _)| *id != handle.0);
        inner.internal.retain(|(id, _)| *id != handle.0);
    }

    /// Publish an externally-originated board; only external listeners run
    pub fn set_external(&self, board: Entity) {
        let listeners = {
            let mut inner = self.inner.lock().unwrap();
            inner.board = Some(board.clone());
            inner.external.iter().map(|(_, l)| l.clone()).collect::<Vec<_>>()
        };
        for listener in listeners {
            listener(&board);
        }
    }

    /// Publish an internally-originated board; only internal listeners run
    pub fn set_internal(&self, board: Entity) {
        let listeners = {
            let mut inner = self.inner.lock().unwrap();
            inner.board = Some(board.clone());
            inner.internal.iter().map(|(_, l)| l.clone()).collect::<Vec<_>>()
        };
        for listener in listeners {
            listener(&board);
        }
    }
}

impl Default for BoardBinding {
    fn default() -> Self {
        Self::new()
    }
}
