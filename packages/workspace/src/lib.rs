//! # Boardwalk Workspace
//!
//! The effectful shell around the pure board engine: one synchronizer per
//! open document, a two-way binding the UI subscribes to, a file watcher
//! feeding external changes back in, and a bounded work queue for
//! rendering-adjacent jobs.
//!
//! ```text
//! file ──read──▶ parser ──▶ board ──▶ binding (external set) ──▶ UI
//!                             ▲                                   │
//!                             │                              modifiers
//!                        mutations ◀────────────────────────────┘
//!                             │
//!                             ▼
//!            binding (internal set) + debounced save ──write──▶ file
//!                                                                │
//! watcher ◀──────────────────────── change notification ─────────┘
//! ```
//!
//! A change notification whose text fingerprint matches our own last write
//! is an echo and is ignored; anything else wins wholesale over in-memory
//! state.

pub mod binding;
pub mod modifiers;
pub mod queue;
pub mod state;
pub mod watcher;

pub use binding::{BoardBinding, ListenerHandle};
pub use modifiers::BoardModifiers;
pub use queue::{QueueStep, WorkQueue, DEFAULT_CONCURRENCY};
pub use state::{fingerprint, DocumentSynchronizer, StateError};
pub use watcher::{FileWatcher, WatcherError, WatcherResult};
