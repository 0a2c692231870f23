//! # Document Synchronizer
//!
//! Owns the canonical board for one open document and coordinates the full
//! lifecycle: load, UI edits, debounced persistence, and reconciliation
//! when the backing file changes outside this session.
//!
//! All tree work is pure and synchronous; this module is the thin effectful
//! shell around it. The file capability is injected, never reached for
//! ambiently.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use boardwalk_common::FileSystem;
use boardwalk_editor::{Mutation, MutationContext};
use boardwalk_parser::{
    parse_with_path, serialize, Entity, EntityData, ErrorReport, IdGenerator, ParseError,
    ParserConfig,
};

use crate::binding::BoardBinding;

/// Consecutive save failures tolerated before the error surfaces
const MAX_SAVE_FAILURES: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Mutation failed: {0}")]
    Mutation(#[from] boardwalk_editor::MutationError),

    #[error("File error: {0}")]
    File(#[from] boardwalk_common::CommonError),

    #[error("No board loaded")]
    NotLoaded,
}

struct SyncState {
    board: Option<Entity>,
    ids: IdGenerator,
    /// Bumped on every accepted edit and on external replacement; a pending
    /// debounced write only lands if its generation is still current
    generation: u64,
    /// CRC32 of the text most recently written by this session, used to
    /// recognize watcher echoes of our own saves
    last_written: Option<u32>,
    save_failures: u32,
}

/// Synchronizer for one open board document
pub struct DocumentSynchronizer {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    base_config: ParserConfig,
    debounce: Duration,
    state: Arc<Mutex<SyncState>>,
    binding: Arc<BoardBinding>,
}

impl DocumentSynchronizer {
    pub fn new(fs: Arc<dyn FileSystem>, path: PathBuf, base_config: ParserConfig) -> Self {
        Self::with_debounce(fs, path, base_config, Duration::from_millis(400))
    }

    pub fn with_debounce(
        fs: Arc<dyn FileSystem>,
        path: PathBuf,
        base_config: ParserConfig,
        debounce: Duration,
    ) -> Self {
        let seed_path = path.display().to_string();
        Self {
            fs,
            path,
            base_config,
            debounce,
            state: Arc::new(Mutex::new(SyncState {
                board: None,
                ids: IdGenerator::new(&seed_path),
                generation: 0,
                last_written: None,
                save_failures: 0,
            })),
            binding: Arc::new(BoardBinding::new()),
        }
    }

    /// The binding UI code subscribes to
    pub fn binding(&self) -> Arc<BoardBinding> {
        self.binding.clone()
    }

    /// Snapshot of the canonical board
    pub fn board(&self) -> Result<Entity, StateError> {
        self.state
            .lock()
            .unwrap()
            .board
            .clone()
            .ok_or(StateError::NotLoaded)
    }

    /// Read and parse the document, publishing it as an external update
    pub fn load(&self) -> Result<(), StateError> {
        let text = self.fs.read_to_string(&self.path)?;
        let board = self.parse_text(&text)?;

        {
            let mut state = self.state.lock().unwrap();
            state.board = Some(board.clone());
            state.generation += 1;
        }

        debug!(path = %self.path.display(), "document loaded");
        self.binding.set_external(board);
        Ok(())
    }

    /// Apply a UI-driven mutation.
    ///
    /// On success the new board publishes to internal listeners and a
    /// coalescing save is scheduled. On failure the previous board is
    /// retained, the error is recorded on `board.errors`, and the caller
    /// gets it back as a value.
    pub fn apply(&self, mutation: &Mutation) -> Result<(), StateError> {
        let outcome = {
            let mut state = self.state.lock().unwrap();
            let Some(board) = state.board.clone() else {
                return Err(StateError::NotLoaded);
            };

            let config = effective_config(&board, &self.base_config);
            let mut ids = state.ids.clone();
            let result = {
                let mut ctx = MutationContext {
                    config: &config,
                    ids: &mut ids,
                    now: Some(chrono::Local::now().naive_local()),
                };
                mutation.apply(&board, &mut ctx)
            };

            match result {
                Ok(next) => {
                    state.ids = ids;
                    state.board = Some(next.clone());
                    state.generation += 1;
                    Ok((next, state.generation))
                }
                Err(err) => {
                    let flagged = with_error_report(
                        &board,
                        ErrorReport::new(err.to_string(), format!("{:?}", err)),
                    );
                    state.board = Some(flagged.clone());
                    Err((flagged, err))
                }
            }
        };

        match outcome {
            Ok((board, generation)) => {
                self.binding.set_internal(board);
                self.schedule_save(generation);
                Ok(())
            }
            Err((board, err)) => {
                warn!(error = %err, "mutation rejected");
                self.binding.set_internal(board);
                Err(err.into())
            }
        }
    }

    /// Handle a notification that the backing file changed on disk.
    ///
    /// An echo of our own last write is ignored; a genuinely external edit
    /// wins wholesale: the document is reparsed and any not-yet-persisted
    /// in-memory edits are discarded.
    pub fn notify_external_change(&self) -> Result<(), StateError> {
        let text = self.fs.read_to_string(&self.path)?;
        let incoming = fingerprint(&text);

        {
            let state = self.state.lock().unwrap();
            if state.last_written == Some(incoming) {
                debug!("ignoring echo of our own write");
                return Ok(());
            }
        }

        let board = self.parse_text(&text)?;
        {
            let mut state = self.state.lock().unwrap();
            state.board = Some(board.clone());
            // orphan any pending debounced writes
            state.generation += 1;
        }

        debug!(path = %self.path.display(), "external change adopted");
        self.binding.set_external(board);
        Ok(())
    }

    /// Serialize and write the current board immediately
    pub fn save_now(&self) -> Result<(), StateError> {
        let board = self.board()?;
        self.write_board(&board)
    }

    fn parse_text(&self, text: &str) -> Result<Entity, StateError> {
        let seed_path = self.path.display().to_string();
        Ok(parse_with_path(text, &seed_path, &self.base_config)?)
    }

    fn write_board(&self, board: &Entity) -> Result<(), StateError> {
        let text = serialize(board);
        self.fs.write(&self.path, &text)?;

        let mut state = self.state.lock().unwrap();
        state.last_written = Some(fingerprint(&text));
        state.save_failures = 0;
        Ok(())
    }

    /// Trailing-edge debounce: sleep the window, then write only if no
    /// newer edit arrived in the meantime. Superseded writes are dropped,
    /// never queued; only the most recent board reaches disk.
    fn schedule_save(&self, generation: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime; persistence deferred to save_now");
            return;
        };

        let fs = self.fs.clone();
        let path = self.path.clone();
        let state = self.state.clone();
        let debounce = self.debounce;

        handle.spawn(async move {
            tokio::time::sleep(debounce).await;

            let board = {
                let state = state.lock().unwrap();
                if state.generation != generation {
                    debug!("pending write superseded, dropping");
                    return;
                }
                state.board.clone()
            };

            let Some(board) = board else {
                return;
            };

            let text = serialize(&board);
            match fs.write(&path, &text) {
                Ok(()) => {
                    let mut state = state.lock().unwrap();
                    state.last_written = Some(fingerprint(&text));
                    state.save_failures = 0;
                }
                Err(err) => {
                    let failures = {
                        let mut state = state.lock().unwrap();
                        state.save_failures += 1;
                        state.save_failures
                    };
                    warn!(error = %err, failures, "debounced save failed");

                    if failures >= MAX_SAVE_FAILURES {
                        // surface through the board rather than losing it
                        let flagged = with_error_report(
                            &board,
                            ErrorReport::new(
                                format!("Save failed after {failures} attempts: {err}"),
                                format!("{:?}", err),
                            ),
                        );
                        let mut state = state.lock().unwrap();
                        state.board = Some(flagged);
                    } else {
                        // retried on the next debounce cycle
                        tokio::time::sleep(debounce).await;
                        let retry = {
                            let state = state.lock().unwrap();
                            (state.generation == generation).then(|| state.board.clone()).flatten()
                        };
                        if let Some(board) = retry {
                            let text = serialize(&board);
                            if fs.write(&path, &text).is_ok() {
                                let mut state = state.lock().unwrap();
                                state.last_written = Some(fingerprint(&text));
                                state.save_failures = 0;
                            }
                        }
                    }
                }
            }
        });
    }
}

/// Cheap text fingerprint for self-write echo suppression
pub fn fingerprint(text: &str) -> u32 {
    crc32fast::hash(text.as_bytes())
}

/// The document's own settings layered over the host configuration
fn effective_config(board: &Entity, base: &ParserConfig) -> ParserConfig {
    match board.as_board() {
        Some(data) => data.settings.apply_to(base),
        None => base.clone(),
    }
}

/// Through-copy append of an error report to the board's error list
fn with_error_report(board: &Entity, report: ErrorReport) -> Entity {
    let mut copy = board.clone();
    if let EntityData::Board(data) = &mut copy.data {
        data.errors.push(report);
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardwalk_common::MemoryFileSystem;

    fn synchronizer(contents: &str) -> DocumentSynchronizer {
        let path = PathBuf::from("/boards/test.md");
        let fs = Arc::new(MemoryFileSystem::with_file(path.clone(), contents));
        DocumentSynchronizer::with_debounce(
            fs,
            path,
            ParserConfig::default(),
            Duration::from_millis(10),
        )
    }

    #[test]
    fn test_load_publishes_external() {
        let sync = synchronizer("## Todo\n\n- [ ] a\n");
        let binding = sync.binding();

        let seen = Arc::new(Mutex::new(0usize));
        {
            let seen = seen.clone();
            binding.on_external(move |board| {
                *seen.lock().unwrap() = board.children.len();
            });
        }

        sync.load().unwrap();
        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(sync.board().unwrap().children.len(), 1);
    }

    #[test]
    fn test_apply_before_load_fails() {
        let sync = synchronizer("## Todo\n");
        let err = sync
            .apply(&Mutation::DeleteEntity { path: vec![0] })
            .unwrap_err();
        assert!(matches!(err, StateError::NotLoaded));
    }

    #[test]
    fn test_failed_mutation_keeps_board_and_records_error() {
        let sync = synchronizer("## Todo\n\n- [ ] a\n");
        sync.load().unwrap();

        let err = sync
            .apply(&Mutation::DeleteEntity { path: vec![7, 7] })
            .unwrap_err();
        assert!(matches!(err, StateError::Mutation(_)));

        let board = sync.board().unwrap();
        assert_eq!(board.children[0].children.len(), 1);
        assert_eq!(board.as_board().unwrap().errors.len(), 1);
    }

    #[test]
    fn test_echo_of_own_write_is_ignored() {
        let sync = synchronizer("## Todo\n\n- [ ] a\n");
        sync.load().unwrap();
        sync.save_now().unwrap();

        let seen = Arc::new(Mutex::new(0usize));
        {
            let seen = seen.clone();
            sync.binding().on_external(move |_| {
                *seen.lock().unwrap() += 1;
            });
        }

        // watcher reports the file we just wrote ourselves
        sync.notify_external_change().unwrap();
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn test_external_edit_wins() {
        let path = PathBuf::from("/boards/test.md");
        let fs = Arc::new(MemoryFileSystem::with_file(path.clone(), "## Todo\n"));
        let sync = DocumentSynchronizer::with_debounce(
            fs.clone(),
            path.clone(),
            ParserConfig::default(),
            Duration::from_millis(10),
        );
        sync.load().unwrap();

        fs.add_file(path, "## Rewritten Elsewhere\n\n- [ ] new\n".to_string());
        sync.notify_external_change().unwrap();

        let board = sync.board().unwrap();
        assert_eq!(
            board.children[0].as_lane().unwrap().title,
            "Rewritten Elsewhere"
        );
    }
}
