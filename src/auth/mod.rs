//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! login      → storage.rs persists the bearer token
//! request    → http client reads the token before every call
//! 401        → refresh.rs elects one leader, queues the rest
//! logout     → storage.rs forgets the token
//! session.rs → check / on_error policy for the calling surface
//! ```

pub mod refresh;
pub mod session;
pub mod storage;

pub use refresh::{RefreshCoordinator, RefreshGuard, Ticket};
pub use session::{AuthCheck, ErrorAction, Session};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
