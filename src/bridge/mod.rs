//! The memory bridge: resolves where an invocation's data lives and turns CLI
//! requests into calls against an [`EngineProvider`](crate::engine::EngineProvider).
//!
//! Every operation returns a serializable response value. Engine failures are
//! folded into that value, so callers only branch on `success` / `ready`.

pub mod location;
pub mod recall;
pub mod save;
pub mod status;

pub use location::{select_location, StorageLocation};
pub use recall::{recall, RecallResponse};
pub use save::{save, save_conversation, SaveRequest, SaveResponse};
pub use status::{check_status, StatusReport};
