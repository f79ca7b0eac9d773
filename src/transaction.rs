//! Transaction module split into types, sender recovery, and overlays

pub mod overlay;
pub mod sender;
pub mod types;

pub use overlay::{OverlayTarget, TransactionOverlay, TxOverrides};
pub use sender::recover_sender;
pub use types::*;
