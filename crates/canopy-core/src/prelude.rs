pub use crate::app::App;
pub use canopy_types::error::{ClResult, Error};
pub use canopy_types::types::{AccountId, NodeId, Patch, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
