// Read-only use cases

pub mod export_queries;
pub mod preview_queries;
pub mod session_queries;

pub use export_queries::*;
pub use preview_queries::*;
pub use session_queries::*;
