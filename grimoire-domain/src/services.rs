// Pure domain services

pub mod reference_names;
pub mod slug;
pub mod transformer;

pub use reference_names::*;
pub use slug::*;
pub use transformer::*;
