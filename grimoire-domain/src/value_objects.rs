// Domain value objects
pub mod ability;
pub mod identifiers;
pub mod reference_kind;

pub use ability::*;
pub use identifiers::*;
pub use reference_kind::*;
