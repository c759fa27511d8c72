// Domain entities

pub mod asi;
pub mod benefits;
pub mod character;
pub mod config;
pub mod import_flow;
pub mod persistence;
pub mod reference;
pub mod review;

pub use asi::*;
pub use benefits::*;
pub use character::*;
pub use config::*;
pub use import_flow::*;
pub use persistence::*;
pub use reference::*;
pub use review::*;
