pub mod document;
pub mod provider;

pub use document::*;
pub use provider::*;
