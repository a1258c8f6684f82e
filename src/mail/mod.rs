pub mod loader;
pub mod types;

pub use types::{Draft, Email};
