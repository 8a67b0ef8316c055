pub mod matcher;
pub mod walk;
pub mod dom;

pub use matcher::*;
pub use walk::*;
