//! Command implementations

mod detect;
mod inspect;
mod verify;

pub use detect::detect;
pub use inspect::inspect;
pub use verify::verify;
