// Formatting rules

pub mod indentation;
pub mod literals;

pub use indentation::*;
pub use literals::*;
