pub mod ecef;
pub mod geodesy;

pub use ecef::*;
pub use geodesy::*;
