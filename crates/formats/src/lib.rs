pub mod adapters;
pub mod coords;
pub mod dataset;
pub mod rows;
pub mod seed;

pub use adapters::*;
pub use dataset::*;
pub use rows::*;
