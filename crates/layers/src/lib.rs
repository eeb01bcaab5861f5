pub mod decorator;
pub mod labels;
pub mod layer;
pub mod symbology;
pub mod terrain;

pub use decorator::*;
pub use layer::*;
