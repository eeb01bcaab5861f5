pub mod camera;
pub mod entity;
pub mod highlight;
pub mod world;

pub use entity::*;
pub use world::*;
