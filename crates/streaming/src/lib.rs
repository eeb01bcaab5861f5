pub mod progress;
pub mod progression;
pub mod quality;
pub mod stage;

pub use progress::*;
pub use progression::*;
pub use quality::*;
pub use stage::*;
