pub mod input;
pub mod navigation;
pub mod ranker;
pub mod score;

pub use input::*;
pub use navigation::*;
pub use ranker::*;
pub use score::*;
