pub mod debounce;
pub mod event_bus;
pub mod timer;

pub use debounce::*;
pub use event_bus::*;
pub use timer::*;
