pub mod config;
pub mod context;
pub mod session;
pub mod sources;
pub mod tracking;
pub mod ui;
pub mod viewer;

pub use config::*;
pub use context::AppContext;
pub use session::*;
pub use sources::*;
pub use ui::UiController;
pub use viewer::*;
