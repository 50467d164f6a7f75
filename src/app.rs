//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the library listing,
//! pane selections and view flags.

mod model;

pub use model::*;
