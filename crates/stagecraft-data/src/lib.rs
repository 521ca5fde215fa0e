//! Declarative stage layouts.
//!
//! A layout file lists scenes by name together with the selectors of their
//! panel and optional trigger, plus the default scene. Files may be RON,
//! TOML or JSON; the format is picked from the extension. A [`Surface`]
//! turns selectors into live handles and [`build_stage`] assembles the
//! result into a [`stagecraft_core::Stage`].
//!
//! ```rust,ignore
//! let layout = stagecraft_data::load_layout(Path::new("layouts/ron/stage.ron"))?;
//! let stage = stagecraft_data::build_stage(&layout, &mut my_surface)?;
//! ```

pub mod builder;
pub mod layout;
pub mod loader;

pub use builder::{Surface, apply_layout, build_stage};
pub use layout::{SceneDef, StageLayout};
pub use loader::{Format, LayoutError, detect_format, find_layout, load_layout, parse_layout};
