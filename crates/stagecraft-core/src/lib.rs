//! Stagecraft Core -- the scene visibility state machine.
//!
//! A [`stage::Stage`] owns a set of named [`scene::Scene`]s and guarantees
//! that at most one of them is active at any time. Scenes drive an abstract
//! [`panel::Panel`] and may be wired to a [`panel::Trigger`] whose activation
//! is routed back through the owning Stage.
//!
//! # Transitions
//!
//! - **show** -- hide every panel, show the target, mark it active, fire its
//!   callback.
//! - **hide** -- hide the target, then fall back to the default scene if one
//!   is configured, otherwise clear the active scene.
//! - **toggle** -- hide if active, show otherwise.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stagecraft_core::{Scene, Stage};
//!
//! let stage = Stage::new();
//! stage.add_scene(Scene::new("home", home_panel));
//! stage.add_scene(Scene::new("settings", settings_panel).with_trigger(gear_button));
//! stage.set_default("home");
//!
//! stage.show("settings")?;
//! stage.hide("settings")?; // falls back to "home"
//! ```
//!
//! # Sharing
//!
//! Stages are single-threaded and shared through `Rc`. Callbacks and
//! triggers may call back into the Stage synchronously; no internal borrow
//! is held while a callback runs.

pub mod error;
pub mod panel;
pub mod scene;
pub mod stage;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::StageError;
pub use panel::{ActivationCallback, Panel, Trigger};
pub use scene::Scene;
pub use stage::{SceneCallback, Stage};
