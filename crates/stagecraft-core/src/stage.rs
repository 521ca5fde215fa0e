use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::error::StageError;
use crate::panel::Trigger;
use crate::scene::{Scene, bind_trigger};

/// Callback fired when its scene becomes active.
pub type SceneCallback = Rc<dyn Fn()>;

#[derive(Default)]
struct StageState {
    scenes: HashMap<String, Scene>,
    active: Option<String>,
    default: Option<String>,
    callbacks: HashMap<String, SceneCallback>,
    next_binding: u64,
}

impl StageState {
    fn require(&self, name: &str) -> Result<(), StageError> {
        if self.scenes.contains_key(name) {
            Ok(())
        } else {
            Err(StageError::not_found(name))
        }
    }

    fn scene_mut(&mut self, name: &str) -> Result<&mut Scene, StageError> {
        self.scenes
            .get_mut(name)
            .ok_or_else(|| StageError::not_found(name))
    }

    fn hide_all(&mut self) {
        for scene in self.scenes.values_mut() {
            scene.hide();
        }
    }
}

/// Coordinates a set of scenes so that at most one is active.
///
/// Constructed with [`Stage::new`], which returns an `Rc` so triggers and
/// callbacks can refer back to the Stage. All operations take `&self`; no
/// internal borrow is held while a scene-change callback runs, which makes
/// re-entrant calls from callbacks safe.
pub struct Stage {
    state: RefCell<StageState>,
    this: Weak<Stage>,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Stage")
            .field("scenes", &state.scenes)
            .field("active", &state.active)
            .field("default", &state.default)
            .field("callbacks", &state.callbacks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Stage {
    /// Create an empty Stage with no active and no default scene.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            state: RefCell::new(StageState::default()),
            this: this.clone(),
        })
    }

    // ===========================================================================
    // Registration
    // ===========================================================================

    /// Register `scene` under its name and bind its triggers to this Stage.
    ///
    /// A scene already registered under the same name is replaced: its panel
    /// is hidden, its triggers stop acting on this Stage, and if it was the
    /// active scene the Stage is left with no active scene. The new scene's
    /// panel receives no command.
    pub fn add_scene(&self, mut scene: Scene) {
        let binding = {
            let mut state = self.state.borrow_mut();
            state.next_binding += 1;
            state.next_binding
        };
        scene.attach(&self.this, binding);
        let name = scene.name().to_string();

        let (previous, was_active) = {
            let mut state = self.state.borrow_mut();
            let previous = state.scenes.insert(name.clone(), scene);
            let was_active = previous.is_some() && state.active.as_deref() == Some(name.as_str());
            if was_active {
                state.active = None;
            }
            (previous, was_active)
        };

        if let Some(mut previous) = previous {
            previous.hide();
            tracing::warn!(
                scene = %name,
                was_active,
                inert_triggers = previous.trigger_count(),
                "replaced existing scene with the same name"
            );
        } else {
            tracing::debug!(scene = %name, "scene registered");
        }
    }

    /// Register `scene` and its scene-change callback in one call.
    pub fn add_scene_with_callback(&self, scene: Scene, callback: impl Fn() + 'static) {
        let name = scene.name().to_string();
        self.add_scene(scene);
        self.set_scene_change_callback(name, callback);
    }

    /// Bind an additional trigger to a registered scene.
    pub fn bind_trigger(
        &self,
        name: &str,
        trigger: impl Trigger + 'static,
    ) -> Result<(), StageError> {
        let binding = self
            .state
            .borrow()
            .scenes
            .get(name)
            .map(Scene::binding)
            .ok_or_else(|| StageError::not_found(name))?;
        let mut trigger: Box<dyn Trigger> = Box::new(trigger);
        bind_trigger(&self.this, name, binding, trigger.as_mut());
        self.state.borrow_mut().scene_mut(name)?.adopt(trigger);
        Ok(())
    }

    // ===========================================================================
    // Callbacks
    // ===========================================================================

    /// Register or replace the callback fired when `name` becomes active.
    ///
    /// The scene does not need to be registered yet. A callback that needs
    /// the Stage should capture a `Weak<Stage>`; a strong `Rc` would form a
    /// cycle and keep the Stage alive forever.
    pub fn set_scene_change_callback(
        &self,
        name: impl Into<String>,
        callback: impl Fn() + 'static,
    ) {
        self.state
            .borrow_mut()
            .callbacks
            .insert(name.into(), Rc::new(callback));
    }

    /// Detach the callback for `name`. Returns whether one was registered.
    pub fn remove_scene_change_callback(&self, name: &str) -> bool {
        self.state.borrow_mut().callbacks.remove(name).is_some()
    }

    /// Whether a callback is registered for `name`.
    pub fn has_scene_change_callback(&self, name: &str) -> bool {
        self.state.borrow().callbacks.contains_key(name)
    }

    // ===========================================================================
    // Default scene
    // ===========================================================================

    /// Set the scene to fall back to whenever a scene is hidden.
    ///
    /// The name is checked when the fallback happens, so the default may be
    /// set before its scene is registered.
    pub fn set_default(&self, name: impl Into<String>) {
        self.state.borrow_mut().default = Some(name.into());
    }

    /// Remove the fallback scene. Hiding will then leave no scene active.
    pub fn clear_default(&self) {
        self.state.borrow_mut().default = None;
    }

    /// The configured fallback scene, if any.
    pub fn default_scene(&self) -> Option<String> {
        self.state.borrow().default.clone()
    }

    // ===========================================================================
    // Transitions
    // ===========================================================================

    /// Make `name` the active scene.
    ///
    /// Hides every panel, shows the target, records it as active and then
    /// fires its callback. Showing the already active scene repeats the whole
    /// sequence, callback included.
    pub fn show(&self, name: &str) -> Result<(), StageError> {
        let callback = {
            let mut state = self.state.borrow_mut();
            state.require(name)?;
            state.hide_all();
            state.scene_mut(name)?.show();
            state.active = Some(name.to_string());
            state.callbacks.get(name).cloned()
        };
        tracing::debug!(scene = %name, "scene activated");

        if let Some(callback) = callback {
            callback();
        }
        Ok(())
    }

    /// Hide `name`, then fall back to the default scene if one is set.
    ///
    /// The fallback happens whether or not `name` was the active scene, so
    /// hiding any scene re-asserts the default. Without a default the Stage
    /// is left with no active scene.
    pub fn hide(&self, name: &str) -> Result<(), StageError> {
        let fallback = {
            let mut state = self.state.borrow_mut();
            state.require(name)?;
            let fallback = state.default.clone();
            if let Some(default) = &fallback {
                state.require(default)?;
            }

            state.scene_mut(name)?.hide();
            if fallback.is_none() {
                state.active = None;
            }
            fallback
        };
        tracing::debug!(scene = %name, fallback = ?fallback, "scene hidden");

        match fallback {
            Some(default) => self.show(&default),
            None => Ok(()),
        }
    }

    /// Hide `name` if it is active, show it otherwise.
    ///
    /// This is the entry point triggers use.
    pub fn toggle(&self, name: &str) -> Result<(), StageError> {
        if self.showing(name)? {
            self.hide(name)
        } else {
            self.show(name)
        }
    }

    /// Toggle on behalf of a trigger bound to registration `binding`.
    ///
    /// Does nothing if `name` has since been re-registered.
    pub(crate) fn trigger_activated(&self, name: &str, binding: u64) -> Result<(), StageError> {
        let current = self.state.borrow().scenes.get(name).map(Scene::binding);
        if current != Some(binding) {
            tracing::debug!(scene = %name, "ignoring trigger of a replaced scene");
            return Ok(());
        }
        self.toggle(name)
    }

    /// Hide every registered panel without changing the active scene.
    pub fn hide_all(&self) {
        self.state.borrow_mut().hide_all();
    }

    // ===========================================================================
    // Queries
    // ===========================================================================

    /// Whether `name` is the active scene.
    pub fn showing(&self, name: &str) -> Result<bool, StageError> {
        let state = self.state.borrow();
        state.require(name)?;
        Ok(state.active.as_deref() == Some(name))
    }

    /// Whether `name` is not the active scene.
    pub fn hiding(&self, name: &str) -> Result<bool, StageError> {
        self.showing(name).map(|showing| !showing)
    }

    /// The active scene's name, or `None` when nothing is active.
    pub fn active(&self) -> Option<String> {
        self.state.borrow().active.clone()
    }

    /// Whether the panel of `name` reports itself hidden.
    pub fn is_hidden(&self, name: &str) -> Result<bool, StageError> {
        let state = self.state.borrow();
        state
            .scenes
            .get(name)
            .map(Scene::is_hidden)
            .ok_or_else(|| StageError::not_found(name))
    }

    /// Names of the scenes whose panels are currently visible, sorted.
    pub fn visible_scenes(&self) -> Vec<String> {
        let state = self.state.borrow();
        let mut names: Vec<String> = state
            .scenes
            .values()
            .filter(|s| !s.is_hidden())
            .map(|s| s.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Names of all registered scenes, sorted.
    pub fn scene_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.borrow().scenes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a scene is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.state.borrow().scenes.contains_key(name)
    }

    /// Number of registered scenes.
    pub fn len(&self) -> usize {
        self.state.borrow().scenes.len()
    }

    /// Whether no scenes are registered.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::test_utils::*;

    #[test]
    fn new_stage_is_empty_and_inactive() {
        let stage = Stage::new();
        assert!(stage.is_empty());
        assert_eq!(stage.active(), None);
        assert_eq!(stage.default_scene(), None);
    }

    #[test]
    fn registration_issues_no_panel_commands() {
        let log = CommandLog::new();
        let stage = Stage::new();
        stage.add_scene(Scene::new("a", MockPanel::new("a").logged(&log)));
        assert!(log.is_empty());
        assert_eq!(stage.active(), None);
    }

    #[test]
    fn show_hides_everything_before_showing_target() {
        let log = CommandLog::new();
        let stage = Stage::new();
        stage.add_scene(Scene::new("a", MockPanel::new("a").logged(&log)));
        stage.add_scene(Scene::new("b", MockPanel::new("b").logged(&log)));

        stage.show("b").unwrap();

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.last(), Some(&("b".to_string(), PanelCommand::Show)));
        assert!(
            entries[..2].iter().all(|(_, cmd)| *cmd == PanelCommand::Hide),
            "every panel is hidden before the target is shown"
        );
    }

    #[test]
    fn duplicate_name_replaces_previous_scene() {
        let log = CommandLog::new();
        let stage = Stage::new();
        stage.add_scene(Scene::new("dup", MockPanel::new("first").logged(&log)));
        stage.add_scene(Scene::new("dup", MockPanel::new("second").logged(&log)));
        assert_eq!(stage.len(), 1);
        assert!(stage.contains("dup"));
        assert!(!stage.contains("first"));
        assert_eq!(log.for_panel("first"), vec![PanelCommand::Hide]);
        assert!(log.for_panel("second").is_empty());

        stage.show("dup").unwrap();
        assert_eq!(log.for_panel("first"), vec![PanelCommand::Hide]);
        assert_eq!(log.for_panel("second").last(), Some(&PanelCommand::Show));
    }

    #[test]
    fn replacing_active_scene_hides_it_and_clears_active() {
        let (stage, mut probes) = stage_with(&["a", "b"]);
        let old_a = probes["a"].clone();
        stage.show("a").unwrap();

        let (replacement, new_a) = mock_scene("a");
        stage.add_scene(replacement);
        probes.insert("a".to_string(), new_a);

        assert!(old_a.is_hidden());
        assert_eq!(stage.active(), None);
        assert!(!stage.showing("a").unwrap());
        assert!(visible(&probes).is_empty());

        stage.show("b").unwrap();
        assert!(old_a.is_hidden());
        assert_eq!(visible(&probes), vec!["b".to_string()]);
        assert_eq!(stage.visible_scenes(), vec!["b".to_string()]);
        assert!(stage.showing("b").unwrap());
        assert!(!stage.showing("a").unwrap());

        stage.toggle("a").unwrap();
        assert_eq!(stage.active().as_deref(), Some("a"));
        assert_eq!(visible(&probes), vec!["a".to_string()]);
    }

    #[test]
    fn replacing_inactive_scene_keeps_active() {
        let (stage, _probes) = stage_with(&["a", "b"]);
        stage.show("b").unwrap();
        stage.add_scene(Scene::new("a", MockPanel::new("a")));
        assert_eq!(stage.active().as_deref(), Some("b"));
    }

    #[test]
    fn add_scene_with_callback_attaches_callback() {
        let stage = Stage::new();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        stage.add_scene_with_callback(Scene::new("a", MockPanel::new("a")), move || {
            counter.set(counter.get() + 1)
        });

        assert!(stage.has_scene_change_callback("a"));
        stage.show("a").unwrap();
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn remove_callback_is_noop_when_absent() {
        let stage = Stage::new();
        assert!(!stage.remove_scene_change_callback("ghost"));
        stage.set_scene_change_callback("ghost", || {});
        assert!(stage.remove_scene_change_callback("ghost"));
        assert!(!stage.has_scene_change_callback("ghost"));
    }

    #[test]
    fn unknown_default_fails_hide_without_side_effects() {
        let (stage, probes) = stage_with(&["a"]);
        stage.show("a").unwrap();
        stage.set_default("missing");

        let err = stage.hide("a").unwrap_err();
        assert_eq!(
            err,
            StageError::SceneNotFound {
                name: "missing".into()
            }
        );
        assert_eq!(stage.active().as_deref(), Some("a"));
        assert!(!probes["a"].is_hidden());
    }

    #[test]
    fn clear_default_restores_teardown() {
        let (stage, probes) = stage_with(&["a", "b"]);
        stage.set_default("a");
        stage.clear_default();
        stage.show("b").unwrap();
        stage.hide("b").unwrap();
        assert_eq!(stage.active(), None);
        assert!(probes.values().all(PanelProbe::is_hidden));
    }

    #[test]
    fn hide_all_keeps_active_pointer() {
        let (stage, probes) = stage_with(&["a", "b"]);
        stage.show("a").unwrap();
        stage.hide_all();
        assert_eq!(stage.active().as_deref(), Some("a"));
        assert!(probes.values().all(PanelProbe::is_hidden));
    }

    #[test]
    fn queries_reject_unknown_names() {
        let (stage, _probes) = stage_with(&["a"]);
        assert!(stage.showing("nope").is_err());
        assert!(stage.hiding("nope").is_err());
        assert!(stage.is_hidden("nope").is_err());
        assert_eq!(stage.hiding("a"), Ok(true));
    }

    #[test]
    fn debug_lists_active_scene() {
        let (stage, _probes) = stage_with(&["a"]);
        stage.show("a").unwrap();
        let text = format!("{stage:?}");
        assert!(text.contains("active: Some(\"a\")"));
    }
}
