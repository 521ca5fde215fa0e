use std::rc::Rc;

use stagecraft_core::{Panel, Scene, Stage, Trigger};

use crate::layout::StageLayout;
use crate::loader::LayoutError;

/// Resolves layout selectors into live panel and trigger handles.
///
/// Returning `None` means the selector matched nothing on this surface.
pub trait Surface {
    fn panel(&mut self, selector: &str) -> Option<Box<dyn Panel>>;
    fn trigger(&mut self, selector: &str) -> Option<Box<dyn Trigger>>;
}

/// Build a new Stage from `layout`, resolving selectors through `surface`.
pub fn build_stage(
    layout: &StageLayout,
    surface: &mut impl Surface,
) -> Result<Rc<Stage>, LayoutError> {
    let stage = Stage::new();
    apply_layout(layout, &stage, surface)?;
    Ok(stage)
}

/// Add every scene in `layout` to an existing `stage`, then apply its default.
///
/// All selectors are resolved before the Stage is touched, so a failed
/// resolution leaves `stage` unchanged. Scenes whose names already exist on
/// the Stage replace the registered ones.
pub fn apply_layout(
    layout: &StageLayout,
    stage: &Stage,
    surface: &mut impl Surface,
) -> Result<(), LayoutError> {
    layout.validate()?;

    let mut scenes = Vec::with_capacity(layout.scenes.len());
    for def in &layout.scenes {
        let panel = surface
            .panel(&def.panel)
            .ok_or_else(|| LayoutError::UnresolvedSelector {
                scene: def.name.clone(),
                selector: def.panel.clone(),
                kind: "panel",
            })?;
        let mut scene = Scene::new(def.name.clone(), panel);

        if let Some(selector) = &def.trigger {
            let trigger =
                surface
                    .trigger(selector)
                    .ok_or_else(|| LayoutError::UnresolvedSelector {
                        scene: def.name.clone(),
                        selector: selector.clone(),
                        kind: "trigger",
                    })?;
            scene = scene.with_trigger(trigger);
        }
        scenes.push(scene);
    }

    for scene in scenes {
        stage.add_scene(scene);
    }

    if let Some(default) = &layout.default {
        stage.set_default(default.clone());
        if layout.show_default_on_start {
            stage.show(default)?;
        }
    }

    tracing::debug!(
        title = ?layout.title,
        scenes = layout.scenes.len(),
        "layout applied to stage"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use stagecraft_core::test_utils::*;

    use super::*;
    use crate::layout::SceneDef;

    /// Surface that hands out mock panels for every selector in `known`.
    #[derive(Default)]
    struct MockSurface {
        known: Vec<String>,
        probes: HashMap<String, PanelProbe>,
        triggers: HashMap<String, TriggerHandle>,
    }

    impl MockSurface {
        fn with(selectors: &[&str]) -> Self {
            Self {
                known: selectors.iter().map(|s| s.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl Surface for MockSurface {
        fn panel(&mut self, selector: &str) -> Option<Box<dyn Panel>> {
            if !self.known.iter().any(|k| k == selector) {
                return None;
            }
            let panel = MockPanel::new(selector);
            self.probes.insert(selector.to_string(), panel.probe());
            Some(Box::new(panel))
        }

        fn trigger(&mut self, selector: &str) -> Option<Box<dyn Trigger>> {
            if !self.known.iter().any(|k| k == selector) {
                return None;
            }
            let trigger = MockTrigger::new();
            self.triggers.insert(selector.to_string(), trigger.handle());
            Some(Box::new(trigger))
        }
    }

    fn layout(default: Option<&str>, start: bool) -> StageLayout {
        StageLayout {
            title: Some("test".into()),
            default: default.map(str::to_string),
            show_default_on_start: start,
            scenes: vec![
                SceneDef {
                    name: "home".into(),
                    panel: "#home".into(),
                    trigger: None,
                },
                SceneDef {
                    name: "help".into(),
                    panel: "#help".into(),
                    trigger: Some("#help-btn".into()),
                },
            ],
        }
    }

    #[test]
    fn build_registers_scenes_and_default() {
        let mut surface = MockSurface::with(&["#home", "#help", "#help-btn"]);
        let stage = build_stage(&layout(Some("home"), false), &mut surface).unwrap();

        assert_eq!(stage.scene_names(), vec!["help", "home"]);
        assert_eq!(stage.default_scene().as_deref(), Some("home"));
        assert_eq!(stage.active(), None, "default is not shown unless asked");
        assert!(surface.probes.values().all(PanelProbe::is_hidden));
    }

    #[test]
    fn build_shows_default_on_start() {
        let mut surface = MockSurface::with(&["#home", "#help", "#help-btn"]);
        let stage = build_stage(&layout(Some("home"), true), &mut surface).unwrap();

        assert_eq!(stage.active().as_deref(), Some("home"));
        assert!(!surface.probes["#home"].is_hidden());
    }

    #[test]
    fn built_trigger_toggles_through_stage() {
        let mut surface = MockSurface::with(&["#home", "#help", "#help-btn"]);
        let stage = build_stage(&layout(Some("home"), true), &mut surface).unwrap();

        surface.triggers["#help-btn"].fire();
        assert_eq!(stage.active().as_deref(), Some("help"));
        assert!(surface.probes["#home"].is_hidden());

        surface.triggers["#help-btn"].fire();
        assert_eq!(stage.active().as_deref(), Some("home"));
    }

    #[test]
    fn unresolved_panel_fails_without_touching_stage() {
        let mut surface = MockSurface::with(&["#home", "#help-btn"]);
        let stage = Stage::new();

        let err = apply_layout(&layout(None, false), &stage, &mut surface).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::UnresolvedSelector {
                kind: "panel",
                ref selector,
                ..
            } if selector == "#help"
        ));
        assert!(stage.is_empty());
    }

    #[test]
    fn unresolved_trigger_is_an_error() {
        let mut surface = MockSurface::with(&["#home", "#help"]);
        let err = build_stage(&layout(None, false), &mut surface).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::UnresolvedSelector { kind: "trigger", .. }
        ));
    }

    #[test]
    fn apply_layout_extends_existing_stage() {
        let (stage, _probes) = stage_with(&["about"]);
        let mut surface = MockSurface::with(&["#home", "#help", "#help-btn"]);

        apply_layout(&layout(None, false), &stage, &mut surface).unwrap();
        assert_eq!(stage.scene_names(), vec!["about", "help", "home"]);
    }
}
