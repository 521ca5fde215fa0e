use std::collections::HashSet;

use serde::Deserialize;

use crate::loader::LayoutError;

/// A stage described as data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StageLayout {
    #[serde(default)]
    pub title: Option<String>,
    /// Scene to fall back to whenever a scene is hidden.
    #[serde(default)]
    pub default: Option<String>,
    /// Show the default scene once the Stage is assembled.
    #[serde(default)]
    pub show_default_on_start: bool,
    pub scenes: Vec<SceneDef>,
}

/// One scene in a layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SceneDef {
    /// Unique within the layout.
    pub name: String,
    /// Selector the surface resolves to a panel.
    pub panel: String,
    /// Selector the surface resolves to a trigger control.
    #[serde(default)]
    pub trigger: Option<String>,
}

impl StageLayout {
    /// Reject duplicate scene names and a default that names no scene.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = HashSet::new();
        for scene in &self.scenes {
            if !seen.insert(scene.name.as_str()) {
                return Err(LayoutError::DuplicateScene {
                    name: scene.name.clone(),
                });
            }
        }

        if let Some(default) = &self.default {
            if !seen.contains(default.as_str()) {
                return Err(LayoutError::UnknownDefault {
                    name: default.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up a scene definition by name.
    pub fn scene(&self, name: &str) -> Option<&SceneDef> {
        self.scenes.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str) -> SceneDef {
        SceneDef {
            name: name.to_string(),
            panel: format!("#{name}"),
            trigger: None,
        }
    }

    #[test]
    fn validate_accepts_unique_names_and_known_default() {
        let layout = StageLayout {
            title: None,
            default: Some("a".into()),
            show_default_on_start: false,
            scenes: vec![def("a"), def("b")],
        };
        assert!(layout.validate().is_ok());
        assert_eq!(layout.scene("b").map(|s| s.panel.as_str()), Some("#b"));
        assert!(layout.scene("c").is_none());
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let layout = StageLayout {
            title: None,
            default: None,
            show_default_on_start: false,
            scenes: vec![def("a"), def("a")],
        };
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateScene { name } if name == "a"));
    }

    #[test]
    fn validate_rejects_unknown_default() {
        let layout = StageLayout {
            title: None,
            default: Some("z".into()),
            show_default_on_start: true,
            scenes: vec![def("a")],
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::UnknownDefault { .. })
        ));
    }

    #[test]
    fn empty_layout_is_valid() {
        let layout = StageLayout {
            title: None,
            default: None,
            show_default_on_start: false,
            scenes: Vec::new(),
        };
        assert!(layout.validate().is_ok());
    }
}
