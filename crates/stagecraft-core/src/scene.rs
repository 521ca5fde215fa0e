use std::rc::Weak;

use crate::panel::{Panel, Trigger};
use crate::stage::Stage;

/// A named, toggleable region of the UI.
///
/// A scene translates show/hide intent into commands on its [`Panel`]. Its
/// triggers never toggle the panel directly: once the scene is registered
/// with a [`Stage`], every trigger activation calls [`Stage::toggle`] so the
/// Stage can keep at most one scene active.
pub struct Scene {
    name: String,
    panel: Box<dyn Panel>,
    /// Triggers supplied before registration, bound by the owning Stage.
    pending: Vec<Box<dyn Trigger>>,
    bound: Vec<Box<dyn Trigger>>,
    /// Registration identity; bound triggers only act while it is current.
    binding: u64,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("hidden", &self.panel.is_hidden())
            .field("triggers", &(self.pending.len() + self.bound.len()))
            .finish()
    }
}

impl Scene {
    /// Create a scene that controls `panel`.
    pub fn new(name: impl Into<String>, panel: impl Panel + 'static) -> Self {
        Self {
            name: name.into(),
            panel: Box::new(panel),
            pending: Vec::new(),
            bound: Vec::new(),
            binding: 0,
        }
    }

    /// Attach a trigger. It is wired up when the scene is added to a Stage.
    pub fn with_trigger(mut self, trigger: impl Trigger + 'static) -> Self {
        self.pending.push(Box::new(trigger));
        self
    }

    /// The scene's name, also its key in the owning Stage.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Command the panel visible.
    pub fn show(&mut self) {
        tracing::trace!(scene = %self.name, "panel show");
        self.panel.show();
    }

    /// Command the panel hidden.
    pub fn hide(&mut self) {
        tracing::trace!(scene = %self.name, "panel hide");
        self.panel.hide();
    }

    /// Flip the panel's visibility.
    ///
    /// This is local to the panel and does not update any Stage's active
    /// scene. Use [`Stage::toggle`] for coordinated switching.
    pub fn toggle(&mut self) {
        if self.panel.is_hidden() {
            self.show();
        } else {
            self.hide();
        }
    }

    /// Whether the panel currently reports itself hidden.
    pub fn is_hidden(&self) -> bool {
        self.panel.is_hidden()
    }

    /// Number of triggers attached to this scene, bound or not.
    pub fn trigger_count(&self) -> usize {
        self.pending.len() + self.bound.len()
    }

    /// Bind every pending trigger so that activation toggles this scene on
    /// `stage`.
    pub(crate) fn attach(&mut self, stage: &Weak<Stage>, binding: u64) {
        self.binding = binding;
        for mut trigger in std::mem::take(&mut self.pending) {
            bind_trigger(stage, &self.name, binding, trigger.as_mut());
            self.bound.push(trigger);
        }
    }

    pub(crate) fn binding(&self) -> u64 {
        self.binding
    }

    /// Keep an already bound trigger alive for the scene's lifetime.
    pub(crate) fn adopt(&mut self, trigger: Box<dyn Trigger>) {
        self.bound.push(trigger);
    }
}

/// Route activations of `trigger` to `Stage::toggle(name)`.
///
/// The closure holds a weak reference, so a trigger outliving its Stage
/// does nothing when activated. Activations are also ignored once the scene
/// registered as `binding` has been replaced under the same name.
pub(crate) fn bind_trigger(
    stage: &Weak<Stage>,
    name: &str,
    binding: u64,
    trigger: &mut dyn Trigger,
) {
    let stage = stage.clone();
    let name = name.to_string();
    trigger.on_activate(Box::new(move || {
        let Some(stage) = stage.upgrade() else {
            return;
        };
        if let Err(err) = stage.trigger_activated(&name, binding) {
            tracing::warn!(scene = %name, %err, "trigger activation failed");
        }
    }));
}
