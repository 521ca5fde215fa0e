//! Shared test doubles for unit tests, integration tests and downstream
//! crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::panel::{ActivationCallback, Panel, Trigger};
use crate::scene::Scene;
use crate::stage::Stage;

// ===========================================================================
// Command log
// ===========================================================================

/// A command issued to a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCommand {
    Show,
    Hide,
}

/// Shared, ordered record of panel commands across any number of panels.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    entries: Rc<RefCell<Vec<(String, PanelCommand)>>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, panel: &str, command: PanelCommand) {
        self.entries.borrow_mut().push((panel.to_string(), command));
    }

    /// Snapshot of every command recorded so far, oldest first.
    pub fn entries(&self) -> Vec<(String, PanelCommand)> {
        self.entries.borrow().clone()
    }

    /// Commands recorded for one panel.
    pub fn for_panel(&self, panel: &str) -> Vec<PanelCommand> {
        self.entries
            .borrow()
            .iter()
            .filter(|(id, _)| id == panel)
            .map(|(_, cmd)| *cmd)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

// ===========================================================================
// Panels
// ===========================================================================

/// In-memory panel. Visibility can be observed through a [`PanelProbe`]
/// after the panel has been moved into a scene.
#[derive(Debug)]
pub struct MockPanel {
    id: String,
    hidden: Rc<Cell<bool>>,
    log: Option<CommandLog>,
}

impl MockPanel {
    /// A panel that starts hidden.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            hidden: Rc::new(Cell::new(true)),
            log: None,
        }
    }

    /// A panel that starts visible.
    pub fn visible(id: &str) -> Self {
        let panel = Self::new(id);
        panel.hidden.set(false);
        panel
    }

    /// Record every command on `log`.
    pub fn logged(mut self, log: &CommandLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn probe(&self) -> PanelProbe {
        PanelProbe {
            hidden: self.hidden.clone(),
        }
    }
}

impl Panel for MockPanel {
    fn show(&mut self) {
        self.hidden.set(false);
        if let Some(log) = &self.log {
            log.record(&self.id, PanelCommand::Show);
        }
    }

    fn hide(&mut self) {
        self.hidden.set(true);
        if let Some(log) = &self.log {
            log.record(&self.id, PanelCommand::Hide);
        }
    }

    fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

/// Read-only view of a [`MockPanel`]'s visibility.
#[derive(Debug, Clone)]
pub struct PanelProbe {
    hidden: Rc<Cell<bool>>,
}

impl PanelProbe {
    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

// ===========================================================================
// Triggers
// ===========================================================================

/// In-memory trigger that can be fired from a test via its [`TriggerHandle`].
#[derive(Default)]
pub struct MockTrigger {
    listeners: Rc<RefCell<Vec<ActivationCallback>>>,
}

impl std::fmt::Debug for MockTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTrigger")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl MockTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> TriggerHandle {
        TriggerHandle {
            listeners: self.listeners.clone(),
        }
    }
}

impl Trigger for MockTrigger {
    fn on_activate(&mut self, callback: ActivationCallback) {
        self.listeners.borrow_mut().push(callback);
    }
}

/// Test-side end of a [`MockTrigger`]; simulates user activation.
#[derive(Clone)]
pub struct TriggerHandle {
    listeners: Rc<RefCell<Vec<ActivationCallback>>>,
}

impl TriggerHandle {
    /// Activate the trigger, running every registered callback.
    pub fn fire(&self) {
        for listener in self.listeners.borrow().iter() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

// ===========================================================================
// Stage helpers
// ===========================================================================

/// A scene backed by a hidden [`MockPanel`], plus its probe.
pub fn mock_scene(name: &str) -> (Scene, PanelProbe) {
    let panel = MockPanel::new(name);
    let probe = panel.probe();
    (Scene::new(name, panel), probe)
}

/// A Stage holding one mock scene per name, with probes keyed by name.
pub fn stage_with(names: &[&str]) -> (Rc<Stage>, HashMap<String, PanelProbe>) {
    let stage = Stage::new();
    let mut probes = HashMap::new();
    for name in names {
        let (scene, probe) = mock_scene(name);
        stage.add_scene(scene);
        probes.insert(name.to_string(), probe);
    }
    (stage, probes)
}

/// Names whose probes report visible, sorted.
pub fn visible(probes: &HashMap<String, PanelProbe>) -> Vec<String> {
    let mut names: Vec<String> = probes
        .iter()
        .filter(|(_, p)| !p.is_hidden())
        .map(|(n, _)| n.clone())
        .collect();
    names.sort();
    names
}
