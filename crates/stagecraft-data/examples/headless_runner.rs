//! Headless runner: loads every toolbox layout, drives a scripted session
//! against each Stage and prints the visible panels after every step.
//!
//! Run with: `RUST_LOG=debug cargo run --package stagecraft-data --example headless_runner`

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use stagecraft_core::{ActivationCallback, Panel, Stage, Trigger};
use stagecraft_data::{Surface, build_stage, find_layout, load_layout};
use tracing_subscriber::EnvFilter;

type Visibility = Rc<RefCell<BTreeMap<String, bool>>>;

/// Panel that records its visibility in a shared table.
struct ConsolePanel {
    selector: String,
    table: Visibility,
}

impl Panel for ConsolePanel {
    fn show(&mut self) {
        self.table.borrow_mut().insert(self.selector.clone(), true);
    }

    fn hide(&mut self) {
        self.table.borrow_mut().insert(self.selector.clone(), false);
    }

    fn is_hidden(&self) -> bool {
        !self.table.borrow().get(&self.selector).copied().unwrap_or(false)
    }
}

/// Trigger whose callbacks are collected so the script can "click" them.
struct ConsoleTrigger {
    selector: String,
    buttons: Rc<RefCell<BTreeMap<String, Vec<ActivationCallback>>>>,
}

impl Trigger for ConsoleTrigger {
    fn on_activate(&mut self, callback: ActivationCallback) {
        self.buttons
            .borrow_mut()
            .entry(self.selector.clone())
            .or_default()
            .push(callback);
    }
}

#[derive(Default)]
struct ConsoleSurface {
    table: Visibility,
    buttons: Rc<RefCell<BTreeMap<String, Vec<ActivationCallback>>>>,
}

impl Surface for ConsoleSurface {
    fn panel(&mut self, selector: &str) -> Option<Box<dyn Panel>> {
        self.table.borrow_mut().insert(selector.to_string(), false);
        Some(Box::new(ConsolePanel {
            selector: selector.to_string(),
            table: self.table.clone(),
        }))
    }

    fn trigger(&mut self, selector: &str) -> Option<Box<dyn Trigger>> {
        Some(Box::new(ConsoleTrigger {
            selector: selector.to_string(),
            buttons: self.buttons.clone(),
        }))
    }
}

impl ConsoleSurface {
    fn click(&self, selector: &str) {
        let buttons = self.buttons.borrow();
        match buttons.get(selector) {
            Some(callbacks) => callbacks.iter().for_each(|cb| cb()),
            None => println!("    (no trigger bound to {selector})"),
        }
    }

    fn visible(&self) -> Vec<String> {
        self.table
            .borrow()
            .iter()
            .filter(|(_, shown)| **shown)
            .map(|(selector, _)| selector.clone())
            .collect()
    }
}

fn report(step: &str, stage: &Stage, surface: &ConsoleSurface) {
    println!(
        "    {step:<24} active={:<12} visible={:?}",
        stage.active().unwrap_or_else(|| "-".to_string()),
        surface.visible()
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/layouts/toolbox"));

    for base_name in ["stage", "drawer", "dialogs"] {
        let path = find_layout(dir, base_name).unwrap_or_else(|e| panic!("{e}"));
        let layout = load_layout(&path).unwrap_or_else(|e| panic!("{e}"));
        println!(
            "--- {} ({}) ---",
            layout.title.as_deref().unwrap_or(base_name),
            path.display()
        );

        let mut surface = ConsoleSurface::default();
        let stage = build_stage(&layout, &mut surface).unwrap_or_else(|e| panic!("{e}"));
        report("built", &stage, &surface);

        for def in &layout.scenes {
            match &def.trigger {
                Some(selector) => {
                    surface.click(selector);
                    report(&format!("click {selector}"), &stage, &surface);
                }
                None => {
                    stage.show(&def.name).unwrap_or_else(|e| panic!("{e}"));
                    report(&format!("show {}", def.name), &stage, &surface);
                }
            }
        }

        if let Some(last) = layout.scenes.last() {
            stage.hide(&last.name).unwrap_or_else(|e| panic!("{e}"));
            report(&format!("hide {}", last.name), &stage, &surface);
        }

        let visible = surface.visible().len();
        if visible > 1 {
            println!("    Exclusivity: FAIL ({visible} panels visible)");
            std::process::exit(1);
        }
        println!("    Exclusivity: PASS\n");
    }
}
