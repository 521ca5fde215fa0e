//! Collaborator contracts consumed by scenes.
//!
//! The core never inspects layout, styling or markup. A [`Panel`] is anything
//! that can be shown, hidden and asked whether it is hidden; a [`Trigger`] is
//! anything that can call a closure when the user activates it.

/// A zero-argument callback handed to a [`Trigger`].
pub type ActivationCallback = Box<dyn Fn()>;

/// The visual surface a scene controls.
///
/// Implementations must not call back into the Stage that owns them: panel
/// commands are issued while the Stage is mid-transition.
pub trait Panel {
    /// Make the panel visible. Must be idempotent.
    fn show(&mut self);

    /// Make the panel hidden. Must be idempotent.
    fn hide(&mut self);

    /// Whether the panel is currently hidden.
    fn is_hidden(&self) -> bool;
}

/// An input control that can request a scene toggle.
pub trait Trigger {
    /// Register the callback to run each time the control is activated.
    fn on_activate(&mut self, callback: ActivationCallback);
}

impl<P: Panel + ?Sized> Panel for Box<P> {
    fn show(&mut self) {
        (**self).show();
    }

    fn hide(&mut self) {
        (**self).hide();
    }

    fn is_hidden(&self) -> bool {
        (**self).is_hidden()
    }
}

impl<T: Trigger + ?Sized> Trigger for Box<T> {
    fn on_activate(&mut self, callback: ActivationCallback) {
        (**self).on_activate(callback);
    }
}
