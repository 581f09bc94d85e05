//! Completion callbacks.
//!
//! Tools report finished annotations through a `Callback<Annotation, M>`
//! which maps the annotation into the owner's message type. The owner keeps
//! the annotation list; the tool only hands the result over.
//!
//! # Examples
//!
//! ```ignore
//! use vision_canvas::Callback;
//!
//! enum Event {
//!     Finished(Annotation),
//! }
//!
//! let on_finish = Callback::new(Event::Finished);
//! let event = on_finish.call(annotation);
//! ```

use std::fmt;
use std::rc::Rc;

/// An optional handler turning a value into a message.
///
/// The closure is reference counted so a tool can be recreated from a
/// registry entry and still share the owner's handler.
pub struct Callback<T, M> {
    f: Option<Rc<dyn Fn(T) -> M>>,
}

impl<T, M> Callback<T, M> {
    /// Create a new callback from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(T) -> M + 'static,
    {
        Self { f: Some(Rc::new(f)) }
    }

    /// Create an empty callback (no handler).
    pub fn none() -> Self {
        Self { f: None }
    }

    /// Call the callback with a value, if it exists.
    pub fn call(&self, value: T) -> Option<M> {
        self.f.as_ref().map(|f| f(value))
    }

    pub fn is_some(&self) -> bool {
        self.f.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.f.is_none()
    }
}

impl<T, M> Default for Callback<T, M> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T, M> Clone for Callback<T, M> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<T, M> fmt::Debug for Callback<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("set", &self.is_some()).finish()
    }
}
