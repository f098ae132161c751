#![forbid(unsafe_code)]

//! `scrollviz-scene` is the boundary between narrative logic and whatever
//! actually draws pixels.
//!
//! Design goals:
//! - **Host-driven time**: transitions progress only when the host advances
//!   the clock, so every frame is reproducible.
//! - **Named elements**: callers address elements through handles obtained
//!   once by name; the scene owns geometry, opacity, classes and axis content.
//! - **Last write wins**: scheduling a transition on an element replaces the
//!   element's pending chain and starts from its current values.
//!
//! [`RetainedScene`] is the in-memory implementation used by tests, the replay
//! harness and hosts that rasterize from a retained model.

pub mod element;
pub mod retained;
pub mod transition;

pub use element::{Attr, AxisOrient, AxisSpec, ElementKind, Handle, Tick};
pub use retained::{ElementView, RetainedScene};
pub use transition::{Stage, Transition};

use scrollviz_core::geometry::Size;

/// A retained 2D scene graph with timed attribute transitions.
///
/// Operations on a handle that does not belong to the scene are ignored and
/// reads through such a handle return the attribute's initial value.
pub trait Scene {
    /// Rendered size of the host canvas. [`Size::ZERO`] before layout.
    fn client_size(&self) -> Size;

    /// Select the element named `name` under `parent`, creating it if absent.
    fn select(&mut self, parent: Option<Handle>, kind: ElementKind, name: &str) -> Handle;

    /// Current value of an attribute (mid-transition values included).
    fn attr(&self, handle: Handle, attr: Attr) -> f64;

    /// Value the attribute will hold once every scheduled stage has run.
    fn settled_attr(&self, handle: Handle, attr: Attr) -> f64;

    /// Set an attribute immediately.
    fn set_attr(&mut self, handle: Handle, attr: Attr, value: f64);

    /// Toggle a style class.
    fn set_class(&mut self, handle: Handle, class: &'static str, on: bool);

    /// Whether a style class is set.
    fn has_class(&self, handle: Handle, class: &str) -> bool;

    /// Replace the text content of a text element.
    fn set_text(&mut self, handle: Handle, text: &str);

    /// Replace the tick content of an axis element.
    fn set_axis(&mut self, handle: Handle, axis: AxisSpec);

    /// Schedule a transition, replacing the element's pending chain.
    fn transition(&mut self, handle: Handle, transition: Transition);

    /// Remove every element. Previously issued handles become invalid.
    fn clear(&mut self);
}
