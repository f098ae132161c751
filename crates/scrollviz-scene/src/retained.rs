#![forbid(unsafe_code)]

//! In-memory scene driven by host-supplied time steps.
//!
//! [`RetainedScene`] keeps every element's attributes, classes, text and axis
//! content in a flat table, and plays staged transitions when the host calls
//! [`RetainedScene::advance`]. [`RetainedScene::settle`] jumps every pending
//! chain to its end, which is how tests observe the settled state of a step.

use std::collections::VecDeque;
use std::time::Duration;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use scrollviz_core::geometry::{Point, Size};

use crate::Scene;
use crate::element::{Attr, AxisSpec, ElementKind, Handle};
use crate::transition::{RunningStage, Transition};

#[derive(Debug, Clone)]
struct Element {
    name: String,
    kind: ElementKind,
    parent: Option<Handle>,
    attrs: [f64; Attr::COUNT],
    classes: SmallVec<[&'static str; 4]>,
    text: Option<String>,
    axis: Option<AxisSpec>,
    chain: VecDeque<RunningStage>,
}

impl Element {
    fn new(name: &str, kind: ElementKind, parent: Option<Handle>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parent,
            attrs: Attr::ALL.map(Attr::initial),
            classes: SmallVec::new(),
            text: None,
            axis: None,
            chain: VecDeque::new(),
        }
    }

    fn advance(&mut self, dt: Duration) {
        let mut remaining = dt;
        while let Some(stage) = self.chain.front_mut() {
            match stage.advance(&mut self.attrs, remaining) {
                Some(left) => {
                    remaining = left;
                    self.chain.pop_front();
                }
                None => break,
            }
        }
    }

    fn settle(&mut self) {
        for stage in self.chain.drain(..) {
            stage.apply_final(&mut self.attrs);
        }
    }

    fn settled(&self, attr: Attr) -> f64 {
        self.chain
            .iter()
            .rev()
            .find_map(|run| run.stage().target(attr))
            .unwrap_or(self.attrs[attr.index()])
    }
}

/// Read-only view of one element.
#[derive(Debug, Clone, Copy)]
pub struct ElementView<'a> {
    pub handle: Handle,
    pub name: &'a str,
    pub kind: ElementKind,
    pub parent: Option<Handle>,
    pub classes: &'a [&'static str],
    pub text: Option<&'a str>,
    pub axis: Option<&'a AxisSpec>,
    attrs: &'a [f64; Attr::COUNT],
    pending_stages: usize,
}

impl ElementView<'_> {
    /// Current value of `attr`.
    #[inline]
    pub fn attr(&self, attr: Attr) -> f64 {
        self.attrs[attr.index()]
    }

    /// Whether a transition chain is still pending on this element.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.pending_stages > 0
    }
}

/// Retained, host-clocked implementation of [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct RetainedScene {
    size: Size,
    /// Time advanced since creation.
    elapsed: Duration,
    elements: Vec<Element>,
    names: FxHashMap<(Option<Handle>, String), Handle>,
}

impl RetainedScene {
    /// Create a scene whose host canvas measures `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size: size.sanitized(),
            ..Self::default()
        }
    }

    /// Report a new canvas size to subsequent [`Scene::client_size`] calls.
    pub fn resize(&mut self, size: Size) {
        self.size = size.sanitized();
    }

    /// Total time advanced so far.
    pub fn now(&self) -> Duration {
        self.elapsed
    }

    /// Advance the clock by `dt` and play every pending chain.
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
        for element in &mut self.elements {
            element.advance(dt);
        }
    }

    /// Run every pending stage to completion.
    pub fn settle(&mut self) {
        for element in &mut self.elements {
            element.settle();
        }
    }

    /// Whether no element has a pending chain.
    pub fn is_settled(&self) -> bool {
        self.elements.iter().all(|e| e.chain.is_empty())
    }

    /// Number of elements with a pending chain.
    pub fn animating_count(&self) -> usize {
        self.elements.iter().filter(|e| !e.chain.is_empty()).count()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the scene holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Look up an existing element without creating it.
    pub fn find(&self, parent: Option<Handle>, name: &str) -> Option<Handle> {
        self.names.get(&(parent, name.to_string())).copied()
    }

    /// View one element.
    pub fn view(&self, handle: Handle) -> Option<ElementView<'_>> {
        self.elements.get(handle.0 as usize).map(|e| ElementView {
            handle,
            name: &e.name,
            kind: e.kind,
            parent: e.parent,
            classes: &e.classes,
            text: e.text.as_deref(),
            axis: e.axis.as_ref(),
            attrs: &e.attrs,
            pending_stages: e.chain.len(),
        })
    }

    /// Every element in creation order.
    pub fn elements(&self) -> impl Iterator<Item = ElementView<'_>> + '_ {
        (0..self.elements.len()).filter_map(|i| self.view(Handle(i as u32)))
    }

    /// Children of `parent` in creation order.
    pub fn children(&self, parent: Handle) -> impl Iterator<Item = ElementView<'_>> + '_ {
        self.elements().filter(move |v| v.parent == Some(parent))
    }

    /// Opacity including every ancestor's opacity.
    pub fn effective_opacity(&self, handle: Handle) -> f64 {
        let mut opacity = 1.0;
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            let Some(e) = self.get(h) else { break };
            opacity *= e.attrs[Attr::Opacity.index()];
            cursor = e.parent;
        }
        opacity
    }

    /// Sum of every ancestor's translation (the element's own included).
    pub fn absolute_offset(&self, handle: Handle) -> Point {
        let mut offset = Point::default();
        let mut cursor = Some(handle);
        while let Some(h) = cursor {
            let Some(e) = self.get(h) else { break };
            offset.x += e.attrs[Attr::TranslateX.index()];
            offset.y += e.attrs[Attr::TranslateY.index()];
            cursor = e.parent;
        }
        offset
    }

    fn get(&self, handle: Handle) -> Option<&Element> {
        self.elements.get(handle.0 as usize)
    }

    fn get_mut(&mut self, handle: Handle) -> Option<&mut Element> {
        self.elements.get_mut(handle.0 as usize)
    }
}

impl Scene for RetainedScene {
    fn client_size(&self) -> Size {
        self.size
    }

    fn select(&mut self, parent: Option<Handle>, kind: ElementKind, name: &str) -> Handle {
        let key = (parent, name.to_string());
        if let Some(&handle) = self.names.get(&key) {
            return handle;
        }
        let handle = Handle(self.elements.len() as u32);
        self.elements.push(Element::new(name, kind, parent));
        self.names.insert(key, handle);
        handle
    }

    fn attr(&self, handle: Handle, attr: Attr) -> f64 {
        self.get(handle)
            .map_or(attr.initial(), |e| e.attrs[attr.index()])
    }

    fn settled_attr(&self, handle: Handle, attr: Attr) -> f64 {
        self.get(handle).map_or(attr.initial(), |e| e.settled(attr))
    }

    fn set_attr(&mut self, handle: Handle, attr: Attr, value: f64) {
        if let Some(e) = self.get_mut(handle) {
            e.attrs[attr.index()] = value;
        }
    }

    fn set_class(&mut self, handle: Handle, class: &'static str, on: bool) {
        let Some(e) = self.get_mut(handle) else {
            return;
        };
        let present = e.classes.contains(&class);
        if on && !present {
            e.classes.push(class);
        } else if !on && present {
            e.classes.retain(|c| *c != class);
        }
    }

    fn has_class(&self, handle: Handle, class: &str) -> bool {
        self.get(handle)
            .is_some_and(|e| e.classes.iter().any(|c| *c == class))
    }

    fn set_text(&mut self, handle: Handle, text: &str) {
        if let Some(e) = self.get_mut(handle) {
            e.text = Some(text.to_string());
        }
    }

    fn set_axis(&mut self, handle: Handle, axis: AxisSpec) {
        if let Some(e) = self.get_mut(handle) {
            e.axis = Some(axis);
        }
    }

    fn transition(&mut self, handle: Handle, transition: Transition) {
        if let Some(e) = self.get_mut(handle) {
            e.chain = transition.stages.into_iter().map(RunningStage::new).collect();
        }
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.names.clear();
    }
}
