//! In-memory document model.
//!
//! A flat arena of elements with parent links. It carries exactly the surface
//! the page scripts touch: ids, attributes, classes, text content, a
//! visibility flag and the root `lang`/`dir` attributes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// Attribute that opts an element into translation; its value is the dictionary key.
pub const I18N_ATTR: &str = "data-i18n";

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    pub text: String,
    pub hidden: bool,
    parent: Option<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.insert(class.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }

    /// Dictionary key for translatable elements.
    pub fn i18n_key(&self) -> Option<&str> {
        self.attr(I18N_ATTR).filter(|key| !key.is_empty())
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    /// `lang` attribute of the root element.
    pub lang: String,
    /// `dir` attribute of the root element.
    pub dir: String,
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element` as a top-level node.
    pub fn append(&mut self, element: Element) -> NodeId {
        self.push(element, None)
    }

    /// Append `element` as a child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, element: Element) -> NodeId {
        self.push(element, Some(parent))
    }

    fn push(&mut self, mut element: Element, parent: Option<NodeId>) -> NodeId {
        element.parent = parent.filter(|p| p.0 < self.elements.len());
        self.elements.push(element);
        NodeId(self.elements.len() - 1)
    }

    pub fn get(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.elements
            .iter()
            .position(|el| el.id.as_deref() == Some(id))
            .map(NodeId)
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements
            .iter_mut()
            .find(|el| el.id.as_deref() == Some(id))
    }

    /// All elements carrying `name`, in document order.
    pub fn with_attr(&self, name: &str) -> Vec<NodeId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.has_attr(name))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Mutable iterator over translatable elements.
    pub fn translatable_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.elements.iter_mut().filter(|el| el.has_attr(I18N_ATTR))
    }

    pub fn translatable(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|el| el.has_attr(I18N_ATTR))
    }

    /// Walk from `node` up through its ancestors, inclusive.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self.get(node).map(|_| node);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.get(current).and_then(Element::parent);
            Some(current)
        })
    }

    /// Nearest inclusive ancestor of `node` whose id is `id`.
    pub fn closest_id(&self, node: NodeId, id: &str) -> Option<NodeId> {
        self.ancestors(node)
            .find(|n| self.get(*n).and_then(|el| el.id.as_deref()) == Some(id))
    }

    /// Whether `node` is `ancestor` or lives beneath it.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// Move the value of attribute `from` to `to` on every element that has it.
    /// Returns how many elements were rewritten.
    pub fn rename_attr(&mut self, from: &str, to: &str) -> usize {
        let mut renamed = 0;
        for el in &mut self.elements {
            if let Some(value) = el.attributes.remove(from) {
                el.attributes.insert(to.to_string(), value);
                renamed += 1;
            }
        }
        renamed
    }
}

/// Document shared between the controller, UI collaborators and spawned timers.
///
/// Locks are held only for synchronous mutation, never across an await, so
/// other tasks never observe a half-applied change.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<Mutex<Document>>);

impl SharedDocument {
    pub fn new(document: Document) -> Self {
        Self(Arc::new(Mutex::new(document)))
    }

    pub fn lock(&self) -> MutexGuard<'_, Document> {
        // A poisoned lock only means a panic happened mid-mutation elsewhere;
        // the arena itself is still structurally valid.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the document.
    pub fn with<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.lock())
    }
}

impl From<Document> for SharedDocument {
    fn from(document: Document) -> Self {
        Self::new(document)
    }
}
