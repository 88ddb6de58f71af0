//! Node tree
//!
//! An arena backed node tree with just the primitives the compiler and the
//! view port need: create, read/write attributes, walk children, insert
//! before, remove from parent and deep clone. Nodes are addressed by
//! [`NodeId`]; a detached node stays valid and can be inserted again.

pub mod serializer;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::{Result, TemplatingError};

pub use serializer::to_html;

/// Node identifier inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub name: String,
    pub attrs: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Parentless container for a list of top-level nodes.
    Fragment,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Document { nodes: Vec::new() }
    }

    /// Number of nodes ever created, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: SmallVec::new(),
        });
        id
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            name: name.into(),
            attrs: IndexMap::new(),
        }))
    }

    pub fn create_text(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(value.into()))
    }

    pub fn create_comment(&mut self, value: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(value.into()))
    }

    // ---- reading ----

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Element(_))
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Tag name for elements, `None` for everything else.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.name.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    /// Text content of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(value) | NodeKind::Comment(value) => Some(value),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child(parent, index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child(parent, i))
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// All elements among `roots` and their descendants, in document pre-order.
    pub fn elements_in_order(&self, roots: &[NodeId]) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                result.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        result
    }

    // ---- writing ----

    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let NodeKind::Element(el) = &mut self.nodes[id.index()].kind {
            el.attrs.insert(name.into(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => el.attrs.shift_remove(name),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeKind::Text(text) | NodeKind::Comment(text) = &mut self.nodes[id.index()].kind {
            *text = value.into();
        }
    }

    /// Detaches `id` from its parent. Detaching a parentless node is a no-op.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `node` into `parent` right before `reference`, or at the end
    /// when `reference` is `None`. `node` is detached from its old parent first.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        if matches!(self.kind(parent), NodeKind::Text(_) | NodeKind::Comment(_)) {
            return Err(TemplatingError::Hierarchy(
                "text and comment nodes cannot have children".to_string(),
            ));
        }
        if self.is_ancestor_of(node, parent) {
            return Err(TemplatingError::Hierarchy(
                "a node cannot be inserted into itself or its descendants".to_string(),
            ));
        }
        if let Some(reference) = reference {
            if reference == node {
                // Inserting a node before itself keeps it where it is.
                return Ok(());
            }
            if self.parent(reference) != Some(parent) {
                return Err(TemplatingError::Hierarchy(
                    "reference node is not a child of the given parent".to_string(),
                ));
            }
        }

        self.remove(node);
        let children = &mut self.nodes[parent.index()].children;
        let position = match reference {
            Some(reference) => children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(children.len()),
            None => children.len(),
        };
        children.insert(position, node);
        self.nodes[node.index()].parent = Some(parent);
        Ok(())
    }

    /// Puts `new_child` where `old_child` was and detaches `old_child`.
    pub fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> Result<()> {
        self.insert_before(parent, new_child, Some(old_child))?;
        self.remove(old_child);
        Ok(())
    }

    /// Detaches all children of `id` and returns them in order.
    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children: Vec<NodeId> = self.nodes[id.index()].children.drain(..).collect();
        for child in &children {
            self.nodes[child.index()].parent = None;
        }
        children
    }

    /// Deep copy of `id` inside this document. The copy has no parent.
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let kind = self.kind(id).clone();
        let copy = self.alloc(kind);
        let children: SmallVec<[NodeId; 4]> = self.nodes[id.index()].children.clone();
        for child in children {
            let child_copy = self.clone_node(child);
            self.push_child(copy, child_copy);
        }
        copy
    }

    /// Deep copy of `id` from `source` into this document. The copy has no parent.
    pub fn import_node(&mut self, source: &Document, id: NodeId) -> NodeId {
        let copy = self.alloc(source.kind(id).clone());
        for &child in source.children(id) {
            let child_copy = self.import_node(source, child);
            self.push_child(copy, child_copy);
        }
        copy
    }

    /// Appends a parentless node without any hierarchy checks.
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }
}
