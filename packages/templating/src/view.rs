//! Views and view ports
//!
//! A [`View`] is an ordered group of top-level nodes produced by one
//! instantiation. A [`ViewPort`] keeps an ordered sequence of views right in
//! front of a fixed anchor node: after every operation the siblings before
//! the anchor that belong to inserted views are exactly the concatenation of
//! the views' node lists, in sequence order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dom::{Document, NodeId};
use crate::error::{Result, TemplatingError};

static NEXT_VIEW_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(usize);

/// Live nodes found for one binder of the view's factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveBinder {
    pub binder_index: usize,
    /// `None` for the root binder.
    pub element: Option<NodeId>,
    /// One node per non-element binder, in binder order.
    pub non_element_nodes: Vec<NodeId>,
    /// The anchor comment inside an element owned by a template directive.
    pub template_anchor: Option<NodeId>,
}

/// An ordered, movable group of nodes. Not `Clone`: the view is the handle
/// through which its nodes are moved and removed.
#[derive(Debug)]
pub struct View {
    id: ViewId,
    nodes: Vec<NodeId>,
    binders: Vec<LiveBinder>,
}

impl View {
    /// Creates a view over a snapshot of `nodes`.
    pub fn new(nodes: &[NodeId]) -> Self {
        Self::with_binders(nodes, Vec::new())
    }

    pub(crate) fn with_binders(nodes: &[NodeId], binders: Vec<LiveBinder>) -> Self {
        View {
            id: ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: nodes.to_vec(),
            binders,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn binders(&self) -> &[LiveBinder] {
        &self.binders
    }
}

#[derive(Debug)]
struct Slot {
    nodes: Vec<NodeId>,
    prev: Option<ViewId>,
    next: Option<ViewId>,
}

/// Ordered views in front of an anchor node. Inserting a view that is
/// already present moves it.
#[derive(Debug)]
pub struct ViewPort {
    anchor: NodeId,
    slots: HashMap<ViewId, Slot>,
    head: Option<ViewId>,
    tail: Option<ViewId>,
}

impl ViewPort {
    pub fn new(doc: &Document, anchor: NodeId) -> Result<Self> {
        doc.parent(anchor).ok_or(TemplatingError::DetachedAnchor)?;
        Ok(ViewPort {
            anchor,
            slots: HashMap::new(),
            head: None,
            tail: None,
        })
    }

    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, view: &View) -> bool {
        self.slots.contains_key(&view.id)
    }

    pub fn first(&self) -> Option<ViewId> {
        self.head
    }

    pub fn last(&self) -> Option<ViewId> {
        self.tail
    }

    pub fn next_of(&self, view: &View) -> Option<ViewId> {
        self.slots.get(&view.id).and_then(|slot| slot.next)
    }

    pub fn previous_of(&self, view: &View) -> Option<ViewId> {
        self.slots.get(&view.id).and_then(|slot| slot.prev)
    }

    /// Ids of the inserted views in sequence order.
    pub fn views(&self) -> Vec<ViewId> {
        let mut result = Vec::with_capacity(self.slots.len());
        let mut cursor = self.head;
        while let Some(id) = cursor {
            result.push(id);
            cursor = self.slots.get(&id).and_then(|slot| slot.next);
        }
        result
    }

    pub fn append(&mut self, doc: &mut Document, view: &View) -> Result<()> {
        self.check_insertable(doc, view)?;
        self.detach_if_present(doc, view);
        let prev = self.tail;
        self.insert_between(doc, view, prev, None)
    }

    pub fn prepend(&mut self, doc: &mut Document, view: &View) -> Result<()> {
        self.check_insertable(doc, view)?;
        self.detach_if_present(doc, view);
        let next = self.head;
        self.insert_between(doc, view, None, next)
    }

    pub fn insert_before(&mut self, doc: &mut Document, view: &View, reference: &View) -> Result<()> {
        self.check_reference(view, reference)?;
        self.check_insertable(doc, view)?;
        self.detach_if_present(doc, view);
        let prev = self.slots.get(&reference.id).and_then(|slot| slot.prev);
        self.insert_between(doc, view, prev, Some(reference.id))
    }

    pub fn insert_after(&mut self, doc: &mut Document, view: &View, reference: &View) -> Result<()> {
        self.check_reference(view, reference)?;
        self.check_insertable(doc, view)?;
        self.detach_if_present(doc, view);
        let next = self.slots.get(&reference.id).and_then(|slot| slot.next);
        self.insert_between(doc, view, Some(reference.id), next)
    }

    /// Detaches the view's nodes. The view can be inserted again later.
    pub fn remove(&mut self, doc: &mut Document, view: &View) -> Result<()> {
        if !self.contains(view) {
            return Err(TemplatingError::ViewNotInPort);
        }
        self.detach_if_present(doc, view);
        log::debug!("removed view {:?}, {} view(s) left", view.id, self.slots.len());
        Ok(())
    }

    fn check_reference(&self, view: &View, reference: &View) -> Result<()> {
        if view.id == reference.id || !self.contains(reference) {
            return Err(TemplatingError::ViewNotInPort);
        }
        Ok(())
    }

    /// Everything that can fail is checked before the first mutation.
    fn check_insertable(&self, doc: &Document, view: &View) -> Result<()> {
        let parent = doc.parent(self.anchor).ok_or(TemplatingError::DetachedAnchor)?;
        if view.nodes.iter().any(|&node| doc.is_ancestor_of(node, parent)) {
            return Err(TemplatingError::Hierarchy(
                "a view cannot contain the parent of its own view port".to_string(),
            ));
        }
        if view.nodes.contains(&self.anchor) {
            return Err(TemplatingError::Hierarchy(
                "a view cannot contain the anchor of its own view port".to_string(),
            ));
        }
        Ok(())
    }

    fn detach_if_present(&mut self, doc: &mut Document, view: &View) {
        let Some(slot) = self.slots.remove(&view.id) else {
            return;
        };
        for &node in &slot.nodes {
            doc.remove(node);
        }
        match slot.prev {
            Some(prev) => {
                if let Some(prev_slot) = self.slots.get_mut(&prev) {
                    prev_slot.next = slot.next;
                }
            }
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next) => {
                if let Some(next_slot) = self.slots.get_mut(&next) {
                    next_slot.prev = slot.prev;
                }
            }
            None => self.tail = slot.prev,
        }
    }

    /// First node of `cursor` or of the first non-empty view after it.
    fn first_node_from(&self, mut cursor: Option<ViewId>) -> Option<NodeId> {
        while let Some(id) = cursor {
            let slot = self.slots.get(&id)?;
            if let Some(&node) = slot.nodes.first() {
                return Some(node);
            }
            cursor = slot.next;
        }
        None
    }

    fn insert_between(
        &mut self,
        doc: &mut Document,
        view: &View,
        prev: Option<ViewId>,
        next: Option<ViewId>,
    ) -> Result<()> {
        let parent = doc.parent(self.anchor).ok_or(TemplatingError::DetachedAnchor)?;
        let before = self.first_node_from(next).unwrap_or(self.anchor);
        for &node in &view.nodes {
            doc.insert_before(parent, node, Some(before))?;
        }

        match prev {
            Some(prev) => {
                if let Some(prev_slot) = self.slots.get_mut(&prev) {
                    prev_slot.next = Some(view.id);
                }
            }
            None => self.head = Some(view.id),
        }
        match next {
            Some(next) => {
                if let Some(next_slot) = self.slots.get_mut(&next) {
                    next_slot.prev = Some(view.id);
                }
            }
            None => self.tail = Some(view.id),
        }
        self.slots.insert(
            view.id,
            Slot {
                nodes: view.nodes.clone(),
                prev,
                next,
            },
        );
        log::debug!(
            "inserted view {:?} ({} node(s)) between {:?} and {:?}",
            view.id,
            view.nodes.len(),
            prev,
            next
        );
        Ok(())
    }
}
