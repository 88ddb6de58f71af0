//! View Factory
//!
//! Owns a compiled template: a private snapshot of its nodes plus the binder
//! list. Instantiation never looks at node content. It relies on the clone
//! having exactly the shape of the template and finds bound nodes purely by
//! position: elements by their pre-order index, text and anchors by their
//! index among their parent's children. Handing in a node list of a
//! different shape gives an undefined binder to node association; it is not
//! detected.

use serde_json::{json, Value};

use crate::binder::{ElementBinder, ElementRole, NonElementKind};
use crate::dom::{to_html, Document, NodeId};
use crate::view::{LiveBinder, View};

#[derive(Debug)]
pub struct ViewFactory {
    template: Document,
    template_nodes: Vec<NodeId>,
    element_binders: Vec<ElementBinder>,
}

impl ViewFactory {
    /// Snapshots `nodes` out of `source`; later changes to `source` do not
    /// reach the factory.
    pub fn new(source: &Document, nodes: &[NodeId], element_binders: Vec<ElementBinder>) -> Self {
        let mut template = Document::new();
        let fragment = template.create_fragment();
        let template_nodes = nodes
            .iter()
            .map(|&node| {
                let copy = template.import_node(source, node);
                template.push_child(fragment, copy);
                copy
            })
            .collect();
        ViewFactory {
            template,
            template_nodes,
            element_binders,
        }
    }

    pub fn template(&self) -> &Document {
        &self.template
    }

    pub fn template_nodes(&self) -> &[NodeId] {
        &self.template_nodes
    }

    pub fn element_binders(&self) -> &[ElementBinder] {
        &self.element_binders
    }

    /// The template as markup.
    pub fn to_html(&self) -> String {
        to_html(&self.template, &self.template_nodes)
    }

    /// Fresh, parentless copies of the template's top-level nodes in `doc`.
    pub fn clone_nodes(&self, doc: &mut Document) -> Vec<NodeId> {
        self.template_nodes
            .iter()
            .map(|&node| doc.import_node(&self.template, node))
            .collect()
    }

    /// Creates a view from this factory's own template.
    pub fn create_view(&self, doc: &mut Document) -> View {
        let nodes = self.clone_nodes(doc);
        self.instantiate(doc, &nodes)
    }

    /// Creates a view over `nodes`, which must be a clone of the template.
    pub fn instantiate(&self, doc: &Document, nodes: &[NodeId]) -> View {
        let elements = doc.elements_in_order(nodes);
        let binders = self
            .element_binders
            .iter()
            .enumerate()
            .map(|(binder_index, binder)| {
                let element = binder
                    .element_index
                    .and_then(|index| elements.get(index).copied());
                let siblings: &[NodeId] = match (binder.element_index, element) {
                    (None, _) => nodes,
                    (Some(_), Some(element)) => doc.children(element),
                    (Some(_), None) => &[],
                };
                let non_element_nodes = binder
                    .non_element_binders
                    .iter()
                    .filter_map(|neb| siblings.get(neb.index_in_parent).copied())
                    .collect();
                let template_anchor = match binder.role {
                    ElementRole::Template(_) => element.and_then(|element| doc.child(element, 0)),
                    _ => None,
                };
                LiveBinder {
                    binder_index,
                    element,
                    non_element_nodes,
                    template_anchor,
                }
            })
            .collect();
        View::with_binders(nodes, binders)
    }

    /// JSON description of the binder tree, nested templates included.
    pub fn describe(&self) -> Value {
        json!({
            "html": self.to_html(),
            "elementBinders": self
                .element_binders
                .iter()
                .map(describe_binder)
                .collect::<Vec<_>>(),
        })
    }
}

fn describe_binder(binder: &ElementBinder) -> Value {
    let non_element_binders: Vec<Value> = binder
        .non_element_binders
        .iter()
        .map(|neb| match &neb.kind {
            NonElementKind::Text => json!({
                "indexInParent": neb.index_in_parent,
                "kind": "text",
            }),
            NonElementKind::TemplateAnchor(template) => json!({
                "indexInParent": neb.index_in_parent,
                "kind": "templateAnchor",
                "directive": template.directive.name,
                "template": template.view_factory.describe(),
            }),
        })
        .collect();

    let mut value = json!({
        "level": binder.level,
        "elementIndex": binder.element_index,
        "directives": binder.directives.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
        "nonElementBinders": non_element_binders,
    });
    match &binder.role {
        ElementRole::Decorated => {}
        ElementRole::Template(template) => {
            value["template"] = json!({
                "directive": template.directive.name,
                "view": template.view_factory.describe(),
            });
        }
        ElementRole::Component(component) => {
            value["component"] = json!({
                "directive": component.directive.name,
                "view": component.view_factory.describe(),
            });
        }
    }
    value
}
