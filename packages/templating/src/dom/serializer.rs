//! Node serializer
//!
//! Turns nodes back into markup. Used by tests and by the CLI to show
//! compiled templates.

use super::{Document, ElementData, NodeId, NodeKind};
use crate::markup::tags::is_void_element;

/// Serializes `nodes` and their descendants.
pub fn to_html(doc: &Document, nodes: &[NodeId]) -> String {
    let mut out = String::new();
    for &node in nodes {
        visit_node(doc, node, &mut out);
    }
    out
}

fn visit_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.kind(node) {
        NodeKind::Fragment => {
            for &child in doc.children(node) {
                visit_node(doc, child, out);
            }
        }
        NodeKind::Element(el) => visit_element(doc, node, el, out),
        NodeKind::Text(value) => out.push_str(value),
        NodeKind::Comment(value) => {
            out.push_str("<!--");
            out.push_str(value);
            out.push_str("-->");
        }
    }
}

fn visit_element(doc: &Document, node: NodeId, el: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
    out.push('>');
    if is_void_element(&el.name) {
        return;
    }
    for &child in doc.children(node) {
        visit_node(doc, child, out);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}
