#![allow(dead_code)]

/**
 * Templating Test Utilities
 *
 * Binder stringification shared by the compiler and view factory tests.
 */
use std::sync::Arc;

use templating::{
    to_html, Compiler, DirectiveDescriptor, DirectiveRegistry, Document, ElementBinder, NodeId,
    ViewFactory,
};

pub fn compiler(descriptors: Vec<DirectiveDescriptor>) -> Compiler {
    let registry = DirectiveRegistry::from_descriptors(descriptors).expect("valid directives");
    Compiler::new(Arc::new(registry))
}

pub fn html(doc: &Document, nodes: &[NodeId]) -> String {
    to_html(doc, nodes)
}

/// Renders a binder list as `<attr values>(<bound node html>,...)` per binder,
/// joined by `,`. Attribute values of `attrs` on the binder's element are
/// concatenated in front of the parentheses.
///
/// Elements are located only by `element_index` and bound nodes only by
/// `index_in_parent`, the same way a view factory locates them.
pub fn stringify_binders(
    doc: &Document,
    nodes: &[NodeId],
    binders: &[ElementBinder],
    attrs: &[&str],
) -> String {
    let elements = doc.elements_in_order(nodes);
    binders
        .iter()
        .map(|binder| {
            let element = binder.element_index.map(|index| elements[index]);
            let siblings: &[NodeId] = match element {
                Some(element) => doc.children(element),
                None => nodes,
            };
            let bound: Vec<String> = binder
                .non_element_binders
                .iter()
                .map(|neb| to_html(doc, &[siblings[neb.index_in_parent]]))
                .collect();
            let annotation_values: String = element
                .map(|element| {
                    attrs
                        .iter()
                        .filter_map(|name| doc.attribute(element, name))
                        .collect()
                })
                .unwrap_or_default();
            format!("{}({})", annotation_values, bound.join(","))
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn stringify_factory(factory: &ViewFactory, attrs: &[&str]) -> String {
    stringify_binders(
        factory.template(),
        factory.template_nodes(),
        factory.element_binders(),
        attrs,
    )
}

pub fn stringify_levels(binders: &[ElementBinder]) -> String {
    binders
        .iter()
        .map(|binder| binder.level.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// The nested factory of the first template anchor among the binders.
pub fn anchor_template(binders: &[ElementBinder]) -> Arc<ViewFactory> {
    binders
        .iter()
        .flat_map(|binder| binder.non_element_binders.iter())
        .find_map(|neb| neb.template())
        .map(|template| Arc::clone(&template.view_factory))
        .expect("a template anchor")
}

/// The nested factory of the first template-role element binder.
pub fn element_template(binders: &[ElementBinder]) -> Arc<ViewFactory> {
    binders
        .iter()
        .find_map(|binder| binder.template())
        .map(|template| Arc::clone(&template.view_factory))
        .expect("an element owned by a template directive")
}

pub fn component_view(binders: &[ElementBinder]) -> Arc<ViewFactory> {
    binders
        .iter()
        .find_map(|binder| binder.component())
        .map(|component| Arc::clone(&component.view_factory))
        .expect("a component element")
}
