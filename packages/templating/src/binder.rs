//! Binder tree
//!
//! The compiled, reusable shape of a template. Index 0 of every binder list
//! is the implicit root binder standing for the template's top-level node
//! list; the remaining binders follow the document order of the elements
//! they describe. Binders are immutable after compilation and shared by
//! every view created from the same template.

use std::sync::Arc;

use crate::directive::DirectiveDescriptor;
use crate::view_factory::ViewFactory;

/// A template directive together with the view compiled from its content.
#[derive(Debug, Clone)]
pub struct TemplateBinding {
    pub directive: Arc<DirectiveDescriptor>,
    pub view_factory: Arc<ViewFactory>,
}

/// A component directive together with its compiled view.
#[derive(Debug, Clone)]
pub struct ComponentBinding {
    pub directive: Arc<DirectiveDescriptor>,
    pub view_factory: Arc<ViewFactory>,
}

/// What owns the element, decided once at compile time.
#[derive(Debug, Clone, Default)]
pub enum ElementRole {
    /// Only decorating directives (possibly none) and text bindings.
    #[default]
    Decorated,
    /// Content moved into a nested template, an anchor comment left behind.
    Template(TemplateBinding),
    /// A component view attached next to the element's own children.
    Component(ComponentBinding),
}

#[derive(Debug, Clone)]
pub enum NonElementKind {
    /// Text with interpolation markers.
    Text,
    /// Anchor comment standing in for a removed template element.
    TemplateAnchor(TemplateBinding),
}

/// A bound text or comment node, located by its position among the children
/// of the binder's element (or among the top-level nodes for the root binder).
#[derive(Debug, Clone)]
pub struct NonElementBinder {
    pub index_in_parent: usize,
    pub kind: NonElementKind,
}

impl NonElementBinder {
    pub fn text(index_in_parent: usize) -> Self {
        NonElementBinder {
            index_in_parent,
            kind: NonElementKind::Text,
        }
    }

    pub fn anchor(index_in_parent: usize, template: TemplateBinding) -> Self {
        NonElementBinder {
            index_in_parent,
            kind: NonElementKind::TemplateAnchor(template),
        }
    }

    pub fn template(&self) -> Option<&TemplateBinding> {
        match &self.kind {
            NonElementKind::TemplateAnchor(template) => Some(template),
            NonElementKind::Text => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElementBinder {
    /// 0 for the root binder, element nesting depth otherwise.
    pub level: usize,
    /// Pre-order position of the element among all elements of the
    /// template. `None` for the root binder.
    pub element_index: Option<usize>,
    /// Decorating directives, in registration order.
    pub directives: Vec<Arc<DirectiveDescriptor>>,
    pub role: ElementRole,
    pub non_element_binders: Vec<NonElementBinder>,
}

impl ElementBinder {
    pub fn root() -> Self {
        ElementBinder::default()
    }

    pub fn for_element(level: usize, element_index: usize) -> Self {
        ElementBinder {
            level,
            element_index: Some(element_index),
            ..ElementBinder::default()
        }
    }

    pub fn is_root(&self) -> bool {
        self.element_index.is_none()
    }

    /// Whether anything on or directly below the element needs binding.
    pub fn has_bindings(&self) -> bool {
        !self.directives.is_empty()
            || !matches!(self.role, ElementRole::Decorated)
            || !self.non_element_binders.is_empty()
    }

    pub fn template(&self) -> Option<&TemplateBinding> {
        match &self.role {
            ElementRole::Template(template) => Some(template),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&ComponentBinding> {
        match &self.role {
            ElementRole::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Names of every directive on the element, decorators first.
    pub fn directive_names(&self) -> Vec<&str> {
        let claiming = match &self.role {
            ElementRole::Decorated => None,
            ElementRole::Template(t) => Some(t.directive.name.as_str()),
            ElementRole::Component(c) => Some(c.directive.name.as_str()),
        };
        self.directives
            .iter()
            .map(|d| d.name.as_str())
            .chain(claiming)
            .collect()
    }
}
