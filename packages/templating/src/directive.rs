//! Directive registration
//!
//! Descriptors are immutable once created. Registering one parses its
//! selector; a selector that cannot match anything is rejected right there
//! instead of silently never matching during compilation.

use std::sync::Arc;

use crate::directive_matching::{CssSelector, SelectorMatcher};
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::view_factory::ViewFactory;

/// Where a component's view comes from.
#[derive(Debug, Clone)]
pub enum ComponentTemplate {
    /// Markup compiled the first time the component is found.
    Inline(String),
    /// An already compiled view.
    Compiled(Arc<ViewFactory>),
}

#[derive(Debug, Clone)]
pub enum DirectiveKind {
    /// Adds behavior to an element without touching its structure.
    Decorator,
    /// Replaces content with an anchor and owns it as a separate template.
    Template,
    /// Attaches a separately compiled view next to the element's own children.
    Component(ComponentTemplate),
}

impl DirectiveKind {
    pub fn is_decorator(&self) -> bool {
        matches!(self, DirectiveKind::Decorator)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DirectiveKind::Decorator => "decorator",
            DirectiveKind::Template => "template",
            DirectiveKind::Component(_) => "component",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectiveDescriptor {
    pub name: String,
    pub selector: String,
    pub kind: DirectiveKind,
}

impl DirectiveDescriptor {
    pub fn new(name: impl Into<String>, selector: impl Into<String>, kind: DirectiveKind) -> Self {
        DirectiveDescriptor {
            name: name.into(),
            selector: selector.into(),
            kind,
        }
    }

    pub fn decorator(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, selector, DirectiveKind::Decorator)
    }

    pub fn template(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::new(name, selector, DirectiveKind::Template)
    }

    pub fn component(
        name: impl Into<String>,
        selector: impl Into<String>,
        template: ComponentTemplate,
    ) -> Self {
        Self::new(name, selector, DirectiveKind::Component(template))
    }
}

/// A directive found on an element, with its registration index.
#[derive(Debug, Clone)]
pub struct MatchedDirective {
    pub index: usize,
    pub directive: Arc<DirectiveDescriptor>,
}

/// Ordered set of registered directives.
#[derive(Debug, Default)]
pub struct DirectiveRegistry {
    directives: Vec<Arc<DirectiveDescriptor>>,
    matcher: SelectorMatcher<usize>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = DirectiveDescriptor>,
    {
        let mut registry = DirectiveRegistry::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    /// Registers `descriptor` and returns its registration index.
    pub fn register(&mut self, descriptor: DirectiveDescriptor) -> Result<usize> {
        let selectors = CssSelector::parse(&descriptor.selector)?;
        let index = self.directives.len();
        for selector in selectors {
            self.matcher.add_selectable(selector, index);
        }
        log::debug!(
            "registered {} directive {} with selector {}",
            descriptor.kind.label(),
            descriptor.name,
            descriptor.selector
        );
        self.directives.push(Arc::new(descriptor));
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Option<&Arc<DirectiveDescriptor>> {
        self.directives.get(index)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DirectiveDescriptor>> {
        self.directives.iter()
    }

    /// Directives whose selector matches `node`, in registration order.
    /// Non-element nodes never match.
    pub fn match_element(&self, doc: &Document, node: NodeId) -> Vec<MatchedDirective> {
        let Some(css_selector) = CssSelector::from_element(doc, node) else {
            return Vec::new();
        };
        let mut indices = self.matcher.match_all(&css_selector);
        // Alternatives of one selector are registered back to back.
        indices.dedup();
        indices
            .into_iter()
            .map(|index| MatchedDirective {
                index,
                directive: Arc::clone(&self.directives[index]),
            })
            .collect()
    }
}
