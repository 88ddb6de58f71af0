//! Template Compiler
//!
//! Walks a node list depth-first in document order, asks the directive
//! registry which directives sit on each element and records the result as
//! a binder list. Template and component directives get their own nested
//! [`ViewFactory`], compiled recursively.
//!
//! The only mutation done to the input tree is the content extraction of
//! template directives: a plain element keeps its place and gets an anchor
//! comment as its only child, a template element is swapped for the anchor.

use std::collections::HashMap;
use std::sync::Arc;

use crate::binder::{
    ComponentBinding, ElementBinder, ElementRole, NonElementBinder, TemplateBinding,
};
use crate::config::CompilerConfig;
use crate::directive::{
    ComponentTemplate, DirectiveDescriptor, DirectiveKind, DirectiveRegistry, MatchedDirective,
};
use crate::dom::{Document, NodeId, NodeKind};
use crate::error::{Result, TemplatingError};
use crate::markup;
use crate::view_factory::ViewFactory;

/// Output of one compilation: the (possibly anchor-substituted) top-level
/// nodes and their binders.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub template_nodes: Vec<NodeId>,
    pub element_binders: Vec<ElementBinder>,
}

/// The directive that takes ownership of an element, if any.
enum Claim {
    Template(Arc<DirectiveDescriptor>),
    Component {
        index: usize,
        directive: Arc<DirectiveDescriptor>,
        template: ComponentTemplate,
    },
}

struct CompileState {
    binders: Vec<ElementBinder>,
    /// Elements seen so far, in pre-order.
    element_count: usize,
}

pub struct Compiler {
    registry: Arc<DirectiveRegistry>,
    config: CompilerConfig,
    /// Inline component templates, compiled once per registration index.
    component_views: HashMap<usize, Arc<ViewFactory>>,
    /// Components whose inline template is being compiled right now.
    compiling: Vec<usize>,
}

impl Compiler {
    pub fn new(registry: Arc<DirectiveRegistry>) -> Self {
        Compiler {
            registry,
            config: CompilerConfig::default(),
            component_views: HashMap::new(),
            compiling: Vec::new(),
        }
    }

    pub fn with_config(registry: Arc<DirectiveRegistry>, config: CompilerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Compiler {
            config,
            ..Compiler::new(registry)
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &DirectiveRegistry {
        &self.registry
    }

    /// Compiles `nodes` in place inside `doc`.
    pub fn compile(&mut self, doc: &mut Document, nodes: &[NodeId]) -> Result<CompileResult> {
        let mut state = CompileState {
            binders: vec![ElementBinder::root()],
            element_count: 0,
        };
        let template_nodes = self.compile_nodes(doc, nodes, 0, 1, &mut state)?;
        log::debug!(
            "compiled {} top-level node(s) into {} element binder(s)",
            template_nodes.len(),
            state.binders.len()
        );
        Ok(CompileResult {
            template_nodes,
            element_binders: state.binders,
        })
    }

    /// Compiles `nodes` and snapshots the result into a [`ViewFactory`].
    pub fn compile_factory(&mut self, doc: &mut Document, nodes: &[NodeId]) -> Result<Arc<ViewFactory>> {
        let result = self.compile(doc, nodes)?;
        Ok(Arc::new(ViewFactory::new(
            doc,
            &result.template_nodes,
            result.element_binders,
        )))
    }

    /// Parses `source` as markup and compiles it.
    pub fn compile_html(&mut self, source: &str) -> Result<Arc<ViewFactory>> {
        let mut doc = Document::new();
        let nodes = markup::parse(&mut doc, source)?;
        self.compile_factory(&mut doc, &nodes)
    }

    /// Compiles a sibling list whose bindings belong to `binder`. Returns the
    /// list as it looks afterwards, with template elements swapped for anchors.
    fn compile_nodes(
        &mut self,
        doc: &mut Document,
        nodes: &[NodeId],
        binder: usize,
        level: usize,
        state: &mut CompileState,
    ) -> Result<Vec<NodeId>> {
        let mut result = Vec::with_capacity(nodes.len());
        for (index, &node) in nodes.iter().enumerate() {
            if doc.is_element(node) {
                result.push(self.compile_element(doc, node, index, binder, level, state)?);
                continue;
            }
            let interpolated = match doc.kind(node) {
                NodeKind::Text(value) => self.config.interpolation.requires_binding(value),
                _ => false,
            };
            if interpolated {
                state.binders[binder]
                    .non_element_binders
                    .push(NonElementBinder::text(index));
            }
            result.push(node);
        }
        Ok(result)
    }

    fn compile_element(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        index_in_parent: usize,
        parent_binder: usize,
        level: usize,
        state: &mut CompileState,
    ) -> Result<NodeId> {
        let matched = self.registry.match_element(doc, element);
        let (decorators, claim) = classify(doc, element, matched)?;

        if let Some(Claim::Template(directive)) = &claim {
            if self.is_template_element(doc, element) {
                let directive = Arc::clone(directive);
                return self.extract_template_element(
                    doc,
                    element,
                    directive,
                    decorators,
                    index_in_parent,
                    parent_binder,
                    state,
                );
            }
        }

        let element_index = state.element_count;
        state.element_count += 1;
        let mut binder = ElementBinder::for_element(level, element_index);
        binder.directives = decorators;

        let mut descend = true;
        match claim {
            Some(Claim::Template(directive)) => {
                let content = doc.take_children(element);
                let view_factory = self.compile_factory(doc, &content)?;
                let anchor = doc.create_comment(self.config.anchor_text.clone());
                doc.append_child(element, anchor)?;
                binder.role = ElementRole::Template(TemplateBinding {
                    directive,
                    view_factory,
                });
                descend = false;
            }
            Some(Claim::Component {
                index,
                directive,
                template,
            }) => {
                let view_factory = self.component_view(index, &directive, &template)?;
                binder.role = ElementRole::Component(ComponentBinding {
                    directive,
                    view_factory,
                });
            }
            None => {}
        }

        log::trace!(
            "element <{}> #{} at level {}: {:?}",
            doc.tag_name(element).unwrap_or_default(),
            element_index,
            level,
            binder.directive_names()
        );

        let slot = state.binders.len();
        state.binders.push(binder);
        if descend {
            let children = doc.children(element).to_vec();
            self.compile_nodes(doc, &children, slot, level + 1, state)?;
        }
        if !state.binders[slot].has_bindings() {
            state.binders.remove(slot);
        }
        Ok(element)
    }

    fn is_template_element(&self, doc: &Document, element: NodeId) -> bool {
        doc.tag_name(element)
            .map_or(false, |name| name.eq_ignore_ascii_case(&self.config.template_tag))
    }

    /// A template directive on a template element: the whole element gives
    /// way to an anchor and only its content is kept as the nested template.
    /// Decorators of the template element move to the nested root binder.
    #[allow(clippy::too_many_arguments)]
    fn extract_template_element(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        directive: Arc<DirectiveDescriptor>,
        decorators: Vec<Arc<DirectiveDescriptor>>,
        index_in_parent: usize,
        parent_binder: usize,
        state: &mut CompileState,
    ) -> Result<NodeId> {
        let content = doc.take_children(element);
        let mut result = self.compile(doc, &content)?;
        if let Some(root) = result.element_binders.first_mut() {
            root.directives = decorators;
        }
        let view_factory = Arc::new(ViewFactory::new(
            doc,
            &result.template_nodes,
            result.element_binders,
        ));

        let anchor = doc.create_comment(self.config.anchor_text.clone());
        if let Some(parent) = doc.parent(element) {
            doc.replace_child(parent, anchor, element)?;
        }
        state.binders[parent_binder]
            .non_element_binders
            .push(NonElementBinder::anchor(
                index_in_parent,
                TemplateBinding {
                    directive,
                    view_factory,
                },
            ));
        Ok(anchor)
    }

    fn component_view(
        &mut self,
        index: usize,
        directive: &DirectiveDescriptor,
        template: &ComponentTemplate,
    ) -> Result<Arc<ViewFactory>> {
        let source = match template {
            ComponentTemplate::Compiled(view_factory) => return Ok(Arc::clone(view_factory)),
            ComponentTemplate::Inline(source) => source,
        };
        if let Some(view_factory) = self.component_views.get(&index) {
            return Ok(Arc::clone(view_factory));
        }
        if self.compiling.contains(&index) {
            return Err(TemplatingError::RecursiveComponent(directive.name.clone()));
        }

        log::debug!("compiling inline template of component {}", directive.name);
        self.compiling.push(index);
        let compiled = self.compile_html(source);
        self.compiling.pop();

        let view_factory = compiled?;
        self.component_views.insert(index, Arc::clone(&view_factory));
        Ok(view_factory)
    }
}

/// Splits the matches of one element into decorators and the single
/// directive allowed to own the element.
fn classify(
    doc: &Document,
    element: NodeId,
    matched: Vec<MatchedDirective>,
) -> Result<(Vec<Arc<DirectiveDescriptor>>, Option<Claim>)> {
    let mut decorators = Vec::new();
    let mut claim: Option<Claim> = None;

    for MatchedDirective { index, directive } in matched {
        if directive.kind.is_decorator() {
            decorators.push(directive);
            continue;
        }
        let next = match &directive.kind {
            DirectiveKind::Decorator => continue,
            DirectiveKind::Template => Claim::Template(Arc::clone(&directive)),
            DirectiveKind::Component(template) => Claim::Component {
                index,
                template: template.clone(),
                directive: Arc::clone(&directive),
            },
        };
        if let Some(existing) = &claim {
            return Err(TemplatingError::ConflictingDirectives {
                element: doc.tag_name(element).unwrap_or_default().to_string(),
                first: existing.directive().name.clone(),
                second: directive.name.clone(),
            });
        }
        claim = Some(next);
    }
    Ok((decorators, claim))
}

impl Claim {
    fn directive(&self) -> &DirectiveDescriptor {
        match self {
            Claim::Template(directive) => directive.as_ref(),
            Claim::Component { directive, .. } => directive.as_ref(),
        }
    }
}
