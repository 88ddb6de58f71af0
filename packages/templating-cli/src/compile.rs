//! Template compilation entry used by `ngt`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use templating::{
    Compiler, CompilerConfig, DirectiveRegistry, ElementBinder, ElementRole, NonElementKind,
    ViewFactory,
};

use crate::config::directives::DirectivesFile;

/// Compiles the template at `template`, with the directives registered in
/// `directives` if given.
pub fn compile_template(template: &Path, directives: Option<&Path>) -> anyhow::Result<Arc<ViewFactory>> {
    let (registry, config) = match directives {
        Some(path) => DirectivesFile::load(path)?.into_registry()?,
        None => (DirectiveRegistry::new(), CompilerConfig::default()),
    };
    let source = fs::read_to_string(template)
        .with_context(|| format!("failed to read template {}", template.display()))?;

    let mut compiler = Compiler::with_config(Arc::new(registry), config)?;
    let factory = compiler
        .compile_html(&source)
        .with_context(|| format!("failed to compile {}", template.display()))?;
    log::info!(
        "compiled {} into {} element binder(s)",
        template.display(),
        factory.element_binders().len()
    );
    Ok(factory)
}

/// Indented, human readable binder tree, nested templates included.
pub fn describe_tree(factory: &ViewFactory) -> String {
    let mut out = String::new();
    write_factory(&mut out, factory, 0);
    out
}

fn write_factory(out: &mut String, factory: &ViewFactory, depth: usize) {
    let pad = "  ".repeat(depth);
    let _ = writeln!(out, "{}template {}", pad, factory.to_html());
    for (index, binder) in factory.element_binders().iter().enumerate() {
        write_binder(out, index, binder, depth + 1);
    }
}

fn write_binder(out: &mut String, index: usize, binder: &ElementBinder, depth: usize) {
    let pad = "  ".repeat(depth);
    let target = match binder.element_index {
        Some(element) => format!("element #{}", element),
        None => "root".to_string(),
    };
    let _ = write!(out, "{}binder #{} level {} {}", pad, index, binder.level, target);
    let names = binder.directive_names();
    if !names.is_empty() {
        let _ = write!(out, " [{}]", names.join(", "));
    }
    out.push('\n');

    for neb in &binder.non_element_binders {
        match &neb.kind {
            NonElementKind::Text => {
                let _ = writeln!(out, "{}  text @{}", pad, neb.index_in_parent);
            }
            NonElementKind::TemplateAnchor(template) => {
                let _ = writeln!(
                    out,
                    "{}  anchor @{} {} {}",
                    pad,
                    neb.index_in_parent,
                    template.directive.kind.label(),
                    template.directive.name
                );
                write_factory(out, &template.view_factory, depth + 2);
            }
        }
    }

    match &binder.role {
        ElementRole::Decorated => {}
        ElementRole::Template(template) => {
            let _ = writeln!(out, "{}  {} {}", pad, template.directive.kind.label(), template.directive.name);
            write_factory(out, &template.view_factory, depth + 2);
        }
        ElementRole::Component(component) => {
            let _ = writeln!(out, "{}  {} {}", pad, component.directive.kind.label(), component.directive.name);
            write_factory(out, &component.view_factory, depth + 2);
        }
    }
}
