#![deny(clippy::all)]

/**
 * Templating - directive compiler and view placement
 *
 * Compiles markup into reusable binder trees and manages instantiated views
 * inside anchor-bounded document regions.
 */

// Core modules
mod assertions;
pub mod binder;
pub mod compiler;
pub mod config;
pub mod directive;
pub mod directive_matching;
pub mod error;
pub mod interpolation;
pub mod view;
pub mod view_factory;

// Node tree and markup
pub mod dom;
pub mod markup;

// Re-exports
pub use binder::{
    ComponentBinding, ElementBinder, ElementRole, NonElementBinder, NonElementKind,
    TemplateBinding,
};
pub use compiler::{CompileResult, Compiler};
pub use config::CompilerConfig;
pub use directive::{ComponentTemplate, DirectiveDescriptor, DirectiveKind, DirectiveRegistry};
pub use dom::{to_html, Document, NodeId, NodeKind};
pub use error::{ParseError, Result, TemplatingError};
pub use interpolation::InterpolationConfig;
pub use view::{LiveBinder, View, ViewId, ViewPort};
pub use view_factory::ViewFactory;
