//! Markup Parser
//!
//! Builds nodes from the lexer tokens. Tree building is lenient the way a
//! browser is: stray end tags are dropped and elements left open at the end
//! of the input are closed implicitly.

use super::lexer::{tokenize, SpannedToken, Token};
use super::tags::is_void_element;
use crate::dom::{Document, NodeId};
use crate::error::Result;

/// Parses `source` into `doc`. The returned top-level nodes are children of
/// a fresh fragment, so they always share a parent.
pub fn parse(doc: &mut Document, source: &str) -> Result<Vec<NodeId>> {
    let tokens = tokenize(source)?;
    let fragment = doc.create_fragment();
    let mut builder = TreeBuilder {
        doc,
        root: fragment,
        container_stack: Vec::new(),
    };
    for token in tokens {
        builder.consume(token)?;
    }
    builder.finish();
    Ok(builder.doc.children(fragment).to_vec())
}

struct TreeBuilder<'d> {
    doc: &'d mut Document,
    root: NodeId,
    /// Open elements with their tag names, innermost last.
    container_stack: Vec<(NodeId, String)>,
}

impl<'d> TreeBuilder<'d> {
    fn container(&self) -> NodeId {
        self.container_stack
            .last()
            .map(|(id, _)| *id)
            .unwrap_or(self.root)
    }

    fn consume(&mut self, spanned: SpannedToken) -> Result<()> {
        let container = self.container();
        match spanned.token {
            Token::Text(value) => {
                let text = self.doc.create_text(value);
                self.doc.append_child(container, text)?;
            }
            Token::Comment(value) => {
                let comment = self.doc.create_comment(value);
                self.doc.append_child(container, comment)?;
            }
            Token::TagOpen {
                name,
                attrs,
                self_closing,
            } => {
                let element = self.doc.create_element(name.clone());
                for (attr_name, value) in attrs {
                    self.doc.set_attribute(element, attr_name, value);
                }
                self.doc.append_child(container, element)?;
                if !self_closing && !is_void_element(&name) {
                    self.container_stack.push((element, name));
                }
            }
            Token::TagClose { name } => self.consume_tag_close(&name, spanned.offset),
        }
        Ok(())
    }

    fn consume_tag_close(&mut self, name: &str, offset: usize) {
        let open = self
            .container_stack
            .iter()
            .rposition(|(_, open_name)| open_name.eq_ignore_ascii_case(name));
        match open {
            Some(index) => {
                if index + 1 < self.container_stack.len() {
                    log::warn!(
                        "end tag </{}> at offset {} implicitly closes {} element(s)",
                        name,
                        offset,
                        self.container_stack.len() - index - 1
                    );
                }
                self.container_stack.truncate(index);
            }
            None if is_void_element(name) => {}
            None => log::warn!("ignoring unexpected end tag </{}> at offset {}", name, offset),
        }
    }

    fn finish(&mut self) {
        if let Some((_, name)) = self.container_stack.first() {
            log::debug!("closing <{}> and its open descendants at end of input", name);
        }
        self.container_stack.clear();
    }
}
