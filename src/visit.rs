use std::mem;

use swc_common::Span;
use tracing::trace;

use crate::error::ConvertError;
use crate::node::{Node, Program};
use crate::registry::Visitor;
use crate::warning::Warnings;

/// The view a handler gets of the node it was dispatched on.
///
/// Handlers inspect the node, record warnings, and may replace the node. The traversal writes
/// the replacement back into the tree once every handler in the chain has run.
pub struct Path<'a> {
    node: Node,
    warnings: &'a mut Warnings,
    replaced: bool,
}

impl<'a> Path<'a> {
    /// Creates a path over a detached node.
    pub fn new(node: Node, warnings: &'a mut Warnings) -> Self {
        Self {
            node,
            warnings,
            replaced: false,
        }
    }

    /// The current node, as left by the previous handler.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Replaces the current node. Later handlers in the chain see the replacement.
    pub fn replace_with(&mut self, node: impl Into<Node>) {
        let node = node.into();
        trace!(from = %self.node.kind(), to = %node.kind(), "replacing node");
        self.node = node;
        self.replaced = true;
    }

    /// Records a warning about the node at `span`.
    pub fn warn(&mut self, span: Span, message: impl Into<String>, url: impl Into<String>) {
        self.warnings.push(span, message, url);
    }

    /// Whether any handler replaced the node.
    pub fn replaced(&self) -> bool {
        self.replaced
    }

    /// Consumes the path, returning the node.
    pub fn into_node(self) -> Node {
        self.node
    }
}

/// Runs `visitor` over every statement of `program`, children before parents.
///
/// Statements in which a handler replaced anything are marked as touched so the printer knows
/// to regenerate them.
pub fn traverse(
    program: &mut Program,
    visitor: &Visitor,
    warnings: &mut Warnings,
) -> Result<(), ConvertError> {
    for statement in &mut program.body {
        if traverse_node(&mut statement.node, visitor, warnings)? {
            statement.touched = true;
        }
    }
    Ok(())
}

/// Runs `visitor` over `node` and its descendants. Returns whether anything was replaced.
pub fn traverse_node(
    node: &mut Node,
    visitor: &Visitor,
    warnings: &mut Warnings,
) -> Result<bool, ConvertError> {
    let mut touched = false;
    for child in node.children_mut() {
        touched |= traverse_node(child, visitor, warnings)?;
    }

    let handlers = visitor.handlers(node.kind());
    if handlers.is_empty() {
        return Ok(touched);
    }

    let mut path = Path::new(mem::replace(node, Node::placeholder()), warnings);
    let result = handlers.iter().try_for_each(|handler| handler(&mut path));
    let replaced = path.replaced();
    *node = path.into_node();
    result?;

    Ok(touched || replaced)
}
