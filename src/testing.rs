use std::sync::Arc;

use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap};

use super::compile::{Compiler, Output};
use super::error::CompileError;
use super::flow::FlowKind;
use super::node::{Node, Program};
use super::parse::{parse, ParseError};
use super::registry::RuleRegistry;

pub(crate) fn try_parse_helper(contents: &str) -> Result<Program, ParseError> {
    let cm = Lrc::<SourceMap>::default();
    let fm = cm.new_source_file(FileName::Custom("test.js".to_string()), contents.to_string());
    parse(&fm)
}

pub(crate) fn parse_helper(contents: &str) -> Program {
    try_parse_helper(contents).expect("error parsing")
}

/// The first statement of `contents`.
pub(crate) fn decl_helper(contents: &str) -> Node {
    parse_helper(contents).body.remove(0).node
}

/// The Flow type written as `ty`, parsed as the right-hand side of an alias.
pub(crate) fn type_helper(ty: &str) -> Node {
    match decl_helper(&format!("type T = {};", ty)) {
        Node::Flow(flow) => match flow.kind {
            FlowKind::TypeAlias(alias) => *alias.right,
            other => panic!("expected a type alias, found {:?}", other),
        },
        other => panic!("expected a type alias, found {:?}", other),
    }
}

pub(crate) fn try_compile_helper(contents: &str) -> Result<Output, CompileError> {
    let registry = RuleRegistry::builtin().expect("builtin rules");
    Compiler::new(Arc::new(registry)).compile(contents, "test.js")
}

pub(crate) fn compile_helper(contents: &str) -> Output {
    try_compile_helper(contents).expect("error compiling")
}
