#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Implements the [`logos`] lexer the parser runs on. Comments are kept so the `@flow` pragma can be found.
pub mod lexer;

/// Implements a parser from Flow source text to the [`node::Program`] tree. Only type-level statements are parsed
/// into nodes; everything else is kept as source ranges.
pub mod parse;

/// The program tree shared by both languages: [`node::Node`] holds either a Flow node, a TypeScript node, or a
/// plain JavaScript node such as an import.
pub mod node;

/// Flow annotation nodes.
pub mod flow;

/// TypeScript type nodes and their printing.
pub mod ts;

/// Implements the conversion of a single Flow annotation or declaration to its TypeScript counterpart.
pub mod convert;

/// Implements rule registration and the merging of rule handlers into one [`registry::Visitor`].
pub mod registry;

/// The rules that ship with the crate.
pub mod rules;

/// Implements the post-order traversal that runs a [`registry::Visitor`] over a program.
pub mod visit;

/// Non-fatal conversion losses.
pub mod warning;

/// Implements printing of a converted program, keeping untouched code as written.
pub mod print;

/// Implements the whole pipeline: parse, convert, print.
pub mod compile;

/// Error types.
pub mod error;

/// Private crate for testing utilities.
#[cfg(test)]
pub(crate) mod testing;

pub use compile::{compile, Compiler, Output};
pub use error::{CompileError, Error};
pub use registry::{Rule, RuleRegistry};
pub use warning::Warning;
