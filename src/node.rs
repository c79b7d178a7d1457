use std::fmt::{self, Display};

use swc_common::{Span, DUMMY_SP};

use crate::flow::{Flow, FlowKind};
use crate::ts::Ts;

/// An identifier, as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// The name of the identifier.
    pub name: String,

    /// The location in the file of the identifier.
    pub span: Span,
}

impl Ident {
    /// Creates a new [`Ident`].
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A string literal. The raw text (with its quotes) is kept so it prints the way it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    /// The unquoted value.
    pub value: String,

    /// The literal as written, including quotes.
    pub raw: String,

    /// The location in the file of the literal.
    pub span: Span,
}

impl Display for StrLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// The key of an object type member.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    /// A plain identifier key (`a: T`).
    Ident(Ident),

    /// A quoted key (`'a-b': T`).
    Str(StrLit),
}

impl Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropKey::Ident(id) => write!(f, "{}", id),
            PropKey::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Any node of the program tree.
///
/// Type nodes belong either to the Flow family or to the TypeScript family. Grammar-neutral
/// program structure (identifiers, imports, exports, untouched statements) lives in [`Js`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A node of the Flow annotation grammar.
    Flow(Flow),

    /// A node of the TypeScript annotation grammar.
    Ts(Ts),

    /// A grammar-neutral node.
    Js(Js),
}

impl Node {
    /// A node that stands in for a subtree while it is moved out of the tree.
    pub(crate) fn placeholder() -> Self {
        Node::Js(Js::Verbatim(Code {
            span: DUMMY_SP,
            embedded: Vec::new(),
        }))
    }

    /// The kind of the node, used to dispatch visitor handlers.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Flow(flow) => flow.kind(),
            Node::Ts(ts) => ts.kind(),
            Node::Js(js) => js.kind(),
        }
    }

    /// The location in the file of the node.
    pub fn span(&self) -> Span {
        match self {
            Node::Flow(flow) => flow.span,
            Node::Ts(ts) => ts.span(),
            Node::Js(js) => js.span(),
        }
    }

    /// Whether this node only exists in the Flow grammar and must be rewritten before printing.
    pub fn is_flow_only(&self) -> bool {
        match self {
            Node::Flow(_) => true,
            Node::Ts(_) => false,
            Node::Js(Js::Import(import)) => import.kind != ImportKind::Value,
            Node::Js(Js::ImportSpecifier(spec)) => spec.kind != ImportKind::Value,
            Node::Js(Js::ExportNamed(export)) => export.kind != ImportKind::Value,
            Node::Js(Js::Ident(_) | Js::Verbatim(_)) => false,
        }
    }

    /// The direct children of the node that the traversal visits.
    pub fn children(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        match self {
            Node::Flow(flow) => flow.kind.children(&mut out),
            Node::Ts(_) => {}
            Node::Js(Js::Import(import)) => out.extend(import.specifiers.iter()),
            Node::Js(Js::ExportNamed(export)) => out.extend(export.declaration.as_deref()),
            Node::Js(Js::Verbatim(code)) => out.extend(code.embedded.iter()),
            Node::Js(Js::ImportSpecifier(_) | Js::Ident(_)) => {}
        }
        out
    }

    /// The direct children of the node, mutably.
    pub fn children_mut(&mut self) -> Vec<&mut Node> {
        let mut out = Vec::new();
        match self {
            Node::Flow(flow) => flow.kind.children_mut(&mut out),
            Node::Ts(_) => {}
            Node::Js(Js::Import(import)) => out.extend(import.specifiers.iter_mut()),
            Node::Js(Js::ExportNamed(export)) => out.extend(export.declaration.as_deref_mut()),
            Node::Js(Js::Verbatim(code)) => out.extend(code.embedded.iter_mut()),
            Node::Js(Js::ImportSpecifier(_) | Js::Ident(_)) => {}
        }
        out
    }

    /// Finds the first node, in pre-order, that still belongs to the Flow grammar.
    pub fn find_flow_only(&self) -> Option<&Node> {
        if self.is_flow_only() {
            return Some(self);
        }
        self.children()
            .into_iter()
            .find_map(|child| child.find_flow_only())
    }

    /// Returns the node as a plain identifier, if it is one.
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Node::Js(Js::Ident(id)) => Some(id),
            _ => None,
        }
    }

    /// Returns the Flow kind of the node, if it belongs to the Flow grammar.
    pub fn as_flow(&self) -> Option<&FlowKind> {
        match self {
            Node::Flow(flow) => Some(&flow.kind),
            _ => None,
        }
    }
}

impl From<Flow> for Node {
    fn from(flow: Flow) -> Self {
        Node::Flow(flow)
    }
}

impl From<Ts> for Node {
    fn from(ts: Ts) -> Self {
        Node::Ts(ts)
    }
}

impl From<Js> for Node {
    fn from(js: Js) -> Self {
        Node::Js(js)
    }
}

impl From<Ident> for Node {
    fn from(id: Ident) -> Self {
        Node::Js(Js::Ident(id))
    }
}

/// Whether an import or export brings in values, types, or the types of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// A plain import (`import { a }`).
    Value,

    /// A type import (`import type { A }`).
    Type,

    /// A typeof import (`import typeof A`).
    Typeof,
}

/// Grammar-neutral nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Js {
    /// An identifier in a type position, before it is wrapped into a type.
    Ident(Ident),

    /// An import declaration.
    Import(ImportDecl),

    /// One specifier of an import declaration.
    ImportSpecifier(ImportSpecifier),

    /// An `export { ... }` or `export <declaration>` statement.
    ExportNamed(ExportNamed),

    /// Code that is not type-level. It is printed as written, apart from the annotations
    /// embedded in it.
    Verbatim(Code),
}

impl Js {
    /// The kind of the node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Js::Ident(_) => NodeKind::Identifier,
            Js::Import(_) => NodeKind::ImportDeclaration,
            Js::ImportSpecifier(_) => NodeKind::ImportSpecifier,
            Js::ExportNamed(_) => NodeKind::ExportNamedDeclaration,
            Js::Verbatim(_) => NodeKind::Verbatim,
        }
    }

    /// The location in the file of the node.
    pub fn span(&self) -> Span {
        match self {
            Js::Ident(id) => id.span,
            Js::Import(import) => import.span,
            Js::ImportSpecifier(spec) => spec.span,
            Js::ExportNamed(export) => export.span,
            Js::Verbatim(code) => code.span,
        }
    }
}

/// A statement of ordinary code.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    /// The location in the file of the statement.
    pub span: Span,

    /// The Flow annotations written inside the statement, in source order: parameter, return
    /// and variable annotations, type parameters, casts, and nested declarations.
    pub embedded: Vec<Node>,
}

/// An import declaration (`import type { A } from 'a'`).
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// The location in the file of the declaration.
    pub span: Span,

    /// The kind of the whole declaration.
    pub kind: ImportKind,

    /// The specifiers, each an [`Js::ImportSpecifier`].
    pub specifiers: Vec<Node>,

    /// The module being imported.
    pub source: StrLit,
}

/// How an import specifier binds its name.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecifierForm {
    /// `import a from 'a'`
    Default(Ident),

    /// `import * as a from 'a'`
    Namespace(Ident),

    /// `import { a as b } from 'a'`
    Named {
        /// The exported name.
        imported: Ident,

        /// The local alias, if any.
        local: Option<Ident>,
    },
}

/// One import specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    /// The location in the file of the specifier.
    pub span: Span,

    /// The kind of this specifier (`import { type A }`).
    pub kind: ImportKind,

    /// How the name is bound.
    pub form: SpecifierForm,
}

/// One export specifier (`a as b`).
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    /// The local name.
    pub local: Ident,

    /// The exported alias, if any.
    pub exported: Option<Ident>,
}

/// An `export` statement this crate understands.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNamed {
    /// The location in the file of the statement.
    pub span: Span,

    /// The kind of the export (`export type { A }` is [`ImportKind::Type`]).
    pub kind: ImportKind,

    /// The exported declaration (`export type A = B`).
    pub declaration: Option<Box<Node>>,

    /// The exported names (`export { a, b }`).
    pub specifiers: Vec<ExportSpecifier>,

    /// The module re-exported from, if any.
    pub source: Option<StrLit>,
}

/// A comment seen by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// The text between the comment delimiters.
    pub value: String,

    /// The location in the file of the whole comment.
    pub span: Span,
}

/// One top-level statement of a [`Program`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The statement itself.
    pub node: Node,

    /// The source range the statement replaces when printed.
    pub span: Span,

    /// Whether any rule replaced something inside the statement.
    pub touched: bool,
}

/// A parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The top-level statements in order.
    pub body: Vec<Statement>,

    /// Every comment in the file, in order.
    pub comments: Vec<Comment>,

    /// The whole file.
    pub span: Span,
}

impl Program {
    /// Finds the first node anywhere in the program that still belongs to the Flow grammar.
    pub fn find_flow_only(&self) -> Option<&Node> {
        self.body
            .iter()
            .find_map(|statement| statement.node.find_flow_only())
    }
}

/// The kind of a [`Node`]. Visitor handlers are keyed by kind.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    // Flow types
    AnyTypeAnnotation,
    MixedTypeAnnotation,
    ExistsTypeAnnotation,
    EmptyTypeAnnotation,
    VoidTypeAnnotation,
    NullLiteralTypeAnnotation,
    NumberTypeAnnotation,
    StringTypeAnnotation,
    BooleanTypeAnnotation,
    SymbolTypeAnnotation,
    ThisTypeAnnotation,
    BooleanLiteralTypeAnnotation,
    NumberLiteralTypeAnnotation,
    StringLiteralTypeAnnotation,
    ArrayTypeAnnotation,
    TupleTypeAnnotation,
    UnionTypeAnnotation,
    IntersectionTypeAnnotation,
    NullableTypeAnnotation,
    FunctionTypeAnnotation,
    GenericTypeAnnotation,
    TypeofTypeAnnotation,
    ObjectTypeAnnotation,

    // Flow declarations and members
    FunctionTypeParam,
    ObjectTypeProperty,
    ObjectTypeSpreadProperty,
    ObjectTypeIndexer,
    ObjectTypeCallProperty,
    TypeAnnotation,
    TypeAlias,
    OpaqueType,
    InterfaceDeclaration,
    InterfaceExtends,
    TypeParameterDeclaration,
    TypeParameter,
    QualifiedTypeIdentifier,
    TypeCastExpression,

    // TypeScript
    TSType,
    TSTypeAnnotation,
    TSInterfaceDeclaration,
    TSExpressionWithTypeArguments,
    TSTypeElement,
    TSTypeParameterDeclaration,
    TSTypeParameter,
    TSTypeAliasDeclaration,
    TSEntityName,
    TSAsExpression,

    // Program structure
    Identifier,
    ImportDeclaration,
    ImportSpecifier,
    ExportNamedDeclaration,
    Verbatim,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn type_imports_are_flow_only() {
        let program = parse_helper("import type { A } from './a';");
        assert!(program.body[0].node.is_flow_only());

        let program = parse_helper("import { a } from './a';");
        assert!(program.find_flow_only().is_none());
    }

    #[test]
    fn nested_flow_nodes_are_found() {
        let program = parse_helper("export type A = ?string;");
        let found = program.find_flow_only().expect("flow node");
        assert_eq!(found.kind(), NodeKind::TypeAlias);
    }

    #[test]
    fn kind_names() {
        assert_eq!(NodeKind::ObjectTypeProperty.to_string(), "ObjectTypeProperty");
        assert_eq!(NodeKind::TSTypeElement.to_string(), "TSTypeElement");
    }
}
