use swc_common::Span;

use crate::node::{Ident, Node, NodeKind, PropKey};

/// A node of the Flow annotation grammar together with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Flow {
    /// The variant of the node.
    pub kind: FlowKind,

    /// The location in the file of the node.
    pub span: Span,
}

impl Flow {
    /// Creates a new [`Flow`] node.
    pub fn new(kind: FlowKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The kind of the node.
    pub fn kind(&self) -> NodeKind {
        self.kind.kind()
    }
}

/// A variance marker (`+` or `-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variance {
    /// `+`. Has no TypeScript counterpart.
    Plus,

    /// `-`. Printed as `readonly`.
    Minus,
}

/// The Flow annotation grammar.
///
/// Composite nodes hold their children as [`Node`] so that a child may already have been
/// rewritten into TypeScript by a rule that ran before the parent was reached.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowKind {
    /// `any`
    Any,

    /// `mixed`
    Mixed,

    /// `*`
    Exists,

    /// `empty`
    Empty,

    /// `void`
    Void,

    /// `null`
    Null,

    /// `number`
    Number,

    /// `string`
    String,

    /// `boolean` or `bool`
    Boolean,

    /// `symbol`
    Symbol,

    /// `this`
    This,

    /// `true` or `false`
    BooleanLiteral(bool),

    /// `42`, `-1.5`
    NumberLiteral(f64),

    /// `'a'`
    StringLiteral {
        /// The unquoted value.
        value: String,

        /// The literal as written.
        raw: String,
    },

    /// `T[]`
    Array(Box<Node>),

    /// `[A, B]`
    Tuple(Vec<Node>),

    /// `A | B`
    Union(Vec<Node>),

    /// `A & B`
    Intersection(Vec<Node>),

    /// `?T`
    Nullable(Box<Node>),

    /// `<T>(a: A, B, ...rest: R) => Ret`
    Function(FunctionType),

    /// `Foo<A>`, `a.B`
    Generic(Generic),

    /// `typeof x`. The argument is a generic reference naming the value.
    Typeof(Box<Node>),

    /// `{ a: T }`, `{| a: T |}`
    Object(ObjectType),

    /// One parameter of a function type.
    FunctionTypeParam(FunctionTypeParam),

    /// `+a?: T` inside an object type.
    ObjectTypeProperty(ObjectTypeProperty),

    /// `...T` inside an object type.
    ObjectTypeSpreadProperty(Box<Node>),

    /// `[k: K]: V` inside an object type.
    ObjectTypeIndexer(ObjectTypeIndexer),

    /// `(x: X): Y` inside an object type. The value is a function type.
    ObjectTypeCallProperty(Box<Node>),

    /// `: T` wrapper around a type.
    TypeAnnotation(Box<Node>),

    /// `type A<T> = B`
    TypeAlias(TypeAlias),

    /// `opaque type A: Super = B`
    OpaqueType(OpaqueType),

    /// `interface A extends B { ... }`
    InterfaceDeclaration(InterfaceDeclaration),

    /// One entry of an interface `extends` clause.
    InterfaceExtends(Generic),

    /// `<A, B: Bound = Default>`. Each entry is a type parameter.
    TypeParameterDeclaration(Vec<Node>),

    /// One entry of a type parameter declaration.
    TypeParameter(TypeParameter),

    /// `a.b.C` in type position.
    QualifiedTypeIdentifier(QualifiedTypeIdentifier),

    /// The `: T` of a cast `(x: T)`. Its span starts where the expression ends.
    TypeCast(Box<Node>),
}

/// `<T>(a: A, B, ...rest: R) => Ret`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// The type parameter declaration, if any.
    pub type_params: Option<Box<Node>>,

    /// The parameters, each a [`FlowKind::FunctionTypeParam`].
    pub params: Vec<Node>,

    /// The rest parameter, if any.
    pub rest: Option<Box<Node>>,

    /// The return type.
    pub return_type: Box<Node>,
}

/// A function type parameter. Flow allows the name to be omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeParam {
    /// The parameter name, if written.
    pub name: Option<Ident>,

    /// The parameter type.
    pub type_annotation: Box<Node>,

    /// Whether the parameter is optional (`a?: T`).
    pub optional: bool,
}

/// A reference to a named type, with optional type arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Generic {
    /// An identifier or a [`FlowKind::QualifiedTypeIdentifier`].
    pub id: Box<Node>,

    /// The type arguments, if any were written.
    pub type_params: Option<Vec<Node>>,
}

impl Generic {
    /// The name of the referenced type when it is a plain identifier.
    pub fn name(&self) -> Option<&str> {
        self.id.as_ident().map(|id| id.name.as_str())
    }
}

/// The body of an object type or an interface.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    /// Properties and spreads in source order.
    pub properties: Vec<Node>,

    /// Indexers in source order.
    pub indexers: Vec<Node>,

    /// Call properties in source order.
    pub call_properties: Vec<Node>,

    /// Whether the object was written as exact (`{| |}`).
    pub exact: bool,
}

/// `+a?: T`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeProperty {
    /// The property key.
    pub key: PropKey,

    /// The property type.
    pub value: Box<Node>,

    /// Whether the property is optional.
    pub optional: bool,

    /// The variance marker, if any.
    pub variance: Option<Variance>,

    /// Whether the property was written as a method (`m(): T`).
    pub method: bool,
}

/// `[k: K]: V`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTypeIndexer {
    /// The name of the key, if written.
    pub id: Option<Ident>,

    /// The key type.
    pub key: Box<Node>,

    /// The value type.
    pub value: Box<Node>,

    /// The variance marker, if any.
    pub variance: Option<Variance>,
}

/// `type A<T> = B`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    /// The alias name.
    pub id: Ident,

    /// The type parameter declaration, if any.
    pub type_params: Option<Box<Node>>,

    /// The aliased type.
    pub right: Box<Node>,
}

/// `opaque type A: Super = B`
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueType {
    /// The type name.
    pub id: Ident,

    /// The type parameter declaration, if any.
    pub type_params: Option<Box<Node>>,

    /// The supertype bound, if any.
    pub supertype: Option<Box<Node>>,

    /// The underlying type.
    pub impltype: Box<Node>,
}

/// `interface A<T> extends B { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    /// The interface name.
    pub id: Ident,

    /// The type parameter declaration, if any.
    pub type_params: Option<Box<Node>>,

    /// The extended interfaces, each a [`FlowKind::InterfaceExtends`].
    pub extends: Vec<Node>,

    /// The interface body.
    pub body: ObjectType,
}

/// `+T: Bound = Default`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    /// The parameter name.
    pub name: Ident,

    /// The bound, a [`FlowKind::TypeAnnotation`].
    pub bound: Option<Box<Node>>,

    /// The default type.
    pub default: Option<Box<Node>>,

    /// The variance marker, if any.
    pub variance: Option<Variance>,
}

/// `a.b` in type position.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedTypeIdentifier {
    /// Everything left of the last dot.
    pub qualification: Box<Node>,

    /// The last segment.
    pub id: Ident,
}

impl FlowKind {
    /// The kind of the node.
    pub fn kind(&self) -> NodeKind {
        match self {
            FlowKind::Any => NodeKind::AnyTypeAnnotation,
            FlowKind::Mixed => NodeKind::MixedTypeAnnotation,
            FlowKind::Exists => NodeKind::ExistsTypeAnnotation,
            FlowKind::Empty => NodeKind::EmptyTypeAnnotation,
            FlowKind::Void => NodeKind::VoidTypeAnnotation,
            FlowKind::Null => NodeKind::NullLiteralTypeAnnotation,
            FlowKind::Number => NodeKind::NumberTypeAnnotation,
            FlowKind::String => NodeKind::StringTypeAnnotation,
            FlowKind::Boolean => NodeKind::BooleanTypeAnnotation,
            FlowKind::Symbol => NodeKind::SymbolTypeAnnotation,
            FlowKind::This => NodeKind::ThisTypeAnnotation,
            FlowKind::BooleanLiteral(_) => NodeKind::BooleanLiteralTypeAnnotation,
            FlowKind::NumberLiteral(_) => NodeKind::NumberLiteralTypeAnnotation,
            FlowKind::StringLiteral { .. } => NodeKind::StringLiteralTypeAnnotation,
            FlowKind::Array(_) => NodeKind::ArrayTypeAnnotation,
            FlowKind::Tuple(_) => NodeKind::TupleTypeAnnotation,
            FlowKind::Union(_) => NodeKind::UnionTypeAnnotation,
            FlowKind::Intersection(_) => NodeKind::IntersectionTypeAnnotation,
            FlowKind::Nullable(_) => NodeKind::NullableTypeAnnotation,
            FlowKind::Function(_) => NodeKind::FunctionTypeAnnotation,
            FlowKind::Generic(_) => NodeKind::GenericTypeAnnotation,
            FlowKind::Typeof(_) => NodeKind::TypeofTypeAnnotation,
            FlowKind::Object(_) => NodeKind::ObjectTypeAnnotation,
            FlowKind::FunctionTypeParam(_) => NodeKind::FunctionTypeParam,
            FlowKind::ObjectTypeProperty(_) => NodeKind::ObjectTypeProperty,
            FlowKind::ObjectTypeSpreadProperty(_) => NodeKind::ObjectTypeSpreadProperty,
            FlowKind::ObjectTypeIndexer(_) => NodeKind::ObjectTypeIndexer,
            FlowKind::ObjectTypeCallProperty(_) => NodeKind::ObjectTypeCallProperty,
            FlowKind::TypeAnnotation(_) => NodeKind::TypeAnnotation,
            FlowKind::TypeAlias(_) => NodeKind::TypeAlias,
            FlowKind::OpaqueType(_) => NodeKind::OpaqueType,
            FlowKind::InterfaceDeclaration(_) => NodeKind::InterfaceDeclaration,
            FlowKind::InterfaceExtends(_) => NodeKind::InterfaceExtends,
            FlowKind::TypeParameterDeclaration(_) => NodeKind::TypeParameterDeclaration,
            FlowKind::TypeParameter(_) => NodeKind::TypeParameter,
            FlowKind::QualifiedTypeIdentifier(_) => NodeKind::QualifiedTypeIdentifier,
            FlowKind::TypeCast(_) => NodeKind::TypeCastExpression,
        }
    }

    pub(crate) fn children<'a>(&'a self, out: &mut Vec<&'a Node>) {
        match self {
            FlowKind::Any
            | FlowKind::Mixed
            | FlowKind::Exists
            | FlowKind::Empty
            | FlowKind::Void
            | FlowKind::Null
            | FlowKind::Number
            | FlowKind::String
            | FlowKind::Boolean
            | FlowKind::Symbol
            | FlowKind::This
            | FlowKind::BooleanLiteral(_)
            | FlowKind::NumberLiteral(_)
            | FlowKind::StringLiteral { .. } => {}

            FlowKind::Array(inner)
            | FlowKind::Nullable(inner)
            | FlowKind::Typeof(inner)
            | FlowKind::ObjectTypeSpreadProperty(inner)
            | FlowKind::ObjectTypeCallProperty(inner)
            | FlowKind::TypeAnnotation(inner)
            | FlowKind::TypeCast(inner) => out.push(inner),

            FlowKind::Tuple(types)
            | FlowKind::Union(types)
            | FlowKind::Intersection(types)
            | FlowKind::TypeParameterDeclaration(types) => out.extend(types.iter()),

            FlowKind::Function(function) => {
                out.extend(function.type_params.as_deref());
                out.extend(function.params.iter());
                out.extend(function.rest.as_deref());
                out.push(&function.return_type);
            }

            FlowKind::Generic(generic) | FlowKind::InterfaceExtends(generic) => {
                out.push(&generic.id);
                out.extend(generic.type_params.iter().flatten());
            }

            FlowKind::Object(object) => object_children(object, out),

            FlowKind::FunctionTypeParam(param) => out.push(&param.type_annotation),

            FlowKind::ObjectTypeProperty(property) => out.push(&property.value),

            FlowKind::ObjectTypeIndexer(indexer) => {
                out.push(&indexer.key);
                out.push(&indexer.value);
            }

            FlowKind::TypeAlias(alias) => {
                out.extend(alias.type_params.as_deref());
                out.push(&alias.right);
            }

            FlowKind::OpaqueType(opaque) => {
                out.extend(opaque.type_params.as_deref());
                out.extend(opaque.supertype.as_deref());
                out.push(&opaque.impltype);
            }

            FlowKind::InterfaceDeclaration(decl) => {
                out.extend(decl.type_params.as_deref());
                out.extend(decl.extends.iter());
                object_children(&decl.body, out);
            }

            FlowKind::TypeParameter(param) => {
                out.extend(param.bound.as_deref());
                out.extend(param.default.as_deref());
            }

            FlowKind::QualifiedTypeIdentifier(qualified) => out.push(&qualified.qualification),
        }
    }

    pub(crate) fn children_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Node>) {
        match self {
            FlowKind::Any
            | FlowKind::Mixed
            | FlowKind::Exists
            | FlowKind::Empty
            | FlowKind::Void
            | FlowKind::Null
            | FlowKind::Number
            | FlowKind::String
            | FlowKind::Boolean
            | FlowKind::Symbol
            | FlowKind::This
            | FlowKind::BooleanLiteral(_)
            | FlowKind::NumberLiteral(_)
            | FlowKind::StringLiteral { .. } => {}

            FlowKind::Array(inner)
            | FlowKind::Nullable(inner)
            | FlowKind::Typeof(inner)
            | FlowKind::ObjectTypeSpreadProperty(inner)
            | FlowKind::ObjectTypeCallProperty(inner)
            | FlowKind::TypeAnnotation(inner)
            | FlowKind::TypeCast(inner) => out.push(inner),

            FlowKind::Tuple(types)
            | FlowKind::Union(types)
            | FlowKind::Intersection(types)
            | FlowKind::TypeParameterDeclaration(types) => out.extend(types.iter_mut()),

            FlowKind::Function(function) => {
                out.extend(function.type_params.as_deref_mut());
                out.extend(function.params.iter_mut());
                out.extend(function.rest.as_deref_mut());
                out.push(&mut function.return_type);
            }

            FlowKind::Generic(generic) | FlowKind::InterfaceExtends(generic) => {
                out.push(&mut generic.id);
                out.extend(generic.type_params.iter_mut().flatten());
            }

            FlowKind::Object(object) => object_children_mut(object, out),

            FlowKind::FunctionTypeParam(param) => out.push(&mut param.type_annotation),

            FlowKind::ObjectTypeProperty(property) => out.push(&mut property.value),

            FlowKind::ObjectTypeIndexer(indexer) => {
                out.push(&mut indexer.key);
                out.push(&mut indexer.value);
            }

            FlowKind::TypeAlias(alias) => {
                out.extend(alias.type_params.as_deref_mut());
                out.push(&mut alias.right);
            }

            FlowKind::OpaqueType(opaque) => {
                out.extend(opaque.type_params.as_deref_mut());
                out.extend(opaque.supertype.as_deref_mut());
                out.push(&mut opaque.impltype);
            }

            FlowKind::InterfaceDeclaration(decl) => {
                out.extend(decl.type_params.as_deref_mut());
                out.extend(decl.extends.iter_mut());
                object_children_mut(&mut decl.body, out);
            }

            FlowKind::TypeParameter(param) => {
                out.extend(param.bound.as_deref_mut());
                out.extend(param.default.as_deref_mut());
            }

            FlowKind::QualifiedTypeIdentifier(qualified) => {
                out.push(&mut qualified.qualification)
            }
        }
    }
}

fn object_children<'a>(object: &'a ObjectType, out: &mut Vec<&'a Node>) {
    out.extend(object.properties.iter());
    out.extend(object.indexers.iter());
    out.extend(object.call_properties.iter());
}

fn object_children_mut<'a>(object: &'a mut ObjectType, out: &mut Vec<&'a mut Node>) {
    out.extend(object.properties.iter_mut());
    out.extend(object.indexers.iter_mut());
    out.extend(object.call_properties.iter_mut());
}
