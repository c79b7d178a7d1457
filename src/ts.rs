use std::fmt::{self, Display};

use swc_common::{Span, DUMMY_SP};

use crate::node::{Ident, NodeKind, PropKey};

/// A node of the TypeScript annotation grammar.
///
/// Children are always TypeScript, so nothing from the Flow grammar is reachable from here.
#[derive(Debug, Clone, PartialEq)]
pub enum Ts {
    /// A type.
    Type(TsType),

    /// `: T`
    TypeAnn(TypeAnn),

    /// `interface A extends B { ... }`
    Interface(InterfaceDecl),

    /// One entry of an `extends` clause.
    ExprWithTypeArgs(ExprWithTypeArgs),

    /// A member of a type literal or interface body.
    Element(TypeElement),

    /// `<A, B extends C = D>`
    TypeParamDecl(TypeParamDecl),

    /// One type parameter.
    TypeParam(TypeParam),

    /// `type A = B`
    TypeAlias(TypeAliasDecl),

    /// `a.b.C`
    EntityName(EntityName),

    /// ` as T`, the tail of a cast.
    As(AsClause),
}

impl Ts {
    /// The kind of the node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Ts::Type(_) => NodeKind::TSType,
            Ts::TypeAnn(_) => NodeKind::TSTypeAnnotation,
            Ts::Interface(_) => NodeKind::TSInterfaceDeclaration,
            Ts::ExprWithTypeArgs(_) => NodeKind::TSExpressionWithTypeArguments,
            Ts::Element(_) => NodeKind::TSTypeElement,
            Ts::TypeParamDecl(_) => NodeKind::TSTypeParameterDeclaration,
            Ts::TypeParam(_) => NodeKind::TSTypeParameter,
            Ts::TypeAlias(_) => NodeKind::TSTypeAliasDeclaration,
            Ts::EntityName(_) => NodeKind::TSEntityName,
            Ts::As(_) => NodeKind::TSAsExpression,
        }
    }

    /// The location in the file of the node.
    pub fn span(&self) -> Span {
        match self {
            Ts::Type(ty) => ty.span,
            Ts::TypeAnn(ann) => ann.span,
            Ts::Interface(decl) => decl.span,
            Ts::ExprWithTypeArgs(expr) => expr.span,
            Ts::Element(element) => element.span(),
            Ts::TypeParamDecl(decl) => decl.span,
            Ts::TypeParam(param) => param.span,
            Ts::TypeAlias(alias) => alias.span,
            Ts::EntityName(name) => name.span(),
            Ts::As(clause) => clause.span,
        }
    }
}

impl Display for Ts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ts::Type(ty) => write!(f, "{}", ty),
            Ts::TypeAnn(ann) => write!(f, ": {}", ann.ty),
            Ts::Interface(decl) => write!(f, "{}", decl),
            Ts::ExprWithTypeArgs(expr) => write!(f, "{}", expr),
            Ts::Element(element) => write!(f, "{}", element),
            Ts::TypeParamDecl(decl) => write!(f, "{}", decl),
            Ts::TypeParam(param) => write!(f, "{}", param),
            Ts::TypeAlias(alias) => write!(f, "{}", alias),
            Ts::EntityName(name) => write!(f, "{}", name),
            Ts::As(clause) => write!(f, " as {}", clause.ty),
        }
    }
}

/// A TypeScript type with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct TsType {
    /// The variant of the type.
    pub kind: TsTypeKind,

    /// The location in the file of the type.
    pub span: Span,
}

impl TsType {
    /// Creates a new [`TsType`].
    pub fn new(kind: TsTypeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// A keyword type with no location, for types synthesized during conversion.
    pub fn keyword(keyword: Keyword) -> Self {
        Self::new(TsTypeKind::Keyword(keyword), DUMMY_SP)
    }
}

/// TypeScript keyword types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `any`
    Any,
    /// `unknown`
    Unknown,
    /// `never`
    Never,
    /// `void`
    Void,
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// `number`
    Number,
    /// `string`
    String,
    /// `boolean`
    Boolean,
    /// `symbol`
    Symbol,
}

impl Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Keyword::Any => "any",
            Keyword::Unknown => "unknown",
            Keyword::Never => "never",
            Keyword::Void => "void",
            Keyword::Undefined => "undefined",
            Keyword::Null => "null",
            Keyword::Number => "number",
            Keyword::String => "string",
            Keyword::Boolean => "boolean",
            Keyword::Symbol => "symbol",
        };
        write!(f, "{}", name)
    }
}

/// A literal type.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    /// `true`, `false`
    Bool(bool),

    /// `42`
    Number(f64),

    /// `'a'`
    Str {
        /// The unquoted value.
        value: String,

        /// The literal as written.
        raw: String,
    },
}

impl Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lit::Bool(b) => write!(f, "{}", b),
            Lit::Number(n) => write!(f, "{}", n),
            Lit::Str { raw, .. } => write!(f, "{}", raw),
        }
    }
}

/// The TypeScript type grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum TsTypeKind {
    /// A keyword type.
    Keyword(Keyword),

    /// `this`
    This,

    /// A literal type.
    Literal(Lit),

    /// `T[]`
    Array(Box<TsType>),

    /// `[A, B]`
    Tuple(Vec<TsType>),

    /// `A | B`
    Union(Vec<TsType>),

    /// `A & B`
    Intersection(Vec<TsType>),

    /// `(a: A) => R`
    Function(FnType),

    /// `Foo<A>`
    Reference(TypeRef),

    /// `typeof a`
    Query(EntityName),

    /// `{ a: T }`
    TypeLit(Vec<TypeElement>),

    /// `keyof T`
    KeyOf(Box<TsType>),
}

/// `Foo<A>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    /// The referenced name.
    pub name: EntityName,

    /// The type arguments, if any.
    pub type_args: Option<Vec<TsType>>,
}

/// A possibly qualified name.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityName {
    /// `A`
    Ident(Ident),

    /// `a.B`
    Qualified(Box<EntityName>, Ident),
}

impl EntityName {
    /// The location in the file of the name.
    pub fn span(&self) -> Span {
        match self {
            EntityName::Ident(id) => id.span,
            EntityName::Qualified(left, right) => left.span().to(right.span),
        }
    }
}

impl Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityName::Ident(id) => write!(f, "{}", id),
            EntityName::Qualified(left, right) => write!(f, "{}.{}", left, right),
        }
    }
}

/// `<T>(a: A, ...rest: R) => Ret`
#[derive(Debug, Clone, PartialEq)]
pub struct FnType {
    /// The type parameters, if any.
    pub type_params: Option<TypeParamDecl>,

    /// The parameters, rest parameter last.
    pub params: Vec<FnParam>,

    /// The return type.
    pub return_type: Box<TsType>,
}

/// A named function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FnParam {
    /// The parameter name.
    pub name: Ident,

    /// Whether the parameter is optional.
    pub optional: bool,

    /// Whether this is the rest parameter.
    pub rest: bool,

    /// The parameter type.
    pub ty: TsType,
}

impl Display for FnParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rest {
            write!(f, "...")?;
        }
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, "?")?;
        }
        write!(f, ": {}", self.ty)
    }
}

/// A member of a type literal or interface body.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeElement {
    /// `readonly a?: T`
    Property(PropertySignature),

    /// `[k: K]: V`
    Index(IndexSignature),

    /// `(a: A): R`
    Call(CallSignature),
}

impl TypeElement {
    /// The location in the file of the member.
    pub fn span(&self) -> Span {
        match self {
            TypeElement::Property(property) => property.span,
            TypeElement::Index(index) => index.span,
            TypeElement::Call(call) => call.span,
        }
    }
}

impl Display for TypeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeElement::Property(property) => {
                if property.readonly {
                    write!(f, "readonly ")?;
                }
                write!(f, "{}", property.key)?;
                if property.optional {
                    write!(f, "?")?;
                }
                write!(f, ": {}", property.ty)
            }
            TypeElement::Index(index) => {
                if index.readonly {
                    write!(f, "readonly ")?;
                }
                write!(f, "[{}: {}]: {}", index.name, index.key, index.value)
            }
            TypeElement::Call(call) => {
                if let Some(type_params) = &call.function.type_params {
                    write!(f, "{}", type_params)?;
                }
                write_params(f, &call.function.params)?;
                write!(f, ": {}", call.function.return_type)
            }
        }
    }
}

/// `readonly a?: T`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    /// The location in the file of the member.
    pub span: Span,

    /// The property key.
    pub key: PropKey,

    /// Whether the property is `readonly`.
    pub readonly: bool,

    /// Whether the property is optional.
    pub optional: bool,

    /// The property type.
    pub ty: TsType,
}

/// `[k: K]: V`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    /// The location in the file of the member.
    pub span: Span,

    /// The key name. TypeScript requires one.
    pub name: Ident,

    /// The key type.
    pub key: TsType,

    /// The value type.
    pub value: TsType,

    /// Whether the signature is `readonly`.
    pub readonly: bool,
}

/// `(a: A): R`
#[derive(Debug, Clone, PartialEq)]
pub struct CallSignature {
    /// The location in the file of the member.
    pub span: Span,

    /// The signature.
    pub function: FnType,
}

/// `<A, B extends C = D>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamDecl {
    /// The location in the file of the declaration.
    pub span: Span,

    /// The parameters in order.
    pub params: Vec<TypeParam>,
}

impl Display for TypeParamDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        write_list(f, &self.params, ", ")?;
        write!(f, ">")
    }
}

/// `B extends C = D`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    /// The location in the file of the parameter.
    pub span: Span,

    /// The parameter name, copied as written.
    pub name: String,

    /// The `extends` constraint, if any.
    pub constraint: Option<TsType>,

    /// The default, if any.
    pub default: Option<TsType>,
}

impl Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " extends {}", constraint)?;
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

/// `: T`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnn {
    /// The location in the file of the annotation.
    pub span: Span,

    /// The annotated type.
    pub ty: TsType,
}

/// ` as T`
#[derive(Debug, Clone, PartialEq)]
pub struct AsClause {
    /// The location in the file of the Flow cast annotation it replaces.
    pub span: Span,

    /// The target type.
    pub ty: TsType,
}

/// `interface A<T> extends B { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    /// The location in the file of the declaration.
    pub span: Span,

    /// The interface name.
    pub id: Ident,

    /// The type parameters, if any.
    pub type_params: Option<TypeParamDecl>,

    /// The `extends` clause.
    pub extends: Vec<ExprWithTypeArgs>,

    /// The members.
    pub body: Vec<TypeElement>,
}

impl Display for InterfaceDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interface {}", self.id)?;
        if let Some(type_params) = &self.type_params {
            write!(f, "{}", type_params)?;
        }
        if !self.extends.is_empty() {
            write!(f, " extends ")?;
            write_list(f, &self.extends, ", ")?;
        }
        if self.body.is_empty() {
            return write!(f, " {{}}");
        }
        writeln!(f, " {{")?;
        for member in &self.body {
            writeln!(f, "  {};", member)?;
        }
        write!(f, "}}")
    }
}

/// `B<C>` in an `extends` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprWithTypeArgs {
    /// The location in the file of the entry.
    pub span: Span,

    /// The extended name.
    pub expr: EntityName,

    /// The type arguments, if any.
    pub type_args: Option<Vec<TsType>>,
}

impl Display for ExprWithTypeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(args) = &self.type_args {
            write_type_args(f, args)?;
        }
        Ok(())
    }
}

/// `type A<T> = B`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    /// The location in the file of the declaration.
    pub span: Span,

    /// The alias name.
    pub id: Ident,

    /// The type parameters, if any.
    pub type_params: Option<TypeParamDecl>,

    /// The aliased type.
    pub ty: TsType,
}

impl Display for TypeAliasDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.id)?;
        if let Some(type_params) = &self.type_params {
            write!(f, "{}", type_params)?;
        }
        write!(f, " = {};", self.ty)
    }
}

// Binding strength of a type when printed, loosest first.
const PREC_FUNCTION: u8 = 0;
const PREC_UNION: u8 = 1;
const PREC_INTERSECTION: u8 = 2;
const PREC_PREFIX: u8 = 3;
const PREC_PRIMARY: u8 = 4;

impl TsType {
    fn precedence(&self) -> u8 {
        match &self.kind {
            TsTypeKind::Function(_) => PREC_FUNCTION,
            TsTypeKind::Union(types) if types.len() > 1 => PREC_UNION,
            TsTypeKind::Intersection(types) if types.len() > 1 => PREC_INTERSECTION,
            TsTypeKind::Union(types) | TsTypeKind::Intersection(types) => {
                types.first().map_or(PREC_PRIMARY, TsType::precedence)
            }
            TsTypeKind::KeyOf(_) | TsTypeKind::Query(_) => PREC_PREFIX,
            _ => PREC_PRIMARY,
        }
    }

    /// Writes the type, wrapped in parentheses if it binds looser than `min`.
    fn write_at(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TsTypeKind::Keyword(keyword) => write!(f, "{}", keyword),
            TsTypeKind::This => write!(f, "this"),
            TsTypeKind::Literal(lit) => write!(f, "{}", lit),
            TsTypeKind::Array(elem) => {
                elem.write_at(f, PREC_PRIMARY)?;
                write!(f, "[]")
            }
            TsTypeKind::Tuple(types) => {
                write!(f, "[")?;
                write_list(f, types, ", ")?;
                write!(f, "]")
            }
            TsTypeKind::Union(types) => write_members(f, types, " | ", PREC_INTERSECTION),
            TsTypeKind::Intersection(types) => write_members(f, types, " & ", PREC_PREFIX),
            TsTypeKind::Function(function) => {
                if let Some(type_params) = &function.type_params {
                    write!(f, "{}", type_params)?;
                }
                write_params(f, &function.params)?;
                write!(f, " => {}", function.return_type)
            }
            TsTypeKind::Reference(reference) => {
                write!(f, "{}", reference.name)?;
                if let Some(args) = &reference.type_args {
                    write_type_args(f, args)?;
                }
                Ok(())
            }
            TsTypeKind::Query(name) => write!(f, "typeof {}", name),
            TsTypeKind::TypeLit(members) if members.is_empty() => write!(f, "{{}}"),
            TsTypeKind::TypeLit(members) => {
                write!(f, "{{ ")?;
                write_list(f, members, "; ")?;
                write!(f, " }}")
            }
            TsTypeKind::KeyOf(ty) => {
                write!(f, "keyof ")?;
                ty.write_at(f, PREC_PREFIX)
            }
        }
    }
}

fn write_members(f: &mut fmt::Formatter<'_>, types: &[TsType], sep: &str, min: u8) -> fmt::Result {
    if let [only] = types {
        return write!(f, "{}", only);
    }
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        ty.write_at(f, min)?;
    }
    Ok(())
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[FnParam]) -> fmt::Result {
    write!(f, "(")?;
    write_list(f, params, ", ")?;
    write!(f, ")")
}

fn write_type_args(f: &mut fmt::Formatter<'_>, args: &[TsType]) -> fmt::Result {
    write!(f, "<")?;
    write_list(f, args, ", ")?;
    write!(f, ">")
}

fn write_list<T: Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(name: &str) -> TsType {
        TsType::new(
            TsTypeKind::Reference(TypeRef {
                name: EntityName::Ident(Ident::new(name, DUMMY_SP)),
                type_args: None,
            }),
            DUMMY_SP,
        )
    }

    fn function(ret: TsType) -> TsType {
        TsType::new(
            TsTypeKind::Function(FnType {
                type_params: None,
                params: vec![],
                return_type: Box::new(ret),
            }),
            DUMMY_SP,
        )
    }

    #[test]
    fn union_members_are_parenthesized_when_looser() {
        let ty = TsType::new(
            TsTypeKind::Union(vec![
                function(TsType::keyword(Keyword::Void)),
                TsType::keyword(Keyword::Null),
            ]),
            DUMMY_SP,
        );
        assert_eq!(ty.to_string(), "(() => void) | null");
    }

    #[test]
    fn array_of_union() {
        let union = TsType::new(
            TsTypeKind::Union(vec![reference("A"), reference("B")]),
            DUMMY_SP,
        );
        let ty = TsType::new(TsTypeKind::Array(Box::new(union)), DUMMY_SP);
        assert_eq!(ty.to_string(), "(A | B)[]");
    }

    #[test]
    fn single_member_intersection_prints_the_member() {
        let ty = TsType::new(TsTypeKind::Intersection(vec![reference("B")]), DUMMY_SP);
        assert_eq!(ty.to_string(), "B");
    }

    #[test]
    fn qualified_names() {
        let name = EntityName::Qualified(
            Box::new(EntityName::Qualified(
                Box::new(EntityName::Ident(Ident::new("a", DUMMY_SP))),
                Ident::new("b", DUMMY_SP),
            )),
            Ident::new("C", DUMMY_SP),
        );
        assert_eq!(name.to_string(), "a.b.C");
    }

    #[test]
    fn keyof_union_operand() {
        let union = TsType::new(
            TsTypeKind::Union(vec![reference("A"), reference("B")]),
            DUMMY_SP,
        );
        let ty = TsType::new(TsTypeKind::KeyOf(Box::new(union)), DUMMY_SP);
        assert_eq!(ty.to_string(), "keyof (A | B)");
    }
}
