use swc_common::{Span, DUMMY_SP};

use crate::error::ConvertError;
use crate::flow::{
    FlowKind, FunctionType, Generic, InterfaceDeclaration, ObjectType, ObjectTypeIndexer,
    ObjectTypeProperty, OpaqueType, TypeAlias, TypeParameter, Variance,
};
use crate::node::{Ident, Js, Node, NodeKind};
use crate::ts::{
    AsClause, CallSignature, EntityName, ExprWithTypeArgs, FnParam, FnType, IndexSignature,
    InterfaceDecl, Keyword, Lit, PropertySignature, Ts, TsType, TsTypeKind, TypeAliasDecl, TypeAnn,
    TypeElement, TypeParam, TypeParamDecl, TypeRef,
};

type Result<T> = std::result::Result<T, ConvertError>;

/// Converts any Flow annotation or declaration into its TypeScript counterpart.
///
/// TypeScript nodes are returned unchanged, so converting an already converted subtree is a
/// no-op.
pub fn convert_annotation_or_declaration(node: &Node) -> Result<Ts> {
    let flow = match node {
        Node::Ts(ts) => return Ok(ts.clone()),
        Node::Flow(flow) => flow,
        Node::Js(_) => return Err(not_understood(node)),
    };
    let span = flow.span;

    Ok(match &flow.kind {
        FlowKind::TypeAnnotation(inner) => Ts::TypeAnn(TypeAnn {
            span,
            ty: convert_type(inner)?,
        }),
        FlowKind::InterfaceDeclaration(decl) => Ts::Interface(convert_interface(decl, span)?),
        FlowKind::InterfaceExtends(generic) => {
            Ts::ExprWithTypeArgs(convert_extends(generic, span)?)
        }
        FlowKind::ObjectTypeProperty(property) => {
            Ts::Element(convert_property(property, span)?)
        }
        FlowKind::ObjectTypeIndexer(indexer) => Ts::Element(convert_indexer(indexer, span)?),
        FlowKind::ObjectTypeCallProperty(function) => {
            Ts::Element(convert_call_property(function, span)?)
        }
        FlowKind::TypeParameterDeclaration(params) => {
            Ts::TypeParamDecl(convert_type_params(params, span)?)
        }
        FlowKind::TypeParameter(param) => Ts::TypeParam(convert_type_param(param, span)?),
        FlowKind::QualifiedTypeIdentifier(_) => Ts::EntityName(to_entity_name(node)?),
        FlowKind::TypeAlias(alias) => Ts::TypeAlias(convert_type_alias(alias, span)?),
        FlowKind::OpaqueType(opaque) => Ts::TypeAlias(convert_opaque_type(opaque, span)?),
        FlowKind::TypeCast(inner) => Ts::As(AsClause {
            span,
            ty: convert_type(inner)?,
        }),
        FlowKind::FunctionTypeParam(_) | FlowKind::ObjectTypeSpreadProperty(_) => {
            return Err(not_understood(node))
        }
        _ => Ts::Type(convert_type(node)?),
    })
}

/// Converts a node that must end up as a type.
///
/// Identifiers and qualified names are rejected: they are names, and must be wrapped in a
/// generic reference first.
pub fn convert_type(node: &Node) -> Result<TsType> {
    let flow = match node {
        Node::Ts(Ts::Type(ty)) => return Ok(ty.clone()),
        Node::Ts(Ts::TypeAnn(ann)) => return Ok(ann.ty.clone()),
        Node::Js(Js::Ident(_)) | Node::Ts(Ts::EntityName(_)) => return Err(bare_name(node)),
        Node::Flow(flow) if matches!(flow.kind, FlowKind::QualifiedTypeIdentifier(_)) => {
            return Err(bare_name(node))
        }
        Node::Flow(flow) => flow,
        _ => return Err(not_understood(node)),
    };
    let span = flow.span;

    let kind = match &flow.kind {
        FlowKind::Any | FlowKind::Exists => TsTypeKind::Keyword(Keyword::Any),
        FlowKind::Mixed => TsTypeKind::Keyword(Keyword::Unknown),
        FlowKind::Empty => TsTypeKind::Keyword(Keyword::Never),
        FlowKind::Void => TsTypeKind::Keyword(Keyword::Undefined),
        FlowKind::Null => TsTypeKind::Keyword(Keyword::Null),
        FlowKind::Number => TsTypeKind::Keyword(Keyword::Number),
        FlowKind::String => TsTypeKind::Keyword(Keyword::String),
        FlowKind::Boolean => TsTypeKind::Keyword(Keyword::Boolean),
        FlowKind::Symbol => TsTypeKind::Keyword(Keyword::Symbol),
        FlowKind::This => TsTypeKind::This,
        FlowKind::BooleanLiteral(value) => TsTypeKind::Literal(Lit::Bool(*value)),
        FlowKind::NumberLiteral(value) => TsTypeKind::Literal(Lit::Number(*value)),
        FlowKind::StringLiteral { value, raw } => TsTypeKind::Literal(Lit::Str {
            value: value.clone(),
            raw: raw.clone(),
        }),
        FlowKind::Array(elem) => TsTypeKind::Array(Box::new(convert_type(elem)?)),
        FlowKind::Tuple(types) => TsTypeKind::Tuple(convert_types(types)?),
        FlowKind::Union(types) => TsTypeKind::Union(convert_types(types)?),
        FlowKind::Intersection(types) => TsTypeKind::Intersection(convert_types(types)?),
        FlowKind::Nullable(inner) => TsTypeKind::Union(vec![
            convert_type(inner)?,
            TsType::keyword(Keyword::Null),
            TsType::keyword(Keyword::Undefined),
        ]),
        FlowKind::Function(function) => TsTypeKind::Function(convert_function(function)?),
        FlowKind::Generic(generic) => return convert_generic(generic, span),
        FlowKind::Typeof(argument) => TsTypeKind::Query(typeof_name(argument)?),
        FlowKind::Object(object) => return convert_object(object, span),
        FlowKind::TypeAnnotation(inner) => return convert_type(inner),
        _ => return Err(not_understood(node)),
    };

    Ok(TsType::new(kind, span))
}

/// Rebuilds an identifier or a qualified identifier as a TypeScript name.
pub fn to_entity_name(node: &Node) -> Result<EntityName> {
    match node {
        Node::Js(Js::Ident(id)) => Ok(EntityName::Ident(id.clone())),
        Node::Ts(Ts::EntityName(name)) => Ok(name.clone()),
        Node::Flow(flow) => match &flow.kind {
            FlowKind::QualifiedTypeIdentifier(qualified) => Ok(EntityName::Qualified(
                Box::new(to_entity_name(&qualified.qualification)?),
                qualified.id.clone(),
            )),
            _ => Err(unexpected("an identifier or qualified name", node)),
        },
        _ => Err(unexpected("an identifier or qualified name", node)),
    }
}

/// The first name of the sequence `a`..`z`, `a1`..`z1`, `a2`.. that is not in `used`.
pub fn generate_free_identifier(used: &[String]) -> String {
    let mut round = 0;
    loop {
        for letter in 'a'..='z' {
            let candidate = match round {
                0 => letter.to_string(),
                _ => format!("{}{}", letter, round),
            };
            if !used.contains(&candidate) {
                return candidate;
            }
        }
        round += 1;
    }
}

fn not_understood(node: &Node) -> ConvertError {
    ConvertError::NotUnderstood {
        kind: node.kind(),
        span: node.span(),
    }
}

fn bare_name(node: &Node) -> ConvertError {
    ConvertError::BareName {
        kind: node.kind(),
        span: node.span(),
    }
}

fn unexpected(expected: &'static str, node: &Node) -> ConvertError {
    ConvertError::Unexpected {
        expected,
        found: node.kind(),
        span: node.span(),
    }
}

fn convert_types(types: &[Node]) -> Result<Vec<TsType>> {
    types.iter().map(convert_type).collect()
}

fn convert_generic(generic: &Generic, span: Span) -> Result<TsType> {
    let name = match generic.name() {
        Some("$Exact") => {
            let argument = generic
                .type_params
                .as_ref()
                .and_then(|params| params.first())
                .ok_or_else(|| ConvertError::MissingTypeArgument {
                    name: "$Exact".to_string(),
                    span,
                })?;
            return convert_type(argument);
        }
        Some("$FlowFixMe") => return Ok(TsType::new(TsTypeKind::Keyword(Keyword::Any), span)),
        Some("$ReadOnly") => EntityName::Ident(Ident::new("Readonly", generic.id.span())),
        _ => to_entity_name(&generic.id)?,
    };

    let type_args = match &generic.type_params {
        Some(params) if !params.is_empty() => Some(convert_types(params)?),
        _ => None,
    };

    Ok(TsType::new(
        TsTypeKind::Reference(TypeRef { name, type_args }),
        span,
    ))
}

fn typeof_name(argument: &Node) -> Result<EntityName> {
    match argument {
        Node::Flow(flow) => match &flow.kind {
            FlowKind::Generic(generic) => to_entity_name(&generic.id),
            _ => Err(typeof_without_id(argument)),
        },
        Node::Ts(Ts::Type(TsType {
            kind: TsTypeKind::Reference(reference),
            ..
        })) => Ok(reference.name.clone()),
        _ => Err(typeof_without_id(argument)),
    }
}

fn typeof_without_id(node: &Node) -> ConvertError {
    ConvertError::TypeofWithoutId {
        kind: node.kind(),
        span: node.span(),
    }
}

/// Splits an object body into type elements and spread arguments, both in source order.
fn object_members(object: &ObjectType) -> Result<(Vec<TypeElement>, Vec<TsType>)> {
    let mut elements = Vec::new();
    let mut spreads = Vec::new();

    for property in &object.properties {
        match property.as_flow() {
            Some(FlowKind::ObjectTypeSpreadProperty(argument)) => {
                spreads.push(convert_type(argument)?)
            }
            _ => elements.push(type_element(property)?),
        }
    }
    for member in object.indexers.iter().chain(&object.call_properties) {
        elements.push(type_element(member)?);
    }

    Ok((elements, spreads))
}

fn convert_object(object: &ObjectType, span: Span) -> Result<TsType> {
    let (elements, spreads) = object_members(object)?;
    if spreads.is_empty() {
        return Ok(TsType::new(TsTypeKind::TypeLit(elements), span));
    }

    let mut types = Vec::with_capacity(spreads.len() + 1);
    if !elements.is_empty() {
        types.push(TsType::new(TsTypeKind::TypeLit(elements), span));
    }
    types.extend(spreads);
    Ok(TsType::new(TsTypeKind::Intersection(types), span))
}

fn type_element(node: &Node) -> Result<TypeElement> {
    match convert_annotation_or_declaration(node)? {
        Ts::Element(element) => Ok(element),
        _ => Err(unexpected("an object type member", node)),
    }
}

fn convert_property(property: &ObjectTypeProperty, span: Span) -> Result<TypeElement> {
    Ok(TypeElement::Property(PropertySignature {
        span,
        key: property.key.clone(),
        readonly: property.variance == Some(Variance::Minus),
        optional: property.optional,
        ty: convert_type(&property.value)?,
    }))
}

fn convert_indexer(indexer: &ObjectTypeIndexer, span: Span) -> Result<TypeElement> {
    let name = match &indexer.id {
        Some(id) => id.clone(),
        None => Ident::new(generate_free_identifier(&[]), DUMMY_SP),
    };
    Ok(TypeElement::Index(IndexSignature {
        span,
        name,
        key: convert_type(&indexer.key)?,
        value: convert_type(&indexer.value)?,
        readonly: indexer.variance == Some(Variance::Minus),
    }))
}

fn convert_call_property(value: &Node, span: Span) -> Result<TypeElement> {
    match convert_type(value)?.kind {
        TsTypeKind::Function(function) => Ok(TypeElement::Call(CallSignature { span, function })),
        _ => Err(unexpected("a function type", value)),
    }
}

fn convert_function(function: &FunctionType) -> Result<FnType> {
    let type_params = function
        .type_params
        .as_deref()
        .map(type_param_decl)
        .transpose()?;

    let mut used: Vec<String> = function
        .params
        .iter()
        .chain(function.rest.as_deref())
        .filter_map(|param| match param.as_flow() {
            Some(FlowKind::FunctionTypeParam(param)) => param.name.as_ref(),
            _ => None,
        })
        .map(|name| name.name.clone())
        .collect();

    let mut params = Vec::with_capacity(function.params.len() + 1);
    for param in &function.params {
        params.push(convert_param(param, false, &mut used)?);
    }
    if let Some(rest) = &function.rest {
        params.push(convert_param(rest, true, &mut used)?);
    }

    let return_type = match convert_annotation_or_declaration(&function.return_type)? {
        Ts::Type(ty) | Ts::TypeAnn(TypeAnn { ty, .. }) => ty,
        _ => {
            return Err(ConvertError::ReturnType {
                kind: function.return_type.kind(),
                span: function.return_type.span(),
            })
        }
    };

    Ok(FnType {
        type_params,
        params,
        return_type: Box::new(return_type),
    })
}

/// Anonymous parameters get the first free name, which is then taken.
fn convert_param(node: &Node, rest: bool, used: &mut Vec<String>) -> Result<FnParam> {
    let Some(FlowKind::FunctionTypeParam(param)) = node.as_flow() else {
        return Err(unexpected("a function parameter", node));
    };

    let name = match &param.name {
        Some(name) => name.clone(),
        None => {
            let name = generate_free_identifier(used);
            used.push(name.clone());
            Ident::new(name, DUMMY_SP)
        }
    };

    let ty = match convert_annotation_or_declaration(&param.type_annotation)? {
        Ts::Type(ty) | Ts::TypeAnn(TypeAnn { ty, .. }) => ty,
        _ => {
            return Err(ConvertError::ParamType {
                kind: param.type_annotation.kind(),
                span: param.type_annotation.span(),
            })
        }
    };

    Ok(FnParam {
        name,
        optional: param.optional,
        rest,
        ty,
    })
}

fn type_param_decl(node: &Node) -> Result<TypeParamDecl> {
    match convert_annotation_or_declaration(node)? {
        Ts::TypeParamDecl(decl) => Ok(decl),
        _ => Err(unexpected("a type parameter declaration", node)),
    }
}

fn convert_type_params(params: &[Node], span: Span) -> Result<TypeParamDecl> {
    let params = params
        .iter()
        .map(|param| match convert_annotation_or_declaration(param)? {
            Ts::TypeParam(param) => Ok(param),
            _ => Err(unexpected("a type parameter", param)),
        })
        .collect::<Result<_>>()?;
    Ok(TypeParamDecl { span, params })
}

fn convert_type_param(param: &TypeParameter, span: Span) -> Result<TypeParam> {
    Ok(TypeParam {
        span,
        name: param.name.name.clone(),
        constraint: param.bound.as_deref().map(convert_type).transpose()?,
        default: param.default.as_deref().map(convert_type).transpose()?,
    })
}

fn convert_extends(generic: &Generic, span: Span) -> Result<ExprWithTypeArgs> {
    let type_args = match &generic.type_params {
        Some(params) if !params.is_empty() => Some(convert_types(params)?),
        _ => None,
    };
    Ok(ExprWithTypeArgs {
        span,
        expr: to_entity_name(&generic.id)?,
        type_args,
    })
}

fn convert_interface(decl: &InterfaceDeclaration, span: Span) -> Result<InterfaceDecl> {
    if let Some(spread) = decl
        .body
        .properties
        .iter()
        .find(|property| property.kind() == NodeKind::ObjectTypeSpreadProperty)
    {
        return Err(ConvertError::SpreadInInterface {
            span: spread.span(),
        });
    }

    let (body, _) = object_members(&decl.body)?;
    let extends = decl
        .extends
        .iter()
        .map(|node| match convert_annotation_or_declaration(node)? {
            Ts::ExprWithTypeArgs(expr) => Ok(expr),
            _ => Err(unexpected("an interface heritage clause", node)),
        })
        .collect::<Result<_>>()?;

    Ok(InterfaceDecl {
        span,
        id: decl.id.clone(),
        type_params: decl.type_params.as_deref().map(type_param_decl).transpose()?,
        extends,
        body,
    })
}

fn convert_type_alias(alias: &TypeAlias, span: Span) -> Result<TypeAliasDecl> {
    Ok(TypeAliasDecl {
        span,
        id: alias.id.clone(),
        type_params: alias.type_params.as_deref().map(type_param_decl).transpose()?,
        ty: convert_type(&alias.right)?,
    })
}

/// Opaque types become transparent aliases of their underlying type.
fn convert_opaque_type(opaque: &OpaqueType, span: Span) -> Result<TypeAliasDecl> {
    Ok(TypeAliasDecl {
        span,
        id: opaque.id.clone(),
        type_params: opaque.type_params.as_deref().map(type_param_decl).transpose()?,
        ty: convert_type(&opaque.impltype)?,
    })
}
