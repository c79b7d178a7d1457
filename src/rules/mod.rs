//! The rules that ship with the crate. Each one is a thin layer over [`crate::convert`] that
//! decides which nodes to rewrite and which losses to warn about.

use crate::convert::convert_annotation_or_declaration;
use crate::error::ConvertError;
use crate::registry::Rule;
use crate::visit::Path;

mod annotation;
mod bounds;
mod casting;
mod exact;
mod indexer;
mod interface;
mod keys;
mod type_alias;
mod type_import;
mod variance;

pub use annotation::Annotations;
pub use bounds::Bounds;
pub use casting::Casting;
pub use exact::Exact;
pub use indexer::Indexer;
pub use interface::Interfaces;
pub use keys::Keys;
pub use type_alias::TypeAliases;
pub use type_import::TypeImports;
pub use variance::Variance;

pub(crate) const VARIANCE_ISSUE: &str = "https://github.com/Microsoft/TypeScript/issues/1394";
pub(crate) const EXACT_ISSUE: &str = "https://github.com/Microsoft/TypeScript/issues/12936";
pub(crate) const OPAQUE_ISSUE: &str = "https://github.com/Microsoft/TypeScript/issues/202";
pub(crate) const TYPEOF_DOCS: &str = "https://www.typescriptlang.org/docs/handbook/2/typeof-types.html";

/// Every built-in rule, in registration order.
pub fn builtin() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(Annotations),
        Box::new(Bounds),
        Box::new(Casting),
        Box::new(Exact),
        Box::new(Indexer),
        Box::new(Interfaces),
        Box::new(Keys),
        Box::new(TypeAliases),
        Box::new(TypeImports),
        Box::new(Variance),
    ]
}

/// Replaces the node with its TypeScript counterpart.
fn convert_in_place(path: &mut Path<'_>) -> Result<(), ConvertError> {
    let converted = convert_annotation_or_declaration(path.node())?;
    path.replace_with(converted);
    Ok(())
}
