use crate::flow::{FlowKind, Variance};
use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::{convert_in_place, VARIANCE_ISSUE};

/// Converts indexers into index signatures, naming the key when Flow left it anonymous.
pub struct Indexer;

impl Rule for Indexer {
    fn name(&self) -> &'static str {
        "Indexer"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new().on(NodeKind::ObjectTypeIndexer, |path| {
            let Some(FlowKind::ObjectTypeIndexer(indexer)) = path.node().as_flow() else {
                return Ok(());
            };
            if indexer.variance == Some(Variance::Plus) {
                let span = path.node().span();
                path.warn(
                    span,
                    "Contravariance can't be expressed in TypeScript",
                    VARIANCE_ISSUE,
                );
            }
            convert_in_place(path)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    #[test]
    fn anonymous_keys_are_named() {
        assert_eq!(
            compile_helper("type A = { [string]: number };").code,
            "type A = { [a: string]: number };\n"
        );
    }

    #[test]
    fn named_and_readonly_indexers() {
        let output = compile_helper("type A = { -[key: string]: number };");
        assert_eq!(output.code, "type A = { readonly [key: string]: number };\n");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn plus_indexers_warn() {
        let output = compile_helper("type A = { +[k: K]: V };");
        assert_eq!(output.code, "type A = { [k: K]: V };\n");
        assert_eq!(output.warnings.len(), 1);
    }
}
