use crate::flow::{FlowKind, Variance as Marker};
use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::{convert_in_place, VARIANCE_ISSUE};

/// Converts object type properties. `-` becomes `readonly`; `+` has no counterpart and warns.
pub struct Variance;

impl Rule for Variance {
    fn name(&self) -> &'static str {
        "Variance"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new().on(NodeKind::ObjectTypeProperty, |path| {
            let Some(FlowKind::ObjectTypeProperty(property)) = path.node().as_flow() else {
                return Ok(());
            };
            if property.variance == Some(Marker::Plus) {
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
    use crate::rules::VARIANCE_ISSUE;
    use crate::testing::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn minus_properties_are_readonly() {
        let output = compile_helper("type A = { -a: number, ...B };");
        assert_eq!(output.code, "type A = { readonly a: number } & B;\n");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn plus_properties_warn() {
        let output = compile_helper("type A = { +a: 1 };");
        assert_eq!(output.code, "type A = { a: 1 };\n");
        assert_eq!(output.warnings.len(), 1);
        let warning = &output.warnings[0];
        assert_eq!(warning.message, "Contravariance can't be expressed in TypeScript");
        assert_eq!(warning.url, VARIANCE_ISSUE);
        assert_eq!((warning.line, warning.column), (1, 12));
    }

    #[test]
    fn interface_members() {
        let output = compile_helper("interface I {\n  +a: 1;\n  b: 2;\n}\n");
        assert_eq!(output.code, "interface I {\n  a: 1;\n  b: 2;\n}\n");
        assert_eq!((output.warnings[0].line, output.warnings[0].column), (2, 3));
    }
}
