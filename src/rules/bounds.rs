use crate::flow::FlowKind;
use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::{convert_in_place, VARIANCE_ISSUE};

/// Converts type parameters, bounds and defaults included.
pub struct Bounds;

impl Rule for Bounds {
    fn name(&self) -> &'static str {
        "Bounds"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new().on(NodeKind::TypeParameter, |path| {
            let Some(FlowKind::TypeParameter(param)) = path.node().as_flow() else {
                return Ok(());
            };
            if param.variance.is_some() {
                let span = path.node().span();
                path.warn(
                    span,
                    "Type parameter variance can't be expressed in TypeScript",
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
    fn bounds_become_constraints() {
        let output = compile_helper("type A<T: B = C, U> = T;");
        assert_eq!(output.code, "type A<T extends B = C, U> = T;\n");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn variance_on_type_parameters_is_dropped() {
        let output = compile_helper("type A<+T, -U> = T;");
        assert_eq!(output.code, "type A<T, U> = T;\n");
        assert_eq!(output.warnings.len(), 2);
        assert_eq!(
            (output.warnings[1].line, output.warnings[1].column),
            (1, 12)
        );
    }

    #[test]
    fn function_type_parameters() {
        assert_eq!(
            compile_helper("type F = <T: string>(t: T) => T;").code,
            "type F = <T extends string>(t: T) => T;\n"
        );
    }
}
