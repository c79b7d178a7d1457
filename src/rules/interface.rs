use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::convert_in_place;

/// Converts interface declarations.
pub struct Interfaces;

impl Rule for Interfaces {
    fn name(&self) -> &'static str {
        "Interface"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new().on(NodeKind::InterfaceDeclaration, convert_in_place)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ConvertError, Error};
    use crate::testing::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn interfaces() {
        let output = compile_helper(indoc! {"
            export interface Shape<T> extends Base, ns.Other<T> {
              -kind: string,
              area(): number,
              [key: string]: mixed,
              (t: T): void,
            }
        "});
        assert_eq!(
            output.code,
            indoc! {"
                export interface Shape<T> extends Base, ns.Other<T> {
                  readonly kind: string;
                  area: () => number;
                  [key: string]: unknown;
                  (t: T): undefined;
                }
            "}
        );
    }

    #[test]
    fn spreads_fail() {
        let err = try_compile_helper("interface I {\n  ...A\n}\n").expect_err("spread");
        assert!(matches!(
            err.error,
            Error::Convert(ConvertError::SpreadInInterface { .. })
        ));
        assert_eq!((err.line, err.column), (2, 3));
    }
}
