use crate::node::NodeKind;
use crate::registry::{Handlers, Rule};

use super::{convert_in_place, OPAQUE_ISSUE};

/// Converts type aliases. Opaque types lose their opacity.
pub struct TypeAliases;

impl Rule for TypeAliases {
    fn name(&self) -> &'static str {
        "TypeAlias"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new()
            .on(NodeKind::TypeAlias, convert_in_place)
            .on(NodeKind::OpaqueType, |path| {
                let span = path.node().span();
                path.warn(
                    span,
                    "Opaque types can't be expressed in TypeScript",
                    OPAQUE_ISSUE,
                );
                convert_in_place(path)
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::OPAQUE_ISSUE;
    use crate::testing::*;

    #[test]
    fn aliases() {
        let output = compile_helper("type X = ?string;");
        assert_eq!(output.code, "type X = string | null | undefined;\n");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn exported_aliases() {
        assert_eq!(
            compile_helper("export type X<T> = Array<T>;").code,
            "export type X<T> = Array<T>;\n"
        );
    }

    #[test]
    fn opaque_types_become_transparent() {
        let output = compile_helper("export opaque type Id: string = string;");
        assert_eq!(output.code, "export type Id = string;\n");
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.warnings[0].url, OPAQUE_ISSUE);
        assert_eq!((output.warnings[0].line, output.warnings[0].column), (1, 8));
    }
}
