use crate::node::{ExportNamed, ImportDecl, ImportKind, ImportSpecifier, Js, Node, NodeKind};
use crate::registry::{Handlers, Rule};

use super::TYPEOF_DOCS;

/// Turns type-only imports and exports into plain ones. TypeScript resolves whether an imported
/// name is a type by itself.
pub struct TypeImports;

const TYPEOF_WARNING: &str =
    "typeof imports can't be expressed in TypeScript; importing the value instead";

impl Rule for TypeImports {
    fn name(&self) -> &'static str {
        "TypeImport"
    }

    fn handlers(&self) -> Handlers {
        Handlers::new()
            .on(NodeKind::ImportDeclaration, |path| {
                let Node::Js(Js::Import(import)) = path.node() else {
                    return Ok(());
                };
                if import.kind == ImportKind::Value {
                    return Ok(());
                }
                let typeof_import = import.kind == ImportKind::Typeof;
                let import = ImportDecl {
                    kind: ImportKind::Value,
                    ..import.clone()
                };
                if typeof_import {
                    path.warn(
                        import.span,
                        TYPEOF_WARNING,
                        TYPEOF_DOCS,
                    );
                }
                path.replace_with(Js::Import(import));
                Ok(())
            })
            .on(NodeKind::ImportSpecifier, |path| {
                let Node::Js(Js::ImportSpecifier(specifier)) = path.node() else {
                    return Ok(());
                };
                if specifier.kind == ImportKind::Value {
                    return Ok(());
                }
                let typeof_import = specifier.kind == ImportKind::Typeof;
                let specifier = ImportSpecifier {
                    kind: ImportKind::Value,
                    ..specifier.clone()
                };
                if typeof_import {
                    path.warn(
                        specifier.span,
                        TYPEOF_WARNING,
                        TYPEOF_DOCS,
                    );
                }
                path.replace_with(Js::ImportSpecifier(specifier));
                Ok(())
            })
            .on(NodeKind::ExportNamedDeclaration, |path| {
                let Node::Js(Js::ExportNamed(export)) = path.node() else {
                    return Ok(());
                };
                if export.kind == ImportKind::Value {
                    return Ok(());
                }
                let export = ExportNamed {
                    kind: ImportKind::Value,
                    ..export.clone()
                };
                path.replace_with(Js::ExportNamed(export));
                Ok(())
            })
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::*;

    #[test]
    fn type_imports() {
        let output = compile_helper("import type { A, B as C } from './a';");
        assert_eq!(output.code, "import { A, B as C } from './a';\n");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn type_specifiers() {
        assert_eq!(
            compile_helper("import D, { type A, b } from \"m\";").code,
            "import D, { A, b } from \"m\";\n"
        );
    }

    #[test]
    fn typeof_imports_warn() {
        let output = compile_helper("import typeof T from 't';\nimport { typeof U } from 'u';\n");
        assert_eq!(output.code, "import T from 't';\nimport { U } from 'u';\n");
        assert_eq!(output.warnings.len(), 2);
        assert_eq!((output.warnings[1].line, output.warnings[1].column), (2, 10));
    }

    #[test]
    fn type_exports() {
        assert_eq!(
            compile_helper("export type { A, B as C } from './a';").code,
            "export { A, B as C } from './a';\n"
        );
        assert_eq!(
            compile_helper("export type { A };").code,
            "export { A };\n"
        );
    }

    #[test]
    fn value_imports_are_untouched() {
        let code = "import   {a}   from 'a'  ;\n";
        let output = compile_helper(code);
        assert_eq!(output.code, code);
    }
}
