use std::sync::Arc;

use swc_common::sync::Lrc;
use swc_common::{FileName, SourceFile, SourceMap};
use tracing::{debug, warn};

use crate::error::{CompileError, ConvertError, Error};
use crate::node::Program;
use crate::parse::parse;
use crate::print::{normalize, print};
use crate::registry::RuleRegistry;
use crate::visit::traverse;
use crate::warning::{locate, Warning, Warnings};

/// The result of compiling one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// The TypeScript text.
    pub code: String,

    /// Everything that was converted with a loss of meaning.
    pub warnings: Vec<Warning>,
}

/// Compiles Flow files to TypeScript with a fixed set of rules.
#[derive(Clone)]
pub struct Compiler {
    registry: Arc<RuleRegistry>,
}

impl Compiler {
    /// A compiler running the rules in `registry`.
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    /// The rules this compiler runs.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Compiles `code`. `filename` is only used in messages.
    pub fn compile(&self, code: &str, filename: &str) -> Result<Output, CompileError> {
        let cm = Lrc::<SourceMap>::default();
        let fm = cm.new_source_file(FileName::Custom(filename.to_string()), code.to_string());
        self.compile_file(&cm, &fm)
    }

    /// Compiles a file that was already loaded into `cm`.
    pub fn compile_file(
        &self,
        cm: &Lrc<SourceMap>,
        file: &SourceFile,
    ) -> Result<Output, CompileError> {
        self.run(cm, file).map_err(|error| {
            let (line, column) = error.span().map_or((0, 0), |span| locate(cm, span));
            CompileError {
                filename: display_name(&file.name),
                line,
                column,
                error,
            }
        })
    }

    /// Runs every rule over `program`, returning the warnings raised and the rewritten tree.
    ///
    /// The tree may still hold Flow nodes if no rule handles them.
    pub fn convert(
        &self,
        mut program: Program,
        cm: &Lrc<SourceMap>,
    ) -> Result<(Vec<Warning>, Program), ConvertError> {
        let visitor = self.registry.compose();
        let mut warnings = Warnings::new(cm.clone());
        traverse(&mut program, &visitor, &mut warnings)?;
        Ok((warnings.into_vec(), program))
    }

    fn run(&self, cm: &Lrc<SourceMap>, file: &SourceFile) -> Result<Output, Error> {
        let program = parse(file)?;
        debug!(file = %file.name, statements = program.body.len(), "parsed");

        let (warnings, program) = self.convert(program, cm)?;
        let path = display_name(&file.name);
        for warning in &warnings {
            warn!(
                "Warning: {} (at {}: line {}, column {}). See {}",
                warning.message, path, warning.line, warning.column, warning.url
            );
        }

        if let Some(node) = program.find_flow_only() {
            return Err(Error::Unconverted {
                kind: node.kind(),
                span: node.span(),
            });
        }

        let code = normalize(&print(&program, file)?);
        Ok(Output { code, warnings })
    }
}

/// Compiles `code` on tokio's blocking pool.
pub async fn compile(
    registry: Arc<RuleRegistry>,
    code: String,
    filename: String,
) -> Result<Output, CompileError> {
    let name = filename.clone();
    tokio::task::spawn_blocking(move || Compiler::new(registry).compile(&code, &filename))
        .await
        .unwrap_or_else(|err| {
            Err(CompileError {
                filename: name,
                line: 0,
                column: 0,
                error: Error::Join(err),
            })
        })
}

fn display_name(name: &FileName) -> String {
    match name {
        FileName::Real(path) => path.display().to_string(),
        FileName::Custom(name) => name.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use crate::node::NodeKind;
    use crate::registry::Rule;
    use crate::rules::{Bounds, Exact, Indexer, Interfaces, Keys, TypeAliases, Variance};
    use crate::testing::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn nullable_alias() {
        let output = compile_helper("type X = ?string");
        assert_eq!(output.code, "type X = string | null | undefined;\n");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn readonly_property_and_spread() {
        let output = compile_helper("type A = { -a: number, ...B }");
        assert_eq!(output.code, "type A = { readonly a: number } & B;\n");
        assert!(output.warnings.is_empty());

        let output = compile_helper("type A = { +a: number, ...B }");
        assert_eq!(output.code, "type A = { a: number } & B;\n");
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn anonymous_function_parameters() {
        let output = compile_helper("type F = (number, string) => boolean");
        assert_eq!(output.code, "type F = (a: number, b: string) => boolean;\n");
    }

    #[test]
    fn casting_is_builtin() {
        struct Casting;

        impl Rule for Casting {
            fn name(&self) -> &'static str {
                "Casting"
            }

            fn handlers(&self) -> crate::registry::Handlers {
                crate::registry::Handlers::new()
            }
        }

        let mut registry = RuleRegistry::builtin().expect("builtin rules");
        assert_eq!(
            registry.register(Box::new(Casting)),
            Err(RegistryError::Duplicate {
                name: "Casting".to_string()
            })
        );
    }

    #[test]
    fn mixed_program() {
        let code = indoc! {"
            // @flow
            import type { Node } from './node';
            import { parse } from './parse';

            export type Visitor = {
              -enter?: (Node) => void,
              +leave: mixed,
            };

            export function visit(node: Node, visitor: Visitor): void {
              visitor.enter(node);
            }
        "};
        let output = compile_helper(code);
        assert_eq!(
            output.code,
            indoc! {"
                import { Node } from './node';
                import { parse } from './parse';

                export type Visitor = { readonly enter?: (a: Node) => undefined; leave: unknown };

                export function visit(node: Node, visitor: Visitor): undefined {
                  visitor.enter(node);
                }
            "}
        );
        assert_eq!(output.warnings.len(), 1);
        assert_eq!((output.warnings[0].line, output.warnings[0].column), (7, 3));
    }

    #[test]
    fn annotations_in_code() {
        let output = compile_helper("function f(x: ?string): void {}\nconst y = (z: any);\n");
        assert_eq!(
            output.code,
            "function f(x: string | null | undefined): undefined {}\nconst y = (z as any);\n"
        );
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn annotations_in_code_need_a_rule() {
        let registry = RuleRegistry::with_rules([Box::new(Bounds) as Box<dyn Rule>])
            .expect("unique names");
        let err = Compiler::new(Arc::new(registry))
            .compile("const a = 1;\nlet b: ?string = null;\n", "a.js")
            .expect_err("annotation left as is");
        assert_eq!((err.line, err.column), (2, 6));
        assert!(matches!(
            err.error,
            Error::Unconverted {
                kind: NodeKind::TypeAnnotation,
                ..
            }
        ));
    }

    #[test]
    fn literals_before_declarations() {
        let output = compile_helper("const r = /[{]/;\ntype A = ?string;\n");
        assert_eq!(
            output.code,
            "const r = /[{]/;\ntype A = string | null | undefined;\n"
        );

        let output = compile_helper(indoc! {"
            const el = <div className=\"a\">{x}</div>;
            type A = ?string;
        "});
        assert_eq!(
            output.code,
            indoc! {"
                const el = <div className=\"a\">{x}</div>;
                type A = string | null | undefined;
            "}
        );
    }

    #[test]
    fn nested_declarations() {
        assert_eq!(
            compile_helper("function f() {\n  type A = ?string;\n  return 1;\n}\n").code,
            "function f() {\n  type A = string | null | undefined;\n  return 1;\n}\n"
        );
    }

    #[test]
    fn output_compiles_to_itself() {
        let first = compile_helper("// @flow\ntype A = ?number;\ntype B = Array<string>;\nconst x = 1;\n");
        assert_eq!(
            first.code,
            "type A = number | null | undefined;\ntype B = Array<string>;\nconst x = 1;\n"
        );
        let second = compile_helper(&first.code);
        assert_eq!(second.code, first.code);
    }

    #[test]
    fn plain_javascript_is_untouched() {
        let code = "const a = [1, 2, 3].map((x) => x * 2);\nif (a) {\n  console.log(a);\n}\n";
        assert_eq!(compile_helper(code).code, code);
    }

    #[test]
    fn unhandled_flow_nodes_fail() {
        let registry = RuleRegistry::with_rules([
            Box::new(Bounds) as Box<dyn Rule>,
            Box::new(Exact),
            Box::new(Indexer),
            Box::new(Interfaces),
            Box::new(Keys),
            Box::new(TypeAliases),
            Box::new(Variance),
        ])
        .expect("unique names");
        let err = Compiler::new(Arc::new(registry))
            .compile("const a = 1;\nimport type { A } from './a';\n", "a.js")
            .expect_err("type import left as is");
        assert_eq!(err.filename, "a.js");
        assert_eq!((err.line, err.column), (2, 1));
        assert!(matches!(
            err.error,
            Error::Unconverted {
                kind: NodeKind::ImportDeclaration,
                ..
            }
        ));
    }

    #[test]
    fn parse_errors_are_located() {
        let err = try_compile_helper("const a = 1;\ntype A = {").expect_err("unterminated");
        assert_eq!(err.filename, "test.js");
        assert_eq!(err.line, 2);
        assert!(matches!(err.error, Error::Parse(_)));
    }

    #[test]
    fn convert_keeps_unhandled_nodes() {
        let cm = Lrc::<SourceMap>::default();
        let program = parse_helper("type A = string;");
        let compiler = Compiler::new(Arc::new(RuleRegistry::new()));
        let (warnings, program) = compiler.convert(program, &cm).expect("conversion");
        assert!(warnings.is_empty());
        assert_eq!(
            program.find_flow_only().map(|node| node.kind()),
            Some(NodeKind::TypeAlias)
        );
    }

    #[tokio::test]
    async fn compile_on_blocking_pool() {
        let registry = Arc::new(RuleRegistry::builtin().expect("builtin rules"));
        let output = compile(registry, "type X = ?string".to_string(), "x.js".to_string())
            .await
            .expect("compiles");
        assert_eq!(output.code, "type X = string | null | undefined;\n");
    }
}
