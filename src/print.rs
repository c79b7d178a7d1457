use std::fmt::{self, Display};
use std::ops::Range;

use swc_common::{SourceFile, Span};

use crate::error::Error;
use crate::node::{
    Code, ExportNamed, ImportDecl, ImportKind, ImportSpecifier, Js, Node, Program, SpecifierForm,
};

#[cfg(windows)]
const EOL: &str = "\r\n";
#[cfg(not(windows))]
const EOL: &str = "\n";

/// Pragmas that mark a file as Flow, and nothing else.
const PRAGMAS: [&str; 5] = ["@flow", "@noflow", "@flow strict", "@flow strict-local", "@flow weak"];

/// Prints `program`, which was parsed from `file`.
///
/// Statements no rule touched, and everything between statements, are copied from the source.
/// Touched statements are printed from their nodes, except ordinary code, where only the
/// embedded annotations are. The Flow pragma comment is dropped.
pub fn print(program: &Program, file: &SourceFile) -> Result<String, Error> {
    let src = file.src.as_str();
    let base = file.start_pos.0;
    let offset = |span: Span| (span.lo.0 - base) as usize..(span.hi.0 - base) as usize;

    let pragma = find_pragma(program).map(|span| {
        let Range { start, mut end } = offset(span);
        if src[end..].starts_with("\r\n") {
            end += 2;
        } else if src[end..].starts_with('\n') {
            end += 1;
        }
        start..end
    });

    let mut out = String::with_capacity(src.len());
    let mut cursor = 0;
    for statement in &program.body {
        let range = offset(statement.span);
        push_trivia(&mut out, src, cursor..range.start, pragma.as_ref());

        if statement.touched {
            let printed = match &statement.node {
                Node::Js(Js::Verbatim(code)) => splice(src, &offset, code)?,
                node => regenerate(node).ok_or_else(|| unconverted(node))?,
            };
            out.push_str(&printed);
        } else {
            out.push_str(&src[range.clone()]);
        }
        cursor = range.end;
    }
    push_trivia(&mut out, src, cursor..src.len(), pragma.as_ref());

    Ok(out)
}

/// Drops leading empty lines and ends the text with exactly one line terminator.
pub fn normalize(text: &str) -> String {
    let mut rest = text;
    while let Some(end) = rest.find('\n') {
        if !rest[..end].trim_end_matches('\r').is_empty() {
            break;
        }
        rest = &rest[end + 1..];
    }
    let body = rest.trim_end_matches(|c| c == '\r' || c == '\n');
    format!("{}{}", body, EOL)
}

/// The first comment before the first statement that is only a Flow pragma.
fn find_pragma(program: &Program) -> Option<Span> {
    let first = program.body.first()?;
    program
        .comments
        .iter()
        .take_while(|comment| comment.span.hi <= first.span.lo)
        .find(|comment| {
            let value = comment
                .value
                .lines()
                .map(|line| line.trim().trim_start_matches('*').trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            PRAGMAS.contains(&value.as_str())
        })
        .map(|comment| comment.span)
}

fn push_trivia(out: &mut String, src: &str, range: Range<usize>, pragma: Option<&Range<usize>>) {
    match pragma {
        Some(pragma) if range.start <= pragma.start && pragma.start < range.end => {
            out.push_str(&src[range.start..pragma.start]);
            out.push_str(&src[pragma.end.min(range.end)..range.end]);
        }
        _ => out.push_str(&src[range]),
    }
}

/// Prints ordinary code as written, with each embedded annotation replaced by its conversion.
fn splice(
    src: &str,
    offset: &impl Fn(Span) -> Range<usize>,
    code: &Code,
) -> Result<String, Error> {
    let Range { start, end } = offset(code.span);
    let mut out = String::with_capacity(end - start);
    let mut cursor = start;
    for node in &code.embedded {
        let Node::Ts(ts) = node else {
            return Err(unconverted(node));
        };
        let range = offset(node.span());
        out.push_str(&src[cursor..range.start]);
        out.push_str(&ts.to_string());
        cursor = range.end;
    }
    out.push_str(&src[cursor..end]);
    Ok(out)
}

fn unconverted(node: &Node) -> Error {
    Error::Unconverted {
        kind: node.kind(),
        span: node.span(),
    }
}

/// Prints a statement from its nodes. `None` if the statement still holds something only Flow
/// understands.
fn regenerate(node: &Node) -> Option<String> {
    match node {
        Node::Ts(ts) => Some(ts.to_string()),
        Node::Js(Js::Import(import)) => Some(import.to_string()),
        Node::Js(Js::ExportNamed(export)) => match export.declaration.as_deref() {
            Some(declaration) => Some(format!("export {}", regenerate(declaration)?)),
            None => Some(export.to_string()),
        },
        _ => None,
    }
}

fn kind_prefix(kind: ImportKind) -> &'static str {
    match kind {
        ImportKind::Value => "",
        ImportKind::Type => "type ",
        ImportKind::Typeof => "typeof ",
    }
}

impl Display for ImportSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", kind_prefix(self.kind))?;
        match &self.form {
            SpecifierForm::Default(local) => write!(f, "{}", local),
            SpecifierForm::Namespace(local) => write!(f, "* as {}", local),
            SpecifierForm::Named {
                imported,
                local: Some(local),
            } => write!(f, "{} as {}", imported, local),
            SpecifierForm::Named {
                imported,
                local: None,
            } => write!(f, "{}", imported),
        }
    }
}

impl Display for ImportDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "import {}", kind_prefix(self.kind))?;

        let specifiers: Vec<&ImportSpecifier> = self
            .specifiers
            .iter()
            .filter_map(|node| match node {
                Node::Js(Js::ImportSpecifier(specifier)) => Some(specifier),
                _ => None,
            })
            .collect();
        let (named, bare): (Vec<_>, Vec<_>) = specifiers
            .into_iter()
            .partition(|specifier| matches!(specifier.form, SpecifierForm::Named { .. }));

        let mut clauses = bare.iter().map(ToString::to_string).collect::<Vec<_>>();
        if !named.is_empty() {
            let named = named.iter().map(ToString::to_string).collect::<Vec<_>>();
            clauses.push(format!("{{ {} }}", named.join(", ")));
        }

        if !clauses.is_empty() {
            write!(f, "{} from ", clauses.join(", "))?;
        }
        write!(f, "{};", self.source)
    }
}

impl Display for ExportNamed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export {}{{ ", kind_prefix(self.kind))?;
        for (i, specifier) in self.specifiers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", specifier.local)?;
            if let Some(exported) = &specifier.exported {
                write!(f, " as {}", exported)?;
            }
        }
        write!(f, " }}")?;
        if let Some(source) = &self.source {
            write!(f, " from {}", source)?;
        }
        write!(f, ";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn untouched_programs_print_as_written() {
        let code = indoc! {"
            /* header */
            const a = {b: 1};   // trailing

            function f(x) {
              return x;
            }
        "};
        assert_eq!(compile_helper(code).code, code);
    }

    #[test]
    fn pragma_is_dropped() {
        let output = compile_helper("// @flow\n\ntype A = ?B;\nconst a = 1;\n");
        assert_eq!(output.code, "type A = B | null | undefined;\nconst a = 1;\n");

        let output = compile_helper("/* @flow strict */\nconst a = 1;\n");
        assert_eq!(output.code, "const a = 1;\n");

        let output = compile_helper("/**\n * @flow\n */\nconst a = 1;\n");
        assert_eq!(output.code, "const a = 1;\n");
    }

    #[test]
    fn only_the_pragma_comment_is_dropped() {
        let output = compile_helper("// Copyright\n// @flow\nconst a = 1; // @flow\n");
        assert_eq!(output.code, "// Copyright\nconst a = 1; // @flow\n");
    }

    #[test]
    fn comments_that_mention_flow_stay() {
        let code = "// @flow is great\nconst a = 1;\n";
        assert_eq!(compile_helper(code).code, code);
    }

    #[test]
    fn normalize_lines() {
        assert_eq!(normalize("\n\n\nconst a = 1;"), format!("const a = 1;{}", EOL));
        assert_eq!(normalize("a\n\n\n"), format!("a{}", EOL));
        assert_eq!(normalize("  a\n"), format!("  a{}", EOL));
        assert_eq!(normalize(""), EOL);
    }

    #[test]
    fn import_display() {
        let program = parse_helper("import type A, * as b from 'a';\nimport 'side-effect';\n");
        let printed: Vec<String> = program
            .body
            .iter()
            .map(|statement| regenerate(&statement.node).expect("printable"))
            .collect();
        assert_eq!(
            printed,
            vec!["import type A, * as b from 'a';", "import 'side-effect';"]
        );
    }
}
