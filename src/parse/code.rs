use swc_common::BytePos;

use crate::flow::FlowKind;
use crate::lexer::{Lexeme, Token};
use crate::node::{Code, Js, Node, Statement};

use super::{PResult, Parser};

/// Words after which `(` or `<` starts an expression instead of continuing one.
const KEYWORDS: [&str; 29] = [
    "if", "for", "while", "switch", "catch", "with", "function", "return", "typeof", "await",
    "yield", "new", "delete", "void", "in", "of", "instanceof", "do", "else", "case", "throw",
    "const", "let", "var", "async", "export", "default", "extends", "class",
];

/// Words that can precede the name of a method or class member.
const MODIFIERS: [&str; 5] = ["static", "async", "get", "set", "declare"];

/// Where the scanner is inside a statement of ordinary code.
#[derive(Default)]
struct Scope {
    depth: i32,

    /// Depths inside each open class body, innermost last.
    class_bodies: Vec<i32>,

    /// Depth of a `class` whose body has not opened yet.
    class_pending: Option<i32>,

    /// Depth of the `const`, `let` or `var` declaration being scanned.
    declarators: Option<i32>,
}

impl Scope {
    fn in_class_body(&self) -> bool {
        self.class_bodies.last() == Some(&self.depth)
    }

    fn track(&mut self, token: Token) {
        let opens_body = token == Token::LBrace && self.class_pending == Some(self.depth);
        self.depth += token.depth_delta();
        if opens_body {
            self.class_pending = None;
            self.class_bodies.push(self.depth);
        }
        while self.class_bodies.last().is_some_and(|&body| self.depth < body) {
            self.class_bodies.pop();
        }
        if let Some(depth) = self.declarators {
            if self.depth < depth || (self.depth == depth && token == Token::Semi) {
                self.declarators = None;
            }
        }
    }
}

impl Parser<'_> {
    /// Consumes one statement of ordinary code, parsing the Flow annotations written inside it.
    ///
    /// The statement ends at a `;` outside brackets, or before a line that starts a type-level
    /// statement.
    pub(super) fn verbatim(&mut self) -> Statement {
        let lo = self.lo();
        let start = self.pos;
        let mut scope = Scope::default();
        let mut embedded = Vec::new();

        while let Some(lexeme) = self.tokens.get(self.pos).copied() {
            if self.pos > start
                && scope.depth <= 0
                && lexeme.line_break
                && self.starts_statement()
            {
                break;
            }
            self.step(&mut scope, &mut embedded);
            if scope.depth <= 0 && self.tokens[self.pos - 1].token == Token::Semi {
                break;
            }
        }

        let span = self.span(lo, self.prev_hi());
        Statement {
            node: Node::Js(Js::Verbatim(Code { span, embedded })),
            span,
            touched: false,
        }
    }

    /// Consumes one token, or a whole construct carrying annotations.
    fn step(&mut self, scope: &mut Scope, out: &mut Vec<Node>) {
        let start = self.pos;
        if !self.annotated(scope, out) {
            self.pos += 1;
        }
        for lexeme in &self.tokens[start..self.pos] {
            scope.track(lexeme.token);
        }
    }

    /// Scans the tokens before `end` as ordinary code.
    fn code_until(&mut self, end: usize, out: &mut Vec<Node>) {
        let mut scope = Scope::default();
        while self.pos < end {
            let (start, len) = (self.pos, out.len());
            self.step(&mut scope, out);
            if self.pos > end {
                self.pos = start + 1;
                out.truncate(len);
            }
        }
    }

    /// Tries the constructs that can carry annotations at the cursor. Returns whether one was
    /// consumed.
    fn annotated(&mut self, scope: &mut Scope, out: &mut Vec<Node>) -> bool {
        let Some(lexeme) = self.tokens.get(self.pos).copied() else {
            return false;
        };

        match lexeme.token {
            Token::Ident
                if scope.depth > 0 && self.at_statement_start() && self.starts_declaration() =>
            {
                self.attempt(out, Self::declaration)
            }
            Token::Ident => match self.text(&lexeme) {
                "function" => self.attempt(out, Self::function_signature),
                "const" | "let" | "var" => {
                    let found = self.attempt(out, Self::variable);
                    if found {
                        scope.declarators = Some(scope.depth);
                    }
                    found
                }
                "class" => {
                    let found = self.attempt(out, Self::class_head);
                    if found {
                        scope.class_pending = Some(scope.depth);
                    }
                    found
                }
                _ if scope.in_class_body() && self.at_member_start(true) => {
                    self.attempt(out, Self::class_member)
                }
                word if !KEYWORDS.contains(&word) && self.at_member_start(false) => {
                    self.attempt(out, Self::method)
                }
                _ => false,
            },
            Token::Punct if scope.in_class_body() && self.at_member_start(true) => {
                self.attempt(out, Self::class_member)
            }
            Token::Comma if scope.declarators == Some(scope.depth) => {
                self.attempt(out, Self::next_declarator)
            }
            Token::LParen if !self.after_expression() => {
                self.attempt(out, Self::arrow) || self.attempt(out, Self::cast)
            }
            Token::Lt if !self.after_expression() => self.attempt(out, Self::generic_arrow),
            _ => false,
        }
    }

    /// Runs `parse`, undoing everything it did if it fails.
    fn attempt(
        &mut self,
        out: &mut Vec<Node>,
        parse: impl FnOnce(&mut Self, &mut Vec<Node>) -> PResult<()>,
    ) -> bool {
        let (start, len) = (self.pos, out.len());
        match parse(self, out) {
            Ok(()) if self.pos > start => true,
            _ => {
                self.pos = start;
                out.truncate(len);
                false
            }
        }
    }

    fn previous(&self) -> Option<Lexeme> {
        self.pos.checked_sub(1).map(|i| self.tokens[i])
    }

    /// Whether the token before the cursor ends an expression, so that `(` is a call and `<` a
    /// comparison.
    fn after_expression(&self) -> bool {
        match self.previous() {
            Some(prev) => match prev.token {
                Token::Ident => !KEYWORDS.contains(&self.text(&prev)),
                Token::Number
                | Token::Str
                | Token::Template
                | Token::Regex
                | Token::RParen
                | Token::RBracket => true,
                _ => false,
            },
            None => false,
        }
    }

    fn at_statement_start(&self) -> bool {
        self.tokens[self.pos].line_break
            || matches!(
                self.previous().map(|prev| prev.token),
                Some(Token::LBrace | Token::Semi | Token::RBrace)
            )
    }

    fn starts_declaration(&self) -> bool {
        (self.is_word("type") && self.peek_at(1) == Some(Token::Ident))
            || (self.is_word("opaque") && self.is_word_at(1, "type"))
            || (self.is_word("interface") && self.peek_at(1) == Some(Token::Ident))
    }

    /// Whether the cursor, after any modifiers, starts a member of an object literal or, with
    /// `class_body`, of a class body.
    fn at_member_start(&self, class_body: bool) -> bool {
        let mut first = self.pos;
        while let Some(prev) = first.checked_sub(1).map(|i| self.tokens[i]) {
            let modifier = prev.token == Token::Star
                || (prev.token == Token::Ident && MODIFIERS.contains(&self.text(&prev)));
            if !modifier {
                break;
            }
            first -= 1;
        }

        let prev = first.checked_sub(1).map(|i| self.tokens[i].token);
        match prev {
            Some(Token::LBrace | Token::Comma) => true,
            Some(Token::Semi | Token::RBrace) => class_body,
            Some(
                Token::Ident
                | Token::Number
                | Token::Str
                | Token::Template
                | Token::Regex
                | Token::RParen
                | Token::RBracket,
            ) => class_body && self.tokens[first].line_break,
            _ => false,
        }
    }

    /// Index of the first token in `stops` outside brackets, from the cursor on.
    fn top_level(&self, stops: &[Token]) -> Option<usize> {
        let mut depth = 0;
        for (i, lexeme) in self.tokens.iter().enumerate().skip(self.pos) {
            if depth == 0 && stops.contains(&lexeme.token) {
                return Some(i);
            }
            depth += lexeme.token.depth_delta();
            if depth < 0 {
                return None;
            }
        }
        None
    }

    /// Consumes a bracketed group starting at the cursor.
    fn skip_group(&mut self) -> PResult<()> {
        let mut depth = 0;
        while let Some(lexeme) = self.tokens.get(self.pos) {
            depth += lexeme.token.depth_delta();
            self.pos += 1;
            if depth <= 0 {
                return Ok(());
            }
        }
        Err(self.error("a closing bracket"))
    }

    /// `: T`
    fn annotation(&mut self) -> PResult<Node> {
        let colon = self.expect(Token::Colon, "`:`")?;
        let ty = self.ty()?;
        Ok(self.flow(FlowKind::TypeAnnotation(Box::new(ty)), colon.lo))
    }

    fn return_annotation(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        if self.is(Token::Colon) {
            out.push(self.annotation()?);
        }
        Ok(())
    }

    fn code_type_params(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        out.extend(self.type_params()?.map(|decl| *decl));
        Ok(())
    }

    /// `type`, `opaque type` and `interface` declarations inside blocks.
    fn declaration(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        let mut node = if self.is_word("type") {
            self.type_alias()?
        } else if self.is_word("opaque") {
            self.opaque_type()?
        } else {
            self.interface()?
        };
        // Printed aliases end with their own `;`.
        if let Node::Flow(flow) = &mut node {
            if matches!(flow.kind, FlowKind::TypeAlias(_) | FlowKind::OpaqueType(_))
                && self.eat(Token::Semi).is_some()
            {
                flow.span = flow.span.with_hi(self.base + BytePos(self.prev_hi()));
            }
        }
        out.push(node);
        Ok(())
    }

    /// A binding name or destructuring pattern.
    fn binding(&mut self) -> PResult<()> {
        match self.peek() {
            Some(Token::Ident) => {
                self.pos += 1;
                Ok(())
            }
            Some(Token::LBrace | Token::LBracket) => self.skip_group(),
            _ => Err(self.error("a binding")),
        }
    }

    /// `(a: A, b?: B = 1, ...rest: R)`
    fn code_params(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.expect(Token::LParen, "`(`")?;
        while !self.is(Token::RParen) {
            self.eat(Token::Ellipsis);
            self.binding()?;
            self.eat(Token::Question);
            if self.is(Token::Colon) {
                out.push(self.annotation()?);
            }
            if self.eat(Token::Eq).is_some() {
                let end = self
                    .top_level(&[Token::Comma, Token::RParen])
                    .ok_or_else(|| self.error("`)`"))?;
                self.code_until(end, out);
            }
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        self.expect(Token::RParen, "`)`")?;
        Ok(())
    }

    /// `<T>(a: A): R`
    fn signature(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.code_type_params(out)?;
        self.code_params(out)?;
        self.return_annotation(out)
    }

    /// The signature of a function declaration or expression.
    fn function_signature(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.expect_word("function")?;
        self.eat(Token::Star);
        self.eat(Token::Ident);
        self.signature(out)
    }

    /// The signature of a method. Only a body can follow it.
    fn method(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.expect(Token::Ident, "a method name")?;
        self.method_rest(out)
    }

    fn method_rest(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.signature(out)?;
        match self.is(Token::LBrace) {
            true => Ok(()),
            false => Err(self.error("`{`")),
        }
    }

    /// `(a: A): R =>`
    fn arrow(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.code_params(out)?;
        self.return_annotation(out)?;
        self.expect(Token::Arrow, "`=>`")?;
        Ok(())
    }

    /// `<T>(a: T): T =>`
    fn generic_arrow(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.code_type_params(out)?;
        self.arrow(out)
    }

    /// `(expression: T)`
    fn cast(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.expect(Token::LParen, "`(`")?;
        let colon = self.cast_colon().ok_or_else(|| self.error("a cast"))?;
        self.code_until(colon, out);

        let lo = self.prev_hi();
        self.expect(Token::Colon, "`:`")?;
        let ty = self.ty()?;
        let cast = self.flow(FlowKind::TypeCast(Box::new(ty)), lo);
        self.expect(Token::RParen, "`)`")?;
        out.push(cast);
        Ok(())
    }

    /// The `:` of a cast whose expression starts at the cursor. `None` if the parenthesized
    /// code is not a cast, for instance when the colon belongs to a conditional.
    fn cast_colon(&self) -> Option<usize> {
        let mut depth = 0;
        for (i, lexeme) in self.tokens.iter().enumerate().skip(self.pos) {
            if depth == 0 {
                let optional_chain = self.tokens.get(i + 1).map(|next| next.token) == Some(Token::Dot);
                match lexeme.token {
                    Token::Colon if i > self.pos => return Some(i),
                    Token::Question if !optional_chain => return None,
                    Token::Colon | Token::RParen | Token::Semi => return None,
                    _ => {}
                }
            }
            depth += lexeme.token.depth_delta();
            if depth < 0 {
                return None;
            }
        }
        None
    }

    /// `const a: A`
    fn variable(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.pos += 1;
        self.declarator(out)
    }

    /// `, b: B` in a declaration with several declarators.
    fn next_declarator(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.expect(Token::Comma, "`,`")?;
        self.declarator(out)
    }

    fn declarator(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.binding()?;
        if self.is(Token::Colon) {
            out.push(self.annotation()?);
        }
        Ok(())
    }

    /// `class A<T>`, up to `extends` or the body.
    fn class_head(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        self.expect_word("class")?;
        if !self.is_word("extends") && !self.is_word("implements") {
            self.eat(Token::Ident);
        }
        self.code_type_params(out)
    }

    /// A property with an annotation, or a method, in a class body.
    fn class_member(&mut self, out: &mut Vec<Node>) -> PResult<()> {
        while self.is(Token::Star) || self.at_modifier() {
            self.pos += 1;
        }

        match self.peek() {
            Some(Token::Ident | Token::Str | Token::Number) => self.pos += 1,
            Some(Token::Punct) if self.peek_at(1) == Some(Token::Ident) => {
                let private = self.tokens[self.pos];
                if self.text(&private) != "#" {
                    return Err(self.error("a class member"));
                }
                self.pos += 2;
            }
            Some(Token::LBracket) => self.skip_group()?,
            _ => return Err(self.error("a class member")),
        }

        if self.is(Token::Lt) || self.is(Token::LParen) {
            return self.method_rest(out);
        }
        self.eat(Token::Question);
        out.push(self.annotation()?);
        Ok(())
    }

    /// Whether the word at the cursor is a modifier rather than the member name.
    fn at_modifier(&self) -> bool {
        let Some(lexeme) = self.tokens.get(self.pos) else {
            return false;
        };
        lexeme.token == Token::Ident
            && MODIFIERS.contains(&self.text(lexeme))
            && matches!(
                self.peek_at(1),
                Some(
                    Token::Ident
                        | Token::Str
                        | Token::Number
                        | Token::LBracket
                        | Token::Star
                        | Token::Punct
                )
            )
    }
}

#[cfg(test)]
mod tests {
    use crate::node::{Js, Node, NodeKind, Program};
    use crate::testing::*;
    use pretty_assertions::assert_eq;

    /// The kinds and source text of the annotations embedded in the only statement.
    fn embedded(code: &str) -> Vec<(NodeKind, String)> {
        let program: Program = parse_helper(code);
        assert_eq!(program.body.len(), 1, "expected one statement in {:?}", code);
        let Node::Js(Js::Verbatim(statement)) = &program.body[0].node else {
            panic!("expected code, got {:?}", program.body[0].node);
        };
        let base = program.span.lo.0;
        statement
            .embedded
            .iter()
            .map(|node| {
                let span = node.span();
                let text = &code[(span.lo.0 - base) as usize..(span.hi.0 - base) as usize];
                (node.kind(), text.to_string())
            })
            .collect()
    }

    fn annotation(text: &str) -> (NodeKind, String) {
        (NodeKind::TypeAnnotation, text.to_string())
    }

    #[test]
    fn function_signatures() {
        assert_eq!(
            embedded("function f<T: X>(a: ?T, b?: string = 'x', ...rest: Array<T>): void {}"),
            vec![
                (NodeKind::TypeParameterDeclaration, "<T: X>".to_string()),
                annotation(": ?T"),
                annotation(": string"),
                annotation(": Array<T>"),
                annotation(": void"),
            ]
        );
        assert_eq!(
            embedded("export default async function* g({ a }: Props) {}"),
            vec![annotation(": Props")]
        );
    }

    #[test]
    fn variable_declarators() {
        assert_eq!(
            embedded("const a: number = 1, b = c ? d : e, [f]: Array<number> = g;"),
            vec![annotation(": number"), annotation(": Array<number>")]
        );
        assert_eq!(embedded("for (let i: number = 0; i < n; i++) {}"), vec![annotation(": number")]);
    }

    #[test]
    fn arrow_functions() {
        assert_eq!(
            embedded("const f = (x: string, y): boolean => x === y;"),
            vec![annotation(": string"), annotation(": boolean")]
        );
        assert_eq!(
            embedded("const id = <T>(x: T): T => x;"),
            vec![
                (NodeKind::TypeParameterDeclaration, "<T>".to_string()),
                annotation(": T"),
                annotation(": T"),
            ]
        );
    }

    #[test]
    fn casts() {
        assert_eq!(
            embedded("const y = ((z: any): string);"),
            vec![
                (NodeKind::TypeCastExpression, ": any".to_string()),
                (NodeKind::TypeCastExpression, ": string".to_string()),
            ]
        );
        assert_eq!(
            embedded("f((a, b: T));"),
            vec![(NodeKind::TypeCastExpression, ": T".to_string())]
        );
    }

    #[test]
    fn class_members() {
        let code = "class A<T> extends B {\n  x: T;\n  static y: ?string = null;\n  #z: number\n  m(a: T): void {\n    const b: T = a;\n  }\n}";
        assert_eq!(
            embedded(code),
            vec![
                (NodeKind::TypeParameterDeclaration, "<T>".to_string()),
                annotation(": T"),
                annotation(": ?string"),
                annotation(": number"),
                annotation(": T"),
                annotation(": void"),
                annotation(": T"),
            ]
        );
    }

    #[test]
    fn object_methods() {
        assert_eq!(
            embedded("const o = { a: 1, m(x: number): string { return ''; }, b: c };"),
            vec![annotation(": number"), annotation(": string")]
        );
    }

    #[test]
    fn nested_declarations() {
        assert_eq!(
            embedded("function f() {\n  type A = ?string;\n  return 1;\n}\n"),
            vec![(NodeKind::TypeAlias, "type A = ?string;".to_string())]
        );
    }

    #[test]
    fn colons_that_are_not_annotations() {
        for code in [
            "const o = { a: 1, b: { c: 2 } };",
            "const v = a ? b : c;",
            "const w = (a ? b : c);",
            "const u = (a?.b ? c : d);",
            "switch (x) {\n  case 1:\n    break;\n  default:\n}",
            "label: for (;;) {}",
            "if (a) { b(c) ? d : e; }",
            "f(a, { b: c });",
            "class C {\n  x = a ?\n    b :\n    c;\n}",
        ] {
            assert_eq!(embedded(code), vec![], "{}", code);
        }
    }
}
