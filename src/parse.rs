use swc_common::{BytePos, SourceFile, Span, SyntaxContext};
use thiserror::Error;

use crate::flow::{
    Flow, FlowKind, FunctionType, FunctionTypeParam, Generic, InterfaceDeclaration, ObjectType,
    ObjectTypeIndexer, ObjectTypeProperty, OpaqueType, QualifiedTypeIdentifier, TypeAlias,
    TypeParameter, Variance,
};
use crate::lexer::{tokenize, Lexeme, Token};
use crate::node::{
    Comment, ExportNamed, ExportSpecifier, Ident, ImportDecl, ImportKind, ImportSpecifier, Js,
    Node, Program, PropKey, SpecifierForm, Statement, StrLit,
};

mod code;

/// An error produced while parsing a type-level statement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A token that does not fit the grammar.
    #[error("expected {expected}, found `{found}`")]
    Unexpected {
        /// What the parser was looking for.
        expected: String,

        /// The text of the offending token.
        found: String,

        /// The location in the file of the offending token.
        span: Span,
    },

    /// The file ended in the middle of a statement.
    #[error("expected {expected}, found end of file")]
    UnexpectedEof {
        /// What the parser was looking for.
        expected: String,

        /// The end of the file.
        span: Span,
    },
}

impl ParseError {
    /// The location in the file of the error.
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unexpected { span, .. } | ParseError::UnexpectedEof { span, .. } => *span,
        }
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parses a file registered in a [`swc_common::SourceMap`] into a [`Program`].
///
/// Type aliases, opaque types, interfaces, imports and the `export` forms that carry types are
/// parsed into nodes. Every other statement becomes a [`Js::Verbatim`] covering its source range,
/// with the annotations written inside it (parameters, return types, variables, class properties,
/// type parameters, casts and nested declarations) parsed as embedded nodes.
pub fn parse(file: &SourceFile) -> Result<Program, ParseError> {
    parse_source(file.src.as_str(), file.start_pos)
}

/// Parses `src`, whose first byte sits at `base` in the source map.
pub fn parse_source(src: &str, base: BytePos) -> Result<Program, ParseError> {
    let (tokens, comments) = tokenize(src);
    let mut parser = Parser {
        src,
        base,
        tokens,
        pos: 0,
    };

    let comments = comments
        .iter()
        .map(|lexeme| parser.comment(lexeme))
        .collect();

    let mut body = Vec::new();
    while !parser.at_end() {
        let statement = match parser.statement()? {
            Some(statement) => statement,
            None => parser.verbatim(),
        };
        body.push(statement);
    }

    Ok(Program {
        body,
        comments,
        span: parser.span(0, src.len() as u32),
    })
}

struct Parser<'a> {
    src: &'a str,
    base: BytePos,
    tokens: Vec<Lexeme>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn span(&self, lo: u32, hi: u32) -> Span {
        Span::new(
            self.base + BytePos(lo),
            self.base + BytePos(hi),
            SyntaxContext::empty(),
        )
    }

    fn flow(&self, kind: FlowKind, lo: u32) -> Node {
        Node::Flow(Flow::new(kind, self.span(lo, self.prev_hi())))
    }

    fn comment(&self, lexeme: &Lexeme) -> Comment {
        let text = self.text(lexeme);
        let value = match lexeme.token {
            Token::BlockComment => &text[2..text.len() - 2],
            _ => &text[2..],
        };
        Comment {
            value: value.to_string(),
            span: self.span(lexeme.lo, lexeme.hi),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|lexeme| lexeme.token)
    }

    fn is(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    fn text(&self, lexeme: &Lexeme) -> &'a str {
        &self.src[lexeme.lo as usize..lexeme.hi as usize]
    }

    fn is_word_at(&self, n: usize, word: &str) -> bool {
        match self.tokens.get(self.pos + n) {
            Some(lexeme) => lexeme.token == Token::Ident && self.text(lexeme) == word,
            None => false,
        }
    }

    fn is_word(&self, word: &str) -> bool {
        self.is_word_at(0, word)
    }

    /// Start of the current token, or the end of the file.
    fn lo(&self) -> u32 {
        match self.tokens.get(self.pos) {
            Some(lexeme) => lexeme.lo,
            None => self.src.len() as u32,
        }
    }

    /// End of the last consumed token.
    fn prev_hi(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(lexeme) => lexeme.hi,
            None => 0,
        }
    }

    fn eat(&mut self, token: Token) -> Option<Lexeme> {
        let lexeme = self.tokens.get(self.pos).copied()?;
        if lexeme.token != token {
            return None;
        }
        self.pos += 1;
        Some(lexeme)
    }

    fn eat_word(&mut self, word: &str) -> Option<Lexeme> {
        if !self.is_word(word) {
            return None;
        }
        self.eat(Token::Ident)
    }

    fn expect(&mut self, token: Token, expected: &str) -> PResult<Lexeme> {
        self.eat(token).ok_or_else(|| self.error(expected))
    }

    fn expect_word(&mut self, word: &str) -> PResult<Lexeme> {
        self.eat_word(word)
            .ok_or_else(|| self.error(&format!("`{}`", word)))
    }

    fn error(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(lexeme) => ParseError::Unexpected {
                expected: expected.to_string(),
                found: self.text(lexeme).to_string(),
                span: self.span(lexeme.lo, lexeme.hi),
            },
            None => {
                let end = self.src.len() as u32;
                ParseError::UnexpectedEof {
                    expected: expected.to_string(),
                    span: self.span(end, end),
                }
            }
        }
    }

    fn ident(&mut self) -> PResult<Ident> {
        let lexeme = self.expect(Token::Ident, "an identifier")?;
        Ok(Ident::new(
            self.text(&lexeme),
            self.span(lexeme.lo, lexeme.hi),
        ))
    }

    fn string(&mut self) -> PResult<StrLit> {
        let lexeme = self.expect(Token::Str, "a string")?;
        let raw = self.text(&lexeme);
        Ok(StrLit {
            value: raw[1..raw.len() - 1].to_string(),
            raw: raw.to_string(),
            span: self.span(lexeme.lo, lexeme.hi),
        })
    }

    fn starts_statement(&self) -> bool {
        (self.is_word("type") && self.peek_at(1) == Some(Token::Ident))
            || (self.is_word("opaque") && self.is_word_at(1, "type"))
            || (self.is_word("interface") && self.peek_at(1) == Some(Token::Ident))
            || self.is_word("import")
            || self.is_word("export")
    }

    /// Parses a type-level statement, or returns `None` (consuming nothing) if the statement at
    /// the cursor is ordinary code.
    fn statement(&mut self) -> PResult<Option<Statement>> {
        let start = self.pos;
        let lo = self.lo();

        let node = if self.is_word("type") && self.peek_at(1) == Some(Token::Ident) {
            Some(self.type_alias()?)
        } else if self.is_word("opaque") && self.is_word_at(1, "type") {
            Some(self.opaque_type()?)
        } else if self.is_word("interface") && self.peek_at(1) == Some(Token::Ident) {
            Some(self.interface()?)
        } else if self.is_word("import") {
            self.import()?
        } else if self.is_word("export") {
            self.export()?
        } else {
            None
        };

        match node {
            Some(node) => {
                self.eat(Token::Semi);
                Ok(Some(Statement {
                    node,
                    span: self.span(lo, self.prev_hi()),
                    touched: false,
                }))
            }
            None => {
                self.pos = start;
                Ok(None)
            }
        }
    }

    fn type_alias(&mut self) -> PResult<Node> {
        let lo = self.expect_word("type")?.lo;
        let id = self.ident()?;
        let type_params = self.type_params()?;
        self.expect(Token::Eq, "`=`")?;
        let right = self.ty()?;
        Ok(self.flow(
            FlowKind::TypeAlias(TypeAlias {
                id,
                type_params,
                right: Box::new(right),
            }),
            lo,
        ))
    }

    fn opaque_type(&mut self) -> PResult<Node> {
        let lo = self.expect_word("opaque")?.lo;
        self.expect_word("type")?;
        let id = self.ident()?;
        let type_params = self.type_params()?;
        let supertype = match self.eat(Token::Colon) {
            Some(_) => Some(Box::new(self.ty()?)),
            None => None,
        };
        self.expect(Token::Eq, "`=`")?;
        let impltype = self.ty()?;
        Ok(self.flow(
            FlowKind::OpaqueType(OpaqueType {
                id,
                type_params,
                supertype,
                impltype: Box::new(impltype),
            }),
            lo,
        ))
    }

    fn interface(&mut self) -> PResult<Node> {
        let lo = self.expect_word("interface")?.lo;
        let id = self.ident()?;
        let type_params = self.type_params()?;

        let mut extends = Vec::new();
        if self.eat_word("extends").is_some() {
            loop {
                let extends_lo = self.lo();
                let generic = self.generic_parts()?;
                extends.push(self.flow(FlowKind::InterfaceExtends(generic), extends_lo));
                if self.eat(Token::Comma).is_none() {
                    break;
                }
            }
        }

        if !self.is(Token::LBrace) && !self.is(Token::LBracePipe) {
            return Err(self.error("`{`"));
        }
        let body = self.object()?;
        Ok(self.flow(
            FlowKind::InterfaceDeclaration(InterfaceDeclaration {
                id,
                type_params,
                extends,
                body,
            }),
            lo,
        ))
    }

    /// `import` declarations. Returns `None` for forms that are not declarations, such as
    /// `import(...)` calls.
    fn import(&mut self) -> PResult<Option<Node>> {
        let lo = self.expect_word("import")?.lo;

        let kind = if self.is_word("type") || self.is_word("typeof") {
            let follows_binding = self.is_word_at(1, "from") || self.peek_at(1) == Some(Token::Comma);
            match follows_binding {
                true => ImportKind::Value,
                false if self.eat_word("type").is_some() => ImportKind::Type,
                false => {
                    self.expect_word("typeof")?;
                    ImportKind::Typeof
                }
            }
        } else {
            ImportKind::Value
        };

        let mut specifiers = Vec::new();
        match self.peek() {
            Some(Token::Str) => {}
            Some(Token::Ident) | Some(Token::Star) | Some(Token::LBrace) => {
                if self.is(Token::Ident) {
                    let local = self.ident()?;
                    specifiers.push(self.specifier(ImportKind::Value, SpecifierForm::Default(local.clone()), local.span));
                    if self.eat(Token::Comma).is_none() {
                        self.expect_word("from")?;
                        return self.import_source(lo, kind, specifiers).map(Some);
                    }
                }
                if let Some(star) = self.eat(Token::Star) {
                    self.expect_word("as")?;
                    let local = self.ident()?;
                    let span = self.span(star.lo, self.prev_hi());
                    specifiers.push(self.specifier(ImportKind::Value, SpecifierForm::Namespace(local), span));
                } else {
                    self.named_imports(&mut specifiers)?;
                }
                self.expect_word("from")?;
            }
            _ if kind == ImportKind::Value => return Ok(None),
            _ => return Err(self.error("an import clause")),
        }

        self.import_source(lo, kind, specifiers).map(Some)
    }

    fn import_source(&mut self, lo: u32, kind: ImportKind, specifiers: Vec<Node>) -> PResult<Node> {
        let source = self.string()?;
        Ok(Node::Js(Js::Import(ImportDecl {
            span: self.span(lo, self.prev_hi()),
            kind,
            specifiers,
            source,
        })))
    }

    fn specifier(&self, kind: ImportKind, form: SpecifierForm, span: Span) -> Node {
        Node::Js(Js::ImportSpecifier(ImportSpecifier { span, kind, form }))
    }

    fn named_imports(&mut self, specifiers: &mut Vec<Node>) -> PResult<()> {
        self.expect(Token::LBrace, "`{`")?;
        while !self.is(Token::RBrace) {
            let lo = self.lo();
            let kind = if self.is_word("type") && self.peek_at(1) == Some(Token::Ident) {
                self.pos += 1;
                ImportKind::Type
            } else if self.is_word("typeof") && self.peek_at(1) == Some(Token::Ident) {
                self.pos += 1;
                ImportKind::Typeof
            } else {
                ImportKind::Value
            };
            let imported = self.ident()?;
            let local = match self.eat_word("as") {
                Some(_) => Some(self.ident()?),
                None => None,
            };
            let span = self.span(lo, self.prev_hi());
            specifiers.push(self.specifier(kind, SpecifierForm::Named { imported, local }, span));
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        self.expect(Token::RBrace, "`}`")?;
        Ok(())
    }

    /// The `export` forms that carry types. Returns `None` for every other export.
    fn export(&mut self) -> PResult<Option<Node>> {
        let lo = self.expect_word("export")?.lo;

        let (kind, declaration) = if self.is_word("type") && self.peek_at(1) == Some(Token::LBrace) {
            self.pos += 1;
            (ImportKind::Type, None)
        } else if self.is_word("type") && self.peek_at(1) == Some(Token::Ident) {
            (ImportKind::Value, Some(self.type_alias()?))
        } else if self.is_word("opaque") && self.is_word_at(1, "type") {
            (ImportKind::Value, Some(self.opaque_type()?))
        } else if self.is_word("interface") && self.peek_at(1) == Some(Token::Ident) {
            (ImportKind::Value, Some(self.interface()?))
        } else {
            return Ok(None);
        };

        let mut specifiers = Vec::new();
        let mut source = None;
        if declaration.is_none() {
            self.expect(Token::LBrace, "`{`")?;
            while !self.is(Token::RBrace) {
                let local = self.ident()?;
                let exported = match self.eat_word("as") {
                    Some(_) => Some(self.ident()?),
                    None => None,
                };
                specifiers.push(ExportSpecifier { local, exported });
                if self.eat(Token::Comma).is_none() {
                    break;
                }
            }
            self.expect(Token::RBrace, "`}`")?;
            if self.eat_word("from").is_some() {
                source = Some(self.string()?);
            }
        }

        Ok(Some(Node::Js(Js::ExportNamed(ExportNamed {
            span: self.span(lo, self.prev_hi()),
            kind,
            declaration: declaration.map(Box::new),
            specifiers,
            source,
        }))))
    }

    fn variance(&mut self) -> Option<Variance> {
        if self.eat(Token::Plus).is_some() {
            Some(Variance::Plus)
        } else if self.eat(Token::Minus).is_some() {
            Some(Variance::Minus)
        } else {
            None
        }
    }

    /// An optional `<A, +B: Bound = Default>` declaration.
    fn type_params(&mut self) -> PResult<Option<Box<Node>>> {
        let Some(open) = self.eat(Token::Lt) else {
            return Ok(None);
        };

        let mut params = Vec::new();
        while !self.is(Token::Gt) {
            let lo = self.lo();
            let variance = self.variance();
            let name = self.ident()?;
            let bound = match self.eat(Token::Colon) {
                Some(colon) => {
                    let bound = self.ty()?;
                    Some(Box::new(self.flow(FlowKind::TypeAnnotation(Box::new(bound)), colon.lo)))
                }
                None => None,
            };
            let default = match self.eat(Token::Eq) {
                Some(_) => Some(Box::new(self.ty()?)),
                None => None,
            };
            params.push(self.flow(
                FlowKind::TypeParameter(TypeParameter {
                    name,
                    bound,
                    default,
                    variance,
                }),
                lo,
            ));
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        self.expect(Token::Gt, "`>`")?;

        Ok(Some(Box::new(self.flow(FlowKind::TypeParameterDeclaration(params), open.lo))))
    }

    fn type_args(&mut self) -> PResult<Vec<Node>> {
        self.expect(Token::Lt, "`<`")?;
        let mut args = Vec::new();
        while !self.is(Token::Gt) {
            args.push(self.ty()?);
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        self.expect(Token::Gt, "`>`")?;
        Ok(args)
    }

    fn ty(&mut self) -> PResult<Node> {
        self.union()
    }

    fn union(&mut self) -> PResult<Node> {
        let lo = self.lo();
        self.eat(Token::Pipe);
        let first = self.intersection()?;
        if !self.is(Token::Pipe) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(Token::Pipe).is_some() {
            types.push(self.intersection()?);
        }
        Ok(self.flow(FlowKind::Union(types), lo))
    }

    fn intersection(&mut self) -> PResult<Node> {
        let lo = self.lo();
        self.eat(Token::Amp);
        let first = self.prefix()?;
        if !self.is(Token::Amp) {
            return Ok(first);
        }
        let mut types = vec![first];
        while self.eat(Token::Amp).is_some() {
            types.push(self.prefix()?);
        }
        Ok(self.flow(FlowKind::Intersection(types), lo))
    }

    fn prefix(&mut self) -> PResult<Node> {
        match self.eat(Token::Question) {
            Some(question) => {
                let inner = self.prefix()?;
                Ok(self.flow(FlowKind::Nullable(Box::new(inner)), question.lo))
            }
            None => self.postfix(),
        }
    }

    fn postfix(&mut self) -> PResult<Node> {
        let lo = self.lo();
        let mut ty = self.primary()?;
        while self.is(Token::LBracket)
            && self.peek_at(1) == Some(Token::RBracket)
            && !self.tokens[self.pos].line_break
        {
            self.pos += 2;
            ty = self.flow(FlowKind::Array(Box::new(ty)), lo);
        }
        Ok(ty)
    }

    fn primary(&mut self) -> PResult<Node> {
        let Some(lexeme) = self.tokens.get(self.pos).copied() else {
            return Err(self.error("a type"));
        };
        let lo = lexeme.lo;

        match lexeme.token {
            Token::Ident => self.named_type(),
            Token::Number => {
                let value = self.number()?;
                Ok(self.flow(FlowKind::NumberLiteral(value), lo))
            }
            Token::Minus if self.peek_at(1) == Some(Token::Number) => {
                self.pos += 1;
                let value = self.number()?;
                Ok(self.flow(FlowKind::NumberLiteral(-value), lo))
            }
            Token::Str => {
                let lit = self.string()?;
                Ok(self.flow(
                    FlowKind::StringLiteral {
                        value: lit.value,
                        raw: lit.raw,
                    },
                    lo,
                ))
            }
            Token::Star => {
                self.pos += 1;
                Ok(self.flow(FlowKind::Exists, lo))
            }
            Token::LBrace | Token::LBracePipe => {
                let object = self.object()?;
                Ok(self.flow(FlowKind::Object(object), lo))
            }
            Token::LBracket => {
                self.pos += 1;
                let mut types = Vec::new();
                while !self.is(Token::RBracket) {
                    types.push(self.ty()?);
                    if self.eat(Token::Comma).is_none() {
                        break;
                    }
                }
                self.expect(Token::RBracket, "`]`")?;
                Ok(self.flow(FlowKind::Tuple(types), lo))
            }
            Token::LParen => self.paren_or_function(),
            Token::Lt => self.function(lo),
            _ => Err(self.error("a type")),
        }
    }

    fn number(&mut self) -> PResult<f64> {
        let lexeme = self.expect(Token::Number, "a number")?;
        let text = self.text(&lexeme).replace('_', "");
        let parsed = match text.get(..2) {
            Some("0x") | Some("0X") => i64::from_str_radix(&text[2..], 16).map(|n| n as f64).ok(),
            Some("0o") | Some("0O") => i64::from_str_radix(&text[2..], 8).map(|n| n as f64).ok(),
            Some("0b") | Some("0B") => i64::from_str_radix(&text[2..], 2).map(|n| n as f64).ok(),
            _ => text.parse::<f64>().ok(),
        };
        parsed.ok_or_else(|| ParseError::Unexpected {
            expected: "a number".to_string(),
            found: text.clone(),
            span: self.span(lexeme.lo, lexeme.hi),
        })
    }

    /// Keyword types, `typeof`, and references to named types.
    fn named_type(&mut self) -> PResult<Node> {
        let lo = self.lo();
        let kind = match self.tokens.get(self.pos).map(|lexeme| self.text(lexeme)) {
            Some("any") => FlowKind::Any,
            Some("mixed") => FlowKind::Mixed,
            Some("empty") => FlowKind::Empty,
            Some("void") => FlowKind::Void,
            Some("null") => FlowKind::Null,
            Some("number") => FlowKind::Number,
            Some("string") => FlowKind::String,
            Some("boolean") | Some("bool") => FlowKind::Boolean,
            Some("symbol") => FlowKind::Symbol,
            Some("this") => FlowKind::This,
            Some("true") => FlowKind::BooleanLiteral(true),
            Some("false") => FlowKind::BooleanLiteral(false),
            Some("typeof") => {
                self.pos += 1;
                let argument_lo = self.lo();
                let id = self.type_name()?;
                let argument = self.flow(
                    FlowKind::Generic(Generic {
                        id: Box::new(id),
                        type_params: None,
                    }),
                    argument_lo,
                );
                return Ok(self.flow(FlowKind::Typeof(Box::new(argument)), lo));
            }
            _ => {
                let generic = self.generic_parts()?;
                return Ok(self.flow(FlowKind::Generic(generic), lo));
            }
        };
        self.pos += 1;
        Ok(self.flow(kind, lo))
    }

    fn generic_parts(&mut self) -> PResult<Generic> {
        let id = self.type_name()?;
        let type_params = match self.is(Token::Lt) {
            true => Some(self.type_args()?),
            false => None,
        };
        Ok(Generic {
            id: Box::new(id),
            type_params,
        })
    }

    /// `A` or `a.b.C`, innermost qualification first.
    fn type_name(&mut self) -> PResult<Node> {
        let lo = self.lo();
        let mut name = Node::from(self.ident()?);
        while self.is(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
            self.pos += 1;
            let id = self.ident()?;
            name = self.flow(
                FlowKind::QualifiedTypeIdentifier(QualifiedTypeIdentifier {
                    qualification: Box::new(name),
                    id,
                }),
                lo,
            );
        }
        Ok(name)
    }

    /// Whether the `(` at the cursor can only open a parameter list.
    fn looks_like_params(&self) -> bool {
        match self.peek_at(1) {
            Some(Token::RParen) | Some(Token::Ellipsis) => true,
            Some(Token::Ident) => {
                self.peek_at(2) == Some(Token::Colon)
                    || (self.peek_at(2) == Some(Token::Question) && self.peek_at(3) == Some(Token::Colon))
            }
            _ => false,
        }
    }

    fn paren_or_function(&mut self) -> PResult<Node> {
        let lo = self.lo();
        if self.looks_like_params() {
            return self.function(lo);
        }

        let start = self.pos;
        self.pos += 1;
        let inner = self.ty()?;
        if self.is(Token::RParen) && self.peek_at(1) != Some(Token::Arrow) {
            self.pos += 1;
            return Ok(inner);
        }

        self.pos = start;
        self.function(lo)
    }

    fn function(&mut self, lo: u32) -> PResult<Node> {
        let type_params = self.type_params()?;
        let (params, rest) = self.params()?;
        self.expect(Token::Arrow, "`=>`")?;
        let return_type = self.ty()?;
        Ok(self.flow(
            FlowKind::Function(FunctionType {
                type_params,
                params,
                rest,
                return_type: Box::new(return_type),
            }),
            lo,
        ))
    }

    /// `<T>(a: A): R`, as used by methods and call properties.
    fn method_signature(&mut self, lo: u32) -> PResult<Node> {
        let type_params = self.type_params()?;
        let (params, rest) = self.params()?;
        self.expect(Token::Colon, "`:`")?;
        let return_type = self.ty()?;
        Ok(self.flow(
            FlowKind::Function(FunctionType {
                type_params,
                params,
                rest,
                return_type: Box::new(return_type),
            }),
            lo,
        ))
    }

    fn params(&mut self) -> PResult<(Vec<Node>, Option<Box<Node>>)> {
        self.expect(Token::LParen, "`(`")?;
        let mut params = Vec::new();
        let mut rest = None;
        while !self.is(Token::RParen) {
            if let Some(ellipsis) = self.eat(Token::Ellipsis) {
                rest = Some(Box::new(self.param(ellipsis.lo)?));
                self.eat(Token::Comma);
                break;
            }
            let lo = self.lo();
            params.push(self.param(lo)?);
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        self.expect(Token::RParen, "`)`")?;
        Ok((params, rest))
    }

    fn param(&mut self, lo: u32) -> PResult<Node> {
        let named = self.is(Token::Ident)
            && (self.peek_at(1) == Some(Token::Colon)
                || (self.peek_at(1) == Some(Token::Question) && self.peek_at(2) == Some(Token::Colon)));

        let (name, optional) = if named {
            let name = self.ident()?;
            let optional = self.eat(Token::Question).is_some();
            self.expect(Token::Colon, "`:`")?;
            (Some(name), optional)
        } else {
            (None, false)
        };

        let ty = self.ty()?;
        Ok(self.flow(
            FlowKind::FunctionTypeParam(FunctionTypeParam {
                name,
                type_annotation: Box::new(ty),
                optional,
            }),
            lo,
        ))
    }

    fn object(&mut self) -> PResult<ObjectType> {
        let exact = self.eat(Token::LBracePipe).is_some();
        let close = match exact {
            true => Token::PipeRBrace,
            false => {
                self.expect(Token::LBrace, "`{`")?;
                Token::RBrace
            }
        };

        let mut object = ObjectType {
            properties: Vec::new(),
            indexers: Vec::new(),
            call_properties: Vec::new(),
            exact,
        };
        while !self.is(close) {
            self.member(&mut object)?;
            if self.eat(Token::Comma).is_none() && self.eat(Token::Semi).is_none() {
                break;
            }
        }
        self.expect(close, if exact { "`|}`" } else { "`}`" })?;
        Ok(object)
    }

    fn member(&mut self, object: &mut ObjectType) -> PResult<()> {
        let lo = self.lo();

        if self.eat(Token::Ellipsis).is_some() {
            if matches!(
                self.peek(),
                Some(Token::RBrace | Token::PipeRBrace | Token::Comma | Token::Semi)
            ) {
                return Ok(());
            }
            let argument = self.ty()?;
            object
                .properties
                .push(self.flow(FlowKind::ObjectTypeSpreadProperty(Box::new(argument)), lo));
            return Ok(());
        }

        let variance = self.variance();

        if self.eat(Token::LBracket).is_some() {
            let id = match self.peek_at(1) {
                Some(Token::Colon) if self.is(Token::Ident) => {
                    let id = self.ident()?;
                    self.pos += 1;
                    Some(id)
                }
                _ => None,
            };
            let key = self.ty()?;
            self.expect(Token::RBracket, "`]`")?;
            self.expect(Token::Colon, "`:`")?;
            let value = self.ty()?;
            object.indexers.push(self.flow(
                FlowKind::ObjectTypeIndexer(ObjectTypeIndexer {
                    id,
                    key: Box::new(key),
                    value: Box::new(value),
                    variance,
                }),
                lo,
            ));
            return Ok(());
        }

        if self.is(Token::LParen) || self.is(Token::Lt) {
            let function = self.method_signature(lo)?;
            object
                .call_properties
                .push(self.flow(FlowKind::ObjectTypeCallProperty(Box::new(function)), lo));
            return Ok(());
        }

        let key = match self.peek() {
            Some(Token::Str) => PropKey::Str(self.string()?),
            _ => PropKey::Ident(self.ident()?),
        };

        let (value, optional, method) = if self.is(Token::LParen) || self.is(Token::Lt) {
            let signature_lo = self.lo();
            (self.method_signature(signature_lo)?, false, true)
        } else {
            let optional = self.eat(Token::Question).is_some();
            self.expect(Token::Colon, "`:`")?;
            (self.ty()?, optional, false)
        };

        object.properties.push(self.flow(
            FlowKind::ObjectTypeProperty(ObjectTypeProperty {
                key,
                value: Box::new(value),
                optional,
                variance,
                method,
            }),
            lo,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use crate::testing::*;

    fn kinds(program: &Program) -> Vec<NodeKind> {
        program.body.iter().map(|s| s.node.kind()).collect()
    }

    #[test]
    fn empty() {
        let program = parse_helper("");
        assert!(program.body.is_empty());
    }

    #[test]
    fn statements() {
        let program = parse_helper(
            "// @flow\n\
             import type { A } from './a';\n\
             const x = 1;\n\
             type B = A;\n\
             function f() { return x; }\n\
             interface C { c: B }\n\
             export type D = C;\n",
        );
        assert_eq!(
            kinds(&program),
            vec![
                NodeKind::ImportDeclaration,
                NodeKind::Verbatim,
                NodeKind::TypeAlias,
                NodeKind::Verbatim,
                NodeKind::InterfaceDeclaration,
                NodeKind::ExportNamedDeclaration,
            ]
        );
        assert_eq!(program.comments.len(), 1);
        assert_eq!(program.comments[0].value, " @flow");
    }

    #[test]
    fn verbatim_statement_without_semicolon_stops_at_next_declaration() {
        let program = parse_helper("foo()\ntype A = string");
        assert_eq!(kinds(&program), vec![NodeKind::Verbatim, NodeKind::TypeAlias]);
    }

    #[test]
    fn nested_declarations_stay_inside_their_statement() {
        let program = parse_helper("function f() {\n  type A = string;\n  return 1;\n}\n");
        assert_eq!(kinds(&program), vec![NodeKind::Verbatim]);
        let children: Vec<NodeKind> =
            program.body[0].node.children().iter().map(|c| c.kind()).collect();
        assert_eq!(children, vec![NodeKind::TypeAlias]);
    }

    #[test]
    fn regex_literals_do_not_open_brackets() {
        let program = parse_helper("const r = /[{]/;\ntype A = ?string;\n");
        assert_eq!(kinds(&program), vec![NodeKind::Verbatim, NodeKind::TypeAlias]);

        let program = parse_helper("if (/\\(/.test(s)) f();\ntype A = ?string;\n");
        assert_eq!(kinds(&program), vec![NodeKind::Verbatim, NodeKind::TypeAlias]);
    }

    #[test]
    fn jsx_before_a_declaration() {
        let program = parse_helper(
            "const el = <div className=\"a\">{x}<br /></div>;\ntype A = ?string;\n",
        );
        assert_eq!(kinds(&program), vec![NodeKind::Verbatim, NodeKind::TypeAlias]);
        assert!(program.body[0].node.children().is_empty());
    }

    #[test]
    fn a_variable_named_type_is_code() {
        let program = parse_helper("type = 5;");
        assert_eq!(kinds(&program), vec![NodeKind::Verbatim]);
    }

    #[test]
    fn nullable_array() {
        let node = type_helper("?string[]");
        let Some(FlowKind::Nullable(inner)) = node.as_flow() else {
            panic!("expected nullable, got {:?}", node);
        };
        assert_eq!(inner.kind(), NodeKind::ArrayTypeAnnotation);
    }

    #[test]
    fn unions_and_intersections() {
        let node = type_helper("| A & B | C");
        let Some(FlowKind::Union(types)) = node.as_flow() else {
            panic!("expected union, got {:?}", node);
        };
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].kind(), NodeKind::IntersectionTypeAnnotation);
    }

    #[test]
    fn anonymous_function_params() {
        let node = type_helper("(number, string) => boolean");
        let Some(FlowKind::Function(function)) = node.as_flow() else {
            panic!("expected function, got {:?}", node);
        };
        assert_eq!(function.params.len(), 2);
        assert!(function.rest.is_none());
        for param in &function.params {
            let Some(FlowKind::FunctionTypeParam(param)) = param.as_flow() else {
                panic!("expected param");
            };
            assert!(param.name.is_none());
        }
    }

    #[test]
    fn parenthesized_type_is_not_a_function() {
        let node = type_helper("(A | B)[]");
        assert_eq!(node.kind(), NodeKind::ArrayTypeAnnotation);
    }

    #[test]
    fn single_anonymous_param() {
        let node = type_helper("(A) => B");
        assert_eq!(node.kind(), NodeKind::FunctionTypeAnnotation);
    }

    #[test]
    fn rest_and_optional_params() {
        let node = type_helper("<T>(a?: T, ...rest: Array<T>) => void");
        let Some(FlowKind::Function(function)) = node.as_flow() else {
            panic!("expected function, got {:?}", node);
        };
        assert!(function.type_params.is_some());
        assert_eq!(function.params.len(), 1);
        assert!(function.rest.is_some());
    }

    #[test]
    fn object_members() {
        let node = type_helper("{| +a: number, -b?: string, [k: string]: mixed, (x: X): Y, m(): void, 'q-r': 1, ...S, ... |}");
        let Some(FlowKind::Object(object)) = node.as_flow() else {
            panic!("expected object, got {:?}", node);
        };
        assert!(object.exact);
        assert_eq!(object.properties.len(), 5);
        assert_eq!(object.indexers.len(), 1);
        assert_eq!(object.call_properties.len(), 1);
        assert_eq!(object.properties[4].kind(), NodeKind::ObjectTypeSpreadProperty);
    }

    #[test]
    fn qualified_generic() {
        let node = type_helper("a.b.C<number>");
        let Some(FlowKind::Generic(generic)) = node.as_flow() else {
            panic!("expected generic, got {:?}", node);
        };
        assert_eq!(generic.id.kind(), NodeKind::QualifiedTypeIdentifier);
        assert_eq!(generic.type_params.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn literals() {
        assert_eq!(
            type_helper("-1.5").as_flow(),
            Some(&FlowKind::NumberLiteral(-1.5))
        );
        assert_eq!(
            type_helper("0x10").as_flow(),
            Some(&FlowKind::NumberLiteral(16.0))
        );
        assert_eq!(
            type_helper("true").as_flow(),
            Some(&FlowKind::BooleanLiteral(true))
        );
    }

    #[test]
    fn import_forms() {
        let program = parse_helper(
            "import type A, { B } from 'a';\n\
             import { type C, d as e } from 'c';\n\
             import typeof F from 'f';\n\
             import * as g from 'g';\n\
             import 'h';\n\
             import('i');\n",
        );
        assert_eq!(
            kinds(&program),
            vec![
                NodeKind::ImportDeclaration,
                NodeKind::ImportDeclaration,
                NodeKind::ImportDeclaration,
                NodeKind::ImportDeclaration,
                NodeKind::ImportDeclaration,
                NodeKind::Verbatim,
            ]
        );
        let Node::Js(Js::Import(import)) = &program.body[1].node else {
            panic!("expected import");
        };
        assert_eq!(import.kind, ImportKind::Value);
        assert_eq!(import.specifiers.len(), 2);
        assert!(import.specifiers[0].is_flow_only());
    }

    #[test]
    fn export_forms() {
        let program = parse_helper(
            "export type { A, B as C } from './a';\n\
             export default function f() {}\n",
        );
        assert_eq!(
            kinds(&program),
            vec![NodeKind::ExportNamedDeclaration, NodeKind::Verbatim]
        );
    }

    #[test]
    fn type_parameters_with_bounds_and_defaults() {
        let program = parse_helper("type A<+T: Object = {}, U> = T;");
        let Some(FlowKind::TypeAlias(alias)) = program.body[0].node.as_flow() else {
            panic!("expected alias");
        };
        let Some(FlowKind::TypeParameterDeclaration(params)) =
            alias.type_params.as_deref().and_then(Node::as_flow)
        else {
            panic!("expected type params");
        };
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn malformed_alias_is_an_error() {
        let err = try_parse_helper("type A = ;").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { .. }));
        let err = try_parse_helper("type A = {").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }
}
