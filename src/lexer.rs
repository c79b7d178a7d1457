use logos::Logos;

/// Tokens of Flow-annotated JavaScript.
///
/// Only the punctuation the type grammar needs gets its own token. Everything else in ordinary
/// code lexes as [`Token::Punct`], which is enough to find statement boundaries.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    /// `// ...`
    #[regex(r"//[^\n]*")]
    LineComment,

    /// `/* ... */`
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// Identifiers and keywords.
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    /// Numeric literals.
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+")]
    Number,

    /// Quoted string literals.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    Str,

    /// Template literals.
    #[regex(r"`([^`\\]|\\.)*`")]
    Template,

    /// Regular expression literals. A `/` only starts one where an expression can start, which
    /// the patterns above cannot see, so [`tokenize`] produces these itself.
    Regex,

    /// `{|`
    #[token("{|")]
    LBracePipe,

    /// `|}`
    #[token("|}")]
    PipeRBrace,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `<`
    #[token("<")]
    Lt,

    /// `>`. Never merged with a following `>` so nested type arguments close one at a time.
    #[token(">")]
    Gt,

    /// `,`
    #[token(",")]
    Comma,

    /// `;`
    #[token(";")]
    Semi,

    /// `:`
    #[token(":")]
    Colon,

    /// `?`
    #[token("?")]
    Question,

    /// `.`
    #[token(".")]
    Dot,

    /// `...`
    #[token("...")]
    Ellipsis,

    /// `=>`
    #[token("=>")]
    Arrow,

    /// `=`
    #[token("=")]
    Eq,

    /// `|`
    #[token("|")]
    Pipe,

    /// `&`
    #[token("&")]
    Amp,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,

    /// Any other punctuation, and characters the lexer does not recognize.
    #[regex(r"[!%^~#@/\\]")]
    #[regex(r"[^\x00-\x7F]")]
    Punct,
}

impl Token {
    /// Whether the token is a comment.
    pub fn is_comment(self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment)
    }

    /// How the token changes bracket nesting depth.
    pub fn depth_delta(self) -> i32 {
        match self {
            Token::LBrace | Token::LBracePipe | Token::LParen | Token::LBracket => 1,
            Token::RBrace | Token::PipeRBrace | Token::RParen | Token::RBracket => -1,
            _ => 0,
        }
    }
}

/// A token with its byte offsets into the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    /// The token.
    pub token: Token,

    /// Byte offset of the first character.
    pub lo: u32,

    /// Byte offset one past the last character.
    pub hi: u32,

    /// Whether a line break separates this token from the previous non-comment token.
    pub line_break: bool,
}

/// Splits `src` into lexemes. Comments are returned separately, in order.
pub fn tokenize(src: &str) -> (Vec<Lexeme>, Vec<Lexeme>) {
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut prev_end = 0usize;
    let mut lexer = Token::lexer(src);

    while let Some(result) = lexer.next() {
        let mut span = lexer.span();
        let mut token = result.unwrap_or(Token::Punct);
        if token == Token::Punct && &src[span.clone()] == "/" && regex_allowed(src, tokens.last()) {
            if let Some(end) = regex_end(src, span.start) {
                lexer.bump(end - span.end);
                span.end = end;
                token = Token::Regex;
            }
        }
        let lexeme = Lexeme {
            token,
            lo: span.start as u32,
            hi: span.end as u32,
            line_break: src
                .get(prev_end..span.start)
                .is_some_and(|gap| gap.contains('\n')),
        };
        if token.is_comment() {
            comments.push(lexeme);
        } else {
            tokens.push(lexeme);
            prev_end = span.end;
        }
    }

    (tokens, comments)
}

/// Words after which a `/` starts a regular expression rather than dividing.
const REGEX_PRECEDING_WORDS: [&str; 14] = [
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "instanceof", "yield", "await",
];

fn regex_allowed(src: &str, prev: Option<&Lexeme>) -> bool {
    let Some(prev) = prev else {
        return true;
    };
    match prev.token {
        Token::Ident => {
            REGEX_PRECEDING_WORDS.contains(&&src[prev.lo as usize..prev.hi as usize])
        }
        Token::Number
        | Token::Str
        | Token::Template
        | Token::Regex
        | Token::Lt
        | Token::RParen
        | Token::RBracket => false,
        _ => true,
    }
}

/// The end of the regular expression literal starting at `start`, flags included. `None` if the
/// line ends first.
fn regex_end(src: &str, start: usize) -> Option<usize> {
    let mut in_class = false;
    let mut chars = src[start + 1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' | '\r' => return None,
            '[' => in_class = true,
            ']' => in_class = false,
            '/' if !in_class => {
                let body_end = start + 1 + i + 1;
                let flags = src[body_end..]
                    .find(|c: char| !c.is_ascii_alphanumeric())
                    .unwrap_or(src.len() - body_end);
                return Some(body_end + flags);
            }
            _ => {}
        }
    }
    None
}
