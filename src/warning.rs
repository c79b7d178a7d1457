use std::fmt::{self, Display};

use swc_common::sync::Lrc;
use swc_common::{SourceMap, Span};

/// Something that was converted with a loss of meaning. Warnings never stop a compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// What was lost.
    pub message: String,

    /// A page explaining why TypeScript has no equivalent.
    pub url: String,

    /// 1-based line, or 0 for nodes that have no location.
    pub line: usize,

    /// 1-based column, or 0 for nodes that have no location.
    pub column: usize,
}

impl Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {}). See {}",
            self.message, self.line, self.column, self.url
        )
    }
}

/// The warnings of one compilation, in the order they were raised.
pub struct Warnings {
    items: Vec<Warning>,
    cm: Lrc<SourceMap>,
}

impl Warnings {
    /// Creates an empty sink that resolves spans against `cm`.
    pub fn new(cm: Lrc<SourceMap>) -> Self {
        Self {
            items: Vec::new(),
            cm,
        }
    }

    /// Records a warning about the node at `span`.
    pub fn push(&mut self, span: Span, message: impl Into<String>, url: impl Into<String>) {
        let (line, column) = locate(&self.cm, span);
        self.items.push(Warning {
            message: message.into(),
            url: url.into(),
            line,
            column,
        });
    }

    /// The number of warnings recorded so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no warnings have been recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the sink.
    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}

/// 1-based line and column of the start of `span`; `(0, 0)` for synthesized nodes.
pub(crate) fn locate(cm: &SourceMap, span: Span) -> (usize, usize) {
    if span.is_dummy() {
        return (0, 0);
    }
    let loc = cm.lookup_char_pos(span.lo);
    (loc.line, loc.col.0 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{BytePos, FileName, SyntaxContext, DUMMY_SP};

    #[test]
    fn positions_are_one_based() {
        let cm = Lrc::<SourceMap>::default();
        let fm = cm.new_source_file(
            FileName::Custom("test.js".to_string()),
            "type A = B;\n  type C = D;\n".to_string(),
        );
        let mut warnings = Warnings::new(cm);

        let lo = fm.start_pos + BytePos(14);
        warnings.push(
            Span::new(lo, lo + BytePos(4), SyntaxContext::empty()),
            "lossy",
            "https://example.com",
        );
        warnings.push(DUMMY_SP, "synthesized", "https://example.com");
        assert_eq!(warnings.len(), 2);
        assert!(!warnings.is_empty());

        let items = warnings.into_vec();
        assert_eq!((items[0].line, items[0].column), (2, 3));
        assert_eq!((items[1].line, items[1].column), (0, 0));
        assert_eq!(
            items[0].to_string(),
            "lossy (line 2, column 3). See https://example.com"
        );
    }
}
