//! Regex-based tokenizer for schema text
//!
//! Whitespace separates tokens and is dropped. `{ } ; * .` are single
//! character punctuation; every other run of characters is a word. A dot
//! between two word characters stays inside the word, so `schema.org/Thing`
//! is one token while the trailing dot of `Animal.` terminates it.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\s{};*.]+(?:\.[^\s{};*.]+)*|[{};*.]").expect("token pattern compiles")
});

/// Byte range into the schema text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both
    pub fn cover(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `class`
    Class,
    /// `extends`
    Extends,
    LBrace,
    RBrace,
    Semi,
    Star,
    Dot,
    Word,
}

impl TokenKind {
    fn classify(text: &str) -> Self {
        match text {
            "class" => Self::Class,
            "extends" => Self::Extends,
            "{" => Self::LBrace,
            "}" => Self::RBrace,
            ";" => Self::Semi,
            "*" => Self::Star,
            "." => Self::Dot,
            _ => Self::Word,
        }
    }

    /// Words and keywords; either can stand as a name or range
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Word | Self::Class | Self::Extends)
    }

    /// How the token is named in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Class => "`class`",
            Self::Extends => "`extends`",
            Self::LBrace => "`{`",
            Self::RBrace => "`}`",
            Self::Semi => "`;`",
            Self::Star => "`*`",
            Self::Dot => "`.`",
            Self::Word => "a name",
        }
    }
}

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    TOKEN
        .find_iter(input)
        .map(|m| Token {
            kind: TokenKind::classify(m.as_str()),
            text: m.as_str(),
            span: Span::new(m.start(), m.end()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<&str> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_declaration_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("class Dog extends Animal { *age Integer; }."),
            vec![Class, Word, Extends, Word, LBrace, Star, Word, Word, Semi, RBrace, Dot]
        );
    }

    #[test]
    fn test_punctuation_splits_words() {
        assert_eq!(texts("Integer;"), vec!["Integer", ";"]);
        assert_eq!(texts("Animal."), vec!["Animal", "."]);
        assert_eq!(texts("*name"), vec!["*", "name"]);
    }

    #[test]
    fn test_inner_dot_stays_in_word() {
        assert_eq!(texts("schema.org/Thing ."), vec!["schema.org/Thing", "."]);
        assert_eq!(texts("a.b."), vec!["a.b", "."]);
    }

    #[test]
    fn test_keywords_need_exact_match() {
        use TokenKind::*;
        assert_eq!(kinds("classy extendsX class"), vec![Word, Word, Class]);
    }

    #[test]
    fn test_spans_point_into_source() {
        let input = "class\n  Dog";
        let tokens = tokenize(input);
        assert_eq!(tokens[1].span, Span::new(8, 11));
        assert_eq!(&input[tokens[1].span.start..tokens[1].span.end], "Dog");
    }
}
