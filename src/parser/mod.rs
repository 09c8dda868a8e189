//! Schema Parser
//!
//! Recursive-descent parser over the token stream produced by [`lexer`].
//! Declarations are recognised independently and in any order:
//!
//! ```text
//! declaration := "class" NAME ["extends" PARENT] ["{" property* "}"] "."
//! property    := "*" NAME RANGE ";"
//! ```
//!
//! Parsing never fails. Text that does not fit the shape is skipped and a
//! [`Diagnostic`] records where and why, so callers can decide whether a
//! lenient parse is acceptable.

pub mod diagnostics;
pub mod lexer;

pub use diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, LineIndex, Severity};
pub use lexer::{tokenize, Span, Token, TokenKind};

use tracing::debug;

use crate::schema::{ClassDeclaration, ClassMapping, PropertyDeclaration};

/// Everything recovered from one schema text
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub classes: ClassMapping,
    pub diagnostics: Diagnostics,
}

/// Parse schema text into a class mapping plus diagnostics for skipped spans
pub fn parse(text: &str) -> ParseOutcome {
    Parser::new(text).run()
}

/// Reason a declaration was given up on
struct Abandon {
    code: DiagnosticCode,
    message: String,
}

impl Abandon {
    fn malformed(message: String) -> Self {
        Self {
            code: DiagnosticCode::MalformedDeclaration,
            message,
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    lines: LineIndex,
    outcome: ParseOutcome,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            tokens: tokenize(text),
            pos: 0,
            lines: LineIndex::new(text),
            outcome: ParseOutcome::default(),
        }
    }

    fn run(mut self) -> ParseOutcome {
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Class {
                self.declaration();
            } else {
                self.stray_text();
            }
        }

        debug!(
            classes = self.outcome.classes.len(),
            diagnostics = self.outcome.diagnostics.len(),
            "parsed schema"
        );
        self.outcome
    }

    // ---- token cursor ----

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn nth(&self, n: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + n).copied()
    }

    /// A word, or a keyword used as a name when the token after it is one of `followers`
    fn eat_name(&mut self, followers: &[TokenKind]) -> Option<Token<'a>> {
        let token = self.peek()?;
        let is_name = match token.kind {
            TokenKind::Word => true,
            TokenKind::Class | TokenKind::Extends => {
                self.nth(1).is_some_and(|next| followers.contains(&next.kind))
            }
            _ => false,
        };
        if is_name {
            self.bump()
        } else {
            None
        }
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        match self.peek() {
            Some(token) if token.kind == kind => self.bump(),
            _ => None,
        }
    }

    /// Span of the most recently consumed token
    fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Word => format!("`{}`", token.text),
            Some(token) => token.kind.describe().to_string(),
            None => "end of input".to_string(),
        }
    }

    // ---- grammar ----

    fn declaration(&mut self) {
        let Some(keyword) = self.bump() else { return };

        match self.declaration_body(keyword.span) {
            Ok(declaration) => self.insert(declaration),
            Err(abandon) => {
                if abandon.code == DiagnosticCode::MalformedDeclaration {
                    self.skip_declaration_rest();
                }
                let span = keyword.span.cover(self.previous_span());
                self.report(abandon.code, span, abandon.message);
            }
        }
    }

    fn declaration_body(&mut self, start: Span) -> Result<ClassDeclaration, Abandon> {
        let name = self
            .eat_name(&[TokenKind::Extends, TokenKind::LBrace, TokenKind::Dot])
            .ok_or_else(|| {
                Abandon::malformed(format!("expected class name after `class`, found {}", self.found()))
            })?;

        let parent = match self.eat(TokenKind::Extends) {
            Some(_) => {
                let parent = self.eat_name(&[TokenKind::LBrace, TokenKind::Dot]).ok_or_else(|| {
                    Abandon::malformed(format!(
                        "expected parent name after `extends` in `{}`, found {}",
                        name.text,
                        self.found()
                    ))
                })?;
                Some(parent.text.to_string())
            }
            None => None,
        };

        let has_block = self.eat(TokenKind::LBrace).is_some();
        let properties = if has_block {
            self.property_block(name.text)?
        } else {
            Vec::new()
        };

        let dot = self.eat(TokenKind::Dot).ok_or_else(|| {
            if parent.is_none() && !has_block {
                Abandon::malformed(format!(
                    "expected `extends`, `{{` or `.` after class name `{}`, found {}",
                    name.text,
                    self.found()
                ))
            } else {
                Abandon::malformed(format!(
                    "expected `.` to end the declaration of `{}`, found {}",
                    name.text,
                    self.found()
                ))
            }
        })?;

        Ok(ClassDeclaration::new(name.text, parent, start.cover(dot.span)).with_properties(properties))
    }

    fn property_block(&mut self, class_name: &str) -> Result<Vec<PropertyDeclaration>, Abandon> {
        let mut properties = Vec::new();

        loop {
            let Some(token) = self.peek() else {
                return Err(Self::unterminated(class_name));
            };

            match token.kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    return Ok(properties);
                }
                TokenKind::Class => return Err(Self::unterminated(class_name)),
                TokenKind::Star => {
                    self.pos += 1;
                    match self.property_parts() {
                        Some((name, range)) => {
                            properties.push(PropertyDeclaration::new(name.text, range.text));
                        }
                        None => self.malformed_property(token.span, class_name),
                    }
                }
                _ => self.malformed_property(token.span, class_name),
            }
        }
    }

    /// `NAME RANGE ;` after a `*`; consumes nothing unless all three are there
    fn property_parts(&mut self) -> Option<(Token<'a>, Token<'a>)> {
        let (name, range, semi) = (self.nth(0)?, self.nth(1)?, self.nth(2)?);
        if !(name.kind.is_text() && range.kind.is_text() && semi.kind == TokenKind::Semi) {
            return None;
        }
        self.pos += 3;
        Some((name, range))
    }

    fn unterminated(class_name: &str) -> Abandon {
        Abandon {
            code: DiagnosticCode::UnterminatedBlock,
            message: format!("property block of `{}` is never closed with `}}`", class_name),
        }
    }

    // ---- recovery ----

    /// Skip to just past the next `.`, or up to the next `class`
    fn skip_declaration_rest(&mut self) {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Class => return,
                TokenKind::Dot => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// Skip the rest of a bad property: through `;`, or up to `*`, `}` or `class`
    fn malformed_property(&mut self, start: Span, class_name: &str) {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Star | TokenKind::RBrace | TokenKind::Class => break,
                TokenKind::Semi => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }

        let span = start.cover(self.previous_span());
        let message = format!(
            "ignored `{}` in class `{}`: properties are written `*name Range;`",
            self.excerpt(span),
            class_name
        );
        self.report(DiagnosticCode::MalformedProperty, span, message);
    }

    fn stray_text(&mut self) {
        let Some(first) = self.bump() else { return };
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Class {
                break;
            }
            self.pos += 1;
        }

        let span = first.span.cover(self.previous_span());
        let message = format!("ignored text outside any declaration: `{}`", self.excerpt(span));
        self.report(DiagnosticCode::StrayText, span, message);
    }

    // ---- output ----

    fn insert(&mut self, declaration: ClassDeclaration) {
        debug!(
            class = %declaration.name,
            parent = ?declaration.parent,
            properties = declaration.properties.len(),
            "class declaration"
        );

        let name = declaration.name.clone();
        let span = declaration.span;
        if let Some(previous) = self.outcome.classes.insert(declaration) {
            let (line, _) = self.lines.position(self.text, previous.span.start);
            let message = format!("class `{}` redeclared; replaces the declaration on line {}", name, line);
            self.report(DiagnosticCode::DuplicateClass, span, message);
        }
    }

    fn report(&mut self, code: DiagnosticCode, span: Span, message: String) {
        let (line, column) = self.lines.position(self.text, span.start);
        self.outcome.diagnostics.push(Diagnostic {
            code,
            message,
            span,
            line,
            column,
        });
    }

    /// Source text of a span with whitespace collapsed, cut at 40 chars
    fn excerpt(&self, span: Span) -> String {
        let text = self.text[span.start..span.end]
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if text.chars().count() > 40 {
            format!("{}...", text.chars().take(40).collect::<String>())
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANIMALS: &str = "class Dog extends Animal {\n*name String;\n*age Integer;\n}.\nclass Animal .\nclass Cat extends Animal .\n";

    fn codes(outcome: &ParseOutcome) -> Vec<DiagnosticCode> {
        outcome.diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_animals_schema() {
        let outcome = parse(ANIMALS);
        assert!(outcome.diagnostics.is_empty());

        let classes = &outcome.classes;
        assert_eq!(classes.names().collect::<Vec<_>>(), vec!["Dog", "Animal", "Cat"]);

        let dog = classes.get("Dog").unwrap();
        assert_eq!(dog.parent.as_deref(), Some("Animal"));
        assert_eq!(
            dog.properties,
            vec![
                PropertyDeclaration::new("name", "String"),
                PropertyDeclaration::new("age", "Integer"),
            ]
        );

        assert!(classes.get("Animal").unwrap().is_root());
        assert!(classes.get("Cat").unwrap().properties.is_empty());
    }

    #[test]
    fn test_single_line_form() {
        let outcome = parse("class Person extends Thing { *knows Person; *name Text; } .");
        let person = outcome.classes.get("Person").unwrap();
        assert_eq!(person.parent.as_deref(), Some("Thing"));
        assert_eq!(person.properties.len(), 2);
        assert_eq!(person.properties[0], PropertyDeclaration::new("knows", "Person"));
    }

    #[test]
    fn test_flexible_whitespace() {
        let outcome = parse("class   A\n\textends\n  T{*a X;}.");
        let a = outcome.classes.get("A").unwrap();
        assert_eq!(a.parent.as_deref(), Some("T"));
        assert_eq!(a.properties, vec![PropertyDeclaration::new("a", "X")]);
    }

    #[test]
    fn test_empty_block_and_empty_input() {
        let outcome = parse("class A extends T {} .");
        assert!(outcome.classes.get("A").unwrap().properties.is_empty());

        let outcome = parse("");
        assert!(outcome.classes.is_empty());
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_properties_stay_in_their_block() {
        let outcome = parse("class A extends T { *a X; }.\nclass B extends T .");
        assert_eq!(outcome.classes.get("A").unwrap().properties.len(), 1);
        assert!(outcome.classes.get("B").unwrap().properties.is_empty());
    }

    #[test]
    fn test_duplicate_properties_preserved() {
        let outcome = parse("class A extends T { *a X; *a X; }.");
        assert_eq!(outcome.classes.get("A").unwrap().properties.len(), 2);
    }

    #[test]
    fn test_malformed_declaration_is_reported_and_skipped() {
        let outcome = parse("class extends Thing .\nclass Dog extends Animal .");
        assert_eq!(outcome.classes.names().collect::<Vec<_>>(), vec!["Dog"]);
        assert_eq!(codes(&outcome), vec![DiagnosticCode::MalformedDeclaration]);

        let diagnostic = outcome.diagnostics.iter().next().unwrap();
        assert_eq!((diagnostic.line, diagnostic.column), (1, 1));
        assert_eq!(diagnostic.span, Span::new(0, 21));
        assert!(diagnostic.message.contains("expected class name"));
    }

    #[test]
    fn test_missing_terminator_resumes_at_next_class() {
        let outcome = parse("class A extends T\nclass B extends T .");
        assert_eq!(outcome.classes.names().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(codes(&outcome), vec![DiagnosticCode::MalformedDeclaration]);
        assert!(outcome.diagnostics.iter().next().unwrap().message.contains("`A`"));
    }

    #[test]
    fn test_unterminated_block() {
        let outcome = parse("class A extends T { *a X;\nclass B extends T .");
        assert!(!outcome.classes.contains("A"));
        assert!(outcome.classes.contains("B"));
        assert_eq!(codes(&outcome), vec![DiagnosticCode::UnterminatedBlock]);
    }

    #[test]
    fn test_malformed_property_skipped() {
        let outcome = parse("class A extends T { *a X; junk; *b Y; *c }.");
        let a = outcome.classes.get("A").unwrap();
        assert_eq!(
            a.properties,
            vec![PropertyDeclaration::new("a", "X"), PropertyDeclaration::new("b", "Y")]
        );
        assert_eq!(
            codes(&outcome),
            vec![DiagnosticCode::MalformedProperty, DiagnosticCode::MalformedProperty]
        );
    }

    #[test]
    fn test_stray_text_is_a_warning() {
        let outcome = parse("# animals\nclass A extends T .\ntrailing words");
        assert!(outcome.classes.contains("A"));
        assert_eq!(codes(&outcome), vec![DiagnosticCode::StrayText, DiagnosticCode::StrayText]);
        assert!(!outcome.diagnostics.has_errors());
    }

    #[test]
    fn test_keywords_as_property_parts() {
        let outcome = parse("class Person extends Thing { *class Text; *kind extends; *name Text; }.\nclass Dog extends Animal .");
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.classes.names().collect::<Vec<_>>(), vec!["Person", "Dog"]);
        assert_eq!(
            outcome.classes.get("Person").unwrap().properties,
            vec![
                PropertyDeclaration::new("class", "Text"),
                PropertyDeclaration::new("kind", "extends"),
                PropertyDeclaration::new("name", "Text"),
            ]
        );
    }

    #[test]
    fn test_keywords_as_class_and_parent_names() {
        let outcome = parse("class extends extends class .\nclass class { *a X; }.");
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.classes.get("extends").unwrap().parent.as_deref(), Some("class"));
        assert!(outcome.classes.get("class").unwrap().is_root());
    }

    #[test]
    fn test_unfinished_property_before_next_class() {
        let outcome = parse("class A extends T { *a\nclass B extends T .");
        assert!(outcome.classes.contains("B"));
        assert_eq!(
            codes(&outcome),
            vec![DiagnosticCode::MalformedProperty, DiagnosticCode::UnterminatedBlock]
        );
    }

    #[test]
    fn test_redeclaration_last_wins() {
        let outcome = parse("class A extends T { *a X; }.\nclass B extends T .\nclass A extends U .");
        let a = outcome.classes.get("A").unwrap();
        assert_eq!(a.parent.as_deref(), Some("U"));
        assert!(a.properties.is_empty());
        assert_eq!(outcome.classes.names().collect::<Vec<_>>(), vec!["A", "B"]);

        assert_eq!(codes(&outcome), vec![DiagnosticCode::DuplicateClass]);
        let diagnostic = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.line, 3);
        assert!(diagnostic.message.contains("line 1"));
    }
}
