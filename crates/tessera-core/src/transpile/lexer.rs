//! Handwritten JavaScript lexer for cell sources.
//!
//! Produces just enough structure for scope analysis and import rewriting:
//! identifiers, keywords, punctuators and opaque literals. Template literal
//! substitutions are lexed inline, wrapped in synthetic parentheses, so the
//! analyzer sees `a${x}b` as `Template ( x )`.

use thiserror::Error;

/// Kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Keyword,
    Punct,
    Number,
    String,
    Template,
    Regex,
    PrivateName,
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// A line terminator separates this token from the previous one.
    pub newline_before: bool,
}

impl Token {
    pub fn is_punct(&self, p: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == p
    }

    pub fn is_keyword(&self, k: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == k
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    /// Whether this token can end an expression (used for ASI and regex detection).
    pub fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::Ident
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Template
            | TokenKind::Regex
            | TokenKind::PrivateName => true,
            TokenKind::Keyword => matches!(
                self.text.as_str(),
                "this" | "super" | "null" | "true" | "false"
            ),
            TokenKind::Punct => matches!(self.text.as_str(), ")" | "]" | "}" | "++" | "--"),
        }
    }

    /// String literal contents without quotes; escapes other than `\\` and
    /// quote escapes are kept verbatim.
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::String || self.text.len() < 2 {
            return None;
        }
        let inner = &self.text[1..self.text.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some(e @ ('\\' | '\'' | '"')) => out.push(e),
                    Some(e) => {
                        out.push('\\');
                        out.push(e);
                    }
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        Some(out)
    }
}

/// Lexing failures. Positions are byte offsets.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal at offset {0}")]
    UnterminatedString(usize),
    #[error("unterminated template literal at offset {0}")]
    UnterminatedTemplate(usize),
    #[error("unterminated block comment at offset {0}")]
    UnterminatedComment(usize),
    #[error("unterminated regular expression at offset {0}")]
    UnterminatedRegex(usize),
    #[error("unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
}

const KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Punctuators, longest first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200c}' || c == '\u{200d}' || c.is_alphanumeric()
}

/// One open `${` substitution: the brace depth inside it.
struct Substitution {
    depth: usize,
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    newline: bool,
    substitutions: Vec<Substitution>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            newline: false,
            substitutions: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia()?;
            let Some(c) = self.peek() else {
                break;
            };
            let start = self.pos;

            if c == '`' {
                self.advance();
                self.push(TokenKind::Template, start, start + 1);
                self.lex_template_chunk(start)?;
            } else if c == '}' && self.substitutions.last().is_some_and(|s| s.depth == 0) {
                // End of a `${...}` substitution: resume the template.
                self.advance();
                self.substitutions.pop();
                self.push_synthetic(")", start);
                self.lex_template_chunk(start)?;
            } else if c == '"' || c == '\'' {
                self.lex_string(c, start)?;
            } else if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
                self.lex_number(start);
            } else if c == '#' && self.peek_at(1).is_some_and(is_ident_start) {
                self.advance();
                self.eat_while(is_ident_continue);
                self.push(TokenKind::PrivateName, start, self.pos);
            } else if is_ident_start(c) || c == '\\' {
                self.eat_while(|ch| is_ident_continue(ch) || ch == '\\');
                let word = &self.src[start..self.pos];
                let kind = if is_keyword(word) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Ident
                };
                self.push(kind, start, self.pos);
            } else if c == '/' && self.regex_allowed() {
                self.lex_regex(start)?;
            } else {
                self.lex_punct(c, start)?;
            }
        }

        if !self.substitutions.is_empty() {
            return Err(LexError::UnterminatedTemplate(self.src.len()));
        }
        Ok(self.tokens)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            text: self.src[start..end].to_string(),
            start,
            end,
            newline_before: std::mem::take(&mut self.newline),
        });
    }

    fn push_synthetic(&mut self, text: &str, at: usize) {
        self.tokens.push(Token {
            kind: TokenKind::Punct,
            text: text.to_string(),
            start: at,
            end: at,
            newline_before: std::mem::take(&mut self.newline),
        });
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                        self.newline = true;
                    }
                    self.advance();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    self.eat_while(|c| c != '\n');
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let start = self.pos;
                    self.pos += 2;
                    match self.src[self.pos..].find("*/") {
                        Some(end) => {
                            if self.src[self.pos..self.pos + end].contains('\n') {
                                self.newline = true;
                            }
                            self.pos += end + 2;
                        }
                        None => return Err(LexError::UnterminatedComment(start)),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(prev) => !prev.ends_operand(),
        }
    }

    fn lex_string(&mut self, quote: char, start: usize) -> Result<(), LexError> {
        self.advance();
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some(c) if c == quote => break,
                Some('\n') | None => return Err(LexError::UnterminatedString(start)),
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, start, self.pos);
        Ok(())
    }

    /// Consume template text up to the closing backtick or the next `${`.
    fn lex_template_chunk(&mut self, start: usize) -> Result<(), LexError> {
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('`') => return Ok(()),
                Some('$') if self.peek() == Some('{') => {
                    let at = self.pos - 1;
                    self.advance();
                    self.push_synthetic("(", at);
                    self.substitutions.push(Substitution { depth: 0 });
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedTemplate(start)),
            }
        }
    }

    fn lex_number(&mut self, start: usize) {
        if self.peek() == Some('0')
            && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'))
        {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') {
                self.advance();
                self.eat_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let sign = matches!(self.peek_at(1), Some('+' | '-'));
                let digit_at = if sign { 2 } else { 1 };
                if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += digit_at;
                    self.eat_while(|c| c.is_ascii_digit() || c == '_');
                }
            }
        }
        if self.peek() == Some('n') {
            self.advance();
        }
        self.push(TokenKind::Number, start, self.pos);
    }

    fn lex_regex(&mut self, start: usize) -> Result<(), LexError> {
        self.advance();
        let mut in_class = false;
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some('\n') | None => return Err(LexError::UnterminatedRegex(start)),
                Some(_) => {}
            }
        }
        self.eat_while(is_ident_continue);
        self.push(TokenKind::Regex, start, self.pos);
        Ok(())
    }

    fn lex_punct(&mut self, c: char, start: usize) -> Result<(), LexError> {
        let rest = &self.src[self.pos..];
        let Some(punct) = PUNCTUATORS.iter().find(|p| rest.starts_with(**p)) else {
            return Err(LexError::UnexpectedChar(c, start));
        };
        // `?.5` is a conditional followed by a number, not optional chaining.
        let punct = if *punct == "?." && rest[2..].starts_with(|d: char| d.is_ascii_digit()) {
            "?"
        } else {
            punct
        };
        self.pos += punct.len();

        if let Some(sub) = self.substitutions.last_mut() {
            match punct {
                "{" => sub.depth += 1,
                "}" => sub.depth = sub.depth.saturating_sub(1),
                _ => {}
            }
        }
        self.push(TokenKind::Punct, start, self.pos);
        Ok(())
    }
}

/// Tokenize a source string.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).tokenize()
}

/// For every bracket token, the index of its partner. `None` for other tokens
/// and for unbalanced brackets.
pub fn match_brackets(tokens: &[Token]) -> Vec<Option<usize>> {
    let mut partners = vec![None; tokens.len()];
    let mut stack: Vec<usize> = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if tok.kind != TokenKind::Punct {
            continue;
        }
        match tok.text.as_str() {
            "(" | "[" | "{" => stack.push(i),
            ")" | "]" | "}" => {
                let open = match tok.text.as_str() {
                    ")" => "(",
                    "]" => "[",
                    _ => "{",
                };
                if let Some(&top) = stack.last()
                    && tokens[top].text == open
                {
                    stack.pop();
                    partners[top] = Some(i);
                    partners[i] = Some(top);
                }
            }
            _ => {}
        }
    }
    partners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<(TokenKind, String)> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let toks = kinds("const x = a.b + 1;");
        assert_eq!(toks[0], (TokenKind::Keyword, "const".to_string()));
        assert_eq!(toks[1], (TokenKind::Ident, "x".to_string()));
        assert_eq!(toks[3], (TokenKind::Ident, "a".to_string()));
        assert_eq!(toks[4], (TokenKind::Punct, ".".to_string()));
        assert_eq!(toks[7], (TokenKind::Number, "1".to_string()));
    }

    #[test]
    fn test_template_substitutions_are_inlined() {
        let toks = kinds("html`<b>${name + `${inner}`}</b>`");
        let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec!["html", "`", "(", "name", "+", "`", "(", "inner", ")", ")"]
        );
    }

    #[test]
    fn test_template_with_object_in_substitution() {
        let toks = kinds("`${ {a: 1}.a }`");
        let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["`", "(", "{", "a", ":", "1", "}", ".", "a", ")"]);
    }

    #[test]
    fn test_regex_versus_division() {
        let toks = kinds("a / b; x = /ab+c/gi.test(s)");
        assert_eq!(toks[1], (TokenKind::Punct, "/".to_string()));
        assert!(toks.iter().any(|(k, t)| *k == TokenKind::Regex && t == "/ab+c/gi"));
    }

    #[test]
    fn test_comments_and_newlines() {
        let toks = tokenize("a // comment\n/* block\n */ b").unwrap();
        assert_eq!(toks.len(), 2);
        assert!(toks[1].newline_before);
    }

    #[test]
    fn test_unterminated_literals() {
        assert!(matches!(tokenize("'abc"), Err(LexError::UnterminatedString(0))));
        assert!(matches!(tokenize("`abc"), Err(LexError::UnterminatedTemplate(_))));
        assert!(matches!(tokenize("`${a`"), Err(LexError::UnterminatedTemplate(_))));
        assert!(matches!(tokenize("/* abc"), Err(LexError::UnterminatedComment(0))));
    }

    #[test]
    fn test_string_value() {
        let toks = tokenize(r#"import("npm:d3@7") 'it\'s'"#).unwrap();
        assert_eq!(toks[2].string_value().as_deref(), Some("npm:d3@7"));
        assert_eq!(toks[4].string_value().as_deref(), Some("it's"));
    }

    #[test]
    fn test_numbers_and_optional_chaining() {
        let toks = kinds("a?.b ?? 0x1F + 1_000n + .5e-3 + c?.5:1");
        assert!(toks.contains(&(TokenKind::Punct, "?.".to_string())));
        assert!(toks.contains(&(TokenKind::Number, "0x1F".to_string())));
        assert!(toks.contains(&(TokenKind::Number, "1_000n".to_string())));
        assert!(toks.contains(&(TokenKind::Number, ".5e-3".to_string())));
        assert!(toks.contains(&(TokenKind::Number, ".5".to_string())));
    }

    #[test]
    fn test_match_brackets() {
        let toks = tokenize("f(a, [b], {c})").unwrap();
        let partners = match_brackets(&toks);
        assert_eq!(partners[1], Some(toks.len() - 1));
        assert_eq!(partners[4], Some(6));
    }
}
