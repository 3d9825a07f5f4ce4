//! Scope analysis over a token stream.
//!
//! Walks the tokens of a cell body once, maintaining a tree of function and
//! block scopes, and records every identifier reference together with the
//! scope it appears in. A reference is free when no scope on its chain
//! declares the name. The analysis is deliberately forgiving: it never fails,
//! and unusual syntax degrades into an extra or a missing input rather than
//! an error.

use rustc_hash::FxHashSet;

use super::lexer::{Token, TokenKind, match_brackets};

/// Result of analyzing one procedure body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeAnalysis {
    /// Names declared in the outermost scope, in declaration order.
    pub top_level: Vec<String>,
    /// Free references in first-use order, without duplicates.
    pub references: Vec<String>,
    /// `await` occurs at the outermost function level.
    pub top_level_await: bool,
    /// `yield` occurs at the outermost function level.
    pub top_level_yield: bool,
}

type ScopeId = usize;

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    is_function: bool,
    names: FxHashSet<String>,
    order: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BraceKind {
    Block,
    Object,
    Class,
}

#[derive(Debug, Clone, Copy)]
enum ParenRole {
    Plain,
    /// `for (...)` header; the scope is entered at `for` and left after the body.
    ForHeader { scope: ScopeId, restore: ScopeId },
}

#[derive(Debug, Clone, Copy)]
enum Open {
    Paren(ParenRole),
    Bracket,
    Brace {
        kind: BraceKind,
        restore: Option<ScopeId>,
    },
}

/// A brace that should open a specific scope, set by `function`, arrows and `for`.
#[derive(Debug, Clone, Copy)]
struct PendingBrace {
    scope: ScopeId,
    restore: ScopeId,
    kind: BraceKind,
}

/// A scope without braces (arrow expression bodies, brace-less `for` bodies)
/// that ends at a `,` or `;` on its depth, or when that depth is closed.
#[derive(Debug, Clone, Copy)]
struct DelimitedScope {
    depth: usize,
    restore: ScopeId,
    ends_at_comma: bool,
}

/// An open `const`/`let`/`var` declaration list.
#[derive(Debug, Clone, Copy)]
struct Declaration {
    depth: usize,
    target: ScopeId,
}

#[derive(Debug)]
struct Use {
    name: String,
    scope: ScopeId,
    token: usize,
}

struct Analyzer<'t> {
    tokens: &'t [Token],
    partners: Vec<Option<usize>>,
    scopes: Vec<Scope>,
    current: ScopeId,
    stack: Vec<Open>,
    pending: Option<PendingBrace>,
    delimited: Vec<DelimitedScope>,
    declarations: Vec<Declaration>,
    uses: Vec<Use>,
    top_level_await: bool,
    top_level_yield: bool,
}

/// Analyze the tokens of a procedure body.
pub fn analyze(tokens: &[Token]) -> ScopeAnalysis {
    let mut analyzer = Analyzer::new(tokens);
    analyzer.run();
    analyzer.finish()
}

impl<'t> Analyzer<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self {
            tokens,
            partners: match_brackets(tokens),
            scopes: vec![Scope {
                parent: None,
                is_function: true,
                names: FxHashSet::default(),
                order: Vec::new(),
            }],
            current: 0,
            stack: Vec::new(),
            pending: None,
            delimited: Vec::new(),
            declarations: Vec::new(),
            uses: Vec::new(),
            top_level_await: false,
            top_level_yield: false,
        }
    }

    fn run(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            i = self.step(i);
        }
    }

    fn finish(self) -> ScopeAnalysis {
        let mut references = Vec::new();
        let mut seen = FxHashSet::default();
        for use_ in &self.uses {
            if self.is_bound(&use_.name, use_.scope) {
                continue;
            }
            if seen.insert(use_.name.clone()) {
                references.push(use_.name.clone());
            }
        }
        ScopeAnalysis {
            top_level: self.scopes[0].order.clone(),
            references,
            top_level_await: self.top_level_await,
            top_level_yield: self.top_level_yield,
        }
    }

    // ---- scope helpers ----

    fn new_scope(&mut self, parent: ScopeId, is_function: bool) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            is_function,
            names: FxHashSet::default(),
            order: Vec::new(),
        });
        self.scopes.len() - 1
    }

    fn declare(&mut self, scope: ScopeId, name: &str) {
        let scope = &mut self.scopes[scope];
        if scope.names.insert(name.to_string()) {
            scope.order.push(name.to_string());
        }
    }

    fn function_scope(&self, mut scope: ScopeId) -> ScopeId {
        while !self.scopes[scope].is_function {
            match self.scopes[scope].parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope
    }

    fn is_bound(&self, name: &str, mut scope: ScopeId) -> bool {
        loop {
            if self.scopes[scope].names.contains(name) {
                return true;
            }
            match self.scopes[scope].parent {
                Some(parent) => scope = parent,
                None => return false,
            }
        }
    }

    fn record_use(&mut self, index: usize, scope: ScopeId) {
        self.uses.push(Use {
            name: self.at(index).text.clone(),
            scope,
            token: index,
        });
    }

    // ---- token helpers ----

    fn at(&self, i: usize) -> &'t Token {
        &self.tokens[i]
    }

    fn tok(&self, i: usize) -> Option<&'t Token> {
        self.tokens.get(i)
    }

    fn prev(&self, i: usize) -> Option<&'t Token> {
        i.checked_sub(1).and_then(|p| self.tokens.get(p))
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether token `i` begins a statement.
    fn at_statement_start(&self, i: usize) -> bool {
        match self.prev(i) {
            None => true,
            Some(prev) => {
                prev.is_punct(";")
                    || prev.is_punct("{")
                    || prev.is_punct("}")
                    || prev.is_keyword("export")
                    || prev.is_keyword("default")
                    || prev.is_keyword("else")
                    || (self.at(i).newline_before && prev.ends_operand())
            }
        }
    }

    fn in_brace(&self, kind: BraceKind) -> bool {
        matches!(self.stack.last(), Some(Open::Brace { kind: k, .. }) if *k == kind)
    }

    fn is_name_like(tok: &Token) -> bool {
        matches!(
            tok.kind,
            TokenKind::Ident
                | TokenKind::Keyword
                | TokenKind::String
                | TokenKind::Number
                | TokenKind::PrivateName
        )
    }

    // ---- main dispatch ----

    fn step(&mut self, i: usize) -> usize {
        let tok = self.at(i);
        self.end_declaration_on_newline(i);

        match tok.kind {
            TokenKind::Punct => self.punct(i),
            TokenKind::Keyword => self.keyword(i),
            TokenKind::Ident => self.ident(i),
            _ => i + 1,
        }
    }

    fn end_declaration_on_newline(&mut self, i: usize) {
        let tok = self.at(i);
        if !tok.newline_before || !matches!(tok.kind, TokenKind::Ident | TokenKind::Keyword) {
            return;
        }
        let Some(prev) = self.prev(i) else {
            return;
        };
        if prev.ends_operand()
            && self
                .declarations
                .last()
                .is_some_and(|d| d.depth == self.depth())
        {
            self.declarations.pop();
        }
    }

    fn punct(&mut self, i: usize) -> usize {
        let text = self.at(i).text.as_str();
        match text {
            "(" => {
                self.stack.push(Open::Paren(ParenRole::Plain));
                i + 1
            }
            "[" => {
                self.stack.push(Open::Bracket);
                i + 1
            }
            "{" => {
                self.open_brace(i);
                i + 1
            }
            ")" | "]" | "}" => {
                self.close(i);
                i + 1
            }
            "," | ";" => self.separator(i, text == ";"),
            "=>" => self.arrow(i),
            _ => i + 1,
        }
    }

    fn open_brace(&mut self, i: usize) {
        if let Some(pending) = self.pending.take() {
            self.current = pending.scope;
            self.stack.push(Open::Brace {
                kind: pending.kind,
                restore: Some(pending.restore),
            });
            return;
        }
        if self.is_object_brace(i) {
            self.stack.push(Open::Brace {
                kind: BraceKind::Object,
                restore: None,
            });
        } else {
            let restore = self.current;
            self.current = self.new_scope(restore, false);
            self.stack.push(Open::Brace {
                kind: BraceKind::Block,
                restore: Some(restore),
            });
        }
    }

    fn is_object_brace(&self, i: usize) -> bool {
        let Some(prev) = self.prev(i) else {
            return false;
        };
        match prev.kind {
            TokenKind::Punct => !matches!(prev.text.as_str(), ")" | "]" | "}" | ";" | "++" | "--"),
            TokenKind::Keyword => matches!(
                prev.text.as_str(),
                "return"
                    | "typeof"
                    | "void"
                    | "delete"
                    | "in"
                    | "instanceof"
                    | "new"
                    | "yield"
                    | "await"
                    | "case"
                    | "throw"
                    | "extends"
            ),
            TokenKind::Ident => prev.text == "of" && !prev.newline_before,
            _ => false,
        }
    }

    fn close(&mut self, i: usize) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let depth = self.depth();
        self.pop_delimited_below(depth);
        self.declarations.retain(|d| d.depth <= depth);

        match open {
            Open::Brace {
                restore: Some(restore),
                ..
            } => self.current = restore,
            Open::Paren(ParenRole::ForHeader { scope, restore }) => {
                self.after_for_header(i, scope, restore);
            }
            _ => {}
        }
    }

    fn after_for_header(&mut self, close: usize, scope: ScopeId, restore: ScopeId) {
        if self.tok(close + 1).is_some_and(|t| t.is_punct("{")) {
            self.pending = Some(PendingBrace {
                scope,
                restore,
                kind: BraceKind::Block,
            });
        } else {
            self.delimited.push(DelimitedScope {
                depth: self.depth(),
                restore,
                ends_at_comma: false,
            });
        }
    }

    /// Leave delimited scopes opened deeper than `depth`.
    fn pop_delimited_below(&mut self, depth: usize) {
        while let Some(top) = self.delimited.last() {
            if top.depth > depth {
                self.current = top.restore;
                self.delimited.pop();
            } else {
                break;
            }
        }
    }

    fn separator(&mut self, i: usize, semicolon: bool) -> usize {
        let depth = self.depth();
        while let Some(top) = self.delimited.last() {
            if top.depth == depth && (semicolon || top.ends_at_comma) {
                self.current = top.restore;
                self.delimited.pop();
            } else {
                break;
            }
        }

        if semicolon {
            self.declarations.retain(|d| d.depth < depth);
            return i + 1;
        }
        match self.declarations.last().copied() {
            Some(decl) if decl.depth == depth => self.parse_pattern(i + 1, decl.target),
            _ => i + 1,
        }
    }

    // ---- arrows ----

    fn arrow(&mut self, i: usize) -> usize {
        let Some(p) = i.checked_sub(1) else {
            return i + 1;
        };
        let prev = self.at(p);
        let (start, params) = if prev.kind == TokenKind::Ident {
            (p, None)
        } else if prev.is_punct(")") {
            match self.partners[p] {
                Some(open) => (open, Some((open, p))),
                None => return i + 1,
            }
        } else {
            return i + 1;
        };
        let start = match start.checked_sub(1).and_then(|a| self.tok(a)) {
            Some(t) if t.is_ident("async") => start - 1,
            _ => start,
        };

        // Parameters were walked as ordinary expressions; take those uses back.
        self.uses.retain(|u| u.token < start);

        let scope = self.new_scope(self.current, true);
        match params {
            None => self.declare(scope, &self.at(p).text),
            Some((open, close)) => self.parse_params(open, close, scope),
        }

        if self.tok(i + 1).is_some_and(|t| t.is_punct("{")) {
            self.pending = Some(PendingBrace {
                scope,
                restore: self.current,
                kind: BraceKind::Block,
            });
        } else {
            self.delimited.push(DelimitedScope {
                depth: self.depth(),
                restore: self.current,
                ends_at_comma: true,
            });
            self.current = scope;
        }
        i + 1
    }

    // ---- keywords ----

    fn keyword(&mut self, i: usize) -> usize {
        let text = self.at(i).text.as_str();
        match text {
            "const" | "let" | "var" => self.declaration(i, text == "var"),
            "function" => self.function(i),
            "class" => self.class(i),
            "for" => self.for_loop(i),
            "catch" => self.catch(i),
            "break" | "continue" => match self.tok(i + 1) {
                Some(t) if t.kind == TokenKind::Ident && !t.newline_before => i + 2,
                _ => i + 1,
            },
            "await" | "yield" => {
                if self.prev(i).is_some_and(|p| p.is_punct(".") || p.is_punct("?.")) {
                    return i + 1;
                }
                if self.function_scope(self.current) == 0 {
                    if text == "await" {
                        self.top_level_await = true;
                    } else {
                        self.top_level_yield = true;
                    }
                }
                i + 1
            }
            _ => {
                if self.in_member_position(i) {
                    return self.member(i);
                }
                i + 1
            }
        }
    }

    fn declaration(&mut self, i: usize, is_var: bool) -> usize {
        if self.prev(i).is_some_and(|p| p.is_punct(".") || p.is_punct("?.")) {
            return i + 1;
        }
        let target = if is_var {
            self.function_scope(self.current)
        } else {
            self.current
        };
        let depth = self.depth();
        self.declarations.retain(|d| d.depth < depth);
        self.declarations.push(Declaration { depth, target });
        self.parse_pattern(i + 1, target)
    }

    fn function(&mut self, i: usize) -> usize {
        let statement = self.at_statement_start(i)
            || (self.prev(i).is_some_and(|p| p.is_ident("async"))
                && self.at_statement_start(i - 1));
        let mut j = i + 1;
        if self.tok(j).is_some_and(|t| t.is_punct("*")) {
            j += 1;
        }
        let scope = self.new_scope(self.current, true);
        if let Some(name) = self.tok(j).filter(|t| t.kind == TokenKind::Ident) {
            let name = name.text.clone();
            if statement {
                self.declare(self.current, &name);
            } else {
                self.declare(scope, &name);
            }
            j += 1;
        }
        self.function_tail(j, scope)
    }

    /// Parameters and body of a function whose parameter list starts at `open`.
    fn function_tail(&mut self, open: usize, scope: ScopeId) -> usize {
        let Some(close) = self
            .tok(open)
            .filter(|t| t.is_punct("("))
            .and_then(|_| self.partners[open])
        else {
            return open;
        };
        self.parse_params(open, close, scope);
        if self.tok(close + 1).is_some_and(|t| t.is_punct("{")) {
            self.pending = Some(PendingBrace {
                scope,
                restore: self.current,
                kind: BraceKind::Block,
            });
        }
        close + 1
    }

    fn class(&mut self, i: usize) -> usize {
        let statement = self.at_statement_start(i);
        let mut j = i + 1;
        if let Some(name) = self.tok(j).filter(|t| t.kind == TokenKind::Ident) {
            if statement {
                let name = name.text.clone();
                self.declare(self.current, &name);
            }
            j += 1;
        }
        // Heritage expression is walked normally; the body brace is a class body.
        let mut k = j;
        while let Some(t) = self.tok(k) {
            if t.is_punct("{") && self.heritage_done(j, k) {
                self.pending = Some(PendingBrace {
                    scope: self.current,
                    restore: self.current,
                    kind: BraceKind::Class,
                });
                break;
            }
            if let Some(partner) = self.partners[k]
                && partner > k
            {
                k = partner + 1;
                continue;
            }
            k += 1;
        }
        j
    }

    /// Whether the brace at `k` follows a complete `extends` expression (or none).
    fn heritage_done(&self, from: usize, k: usize) -> bool {
        if k == from {
            return true;
        }
        self.tok(from).is_some_and(|t| t.is_keyword("extends")) && k > from + 1
    }

    fn for_loop(&mut self, i: usize) -> usize {
        let mut j = i + 1;
        if self.tok(j).is_some_and(|t| t.is_keyword("await")) {
            if self.function_scope(self.current) == 0 {
                self.top_level_await = true;
            }
            j += 1;
        }
        if !self.tok(j).is_some_and(|t| t.is_punct("(")) {
            return i + 1;
        }
        let restore = self.current;
        let scope = self.new_scope(restore, false);
        self.current = scope;
        self.stack
            .push(Open::Paren(ParenRole::ForHeader { scope, restore }));
        j + 1
    }

    fn catch(&mut self, i: usize) -> usize {
        let scope = self.new_scope(self.current, false);
        let restore = self.current;
        let mut j = i + 1;
        if self.tok(j).is_some_and(|t| t.is_punct("("))
            && let Some(close) = self.partners[j]
        {
            self.parse_pattern(j + 1, scope);
            j = close + 1;
        }
        if self.tok(j).is_some_and(|t| t.is_punct("{")) {
            self.pending = Some(PendingBrace {
                scope,
                restore,
                kind: BraceKind::Block,
            });
        }
        j
    }

    // ---- identifiers ----

    fn ident(&mut self, i: usize) -> usize {
        let tok = self.at(i);
        if let Some(prev) = self.prev(i)
            && (prev.is_punct(".") || prev.is_punct("?."))
        {
            return i + 1;
        }
        if self.in_member_position(i) {
            return self.member(i);
        }

        // `for (const x of xs)`
        if tok.text == "of"
            && matches!(
                self.stack.last(),
                Some(Open::Paren(ParenRole::ForHeader { .. }))
            )
        {
            let depth = self.depth();
            self.declarations.retain(|d| d.depth < depth);
            return i + 1;
        }

        let next = self.tok(i + 1);

        // `async function`, `async x =>`, `async (x) =>`.
        if tok.text == "async"
            && next.is_some_and(|n| {
                !n.newline_before && (n.is_keyword("function") || n.kind == TokenKind::Ident)
            })
        {
            return i + 1;
        }

        // Labels.
        if next.is_some_and(|n| n.is_punct(":"))
            && self.at_statement_start(i)
            && !self.in_brace(BraceKind::Object)
            && !self.in_ternary(i)
        {
            return i + 2;
        }

        self.record_use(i, self.current);
        i + 1
    }

    /// Rough check for `a ? b : c` so `b` is not taken for a label.
    fn in_ternary(&self, i: usize) -> bool {
        let mut depth = 0usize;
        for tok in self.tokens[..i].iter().rev() {
            if tok.kind != TokenKind::Punct {
                continue;
            }
            match tok.text.as_str() {
                ")" | "]" | "}" => depth += 1,
                "(" | "[" | "{" => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                "?" if depth == 0 => return true,
                ";" if depth == 0 => return false,
                _ => {}
            }
        }
        false
    }

    /// Whether token `i` sits where an object key or class member name goes.
    fn in_member_position(&self, i: usize) -> bool {
        let Some(prev) = self.prev(i) else {
            return false;
        };
        if self.in_brace(BraceKind::Object) {
            prev.is_punct("{")
                || prev.is_punct(",")
                || self.is_modifier(i - 1)
                || self.is_generator_star(i - 1)
        } else if self.in_brace(BraceKind::Class) {
            prev.is_punct("{")
                || prev.is_punct(";")
                || prev.is_punct("}")
                || self.is_modifier(i - 1)
                || self.is_generator_star(i - 1)
                || (self.at(i).newline_before && prev.ends_operand())
        } else {
            false
        }
    }

    /// `*` of a generator method (`*gen() {}`), as opposed to multiplication.
    fn is_generator_star(&self, i: usize) -> bool {
        self.at(i).is_punct("*")
            && self.prev(i).is_none_or(|p| {
                p.is_punct("{")
                    || p.is_punct(",")
                    || p.is_punct(";")
                    || p.is_punct("}")
                    || p.is_ident("static")
                    || p.is_ident("async")
            })
    }

    fn is_modifier(&self, i: usize) -> bool {
        let tok = self.at(i);
        tok.kind == TokenKind::Ident
            && matches!(tok.text.as_str(), "get" | "set" | "async" | "static")
            && self.tok(i + 1).is_some_and(|n| {
                Self::is_name_like(n) || n.is_punct("[") || n.is_punct("*") || n.is_punct("{")
            })
    }

    /// An object key or class member at `i`.
    fn member(&mut self, i: usize) -> usize {
        let tok = self.at(i);
        if tok.kind == TokenKind::Ident && self.is_modifier(i) {
            return i + 1;
        }
        let next = self.tok(i + 1);
        if next.is_some_and(|n| n.is_punct("(")) {
            let scope = self.new_scope(self.current, true);
            return self.function_tail(i + 1, scope);
        }
        let object = self.in_brace(BraceKind::Object);
        let shorthand = object
            && tok.kind == TokenKind::Ident
            && next.is_none_or(|n| n.is_punct(",") || n.is_punct("}") || n.is_punct("="));
        if shorthand {
            self.record_use(i, self.current);
        }
        i + 1
    }

    // ---- binding patterns ----

    /// Declare every name bound by the pattern starting at `i`; returns the
    /// index after the pattern. Default values are walked as references.
    fn parse_pattern(&mut self, i: usize, scope: ScopeId) -> usize {
        let Some(tok) = self.tok(i) else {
            return i;
        };
        match tok.kind {
            TokenKind::Ident => {
                let name = tok.text.clone();
                self.declare(scope, &name);
                i + 1
            }
            TokenKind::Punct if tok.text == "{" || tok.text == "[" => {
                let Some(close) = self.partners[i] else {
                    return i + 1;
                };
                if tok.text == "{" {
                    self.parse_object_pattern(i + 1, close, scope);
                } else {
                    self.parse_array_pattern(i + 1, close, scope);
                }
                close + 1
            }
            _ => i,
        }
    }

    fn parse_object_pattern(&mut self, mut i: usize, close: usize, scope: ScopeId) {
        while i < close {
            let tok = self.at(i);
            if tok.is_punct(",") {
                i += 1;
            } else if tok.is_punct("...") {
                i = self.parse_pattern(i + 1, scope);
            } else if tok.is_punct("[") {
                // Computed key.
                let end = self.partners[i].unwrap_or(close);
                self.walk_references(i + 1, end, scope);
                i = end + 1;
                if self.tok(i).is_some_and(|t| t.is_punct(":")) {
                    i = self.parse_pattern(i + 1, scope);
                }
            } else if self.tok(i + 1).is_some_and(|t| t.is_punct(":")) {
                i = self.parse_pattern(i + 2, scope);
            } else if tok.kind == TokenKind::Ident {
                let name = tok.text.clone();
                self.declare(scope, &name);
                i += 1;
            } else {
                i += 1;
            }
            if self.tok(i).is_some_and(|t| t.is_punct("=")) {
                i = self.skip_default(i + 1, close, scope);
            }
        }
    }

    fn parse_array_pattern(&mut self, mut i: usize, close: usize, scope: ScopeId) {
        while i < close {
            let tok = self.at(i);
            if tok.is_punct(",") {
                i += 1;
                continue;
            }
            let next = if tok.is_punct("...") {
                self.parse_pattern(i + 1, scope)
            } else {
                self.parse_pattern(i, scope)
            };
            i = if next == i { i + 1 } else { next };
            if self.tok(i).is_some_and(|t| t.is_punct("=")) {
                i = self.skip_default(i + 1, close, scope);
            }
        }
    }

    /// Parameter list between the parentheses at `open` and `close`.
    fn parse_params(&mut self, open: usize, close: usize, scope: ScopeId) {
        self.parse_array_pattern(open + 1, close, scope);
    }

    /// Walk a default value up to the next `,` at this level (or `limit`),
    /// recording its references in `scope`.
    fn skip_default(&mut self, i: usize, limit: usize, scope: ScopeId) -> usize {
        let mut j = i;
        while j < limit {
            if self.at(j).is_punct(",") {
                break;
            }
            j = match self.partners[j] {
                Some(partner) if partner > j => partner + 1,
                _ => j + 1,
            };
        }
        self.walk_references(i, j, scope);
        j
    }

    /// Record plain identifier references in `[from, to)` without tracking
    /// nested scopes. Used for defaults and computed keys inside patterns.
    fn walk_references(&mut self, from: usize, to: usize, scope: ScopeId) {
        for k in from..to.min(self.tokens.len()) {
            let tok = self.at(k);
            if tok.kind != TokenKind::Ident {
                continue;
            }
            if self
                .prev(k)
                .is_some_and(|p| p.is_punct(".") || p.is_punct("?."))
            {
                continue;
            }
            if self.tok(k + 1).is_some_and(|n| n.is_punct(":")) {
                continue;
            }
            if self.uses.iter().any(|u| u.token == k) {
                continue;
            }
            self.record_use(k, scope);
        }
    }
}
