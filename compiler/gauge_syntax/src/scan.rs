//! Source scanner.
//!
//! Extracts the package clause, the import block, and the test functions of
//! a source file from its token stream. Everything else at the top level is
//! skipped by brace matching.

use std::fmt;

use crate::lexer::unquote;
use crate::{lex, Span, Token, TokenKind};

/// The `package <name>` clause that opens every source file.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PackageClause {
    pub name: String,
    pub span: Span,
}

/// One import spec: `"path"`, `name "path"`, `. "path"` or `_ "path"`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
    pub span: Span,
}

/// A method call on the test's `*testing.T` parameter, e.g. `t.Errorf("...")`.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TestCall {
    /// Method name (`Error`, `Fatalf`, `Log`, ...).
    pub method: String,
    /// First argument, when it is a string literal.
    pub message: Option<String>,
    pub span: Span,
}

/// A top-level `func TestXxx(t *testing.T)` declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TestFunc {
    pub name: String,
    /// Name of the `*testing.T` parameter.
    pub param: String,
    /// Span of the function name.
    pub span: Span,
    /// Calls on `param` in body order.
    pub calls: Vec<TestCall>,
}

/// Everything the build tool needs to know about one source file.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct SourceSummary {
    pub package: PackageClause,
    pub imports: Vec<Import>,
    pub tests: Vec<TestFunc>,
}

/// Kind of scanning failure.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScanErrorKind {
    /// File does not start with a `package` clause.
    MissingPackageClause,
    /// `package` keyword not followed by a name.
    ExpectedPackageName,
    /// Import declaration without a string path.
    MalformedImport,
    /// Input the lexer could not recognize.
    UnexpectedInput,
    /// `{` without matching `}` or vice versa.
    UnbalancedBraces,
}

/// A scanning failure with its location.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub message: String,
    pub span: Span,
}

impl ScanError {
    #[cold]
    fn new(kind: ScanErrorKind, message: impl Into<String>, span: Span) -> Self {
        ScanError {
            kind,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScanError {}

/// Whether a file name denotes a test file (`*_test.go`).
pub fn is_test_file_name(file_name: &str) -> bool {
    file_name.ends_with("_test.go")
}

/// Whether a function name denotes a test: `Test` followed by nothing or
/// by a character that is not a lowercase letter.
pub fn is_test_func_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("Test") else {
        return false;
    };
    rest.chars().next().map_or(true, |c| !c.is_lowercase())
}

/// Scan a source file.
pub fn scan(source: &str) -> Result<SourceSummary, ScanError> {
    let tokens = lex(source);

    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Unknown) {
        return Err(ScanError::new(
            ScanErrorKind::UnexpectedInput,
            format!("unexpected input `{}`", bad.text(source)),
            bad.span,
        ));
    }

    let mut scanner = Scanner {
        source,
        tokens: &tokens,
        pos: 0,
    };

    let package = scanner.package_clause()?;
    let imports = scanner.imports()?;
    let tests = scanner.top_level()?;

    Ok(SourceSummary {
        package,
        imports,
        tests,
    })
}

struct Scanner<'a> {
    source: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<&'a Token> {
        if self.peek_kind(0) == Some(kind) {
            self.bump()
        } else {
            None
        }
    }

    fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    fn current_span(&self) -> Span {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(Span::DUMMY, |t| t.span)
    }

    fn skip_semicolons(&mut self) {
        while self.eat(TokenKind::Semicolon).is_some() {}
    }

    fn package_clause(&mut self) -> Result<PackageClause, ScanError> {
        let Some(keyword) = self.eat(TokenKind::Package) else {
            return Err(ScanError::new(
                ScanErrorKind::MissingPackageClause,
                "expected `package` clause at start of file",
                self.current_span(),
            ));
        };
        let Some(name) = self.eat(TokenKind::Ident) else {
            return Err(ScanError::new(
                ScanErrorKind::ExpectedPackageName,
                "expected package name after `package`",
                self.current_span(),
            ));
        };
        self.skip_semicolons();
        Ok(PackageClause {
            name: self.text(name).to_string(),
            span: keyword.span.merge(name.span),
        })
    }

    fn imports(&mut self) -> Result<Vec<Import>, ScanError> {
        let mut imports = Vec::new();
        while self.eat(TokenKind::Import).is_some() {
            if self.eat(TokenKind::LParen).is_some() {
                loop {
                    self.skip_semicolons();
                    if self.eat(TokenKind::RParen).is_some() {
                        break;
                    }
                    if self.peek().is_none() {
                        return Err(ScanError::new(
                            ScanErrorKind::MalformedImport,
                            "unclosed import block",
                            self.current_span(),
                        ));
                    }
                    imports.push(self.import_spec()?);
                }
            } else {
                imports.push(self.import_spec()?);
            }
            self.skip_semicolons();
        }
        Ok(imports)
    }

    fn import_spec(&mut self) -> Result<Import, ScanError> {
        let start = self.current_span();
        let alias = match self.peek_kind(0) {
            Some(TokenKind::Ident | TokenKind::Dot) => self.bump().map(|t| self.text(t).to_string()),
            _ => None,
        };
        let path = match self.peek() {
            Some(t) if t.kind.is_string() => {
                self.pos += 1;
                unquote(self.text(t)).map(|p| (p, t.span))
            }
            _ => None,
        };
        let Some((path, end)) = path else {
            return Err(ScanError::new(
                ScanErrorKind::MalformedImport,
                "expected import path string",
                self.current_span(),
            ));
        };
        Ok(Import {
            alias,
            path,
            span: start.merge(end),
        })
    }

    /// Walk the remaining top-level declarations, collecting test functions.
    fn top_level(&mut self) -> Result<Vec<TestFunc>, ScanError> {
        let mut tests = Vec::new();
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::Func => {
                    if let Some(test) = self.func_decl()? {
                        tests.push(test);
                    }
                }
                TokenKind::LBrace => {
                    self.skip_block(token.span)?;
                }
                TokenKind::RBrace => {
                    return Err(ScanError::new(
                        ScanErrorKind::UnbalancedBraces,
                        "unexpected `}`",
                        token.span,
                    ));
                }
                _ => {}
            }
        }
        Ok(tests)
    }

    /// Scan one function declaration after its `func` keyword.
    ///
    /// Returns the test function when the declaration is a test. Methods
    /// (`func (r T) ...`) are never tests.
    fn func_decl(&mut self) -> Result<Option<TestFunc>, ScanError> {
        let name = match self.peek() {
            Some(t) if t.kind == TokenKind::Ident => {
                self.pos += 1;
                Some(t)
            }
            _ => None,
        };

        let param = match name {
            Some(name) if self.peek_kind(0) == Some(TokenKind::LParen) => {
                let params = self.paren_group();
                if is_test_func_name(self.text(name)) {
                    self.testing_t_param(params)
                } else {
                    None
                }
            }
            _ => None,
        };

        // Skip receiver/params/results up to the body.
        let body_open = loop {
            match self.peek_kind(0) {
                Some(TokenKind::LBrace) => break self.bump(),
                Some(TokenKind::LParen) => {
                    self.paren_group();
                }
                Some(TokenKind::Func) | None => break None,
                Some(_) => {
                    self.pos += 1;
                }
            }
        };
        let Some(open) = body_open else {
            return Ok(None);
        };

        let body_start = self.pos;
        self.skip_block(open.span)?;
        let body = &self.tokens[body_start..self.pos.saturating_sub(1)];

        Ok(match (name, param) {
            (Some(name), Some(param)) => Some(TestFunc {
                name: self.text(name).to_string(),
                calls: self.test_calls(body, param),
                param: param.to_string(),
                span: name.span,
            }),
            _ => None,
        })
    }

    /// Consume a balanced `( ... )` group and return the tokens inside it.
    fn paren_group(&mut self) -> &'a [Token] {
        if self.eat(TokenKind::LParen).is_none() {
            return &[];
        }
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return &self.tokens[start..self.pos - 1];
                    }
                }
                _ => {}
            }
        }
        &self.tokens[start..]
    }

    /// Parameter name when `params` is exactly `name *testing.T`.
    fn testing_t_param(&self, params: &[Token]) -> Option<&'a str> {
        let [name, star, pkg, dot, ty] = params else {
            return None;
        };
        let shape_ok = name.kind == TokenKind::Ident
            && star.kind == TokenKind::Star
            && pkg.kind == TokenKind::Ident
            && dot.kind == TokenKind::Dot
            && ty.kind == TokenKind::Ident;
        (shape_ok && self.text(pkg) == "testing" && self.text(ty) == "T")
            .then(|| self.text(name))
    }

    /// Skip to the `}` matching an already consumed `{`.
    fn skip_block(&mut self, open: Span) -> Result<(), ScanError> {
        let mut depth = 1usize;
        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(ScanError::new(
            ScanErrorKind::UnbalancedBraces,
            "unclosed `{`",
            open,
        ))
    }

    /// Calls on `param` at the top level of `body`.
    ///
    /// Calls nested in a block (`if`, `for`, `switch`, `select`, a func
    /// literal) only run conditionally and are not collected.
    fn test_calls(&self, body: &[Token], param: &str) -> Vec<TestCall> {
        let mut calls = Vec::new();
        let mut depth = 0usize;
        for (i, window) in body.windows(4).enumerate() {
            let [recv, dot, method, open] = window else {
                continue;
            };
            match recv.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            if depth > 0 {
                continue;
            }
            let is_call = recv.kind == TokenKind::Ident
                && self.text(recv) == param
                && dot.kind == TokenKind::Dot
                && method.kind == TokenKind::Ident
                && open.kind == TokenKind::LParen;
            if !is_call {
                continue;
            }
            let message = body
                .get(i + 4)
                .filter(|t| t.kind.is_string())
                .and_then(|t| unquote(self.text(t)));
            calls.push(TestCall {
                method: self.text(method).to_string(),
                message,
                span: recv.span.merge(open.span),
            });
        }
        calls
    }
}
