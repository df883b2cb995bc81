use crate::ast::*;
use crate::lexer::Token;

/// Deepest expression nesting the parser accepts, counting both parentheses
/// and chained operators. Compiling and dropping a tree recurse once per level.
pub const MAX_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    depth: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("Parse error at token {position}: {message}")]
pub struct ParseError {
    pub code: &'static str,
    pub position: usize,
    pub span: Span,
    pub message: String,
}

type Result<T> = std::result::Result<T, ParseError>;

/// Binding power of infix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
}

fn infix_precedence(tok: &Token) -> Option<Precedence> {
    match tok {
        Token::Eq | Token::NotEq => Some(Precedence::Equals),
        Token::Less | Token::Greater | Token::LessEq | Token::GreaterEq => Some(Precedence::LessGreater),
        Token::Plus | Token::Minus => Some(Precedence::Sum),
        Token::Star | Token::Slash | Token::Percent => Some(Precedence::Product),
        _ => None,
    }
}

impl Parser {
    pub fn new(tokens: Vec<(Token, Span)>) -> Self {
        Parser { tokens, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, s)) => *s,
            // At EOF point just past the last token.
            None => self.tokens.last().map(|(_, s)| Span::new(s.end, s.end)).unwrap_or(Span::UNKNOWN),
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<Span> {
        match self.peek() {
            Some(tok) if tok == expected => {
                let span = self.peek_span();
                self.pos += 1;
                Ok(span)
            }
            Some(tok) => Err(self.error("MK-P003", format!("expected {:?}, got {:?}", expected, tok))),
            None => Err(self.error("MK-P002", format!("expected {:?}, got EOF", expected))),
        }
    }

    fn error(&self, code: &'static str, message: String) -> ParseError {
        ParseError {
            code,
            position: self.pos,
            span: self.peek_span(),
            message,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn skip_semis(&mut self) {
        while self.peek() == Some(&Token::Semi) {
            self.pos += 1;
        }
    }

    // ---- Statements ----

    pub fn parse_program(&mut self) -> Result<Program> {
        let mut statements = Vec::new();

        self.skip_semis();
        while !self.at_end() {
            let expr = self.parse_expr(Precedence::Lowest)?;
            statements.push(Stmt::Expression(expr));

            match self.peek() {
                None => break,
                Some(Token::Semi) => self.skip_semis(),
                Some(tok) => {
                    return Err(self.error(
                        "MK-P004",
                        format!("expected ';' between statements, got {:?}", tok),
                    ));
                }
            }
        }

        Ok(Program::new(statements))
    }

    // ---- Expressions ----

    /// Descend one level, failing once the tree would exceed `MAX_DEPTH`.
    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(
                "MK-P006",
                format!("expression nested more than {MAX_DEPTH} levels deep"),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_expr(&mut self, precedence: Precedence) -> Result<Expr> {
        self.enter()?;
        let mut left = self.parse_atom()?;
        // Each operator folded into `left` pushes it one level deeper.
        let mut chained = 0;

        while let Some(tok) = self.peek() {
            let Some(next) = infix_precedence(tok) else { break };
            if next <= precedence {
                break;
            }
            let (tok, span) = match self.advance() {
                Some(pair) => pair,
                None => break,
            };
            // `infix_precedence` only accepts operator tokens.
            let operator = tok.operator().unwrap_or_default().to_string();
            self.enter()?;
            chained += 1;
            let right = self.parse_expr(next)?;
            left = Expr::Infix {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        self.depth -= 1 + chained;
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Token::Int(n)) => {
                self.pos += 1;
                Ok(Expr::Integer(n))
            }
            Some(Token::True) => {
                self.pos += 1;
                Ok(Expr::Boolean(true))
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(Expr::Boolean(false))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_expr(Precedence::Lowest)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Minus) => Err(self.error(
                "MK-P005",
                "prefix '-' is not supported; write the subtraction explicitly, e.g. (0 - 5)".into(),
            )),
            Some(tok) => Err(self.error("MK-P001", format!("expected expression, got {:?}", tok))),
            None => Err(self.error("MK-P002", "expected expression, got EOF".into())),
        }
    }
}

pub fn parse(tokens: Vec<(Token, Span)>) -> std::result::Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_str(source: &str) -> Program {
        parse(lexer::lex(source).unwrap()).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        parse(lexer::lex(source).unwrap()).unwrap_err()
    }

    fn int(n: i64) -> Expr {
        Expr::Integer(n)
    }

    /// Compare ignoring spans.
    fn strip(expr: &Expr) -> Expr {
        match expr {
            Expr::Infix { operator, left, right, .. } => Expr::infix(operator, strip(left), strip(right)),
            other => other.clone(),
        }
    }

    fn single_expr(source: &str) -> Expr {
        let prog = parse_str(source);
        assert_eq!(prog.statements.len(), 1, "source: {source}");
        let Stmt::Expression(e) = &prog.statements[0];
        strip(e)
    }

    #[test]
    fn parse_literals() {
        assert_eq!(single_expr("5"), int(5));
        assert_eq!(single_expr("true"), Expr::Boolean(true));
        assert_eq!(single_expr("false"), Expr::Boolean(false));
    }

    #[test]
    fn parse_product_binds_tighter_than_sum() {
        assert_eq!(
            single_expr("1 + 2 * 3"),
            Expr::infix("+", int(1), Expr::infix("*", int(2), int(3)))
        );
    }

    #[test]
    fn parse_left_associative() {
        assert_eq!(
            single_expr("1 - 2 - 3"),
            Expr::infix("-", Expr::infix("-", int(1), int(2)), int(3))
        );
    }

    #[test]
    fn parse_comparison_below_arithmetic() {
        assert_eq!(
            single_expr("1 + 2 < 4 == true"),
            Expr::infix(
                "==",
                Expr::infix("<", Expr::infix("+", int(1), int(2)), int(4)),
                Expr::Boolean(true)
            )
        );
    }

    #[test]
    fn parse_grouping() {
        assert_eq!(
            single_expr("(1 + 2) * 3"),
            Expr::infix("*", Expr::infix("+", int(1), int(2)), int(3))
        );
    }

    #[test]
    fn parse_unsupported_operators_still_build_nodes() {
        assert_eq!(single_expr("1 <= 2"), Expr::infix("<=", int(1), int(2)));
        assert_eq!(single_expr("7 % 2"), Expr::infix("%", int(7), int(2)));
    }

    #[test]
    fn parse_multiple_statements() {
        let prog = parse_str("1; 2;; true;");
        assert_eq!(prog.statements.len(), 3);
    }

    #[test]
    fn parse_empty_program() {
        assert!(parse_str("").statements.is_empty());
        assert!(parse_str(";;").statements.is_empty());
    }

    #[test]
    fn parse_infix_span_is_operator() {
        let prog = parse_str("10 > 2");
        let Stmt::Expression(Expr::Infix { span, .. }) = &prog.statements[0] else {
            panic!("expected infix");
        };
        assert_eq!(*span, Span::new(3, 4));
    }

    #[test]
    fn parse_missing_separator() {
        let e = parse_err("1 2");
        assert_eq!(e.code, "MK-P004");
        assert_eq!(e.span, Span::new(2, 3));
    }

    #[test]
    fn parse_dangling_operator() {
        let e = parse_err("1 +");
        assert_eq!(e.code, "MK-P002");
        assert_eq!(e.span, Span::new(3, 3));
    }

    #[test]
    fn parse_unclosed_paren() {
        let e = parse_err("(1 + 2");
        assert_eq!(e.code, "MK-P002");
        assert!(e.message.contains("RParen"));
    }

    #[test]
    fn parse_prefix_minus_rejected() {
        assert_eq!(parse_err("-1").code, "MK-P005");
    }

    #[test]
    fn parse_nesting_up_to_limit() {
        let depth = MAX_DEPTH - 1;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(single_expr(&source), int(1));
    }

    #[test]
    fn parse_nesting_too_deep() {
        let source = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse_err(&source).code, "MK-P006");
    }

    #[test]
    fn parse_very_deep_nesting_is_error() {
        let depth = 100_000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let e = parse_err(&source);
        assert_eq!(e.code, "MK-P006");
        assert_eq!(e.position, MAX_DEPTH);
    }

    #[test]
    fn parse_operator_chains_count_as_nesting() {
        let short = vec!["1"; MAX_DEPTH / 2].join(" + ");
        assert!(parse(lexer::lex(&short).unwrap()).is_ok());

        let long = vec!["1"; 100_000].join(" + ");
        assert_eq!(parse_err(&long).code, "MK-P006");
    }

    #[test]
    fn parse_depth_resets_between_statements() {
        let group = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        let source = vec![group.as_str(); 4].join("; ");
        assert_eq!(parse_str(&source).statements.len(), 4);
    }

    #[test]
    fn parse_unexpected_token() {
        let e = parse_err(")");
        assert_eq!(e.code, "MK-P001");
        assert_eq!(e.position, 0);
    }
}
