//! The Resolution parser: clause scanning, the integer literal rule, and a
//! Pratt expression parser over two tokens of lookahead. Unmatched words in
//! the input are comment tokens, so the parser locates each statement by
//! scanning forward for its keyword rather than by position.

use crate::error::{ErrorList, ParseError};
use crate::numeral;
use crate::tokenizer::{Lexer, Token, TokenType};

const QUINTILLION: i64 = 1_000_000_000_000_000_000;

/// A parsed program: the Whereas clauses' declarations followed by the
/// Resolved clauses' actions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    pub whereas_stmts: Vec<WhereasStmt>,
    pub resolved_stmts: Vec<ResolvedStmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereasStmt {
    Decl { name: String, value: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedStmt {
    Assume {
        name: String,
        value: Expr,
    },
    If {
        left: Expr,
        relation: Relation,
        right: Expr,
        consequence: Box<ResolvedStmt>,
    },
    Publish {
        value: Expr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equals,
    Exceeds,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Integer(i64),
    String(String),
    Identifier(String),
    UnaryPrefix {
        op: UnaryPrefixOp,
        operand: Box<Expr>,
    },
    BinaryPrefix {
        op: BinaryPrefixOp,
        first: Box<Expr>,
        second: Box<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryPrefixOp {
    Double,
    Triple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryPrefixOp {
    Sum,
    Product,
    Quotient,
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Square,
    Cube,
}

/// Binding power of the operator tiers. Binary prefix operators take their
/// first operand at `Lowest` and their second at `Prefix`, which is what
/// keeps `product three (3) less two (2) four (4)` parsing as
/// `product (3 less 2) 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Infix,
    Prefix,
    Postfix,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdentState {
    Declared,
    Used,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peek: Token,
    errors: ErrorList,
    // Declaration order matters: unused identifiers are reported in it.
    idents: Vec<(String, IdentState)>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let mut parser = Parser {
            lexer,
            cur: Token::eof(),
            peek: Token::eof(),
            errors: ErrorList::new(),
            idents: Vec::new(),
        };
        parser.next()?;
        parser.next()?;
        Ok(parser)
    }

    fn next(&mut self) -> Result<(), ParseError> {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token()?);
        Ok(())
    }

    fn cur_is(&self, typ: TokenType) -> bool {
        self.cur.typ == typ
    }

    fn peek_is(&self, typ: TokenType) -> bool {
        self.peek.typ == typ
    }

    /// Parses a whole Resolution, consuming the parser. Structural and
    /// lexical errors abort with a single entry; identifier discipline
    /// diagnostics accumulate and are reported together, unused identifiers
    /// last and in declaration order.
    pub fn parse_resolution(mut self) -> Result<Resolution, ErrorList> {
        match self.resolution() {
            Ok(resolution) => {
                let unused: Vec<String> = self
                    .idents
                    .iter()
                    .filter(|(_, state)| *state == IdentState::Declared)
                    .map(|(name, _)| name.clone())
                    .collect();
                for name in unused {
                    self.errors.push(ParseError::Unused(name));
                }
                if self.errors.is_empty() {
                    Ok(resolution)
                } else {
                    Err(self.errors)
                }
            }
            Err(err) => {
                self.errors.push(err);
                Err(self.errors)
            }
        }
    }

    fn resolution(&mut self) -> Result<Resolution, ParseError> {
        // The first word of a Resolution is its title.
        if !self.cur_is(TokenType::Comment) && !self.cur_is(TokenType::Ident) {
            return Err(ParseError::NoTitle);
        }

        let mut resolution = Resolution::default();
        let mut have_whereas = false;
        let mut have_resolved = false;

        while !self.cur_is(TokenType::Eof) {
            match self.cur.typ {
                TokenType::Whereas => {
                    if have_resolved {
                        return Err(ParseError::LateWhereas);
                    }
                    have_whereas = true;
                    if let Some(stmt) = self.parse_whereas_stmt()? {
                        resolution.whereas_stmts.push(stmt);
                    }
                }
                TokenType::Resolved => {
                    if !have_whereas {
                        // Distinguish a misordered program from one with no
                        // Whereas clause anywhere.
                        while !self.cur_is(TokenType::Eof) {
                            if self.cur_is(TokenType::Whereas) {
                                return Err(ParseError::EarlyResolved);
                            }
                            self.next()?;
                        }
                        return Err(ParseError::NoWhereas);
                    }
                    have_resolved = true;
                    if let Some(stmt) = self.parse_resolved_stmt()? {
                        resolution.resolved_stmts.push(stmt);
                    }
                }
                _ => {}
            }
            self.next()?;
        }

        if !have_resolved {
            return Err(ParseError::NoResolved);
        }
        Ok(resolution)
    }

    // Scans the body of a Whereas clause for `hereinafter`. A clause without
    // one declares nothing.
    fn parse_whereas_stmt(&mut self) -> Result<Option<WhereasStmt>, ParseError> {
        while !self.peek_is(TokenType::Hereinafter) {
            if matches!(
                self.peek.typ,
                TokenType::Whereas | TokenType::Resolved | TokenType::Eof
            ) {
                return Ok(None);
            }
            self.next()?;
        }
        self.next()?;
        Ok(Some(self.parse_decl_stmt()?))
    }

    fn parse_decl_stmt(&mut self) -> Result<WhereasStmt, ParseError> {
        self.next()?;
        while !self.cur_is(TokenType::Ident) {
            if matches!(
                self.cur.typ,
                TokenType::Whereas | TokenType::Resolved | TokenType::Eof
            ) {
                return Err(ParseError::UnrecognizedExpression);
            }
            self.next()?;
        }

        let name = self.cur.lit.clone();
        self.declare(&name);

        self.next()?;
        self.advance_to_expr()?;
        let value = self.parse_expr(Precedence::Lowest)?;
        Ok(WhereasStmt::Decl { name, value })
    }

    // Scans the body of a Resolved clause for an action: a publish, a
    // reassignment (an identifier immediately followed by `assume`), or a
    // conditional. A clause without one performs nothing.
    fn parse_resolved_stmt(&mut self) -> Result<Option<ResolvedStmt>, ParseError> {
        loop {
            if self.cur_is(TokenType::Ident) && self.peek_is(TokenType::Assume) {
                return Ok(Some(self.parse_assume_stmt()?));
            }
            match self.peek.typ {
                TokenType::Publish => {
                    self.next()?;
                    return Ok(Some(self.parse_publish_stmt()?));
                }
                TokenType::If => {
                    self.next()?;
                    return Ok(Some(self.parse_if_stmt()?));
                }
                TokenType::Whereas | TokenType::Resolved | TokenType::Eof => return Ok(None),
                _ => self.next()?,
            }
        }
    }

    fn parse_assume_stmt(&mut self) -> Result<ResolvedStmt, ParseError> {
        let name = self.cur.lit.clone();
        self.mark_used(&name);

        self.next()?;
        self.next()?;
        self.advance_to_expr()?;
        let value = self.parse_expr(Precedence::Lowest)?;
        Ok(ResolvedStmt::Assume { name, value })
    }

    fn parse_publish_stmt(&mut self) -> Result<ResolvedStmt, ParseError> {
        self.next()?;
        self.advance_to_expr()?;
        let value = self.parse_expr(Precedence::Lowest)?;
        Ok(ResolvedStmt::Publish { value })
    }

    fn parse_if_stmt(&mut self) -> Result<ResolvedStmt, ParseError> {
        self.next()?;
        self.advance_to_expr()?;
        let left = self.parse_expr(Precedence::Lowest)?;

        self.next()?;
        while !matches!(self.cur.typ, TokenType::Equals | TokenType::Exceeds) {
            if matches!(
                self.cur.typ,
                TokenType::Whereas | TokenType::Resolved | TokenType::Eof
            ) {
                return Err(ParseError::NoRelation);
            }
            self.next()?;
        }
        let relation = if self.cur_is(TokenType::Equals) {
            Relation::Equals
        } else {
            Relation::Exceeds
        };

        self.next()?;
        self.advance_to_expr()?;
        let right = self.parse_expr(Precedence::Lowest)?;

        match self.parse_resolved_stmt()? {
            Some(consequence) => Ok(ResolvedStmt::If {
                left,
                relation,
                right,
                consequence: Box::new(consequence),
            }),
            None => Err(ParseError::NoConsequence),
        }
    }

    fn declare(&mut self, name: &str) {
        if self.idents.iter().any(|(n, _)| n == name) {
            self.errors.push(ParseError::Redeclared(name.to_string()));
        } else {
            self.idents.push((name.to_string(), IdentState::Declared));
        }
    }

    fn mark_used(&mut self, name: &str) {
        match self.idents.iter_mut().find(|(n, _)| n == name) {
            Some((_, state)) => *state = IdentState::Used,
            None => self.errors.push(ParseError::Undeclared(name.to_string())),
        }
    }

    fn can_start_expr(token: &Token) -> bool {
        token.is_cardinal()
            || matches!(
                token.typ,
                TokenType::Numeral
                    | TokenType::String
                    | TokenType::Ident
                    | TokenType::Twice
                    | TokenType::Thrice
                    | TokenType::Sum
                    | TokenType::Product
                    | TokenType::Quotient
                    | TokenType::Remainder
            )
    }

    // Skips filler until the current token can begin an expression. Running
    // into a clause boundary instead means the expression is missing.
    fn advance_to_expr(&mut self) -> Result<(), ParseError> {
        while !Self::can_start_expr(&self.cur) {
            if matches!(
                self.cur.typ,
                TokenType::Whereas | TokenType::Resolved | TokenType::Eof
            ) {
                return Err(ParseError::UnrecognizedExpression);
            }
            self.next()?;
        }
        Ok(())
    }

    /// Parses one expression starting at the current token, stopping before
    /// any operator that binds no tighter than `prec`.
    pub fn parse_expr(&mut self, prec: Precedence) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;
        while prec < self.peek_precedence() {
            self.next()?;
            left = self.parse_operator(left)?;
        }
        Ok(left)
    }

    fn peek_precedence(&self) -> Precedence {
        match self.peek.typ {
            TokenType::Less => Precedence::Infix,
            TokenType::Squared | TokenType::Cubed => Precedence::Postfix,
            _ => Precedence::Lowest,
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.cur.typ {
            // A bare numeral never begins a valid expression; the integer
            // literal rule reports it.
            _ if self.cur.is_cardinal() || self.cur_is(TokenType::Numeral) => {
                self.parse_integer_literal()
            }
            TokenType::String => Ok(Expr::String(self.cur.lit.clone())),
            TokenType::Ident => Ok(self.parse_identifier()),
            TokenType::Twice | TokenType::Thrice => {
                let op = if self.cur_is(TokenType::Twice) {
                    UnaryPrefixOp::Double
                } else {
                    UnaryPrefixOp::Triple
                };
                self.next()?;
                self.advance_to_expr()?;
                let operand = self.parse_expr(Precedence::Prefix)?;
                Ok(Expr::UnaryPrefix {
                    op,
                    operand: Box::new(operand),
                })
            }
            TokenType::Sum | TokenType::Product | TokenType::Quotient | TokenType::Remainder => {
                let op = match self.cur.typ {
                    TokenType::Sum => BinaryPrefixOp::Sum,
                    TokenType::Product => BinaryPrefixOp::Product,
                    TokenType::Quotient => BinaryPrefixOp::Quotient,
                    _ => BinaryPrefixOp::Remainder,
                };
                self.next()?;
                self.advance_to_expr()?;
                let first = self.parse_expr(Precedence::Lowest)?;
                self.next()?;
                self.advance_to_expr()?;
                let second = self.parse_expr(Precedence::Prefix)?;
                Ok(Expr::BinaryPrefix {
                    op,
                    first: Box::new(first),
                    second: Box::new(second),
                })
            }
            _ => Err(ParseError::UnrecognizedExpression),
        }
    }

    fn parse_operator(&mut self, left: Expr) -> Result<Expr, ParseError> {
        match self.cur.typ {
            TokenType::Less => {
                self.next()?;
                self.advance_to_expr()?;
                let right = self.parse_expr(Precedence::Infix)?;
                Ok(Expr::Infix {
                    op: InfixOp::Subtract,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            TokenType::Squared => Ok(Expr::Postfix {
                op: PostfixOp::Square,
                operand: Box::new(left),
            }),
            TokenType::Cubed => Ok(Expr::Postfix {
                op: PostfixOp::Cube,
                operand: Box::new(left),
            }),
            _ => Err(ParseError::UnrecognizedExpression),
        }
    }

    fn parse_identifier(&mut self) -> Expr {
        let name = self.cur.lit.clone();
        self.mark_used(&name);
        Expr::Identifier(name)
    }

    // An integer literal spells its value twice: `<cardinal> (<numeral>)`.
    // The two spellings must agree.
    fn parse_integer_literal(&mut self) -> Result<Expr, ParseError> {
        if self.cur_is(TokenType::Numeral) {
            return Err(ParseError::InvalidInteger);
        }
        let cardinal = self.parse_cardinal_literal()?;

        if !self.peek_is(TokenType::LParen) {
            return Err(ParseError::InvalidInteger);
        }
        self.next()?;
        if !self.peek_is(TokenType::Numeral) {
            return Err(ParseError::InvalidInteger);
        }
        self.next()?;
        let numeral = numeral::parse_numeral(&self.cur.lit)?;
        if !self.peek_is(TokenType::RParen) {
            return Err(ParseError::InvalidInteger);
        }
        self.next()?;

        if cardinal != numeral {
            return Err(ParseError::Disagreement);
        }
        Ok(Expr::Integer(numeral))
    }

    fn parse_cardinal_literal(&mut self) -> Result<i64, ParseError> {
        if self.cur_is(TokenType::Zero) {
            return Ok(0);
        }

        let mut negative = false;
        if self.cur_is(TokenType::Negative) {
            negative = true;
            self.next()?;
        }

        let mut n: i64 = 0;
        loop {
            let mut group = self.parse_three_digit_cardinal()?;
            if negative {
                group = -group;
            }

            let mut pow: i64 = 1;
            if self.peek_is(TokenType::Power) {
                self.next()?;
                pow = numeral::word_value(&self.cur.lit).ok_or(ParseError::InvalidCardinal)?;
            }

            // Only a 1-digit group may pair with quintillion: ten
            // quintillion already exceeds the integer range.
            if pow == QUINTILLION && !(-9..=9).contains(&group) {
                return Err(ParseError::InvalidCardinal);
            }

            // Each power must be strictly smaller than every power already
            // accumulated, so `one million one million` is out of order.
            if pow < QUINTILLION && n % (pow * 1000) != 0 {
                return Err(ParseError::InvalidCardinal);
            }

            n = group
                .checked_mul(pow)
                .and_then(|g| n.checked_add(g))
                .ok_or(ParseError::InvalidCardinal)?;

            if pow == 1
                || !matches!(
                    self.peek.typ,
                    TokenType::Ones | TokenType::Teens | TokenType::Tens
                )
            {
                return Ok(n);
            }
            self.next()?;
        }
    }

    fn parse_three_digit_cardinal(&mut self) -> Result<i64, ParseError> {
        match self.cur.typ {
            TokenType::Ones => {
                let mut n =
                    numeral::word_value(&self.cur.lit).ok_or(ParseError::InvalidCardinal)?;
                if self.peek_is(TokenType::Hundred) {
                    self.next()?;
                    n *= 100;
                    if matches!(
                        self.peek.typ,
                        TokenType::Ones | TokenType::Teens | TokenType::Tens
                    ) {
                        self.next()?;
                        n += self.parse_two_digit_cardinal()?;
                    }
                }
                Ok(n)
            }
            TokenType::Teens | TokenType::Tens => self.parse_two_digit_cardinal(),
            _ => Err(ParseError::InvalidCardinal),
        }
    }

    fn parse_two_digit_cardinal(&mut self) -> Result<i64, ParseError> {
        let value = numeral::word_value(&self.cur.lit).ok_or(ParseError::InvalidCardinal)?;
        match self.cur.typ {
            TokenType::Ones | TokenType::Teens => Ok(value),
            TokenType::Tens => {
                let mut n = value;
                if self.peek_is(TokenType::Dash) {
                    self.next()?;
                    if !self.peek_is(TokenType::Ones) {
                        return Err(ParseError::InvalidCardinal);
                    }
                    self.next()?;
                    n += numeral::word_value(&self.cur.lit).ok_or(ParseError::InvalidCardinal)?;
                }
                Ok(n)
            }
            _ => Err(ParseError::InvalidCardinal),
        }
    }

    /// The discipline diagnostics accumulated so far.
    pub fn errors(&self) -> &ErrorList {
        &self.errors
    }
}

/// Parses `input` as a complete Resolution.
pub fn parse(input: &str) -> Result<Resolution, ErrorList> {
    let parser = Parser::new(Lexer::new(input)).map_err(ErrorList::from)?;
    parser.parse_resolution()
}
