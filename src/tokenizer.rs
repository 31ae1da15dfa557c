use log::debug;

use crate::error::ParseError;

/// The lexical kind of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Eof,
    /// Prose with no grammatical meaning. The parser skips these.
    Comment,

    Ident,
    /// A fully parsed integer literal (cardinal plus numeral).
    Integer,
    /// The comma-grouped digit form, e.g. `9,223,372,036,854,775,807`.
    Numeral,
    String,

    // Cardinal words
    Negative,
    Zero,
    /// `one` through `nine`.
    Ones,
    /// `ten` through `nineteen`.
    Teens,
    /// Multiples of ten, `twenty` through `ninety`.
    Tens,
    Hundred,
    /// A power of one thousand, `thousand` through `quintillion`.
    Power,

    // Operator words
    Twice,
    Thrice,
    Less,
    Sum,
    Product,
    Quotient,
    Remainder,
    Squared,
    Cubed,

    // Punctuation
    LParen,
    RParen,
    Dash,

    // Keywords
    Whereas,
    Resolved,
    Hereinafter,
    Publish,
    Assume,
    If,
    Equals,
    Exceeds,
}

/// A lexical token of Resolution source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub typ: TokenType,
    pub lit: String,
}

impl Token {
    pub fn new(typ: TokenType, lit: impl Into<String>) -> Self {
        Token {
            typ,
            lit: lit.into(),
        }
    }

    pub fn eof() -> Self {
        Token::new(TokenType::Eof, "")
    }

    /// Reports whether the token can begin a cardinal.
    pub fn is_cardinal(&self) -> bool {
        matches!(
            self.typ,
            TokenType::Negative
                | TokenType::Zero
                | TokenType::Ones
                | TokenType::Teens
                | TokenType::Tens
                | TokenType::Hundred
                | TokenType::Power
        )
    }
}

/// Maps a word to its keyword [`TokenType`], if any, or else to `Ident` if it
/// begins with a capital letter, or `Comment` otherwise.
///
/// Keyword lookup is case-insensitive.
pub fn lookup(word: &str) -> TokenType {
    match word.to_ascii_lowercase().as_str() {
        "negative" => TokenType::Negative,
        "zero" => TokenType::Zero,
        "one" | "two" | "three" | "four" | "five" | "six" | "seven" | "eight" | "nine" => {
            TokenType::Ones
        }
        "ten" | "eleven" | "twelve" | "thirteen" | "fourteen" | "fifteen" | "sixteen"
        | "seventeen" | "eighteen" | "nineteen" => TokenType::Teens,
        "twenty" | "thirty" | "forty" | "fifty" | "sixty" | "seventy" | "eighty" | "ninety" => {
            TokenType::Tens
        }
        "hundred" => TokenType::Hundred,
        "thousand" | "million" | "billion" | "trillion" | "quadrillion" | "quintillion" => {
            TokenType::Power
        }

        "twice" => TokenType::Twice,
        "thrice" => TokenType::Thrice,
        "less" => TokenType::Less,
        "sum" => TokenType::Sum,
        "product" => TokenType::Product,
        "quotient" => TokenType::Quotient,
        "remainder" => TokenType::Remainder,
        "squared" => TokenType::Squared,
        "cubed" => TokenType::Cubed,

        "whereas" => TokenType::Whereas,
        "resolved" => TokenType::Resolved,
        "hereinafter" => TokenType::Hereinafter,
        "publish" => TokenType::Publish,
        "assume" => TokenType::Assume,
        "if" => TokenType::If,
        "equals" => TokenType::Equals,
        "exceeds" => TokenType::Exceeds,

        _ if word.as_bytes().first().is_some_and(u8::is_ascii_uppercase) => TokenType::Ident,
        _ => TokenType::Comment,
    }
}

/// A byte-oriented scanner over Resolution source text.
///
/// [`Lexer::next_token`] returns one token at a time and returns `Eof`
/// forever once the input is exhausted.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    read_pos: usize,
    ch: u8,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut l = Lexer {
            input: input.as_bytes(),
            pos: 0,
            read_pos: 0,
            ch: 0,
        };
        l.read_char();
        l
    }

    // Invariant: while read_pos < input.len(), read_pos == pos + 1.
    fn read_char(&mut self) {
        self.ch = self.input.get(self.read_pos).copied().unwrap_or(0);
        self.pos = self.read_pos;
        self.read_pos += 1;
    }

    /// Returns the next token, or an error if a string literal does not end
    /// with a closing quotation mark before the end of input.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace();
        let t = match self.ch {
            0 => return Ok(Token::eof()),
            b'"' => {
                self.read_char();
                let lit = self.scan(|b| b != b'"' && b != 0);
                if self.ch == 0 {
                    debug!("unterminated string literal: {:?}", lit);
                    return Err(ParseError::UnterminatedString(lit));
                }
                Token::new(TokenType::String, lit)
            }
            b'(' => Token::new(TokenType::LParen, "("),
            b')' => Token::new(TokenType::RParen, ")"),
            b'-' => {
                self.read_char();
                if is_numeral(self.ch) {
                    let rest = self.scan(is_numeral);
                    return Ok(Token::new(TokenType::Numeral, format!("-{}", rest)));
                }
                return Ok(Token::new(TokenType::Dash, "-"));
            }
            b if b.is_ascii_alphabetic() => {
                let lit = self.scan(|b| b.is_ascii_alphabetic());
                return Ok(Token::new(lookup(&lit), lit));
            }
            b if b.is_ascii_digit() => {
                let lit = self.scan(is_numeral);
                return Ok(Token::new(TokenType::Numeral, lit));
            }
            other => Token::new(TokenType::Comment, (other as char).to_string()),
        };
        self.read_char();
        Ok(t)
    }

    /// Advances through all consecutive bytes satisfying `f` and returns the
    /// bytes read as a string.
    fn scan(&mut self, f: impl Fn(u8) -> bool) -> String {
        let mut s = String::new();
        while f(self.ch) {
            s.push(self.ch as char);
            self.read_char();
        }
        s
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.ch, b' ' | b'\t' | b'\n' | b'\r') {
            self.read_char();
        }
    }
}

/// Reports whether `b` may appear in a numeral literal: a digit, a
/// delimiting comma, or a negative sign.
fn is_numeral(b: u8) -> bool {
    b.is_ascii_digit() || b == b',' || b == b'-'
}

#[cfg(test)]
mod tests {
    use super::*;

    // Collects all tokens up to and including Eof, dropping comments.
    fn significant_tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().expect("no string literals here");
            if token.typ == TokenType::Comment {
                continue;
            }
            let done = token.typ == TokenType::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            significant_tokens("()-"),
            vec![
                Token::new(TokenType::LParen, "("),
                Token::new(TokenType::RParen, ")"),
                Token::new(TokenType::Dash, "-"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            significant_tokens("WHEREAS Resolved hereinafter PUBLISH Assume IF equals Exceeds"),
            vec![
                Token::new(TokenType::Whereas, "WHEREAS"),
                Token::new(TokenType::Resolved, "Resolved"),
                Token::new(TokenType::Hereinafter, "hereinafter"),
                Token::new(TokenType::Publish, "PUBLISH"),
                Token::new(TokenType::Assume, "Assume"),
                Token::new(TokenType::If, "IF"),
                Token::new(TokenType::Equals, "equals"),
                Token::new(TokenType::Exceeds, "Exceeds"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_numerals() {
        assert_eq!(
            significant_tokens("-1 2 3000000000000"),
            vec![
                Token::new(TokenType::Numeral, "-1"),
                Token::new(TokenType::Numeral, "2"),
                Token::new(TokenType::Numeral, "3000000000000"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_cardinal_words() {
        let input = "negative zero one nine ten nineteen twenty ninety \
                     hundred thousand million billion trillion quadrillion quintillion";
        let expected = [
            (TokenType::Negative, "negative"),
            (TokenType::Zero, "zero"),
            (TokenType::Ones, "one"),
            (TokenType::Ones, "nine"),
            (TokenType::Teens, "ten"),
            (TokenType::Teens, "nineteen"),
            (TokenType::Tens, "twenty"),
            (TokenType::Tens, "ninety"),
            (TokenType::Hundred, "hundred"),
            (TokenType::Power, "thousand"),
            (TokenType::Power, "million"),
            (TokenType::Power, "billion"),
            (TokenType::Power, "trillion"),
            (TokenType::Power, "quadrillion"),
            (TokenType::Power, "quintillion"),
            (TokenType::Eof, ""),
        ];
        let tokens = significant_tokens(input);
        assert_eq!(tokens.len(), expected.len());
        for (token, (typ, lit)) in tokens.iter().zip(expected) {
            assert_eq!(token, &Token::new(typ, lit));
        }
    }

    #[test]
    fn test_operator_words() {
        assert_eq!(
            significant_tokens("twice thrice less sum product quotient remainder squared cubed"),
            vec![
                Token::new(TokenType::Twice, "twice"),
                Token::new(TokenType::Thrice, "thrice"),
                Token::new(TokenType::Less, "less"),
                Token::new(TokenType::Sum, "sum"),
                Token::new(TokenType::Product, "product"),
                Token::new(TokenType::Quotient, "quotient"),
                Token::new(TokenType::Remainder, "remainder"),
                Token::new(TokenType::Squared, "squared"),
                Token::new(TokenType::Cubed, "cubed"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_negative_integer_literal() {
        assert_eq!(
            significant_tokens("negative three (-3)"),
            vec![
                Token::new(TokenType::Negative, "negative"),
                Token::new(TokenType::Ones, "three"),
                Token::new(TokenType::LParen, "("),
                Token::new(TokenType::Numeral, "-3"),
                Token::new(TokenType::RParen, ")"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            significant_tokens(r#""""#),
            vec![Token::new(TokenType::String, ""), Token::eof()]
        );
        assert_eq!(
            significant_tokens(r#""Greetings, Assembly.""#),
            vec![
                Token::new(TokenType::String, "Greetings, Assembly."),
                Token::eof(),
            ]
        );
        // Keywords inside a string literal are not tokens.
        assert_eq!(
            significant_tokens(r#"WHEREAS the customary greeting is "Hello, World!":"#),
            vec![
                Token::new(TokenType::Whereas, "WHEREAS"),
                Token::new(TokenType::String, "Hello, World!"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new(r#"publish "Hello"#);
        assert_eq!(lexer.next_token(), Ok(Token::new(TokenType::Publish, "publish")));
        assert_eq!(
            lexer.next_token(),
            Err(ParseError::UnterminatedString("Hello".to_string()))
        );
    }

    #[test]
    fn test_capitalized_words_are_identifiers() {
        assert_eq!(
            significant_tokens("WHEREAS an Identifier is capitalized"),
            vec![
                Token::new(TokenType::Whereas, "WHEREAS"),
                Token::new(TokenType::Ident, "Identifier"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_prose_resolution() {
        let input = "A Resolution Concerning Commentary\n\
             \n\
             WHEREAS a resolution consisting entirely of comments has no effect: now, therefore, \n\
             \n\
             BE IT RESOLVED that this assembly takes no action.";
        assert_eq!(
            significant_tokens(input),
            vec![
                Token::new(TokenType::Ident, "A"),
                Token::new(TokenType::Ident, "Resolution"),
                Token::new(TokenType::Ident, "Concerning"),
                Token::new(TokenType::Ident, "Commentary"),
                Token::new(TokenType::Whereas, "WHEREAS"),
                Token::new(TokenType::Ident, "BE"),
                Token::new(TokenType::Ident, "IT"),
                Token::new(TokenType::Resolved, "RESOLVED"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("");
        assert_eq!(lexer.next_token(), Ok(Token::eof()));
        assert_eq!(lexer.next_token(), Ok(Token::eof()));
    }

    #[test]
    fn test_scan_boundaries() {
        // A numeral scan stops at the first byte that is not a digit,
        // comma, or dash.
        assert_eq!(
            significant_tokens("65,536 hours")[0],
            Token::new(TokenType::Numeral, "65,536")
        );
        assert_eq!(
            significant_tokens("24, hours")[0],
            Token::new(TokenType::Numeral, "24,")
        );
    }
}
