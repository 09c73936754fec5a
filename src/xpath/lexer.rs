//! XPath Lexer
//!
//! Tokenizes XPath expressions. The lexer resolves the lexical ambiguities
//! of XPath 1.0 §3.7 itself, so the parser never looks ahead:
//! - `and`/`or`/`mod`/`div` are operators only right after an operand
//! - a name followed by `(` is a function call or a node-type test
//! - a name followed by `::` is an axis

/// XPath token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Path punctuation
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    DoubleColon, // ::
    Comma,       // ,
    Dollar,      // $

    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,

    // Operators
    Pipe,
    Plus,
    Minus,
    Star, // name test or multiplication, depending on the parser's position
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Mod,
    Div,

    Number(f64),
    Literal(String),

    /// Bare NCName in name-test position
    Name(String),
    /// `prefix:local`
    QName(String, String),
    /// `prefix:*`
    PrefixWildcard(String),
    /// Name directly followed by `(`
    Function(String),
    /// `node`, `text`, `comment` or `processing-instruction` followed by `(`
    KindTest(String),
    /// Name directly followed by `::`
    Axis(String),

    /// Unrecognized input, or an unterminated string literal
    Invalid(String),

    Eof,
}

impl Token {
    /// Whether the token can close an operand, making a following
    /// `and`/`or`/`mod`/`div` an operator.
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Name(_)
                | Token::QName(..)
                | Token::PrefixWildcard(_)
                | Token::Number(_)
                | Token::Literal(_)
                | Token::Dot
                | Token::DoubleDot
                | Token::Star
                | Token::RightParen
                | Token::RightBracket
        )
    }
}

/// XPath lexer
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            after_operand: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    /// Consume `c` if it is next
    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consume the longest prefix whose chars satisfy `pred`
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let token = self.scan();
        self.after_operand = token.ends_operand();
        token
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Token::Eof;
        };

        if c.is_ascii_digit() || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit())) {
            return self.number();
        }
        if c == '"' || c == '\'' {
            return self.literal(c);
        }
        if is_name_start_char(c) {
            return self.name();
        }

        self.pos += c.len_utf8();
        match c {
            '/' if self.eat('/') => Token::DoubleSlash,
            '/' => Token::Slash,
            '.' if self.eat('.') => Token::DoubleDot,
            '.' => Token::Dot,
            ':' if self.eat(':') => Token::DoubleColon,
            '!' if self.eat('=') => Token::NotEq,
            '<' if self.eat('=') => Token::LtEq,
            '<' => Token::Lt,
            '>' if self.eat('=') => Token::GtEq,
            '>' => Token::Gt,
            '@' => Token::At,
            ',' => Token::Comma,
            '$' => Token::Dollar,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            '|' => Token::Pipe,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '=' => Token::Eq,
            other => Token::Invalid(other.to_string()),
        }
    }

    /// `Digits ('.' Digits?)?` or `'.' Digits`
    fn number(&mut self) -> Token {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_digit());
        if self.eat('.') {
            self.eat_while(|c| c.is_ascii_digit());
        }
        Token::Number(self.src[start..self.pos].parse().unwrap_or(f64::NAN))
    }

    /// Quoted literal; XPath 1.0 has no escapes inside it
    fn literal(&mut self, quote: char) -> Token {
        let start = self.pos;
        self.pos += quote.len_utf8();
        let body = self.eat_while(|c| c != quote);
        if self.eat(quote) {
            Token::Literal(body.to_string())
        } else {
            Token::Invalid(self.src[start..].to_string())
        }
    }

    fn name(&mut self) -> Token {
        let name = self.eat_while(is_name_char);

        if self.after_operand {
            match name {
                "and" => return Token::And,
                "or" => return Token::Or,
                "mod" => return Token::Mod,
                "div" => return Token::Div,
                _ => {}
            }
        }

        if self.peek() == Some(':') && self.peek_second() != Some(':') {
            let colon = self.pos;
            self.pos += 1;
            if self.eat('*') {
                return Token::PrefixWildcard(name.to_string());
            }
            let local = self.eat_while(is_name_char);
            if local.starts_with(is_name_start_char) {
                return Token::QName(name.to_string(), local.to_string());
            }
            self.pos = colon;
        }

        let end = self.pos;
        self.skip_whitespace();
        if self.rest().starts_with("::") {
            return Token::Axis(name.to_string());
        }
        if self.rest().starts_with('(') {
            return match name {
                "node" | "text" | "comment" | "processing-instruction" => Token::KindTest(name.to_string()),
                _ => Token::Function(name.to_string()),
            };
        }
        self.pos = end;
        Token::Name(name.to_string())
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        std::iter::from_fn(|| match self.next_token() {
            Token::Eof => None,
            token => Some(token),
        })
        .collect()
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
