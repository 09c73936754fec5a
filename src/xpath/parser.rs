//! XPath Parser
//!
//! Parses XPath 1.0 expressions into an AST. Binary operators are handled by
//! precedence climbing; location paths, filter expressions and primaries by
//! recursive descent. Abbreviations (`//`, `.`, `..`, `@`) are expanded here.

use super::lexer::{Lexer, Token};

/// XPath expression AST node
#[derive(Debug, Clone)]
pub enum Expr {
    /// Root of the tree being queried (`/`)
    Root,
    /// `a | b`
    Union(Box<Expr>, Box<Expr>),
    /// A step applied to every node of the base
    Path(Box<Expr>, Box<Step>),
    /// Predicate applied to a non-step primary, e.g. `(//a)[2]`
    Filter(Box<Expr>, Box<Expr>),
    Function(String, Vec<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Negate(Box<Expr>),
    Number(f64),
    String(String),
    Variable(String),
    /// First step of a relative location path
    Step(Box<Step>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// Operator and binding strength for a token in operator position
    fn from_token(token: &Token) -> Option<(Self, u8)> {
        let op = match token {
            Token::Or => (BinaryOp::Or, 1),
            Token::And => (BinaryOp::And, 2),
            Token::Eq => (BinaryOp::Eq, 3),
            Token::NotEq => (BinaryOp::NotEq, 3),
            Token::Lt => (BinaryOp::Lt, 4),
            Token::LtEq => (BinaryOp::LtEq, 4),
            Token::Gt => (BinaryOp::Gt, 4),
            Token::GtEq => (BinaryOp::GtEq, 4),
            Token::Plus => (BinaryOp::Add, 5),
            Token::Minus => (BinaryOp::Sub, 5),
            Token::Star => (BinaryOp::Mul, 6),
            Token::Div => (BinaryOp::Div, 6),
            Token::Mod => (BinaryOp::Mod, 6),
            _ => return None,
        };
        Some(op)
    }
}

/// Location step in a path
#[derive(Debug, Clone)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn bare(axis: Axis, node_test: NodeTest) -> Self {
        Step {
            axis,
            node_test,
            predicates: Vec::new(),
        }
    }
}

/// XPath axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
    Self_,
    Attribute,
    Namespace,
}

impl Axis {
    pub fn from_str(s: &str) -> Option<Self> {
        const AXES: [(&str, Axis); 13] = [
            ("child", Axis::Child),
            ("descendant", Axis::Descendant),
            ("descendant-or-self", Axis::DescendantOrSelf),
            ("parent", Axis::Parent),
            ("ancestor", Axis::Ancestor),
            ("ancestor-or-self", Axis::AncestorOrSelf),
            ("following-sibling", Axis::FollowingSibling),
            ("preceding-sibling", Axis::PrecedingSibling),
            ("following", Axis::Following),
            ("preceding", Axis::Preceding),
            ("self", Axis::Self_),
            ("attribute", Axis::Attribute),
            ("namespace", Axis::Namespace),
        ];
        AXES.iter().find(|(name, _)| *name == s).map(|&(_, axis)| axis)
    }
}

/// Node test in a location step
#[derive(Debug, Clone)]
pub enum NodeTest {
    /// `*`
    Any,
    Name(String),
    /// `prefix:local`
    QName(String, String),
    /// `prefix:*`
    NamespaceWildcard(String),
    /// `node()`
    Node,
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `processing-instruction()`, optionally with a target literal
    ProcessingInstruction(Option<String>),
}

/// Whether `token` can begin a location step
fn starts_step(token: &Token) -> bool {
    matches!(
        token,
        Token::Dot
            | Token::DoubleDot
            | Token::At
            | Token::Axis(_)
            | Token::Star
            | Token::Name(_)
            | Token::QName(..)
            | Token::PrefixWildcard(_)
            | Token::KindTest(_)
    )
}

/// `base/descendant-or-self::node()`, the expansion of `//`
fn descend(base: Expr) -> Expr {
    Expr::Path(
        Box::new(base),
        Box::new(Step::bare(Axis::DescendantOrSelf, NodeTest::Node)),
    )
}

fn describe(token: &Token) -> String {
    match token {
        Token::Eof => "end of input".to_string(),
        Token::Invalid(text) => format!("invalid input `{}`", text),
        other => format!("{:?}", other),
    }
}

/// XPath parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Parser { lexer, current }
    }

    /// Parse a whole expression; anything left over is an error
    pub fn parse(&mut self) -> Result<Expr, String> {
        let expr = self.expr()?;
        if self.current == Token::Eof {
            Ok(expr)
        } else {
            Err(format!("unexpected {} after expression", describe(&self.current)))
        }
    }

    /// Take the current token and move to the next one
    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current == *token {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), String> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(format!("expected {:?}, found {}", token, describe(&self.current)))
        }
    }

    fn expr(&mut self) -> Result<Expr, String> {
        self.binary(0)
    }

    /// Parse operands joined by operators binding at least as tight as `min`.
    /// All XPath binary operators are left-associative.
    fn binary(&mut self, min: u8) -> Result<Expr, String> {
        let mut lhs = self.unary()?;
        while let Some((op, strength)) = BinaryOp::from_token(&self.current) {
            if strength < min {
                break;
            }
            self.bump();
            let rhs = self.binary(strength + 1)?;
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, String> {
        if self.eat(&Token::Minus) {
            Ok(Expr::Negate(Box::new(self.unary()?)))
        } else {
            self.union()
        }
    }

    fn union(&mut self) -> Result<Expr, String> {
        let mut lhs = self.path()?;
        while self.eat(&Token::Pipe) {
            lhs = Expr::Union(Box::new(lhs), Box::new(self.path()?));
        }
        Ok(lhs)
    }

    fn path(&mut self) -> Result<Expr, String> {
        let head = match self.current {
            Token::Slash => {
                self.bump();
                if !starts_step(&self.current) {
                    return Ok(Expr::Root);
                }
                Expr::Path(Box::new(Expr::Root), Box::new(self.step()?))
            }
            Token::DoubleSlash => {
                self.bump();
                Expr::Path(Box::new(descend(Expr::Root)), Box::new(self.step()?))
            }
            _ if starts_step(&self.current) => Expr::Step(Box::new(self.step()?)),
            _ => self.filter()?,
        };
        self.trailing_steps(head)
    }

    /// `(/ step | // step)*` after a path head
    fn trailing_steps(&mut self, mut expr: Expr) -> Result<Expr, String> {
        loop {
            let base = match self.current {
                Token::Slash => expr,
                Token::DoubleSlash => descend(expr),
                _ => return Ok(expr),
            };
            self.bump();
            expr = Expr::Path(Box::new(base), Box::new(self.step()?));
        }
    }

    fn filter(&mut self) -> Result<Expr, String> {
        let mut expr = self.primary()?;
        while self.current == Token::LeftBracket {
            expr = Expr::Filter(Box::new(expr), Box::new(self.predicate()?));
        }
        Ok(expr)
    }

    fn predicate(&mut self) -> Result<Expr, String> {
        self.expect(Token::LeftBracket)?;
        let expr = self.expr()?;
        self.expect(Token::RightBracket)?;
        Ok(expr)
    }

    fn primary(&mut self) -> Result<Expr, String> {
        match self.bump() {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Literal(s) => Ok(Expr::String(s)),
            Token::Dollar => match self.bump() {
                Token::Name(name) => Ok(Expr::Variable(name)),
                Token::QName(prefix, local) => Ok(Expr::Variable(format!("{}:{}", prefix, local))),
                other => Err(format!("expected variable name, found {}", describe(&other))),
            },
            Token::LeftParen => {
                let inner = self.expr()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Token::Function(name) => {
                let args = self.arguments()?;
                Ok(Expr::Function(name, args))
            }
            other => Err(format!("unexpected {}", describe(&other))),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, String> {
        self.expect(Token::LeftParen)?;
        let mut args = Vec::new();
        if self.eat(&Token::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RightParen)?;
        Ok(args)
    }

    fn step(&mut self) -> Result<Step, String> {
        match self.current {
            Token::Dot => {
                self.bump();
                return Ok(Step::bare(Axis::Self_, NodeTest::Node));
            }
            Token::DoubleDot => {
                self.bump();
                return Ok(Step::bare(Axis::Parent, NodeTest::Node));
            }
            _ => {}
        }

        let axis = match &self.current {
            Token::At => {
                self.bump();
                Axis::Attribute
            }
            Token::Axis(name) => {
                let axis = Axis::from_str(name).ok_or_else(|| format!("unknown axis `{}`", name))?;
                self.bump();
                self.expect(Token::DoubleColon)?;
                axis
            }
            _ => Axis::Child,
        };

        let node_test = match self.bump() {
            Token::Star => NodeTest::Any,
            Token::Name(name) => NodeTest::Name(name),
            Token::QName(prefix, local) => NodeTest::QName(prefix, local),
            Token::PrefixWildcard(prefix) => NodeTest::NamespaceWildcard(prefix),
            Token::KindTest(kind) => self.kind_test(&kind)?,
            other => return Err(format!("expected node test, found {}", describe(&other))),
        };

        let mut predicates = Vec::new();
        while self.current == Token::LeftBracket {
            predicates.push(self.predicate()?);
        }

        Ok(Step {
            axis,
            node_test,
            predicates,
        })
    }

    /// The parenthesized part of `node()`, `text()`, `comment()` or
    /// `processing-instruction('target'?)`
    fn kind_test(&mut self, kind: &str) -> Result<NodeTest, String> {
        self.expect(Token::LeftParen)?;
        let test = match kind {
            "node" => NodeTest::Node,
            "text" => NodeTest::Text,
            "comment" => NodeTest::Comment,
            _ => match &self.current {
                Token::Literal(target) => {
                    let target = target.clone();
                    self.bump();
                    NodeTest::ProcessingInstruction(Some(target))
                }
                _ => NodeTest::ProcessingInstruction(None),
            },
        };
        self.expect(Token::RightParen)?;
        Ok(test)
    }
}

/// Parse an XPath expression string
pub fn parse(input: &str) -> Result<Expr, String> {
    Parser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_step(expr: &Expr) -> &Step {
        match expr {
            Expr::Path(_, step) => step,
            Expr::Step(step) => step,
            other => panic!("not a path: {:?}", other),
        }
    }

    #[test]
    fn test_simple_path() {
        let expr = parse("/root/child").unwrap();
        let Expr::Path(base, step) = &expr else {
            panic!("{:?}", expr)
        };
        assert!(matches!(&step.node_test, NodeTest::Name(n) if n == "child"));
        assert!(matches!(**base, Expr::Path(ref root, _) if matches!(**root, Expr::Root)));
    }

    #[test]
    fn test_lone_slash_is_root() {
        assert!(matches!(parse("/").unwrap(), Expr::Root));
        assert!(matches!(parse("/ | //a").unwrap(), Expr::Union(ref l, _) if matches!(**l, Expr::Root)));
    }

    #[test]
    fn test_step_keeps_its_predicates() {
        let expr = parse("item[@id='test'][2]").unwrap();
        let Expr::Step(step) = &expr else {
            panic!("{:?}", expr)
        };
        assert_eq!(step.axis, Axis::Child);
        assert_eq!(step.predicates.len(), 2);
    }

    #[test]
    fn test_filter_applies_to_primaries() {
        assert!(matches!(parse("(//item)[1]").unwrap(), Expr::Filter(..)));
        assert!(matches!(parse("$nodes[1]/a").unwrap(), Expr::Path(ref base, _) if matches!(**base, Expr::Filter(..))));
    }

    #[test]
    fn test_descendant() {
        let expr = parse("//item").unwrap();
        let Expr::Path(base, _) = &expr else {
            panic!("{:?}", expr)
        };
        assert!(matches!(**base, Expr::Path(_, ref s) if s.axis == Axis::DescendantOrSelf));
    }

    #[test]
    fn test_abbreviated_steps() {
        assert_eq!(last_step(&parse(".").unwrap()).axis, Axis::Self_);
        assert_eq!(last_step(&parse("//b/..").unwrap()).axis, Axis::Parent);
        assert_eq!(last_step(&parse("a/@id").unwrap()).axis, Axis::Attribute);
        let step = last_step(&parse("ancestor-or-self::node()").unwrap()).clone();
        assert_eq!(step.axis, Axis::AncestorOrSelf);
        assert!(matches!(step.node_test, NodeTest::Node));
        let step = last_step(&parse("processing-instruction('x')").unwrap()).clone();
        assert!(matches!(step.node_test, NodeTest::ProcessingInstruction(Some(ref t)) if t == "x"));
    }

    #[test]
    fn test_keyword_named_step() {
        let expr = parse("//div/and").unwrap();
        assert!(matches!(&last_step(&expr).node_test, NodeTest::Name(n) if n == "and"));
    }

    #[test]
    fn test_precedence() {
        // 1 + 2 * 3 = 4 or false()
        let expr = parse("1 + 2 * 3 = 4 or false()").unwrap();
        let Expr::Binary(lhs, BinaryOp::Or, _) = &expr else {
            panic!("{:?}", expr)
        };
        let Expr::Binary(sum, BinaryOp::Eq, _) = &**lhs else {
            panic!("{:?}", lhs)
        };
        assert!(matches!(**sum, Expr::Binary(_, BinaryOp::Add, ref r) if matches!(**r, Expr::Binary(_, BinaryOp::Mul, _))));
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("8 - 4 - 2").unwrap();
        assert!(matches!(expr, Expr::Binary(ref l, BinaryOp::Sub, ref r)
            if matches!(**l, Expr::Binary(..)) && matches!(**r, Expr::Number(n) if n == 2.0)));
    }

    #[test]
    fn test_invalid_expressions() {
        for bad in ["", "//b[", "//b]", "/a/", "count(", "'open", "a b", "//b[@id=]", "1 +", "foo::bar", "f(1,)", "$"] {
            assert!(parse(bad).is_err(), "expected `{}` to be rejected", bad);
        }
    }

    #[test]
    fn test_function() {
        let expr = parse("concat('a', 'b', 'c')").unwrap();
        assert!(matches!(expr, Expr::Function(ref name, ref args) if name == "concat" && args.len() == 3));
        assert!(matches!(parse("last()").unwrap(), Expr::Function(_, ref args) if args.is_empty()));
    }
}
