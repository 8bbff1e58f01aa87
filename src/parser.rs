use logos::Logos;

use crate::{error::LispyError, stack::ensure_sufficient_stack};


#[derive(Debug, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Token<'a> {
    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[regex(r"-?[0-9]+", |lex| lex.slice(), priority = 3)]
    Number(&'a str),

    #[regex(r"-?[0-9]*\.[0-9]+", |lex| lex.slice())]
    Decimal(&'a str),

    #[token("true", |lex| lex.slice())]
    #[token("false", |lex| lex.slice())]
    Boolean(&'a str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    String(&'a str),

    #[regex(r";[^\r\n]*", |lex| lex.slice())]
    Comment(&'a str),

    #[regex(r"[a-zA-Z0-9_+\-*/\\=<>!&%^|]+", |lex| lex.slice(), priority = 1)]
    Symbol(&'a str),
}

impl<'a> Token<'a> {
    fn describe(&self) -> String {
        match self {
            Self::LeftParen => "`(`".to_owned(),
            Self::RightParen => "`)`".to_owned(),
            Self::LeftBrace => "`{`".to_owned(),
            Self::RightBrace => "`}`".to_owned(),
            Self::Number(text) | Self::Decimal(text) | Self::Boolean(text)
            | Self::String(text) | Self::Comment(text) | Self::Symbol(text) => format!("`{}`", text),
        }
    }
}

/// The kind tag of a parsed node. Leaves carry their literal source text,
/// containers carry children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Number,
    Decimal,
    Boolean,
    String,
    Symbol,
    Comment,
    SExpr,
    QExpr,
    Root,
}

// Generic tagged tree handed to the value folder
#[derive(Debug, PartialEq)]
pub struct Node<'a> {
    pub kind: NodeKind,
    pub text: &'a str,
    pub children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    fn leaf(kind: NodeKind, text: &'a str) -> Self {
        Self { kind, text, children: Vec::new() }
    }

    fn container(kind: NodeKind, children: Vec<Self>) -> Self {
        Self { kind, text: "", children }
    }
}

type ParseResult<O> = Result<O, LispyError>;


fn lexer<'a>(input: &'a str) -> ParseResult<Vec<Token<'a>>> {
    let mut tokens = vec![];
    let mut tokenizer = Token::lexer(input);

    while let Some(result) = tokenizer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => return Err(LispyError::Syntax(format!(
                "unrecognised input `{}` at offset {}", tokenizer.slice(), tokenizer.span().start
            )))
        }
    }

    Ok(tokens)
}

fn unexpected(tokens: &[Token<'_>]) -> LispyError {
    match tokens.first() {
        Some(token) => LispyError::Syntax(format!("unexpected {}", token.describe())),
        None => LispyError::Syntax("unexpected end of input".to_owned()),
    }
}

fn parse_token<'a, 'b: 'a>(token_recognizer: impl Fn(&'a Token<'b>) -> bool) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], &'a Token<'b>)> {
    move |tokens| {
        match tokens.first() {
            Some(token) if token_recognizer(token) => Ok((&tokens[1..], token)),
            _ => Err(unexpected(tokens)),
        }
    }
}

fn parse_surrounds<'a, 'b: 'a, O>(
    start_recognizer: impl Fn(&'a Token<'b>) -> bool,
    internal_parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>,
    end_recognizer: impl Fn(&'a Token<'b>) -> bool,
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)> {
    let start_parser = parse_token(start_recognizer);
    let end_parser = parse_token(end_recognizer);

    move |tokens| {
        let (tokens, _) = start_parser(tokens)?;
        let (tokens, internal) = internal_parser(tokens)?;
        let (tokens, _) = end_parser(tokens)?;

        Ok((tokens, internal))
    }
}

fn parse_list<'a, 'b: 'a, O>(
    parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)>
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Vec<O>)> {
    move |mut tokens| {
        let mut result = vec![];

        while let Ok((new_tokens, value)) = parser(tokens) {
            result.push(value);
            tokens = new_tokens
        }

        Ok((tokens, result))
    }
}

fn parser_map<'a, 'b: 'a, I, O>(
    parser: impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], I)>,
    f: impl Fn(I) -> O
) -> impl Fn(&'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], O)> {
    move |tokens| {
        let (tokens, value) = parser(tokens)?;
        Ok((tokens, f(value)))
    }
}

fn parse_atom<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    let (rest, token) = parse_token(|token| !matches!(
        token,
        Token::LeftParen | Token::RightParen | Token::LeftBrace | Token::RightBrace
    ))(tokens)?;

    let node = match token {
        Token::Number(text) => Node::leaf(NodeKind::Number, *text),
        Token::Decimal(text) => Node::leaf(NodeKind::Decimal, *text),
        Token::Boolean(text) => Node::leaf(NodeKind::Boolean, *text),
        Token::String(text) => Node::leaf(NodeKind::String, *text),
        Token::Comment(text) => Node::leaf(NodeKind::Comment, *text),
        Token::Symbol(text) => Node::leaf(NodeKind::Symbol, *text),
        _ => return Err(unexpected(tokens)),
    };
    Ok((rest, node))
}

fn parse_sexpr<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    parse_surrounds(
        |token| matches!(token, Token::LeftParen),
        parser_map(
            parse_list(parse_expr),
            |children| Node::container(NodeKind::SExpr, children)
        ),
        |token| matches!(token, Token::RightParen)
    )(tokens)
}

fn parse_qexpr<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    parse_surrounds(
        |token| matches!(token, Token::LeftBrace),
        parser_map(
            parse_list(parse_expr),
            |children| Node::container(NodeKind::QExpr, children)
        ),
        |token| matches!(token, Token::RightBrace)
    )(tokens)
}

fn parse_expr<'a, 'b: 'a>(tokens: &'a [Token<'b>]) -> ParseResult<(&'a [Token<'b>], Node<'b>)> {
    ensure_sufficient_stack(|| match tokens.first() {
        Some(Token::LeftParen) => parse_sexpr(tokens),
        Some(Token::LeftBrace) => parse_qexpr(tokens),
        _ => parse_atom(tokens),
    })
}

/// Parses a whole REPL line or file into a `Root` node holding every
/// top-level expression in order.
pub fn parse<'a>(input: &'a str) -> ParseResult<Node<'a>> {
    let tokens = lexer(input)?;

    let (rest, children) = parse_list(parse_expr)(tokens.as_slice())?;
    if !rest.is_empty() {
        // Re-run the failing expression to report what actually went wrong
        return Err(match parse_expr(rest) {
            Err(error) => error,
            Ok(_) => unexpected(rest),
        });
    }

    Ok(Node::container(NodeKind::Root, children))
}
