use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
    iter::Peekable,
    mem,
    str::Chars,
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{io::DEFAULT_DEPTH_LIMIT, NbtCompound, NbtList, NbtTag};

lazy_static! {
    static ref FLOAT: Regex =
        Regex::new(r"(?i)^[-+]?(?:[0-9]+[.]?|[0-9]*[.][0-9]+)(?:e[-+]?[0-9]+)?f$").unwrap();
    static ref BYTE: Regex = Regex::new(r"(?i)^[-+]?(?:0|[1-9][0-9]*)b$").unwrap();
    static ref LONG: Regex = Regex::new(r"(?i)^[-+]?(?:0|[1-9][0-9]*)l$").unwrap();
    static ref SHORT: Regex = Regex::new(r"(?i)^[-+]?(?:0|[1-9][0-9]*)s$").unwrap();
    static ref INT: Regex = Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").unwrap();
    static ref DOUBLE: Regex =
        Regex::new(r"(?i)^[-+]?(?:[0-9]+[.]?|[0-9]*[.][0-9]+)(?:e[-+]?[0-9]+)?d$").unwrap();
    static ref DOUBLE_NO_SUFFIX: Regex =
        Regex::new(r"(?i)^[-+]?(?:[0-9]+[.]|[0-9]*[.][0-9]+)(?:e[-+]?[0-9]+)?$").unwrap();
}

/// Returns whether the given character may appear in unquoted strings and keys.
pub(super) fn is_unquoted_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.' | '+')
}

pub(super) fn parse_compound(input: &str, accept_legacy: bool) -> Result<NbtCompound, ParserError> {
    let mut parser = Parser::new(input, accept_legacy);
    let open_curly = parser.tokens.assert_next(Token::OpenCurly)?;
    parser.enter(&open_curly)?;
    let compound = parser.parse_compound(&open_curly)?;
    parser.finish()?;
    Ok(compound)
}

pub(super) fn parse_tag(input: &str, accept_legacy: bool) -> Result<NbtTag, ParserError> {
    let mut parser = Parser::new(input, accept_legacy);
    let tag = parser.parse_next_value()?;
    parser.finish()?;
    Ok(tag)
}

// Interprets an unquoted token, which is a number if it looks like one and a string otherwise
fn classify(text: String) -> NbtTag {
    fn strip(text: &str) -> &str {
        &text[.. text.len() - 1]
    }

    let number = if FLOAT.is_match(&text) {
        strip(&text).parse().ok().map(NbtTag::Float)
    } else if BYTE.is_match(&text) {
        strip(&text).parse().ok().map(NbtTag::Byte)
    } else if LONG.is_match(&text) {
        strip(&text).parse().ok().map(NbtTag::Long)
    } else if SHORT.is_match(&text) {
        strip(&text).parse().ok().map(NbtTag::Short)
    } else if INT.is_match(&text) {
        text.parse().ok().map(NbtTag::Int)
    } else if DOUBLE.is_match(&text) {
        strip(&text).parse().ok().map(NbtTag::Double)
    } else if DOUBLE_NO_SUFFIX.is_match(&text) {
        text.parse().ok().map(NbtTag::Double)
    } else if text == "true" {
        Some(NbtTag::Byte(1))
    } else if text == "false" {
        Some(NbtTag::Byte(0))
    } else {
        None
    };

    // Out of range numbers are kept as strings
    number.unwrap_or(NbtTag::String(text))
}

struct Parser<'a> {
    tokens: Lexer<'a>,
    accept_legacy: bool,
    depth: u32,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, accept_legacy: bool) -> Self {
        Parser {
            tokens: Lexer::new(input),
            accept_legacy,
            depth: 0,
        }
    }

    // Counts one more level of nesting for the compound or list opened by the given token
    fn enter(&mut self, open: &TokenData) -> Result<(), ParserError> {
        if self.depth >= DEFAULT_DEPTH_LIMIT {
            return Err(ParserError::depth_limit_exceeded(self.tokens.raw, open.position));
        }

        self.depth += 1;
        Ok(())
    }

    // Makes sure nothing but whitespace follows the root value
    fn finish(&mut self) -> Result<(), ParserError> {
        match self.tokens.next().transpose()? {
            Some(td) => Err(ParserError::trailing_data(self.tokens.raw, td.position)),
            None => Ok(()),
        }
    }

    // Parses the next value in the token stream
    fn parse_next_value(&mut self) -> Result<NbtTag, ParserError> {
        let token = self.tokens.next().transpose()?;
        self.parse_value(token)
    }

    // Parses a token into a value
    fn parse_value(&mut self, token: Option<TokenData>) -> Result<NbtTag, ParserError> {
        match token {
            // Open curly brace indicates a compound tag is present
            Some(
                td
                @
                TokenData {
                    token: Token::OpenCurly,
                    ..
                },
            ) => {
                self.enter(&td)?;
                let compound = self.parse_compound(&td)?;
                self.depth -= 1;
                Ok(compound.into())
            }

            // Open square brace indicates that some kind of list is present
            Some(
                td
                @
                TokenData {
                    token: Token::OpenSquare,
                    ..
                },
            ) => {
                self.enter(&td)?;
                let list = self.parse_list(&td)?;
                self.depth -= 1;
                Ok(list)
            }

            Some(TokenData {
                token: Token::Unquoted(text),
                ..
            }) => Ok(classify(text)),

            Some(TokenData {
                token: Token::Quoted(text),
                ..
            }) => Ok(NbtTag::String(text)),

            // A delimiter where a value should be
            Some(td) => Err(ParserError::unexpected_token(
                self.tokens.raw,
                Some(&td),
                "value",
            )),

            // We expected a value but ran out of data
            None => Err(ParserError::unexpected_eos("value")),
        }
    }

    // Returns the next token of a list, skipping a legacy index prefix such as the `0:` in `[0:a]`
    fn next_element_token(&mut self) -> Result<Option<TokenData>, ParserError> {
        let token = self.tokens.next().transpose()?;
        if !self.accept_legacy {
            return Ok(token);
        }

        let is_index = matches!(
            &token,
            Some(TokenData { token: Token::Unquoted(text), .. })
                if text.bytes().all(|b| b.is_ascii_digit())
        );
        if is_index
            && matches!(self.tokens.peek(), Some(Ok(TokenData {
                token: Token::Colon,
                ..
            })))
        {
            // Move past the colon
            self.tokens.next().transpose()?;
            return self.tokens.next().transpose();
        }

        Ok(token)
    }

    // Parses a list, which can be either a generic tag list or an array of primitives
    fn parse_list(&mut self, open_square: &TokenData) -> Result<NbtTag, ParserError> {
        let first = self.next_element_token()?;

        // A string followed by a semicolon is the type specifier of an array, such as in [I; 1, 2]
        let is_array = matches!(&first, Some(TokenData {
            token: Token::Unquoted(_),
            ..
        })) && matches!(self.tokens.peek(), Some(Ok(TokenData {
            token: Token::Semicolon,
            ..
        })));

        match first {
            // Empty list ('[]') with no type specifier is treated as an empty NBT tag list
            Some(TokenData {
                token: Token::ClosedSquare,
                ..
            }) => Ok(NbtList::new().into()),

            Some(TokenData {
                token: Token::Unquoted(specifier),
                position,
                width,
            }) if is_array => {
                // Move past the semicolon
                self.tokens.next().transpose()?;

                match specifier.as_str() {
                    "b" | "B" => self
                        .parse_array(|tag| match tag {
                            NbtTag::Byte(value) => Some(value),
                            NbtTag::Int(value) => i8::try_from(value).ok(),
                            _ => None,
                        })
                        .map(NbtTag::ByteArray),
                    "i" | "I" => self
                        .parse_array(|tag| match tag {
                            NbtTag::Int(value) => Some(value),
                            _ => None,
                        })
                        .map(NbtTag::IntArray),
                    "l" | "L" => self
                        .parse_array(|tag| match tag {
                            NbtTag::Long(value) => Some(value),
                            NbtTag::Int(value) => Some(value as i64),
                            _ => None,
                        })
                        .map(NbtTag::LongArray),
                    _ => Err(ParserError::unexpected_token_at(
                        self.tokens.raw,
                        position,
                        width,
                        "'B', 'I', or 'L'",
                    )),
                }
            }

            // Any other pattern is delegated to the general tag list parser
            td => {
                let first_element = self.parse_value(td)?;
                self.parse_tag_list(open_square, first_element)
                    .map(Into::into)
            }
        }
    }

    // Parses the elements of an array after its semicolon, converting each with the given function
    fn parse_array<T, F>(&mut self, convert: F) -> Result<Vec<T>, ParserError>
    where F: Fn(NbtTag) -> Option<T> {
        let mut values = Vec::new();

        loop {
            let td = match self.tokens.next().transpose()? {
                Some(TokenData {
                    token: Token::ClosedSquare,
                    ..
                }) if values.is_empty() => return Ok(values),
                Some(td) => td,
                None => return Err(ParserError::unexpected_eos("array element")),
            };

            let (position, width) = (td.position, td.width);
            let value = match td.token {
                Token::Unquoted(text) => convert(classify(text)),
                Token::Quoted(_) => None,
                _ =>
                    return Err(ParserError::unexpected_token_at(
                        self.tokens.raw,
                        position,
                        width,
                        "array element",
                    )),
            };

            match value {
                Some(value) => values.push(value),
                None =>
                    return Err(ParserError::invalid_array_element(
                        self.tokens.raw,
                        position,
                        width,
                    )),
            }

            match self.tokens.next().transpose()? {
                Some(TokenData {
                    token: Token::ClosedSquare,
                    ..
                }) => return Ok(values),
                Some(TokenData {
                    token: Token::Comma,
                    ..
                }) => {}
                td =>
                    return Err(ParserError::unexpected_token(
                        self.tokens.raw,
                        td.as_ref(),
                        "',' or ']'",
                    )),
            }
        }
    }

    fn parse_tag_list(
        &mut self,
        open_square: &TokenData,
        first_element: NbtTag,
    ) -> Result<NbtList, ParserError>
    {
        // The first element determines the list's type
        let mut list = NbtList::new();
        list.add(first_element)
            .map_err(|_| ParserError::non_homogenous_list(self.tokens.raw, open_square.position))?;

        loop {
            match self.tokens.next().transpose()? {
                // Finish off the list
                Some(TokenData {
                    token: Token::ClosedSquare,
                    ..
                }) => return Ok(list),

                // Indicates another value should be parsed
                Some(TokenData {
                    token: Token::Comma,
                    ..
                }) => {
                    let token = self.next_element_token()?;
                    let element = self.parse_value(token)?;

                    // Ensure type homogeneity
                    if list.add(element).is_err() {
                        return Err(ParserError::non_homogenous_list(
                            self.tokens.raw,
                            open_square.position,
                        ));
                    }
                }

                // Some invalid token
                td =>
                    return Err(ParserError::unexpected_token(
                        self.tokens.raw,
                        td.as_ref(),
                        "',' or ']'",
                    )),
            }
        }
    }

    fn parse_compound(&mut self, open_curly: &TokenData) -> Result<NbtCompound, ParserError> {
        let mut compound = NbtCompound::new();
        let mut expect_key = true;
        let mut trailing_comma: Option<usize> = None;

        loop {
            match self.tokens.next().transpose()? {
                // Finish off the compound tag
                Some(TokenData {
                    token: Token::ClosedCurly,
                    ..
                }) => match trailing_comma {
                    Some(position) =>
                        return Err(ParserError::trailing_comma(self.tokens.raw, position)),
                    None => return Ok(compound),
                },

                // Parse a new key-value pair
                Some(TokenData {
                    token: Token::Unquoted(key) | Token::Quoted(key),
                    position,
                    width,
                }) => {
                    // There was not a comma before this key so the token is unexpected
                    if !expect_key {
                        return Err(ParserError::unexpected_token_at(
                            self.tokens.raw,
                            position,
                            width,
                            Token::Comma.as_expectation(),
                        ));
                    }

                    self.tokens.assert_next(Token::Colon)?;
                    let value = self.parse_next_value()?;
                    compound.set(key, value);
                    expect_key = false;
                    trailing_comma = None;
                }

                // Denote that another key-value pair is anticipated
                Some(TokenData {
                    token: Token::Comma,
                    position,
                    ..
                }) if !expect_key => {
                    expect_key = true;
                    trailing_comma = Some(position);
                }

                // Catch-all for unexpected tokens
                Some(td) =>
                    return Err(ParserError::unexpected_token(
                        self.tokens.raw,
                        Some(&td),
                        if expect_key {
                            "compound key or '}'"
                        } else {
                            "',' or '}'"
                        },
                    )),

                // End of input / unmatched brace
                None =>
                    return Err(ParserError::unmatched_brace(
                        self.tokens.raw,
                        open_curly.position,
                    )),
            }
        }
    }
}

struct Lexer<'a> {
    raw: &'a str,
    chars: Peekable<Chars<'a>>,
    // Column of the next character, counted in characters
    position: usize,
    buffer: String,
    errored: bool,
    peeked: Option<Option<<Self as Iterator>::Item>>,
}

impl<'a> Lexer<'a> {
    fn new(raw: &'a str) -> Self {
        Lexer {
            raw,
            chars: raw.chars().peekable(),
            position: 0,
            buffer: String::with_capacity(16),
            errored: false,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Option<&<Self as Iterator>::Item> {
        if self.peeked.is_none() {
            let next = self.lex();
            self.peeked = Some(next);
        }

        self.peeked.as_ref().and_then(Option::as_ref)
    }

    // Asserts that the next token is the same type as the provided token
    fn assert_next(&mut self, token: Token) -> Result<TokenData, ParserError> {
        match self.next().transpose()? {
            Some(td) =>
                if mem::discriminant(&td.token) == mem::discriminant(&token) {
                    Ok(td)
                } else {
                    Err(ParserError::unexpected_token(
                        self.raw,
                        Some(&td),
                        token.as_expectation(),
                    ))
                },

            // No tokens were left so return an unexpected end of input error
            None => Err(ParserError::unexpected_eos(token.as_expectation())),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += 1;
        Some(ch)
    }

    fn lex(&mut self) -> Option<Result<TokenData, ParserError>> {
        // If we encountered an error then cancel the token provision
        if self.errored {
            return None;
        }

        while self.chars.peek()?.is_whitespace() {
            self.bump();
        }

        let position = self.position;
        let token = match *self.chars.peek()? {
            '{' => Token::OpenCurly,
            '}' => Token::ClosedCurly,
            '[' => Token::OpenSquare,
            ']' => Token::ClosedSquare,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            _ => {
                let result = self.slurp_token();
                if result.is_err() {
                    self.errored = true;
                }
                return Some(result);
            }
        };

        self.bump();
        Some(Ok(TokenData::new(token, position, 1)))
    }

    // Collects a multi-character token
    fn slurp_token(&mut self) -> Result<TokenData, ParserError> {
        let start = self.position;
        self.buffer.clear();

        match self.bump() {
            Some(quote @ ('\'' | '"')) => self.slurp_quoted(start, quote),
            Some(ch) if is_unquoted_char(ch) => {
                self.buffer.push(ch);
                self.slurp_unquoted(start)
            }
            Some(_) => Err(ParserError::unexpected_token_at(self.raw, start, 1, "value")),
            None => Err(ParserError::unexpected_eos("value")),
        }
    }

    fn slurp_unquoted(&mut self, start: usize) -> Result<TokenData, ParserError> {
        while let Some(&ch) = self.chars.peek() {
            if is_unquoted_char(ch) {
                self.buffer.push(ch);
                self.bump();
            } else if ch == '\'' || ch == '"' {
                return Err(ParserError::unexpected_quote(self.raw, self.position));
            } else {
                break;
            }
        }

        Ok(TokenData::new(
            Token::Unquoted(mem::take(&mut self.buffer)),
            start,
            self.position - start,
        ))
    }

    fn slurp_quoted(&mut self, start: usize, quote: char) -> Result<TokenData, ParserError> {
        loop {
            match self.bump() {
                Some('\\') => {
                    let escape = self.position - 1;
                    let unescaped = match self.bump() {
                        Some(ch @ ('\'' | '"' | '\\')) => ch,
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('u') => self.unicode_escape(escape)?,
                        Some(_) =>
                            return Err(ParserError::unknown_escape_sequence(self.raw, escape, 2)),
                        // Unexpected end of input / unmatched quotation
                        None => return Err(ParserError::unmatched_quote(self.raw, start)),
                    };
                    self.buffer.push(unescaped);
                }

                // Close off the string if the quote type matches
                Some(ch) if ch == quote => break,

                Some(ch) => self.buffer.push(ch),

                None => return Err(ParserError::unmatched_quote(self.raw, start)),
            }
        }

        Ok(TokenData::new(
            Token::Quoted(mem::take(&mut self.buffer)),
            start,
            self.position - start,
        ))
    }

    // Reads the four hex digits of a `\u` escape
    fn unicode_escape(&mut self, escape: usize) -> Result<char, ParserError> {
        let mut code = 0;
        for _ in 0 .. 4 {
            let digit = self
                .bump()
                .ok_or_else(|| ParserError::unmatched_quote(self.raw, escape))?
                .to_digit(16)
                .ok_or_else(|| ParserError::unknown_escape_sequence(self.raw, escape, 6))?;
            code = code * 16 + digit;
        }

        char::from_u32(code).ok_or_else(|| ParserError::unknown_escape_sequence(self.raw, escape, 6))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<TokenData, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.peeked.take() {
            Some(item) => item,
            None => self.lex(),
        }
    }
}

#[derive(Debug)]
struct TokenData {
    token: Token,
    position: usize,
    width: usize,
}

impl TokenData {
    fn new(token: Token, position: usize, width: usize) -> Self {
        TokenData {
            token,
            position,
            width,
        }
    }
}

#[derive(Debug)]
enum Token {
    OpenCurly,
    ClosedCurly,
    OpenSquare,
    ClosedSquare,
    Comma,
    Colon,
    Semicolon,
    Unquoted(String),
    Quoted(String),
}

impl Token {
    fn as_expectation(&self) -> &'static str {
        match self {
            Token::OpenCurly => "'{'",
            Token::ClosedCurly => "'}'",
            Token::OpenSquare => "'['",
            Token::ClosedSquare => "']'",
            Token::Comma => "','",
            Token::Colon => "':'",
            Token::Semicolon => "';'",
            _ => "value",
        }
    }
}

/// An error that occurs during the parsing process.
#[derive(Clone)]
pub struct ParserError {
    segment: String,
    error: ParserErrorType,
}

impl ParserError {
    /// Returns the column at which the error occurred, if it occurred before the end of the input.
    pub fn column(&self) -> Option<usize> {
        match self.error {
            ParserErrorType::UnmatchedQuote { position }
            | ParserErrorType::UnexpectedQuote { position }
            | ParserErrorType::UnknownEscapeSequence { position }
            | ParserErrorType::UnexpectedToken { position, .. }
            | ParserErrorType::TrailingComma { position }
            | ParserErrorType::UnmatchedBrace { position }
            | ParserErrorType::NonHomogenousList { position }
            | ParserErrorType::InvalidArrayElement { position }
            | ParserErrorType::TrailingData { position }
            | ParserErrorType::DepthLimitExceeded { position } => Some(position),
            ParserErrorType::UnexpectedEOS { .. } => None,
        }
    }

    /// Returns the part of the input near the error.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    fn unmatched_quote(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 7, 7),
            error: ParserErrorType::UnmatchedQuote { position },
        }
    }

    fn unexpected_quote(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 7, 7),
            error: ParserErrorType::UnexpectedQuote { position },
        }
    }

    fn unknown_escape_sequence(input: &str, position: usize, width: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, width, 0, 0),
            error: ParserErrorType::UnknownEscapeSequence { position },
        }
    }

    fn unexpected_token(input: &str, token: Option<&TokenData>, expected: &'static str) -> Self {
        match token {
            Some(token) => Self::unexpected_token_at(input, token.position, token.width, expected),
            None => Self::unexpected_eos(expected),
        }
    }

    fn unexpected_token_at(
        input: &str,
        position: usize,
        width: usize,
        expected: &'static str,
    ) -> Self
    {
        ParserError {
            segment: Self::segment_of(input, position, width, 15, 0),
            error: ParserErrorType::UnexpectedToken { position, expected },
        }
    }

    fn unexpected_eos(expected: &'static str) -> Self {
        ParserError {
            segment: String::new(),
            error: ParserErrorType::UnexpectedEOS { expected },
        }
    }

    fn trailing_comma(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 15, 1),
            error: ParserErrorType::TrailingComma { position },
        }
    }

    fn unmatched_brace(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 0, 15),
            error: ParserErrorType::UnmatchedBrace { position },
        }
    }

    fn non_homogenous_list(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 0, 15),
            error: ParserErrorType::NonHomogenousList { position },
        }
    }

    fn invalid_array_element(input: &str, position: usize, width: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, width, 0, 0),
            error: ParserErrorType::InvalidArrayElement { position },
        }
    }

    fn trailing_data(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 0, 15),
            error: ParserErrorType::TrailingData { position },
        }
    }

    fn depth_limit_exceeded(input: &str, position: usize) -> Self {
        ParserError {
            segment: Self::segment_of(input, position, 1, 0, 15),
            error: ParserErrorType::DepthLimitExceeded { position },
        }
    }

    // Positions are character columns, so the segment is cut by characters rather than bytes
    fn segment_of(input: &str, index: usize, width: usize, before: usize, after: usize) -> String {
        let start = index - usize::min(before, index);
        let end = index + width.min(20) + after;
        input.chars().skip(start).take(end - start).collect()
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.error {
            &ParserErrorType::UnmatchedQuote { position } => write!(
                f,
                "Unmatched quote: column {} near '{}'",
                position, self.segment
            ),
            &ParserErrorType::UnexpectedQuote { position } => write!(
                f,
                "Unexpected quote: column {} near '{}'",
                position, self.segment
            ),
            &ParserErrorType::UnknownEscapeSequence { .. } =>
                write!(f, "Unknown escape sequence: '{}'", self.segment),
            &ParserErrorType::UnexpectedToken { position, expected } => write!(
                f,
                "Unexpected token at column {}, expected {}: '{}'",
                position, expected, self.segment
            ),
            &ParserErrorType::UnexpectedEOS { expected } =>
                write!(f, "Reached end of input but expected {}", expected),
            &ParserErrorType::TrailingComma { position } => write!(
                f,
                "Trailing comma at column {}: '{}'",
                position, self.segment
            ),
            &ParserErrorType::UnmatchedBrace { position } => write!(
                f,
                "Unmatched brace at column {} near '{}'",
                position, self.segment
            ),
            &ParserErrorType::NonHomogenousList { position } => write!(
                f,
                "Non-homogenous typed list at column {} near '{}'",
                position, self.segment
            ),
            &ParserErrorType::InvalidArrayElement { position } => write!(
                f,
                "Invalid array element at column {}: '{}'",
                position, self.segment
            ),
            &ParserErrorType::TrailingData { position } => write!(
                f,
                "Trailing data at column {} near '{}'",
                position, self.segment
            ),
            &ParserErrorType::DepthLimitExceeded { position } => write!(
                f,
                "Nesting deeper than {} levels at column {} near '{}'",
                DEFAULT_DEPTH_LIMIT, position, self.segment
            ),
        }
    }
}

impl Debug for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.error, f)
    }
}

impl Error for ParserError {}

#[derive(Clone, Debug)]
enum ParserErrorType {
    UnmatchedQuote {
        position: usize,
    },
    UnexpectedQuote {
        position: usize,
    },
    UnknownEscapeSequence {
        position: usize,
    },
    UnexpectedToken {
        position: usize,
        expected: &'static str,
    },
    UnexpectedEOS {
        expected: &'static str,
    },
    TrailingComma {
        position: usize,
    },
    UnmatchedBrace {
        position: usize,
    },
    NonHomogenousList {
        position: usize,
    },
    InvalidArrayElement {
        position: usize,
    },
    TrailingData {
        position: usize,
    },
    DepthLimitExceeded {
        position: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagType;

    fn tag(input: &str) -> NbtTag {
        parse_tag(input, false).expect("Failed to parse tag")
    }

    fn message(input: &str) -> String {
        parse_tag(input, false).expect_err("Parsed invalid SNBT").to_string()
    }

    #[test]
    fn numbers() {
        assert_eq!(tag("1b"), NbtTag::Byte(1));
        assert_eq!(tag("-128B"), NbtTag::Byte(-128));
        assert_eq!(tag("+7s"), NbtTag::Short(7));
        assert_eq!(tag("42"), NbtTag::Int(42));
        assert_eq!(tag("9000000000L"), NbtTag::Long(9_000_000_000));
        assert_eq!(tag("1.5f"), NbtTag::Float(1.5));
        assert_eq!(tag("2f"), NbtTag::Float(2.0));
        assert_eq!(tag("2.5"), NbtTag::Double(2.5));
        assert_eq!(tag(".5d"), NbtTag::Double(0.5));
        assert_eq!(tag("3d"), NbtTag::Double(3.0));
        assert_eq!(tag("1e3"), NbtTag::String("1e3".to_owned()));
        assert_eq!(tag("1.e3"), NbtTag::Double(1000.0));
    }

    #[test]
    fn numeric_looking_strings() {
        assert_eq!(tag("128b"), NbtTag::from("128b"));
        assert_eq!(tag("01"), NbtTag::from("01"));
        assert_eq!(tag("1x"), NbtTag::from("1x"));
        assert_eq!(tag("3000000000"), NbtTag::from("3000000000"));
        assert_eq!(tag("minecraft.stone_1"), NbtTag::from("minecraft.stone_1"));
    }

    #[test]
    fn booleans() {
        assert_eq!(tag("true"), NbtTag::Byte(1));
        assert_eq!(tag("false"), NbtTag::Byte(0));
        assert_eq!(tag("'true'"), NbtTag::from("true"));
    }

    #[test]
    fn strings() {
        assert_eq!(tag("'a \"b\"'"), NbtTag::from("a \"b\""));
        assert_eq!(tag(r#""a\\b\n\tA""#), NbtTag::from("a\\b\n\tA"));
        assert_eq!(tag(r#"'\b\f'"#), NbtTag::from("\u{8}\u{c}"));
        assert_eq!(tag("''"), NbtTag::from(""));
        assert_eq!(tag("\"héllo\""), NbtTag::from("héllo"));
    }

    #[test]
    fn compounds() {
        let compound = parse_compound("{a: 1, 'b c': {}, \"d\": [I;], 0: x}", false)
            .expect("Failed to parse compound");
        assert_eq!(compound.get_int("a"), Some(1));
        assert_eq!(compound.get_compound("b c").map(NbtCompound::len), Some(0));
        assert_eq!(compound.get_int_array("d"), Some(&[][..]));
        assert_eq!(compound.get_string("0"), Some("x"));
        assert_eq!(
            compound.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["a", "b c", "d", "0"]
        );
    }

    #[test]
    fn lists() {
        match tag("[1, 2, 3]") {
            NbtTag::List(list) => {
                assert_eq!(list.element_type(), TagType::Int);
                assert_eq!(list.len(), 3);
            }
            other => panic!("Expected a list, found {:?}", other),
        }

        assert_eq!(tag("[]"), NbtTag::List(NbtList::new()));
        assert!(matches!(tag("[[], [1b]]"), NbtTag::List(list) if list.element_type() == TagType::List));
    }

    #[test]
    fn arrays() {
        assert_eq!(tag("[B; 1b, 2, true]"), NbtTag::ByteArray(vec![1, 2, 1]));
        assert_eq!(tag("[I;1,-2]"), NbtTag::IntArray(vec![1, -2]));
        assert_eq!(tag("[L; 1l, 2]"), NbtTag::LongArray(vec![1, 2]));
        assert_eq!(tag("[L;]"), NbtTag::LongArray(Vec::new()));
    }

    #[test]
    fn array_errors() {
        assert!(message("[B; 128]").starts_with("Invalid array element at column 4"));
        assert!(message("[I; 1b]").starts_with("Invalid array element"));
        assert!(message("[I; 'a']").starts_with("Invalid array element"));
        assert!(message("[I; 1,]").starts_with("Unexpected token at column 6, expected array element"));
        assert!(message("[X; 1]").starts_with("Unexpected token at column 1"));
    }

    #[test]
    fn legacy_indices() {
        let tag = parse_tag("[0: a, 1: b]", true).expect("Failed to parse legacy list");
        assert_eq!(
            tag,
            NbtTag::List(
                NbtList::of(TagType::String, vec![NbtTag::from("a"), NbtTag::from("b")])
                    .expect("Failed to build list")
            )
        );

        assert!(parse_tag("[0: a]", false).is_err());
        // An index is only skipped when followed by a colon
        assert_eq!(
            parse_tag("[0, 1]", true).expect("Failed to parse list"),
            parse_tag("[0, 1]", false).expect("Failed to parse list")
        );
    }

    #[test]
    fn structural_errors() {
        assert!(message("{a:1,}").starts_with("Trailing comma at column 4"));
        assert!(message("{a:1").starts_with("Unmatched brace at column 0"));
        assert!(message("{a:1 b:2}").starts_with("Unexpected token at column 5, expected ','"));
        assert!(message("[1, 2b]").starts_with("Non-homogenous typed list at column 0"));
        assert!(message("{a:1} x").starts_with("Trailing data at column 6"));
        assert!(message("'abc").starts_with("Unmatched quote: column 0"));
        assert!(message("ab'c'").starts_with("Unexpected quote: column 2"));
        assert!(message("'\\q'").starts_with("Unknown escape sequence"));
        assert_eq!(message("{a:"), "Reached end of input but expected value");
    }

    #[test]
    fn error_columns() {
        let error = parse_tag("{a: @}", false).expect_err("Parsed invalid SNBT");
        assert_eq!(error.column(), Some(4));
        assert_eq!(error.segment(), "{a: @");

        let error = parse_tag("['é', 1]", false).expect_err("Parsed invalid SNBT");
        assert_eq!(error.column(), Some(0));
    }

    #[test]
    fn compound_root_required() {
        assert!(parse_compound("[1]", false).is_err());
        assert!(parse_compound("  {}  ", false).is_ok());
    }

    #[test]
    fn nesting_limit() {
        // Unoptimized builds need more stack than the default test thread has for 512 levels
        let result = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let error = parse_tag(&"[".repeat(600), false).expect_err("Parsed unbounded nesting");
                assert_eq!(error.column(), Some(512));
                assert!(error.to_string().starts_with("Nesting deeper than 512 levels at column 512"));

                let limit = format!("{}1{}", "[".repeat(512), "]".repeat(512));
                assert!(parse_tag(&limit, false).is_ok());
                let over = format!("{}1{}", "[".repeat(513), "]".repeat(513));
                assert!(parse_tag(&over, false).is_err());

                let compounds = format!("{}{{}}{}", "{a:".repeat(511), "}".repeat(511));
                assert!(parse_compound(&compounds, false).is_ok());
                let compounds = format!("{}{{}}{}", "{a:".repeat(512), "}".repeat(512));
                assert!(parse_compound(&compounds, false).is_err());
            })
            .expect("Failed to spawn parser thread")
            .join();
        assert!(result.is_ok());
    }
}
