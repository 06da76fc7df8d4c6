//! Lexical building blocks shared by the statement and expression parsers

use winnow::ascii::Caseless;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{literal, one_of, take_while};

pub type Input<'a> = &'a str;
pub type PResult<O> = Result<O, ContextError>;

/// Error used to signal "this alternative does not apply"
pub fn backtrack() -> ContextError {
    ContextError::new()
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Skip whitespace
pub fn ws(input: &mut Input<'_>) -> PResult<()> {
    take_while(0.., char::is_whitespace).void().parse_next(input)
}

/// Exact punctuation, no surrounding whitespace
pub fn lit<'a>(s: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    literal(s)
}

/// Punctuation preceded by optional whitespace
pub fn punct<'a>(s: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| {
        let checkpoint = *input;
        ws(input)?;
        lit(s).parse_next(input).inspect_err(|_| *input = checkpoint)
    }
}

fn caseless<'a>(word: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    literal(Caseless(word))
}

/// Case-insensitive keyword that must end on a word boundary
pub fn keyword<'a>(word: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| {
        let checkpoint = *input;
        let matched = caseless(word).parse_next(input)?;
        if input.chars().next().is_some_and(is_ident_char) {
            *input = checkpoint;
            return Err(backtrack());
        }
        Ok(matched)
    }
}

/// Keyword preceded by optional whitespace; restores the input on failure
pub fn padded_keyword<'a>(word: &'static str) -> impl Parser<Input<'a>, &'a str, ContextError> {
    move |input: &mut Input<'a>| {
        let checkpoint = *input;
        ws(input)?;
        keyword(word).parse_next(input).inspect_err(|_| *input = checkpoint)
    }
}

/// Whether the next token (after whitespace) is the given keyword, without consuming it
pub fn peek_keyword(input: &Input<'_>, word: &'static str) -> bool {
    let mut lookahead = *input;
    padded_keyword(word).parse_next(&mut lookahead).is_ok()
}

/// Whether the next non-whitespace text starts with `s`, without consuming it
pub fn peek_punct(input: &Input<'_>, s: &str) -> bool {
    input.trim_start().starts_with(s)
}

/// Any identifier-shaped token, reserved words included
pub fn ident_token<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (one_of(is_ident_start), take_while(0.., is_ident_char))
        .take()
        .parse_next(input)
}

/// An identifier that is not a reserved word, preceded by optional whitespace
pub fn identifier(input: &mut Input<'_>) -> PResult<String> {
    let checkpoint = *input;
    ws(input)?;
    match ident_token(input) {
        Ok(token) if !is_reserved(token) => Ok(token.to_string()),
        _ => {
            *input = checkpoint;
            Err(backtrack())
        }
    }
}

/// An identifier-shaped token regardless of reserved status
pub fn any_identifier(input: &mut Input<'_>) -> PResult<String> {
    let checkpoint = *input;
    ws(input)?;
    ident_token(input)
        .map(str::to_string)
        .inspect_err(|_| *input = checkpoint)
}

/// Words that structure a statement and so can never be used as a bare identifier
pub fn is_reserved(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "select"
            | "from"
            | "where"
            | "join"
            | "inner"
            | "left"
            | "right"
            | "full"
            | "outer"
            | "cross"
            | "fetch"
            | "on"
            | "with"
            | "as"
            | "and"
            | "or"
            | "not"
            | "in"
            | "is"
            | "null"
            | "empty"
            | "between"
            | "like"
            | "escape"
            | "member"
            | "of"
            | "order"
            | "by"
            | "limit"
            | "offset"
            | "new"
            | "distinct"
            | "update"
            | "set"
            | "delete"
            | "insert"
            | "into"
            | "case"
            | "when"
            | "then"
            | "else"
            | "end"
            | "exists"
            | "true"
            | "false"
            | "collate"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_is_case_insensitive() {
        let mut input = "SeLeCt a";
        assert!(keyword("select").parse_next(&mut input).is_ok());
        assert_eq!(input, " a");
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        let mut input = "selection";
        assert!(keyword("select").parse_next(&mut input).is_err());
        assert_eq!(input, "selection");
    }

    #[test]
    fn test_identifier_rejects_reserved_words() {
        let mut input = "  from";
        assert!(identifier(&mut input).is_err());
        assert_eq!(input, "  from");

        let mut input = "  count";
        assert_eq!(identifier(&mut input).ok().as_deref(), Some("count"));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let input = "  where a.x = 1";
        assert!(peek_keyword(&input, "where"));
        assert!(!peek_keyword(&input, "order"));
        assert_eq!(input, "  where a.x = 1");
    }
}
