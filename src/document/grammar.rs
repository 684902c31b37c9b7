use winnow::ascii::till_line_ending;
use winnow::combinator::{alt, cut_err, fail, opt, preceded, repeat};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use super::token::{Attribute, Token};

// -- Whitespace & comments --------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-')
        }),
    )
        .take()
        .parse_next(input)
}

// -- Strings ----------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

// -- Attributes -------------------------------------------------------------

fn attribute(input: &mut &str) -> ModalResult<Attribute> {
    let name = ident
        .context(StrContext::Expected(StrContextValue::Description(
            "attribute name",
        )))
        .parse_next(input)?;
    ws.parse_next(input)?;
    cut_err('=').parse_next(input)?;
    ws.parse_next(input)?;
    let value = cut_err(string_literal)
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted attribute value",
        )))
        .parse_next(input)?;
    Ok(Attribute::new(name, value))
}

fn attributes(input: &mut &str) -> ModalResult<Vec<Attribute>> {
    '('.parse_next(input)?;
    let mut attrs = Vec::new();
    loop {
        ws.parse_next(input)?;
        if opt(')').parse_next(input)?.is_some() {
            return Ok(attrs);
        }
        if !attrs.is_empty() {
            cut_err(',').parse_next(input)?;
            ws.parse_next(input)?;
        }
        attrs.push(cut_err(attribute).parse_next(input)?);
    }
}

// -- Elements ---------------------------------------------------------------

/// Deepest element nesting the text parser accepts.
pub const MAX_NESTING: usize = 256;

fn element(input: &mut &str, depth: usize) -> ModalResult<Vec<Token>> {
    if depth > MAX_NESTING {
        return cut_err(fail::<_, Vec<Token>, _>)
            .context(StrContext::Label("element, nested too deeply"))
            .parse_next(input);
    }
    let name = ident
        .context(StrContext::Expected(StrContextValue::Description("tag name")))
        .parse_next(input)?;
    let attributes = opt(preceded(ws, attributes))
        .parse_next(input)?
        .unwrap_or_default();

    let mut tokens = vec![Token::Open {
        name: name.to_owned(),
        attributes,
    }];

    if opt(preceded(ws, '{')).parse_next(input)?.is_some() {
        loop {
            ws.parse_next(input)?;
            if opt('}').parse_next(input)?.is_some() {
                break;
            }
            if input.starts_with('"') {
                tokens.push(Token::Text(cut_err(string_literal).parse_next(input)?));
            } else if input.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
                let child = cut_err(|i: &mut &str| element(i, depth + 1)).parse_next(input)?;
                tokens.extend(child);
            } else {
                return cut_err(fail::<_, Vec<Token>, _>)
                    .context(StrContext::Expected(StrContextValue::Description(
                        "element, text, or '}'",
                    )))
                    .parse_next(input);
            }
        }
    }

    tokens.push(Token::Close);
    Ok(tokens)
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_document(input: &mut &str) -> ModalResult<Vec<Token>> {
    ws.parse_next(input)?;
    let tokens = element(input, 1)?;
    ws.parse_next(input)?;
    Ok(tokens)
}
