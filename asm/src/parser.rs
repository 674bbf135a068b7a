//! Line-oriented source parser.
//!
//! The grammar is deliberately small: one statement per line, `;` or `#`
//! comments, `name:` labels, case-insensitive mnemonics, operands
//! separated by commas, numbers in decimal, `0x` hex, or `0o` octal, and
//! the `.org`/`.page` directives. The dialects give meaning to operand
//! identifiers later.

use crate::ast::{Arg, Item, Statement};
use crate::error::{AsmError, AsmErrorKind, Span};

pub fn parse(path: &str, source: &str) -> Result<Vec<Statement>, AsmError> {
    let mut statements = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line_no = index as u32 + 1;
        let line = strip_comment(raw);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let col = (line.len() - line.trim_start().len()) as u32 + 1;
        let span = Span { line: line_no, col };
        statements.push(parse_statement(path, trimmed, span)?);
    }
    Ok(statements)
}

fn strip_comment(line: &str) -> &str {
    match line.find([';', '#']) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_statement(path: &str, text: &str, span: Span) -> Result<Statement, AsmError> {
    let mut rest = text;
    let mut label = None;

    if let Some(pos) = rest.find(':') {
        // A colon inside an operand (a register pair like `c:d`) always
        // follows the mnemonic and its whitespace, so a label colon is
        // exactly one that appears before the first whitespace.
        let head = &rest[..pos];
        if !head.is_empty() && !head.contains(char::is_whitespace) {
            label = Some(head.to_string());
            rest = rest[pos + 1..].trim_start();
        }
    }

    if rest.is_empty() {
        return Ok(Statement {
            label,
            item: None,
            span,
        });
    }

    if let Some(directive) = rest.strip_prefix('.') {
        let item = parse_directive(path, directive, span)?;
        return Ok(Statement {
            label,
            item: Some(item),
            span,
        });
    }

    let (mnemonic, args_text) = match rest.find(char::is_whitespace) {
        Some(pos) => (&rest[..pos], rest[pos..].trim_start()),
        None => (rest, ""),
    };
    let mut args = Vec::new();
    if !args_text.is_empty() {
        for piece in args_text.split(',') {
            args.push(parse_arg(path, piece.trim(), span)?);
        }
    }
    Ok(Statement {
        label,
        item: Some(Item::Op {
            mnemonic: mnemonic.to_ascii_lowercase(),
            args,
        }),
        span,
    })
}

fn parse_directive(path: &str, text: &str, span: Span) -> Result<Item, AsmError> {
    let mut parts = text.split_whitespace();
    let name = parts.next().unwrap_or("");
    match name.to_ascii_lowercase().as_str() {
        "org" => {
            let arg = parts.next().ok_or_else(|| {
                AsmError::new(
                    path,
                    Some(span),
                    AsmErrorKind::WrongOperands {
                        op: ".org".to_string(),
                        expected: "an address",
                    },
                )
            })?;
            Ok(Item::Org(parse_number(path, arg, span)?))
        }
        "page" => {
            let name = parts.next().ok_or_else(|| {
                AsmError::new(
                    path,
                    Some(span),
                    AsmErrorKind::WrongOperands {
                        op: ".page".to_string(),
                        expected: "a name and a target bank",
                    },
                )
            })?;
            let target = parts.next().ok_or_else(|| {
                AsmError::new(
                    path,
                    Some(span),
                    AsmErrorKind::WrongOperands {
                        op: ".page".to_string(),
                        expected: "a name and a target bank",
                    },
                )
            })?;
            Ok(Item::Page {
                name: name.to_string(),
                target: parse_number(path, target, span)?,
            })
        }
        other => Err(AsmError::new(
            path,
            Some(span),
            AsmErrorKind::UnknownDirective(format!(".{other}")),
        )),
    }
}

fn parse_arg(path: &str, text: &str, span: Span) -> Result<Arg, AsmError> {
    if text.is_empty() {
        return Err(AsmError::new(
            path,
            Some(span),
            AsmErrorKind::Syntax("empty operand".to_string()),
        ));
    }
    let first = text.chars().next().unwrap_or(' ');
    if first.is_ascii_digit() {
        return Ok(Arg::Number(parse_number(path, text, span)?));
    }
    if text.contains(':') {
        return Ok(Arg::Pair(text.to_ascii_lowercase()));
    }
    Ok(Arg::Ident(text.to_string()))
}

pub(crate) fn parse_number(path: &str, text: &str, span: Span) -> Result<u32, AsmError> {
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if let Some(oct) = text.strip_prefix("0o").or_else(|| text.strip_prefix("0O")) {
        u32::from_str_radix(oct, 8)
    } else {
        text.parse()
    };
    parsed.map_err(|_| {
        AsmError::new(
            path,
            Some(span),
            AsmErrorKind::InvalidNumber(text.to_string()),
        )
    })
}
