// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! A minimal recursive-descent parser for the driver's statement file
//! format, comparable in scope to a teaching example rather than a
//! general SQL front-end (§1's explicit non-goal). It produces
//! [`ParsedQuery`] values, the one shape the core actually consumes.

use cmdbase::predicate::{Comparison, Condition, ExprKind, LogicOp, Operator};
use cmdbase::query::ParsedQuery;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Token<'a> {
    Ident(&'a str),
    Literal(&'a str),
    LParen,
    RParen,
    Comma,
    Op(&'a str),
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>, String> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut j = start;
                while j < bytes.len() && bytes[j] as char != quote {
                    j += 1;
                }
                if j >= bytes.len() {
                    return Err(format!("unterminated string literal at byte {i}"));
                }
                tokens.push(Token::Literal(&input[start..j]));
                i = j + 1;
            }
            '!' | '<' | '>' | '=' => {
                let start = i;
                i += 1;
                if i < bytes.len() && bytes[i] as char == '=' {
                    i += 1;
                }
                tokens.push(Token::Op(&input[start..i]));
            }
            _ => {
                let start = i;
                while i < bytes.len() {
                    let ch = bytes[i] as char;
                    if ch.is_whitespace() || "(),!<>=".contains(ch) {
                        break;
                    }
                    i += 1;
                }
                if i == start {
                    return Err(format!("unexpected character '{c}' at byte {i}"));
                }
                tokens.push(Token::Ident(&input[start..i]));
            }
        }
    }
    Ok(tokens)
}

struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_ident(&mut self) -> Result<&'a str, String> {
        match self.next() {
            Some(Token::Ident(s)) => Ok(s),
            other => Err(format!("expected identifier, found {other:?}")),
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Ident(s)) if s.eq_ignore_ascii_case(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), String> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(format!("expected keyword '{keyword}', found {:?}", self.peek()))
        }
    }
}

/// Parses one statement (already split on `;`) into a [`ParsedQuery`]
/// bound to `table` — the driver only ever talks to one table, so the
/// parser does not need a `FROM`/`INTO` clause to disambiguate, only to
/// recognize and skip over it.
pub fn parse_statement(statement: &str, table: &str) -> Result<ParsedQuery, String> {
    let tokens = tokenize(statement)?;
    let mut stream = TokenStream { tokens, pos: 0 };

    if stream.eat_keyword("SELECT") {
        parse_select(&mut stream, table)
    } else if stream.eat_keyword("INSERT") {
        parse_insert(&mut stream, table)
    } else if stream.eat_keyword("DELETE") {
        parse_delete(&mut stream, table)
    } else {
        Err(format!("unrecognized statement: '{statement}'"))
    }
}

fn parse_select(stream: &mut TokenStream, table: &str) -> Result<ParsedQuery, String> {
    let mut query = ParsedQuery::select(table);

    if stream.eat_keyword("*") {
        query.select_all = true;
    } else {
        let mut columns = vec![stream.expect_ident()?.to_string()];
        while matches!(stream.peek(), Some(Token::Comma)) {
            stream.next();
            columns.push(stream.expect_ident()?.to_string());
        }
        query.select_all = false;
        query.columns = columns;
    }

    stream.expect_keyword("FROM")?;
    stream.expect_ident()?; // table name, already bound by the driver

    if stream.eat_keyword("WHERE") {
        query.condition = Some(parse_condition(stream)?);
    }

    if stream.eat_keyword("ORDER") {
        stream.expect_keyword("BY")?;
        query.order_by = Some(stream.expect_ident()?.to_string());
        query.order_desc = stream.eat_keyword("DESC");
        let _ = stream.eat_keyword("ASC");
    }

    Ok(query)
}

fn parse_insert(stream: &mut TokenStream, table: &str) -> Result<ParsedQuery, String> {
    stream.expect_keyword("INTO")?;
    stream.expect_ident()?;
    stream.expect_keyword("VALUES")?;

    if stream.next() != Some(Token::LParen) {
        return Err("expected '(' after VALUES".to_string());
    }
    let mut values = Vec::new();
    loop {
        match stream.next() {
            Some(Token::Ident(s)) => values.push(s.to_string()),
            Some(Token::Literal(s)) => values.push(s.to_string()),
            other => return Err(format!("expected a value, found {other:?}")),
        }
        match stream.next() {
            Some(Token::Comma) => continue,
            Some(Token::RParen) => break,
            other => return Err(format!("expected ',' or ')', found {other:?}")),
        }
    }

    Ok(ParsedQuery::insert(table, values))
}

fn parse_delete(stream: &mut TokenStream, table: &str) -> Result<ParsedQuery, String> {
    stream.expect_keyword("FROM")?;
    stream.expect_ident()?;

    let mut query = ParsedQuery::delete(table);
    if stream.eat_keyword("WHERE") {
        query.condition = Some(parse_condition(stream)?);
    }
    Ok(query)
}

/// `condition := term (("AND" | "OR") term)*`, left-associative per §9's
/// explicit note: the parser does not guess standard-SQL `AND`-over-`OR`
/// precedence for an unparenthesized mix.
fn parse_condition(stream: &mut TokenStream) -> Result<Condition, String> {
    let mut nodes = vec![parse_term(stream)?];
    let mut ops = Vec::new();

    loop {
        if stream.eat_keyword("AND") {
            ops.push(LogicOp::And);
        } else if stream.eat_keyword("OR") {
            ops.push(LogicOp::Or);
        } else {
            break;
        }
        nodes.push(parse_term(stream)?);
    }
    ops.push(LogicOp::None);

    let mut iter = nodes.into_iter().zip(ops).rev();
    let (last_kind, _) = iter.next().ok_or("empty WHERE clause")?;
    let mut acc = Condition {
        kind: last_kind,
        logic_op: LogicOp::None,
        next: None,
    };
    for (kind, op) in iter {
        acc = Condition {
            kind,
            logic_op: op,
            next: Some(Box::new(acc)),
        };
    }
    Ok(acc)
}

fn parse_term(stream: &mut TokenStream) -> Result<ExprKind, String> {
    if stream.peek() == Some(Token::LParen) {
        stream.next();
        let inner = parse_condition(stream)?;
        if stream.next() != Some(Token::RParen) {
            return Err("expected closing ')'".to_string());
        }
        return Ok(ExprKind::Group(Box::new(inner)));
    }

    let attribute = stream.expect_ident()?.to_string();
    let operator = match stream.next() {
        Some(Token::Op(op)) => parse_operator(op)?,
        other => return Err(format!("expected a comparison operator, found {other:?}")),
    };
    let literal = match stream.next() {
        Some(Token::Ident(s)) => s.to_string(),
        Some(Token::Literal(s)) => s.to_string(),
        other => return Err(format!("expected a literal, found {other:?}")),
    };
    let numeric_flag = literal.parse::<f64>().is_ok();

    Ok(ExprKind::Comparison(Comparison {
        attribute,
        operator,
        literal,
        numeric_flag,
    }))
}

fn parse_operator(op: &str) -> Result<Operator, String> {
    match op {
        "=" => Ok(Operator::Eq),
        "!=" => Ok(Operator::Ne),
        "<" => Ok(Operator::Lt),
        "<=" => Ok(Operator::Le),
        ">" => Ok(Operator::Gt),
        ">=" => Ok(Operator::Ge),
        other => Err(format!("unknown operator '{other}'")),
    }
}

#[cfg(test)]
mod parser_test;
