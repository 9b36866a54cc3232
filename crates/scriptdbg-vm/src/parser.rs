//! Script text parser
//!
//! Two grammars over the same whitespace-separated tokens:
//!
//! - [`parse_asm`] accepts assembly as printed by script explorers:
//!   `OP_`-prefixed mnemonics, explicit `OP_PUSHBYTES_n <hex>` /
//!   `OP_PUSHDATAn <hex>` pushes, bare hex data and small integers.
//! - [`parse_tokens`] is forgiving: hex, decimal numbers and mnemonics in
//!   any case, with or without the `OP_` prefix.
//!
//! [`parse`] tries the first and falls back to the second.

use crate::error::{ParseError, ParseResult};
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use tracing::debug;

/// Parse with the strict grammar, falling back to the lenient one
pub fn parse(text: &str) -> ParseResult<Vec<Instruction>> {
    with_fallback(parse_asm, parse_tokens)(text)
}

/// Combine two parsers: run `primary`, and on failure run `fallback`.
/// The fallback's error is the one reported.
pub fn with_fallback<P, F>(primary: P, fallback: F) -> impl Fn(&str) -> ParseResult<Vec<Instruction>>
where
    P: Fn(&str) -> ParseResult<Vec<Instruction>>,
    F: Fn(&str) -> ParseResult<Vec<Instruction>>,
{
    move |text| match primary(text) {
        Ok(instructions) => Ok(instructions),
        Err(err) => {
            debug!(%err, "strict parse failed, retrying leniently");
            fallback(text)
        }
    }
}

/// Lenient token-by-token parser
pub fn parse_tokens(text: &str) -> ParseResult<Vec<Instruction>> {
    tokens(text)
        .enumerate()
        .map(|(position, token)| parse_token(token, position))
        .collect()
}

/// Strict assembly parser
pub fn parse_asm(text: &str) -> ParseResult<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let mut tokens = tokens(text).enumerate();

    while let Some((position, token)) = tokens.next() {
        if let Some(data) = parse_hex(token) {
            instructions.push(Instruction::push(data));
            continue;
        }
        if let Some(value) = parse_small_int(token) {
            instructions.push(Instruction::push_num(value));
            continue;
        }

        let opcode = strict_mnemonic(token).ok_or_else(|| ParseError::UnexpectedToken {
            token: token.to_string(),
            position,
        })?;
        let Some(capacity) = opcode.push_capacity() else {
            instructions.push(Instruction::op(opcode));
            continue;
        };

        let data = tokens
            .next()
            .and_then(|(_, data)| parse_hex(data))
            .ok_or_else(|| ParseError::MissingPushData {
                opcode: opcode.name(),
                position,
            })?;
        let fits = if opcode.to_byte() <= 0x4b {
            data.len() == capacity
        } else {
            data.len() <= capacity
        };
        if !fits {
            return Err(ParseError::PushLengthMismatch {
                opcode: opcode.name(),
                len: data.len(),
                position,
            });
        }
        instructions.push(Instruction::push_with(opcode, data));
    }

    Ok(instructions)
}

/// Split into tokens, skipping comment lines
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .filter(|line| !is_comment(line))
        .flat_map(str::split_whitespace)
}

fn is_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('#') || line.starts_with("//")
}

fn parse_token(token: &str, position: usize) -> ParseResult<Instruction> {
    if let Some(data) = parse_hex(token) {
        return Ok(Instruction::push(data));
    }

    if is_decimal(token) {
        let value: i64 = token.parse().map_err(|_| ParseError::NumberOutOfRange {
            token: token.to_string(),
            position,
        })?;
        return Ok(Instruction::push_num(value));
    }

    let opcode = Opcode::from_name(token).ok_or_else(|| ParseError::UnknownOpcode {
        token: token.to_uppercase(),
        position,
    })?;
    if opcode.carries_data() {
        return Err(ParseError::MissingPushData {
            opcode: opcode.name(),
            position,
        });
    }
    Ok(Instruction::op(opcode))
}

/// Even-length, non-empty hex with an optional `0x` prefix
fn parse_hex(token: &str) -> Option<Vec<u8>> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    hex::decode(digits).ok()
}

fn is_decimal(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_small_int(token: &str) -> Option<i64> {
    if !is_decimal(token) {
        return None;
    }
    token
        .parse::<i64>()
        .ok()
        .filter(|value| (-1..=16).contains(value))
}

/// Uppercase `OP_` mnemonic, as the strict grammar requires
fn strict_mnemonic(token: &str) -> Option<Opcode> {
    if !token.starts_with("OP_") || token.bytes().any(|b| b.is_ascii_lowercase()) {
        return None;
    }
    Opcode::from_name(token)
}
