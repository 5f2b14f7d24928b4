//! Decoding of Solr's serialized PHP format (`wt=phps`).
//!
//! Only the value types Solr emits are understood: arrays (`a:`), strings
//! (`s:`), integers (`i:`), doubles (`d:`), booleans (`b:`) and null (`N;`).
//! An array whose keys are exactly `0..n` in order becomes a JSON array,
//! anything else an object.

use serde_json::{Map, Value};

use crate::error::{Result, SolriumError};

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8]) -> Self {
        Parser { input, pos: 0 }
    }

    fn error(&self, message: &str) -> SolriumError {
        SolriumError::parse(format!("Invalid PHPS body at byte {}: {message}", self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }

    /// Read up to (and consume) the terminator.
    fn read_until(&mut self, terminator: u8) -> Result<&'a str> {
        let start = self.pos;
        let offset = self.input[start..]
            .iter()
            .position(|b| *b == terminator)
            .ok_or_else(|| self.error(&format!("missing '{}'", terminator as char)))?;
        self.pos = start + offset + 1;
        std::str::from_utf8(&self.input[start..start + offset]).map_err(|_| self.error("not UTF-8"))
    }

    fn read_len(&mut self) -> Result<usize> {
        let raw = self.read_until(b':')?;
        raw.parse::<usize>().map_err(|_| self.error("invalid length"))
    }

    fn value(&mut self) -> Result<Value> {
        let tag = self.peek().ok_or_else(|| self.error("unexpected end"))?;
        self.pos += 1;
        if tag == b'N' {
            self.expect(b';')?;
            return Ok(Value::Null);
        }
        self.expect(b':')?;
        match tag {
            b'b' => {
                let raw = self.read_until(b';')?;
                Ok(Value::Bool(raw == "1"))
            }
            b'i' => {
                let raw = self.read_until(b';')?;
                raw.parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| self.error("invalid integer"))
            }
            b'd' => {
                let raw = self.read_until(b';')?;
                match raw {
                    // not representable in JSON
                    "INF" | "-INF" | "NAN" => Ok(Value::Null),
                    _ => raw
                        .parse::<f64>()
                        .map(Value::from)
                        .map_err(|_| self.error("invalid double")),
                }
            }
            b's' => {
                let len = self.read_len()?;
                self.expect(b'"')?;
                let end = self
                    .pos
                    .checked_add(len)
                    .filter(|end| *end <= self.input.len())
                    .ok_or_else(|| self.error("string runs past end"))?;
                let text = std::str::from_utf8(&self.input[self.pos..end])
                    .map_err(|_| self.error("string not UTF-8"))?
                    .to_string();
                self.pos = end;
                self.expect(b'"')?;
                self.expect(b';')?;
                Ok(Value::String(text))
            }
            b'a' => {
                let count = self.read_len()?;
                self.expect(b'{')?;
                // Every entry takes at least one byte.
                let mut entries = Vec::with_capacity(count.min(self.input.len() - self.pos));
                for _ in 0..count {
                    let key = match self.value()? {
                        Value::String(s) => s,
                        Value::Number(n) => n.to_string(),
                        _ => return Err(self.error("invalid array key")),
                    };
                    let value = self.value()?;
                    entries.push((key, value));
                }
                self.expect(b'}')?;

                let sequential = entries
                    .iter()
                    .enumerate()
                    .all(|(i, (key, _))| key.parse::<usize>().ok() == Some(i));
                if sequential && !entries.is_empty() {
                    Ok(Value::Array(entries.into_iter().map(|(_, v)| v).collect()))
                } else {
                    let mut map = Map::new();
                    for (key, value) in entries {
                        map.insert(key, value);
                    }
                    Ok(Value::Object(map))
                }
            }
            other => Err(self.error(&format!("unknown type '{}'", other as char))),
        }
    }
}

/// Decode a `wt=phps` body.
pub fn decode(body: &[u8]) -> Result<Value> {
    let mut parser = Parser::new(body);
    let value = parser.value()?;
    if body[parser.pos..].iter().any(|b| !b.is_ascii_whitespace()) {
        return Err(parser.error("trailing data"));
    }
    Ok(value)
}
