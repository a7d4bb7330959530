//! Purpose: Provide the JSON decode entrypoints that fill an `Arena`.
//! Exports: `JsonParser`, `ParseOptions`, `categorize_error`, `categorize_message`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Decoding streams straight into the arena; no intermediate `serde_json::Value`.
//! Invariants: Object members keep document order and duplicate keys.
//! Invariants: Every failure maps to `ErrorKind::Parse` with a stable category.
//! Invariants: Numbers keep their source text, so out-of-range exponents still parse.
//! Notes: serde_json enforces its own nesting cap of 128 on top of `max_depth`.
//! Notes: With `arbitrary_precision`, serde_json hands non-`i64`/`u64` numbers to
//! `visit_map` as a one-entry map keyed by `NUMBER_TOKEN`.
use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde_json::Number;
use serde_json::error::Category;

use crate::core::arena::{Arena, NODE_LIMIT_MESSAGE};
use crate::core::error::{Error, ErrorKind, ParseFailureCategory};
use crate::core::tree::{NodeId, Parser};

pub const DEFAULT_MAX_DEPTH: usize = 128;

const DEPTH_MESSAGE: &str = "nesting depth limit exceeded";

// Private map key serde_json uses for raw numbers under `arbitrary_precision`.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub max_bytes: Option<usize>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bytes: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// The default collaborator: serde_json grammar, `Arena` storage.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonParser {
    options: ParseOptions,
}

impl JsonParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parses a UTF-8 buffer; invalid UTF-8 is reported as a parse failure.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Arena, Error> {
        self.check_size(bytes.len())?;
        let mut de = serde_json::Deserializer::from_slice(bytes);
        decode(&mut de, self.options).map_err(parse_error)
    }

    fn check_size(&self, len: usize) -> Result<(), Error> {
        match self.options.max_bytes {
            Some(max) if len > max => Err(Error::new(ErrorKind::Parse)
                .with_message(format!("input exceeds the {max}-byte limit"))
                .with_category(ParseFailureCategory::SizeLimit)),
            _ => Ok(()),
        }
    }
}

impl Parser for JsonParser {
    type Tree = Arena;

    fn parse_text(&self, text: &str) -> Result<Arena, Error> {
        self.check_size(text.len())?;
        let mut de = serde_json::Deserializer::from_str(text);
        decode(&mut de, self.options).map_err(parse_error)
    }
}

fn decode<'de, R>(
    de: &mut serde_json::Deserializer<R>,
    options: ParseOptions,
) -> Result<Arena, serde_json::Error>
where
    R: serde_json::de::Read<'de>,
{
    let mut arena = Arena::new();
    NodeSeed {
        arena: &mut arena,
        depth: 0,
        max_depth: options.max_depth,
    }
    .deserialize(&mut *de)?;
    de.end()?;
    Ok(arena)
}

struct NodeSeed<'b> {
    arena: &'b mut Arena,
    depth: usize,
    max_depth: usize,
}

impl NodeSeed<'_> {
    fn enter<E: de::Error>(&self) -> Result<(), E> {
        if self.depth >= self.max_depth {
            return Err(E::custom(DEPTH_MESSAGE));
        }
        Ok(())
    }
}

fn stored<E: de::Error>(pushed: Result<NodeId, Error>) -> Result<NodeId, E> {
    pushed.map_err(|_| E::custom(NODE_LIMIT_MESSAGE))
}

impl<'de> DeserializeSeed<'de> for NodeSeed<'_> {
    type Value = NodeId;

    fn deserialize<D>(self, deserializer: D) -> Result<NodeId, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for NodeSeed<'_> {
    type Value = NodeId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<NodeId, E> {
        stored(self.arena.push_null())
    }

    fn visit_none<E: de::Error>(self) -> Result<NodeId, E> {
        stored(self.arena.push_null())
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<NodeId, E> {
        stored(self.arena.push_bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<NodeId, E> {
        stored(self.arena.push_number(Number::from(value)))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<NodeId, E> {
        stored(self.arena.push_number(Number::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<NodeId, E> {
        let number = Number::from_f64(value).ok_or_else(|| E::custom("non-finite number"))?;
        stored(self.arena.push_number(number))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<NodeId, E> {
        stored(self.arena.push_string(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<NodeId, E> {
        stored(self.arena.push_string(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<NodeId, A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.enter::<A::Error>()?;
        let NodeSeed {
            arena,
            depth,
            max_depth,
        } = self;
        let parent = stored(arena.push_array())?;
        let mut prev = None;
        while let Some(child) = seq.next_element_seed(NodeSeed {
            arena: &mut *arena,
            depth: depth + 1,
            max_depth,
        })? {
            arena.append_child(parent, prev, child);
            prev = Some(child);
        }
        Ok(parent)
    }

    fn visit_map<A>(self, mut map: A) -> Result<NodeId, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut next = map.next_key::<String>()?;
        if next.as_deref() == Some(NUMBER_TOKEN) {
            let raw: String = map.next_value()?;
            let number = raw
                .parse::<Number>()
                .map_err(<A::Error as de::Error>::custom)?;
            return stored(self.arena.push_number(number));
        }
        self.enter::<A::Error>()?;
        let NodeSeed {
            arena,
            depth,
            max_depth,
        } = self;
        let parent = stored(arena.push_object())?;
        let mut prev = None;
        while let Some(key) = next {
            let child = map.next_value_seed(NodeSeed {
                arena: &mut *arena,
                depth: depth + 1,
                max_depth,
            })?;
            arena.set_key(child, key);
            arena.append_child(parent, prev, child);
            prev = Some(child);
            next = map.next_key::<String>()?;
        }
        Ok(parent)
    }
}

fn parse_error(err: serde_json::Error) -> Error {
    let category = categorize_error(&err);
    let text = err.to_string();
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    let message = text.strip_suffix(&suffix).unwrap_or(&text).to_string();

    let mut out = Error::new(ErrorKind::Parse)
        .with_message(message)
        .with_category(category);
    if err.line() > 0 {
        out = out.with_position(err.line(), err.column());
    }
    if let Some(hint) = hint_for(category) {
        out = out.with_hint(hint);
    }
    out.with_source(err)
}

fn hint_for(category: ParseFailureCategory) -> Option<&'static str> {
    match category {
        ParseFailureCategory::Eof => {
            Some("input ended early; check for unclosed brackets or quotes")
        }
        ParseFailureCategory::DepthLimit => {
            Some("raise the nesting limit or flatten the document")
        }
        ParseFailureCategory::Utf8 => Some("input must be valid UTF-8"),
        _ => None,
    }
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        Category::Eof => ParseFailureCategory::Eof,
        Category::Io => ParseFailureCategory::Unknown,
        Category::Syntax => match categorize_message(&err.to_string()) {
            ParseFailureCategory::Unknown => ParseFailureCategory::Syntax,
            other => other,
        },
        Category::Data => categorize_message(&err.to_string()),
    }
}

pub fn categorize_message(message: &str) -> ParseFailureCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("recursion limit") || lower.contains(DEPTH_MESSAGE) {
        ParseFailureCategory::DepthLimit
    } else if lower.contains("number out of range") || lower.contains("non-finite") {
        ParseFailureCategory::NumericRange
    } else if lower.contains(NODE_LIMIT_MESSAGE) {
        ParseFailureCategory::SizeLimit
    } else if lower.contains("unicode") || lower.contains("utf-8") || lower.contains("utf8") {
        ParseFailureCategory::Utf8
    } else {
        ParseFailureCategory::Unknown
    }
}
