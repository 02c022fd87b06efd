//! YAML → value tree, built from the `yaml-rust2` event stream.
//!
//! Working on events instead of the crate's own document type keeps the
//! scalar style around, which is what decides whether `yes` is a boolean
//! (plain) or a string (quoted).
//!
//! Rules applied while building the tree:
//!
//! - **Documents**: an empty stream is `null`; a second document is an error.
//! - **Plain scalars**: YAML 1.1 implicit typing plus the YAML 1.2 core forms
//!   (see [`resolve_plain`]). Quoted and block scalars are strings.
//! - **Tags**: the standard `!!` scalar and collection tags are honored, the
//!   non-specific `!` forces a string, anything else is rejected.
//! - **Anchors/aliases**: expanded into independent copies, at most
//!   [`MAX_ALIAS_NODES`] nodes in total per document.
//! - **Merge keys** (`<<`): merged entries come first, earlier sources win
//!   over later ones, and the mapping's own keys override all of them.
//! - **Keys**: scalar keys are stored as their canonical text; collection
//!   keys are rejected.

use std::collections::HashMap;
use std::iter::Peekable;
use std::vec::IntoIter;

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, ScanError, TScalarStyle};

use crate::error::{DecodeError, DecodeResult};
use crate::format::Format;
use crate::value::{Mapping, Value};

const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";
const MERGE_KEY: &str = "<<";

/// Upper bound on nodes copied out of aliases, so a few hundred bytes of
/// nested anchors cannot expand into gigabytes.
pub const MAX_ALIAS_NODES: usize = 1_000_000;

pub(super) fn decode(text: &str) -> DecodeResult<Value> {
    let mut sink = EventSink::default();
    let mut parser = Parser::new(text.chars());
    parser.load(&mut sink, true).map_err(scan_error)?;
    Builder::new(sink.events).stream()
}

#[derive(Default)]
struct EventSink {
    events: Vec<(Event, Marker)>,
}

impl MarkedEventReceiver for EventSink {
    fn on_event(&mut self, ev: Event, mark: Marker) {
        self.events.push((ev, mark));
    }
}

fn scan_error(e: ScanError) -> DecodeError {
    let mark = *e.marker();
    error_at(mark, e.info().to_string())
}

fn error_at(mark: Marker, message: impl Into<String>) -> DecodeError {
    DecodeError::new(Format::Yaml, message).at(mark.line(), mark.col() + 1)
}

struct Builder {
    events: Peekable<IntoIter<(Event, Marker)>>,
    document_count: usize,
    second_document: Option<Marker>,
    /// Completed anchored nodes by anchor id, with their node counts.
    anchors: HashMap<usize, (Value, usize)>,
    /// Nodes copied out of aliases so far.
    expanded: usize,
    last_mark: Option<Marker>,
}

enum Entry {
    End,
    Merge,
    Pair,
}

impl Builder {
    fn new(events: Vec<(Event, Marker)>) -> Self {
        let mut document_count = 0;
        let mut second_document = None;
        for (event, mark) in &events {
            if matches!(event, Event::DocumentStart { .. }) {
                document_count += 1;
                if document_count == 2 {
                    second_document = Some(*mark);
                }
            }
        }
        let last_mark = events.last().map(|(_, mark)| *mark);
        Self {
            events: events.into_iter().peekable(),
            document_count,
            second_document,
            anchors: HashMap::new(),
            expanded: 0,
            last_mark,
        }
    }

    fn stream(mut self) -> DecodeResult<Value> {
        if let Some(mark) = self.second_document {
            return Err(error_at(
                mark,
                format!(
                    "found {} documents, expected a single document",
                    self.document_count
                ),
            ));
        }
        if self.document_count == 0 {
            return Ok(Value::Null);
        }

        loop {
            let (event, mark) = self.next()?;
            match event {
                Event::StreamStart => continue,
                Event::DocumentStart { .. } => break,
                other => return Err(unexpected(&other, mark)),
            }
        }
        let root = self.node()?;
        let (event, mark) = self.next()?;
        match event {
            Event::DocumentEnd => Ok(root),
            other => Err(unexpected(&other, mark)),
        }
    }

    fn next(&mut self) -> DecodeResult<(Event, Marker)> {
        let last_mark = self.last_mark;
        self.events.next().ok_or_else(|| truncated(last_mark))
    }

    fn peek(&mut self) -> DecodeResult<&(Event, Marker)> {
        let last_mark = self.last_mark;
        self.events.peek().ok_or_else(|| truncated(last_mark))
    }

    fn node(&mut self) -> DecodeResult<Value> {
        let (event, mark) = self.next()?;
        match event {
            Event::Scalar(text, style, anchor, tag) => {
                let value = resolve_scalar(text, style, tag.as_ref(), mark)?;
                self.remember(anchor, &value);
                Ok(value)
            }
            Event::SequenceStart(anchor, tag) => {
                check_collection_tag(tag.as_ref(), &["seq", "omap", "pairs"], mark)?;
                let value = self.sequence()?;
                self.remember(anchor, &value);
                Ok(value)
            }
            Event::MappingStart(anchor, tag) => {
                check_collection_tag(tag.as_ref(), &["map", "set"], mark)?;
                let value = self.mapping()?;
                self.remember(anchor, &value);
                Ok(value)
            }
            Event::Alias(id) => self.alias(id, mark),
            other => Err(unexpected(&other, mark)),
        }
    }

    fn remember(&mut self, anchor: usize, value: &Value) {
        if anchor > 0 {
            self.anchors.insert(anchor, (value.clone(), count_nodes(value)));
        }
    }

    fn alias(&mut self, id: usize, mark: Marker) -> DecodeResult<Value> {
        let Some((value, nodes)) = self.anchors.get(&id) else {
            return Err(error_at(
                mark,
                "alias refers to an anchor that encloses it; recursive structures are not supported",
            ));
        };
        self.expanded = self.expanded.saturating_add(*nodes);
        if self.expanded > MAX_ALIAS_NODES {
            return Err(error_at(
                mark,
                format!("alias expansion exceeds {} nodes", MAX_ALIAS_NODES),
            ));
        }
        Ok(value.clone())
    }

    fn sequence(&mut self) -> DecodeResult<Value> {
        let mut items = Vec::new();
        loop {
            if matches!(self.peek()?.0, Event::SequenceEnd) {
                self.next()?;
                return Ok(Value::Sequence(items));
            }
            items.push(self.node()?);
        }
    }

    fn mapping(&mut self) -> DecodeResult<Value> {
        let mut own = Mapping::new();
        let mut merged: Option<Mapping> = None;
        loop {
            let (event, key_mark) = self.peek()?;
            let key_mark = *key_mark;
            let entry = match event {
                Event::MappingEnd => Entry::End,
                Event::Scalar(text, TScalarStyle::Plain, _, None) if text == MERGE_KEY => {
                    Entry::Merge
                }
                _ => Entry::Pair,
            };
            match entry {
                Entry::End => {
                    self.next()?;
                    break;
                }
                Entry::Merge => {
                    self.next()?;
                    let source = self.node()?;
                    merge_into(merged.get_or_insert_with(Mapping::new), source, key_mark)?;
                }
                Entry::Pair => {
                    let key = self.key()?;
                    let value = self.node()?;
                    if own.insert(key.clone(), value).is_some() {
                        tracing::debug!(
                            key = %key,
                            line = key_mark.line(),
                            "duplicate YAML key, keeping the last value"
                        );
                    }
                }
            }
        }

        let Some(mut merged) = merged else {
            return Ok(Value::Mapping(own));
        };
        tracing::debug!(
            merged = merged.len(),
            own = own.len(),
            "expanded YAML merge keys"
        );
        for (key, value) in own {
            merged.insert(key, value);
        }
        Ok(Value::Mapping(merged))
    }

    fn key(&mut self) -> DecodeResult<String> {
        let mark = self.peek()?.1;
        match self.node()? {
            Value::String(s) => Ok(s),
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Integer(i) => Ok(i.to_string()),
            Value::Float(f) => Ok(format!("{:?}", f)),
            other => Err(error_at(
                mark,
                format!(
                    "{} used as a mapping key; only scalar keys are supported",
                    other.kind()
                ),
            )),
        }
    }
}

fn count_nodes(value: &Value) -> usize {
    match value {
        Value::Sequence(items) => 1 + items.iter().map(count_nodes).sum::<usize>(),
        Value::Mapping(map) => 1 + map.values().map(count_nodes).sum::<usize>(),
        _ => 1,
    }
}

/// Copy entries of a merge source into `target` unless already present.
fn merge_into(target: &mut Mapping, source: Value, mark: Marker) -> DecodeResult<()> {
    match source {
        Value::Mapping(map) => {
            for (key, value) in map {
                if !target.contains_key(&key) {
                    target.insert(key, value);
                }
            }
            Ok(())
        }
        Value::Sequence(items) if items.iter().all(|item| item.as_mapping().is_some()) => {
            for item in items {
                merge_into(target, item, mark)?;
            }
            Ok(())
        }
        other => Err(error_at(
            mark,
            format!(
                "merge key `<<` expects a mapping or a sequence of mappings, found {}",
                other.kind()
            ),
        )),
    }
}

fn truncated(last_mark: Option<Marker>) -> DecodeError {
    let message = "unexpected end of YAML event stream";
    match last_mark {
        Some(mark) => error_at(mark, message),
        None => DecodeError::new(Format::Yaml, message),
    }
}

fn unexpected(event: &Event, mark: Marker) -> DecodeError {
    error_at(mark, format!("unexpected YAML event {:?}", event))
}

/// Suffix of a tag in the `tag:yaml.org,2002:` namespace, however it was spelled.
fn core_suffix(tag: &Tag) -> Option<&str> {
    if tag.handle == CORE_TAG_PREFIX || tag.handle == "!!" {
        return Some(tag.suffix.as_str());
    }
    if tag.handle.is_empty() {
        return tag.suffix.strip_prefix(CORE_TAG_PREFIX);
    }
    None
}

/// The bare `!` tag, which the parser reports as an empty handle with `!` as suffix.
fn is_non_specific(tag: &Tag) -> bool {
    (tag.handle.is_empty() && tag.suffix == "!") || (tag.handle == "!" && tag.suffix.is_empty())
}

fn describe_tag(tag: &Tag) -> String {
    format!("{}{}", tag.handle, tag.suffix)
}

fn check_collection_tag(tag: Option<&Tag>, allowed: &[&str], mark: Marker) -> DecodeResult<()> {
    let Some(tag) = tag else {
        return Ok(());
    };
    if is_non_specific(tag) {
        return Ok(());
    }
    match core_suffix(tag) {
        Some(suffix) if allowed.contains(&suffix) => Ok(()),
        _ => Err(error_at(
            mark,
            format!("unsupported tag `{}` on a collection", describe_tag(tag)),
        )),
    }
}

fn resolve_scalar(
    text: String,
    style: TScalarStyle,
    tag: Option<&Tag>,
    mark: Marker,
) -> DecodeResult<Value> {
    if let Some(tag) = tag {
        return resolve_tagged(text, tag, mark);
    }
    if matches!(style, TScalarStyle::Plain) {
        if let Some(value) = resolve_plain(&text) {
            return Ok(value);
        }
    }
    Ok(Value::String(text))
}

fn resolve_tagged(text: String, tag: &Tag, mark: Marker) -> DecodeResult<Value> {
    if is_non_specific(tag) {
        return Ok(Value::String(text));
    }
    let suffix = core_suffix(tag).ok_or_else(|| {
        error_at(mark, format!("unsupported tag `{}`", describe_tag(tag)))
    })?;
    let trimmed = text.trim();
    let resolved = match suffix {
        "str" => return Ok(Value::String(text)),
        "null" => resolve_plain(trimmed).filter(Value::is_null),
        "bool" => resolve_plain(trimmed).filter(|v| matches!(v, Value::Bool(_))),
        "int" => parse_int(trimmed),
        "float" => match resolve_plain(trimmed) {
            Some(Value::Float(f)) => Some(Value::Float(f)),
            Some(Value::Integer(i)) => Some(Value::Float(i as f64)),
            _ => None,
        },
        _ => {
            return Err(error_at(
                mark,
                format!("unsupported tag `{}`", describe_tag(tag)),
            ))
        }
    };
    resolved.ok_or_else(|| {
        error_at(
            mark,
            format!("`{}` is not a valid !!{} value", text, suffix),
        )
    })
}

/// Implicit typing of a plain scalar. `None` means the scalar is a string.
///
/// Accepted forms follow YAML 1.1 with the YAML 1.2 core additions:
/// `~`, `null` and the empty scalar are null; `true/false/yes/no/on/off` in
/// lower, Title and UPPER case are booleans; decimal, `0x`, `0o`, leading-zero
/// octal and `0b` literals (underscores allowed) are integers; decimal
/// fractions, exponents, `.inf` and `.nan` are floats.
pub(crate) fn resolve_plain(s: &str) -> Option<Value> {
    match s {
        "" | "~" | "null" | "Null" | "NULL" => return Some(Value::Null),
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
            return Some(Value::Bool(true))
        }
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            return Some(Value::Bool(false))
        }
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Some(Value::Float(f64::INFINITY))
        }
        "-.inf" | "-.Inf" | "-.INF" => return Some(Value::Float(f64::NEG_INFINITY)),
        ".nan" | ".NaN" | ".NAN" => return Some(Value::Float(f64::NAN)),
        _ => {}
    }
    parse_int(s).or_else(|| parse_float(s))
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

/// Integer literal. Values outside `i64` become floats.
fn parse_int(s: &str) -> Option<Value> {
    let (negative, body) = split_sign(s);
    let (radix, digits) = if let Some(rest) = body.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = body.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = body.strip_prefix("0b") {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        if body.starts_with('_') {
            return None;
        }
        (10, body)
    };

    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() || !digits.chars().all(|c| c == '_' || c.is_digit(radix)) {
        return None;
    }

    let signed = if negative {
        format!("-{}", cleaned)
    } else {
        cleaned.clone()
    };
    if let Ok(i) = i64::from_str_radix(&signed, radix) {
        return Some(Value::Integer(i));
    }
    if radix == 10 {
        return signed.parse::<f64>().ok().map(Value::Float);
    }
    let magnitude = cleaned.chars().fold(0f64, |acc, c| {
        acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
    });
    Some(Value::Float(if negative { -magnitude } else { magnitude }))
}

/// Float literal: a mantissa with a `.` and/or an exponent.
fn parse_float(s: &str) -> Option<Value> {
    let (_, body) = split_sign(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let mut dots = 0;
    let mut digits = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '_' => {}
            '.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 || mantissa.starts_with('_') {
        return None;
    }
    if let Some(exp) = exponent {
        let (_, exp_digits) = split_sign(exp);
        if exp_digits.is_empty() || !exp_digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    } else if dots == 0 {
        return None;
    }

    let cleaned: String = s.chars().filter(|&c| c != '_').collect();
    cleaned.parse::<f64>().ok().map(Value::Float)
}
