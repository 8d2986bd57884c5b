//! Field selectors and concrete field paths.
//!
//! A selector names one or more fields inside a request location:
//!
//! ```text
//! name              user.email            items[0]
//! items[*].id       tags.*                ["dotted.key"].value
//! ```
//!
//! Expanding a selector against a location's value yields one concrete
//! [`FieldPath`] per matched field instance.

use std::fmt;

use crate::error::SelectorError;
use crate::value::FieldValue;

/// One segment of a parsed selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorSegment {
    Key(String),
    Index(usize),
    Wildcard,
}

/// One segment of a concrete path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A parsed field selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    segments: Vec<SelectorSegment>,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let segments = parse_selector(raw)?;
        Ok(Selector {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[SelectorSegment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, SelectorSegment::Wildcard))
    }

    /// Expands the selector against `root`, returning every matched field
    /// instance with its current value.
    ///
    /// Without wildcards the result always has exactly one entry, whose
    /// value is `Undefined` when the path does not exist. A wildcard fans out
    /// over every key of an object or index of an array and matches nothing
    /// on other values.
    pub fn expand(&self, root: &FieldValue) -> Vec<(FieldPath, FieldValue)> {
        let mut current = vec![(FieldPath::root(), root.clone())];

        for segment in &self.segments {
            if current.is_empty() {
                break;
            }
            let mut next = Vec::new();
            for (path, value) in current {
                match segment {
                    SelectorSegment::Key(key) => {
                        let child = value.get_key(key);
                        next.push((path.child(PathSegment::Key(key.clone())), child));
                    }
                    SelectorSegment::Index(index) => {
                        let child = value.get_index(*index);
                        next.push((path.child(PathSegment::Index(*index)), child));
                    }
                    SelectorSegment::Wildcard => match value {
                        FieldValue::Object(map) => {
                            for (key, child) in map {
                                next.push((path.child(PathSegment::Key(key)), child));
                            }
                        }
                        FieldValue::Array(items) => {
                            for (index, child) in items.into_iter().enumerate() {
                                next.push((path.child(PathSegment::Index(index)), child));
                            }
                        }
                        _ => {}
                    },
                }
            }
            current = next;
        }

        current
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ─── Selector parsing ───────────────────────────────────────────────────────

/// Splits a selector into segments.
///
/// The empty selector selects the whole location.
pub fn parse_selector(raw: &str) -> Result<Vec<SelectorSegment>, SelectorError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    // Whether a `.` is pending and must be followed by a segment.
    let mut expect_segment = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' => {
                if current.is_empty() {
                    if segments.is_empty() {
                        return Err(selector_error(raw, i, "leading '.'"));
                    }
                    if expect_segment {
                        return Err(selector_error(raw, i, "empty segment"));
                    }
                } else {
                    segments.push(key_segment(&current));
                    current.clear();
                }
                expect_segment = true;
                i += 1;
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(key_segment(&current));
                    current.clear();
                } else if expect_segment {
                    return Err(selector_error(raw, i, "'[' cannot follow '.'"));
                }
                let (segment, consumed) = parse_bracket(raw, &chars, i)?;
                segments.push(segment);
                expect_segment = false;
                i += consumed;
                // A bracket must be followed by '.', '[' or the end.
                if i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                    return Err(selector_error(raw, i, "expected '.' or '[' after ']'"));
                }
            }
            ']' => return Err(selector_error(raw, i, "unbalanced ']'")),
            c => {
                current.push(c);
                expect_segment = false;
                i += 1;
            }
        }
    }

    if expect_segment {
        return Err(selector_error(raw, chars.len(), "trailing '.'"));
    }
    if !current.is_empty() {
        segments.push(key_segment(&current));
    }

    Ok(segments)
}

fn key_segment(name: &str) -> SelectorSegment {
    if name == "*" {
        SelectorSegment::Wildcard
    } else {
        SelectorSegment::Key(name.to_string())
    }
}

/// Parses `[*]`, `[12]`, `["key"]` or `['key']` starting at `start`.
/// Returns the segment and the number of characters consumed.
fn parse_bracket(
    raw: &str,
    chars: &[char],
    start: usize,
) -> Result<(SelectorSegment, usize), SelectorError> {
    let mut i = start + 1;
    let Some(&first) = chars.get(i) else {
        return Err(selector_error(raw, start, "unclosed '['"));
    };

    if first == '"' || first == '\'' {
        let quote = first;
        i += 1;
        let mut key = String::new();
        loop {
            match chars.get(i) {
                None => return Err(selector_error(raw, start, "unclosed quoted key")),
                Some('\\') => {
                    match chars.get(i + 1) {
                        Some(&escaped) => key.push(escaped),
                        None => return Err(selector_error(raw, i, "dangling escape")),
                    }
                    i += 2;
                }
                Some(&c) if c == quote => {
                    i += 1;
                    break;
                }
                Some(&c) => {
                    key.push(c);
                    i += 1;
                }
            }
        }
        if chars.get(i) != Some(&']') {
            return Err(selector_error(raw, i, "expected ']' after quoted key"));
        }
        return Ok((SelectorSegment::Key(key), i + 1 - start));
    }

    let close = chars[i..]
        .iter()
        .position(|&c| c == ']')
        .map(|p| p + i)
        .ok_or_else(|| selector_error(raw, start, "unclosed '['"))?;
    let inner: String = chars[i..close].iter().collect();

    let segment = if inner == "*" {
        SelectorSegment::Wildcard
    } else if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
        let index = inner
            .parse::<usize>()
            .map_err(|_| selector_error(raw, i, "index out of range"))?;
        SelectorSegment::Index(index)
    } else {
        return Err(selector_error(
            raw,
            i,
            "brackets must hold '*', an index or a quoted key",
        ));
    };

    Ok((segment, close + 1 - start))
}

fn selector_error(raw: &str, position: usize, reason: &str) -> SelectorError {
    SelectorError {
        selector: raw.to_string(),
        position,
        reason: reason.to_string(),
    }
}

// ─── Concrete paths ─────────────────────────────────────────────────────────

/// The concrete path of one field instance, with no wildcards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        FieldPath(segments)
    }

    /// Parses a concrete path. Wildcards are rejected.
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let segments = parse_selector(raw)?
            .into_iter()
            .map(|segment| match segment {
                SelectorSegment::Key(key) => Ok(PathSegment::Key(key)),
                SelectorSegment::Index(index) => Ok(PathSegment::Index(index)),
                SelectorSegment::Wildcard => Err(selector_error(
                    raw,
                    0,
                    "concrete paths cannot contain wildcards",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FieldPath(segments))
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        FieldPath(segments)
    }
}

impl fmt::Display for FieldPath {
    /// Canonical rendering: `items[0].id`, `["dotted.key"]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) if needs_quoting(key) => {
                    let escaped = key.replace('\\', "\\\\").replace('"', "\\\"");
                    write!(f, "[\"{}\"]", escaped)?;
                }
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
            }
        }
        Ok(())
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key == "*" || key.contains(['.', '[', ']', '"', '\''])
}
