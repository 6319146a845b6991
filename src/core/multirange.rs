//! Sets of port numbers stored as sorted, disjoint, non-touching inclusive ranges.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid port token {0:?}, expected N or N-M")]
    InvalidToken(String),

    #[error("range start {start} is greater than end {end}")]
    ReversedRange { start: u32, end: u32 },
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u32,
    pub end: u32,
}

impl PortRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, n: u32) -> bool {
        self.start <= n && n <= self.end
    }

    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }
}

/// Canonical form: ranges strictly increasing by `start`, and for consecutive
/// ranges `next.start > prev.end + 1`. The empty vector is the empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiRange {
    ranges: Vec<PortRange>,
}

impl MultiRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `"22, 80-90,443"` style text. Whitespace around tokens is ignored and
    /// blank text is the empty set.
    pub fn from_string(text: &str) -> Result<Self, ParseError> {
        let mut parsed = Vec::new();
        if !text.trim().is_empty() {
            for token in text.split(',') {
                parsed.push(parse_token(token.trim())?);
            }
        }
        Ok(Self::from_ranges(parsed))
    }

    /// Builds the canonical set covering every given range, whatever their order or overlap.
    pub fn from_ranges(mut ranges: Vec<PortRange>) -> Self {
        ranges.sort_by_key(|r| r.start);
        let mut merged: Vec<PortRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    /// Removes `n` from the set, splitting or shrinking the range that holds it.
    pub fn remove_element(&mut self, n: u32) {
        let Some(idx) = self.ranges.iter().position(|r| r.contains(n)) else {
            return;
        };
        let range = self.ranges[idx];
        match (n == range.start, n == range.end) {
            (true, true) => {
                self.ranges.remove(idx);
            }
            (true, false) => self.ranges[idx].start = n + 1,
            (false, true) => self.ranges[idx].end = n - 1,
            (false, false) => {
                self.ranges[idx].end = n - 1;
                self.ranges.insert(idx + 1, PortRange::new(n + 1, range.end));
            }
        }
    }

    pub fn contains(&self, n: u32) -> bool {
        self.ranges.iter().any(|r| r.contains(n))
    }

    /// Number of integers covered.
    pub fn size(&self) -> u64 {
        self.ranges.iter().map(PortRange::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }

    /// Renders `"20-21, 23-25"`; singleton ranges render as a single number.
    pub fn humanize(&self) -> String {
        self.ranges
            .iter()
            .map(|r| {
                if r.start == r.end {
                    r.start.to_string()
                } else {
                    format!("{}-{}", r.start, r.end)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn parse_number(text: &str, token: &str) -> Result<u32, ParseError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidToken(token.to_string()));
    }
    text.parse()
        .map_err(|_| ParseError::InvalidToken(token.to_string()))
}

fn parse_token(token: &str) -> Result<PortRange, ParseError> {
    match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_number(start.trim(), token)?;
            let end = parse_number(end.trim(), token)?;
            if start > end {
                return Err(ParseError::ReversedRange { start, end });
            }
            Ok(PortRange::new(start, end))
        }
        None => {
            let n = parse_number(token, token)?;
            Ok(PortRange::new(n, n))
        }
    }
}

impl FromStr for MultiRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for MultiRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.humanize())
    }
}
