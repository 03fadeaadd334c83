/*
 * Label Vector
 *
 * Parses `<c0,c1,...,cN>` into components. Components may themselves be
 * bracketed vectors (`<<a,b>,c>`), so splitting only happens on commas at
 * nesting depth 1. A label without angle brackets is the length-1 vector
 * holding the label itself.
 *
 * # Time Complexity
 * - parse: O(len)
 * - least_upper_bound: O(N)
 */

use crate::errors::{Result, SynthesisError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Component value meaning "this index does not take part"
pub const WILDCARD: &str = "*";

/// Parsed composite label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelVector {
    components: Vec<String>,
    bracketed: bool,
}

impl LabelVector {
    /// Parse a label, rejecting mismatched brackets and empty components
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with('<') {
            if raw.is_empty() || raw.contains(['<', '>', ',']) {
                return Err(SynthesisError::malformed_label(raw));
            }
            return Ok(Self {
                components: vec![raw.to_string()],
                bracketed: false,
            });
        }

        if !raw.ends_with('>') || raw.len() < 2 {
            return Err(SynthesisError::malformed_label(raw));
        }
        let inner = &raw[1..raw.len() - 1];

        let mut components = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, ch) in inner.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or_else(|| SynthesisError::malformed_label(raw))?;
                }
                ',' if depth == 0 => {
                    components.push(Self::check_component(&inner[start..i], raw)?);
                    start = i + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(SynthesisError::malformed_label(raw));
        }
        components.push(Self::check_component(&inner[start..], raw)?);

        Ok(Self {
            components,
            bracketed: true,
        })
    }

    /// Bulk-parsing variant: `None` instead of an error
    pub fn try_parse(raw: &str) -> Option<Self> {
        Self::parse(raw).ok()
    }

    /// A component is a plain label without separators or a well-formed
    /// nested vector
    fn check_component(part: &str, raw: &str) -> Result<String> {
        if part.is_empty() {
            return Err(SynthesisError::malformed_label(raw));
        }
        if part.contains(['<', '>']) {
            Self::parse(part)?;
        } else if part.contains(',') {
            return Err(SynthesisError::malformed_label(raw));
        }
        Ok(part.to_string())
    }

    /// Build from components (always formatted with brackets). Fails on
    /// components that would not parse back as one component.
    pub fn from_components<S: Into<String>>(
        components: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let components: Vec<String> = components.into_iter().map(Into::into).collect();
        if components.is_empty() {
            return Err(SynthesisError::malformed_label("<>"));
        }
        for part in &components {
            Self::check_component(part, part)?;
        }
        Ok(Self::bracketed(components))
    }

    fn bracketed(components: Vec<String>) -> Self {
        Self {
            components,
            bracketed: true,
        }
    }

    /// All-wildcard vector of the given length
    pub fn wildcard(len: usize) -> Self {
        Self::bracketed(vec![WILDCARD.to_string(); len])
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&str> {
        self.components.get(index).map(String::as_str)
    }

    /// Out-of-range indices count as wildcards
    pub fn is_wildcard(&self, index: usize) -> bool {
        self.component(index).map_or(true, |c| c == WILDCARD)
    }

    /// Indices that take part in the event
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() != WILDCARD)
            .map(|(i, _)| i)
    }

    /// Copy with one component replaced; out-of-range indices leave the
    /// copy unchanged
    pub fn with_component(&self, index: usize, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        Self::check_component(&value, &value)?;
        let mut next = self.clone();
        if let Some(slot) = next.components.get_mut(index) {
            *slot = value;
        }
        Ok(next)
    }

    /// True when both vectors share a non-wildcard component at some index
    pub fn agrees_with(&self, other: &LabelVector) -> bool {
        self.components
            .iter()
            .zip(&other.components)
            .any(|(a, b)| a != WILDCARD && a == b)
    }

    /// Component-wise merge: a wildcard yields to the other side, equal
    /// components stay, differing components have no upper bound.
    pub fn least_upper_bound(&self, other: &LabelVector) -> Option<LabelVector> {
        if self.len() != other.len() {
            return None;
        }
        let mut merged = Vec::with_capacity(self.len());
        for (a, b) in self.components.iter().zip(&other.components) {
            if a == WILDCARD {
                merged.push(b.clone());
            } else if b == WILDCARD || a == b {
                merged.push(a.clone());
            } else {
                return None;
            }
        }
        Some(Self::bracketed(merged))
    }
}

impl PartialEq for LabelVector {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for LabelVector {}

impl Hash for LabelVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl fmt::Display for LabelVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bracketed {
            write!(f, "<{}>", self.components.join(","))
        } else {
            write!(f, "{}", self.components.join(","))
        }
    }
}

impl FromStr for LabelVector {
    type Err = SynthesisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LabelVector {
    type Error = SynthesisError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<LabelVector> for String {
    fn from(value: LabelVector) -> Self {
        value.to_string()
    }
}
