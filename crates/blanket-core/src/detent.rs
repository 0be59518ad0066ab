#![forbid(unsafe_code)]

//! Declared height stops.
//!
//! A [`Detent`] is a declarative description of where the sheet may rest. It
//! carries no geometry of its own; [`Detent::resolve`] turns it into a
//! concrete height once the content and container have been measured.
//!
//! # Value semantics
//!
//! Detents are declared as a set, so they implement `Eq`, `Hash` and `Ord`.
//! Floating-point payloads compare by bit pattern after normalizing `-0.0`
//! to `0.0`.
//!
//! The variants are public, so a payload built without [`Detent::fraction`]
//! or [`Detent::height`] may be out of range. Resolution, comparison and the
//! text form all read the payload through the same clamp the constructors
//! apply: a non-finite value counts as `0`, a fraction is limited to
//! `[0, 1]` and a height to `>= 0`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// A height stop the sheet can settle at.
///
/// Serializes to its textual form (`content`, `fraction:0.5`, `height:300`)
/// so deserialized values go through the same validation as [`FromStr`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Detent {
    /// A fraction (`0..=1`) of the largest height the container allows.
    Fraction(f64),
    /// A fixed height, capped by the container.
    Height(f64),
    /// The measured height of the content.
    Content,
}

impl Detent {
    /// Fit to the measured content.
    pub const CONTENT: Self = Self::Content;

    /// Fraction of the available height. Clamped to `[0, 1]`; non-finite
    /// input becomes `0`.
    #[must_use]
    pub fn fraction(fraction: f64) -> Self {
        Self::Fraction(sanitize(fraction).clamp(0.0, 1.0))
    }

    /// Fixed height. Negative or non-finite input becomes `0`.
    #[must_use]
    pub fn height(height: f64) -> Self {
        Self::Height(sanitize(height).max(0.0))
    }

    /// Whether this is the fit-to-content detent.
    #[inline]
    #[must_use]
    pub const fn is_content(&self) -> bool {
        matches!(self, Self::Content)
    }

    /// Resolve to a concrete height in `context`.
    #[must_use]
    pub fn resolve(&self, context: &DetentContext) -> f64 {
        match *self {
            Self::Content => context.content_height,
            Self::Fraction(_) => context.max_detent_value * self.payload(),
            Self::Height(_) => self.payload().min(context.max_detent_value),
        }
    }

    /// Ordering rank used to break ties between detents resolving to the
    /// same height. `Content` sorts first so the content floor survives
    /// de-duplication.
    pub(crate) const fn rank(&self) -> u8 {
        match self {
            Self::Content => 0,
            Self::Fraction(_) => 1,
            Self::Height(_) => 2,
        }
    }

    fn payload(&self) -> f64 {
        match *self {
            Self::Fraction(v) => sanitize(v).clamp(0.0, 1.0),
            Self::Height(v) => sanitize(v).max(0.0),
            Self::Content => 0.0,
        }
    }

    fn payload_bits(&self) -> u64 {
        // -0.0 and 0.0 must hash alike.
        let v = self.payload();
        if v == 0.0 { 0 } else { v.to_bits() }
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl PartialEq for Detent {
    fn eq(&self, other: &Self) -> bool {
        self.rank() == other.rank() && self.payload_bits() == other.payload_bits()
    }
}

impl Eq for Detent {}

impl Hash for Detent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        self.payload_bits().hash(state);
    }
}

impl Ord for Detent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.payload().total_cmp(&other.payload()))
    }
}

impl PartialOrd for Detent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Detent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Content => f.write_str("content"),
            Self::Fraction(_) => write!(f, "fraction:{}", self.payload()),
            Self::Height(_) => write!(f, "height:{}", self.payload()),
        }
    }
}

/// Failure to parse the textual form of a [`Detent`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetentParseError {
    /// The kind before `:` is not `content`, `fraction` or `height`.
    #[error("unknown detent kind: {0:?}")]
    UnknownKind(String),
    /// `fraction` or `height` given without a value.
    #[error("detent {kind} requires a value (e.g. {kind}:0.5)")]
    MissingValue {
        /// The detent kind.
        kind: &'static str,
    },
    /// The value is not a finite number.
    #[error("invalid detent value {value:?}")]
    InvalidValue {
        /// The raw text after `:`.
        value: String,
    },
    /// The value lies outside the kind's domain.
    #[error("detent value {value} out of range for {kind}")]
    OutOfRange {
        /// The detent kind.
        kind: &'static str,
        /// The parsed value.
        value: f64,
    },
}

impl FromStr for Detent {
    type Err = DetentParseError;

    /// Parses `content`, `fraction:<f>` or `height:<h>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (kind, value) = match s.split_once(':') {
            Some((kind, value)) => (kind.trim(), Some(value.trim())),
            None => (s, None),
        };

        let parse_value = |kind: &'static str| -> Result<f64, DetentParseError> {
            let raw = value.ok_or(DetentParseError::MissingValue { kind })?;
            let parsed: f64 = raw.parse().map_err(|_| DetentParseError::InvalidValue {
                value: raw.to_string(),
            })?;
            if parsed.is_finite() {
                Ok(parsed)
            } else {
                Err(DetentParseError::InvalidValue {
                    value: raw.to_string(),
                })
            }
        };

        match kind.to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "fraction" => {
                let v = parse_value("fraction")?;
                if (0.0..=1.0).contains(&v) {
                    Ok(Self::fraction(v))
                } else {
                    Err(DetentParseError::OutOfRange {
                        kind: "fraction",
                        value: v,
                    })
                }
            }
            "height" => {
                let v = parse_value("height")?;
                if v >= 0.0 {
                    Ok(Self::height(v))
                } else {
                    Err(DetentParseError::OutOfRange {
                        kind: "height",
                        value: v,
                    })
                }
            }
            other => Err(DetentParseError::UnknownKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for Detent {
    type Error = DetentParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Detent> for String {
    fn from(detent: Detent) -> Self {
        detent.to_string()
    }
}

/// Geometry a detent is resolved against. Rebuilt on every resolve pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetentContext {
    /// Container height minus the top margin.
    pub max_detent_value: f64,
    /// Measured content height.
    pub content_height: f64,
}

/// A detent paired with the concrete height it resolved to.
///
/// The offset is measured upward from the bottom edge: `0` is collapsed and
/// larger values are more open.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedDetent {
    /// The declared detent.
    pub source: Detent,
    /// The resolved height.
    pub offset: f64,
}

impl ResolvedDetent {
    /// Pair `source` with `offset`.
    #[inline]
    #[must_use]
    pub const fn new(source: Detent, offset: f64) -> Self {
        Self { source, offset }
    }
}
