#![forbid(unsafe_code)]

//! Detent resolution and landing-detent search.
//!
//! [`resolve`] turns the declared detents plus the measured geometry into a
//! [`Resolution`]: an ascending list of concrete heights and the offset at
//! which the sheet is fully hidden. [`ResolvedDetents::nearest`] picks where a
//! released sheet should land.
//!
//! # Pipeline
//!
//! 1. An empty declaration means `{Content}`.
//! 2. `max_detent_value = container height − margin` (never negative).
//! 3. Each detent resolves against that context.
//! 4. Sort ascending by height; ties order `Content`, then `Fraction`, then
//!    `Height`.
//! 5. Keep only the first entry at each height.
//! 6. With a `Content` detent present, drop everything below it.
//! 7. `hidden_offset = content height + bottom safe-area inset`.
//!
//! # Invariants
//!
//! 1. The result is non-empty and strictly ascending.
//! 2. No entry is below the `Content` height when `Content` is declared.
//! 3. `resolve` is pure: equal inputs give equal output regardless of the
//!    order the detents were declared in.

use thiserror::Error;
use tracing::debug;

use crate::config::BlanketConfig;
use crate::detent::{Detent, DetentContext, ResolvedDetent};
use crate::geometry::Size;

/// Inputs to one resolve pass.
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    /// Declared detents, treated as a set.
    pub detents: &'a [Detent],
    /// Measured content size.
    pub content_size: Size,
    /// Largest size the container offers.
    pub container_size: Size,
    /// Bottom safe-area inset.
    pub safe_area_bottom: f64,
}

/// Output of a resolve pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    /// Ascending concrete detents.
    pub detents: ResolvedDetents,
    /// Offset at which the sheet is entirely off-screen.
    pub hidden_offset: f64,
}

/// Non-empty, strictly ascending list of resolved detents.
///
/// Serializes as a plain array. Deserializing checks the same shape
/// [`resolve`] produces, so a decoded value upholds the invariants above.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<ResolvedDetent>", into = "Vec<ResolvedDetent>")
)]
pub struct ResolvedDetents {
    detents: Vec<ResolvedDetent>,
}

/// A detent list that [`resolve`] could not have produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidDetents {
    /// No detents at all.
    #[error("detent list is empty")]
    Empty,
    /// An offset is `NaN` or infinite.
    #[error("detent {index} has invalid offset {offset}")]
    InvalidOffset { index: usize, offset: f64 },
    /// An offset is not greater than the one before it.
    #[error("detent {index} is not above the previous detent")]
    NotAscending { index: usize },
}

impl TryFrom<Vec<ResolvedDetent>> for ResolvedDetents {
    type Error = InvalidDetents;

    fn try_from(detents: Vec<ResolvedDetent>) -> Result<Self, Self::Error> {
        if detents.is_empty() {
            return Err(InvalidDetents::Empty);
        }
        for (index, detent) in detents.iter().enumerate() {
            if !detent.offset.is_finite() {
                return Err(InvalidDetents::InvalidOffset {
                    index,
                    offset: detent.offset,
                });
            }
        }
        if let Some(index) = detents
            .windows(2)
            .position(|pair| pair[1].offset <= pair[0].offset)
        {
            return Err(InvalidDetents::NotAscending { index: index + 1 });
        }
        Ok(Self { detents })
    }
}

impl From<ResolvedDetents> for Vec<ResolvedDetent> {
    fn from(detents: ResolvedDetents) -> Self {
        detents.detents
    }
}

/// Resolve `input` into concrete detents and the hidden offset.
#[must_use]
pub fn resolve(input: &ResolveInput<'_>, config: &BlanketConfig) -> Resolution {
    let context = DetentContext {
        max_detent_value: (input.container_size.height - config.detent_margin).max(0.0),
        content_height: input.content_size.height,
    };

    let declared: &[Detent] = if input.detents.is_empty() {
        &[Detent::Content]
    } else {
        input.detents
    };

    let mut resolved: Vec<ResolvedDetent> = declared
        .iter()
        .map(|detent| ResolvedDetent::new(*detent, detent.resolve(&context)))
        .collect();

    resolved.sort_by(|a, b| {
        a.offset
            .total_cmp(&b.offset)
            .then_with(|| a.source.cmp(&b.source))
    });
    resolved.dedup_by(|next, kept| next.offset == kept.offset);

    if let Some(floor) = resolved
        .iter()
        .find(|d| d.source.is_content())
        .map(|d| d.offset)
    {
        resolved.retain(|d| d.offset >= floor);
    }

    let hidden_offset = input.content_size.height + input.safe_area_bottom;

    debug!(
        container = input.container_size.height,
        content = input.content_size.height,
        declared = declared.len(),
        resolved = resolved.len(),
        hidden_offset,
        "resolved detents"
    );

    Resolution {
        detents: ResolvedDetents { detents: resolved },
        hidden_offset,
    }
}

impl ResolvedDetents {
    /// The smallest detent.
    #[must_use]
    pub fn min_detent(&self) -> ResolvedDetent {
        self.detents[0]
    }

    /// The largest detent.
    #[must_use]
    pub fn max_detent(&self) -> ResolvedDetent {
        self.detents[self.detents.len() - 1]
    }

    /// All detents, ascending.
    #[must_use]
    pub fn as_slice(&self) -> &[ResolvedDetent] {
        &self.detents
    }

    /// Number of detents (always ≥ 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.detents.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detents.is_empty()
    }

    /// Iterate ascending.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedDetent> {
        self.detents.iter()
    }

    /// The greatest detent at or below `offset` and the smallest above it.
    #[must_use]
    pub fn range(&self, offset: f64) -> (Option<ResolvedDetent>, Option<ResolvedDetent>) {
        let split = self.detents.partition_point(|d| d.offset <= offset);
        let lower = split.checked_sub(1).map(|i| self.detents[i]);
        let higher = self.detents.get(split).copied();
        (lower, higher)
    }

    /// Choose the landing detent for a sheet released at `offset` with
    /// vertical `velocity` (negative = moving toward more open).
    ///
    /// Without a flick the closer neighbour wins; an exact tie goes to the
    /// higher (more open) detent. A velocity below `-threshold` forces the
    /// higher neighbour, above `threshold` the lower one. Past the top detent
    /// the top detent is returned; below the bottom one the bottom one is.
    #[must_use]
    pub fn nearest(&self, offset: f64, velocity: f64, threshold: f64) -> ResolvedDetent {
        let (lower, higher) = self.range(offset);

        let Some(higher) = higher else {
            return self.max_detent();
        };
        let Some(lower) = lower else {
            return higher;
        };

        let lower_distance = (lower.offset - offset).abs();
        let higher_distance = (higher.offset - offset).abs();

        let mut proposed = if lower_distance < higher_distance {
            lower
        } else {
            higher
        };

        if velocity < -threshold {
            proposed = higher;
        }
        if velocity > threshold {
            proposed = lower;
        }

        proposed
    }
}

impl<'a> IntoIterator for &'a ResolvedDetents {
    type Item = &'a ResolvedDetent;
    type IntoIter = std::slice::Iter<'a, ResolvedDetent>;

    fn into_iter(self) -> Self::IntoIter {
        self.detents.iter()
    }
}
