//! `"min-max"` page-range parsing.

use crate::error::CodecError;

/// A parsed `(min, max)` page-range window, or the absence of one.
///
/// Indices are interpreted against the filtered image list produced by
/// [`crate::entry_selector`], not against raw archive entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeSpec {
    bounds: Option<(usize, usize)>,
}

impl RangeSpec {
    /// The absent range: "no restriction".
    pub fn none() -> Self {
        RangeSpec { bounds: None }
    }

    /// Constructs a present range directly, skipping string parsing.
    pub fn new(min: usize, max: usize) -> Result<Self, CodecError> {
        if min > max {
            return Err(CodecError::MalformedRange(format!(
                "min ({min}) must not exceed max ({max})"
            )));
        }
        Ok(RangeSpec {
            bounds: Some((min, max)),
        })
    }

    /// Parses `"min-max"`. An empty string yields the absent range. Any
    /// other malformed input fails with [`CodecError::MalformedRange`].
    pub fn parse(raw: &str) -> Result<Self, CodecError> {
        if raw.is_empty() {
            return Ok(Self::none());
        }

        let (min_str, max_str) = raw.split_once('-').ok_or_else(|| {
            CodecError::MalformedRange(format!("expected \"min-max\", got {raw:?}"))
        })?;

        let min: usize = min_str
            .parse()
            .map_err(|_| CodecError::MalformedRange(format!("invalid min in {raw:?}")))?;
        let max: usize = max_str
            .parse()
            .map_err(|_| CodecError::MalformedRange(format!("invalid max in {raw:?}")))?;

        Self::new(min, max)
    }

    /// True iff a range is present.
    pub fn present(&self) -> bool {
        self.bounds.is_some()
    }

    /// The lower bound, if present.
    pub fn min(&self) -> Option<usize> {
        self.bounds.map(|(min, _)| min)
    }

    /// The upper bound (inclusive), if present.
    pub fn max(&self) -> Option<usize> {
        self.bounds.map(|(_, max)| max)
    }

    /// Renders back to `"min-max"`, or the empty string when absent. Used as
    /// part of `FileMetadata`'s cache-key identity.
    pub fn to_range_string(&self) -> String {
        match self.bounds {
            Some((min, max)) => format!("{min}-{max}"),
            None => String::new(),
        }
    }
}
