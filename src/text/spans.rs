//! Attribution spans
//!
//! [`AttributedSpans`] stores `(start, end, attribution)` triples over a
//! character sequence it does not own. Ranges are inclusive at both ends.
//!
//! After every mutation the collection is normalized:
//! - spans of the same attribution never overlap or touch (they are merged),
//! - spans are ordered by `(start, end, attribution)`.
//!
//! Exclusive families (text colour, background, font size) are resolved on
//! insertion: adding one value evicts other values of the same family from
//! the affected characters.

use crate::attribution::{Attribution, AttributionFamily};
use std::cmp::Ordering;

// ─────────────────────────────────────────────────────────────────────────────
// Span Range
// ─────────────────────────────────────────────────────────────────────────────

/// An inclusive character range `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanRange {
    pub start: usize,
    pub end: usize,
}

impl SpanRange {
    /// Create a range, ordering the endpoints if they arrive reversed.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A range covering one character.
    pub fn single(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Convert a half-open `[start, end)` range. Empty ranges yield `None`.
    pub fn from_exclusive(start: usize, end: usize) -> Option<Self> {
        if start < end {
            Some(Self {
                start,
                end: end - 1,
            })
        } else {
            None
        }
    }

    /// Number of characters covered (never zero).
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn end_exclusive(&self) -> usize {
        self.end + 1
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn contains_range(&self, other: &SpanRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &SpanRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(&self, other: &SpanRange) -> Option<SpanRange> {
        if self.overlaps(other) {
            Some(SpanRange {
                start: self.start.max(other.start),
                end: self.end.min(other.end),
            })
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attribution Span
// ─────────────────────────────────────────────────────────────────────────────

/// One attribution applied to an inclusive character range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributionSpan {
    pub attribution: Attribution,
    pub start: usize,
    pub end: usize,
}

impl AttributionSpan {
    pub fn new(attribution: Attribution, range: SpanRange) -> Self {
        Self {
            attribution,
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> SpanRange {
        SpanRange {
            start: self.start,
            end: self.end,
        }
    }
}

fn document_order(a: &AttributionSpan, b: &AttributionSpan) -> Ordering {
    a.start
        .cmp(&b.start)
        .then(a.end.cmp(&b.end))
        .then_with(|| a.attribution.cmp(&b.attribution))
}

/// A maximal stretch of characters sharing one set of attributions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionRun {
    pub range: SpanRange,
    pub attributions: Vec<Attribution>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Attributed Spans
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized collection of attribution spans.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributedSpans {
    spans: Vec<AttributionSpan>,
}

impl AttributedSpans {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from arbitrary spans, normalizing them.
    ///
    /// Exclusive families are resolved in input order, so a later colour wins
    /// over an earlier one on shared characters.
    pub fn from_spans(spans: impl IntoIterator<Item = AttributionSpan>) -> Self {
        let mut collection = Self::new();
        for span in spans {
            let range = span.range();
            collection.add(span.attribution, range);
        }
        collection
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributionSpan> {
        self.spans.iter()
    }

    pub fn as_slice(&self) -> &[AttributionSpan] {
        &self.spans
    }

    /// All spans carrying exactly `attribution`, in document order.
    pub fn spans_of<'a>(
        &'a self,
        attribution: &'a Attribution,
    ) -> impl Iterator<Item = &'a AttributionSpan> + 'a {
        self.spans
            .iter()
            .filter(move |span| &span.attribution == attribution)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply `attribution` over `range`, merging with touching spans of the
    /// same attribution and evicting conflicting values of its family.
    pub fn add(&mut self, attribution: Attribution, range: SpanRange) {
        if attribution.is_exclusive() {
            self.remove_matching(|existing| attribution.conflicts_with(existing), range);
        }
        self.spans.push(AttributionSpan::new(attribution, range));
        self.normalize();
    }

    /// Remove `attribution` from `range`, trimming or splitting spans.
    ///
    /// Returns `true` if any character lost the attribution.
    pub fn remove(&mut self, attribution: &Attribution, range: SpanRange) -> bool {
        self.remove_matching(|existing| existing == attribution, range)
    }

    /// Remove every attribution of `family` from `range`.
    pub fn remove_family(&mut self, family: AttributionFamily, range: SpanRange) -> bool {
        self.remove_matching(|existing| existing.family() == family, range)
    }

    /// Remove every attribution accepted by `predicate` from `range`.
    pub fn remove_matching<F>(&mut self, predicate: F, range: SpanRange) -> bool
    where
        F: Fn(&Attribution) -> bool,
    {
        let mut removed = false;
        let mut kept = Vec::with_capacity(self.spans.len() + 1);

        for span in self.spans.drain(..) {
            if !predicate(&span.attribution) || !span.range().overlaps(&range) {
                kept.push(span);
                continue;
            }
            removed = true;
            if span.start < range.start {
                kept.push(AttributionSpan {
                    attribution: span.attribution.clone(),
                    start: span.start,
                    end: range.start - 1,
                });
            }
            if span.end > range.end {
                kept.push(AttributionSpan {
                    attribution: span.attribution,
                    start: range.end + 1,
                    end: span.end,
                });
            }
        }

        self.spans = kept;
        self.spans.sort_by(document_order);
        removed
    }

    /// Keep only spans accepted by `predicate`, regardless of position.
    pub fn retain<F>(&mut self, predicate: F) -> bool
    where
        F: Fn(&AttributionSpan) -> bool,
    {
        let before = self.spans.len();
        self.spans.retain(|span| predicate(span));
        before != self.spans.len()
    }

    /// Drop or trim spans reaching past a text of `len` characters.
    pub fn clip(&mut self, len: usize) {
        if len == 0 {
            self.spans.clear();
            return;
        }
        self.spans.retain(|span| span.start < len);
        for span in &mut self.spans {
            span.end = span.end.min(len - 1);
        }
        self.normalize();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_at(&self, attribution: &Attribution, offset: usize) -> bool {
        self.spans_of(attribution)
            .any(|span| span.range().contains(offset))
    }

    /// Every attribution covering `offset`, in attribution order.
    pub fn attributions_at(&self, offset: usize) -> Vec<&Attribution> {
        let mut found: Vec<&Attribution> = self
            .spans
            .iter()
            .filter(|span| span.range().contains(offset))
            .map(|span| &span.attribution)
            .collect();
        found.sort();
        found
    }

    /// The attribution of `family` at `offset`, if any.
    pub fn family_at(&self, family: AttributionFamily, offset: usize) -> Option<&Attribution> {
        self.spans
            .iter()
            .find(|span| span.attribution.family() == family && span.range().contains(offset))
            .map(|span| &span.attribution)
    }

    /// True if every character of `range` carries `attribution`.
    ///
    /// Same-attribution spans are merged, so coverage means a single span
    /// contains the whole range.
    pub fn covers(&self, attribution: &Attribution, range: SpanRange) -> bool {
        self.spans_of(attribution)
            .any(|span| span.range().contains_range(&range))
    }

    /// Partition `[0, len)` into runs of identical attribution sets.
    pub fn collapse(&self, len: usize) -> Vec<AttributionRun> {
        if len == 0 {
            return Vec::new();
        }

        let mut boundaries = vec![0, len];
        for span in &self.spans {
            if span.start < len {
                boundaries.push(span.start);
            }
            if span.end + 1 < len {
                boundaries.push(span.end + 1);
            }
        }
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut runs: Vec<AttributionRun> = Vec::with_capacity(boundaries.len());
        for window in boundaries.windows(2) {
            let range = SpanRange {
                start: window[0],
                end: window[1] - 1,
            };
            let attributions: Vec<Attribution> = self
                .attributions_at(range.start)
                .into_iter()
                .cloned()
                .collect();
            match runs.last_mut() {
                Some(last) if last.attributions == attributions => last.range.end = range.end,
                _ => runs.push(AttributionRun {
                    range,
                    attributions,
                }),
            }
        }
        runs
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Edit Tracking
    // ─────────────────────────────────────────────────────────────────────────

    /// Account for `count` characters inserted before `offset`.
    ///
    /// Spans strictly enclosing the insertion point grow; spans starting at
    /// or after it shift right.
    pub fn on_insert(&mut self, offset: usize, count: usize) {
        if count == 0 {
            return;
        }
        for span in &mut self.spans {
            if span.start >= offset {
                span.start += count;
                span.end += count;
            } else if span.end >= offset {
                span.end += count;
            }
        }
    }

    /// Account for the characters of `range` being deleted.
    pub fn on_delete(&mut self, range: SpanRange) {
        let removed = range.len();
        let mut kept = Vec::with_capacity(self.spans.len());

        for mut span in self.spans.drain(..) {
            if span.end < range.start {
                kept.push(span);
            } else if span.start > range.end {
                span.start -= removed;
                span.end -= removed;
                kept.push(span);
            } else {
                let lost = span
                    .range()
                    .intersection(&range)
                    .map(|overlap| overlap.len())
                    .unwrap_or(0);
                let remaining = span.range().len() - lost;
                if remaining > 0 {
                    span.start = span.start.min(range.start);
                    span.end = span.start + remaining - 1;
                    kept.push(span);
                }
            }
        }

        self.spans = kept;
        self.normalize();
    }

    /// Split into the spans before `offset` and the spans from `offset` on,
    /// the latter re-based to start at zero.
    pub fn split_at(&self, offset: usize) -> (AttributedSpans, AttributedSpans) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for span in &self.spans {
            if span.start < offset {
                left.push(AttributionSpan {
                    attribution: span.attribution.clone(),
                    start: span.start,
                    end: span.end.min(offset - 1),
                });
            }
            if span.end >= offset {
                right.push(AttributionSpan {
                    attribution: span.attribution.clone(),
                    start: span.start.max(offset) - offset,
                    end: span.end - offset,
                });
            }
        }

        (
            AttributedSpans { spans: left },
            AttributedSpans { spans: right },
        )
    }

    /// Copy the spans intersecting `range`, re-based to start at zero.
    pub fn slice(&self, range: SpanRange) -> AttributedSpans {
        let spans = self
            .spans
            .iter()
            .filter_map(|span| {
                span.range().intersection(&range).map(|overlap| AttributionSpan {
                    attribution: span.attribution.clone(),
                    start: overlap.start - range.start,
                    end: overlap.end - range.start,
                })
            })
            .collect();
        AttributedSpans { spans }
    }

    /// Append `other`'s spans shifted right by `shift` characters.
    ///
    /// Same-attribution spans meeting at the seam are merged.
    pub fn append(&mut self, other: AttributedSpans, shift: usize) {
        self.spans.extend(other.spans.into_iter().map(|mut span| {
            span.start += shift;
            span.end += shift;
            span
        }));
        self.normalize();
    }

    fn normalize(&mut self) {
        self.spans.retain(|span| span.start <= span.end);
        self.spans.sort_by(|a, b| {
            a.attribution
                .cmp(&b.attribution)
                .then(a.start.cmp(&b.start))
                .then(a.end.cmp(&b.end))
        });

        let mut merged: Vec<AttributionSpan> = Vec::with_capacity(self.spans.len());
        for span in self.spans.drain(..) {
            if let Some(last) = merged.last_mut() {
                if last.attribution == span.attribution && span.start <= last.end + 1 {
                    last.end = last.end.max(span.end);
                    continue;
                }
            }
            merged.push(span);
        }

        merged.sort_by(document_order);
        self.spans = merged;
    }
}

impl<'a> IntoIterator for &'a AttributedSpans {
    type Item = &'a AttributionSpan;
    type IntoIter = std::slice::Iter<'a, AttributionSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
