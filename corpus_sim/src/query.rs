use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::EmotionTally;
use crate::record::{PoemRecord, RecordSet};
use crate::taxonomy::{Emotion, PeriodId, RegionId, TaxonomyCatalog};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The selection matched no records. Empty is a valid state, not a
    /// failure; callers decide how to render it.
    #[error("no records match the requested selection")]
    DataUnavailable,
}

/// Conjunctive record filter: every populated dimension must match.
/// Unset dimensions match everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub periods: Option<Vec<PeriodId>>,
    pub emotions: Option<Vec<Emotion>>,
    pub regions: Option<Vec<RegionId>>,
    /// Inclusive year bounds.
    pub year_range: Option<(i32, i32)>,
}

impl RecordFilter {
    pub fn matches(&self, record: &PoemRecord) -> bool {
        if let Some(periods) = &self.periods {
            if !periods.contains(&record.period) {
                return false;
            }
        }
        if let Some(emotions) = &self.emotions {
            if !emotions.contains(&record.emotion) {
                return false;
            }
        }
        if let Some(regions) = &self.regions {
            if !regions.contains(&record.region) {
                return false;
            }
        }
        if let Some((start, end)) = self.year_range {
            if record.year < start || record.year > end {
                return false;
            }
        }
        true
    }
}

/// Produce a new set holding the matching records. The input set is never
/// mutated; applying the same filter twice is a no-op on the second pass.
pub fn filter(records: &RecordSet, filter: &RecordFilter) -> RecordSet {
    RecordSet::new(
        records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct PrevalentEmotion {
    pub emotion: Emotion,
    pub label: &'static str,
    /// Share of the selection, rounded to the nearest integer percent.
    pub percentage: u32,
}

/// Highest-count emotion over the whole set or a period subset. Ties
/// resolve to the first emotion in canonical taxonomy order.
pub fn most_prevalent_emotion(
    records: &RecordSet,
    periods: Option<&[PeriodId]>,
) -> Result<PrevalentEmotion, QueryError> {
    let mut tally = EmotionTally::default();
    for record in records.iter() {
        if in_period_subset(periods, record.period) {
            tally.increment(record.emotion);
        }
    }
    let total = tally.total();
    let emotion = tally.dominant().ok_or(QueryError::DataUnavailable)?;
    let percentage = (tally.count(emotion) as f64 / total as f64 * 100.0).round() as u32;
    Ok(PrevalentEmotion {
        emotion,
        label: emotion.display_label(),
        percentage,
    })
}

fn in_period_subset(periods: Option<&[PeriodId]>, period: PeriodId) -> bool {
    match periods {
        None => true,
        Some(subset) => subset.contains(&period),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub period: PeriodId,
    pub label: String,
    /// Weighted emotional score in `[-1, 1]` (percentage × weight form,
    /// intensity not applied).
    pub score: f64,
    pub total: u64,
}

/// Per-period weighted emotional score, in the given period order.
/// Periods with no records contribute a zero score so callers can still
/// compute first-vs-last deltas positionally.
pub fn emotional_trend(
    catalog: &TaxonomyCatalog,
    records: &RecordSet,
    periods: &[PeriodId],
) -> Vec<TrendPoint> {
    periods
        .iter()
        .map(|&period| {
            let mut tally = EmotionTally::default();
            for record in records.iter() {
                if record.period == period {
                    tally.increment(record.emotion);
                }
            }
            TrendPoint {
                period,
                label: catalog.period(period).label.clone(),
                score: tally.emotional_score(),
                total: tally.total(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DensityPoint {
    pub lat: f64,
    pub lng: f64,
    /// `min(count / 10, 1)`, as consumed by map heat layers.
    pub intensity: f64,
}

/// Map-layer density feed: records grouped by coordinate rounded to
/// 0.01°, optionally restricted to one emotion and/or a period subset.
/// Output order follows the rounded-coordinate grid, so it is stable for
/// a given record set.
pub fn location_density(
    records: &RecordSet,
    emotion: Option<Emotion>,
    periods: Option<&[PeriodId]>,
) -> Vec<DensityPoint> {
    let mut grouped: BTreeMap<(i64, i64), (f64, f64, u64)> = BTreeMap::new();
    for record in records.iter() {
        if let Some(wanted) = emotion {
            if record.emotion != wanted {
                continue;
            }
        }
        if !in_period_subset(periods, record.period) {
            continue;
        }
        let key = (
            (record.location.lat * 100.0).round() as i64,
            (record.location.lng * 100.0).round() as i64,
        );
        let entry = grouped
            .entry(key)
            .or_insert((record.location.lat, record.location.lng, 0));
        entry.2 += 1;
    }
    grouped
        .into_values()
        .map(|(lat, lng, count)| DensityPoint {
            lat,
            lng,
            intensity: (count as f64 / 10.0).min(1.0),
        })
        .collect()
}
