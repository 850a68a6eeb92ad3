use std::collections::HashMap;

use serde::Serialize;

use crate::correlation::{correlation_matrix, CorrelationMatrix};
use crate::flow::{flow_graph, FlowGraph};
use crate::record::PoemRecord;
use crate::taxonomy::{Emotion, PeriodId, RegionId, TaxonomyCatalog};

/// Fixed-size emotion counter keyed by canonical emotion order.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EmotionTally {
    counts: [u64; Emotion::COUNT],
}

impl EmotionTally {
    pub fn increment(&mut self, emotion: Emotion) {
        self.counts[emotion.index()] += 1;
    }

    pub fn add(&mut self, emotion: Emotion, count: u64) {
        self.counts[emotion.index()] += count;
    }

    pub fn count(&self, emotion: Emotion) -> u64 {
        self.counts[emotion.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Percentage breakdown across emotions. An empty tally yields all
    /// zeroes, never NaN.
    pub fn percentages(&self) -> [f64; Emotion::COUNT] {
        let total = self.total();
        if total == 0 {
            return [0.0; Emotion::COUNT];
        }
        let mut out = [0.0; Emotion::COUNT];
        for (slot, count) in out.iter_mut().zip(self.counts) {
            *slot = count as f64 / total as f64 * 100.0;
        }
        out
    }

    /// Weighted emotional score in `[-1, 1]`: `Σ(pct × weight) / 100`.
    pub fn emotional_score(&self) -> f64 {
        self.percentages()
            .iter()
            .zip(Emotion::ALL)
            .map(|(pct, emotion)| pct * emotion.weight())
            .sum::<f64>()
            / 100.0
    }

    /// Highest-count emotion; ties resolve to the first emotion in
    /// canonical order. `None` only for an empty tally.
    pub fn dominant(&self) -> Option<Emotion> {
        if self.total() == 0 {
            return None;
        }
        let mut best = Emotion::ALL[0];
        for emotion in Emotion::ALL {
            if self.count(emotion) > self.count(best) {
                best = emotion;
            }
        }
        Some(best)
    }
}

/// Single-pass occurrence counts over a record set.
#[derive(Debug, Clone, Default)]
pub struct RecordCounts {
    pub by_period: Vec<u64>,
    pub by_emotion: EmotionTally,
    pub by_period_emotion: Vec<EmotionTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineBucket {
    pub start_year: i32,
    pub total: u64,
    pub percentages: [f64; Emotion::COUNT],
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionalProfile {
    pub region: RegionId,
    pub label: String,
    pub total: u64,
    pub percentages: [f64; Emotion::COUNT],
    pub emotional_score: f64,
    /// Up to three most frequent cultural contexts among this region's
    /// records, descending by count.
    pub top_contexts: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapCell {
    pub start_year: i32,
    pub bucket_index: usize,
    pub region: RegionId,
    pub region_index: usize,
    /// Intensity-weighted emotional score `Σ(weight × intensity) / n`.
    pub score: f64,
    /// Absolute score, for color ramps.
    pub intensity: f64,
    pub count: u64,
    pub dominant_emotion: Emotion,
}

/// Derived read-only views over one record set. Counts are folded once at
/// construction; every other accessor is a pure recomputation, safe to
/// call repeatedly from any number of consumers.
#[derive(Debug)]
pub struct CorpusAnalytics<'a> {
    catalog: &'a TaxonomyCatalog,
    records: &'a [PoemRecord],
    counts: RecordCounts,
}

impl<'a> CorpusAnalytics<'a> {
    pub fn build(catalog: &'a TaxonomyCatalog, records: &'a [PoemRecord]) -> Self {
        let period_count = catalog.periods().len();
        let mut counts = RecordCounts {
            by_period: vec![0; period_count],
            by_emotion: EmotionTally::default(),
            by_period_emotion: vec![EmotionTally::default(); period_count],
        };
        for record in records {
            counts.by_period[record.period.0 as usize] += 1;
            counts.by_emotion.increment(record.emotion);
            counts.by_period_emotion[record.period.0 as usize].increment(record.emotion);
        }
        Self {
            catalog,
            records,
            counts,
        }
    }

    pub fn catalog(&self) -> &TaxonomyCatalog {
        self.catalog
    }

    pub fn records(&self) -> &[PoemRecord] {
        self.records
    }

    pub fn by_period(&self) -> &[u64] {
        &self.counts.by_period
    }

    pub fn by_emotion(&self) -> &EmotionTally {
        &self.counts.by_emotion
    }

    pub fn by_period_emotion(&self) -> &[EmotionTally] {
        &self.counts.by_period_emotion
    }

    pub fn total(&self) -> u64 {
        self.counts.by_emotion.total()
    }

    /// Fixed-width year buckets spanning the catalog's full chronological
    /// range. Buckets with no records keep all-zero percentages so the
    /// timeline stays positionally dense for scrubbers.
    pub fn timeline(&self, bucket_width_years: i32) -> Vec<TimelineBucket> {
        let width = bucket_width_years.max(1);
        let (span_start, span_end) = self.catalog.year_span();
        let mut buckets = Vec::new();
        let mut start_year = span_start;
        while start_year <= span_end {
            let mut tally = EmotionTally::default();
            for record in self.records {
                if record.year >= start_year && record.year < start_year + width {
                    tally.increment(record.emotion);
                }
            }
            buckets.push(TimelineBucket {
                start_year,
                total: tally.total(),
                percentages: tally.percentages(),
            });
            start_year += width;
        }
        buckets
    }

    /// Per-region emotion breakdown and normalized emotional score.
    /// Regions without records keep zero percentages and a zero score.
    pub fn regional_profiles(&self) -> Vec<RegionalProfile> {
        self.catalog
            .region_ids()
            .map(|region| {
                let mut tally = EmotionTally::default();
                let mut contexts: HashMap<&str, u64> = HashMap::new();
                for record in self.records {
                    if record.region == region {
                        tally.increment(record.emotion);
                        if !record.cultural_context.is_empty() {
                            *contexts.entry(record.cultural_context.as_str()).or_default() += 1;
                        }
                    }
                }
                let mut top_contexts: Vec<(String, u64)> = contexts
                    .into_iter()
                    .map(|(context, count)| (context.to_string(), count))
                    .collect();
                top_contexts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
                top_contexts.truncate(3);
                RegionalProfile {
                    region,
                    label: self.catalog.region(region).label.clone(),
                    total: tally.total(),
                    percentages: tally.percentages(),
                    emotional_score: tally.emotional_score(),
                    top_contexts,
                }
            })
            .collect()
    }

    /// (time-bucket × region) cells with at least one record. Empty cells
    /// are omitted rather than zero-filled so renderers can distinguish
    /// "no data" from "neutral data".
    pub fn heatmap(&self, bucket_width_years: i32) -> Vec<HeatmapCell> {
        let width = bucket_width_years.max(1);
        let (span_start, span_end) = self.catalog.year_span();
        let mut cells = Vec::new();
        let mut start_year = span_start;
        let mut bucket_index = 0usize;
        while start_year <= span_end {
            for (region_index, region) in self.catalog.region_ids().enumerate() {
                let mut tally = EmotionTally::default();
                let mut weighted = 0.0;
                for record in self.records {
                    if record.region == region
                        && record.year >= start_year
                        && record.year < start_year + width
                    {
                        tally.increment(record.emotion);
                        weighted += record.emotion.weight() * record.emotional_intensity;
                    }
                }
                let count = tally.total();
                if count == 0 {
                    continue;
                }
                let score = weighted / count as f64;
                cells.push(HeatmapCell {
                    start_year,
                    bucket_index,
                    region,
                    region_index,
                    score,
                    intensity: score.abs(),
                    count,
                    // count > 0 guarantees a dominant emotion
                    dominant_emotion: tally.dominant().unwrap_or(Emotion::Neutral),
                });
            }
            start_year += width;
            bucket_index += 1;
        }
        cells
    }

    pub fn flow_graph(&self) -> FlowGraph {
        flow_graph(self.catalog, self.records)
    }

    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        correlation_matrix(self.catalog, self.records)
    }

    /// Count tally restricted to a period subset. Used by the prevalence
    /// query; exposed for renderers that show per-selection breakdowns.
    pub fn tally_for_periods(&self, periods: &[PeriodId]) -> EmotionTally {
        let mut tally = EmotionTally::default();
        for period in periods {
            let index = period.0 as usize;
            if index >= self.counts.by_period_emotion.len() {
                continue;
            }
            for emotion in Emotion::ALL {
                tally.add(emotion, self.counts.by_period_emotion[index].count(emotion));
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, GeneratorConfig};

    fn sample_records() -> (&'static TaxonomyCatalog, crate::record::RecordSet) {
        let catalog = TaxonomyCatalog::builtin();
        let config = GeneratorConfig {
            total_records: 4_000,
            seed: 1234,
            ..GeneratorConfig::default()
        };
        (catalog, generate(catalog, &config).expect("generation"))
    }

    #[test]
    fn counts_sum_to_record_total() {
        let (catalog, set) = sample_records();
        let analytics = CorpusAnalytics::build(catalog, &set.records);
        let by_period: u64 = analytics.by_period().iter().sum();
        assert_eq!(by_period, set.len() as u64);
        assert_eq!(analytics.by_emotion().total(), set.len() as u64);
        let by_period_emotion: u64 = analytics
            .by_period_emotion()
            .iter()
            .map(|tally| tally.total())
            .sum();
        assert_eq!(by_period_emotion, set.len() as u64);
    }

    #[test]
    fn timeline_percentages_sum_to_hundred_or_zero() {
        let (catalog, set) = sample_records();
        let analytics = CorpusAnalytics::build(catalog, &set.records);
        let timeline = analytics.timeline(10);
        assert!(!timeline.is_empty());
        assert_eq!(timeline[0].start_year, 618);
        let mut populated = 0;
        for bucket in &timeline {
            let sum: f64 = bucket.percentages.iter().sum();
            if bucket.total > 0 {
                populated += 1;
                assert!((sum - 100.0).abs() < 0.01, "bucket sum {sum}");
            } else {
                assert_eq!(sum, 0.0);
            }
        }
        assert!(populated > 0);
    }

    #[test]
    fn timeline_totals_cover_every_record() {
        let (catalog, set) = sample_records();
        let analytics = CorpusAnalytics::build(catalog, &set.records);
        let bucketed: u64 = analytics.timeline(10).iter().map(|b| b.total).sum();
        assert_eq!(bucketed, set.len() as u64);
    }

    #[test]
    fn regional_scores_stay_normalized() {
        let (catalog, set) = sample_records();
        let analytics = CorpusAnalytics::build(catalog, &set.records);
        let profiles = analytics.regional_profiles();
        assert_eq!(profiles.len(), catalog.regions().len());
        for profile in &profiles {
            assert!((-1.0..=1.0).contains(&profile.emotional_score));
            assert!(profile.top_contexts.len() <= 3);
        }
    }

    #[test]
    fn heatmap_omits_empty_cells() {
        let (catalog, set) = sample_records();
        let analytics = CorpusAnalytics::build(catalog, &set.records);
        for cell in analytics.heatmap(10) {
            assert!(cell.count > 0);
            assert!((-1.0..=1.0).contains(&cell.score));
            assert_eq!(cell.intensity, cell.score.abs());
        }
    }

    #[test]
    fn empty_record_set_degrades_to_zeroes() {
        let catalog = TaxonomyCatalog::builtin();
        let analytics = CorpusAnalytics::build(catalog, &[]);
        assert_eq!(analytics.total(), 0);
        assert!(analytics.heatmap(10).is_empty());
        assert!(analytics.timeline(10).iter().all(|b| b.total == 0));
        assert!(analytics
            .regional_profiles()
            .iter()
            .all(|p| p.total == 0 && p.emotional_score == 0.0));
    }

    #[test]
    fn dominant_emotion_tie_breaks_canonically() {
        let mut tally = EmotionTally::default();
        tally.increment(Emotion::Neutral);
        tally.increment(Emotion::Negative);
        // Equal counts: Neutral precedes Negative in canonical order.
        assert_eq!(tally.dominant(), Some(Emotion::Neutral));
    }
}
