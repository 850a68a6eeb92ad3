use rand::{rngs::SmallRng, Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::record::{GeoPoint, PoemRecord, RecordSet};
use crate::sampling::{SampleError, WeightedTable};
use crate::taxonomy::{Emotion, PeriodDef, TaxonomyCatalog};

const GENERATOR_SEED_SALT: u64 = 0x7A96_50E9;

const AUTHOR_SURNAMES: [&str; 10] = ["李", "杜", "王", "陈", "张", "刘", "黄", "赵", "周", "吴"];
const AUTHOR_GIVEN_NAMES: [&str; 10] = [
    "白", "甫", "维", "昌龄", "之涣", "贺", "商隐", "牧", "湾", "参",
];

/// Tunable knobs for one generation run. Distribution tables (period
/// shares, emotion profiles, region weights, anchor importances) live in
/// the [`TaxonomyCatalog`]; this struct carries only scalars.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Target record count. The realized total is
    /// `Σ floor(total × share)` across periods, which may fall short of
    /// the target; the shortfall is expected and never padded.
    pub total_records: u32,
    /// Seed for the record stream. Zero requests entropy seeding, which
    /// matches the non-reproducible behavior of a live session.
    pub seed: u64,
    /// Probability that a year draw is restricted to the middle band of
    /// its period, modelling higher surviving-work density mid-period.
    pub middle_bias_probability: f64,
    /// Width of that middle band as a fraction of the period span.
    pub middle_band_fraction: f64,
    /// Half-width of the uniform coordinate jitter, in degrees.
    pub jitter_degrees: f64,
    /// Events further than this many years from a record have no
    /// influence on it. Zero disables event influence entirely.
    pub event_proximity_years: i32,
    /// Accumulated shift magnitude that must be exceeded before an
    /// event nudge is considered.
    pub event_shift_threshold: f64,
    /// Probability that a triggered nudge actually demotes the emotion
    /// to neutral.
    pub demote_probability: f64,
    pub intensity_floor: f64,
    pub intensity_ceiling: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            total_records: 20_847,
            seed: 0,
            middle_bias_probability: 0.3,
            middle_band_fraction: 0.6,
            jitter_degrees: 0.25,
            event_proximity_years: 5,
            event_shift_threshold: 0.1,
            demote_probability: 0.3,
            intensity_floor: 0.2,
            intensity_ceiling: 1.0,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<(), GenerateError> {
        let unit_interval = [
            ("middle_bias_probability", self.middle_bias_probability),
            ("demote_probability", self.demote_probability),
            ("intensity_floor", self.intensity_floor),
            ("intensity_ceiling", self.intensity_ceiling),
        ];
        for (field, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(GenerateError::InvalidConfig { field, value });
            }
        }
        if !(self.middle_band_fraction > 0.0 && self.middle_band_fraction <= 1.0) {
            return Err(GenerateError::InvalidConfig {
                field: "middle_band_fraction",
                value: self.middle_band_fraction,
            });
        }
        if self.jitter_degrees < 0.0 || !self.jitter_degrees.is_finite() {
            return Err(GenerateError::InvalidConfig {
                field: "jitter_degrees",
                value: self.jitter_degrees,
            });
        }
        if self.event_proximity_years < 0 {
            return Err(GenerateError::InvalidConfig {
                field: "event_proximity_years",
                value: self.event_proximity_years as f64,
            });
        }
        if self.event_shift_threshold < 0.0 {
            return Err(GenerateError::InvalidConfig {
                field: "event_shift_threshold",
                value: self.event_shift_threshold,
            });
        }
        if self.intensity_floor > self.intensity_ceiling {
            return Err(GenerateError::InvalidConfig {
                field: "intensity_floor",
                value: self.intensity_floor,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("config field {field} has invalid value {value}")]
    InvalidConfig { field: &'static str, value: f64 },
    #[error("period references unknown region '{region}'")]
    UnknownRegion { region: String },
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Produce the full synthetic corpus in one synchronous pass.
///
/// Records are generated period by period in chronological order, ids
/// running sequentially from 1 across the whole run. The returned set is
/// immutable by convention: every downstream view recomputes rather than
/// mutates.
pub fn generate(
    catalog: &TaxonomyCatalog,
    config: &GeneratorConfig,
) -> Result<RecordSet, GenerateError> {
    config.validate()?;

    let mut rng = if config.seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(config.seed ^ GENERATOR_SEED_SALT)
    };

    // Anchor importance tables are period-independent; build them once.
    let anchor_tables = catalog
        .regions()
        .iter()
        .map(|region| {
            WeightedTable::new(
                region
                    .anchors
                    .iter()
                    .enumerate()
                    .map(|(index, anchor)| (index, anchor.importance))
                    .collect(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut records = Vec::new();
    let mut next_id = 1u32;
    let mut demoted_to_neutral = 0u64;

    for period_id in catalog.period_ids() {
        let period = catalog.period(period_id);
        let count = (config.total_records as f64 * period.share).floor() as u64;

        let emotion_table = WeightedTable::with_fallback(
            period
                .emotion_profile
                .iter()
                .map(|(emotion, weight)| (*emotion, *weight))
                .collect(),
            Emotion::Neutral,
        )?;
        let region_table = WeightedTable::new(
            period
                .region_distribution
                .iter()
                .map(|(region, weight)| {
                    catalog
                        .find_region(region)
                        .map(|id| (id, *weight))
                        .ok_or_else(|| GenerateError::UnknownRegion {
                            region: region.clone(),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?,
        )?;

        debug!(
            target: "verse_atlas::generator",
            period = %period.id,
            share = period.share,
            requested = count,
            "generator.period.begin"
        );

        for _ in 0..count {
            let base_emotion = emotion_table.sample(&mut rng);
            let region_id = region_table.sample(&mut rng);
            let region = catalog.region(region_id);
            let anchor_index = anchor_tables[region_id.0 as usize].sample(&mut rng);
            let anchor = &region.anchors[anchor_index];
            let year = sample_year(period, config, &mut rng);
            let (emotion, demoted) =
                apply_event_influence(base_emotion, year, catalog, config, &mut rng);
            if demoted {
                demoted_to_neutral += 1;
            }

            let location = GeoPoint {
                name: anchor.name.clone(),
                lat: anchor.lat + jitter(&mut rng, config.jitter_degrees),
                lng: anchor.lng + jitter(&mut rng, config.jitter_degrees),
                modern_name: anchor.modern_name.clone(),
                importance: anchor.importance,
            };

            let id = next_id;
            next_id += 1;
            records.push(PoemRecord {
                id,
                period: period_id,
                region: region_id,
                emotion,
                year,
                location,
                title: format!("Poem {id}"),
                author: synthesize_author(&mut rng),
                emotional_intensity: config.intensity_floor
                    + rng.gen::<f64>() * (config.intensity_ceiling - config.intensity_floor),
                cultural_context: pick_cultural_context(period, &mut rng),
                keywords: pick_keywords(emotion, &mut rng),
            });
        }
    }

    info!(
        target: "verse_atlas::generator",
        requested = config.total_records,
        realized = records.len(),
        demoted_to_neutral,
        periods = catalog.periods().len(),
        "generator.run.complete"
    );

    Ok(RecordSet::new(records))
}

/// Uniform year within the period span, biased toward the middle band
/// with probability `middle_bias_probability`.
fn sample_year(period: &PeriodDef, config: &GeneratorConfig, rng: &mut SmallRng) -> i32 {
    let margin = (1.0 - config.middle_band_fraction) / 2.0;
    let fraction = if rng.gen::<f64>() < config.middle_bias_probability {
        margin + rng.gen::<f64>() * config.middle_band_fraction
    } else {
        rng.gen::<f64>()
    };
    period.start_year + (period.span_years() as f64 * fraction).floor() as i32
}

/// Accumulate linearly-decaying shift from nearby events, then maybe
/// demote the emotion toward neutral. A net positive shift can only soften
/// negative-side emotions and a net negative shift only positive-side
/// ones; the nudge is probabilistic, never a hard override.
fn apply_event_influence(
    emotion: Emotion,
    year: i32,
    catalog: &TaxonomyCatalog,
    config: &GeneratorConfig,
    rng: &mut SmallRng,
) -> (Emotion, bool) {
    if config.event_proximity_years == 0 {
        return (emotion, false);
    }

    let mut shift = 0.0;
    for event in catalog.events() {
        let year_diff = (year - event.year).abs();
        if year_diff <= config.event_proximity_years {
            let proximity = 1.0 - year_diff as f64 / config.event_proximity_years as f64;
            shift += event.emotion_shift * proximity;
        }
    }

    let triggered = (shift > config.event_shift_threshold && emotion.is_negative_side())
        || (shift < -config.event_shift_threshold && emotion.is_positive_side());
    if triggered && rng.gen::<f64>() < config.demote_probability {
        (Emotion::Neutral, true)
    } else {
        (emotion, false)
    }
}

fn jitter(rng: &mut SmallRng, degrees: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * 2.0 * degrees
}

fn synthesize_author(rng: &mut SmallRng) -> String {
    let surname = AUTHOR_SURNAMES[rng.gen_range(0..AUTHOR_SURNAMES.len())];
    let given = AUTHOR_GIVEN_NAMES[rng.gen_range(0..AUTHOR_GIVEN_NAMES.len())];
    format!("{surname}{given}")
}

fn pick_cultural_context(period: &PeriodDef, rng: &mut SmallRng) -> String {
    if period.cultural_contexts.is_empty() {
        return String::new();
    }
    period.cultural_contexts[rng.gen_range(0..period.cultural_contexts.len())].clone()
}

fn pick_keywords(emotion: Emotion, rng: &mut SmallRng) -> Vec<&'static str> {
    let pool = emotion.keywords();
    let take = rng.gen_range(1..=3).min(pool.len());
    pool[..take].to_vec()
}
