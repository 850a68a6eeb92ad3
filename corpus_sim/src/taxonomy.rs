use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in reference tables: the six Tang-Song periods, four macro
/// regions with their cultural anchor cities, and the historical events
/// that perturb emotional output.
pub const BUILTIN_TAXONOMY_CATALOG: &str = include_str!("data/taxonomy.json");

/// The five-category sentiment scale, ordered from most positive to most
/// negative. Order is canonical: tallies, tie-breaks, and sampling tables
/// all walk it in this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    Positive,
    ImplicitPositive,
    Neutral,
    ImplicitNegative,
    Negative,
}

impl Emotion {
    pub const COUNT: usize = 5;

    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Positive,
        Emotion::ImplicitPositive,
        Emotion::Neutral,
        Emotion::ImplicitNegative,
        Emotion::Negative,
    ];

    /// Index into canonical order, used by fixed-size tallies.
    pub fn index(self) -> usize {
        match self {
            Emotion::Positive => 0,
            Emotion::ImplicitPositive => 1,
            Emotion::Neutral => 2,
            Emotion::ImplicitNegative => 3,
            Emotion::Negative => 4,
        }
    }

    /// Numeric sentiment weight in `[-1.0, 1.0]`.
    pub fn weight(self) -> f64 {
        match self {
            Emotion::Positive => 1.0,
            Emotion::ImplicitPositive => 0.5,
            Emotion::Neutral => 0.0,
            Emotion::ImplicitNegative => -0.5,
            Emotion::Negative => -1.0,
        }
    }

    pub fn display_label(self) -> &'static str {
        match self {
            Emotion::Positive => "Positive",
            Emotion::ImplicitPositive => "Implicit Positive",
            Emotion::Neutral => "Neutral",
            Emotion::ImplicitNegative => "Implicit Negative",
            Emotion::Negative => "Negative",
        }
    }

    pub fn display_color(self) -> &'static str {
        match self {
            Emotion::Positive => "#2ECC71",
            Emotion::ImplicitPositive => "#3498DB",
            Emotion::Neutral => "#95A5A6",
            Emotion::ImplicitNegative => "#F39C12",
            Emotion::Negative => "#E74C3C",
        }
    }

    /// Representative keyword pool for synthesized records.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Emotion::Positive => &["joy", "celebration", "triumph", "beauty", "harmony"],
            Emotion::ImplicitPositive => &["hope", "peace", "tranquil", "gentle", "serene"],
            Emotion::Neutral => &["nature", "landscape", "river", "mountain", "season"],
            Emotion::ImplicitNegative => &["longing", "distant", "autumn", "evening", "solitude"],
            Emotion::Negative => &["sorrow", "separation", "loss", "war", "exile"],
        }
    }

    pub fn is_positive_side(self) -> bool {
        matches!(self, Emotion::Positive | Emotion::ImplicitPositive)
    }

    pub fn is_negative_side(self) -> bool {
        matches!(self, Emotion::Negative | Emotion::ImplicitNegative)
    }
}

/// Index of a period in the catalog's chronological order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeriodId(pub u16);

/// Index of a region in catalog order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RegionId(pub u16);

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodDef {
    pub id: String,
    pub label: String,
    pub start_year: i32,
    pub end_year: i32,
    pub color: String,
    /// Share of the target record total assigned to this period.
    pub share: f64,
    /// Emotion probability table, walked in canonical emotion order.
    pub emotion_profile: BTreeMap<Emotion, f64>,
    /// Region probability table keyed by region id.
    pub region_distribution: BTreeMap<String, f64>,
    #[serde(default)]
    pub cultural_contexts: Vec<String>,
}

impl PeriodDef {
    pub fn span_years(&self) -> i32 {
        self.end_year - self.start_year
    }

    pub fn contains_year(&self, year: i32) -> bool {
        year >= self.start_year && year <= self.end_year
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Anchor {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub modern_name: String,
    /// Cultural importance weight in `[0, 1]`, used for anchor sampling.
    pub importance: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionDef {
    pub id: String,
    pub label: String,
    pub color: String,
    pub anchors: Vec<Anchor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalEvent {
    pub year: i32,
    pub label: String,
    pub impact: String,
    pub emotion_shift: f64,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse taxonomy catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog defines no {0}")]
    EmptyTable(&'static str),
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
    #[error("period '{id}' has invalid bounds {start_year}..{end_year}")]
    InvalidPeriodBounds {
        id: String,
        start_year: i32,
        end_year: i32,
    },
    #[error("period '{id}' starts at {start_year}, before predecessor ends at {prev_end}")]
    PeriodsOutOfOrder {
        id: String,
        start_year: i32,
        prev_end: i32,
    },
    #[error("period '{period}' references unknown region '{region}'")]
    UnknownRegion { period: String, region: String },
    #[error("negative weight {weight} for '{key}' in period '{period}'")]
    NegativeWeight {
        period: String,
        key: String,
        weight: f64,
    },
    #[error("region '{id}' has no anchors")]
    NoAnchors { id: String },
    #[error("anchor '{anchor}' in region '{region}' has importance {importance} outside [0, 1]")]
    ImportanceOutOfRange {
        region: String,
        anchor: String,
        importance: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogData {
    periods: Vec<PeriodDef>,
    regions: Vec<RegionDef>,
    #[serde(default)]
    events: Vec<HistoricalEvent>,
}

/// Immutable reference data for one generation run. Periods are stored in
/// chronological order, regions in catalog order; `PeriodId` / `RegionId`
/// are indices into those orders.
#[derive(Debug, Clone)]
pub struct TaxonomyCatalog {
    periods: Vec<PeriodDef>,
    regions: Vec<RegionDef>,
    events: Vec<HistoricalEvent>,
}

impl TaxonomyCatalog {
    /// Parse and validate a catalog from JSON.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(raw)?;
        Self::from_data(data)
    }

    /// The built-in Tang-Song catalog. Parsed once; the embedded catalog
    /// is covered by unit tests and must always validate.
    pub fn builtin() -> &'static TaxonomyCatalog {
        static BUILTIN: OnceLock<TaxonomyCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            TaxonomyCatalog::from_json(BUILTIN_TAXONOMY_CATALOG)
                .expect("builtin taxonomy catalog must validate")
        })
    }

    fn from_data(data: CatalogData) -> Result<Self, CatalogError> {
        if data.periods.is_empty() {
            return Err(CatalogError::EmptyTable("periods"));
        }
        if data.regions.is_empty() {
            return Err(CatalogError::EmptyTable("regions"));
        }

        let mut seen_regions = Vec::new();
        for region in &data.regions {
            if seen_regions.contains(&region.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "region",
                    id: region.id.clone(),
                });
            }
            seen_regions.push(region.id.as_str());
            if region.anchors.is_empty() {
                return Err(CatalogError::NoAnchors {
                    id: region.id.clone(),
                });
            }
            for anchor in &region.anchors {
                if !(0.0..=1.0).contains(&anchor.importance) {
                    return Err(CatalogError::ImportanceOutOfRange {
                        region: region.id.clone(),
                        anchor: anchor.name.clone(),
                        importance: anchor.importance,
                    });
                }
            }
        }

        let mut seen_periods = Vec::new();
        let mut prev_end: Option<i32> = None;
        for period in &data.periods {
            if seen_periods.contains(&period.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    kind: "period",
                    id: period.id.clone(),
                });
            }
            seen_periods.push(period.id.as_str());
            if period.start_year >= period.end_year {
                return Err(CatalogError::InvalidPeriodBounds {
                    id: period.id.clone(),
                    start_year: period.start_year,
                    end_year: period.end_year,
                });
            }
            // Periods must be chronological; sharing a boundary year is
            // allowed (Northern Song ends the year Southern Song begins).
            if let Some(end) = prev_end {
                if period.start_year < end {
                    return Err(CatalogError::PeriodsOutOfOrder {
                        id: period.id.clone(),
                        start_year: period.start_year,
                        prev_end: end,
                    });
                }
            }
            prev_end = Some(period.end_year);

            if period.share < 0.0 {
                return Err(CatalogError::NegativeWeight {
                    period: period.id.clone(),
                    key: "share".to_string(),
                    weight: period.share,
                });
            }
            for (emotion, weight) in &period.emotion_profile {
                if *weight < 0.0 {
                    return Err(CatalogError::NegativeWeight {
                        period: period.id.clone(),
                        key: emotion.display_label().to_string(),
                        weight: *weight,
                    });
                }
            }
            for (region, weight) in &period.region_distribution {
                if !seen_regions.contains(&region.as_str()) {
                    return Err(CatalogError::UnknownRegion {
                        period: period.id.clone(),
                        region: region.clone(),
                    });
                }
                if *weight < 0.0 {
                    return Err(CatalogError::NegativeWeight {
                        period: period.id.clone(),
                        key: region.clone(),
                        weight: *weight,
                    });
                }
            }
        }

        Ok(Self {
            periods: data.periods,
            regions: data.regions,
            events: data.events,
        })
    }

    pub fn periods(&self) -> &[PeriodDef] {
        &self.periods
    }

    pub fn regions(&self) -> &[RegionDef] {
        &self.regions
    }

    pub fn events(&self) -> &[HistoricalEvent] {
        &self.events
    }

    pub fn period(&self, id: PeriodId) -> &PeriodDef {
        &self.periods[id.0 as usize]
    }

    pub fn region(&self, id: RegionId) -> &RegionDef {
        &self.regions[id.0 as usize]
    }

    pub fn period_ids(&self) -> impl Iterator<Item = PeriodId> {
        (0..self.periods.len() as u16).map(PeriodId)
    }

    pub fn region_ids(&self) -> impl Iterator<Item = RegionId> {
        (0..self.regions.len() as u16).map(RegionId)
    }

    pub fn find_period(&self, id: &str) -> Option<PeriodId> {
        self.periods
            .iter()
            .position(|period| period.id == id)
            .map(|idx| PeriodId(idx as u16))
    }

    pub fn find_region(&self, id: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|region| region.id == id)
            .map(|idx| RegionId(idx as u16))
    }

    /// Full chronological range `[earliest start, latest end]` across all
    /// periods.
    pub fn year_span(&self) -> (i32, i32) {
        let start = self
            .periods
            .iter()
            .map(|period| period.start_year)
            .min()
            .unwrap_or(0);
        let end = self
            .periods
            .iter()
            .map(|period| period.end_year)
            .max()
            .unwrap_or(0);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_validates() {
        let catalog = TaxonomyCatalog::builtin();
        assert_eq!(catalog.periods().len(), 6);
        assert_eq!(catalog.regions().len(), 4);
        assert_eq!(catalog.events().len(), 8);
        assert_eq!(catalog.year_span(), (618, 1279));

        let total_anchors: usize = catalog
            .regions()
            .iter()
            .map(|region| region.anchors.len())
            .sum();
        assert_eq!(total_anchors, 14);
    }

    #[test]
    fn builtin_periods_are_chronological() {
        let catalog = TaxonomyCatalog::builtin();
        for window in catalog.periods().windows(2) {
            assert!(window[0].end_year <= window[1].start_year);
        }
    }

    #[test]
    fn emotion_order_is_most_positive_first() {
        let weights: Vec<f64> = Emotion::ALL.iter().map(|e| e.weight()).collect();
        let mut sorted = weights.clone();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap());
        assert_eq!(weights, sorted);
    }

    #[test]
    fn rejects_inverted_period_bounds() {
        let raw = r##"{
            "periods": [{
                "id": "p1", "label": "P1", "start_year": 900, "end_year": 800,
                "color": "#fff", "share": 1.0,
                "emotion_profile": {"positive": 1.0},
                "region_distribution": {"r1": 1.0}
            }],
            "regions": [{
                "id": "r1", "label": "R1", "color": "#fff",
                "anchors": [{"name": "A", "lat": 10.0, "lng": 10.0, "modern_name": "A", "importance": 1.0}]
            }]
        }"##;
        let err = TaxonomyCatalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPeriodBounds { .. }));
    }

    #[test]
    fn rejects_unknown_region_reference() {
        let raw = r##"{
            "periods": [{
                "id": "p1", "label": "P1", "start_year": 700, "end_year": 710,
                "color": "#fff", "share": 1.0,
                "emotion_profile": {"positive": 1.0},
                "region_distribution": {"nowhere": 1.0}
            }],
            "regions": [{
                "id": "r1", "label": "R1", "color": "#fff",
                "anchors": [{"name": "A", "lat": 10.0, "lng": 10.0, "modern_name": "A", "importance": 1.0}]
            }]
        }"##;
        let err = TaxonomyCatalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRegion { .. }));
    }

    #[test]
    fn rejects_empty_anchor_list() {
        let raw = r##"{
            "periods": [{
                "id": "p1", "label": "P1", "start_year": 700, "end_year": 710,
                "color": "#fff", "share": 1.0,
                "emotion_profile": {"positive": 1.0},
                "region_distribution": {"r1": 1.0}
            }],
            "regions": [{"id": "r1", "label": "R1", "color": "#fff", "anchors": []}]
        }"##;
        let err = TaxonomyCatalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::NoAnchors { .. }));
    }
}
