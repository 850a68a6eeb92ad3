//! Synthetic Tang-Song poetry corpus simulator.
//!
//! Generates tens of thousands of weighted categorical records (period,
//! region, emotion, year, intensity) under historically-motivated
//! probability distributions via [`generate`], then derives aggregate
//! views — counts, ten-year timelines, regional profiles, heatmap cells,
//! a period→region→emotion flow graph, and a pairwise regional Pearson
//! correlation matrix — through [`CorpusAnalytics`]. The record set is
//! produced once per session and treated as read-only; every filter and
//! aggregate is a pure recomputation over it.

pub mod aggregate;
pub mod correlation;
pub mod flow;
mod generator;
pub mod query;
mod record;
mod sampling;
pub mod taxonomy;

pub use aggregate::{CorpusAnalytics, EmotionTally, HeatmapCell, RegionalProfile, TimelineBucket};
pub use correlation::{CorrelationCell, CorrelationMatrix};
pub use flow::{FlowGraph, FlowLink, FlowNode, FlowTier};
pub use generator::{generate, GenerateError, GeneratorConfig};
pub use query::{
    emotional_trend, filter, location_density, most_prevalent_emotion, DensityPoint,
    PrevalentEmotion, QueryError, RecordFilter, TrendPoint,
};
pub use record::{GeoPoint, PoemRecord, RecordSet};
pub use sampling::{SampleError, WeightedTable};
pub use taxonomy::{
    Anchor, CatalogError, Emotion, HistoricalEvent, PeriodDef, PeriodId, RegionDef, RegionId,
    TaxonomyCatalog,
};
