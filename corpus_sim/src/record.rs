use serde::Serialize;

use crate::taxonomy::{Emotion, PeriodId, RegionId};

/// Anchor identity plus the jittered coordinate assigned to one record.
#[derive(Debug, Clone, Serialize)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub modern_name: String,
    pub importance: f64,
}

/// One synthetic poem. Created once by the generator and read-only
/// thereafter; every derived view copies or borrows, never mutates.
#[derive(Debug, Clone, Serialize)]
pub struct PoemRecord {
    /// Sequential id starting at 1, global across the whole run.
    pub id: u32,
    pub period: PeriodId,
    pub region: RegionId,
    pub emotion: Emotion,
    pub year: i32,
    pub location: GeoPoint,
    pub title: String,
    pub author: String,
    /// Uniform draw in `[intensity_floor, intensity_ceiling]`.
    pub emotional_intensity: f64,
    pub cultural_context: String,
    pub keywords: Vec<&'static str>,
}

/// The full generated corpus for one session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordSet {
    pub records: Vec<PoemRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<PoemRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoemRecord> {
        self.records.iter()
    }
}
