use serde::Serialize;

use crate::record::PoemRecord;
use crate::taxonomy::{Emotion, TaxonomyCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowTier {
    Period,
    Region,
    Emotion,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowNode {
    /// Stable integer id, assigned sequentially in one pass:
    /// periods first, then regions, then emotions.
    pub id: u32,
    pub label: String,
    pub tier: FlowTier,
    /// Record count for this category.
    pub value: u64,
    pub color: String,
    /// Horizontal layout slot: 0 for periods, 1 for regions, 2 for
    /// emotions.
    pub depth: u8,
}

/// Links carry node ids, never labels.
#[derive(Debug, Clone, Serialize)]
pub struct FlowLink {
    pub source: u32,
    pub target: u32,
    pub value: u64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

/// Build the period → region → emotion flow graph. Node ids are indices
/// into the node list; co-occurrence pairs with zero records produce no
/// link. Periods and regions follow catalog order, emotions canonical
/// order, so ids are stable for a given catalog.
pub fn flow_graph(catalog: &TaxonomyCatalog, records: &[PoemRecord]) -> FlowGraph {
    let period_count = catalog.periods().len();
    let region_count = catalog.regions().len();

    let mut period_totals = vec![0u64; period_count];
    let mut region_totals = vec![0u64; region_count];
    let mut emotion_totals = [0u64; Emotion::COUNT];
    let mut period_region = vec![vec![0u64; region_count]; period_count];
    let mut region_emotion = vec![[0u64; Emotion::COUNT]; region_count];

    for record in records {
        let period = record.period.0 as usize;
        let region = record.region.0 as usize;
        period_totals[period] += 1;
        region_totals[region] += 1;
        emotion_totals[record.emotion.index()] += 1;
        period_region[period][region] += 1;
        region_emotion[region][record.emotion.index()] += 1;
    }

    let mut nodes = Vec::with_capacity(period_count + region_count + Emotion::COUNT);
    let mut next_id = 0u32;
    let mut push_node = |nodes: &mut Vec<FlowNode>,
                         label: String,
                         tier: FlowTier,
                         value: u64,
                         color: String,
                         depth: u8| {
        let id = next_id;
        next_id += 1;
        nodes.push(FlowNode {
            id,
            label,
            tier,
            value,
            color,
            depth,
        });
        id
    };

    let period_ids: Vec<u32> = catalog
        .periods()
        .iter()
        .enumerate()
        .map(|(index, period)| {
            push_node(
                &mut nodes,
                period.label.clone(),
                FlowTier::Period,
                period_totals[index],
                period.color.clone(),
                0,
            )
        })
        .collect();
    let region_ids: Vec<u32> = catalog
        .regions()
        .iter()
        .enumerate()
        .map(|(index, region)| {
            push_node(
                &mut nodes,
                region.label.clone(),
                FlowTier::Region,
                region_totals[index],
                region.color.clone(),
                1,
            )
        })
        .collect();
    let emotion_ids: Vec<u32> = Emotion::ALL
        .iter()
        .map(|emotion| {
            push_node(
                &mut nodes,
                emotion.display_label().to_string(),
                FlowTier::Emotion,
                emotion_totals[emotion.index()],
                emotion.display_color().to_string(),
                2,
            )
        })
        .collect();

    let mut links = Vec::new();
    for (period, row) in period_region.iter().enumerate() {
        for (region, &value) in row.iter().enumerate() {
            if value > 0 {
                links.push(FlowLink {
                    source: period_ids[period],
                    target: region_ids[region],
                    value,
                    color: catalog.periods()[period].color.clone(),
                });
            }
        }
    }
    for (region, row) in region_emotion.iter().enumerate() {
        for (emotion, &value) in row.iter().enumerate() {
            if value > 0 {
                links.push(FlowLink {
                    source: region_ids[region],
                    target: emotion_ids[emotion],
                    value,
                    color: catalog.regions()[region].color.clone(),
                });
            }
        }
    }

    FlowGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, GeneratorConfig};

    #[test]
    fn node_ids_are_dense_and_tiered() {
        let catalog = TaxonomyCatalog::builtin();
        let graph = flow_graph(catalog, &[]);
        assert_eq!(
            graph.nodes.len(),
            catalog.periods().len() + catalog.regions().len() + Emotion::COUNT
        );
        for (index, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.id, index as u32);
        }
        assert!(graph.links.is_empty());
    }

    #[test]
    fn link_values_conserve_record_counts() {
        let catalog = TaxonomyCatalog::builtin();
        let config = GeneratorConfig {
            total_records: 2_000,
            seed: 404,
            ..GeneratorConfig::default()
        };
        let set = generate(catalog, &config).expect("generation");
        let graph = flow_graph(catalog, &set.records);

        let period_link_total: u64 = graph
            .links
            .iter()
            .filter(|link| {
                graph.nodes[link.source as usize].tier == FlowTier::Period
            })
            .map(|link| link.value)
            .sum();
        let emotion_link_total: u64 = graph
            .links
            .iter()
            .filter(|link| {
                graph.nodes[link.target as usize].tier == FlowTier::Emotion
            })
            .map(|link| link.value)
            .sum();
        assert_eq!(period_link_total, set.len() as u64);
        assert_eq!(emotion_link_total, set.len() as u64);

        for link in &graph.links {
            let source = &graph.nodes[link.source as usize];
            let target = &graph.nodes[link.target as usize];
            match source.tier {
                FlowTier::Period => assert_eq!(target.tier, FlowTier::Region),
                FlowTier::Region => assert_eq!(target.tier, FlowTier::Emotion),
                FlowTier::Emotion => panic!("emotion nodes must not be sources"),
            }
            assert!(link.value <= source.value);
            assert!(link.value <= target.value);
        }
    }
}
