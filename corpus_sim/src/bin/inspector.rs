use std::env;
use std::process::ExitCode;

use serde_json::json;
use tracing::info;

use corpus_sim::{
    generate, most_prevalent_emotion, CorpusAnalytics, GeneratorConfig, TaxonomyCatalog,
};

const TIMELINE_BUCKET_YEARS: i32 = 10;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut config = GeneratorConfig::default();
    if let Err(message) = apply_args(&mut config) {
        eprintln!("{message}");
        eprintln!("usage: inspector [--seed N] [--total N]");
        return ExitCode::FAILURE;
    }

    let catalog = TaxonomyCatalog::builtin();
    let records = match generate(catalog, &config) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("generation failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        target: "verse_atlas::inspector",
        seed = config.seed,
        records = records.len(),
        "inspector.corpus.ready"
    );

    let analytics = CorpusAnalytics::build(catalog, &records.records);
    let trend: Vec<PeriodLine> = catalog
        .period_ids()
        .zip(analytics.by_period_emotion())
        .map(|(period, tally)| PeriodLine {
            id: catalog.period(period).id.clone(),
            total: tally.total(),
            score: tally.emotional_score(),
        })
        .collect();
    let flow = analytics.flow_graph();
    let matrix = analytics.correlation_matrix();
    let timeline = analytics.timeline(TIMELINE_BUCKET_YEARS);
    let populated_buckets = timeline.iter().filter(|bucket| bucket.total > 0).count();

    let summary = json!({
        "records": records.len(),
        "periods": trend,
        "dominant_emotion": most_prevalent_emotion(&records, None).ok(),
        "regional_profiles": analytics.regional_profiles(),
        "timeline_buckets": timeline.len(),
        "populated_timeline_buckets": populated_buckets,
        "heatmap_cells": analytics.heatmap(TIMELINE_BUCKET_YEARS).len(),
        "flow": { "nodes": flow.nodes.len(), "links": flow.links.len() },
        "correlation": matrix,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to render summary: {err}");
            ExitCode::FAILURE
        }
    }
}

#[derive(serde::Serialize)]
struct PeriodLine {
    id: String,
    total: u64,
    score: f64,
}

fn apply_args(config: &mut GeneratorConfig) -> Result<(), String> {
    let mut args = env::args().skip(1);
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| format!("missing value for {flag}"))?;
        match flag.as_str() {
            "--seed" => {
                config.seed = value
                    .parse()
                    .map_err(|_| format!("invalid seed '{value}'"))?;
            }
            "--total" => {
                config.total_records = value
                    .parse()
                    .map_err(|_| format!("invalid total '{value}'"))?;
            }
            other => return Err(format!("unknown flag '{other}'")),
        }
    }
    Ok(())
}
