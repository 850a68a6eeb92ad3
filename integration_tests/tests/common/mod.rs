use corpus_sim::{generate, GeneratorConfig, RecordSet, TaxonomyCatalog};

pub fn seeded_config(total_records: u32, seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        total_records,
        seed,
        ..GeneratorConfig::default()
    }
}

pub fn builtin_corpus(total_records: u32, seed: u64) -> (&'static TaxonomyCatalog, RecordSet) {
    let catalog = TaxonomyCatalog::builtin();
    let records =
        generate(catalog, &seeded_config(total_records, seed)).expect("builtin generation");
    (catalog, records)
}
