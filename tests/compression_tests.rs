use assert_fs::prelude::*;
use flate2::{Compression, write::GzEncoder};
use pgx_interpret::{AnalysisPipeline, EngineConfig, Gene, PhenotypeLabel, SampleBatch};
use std::io::Write;

const RULES: &str = r#"{"DPYD_2A_rs3918290": {"G": "*2A"}, "UGT1A1_28_rs8175347": {"T": "*28"}}"#;
const TABLE: &str = "CYP2D6 Diplotype;Coded Diplotype/Phenotype Summary\n*1/*1;Normal Metabolizer\n";
const BATCH: &str = "Sample/Assay;DPYD*2A_rs3918290;UGT1A1*28_rs8175347;CYP2D6_rs1\nS1;C/G;C/T;G/G\n";

fn gzip(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn analyze(temp: &assert_fs::TempDir, rules: &str, table: &str, batch: &str) -> SampleBatch {
    let config = EngineConfig::load(temp.child(rules).path(), temp.child(table).path()).unwrap();
    let batch = SampleBatch::from_path(temp.child(batch).path()).unwrap();
    let outcome = AnalysisPipeline::new(config).run(&batch);

    let s1 = &outcome.results["S1"];
    assert_eq!(s1.phenotypes[&Gene::Dpyd], PhenotypeLabel::Intermediate);
    assert_eq!(s1.phenotypes[&Gene::Ugt1a1], PhenotypeLabel::Intermediate);
    assert_eq!(s1.phenotypes[&Gene::Cyp2d6], PhenotypeLabel::Normal);
    batch
}

#[test]
fn plain_inputs() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("rules.json").write_str(RULES).unwrap();
    temp.child("table.csv").write_str(TABLE).unwrap();
    temp.child("batch.csv").write_str(BATCH).unwrap();

    let batch = analyze(&temp, "rules.json", "table.csv", "batch.csv");
    assert_eq!(batch.len(), 1);
}

#[test]
fn gzipped_inputs() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("rules.json.gz").write_binary(&gzip(RULES)).unwrap();
    temp.child("table.csv.gz").write_binary(&gzip(TABLE)).unwrap();
    temp.child("batch.csv.gz").write_binary(&gzip(BATCH)).unwrap();

    let batch = analyze(&temp, "rules.json.gz", "table.csv.gz", "batch.csv.gz");
    assert_eq!(batch.markers().len(), 3);
}

#[test]
fn gzip_is_detected_by_content_not_extension() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("rules.json").write_binary(&gzip(RULES)).unwrap();
    temp.child("table.csv").write_str(TABLE).unwrap();
    temp.child("batch.txt").write_binary(&gzip(BATCH)).unwrap();

    analyze(&temp, "rules.json", "table.csv", "batch.txt");
}
