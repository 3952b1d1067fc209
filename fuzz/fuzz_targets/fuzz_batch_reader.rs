#![no_main]

use libfuzzer_sys::fuzz_target;
use pgx_interpret::{AnalysisPipeline, EngineConfig, SampleBatch};

fuzz_target!(|data: &[u8]| {
    // Malformed tables are errors, never panics
    let Ok(batch) = SampleBatch::from_reader(data) else {
        return;
    };

    let outcome = AnalysisPipeline::new(EngineConfig::default()).run(&batch);
    assert_eq!(outcome.results.len(), batch.len());
});
