#![no_main]

use libfuzzer_sys::fuzz_target;
use pgx_interpret::{Gene, MarkerRules, diplotype, recommendation::Emphasizer};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let rules = MarkerRules::default();

    let alleles = rules.map_genotype("CYP2D6_rs1", &input);
    assert_eq!(alleles.len(), input.split('/').count());

    // Feed the raw tokens straight into resolution to hit the special-token paths
    let _ = diplotype::resolve(Gene::Cyp2d6, input.split('/'));

    let emphasizer = Emphasizer::new(input.split('/'));
    let _ = emphasizer.emphasize(&input);
});
