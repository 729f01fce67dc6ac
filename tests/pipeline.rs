use std::io::Cursor;

use moldb::{
    export_csv, extract, filter, read_smiles, DescriptorRegistry, DropReason, FeatureValue,
    FilterCriteria, FilterError, GraphToolkit, Pipeline, PipelineConfig,
};

fn count(row: &moldb::FeatureRow, name: &str) -> i64 {
    match row.get(name) {
        Some(FeatureValue::Count(n)) => n,
        other => panic!("{name}: expected a count, got {other:?}"),
    }
}

#[test]
fn aniline_phenol_and_garbage() {
    let toolkit = GraphToolkit::new();
    let registry = DescriptorRegistry::standard();
    let config = PipelineConfig::default();
    let rows = ["c1ccccc1N", "c1ccccc1O", "not-a-molecule"];

    let extraction = extract(&toolkit, &registry, &config, &rows);
    assert_eq!(extraction.table.len(), 2);
    assert_eq!(extraction.dropped_count(), 1);
    assert_eq!(extraction.dropped[0].index, 2);
    assert!(matches!(extraction.dropped[0].reason, DropReason::Parse(_)));

    let aniline = &extraction.table.rows()[0];
    let phenol = &extraction.table.rows()[1];
    assert!(count(aniline, "NH2") > 0);
    assert!(count(phenol, "OH") > 0);
    assert_eq!(count(aniline, "OH"), 0);

    let criteria = FilterCriteria::default().include(["NH2"]);
    let filtered = filter(&extraction.table, &criteria).unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.rows()[0].smiles(), "c1ccccc1N");
    assert_eq!(moldb::similarity(&filtered, config.parallel_threshold), vec![1.0]);
}

#[test]
fn csv_in_csv_out() {
    let input = "id,SMILES\n1,CCO\n2,\n3,c1ccccc1Br\n4,CC(=O)O\n";
    let rows = read_smiles(Cursor::new(input)).unwrap();
    assert_eq!(rows, ["CCO", "c1ccccc1Br", "CC(=O)O"]);

    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &rows);

    let criteria = FilterCriteria::from_json(
        r#"{"include": ["OH", "Br"], "molwt_cutoff": 100.0}"#,
        pipeline.config(),
    )
    .unwrap();
    let eval = pipeline.evaluate(&session, &criteria).unwrap();
    assert_eq!(eval.filtered.len(), 1);

    let mut out = Vec::new();
    export_csv(&eval.filtered, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "smiles\nCCO\n");
}

#[test]
fn exclusion_wins_over_inclusion() {
    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &["NCCO", "NCC", "OCC"]);

    let criteria = FilterCriteria::default().include(["NH2", "OH"]).exclude(["OH"]);
    let eval = pipeline.evaluate(&session, &criteria).unwrap();
    let smiles: Vec<_> = eval.filtered.rows().iter().map(|r| r.smiles()).collect();
    assert_eq!(smiles, ["NCC"]);
}

#[test]
fn reaction_classes_are_selectable() {
    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &["OB(O)c1ccccc1", "Brc1ccccc1", "CCCC"]);

    let criteria = FilterCriteria::default().include(["suzuki-miyaura"]);
    let eval = pipeline.evaluate(&session, &criteria).unwrap();
    assert_eq!(eval.filtered.len(), 2);
    assert_eq!(eval.similarity.len(), 3);
}

#[test]
fn unknown_and_scalar_groups_rejected() {
    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &["CCO"]);

    let unknown = FilterCriteria::default().include(["NH3"]);
    assert_eq!(
        pipeline.evaluate(&session, &unknown).unwrap_err(),
        FilterError::UnknownGroup("NH3".into())
    );
    let scalar = FilterCriteria::default().exclude(["logp"]);
    assert_eq!(
        pipeline.evaluate(&session, &scalar).unwrap_err(),
        FilterError::NotAGroup("logp".into())
    );
}

#[test]
fn summary_totals_only_functional_groups() {
    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &["NCCN", "Nc1ccccc1", "CCO"]);

    let eval = pipeline
        .evaluate(&session, &FilterCriteria::default().include(["NH2"]))
        .unwrap();
    let nh2 = eval
        .summary
        .group_totals
        .iter()
        .find(|g| g.name == "NH2")
        .unwrap();
    assert_eq!((nh2.full, nh2.filtered), (3, 3));
    assert!(eval
        .summary
        .group_totals
        .iter()
        .all(|g| !g.name.contains('-')));
    assert_eq!(eval.summary.molwt.full.len(), 3);
    assert_eq!(eval.summary.molwt.filtered.len(), 2);
}

#[test]
fn evaluation_serializes() {
    let pipeline = Pipeline::standard(PipelineConfig::default()).unwrap();
    let session = pipeline.session();
    pipeline.upload(&session, &["CCO"]);
    let eval = pipeline
        .evaluate(&session, &FilterCriteria::default().include(["OH"]))
        .unwrap();

    let json = serde_json::to_value(&eval).unwrap();
    let row = &json["filtered"][0];
    assert_eq!(row["smiles"], "CCO");
    assert_eq!(row["OH"], 1);
    assert!(row["fp"].is_object());
    assert_eq!(json["similarity"], serde_json::json!([1.0]));
    assert!(json["summary"].get("similarity").is_none());
}
