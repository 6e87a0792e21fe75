//! Integration tests for the full train/predict pipeline

mod common;

use riskpipe::pipeline::{
    evaluate_frame, load_dataset, stratified_split, FittedPipeline, DEFAULT_THRESHOLD,
};
use riskpipe::schema::SchemaError;

#[test]
fn test_end_to_end_example_row() {
    let (pipeline, _test) = common::fit_synthetic_pipeline(400, 42);

    let prediction = pipeline
        .predict_record(&common::example_request(), DEFAULT_THRESHOLD)
        .unwrap();

    assert!(prediction.class == 0 || prediction.class == 1);
    assert!((prediction.prob_no_event + prediction.prob_event - 1.0).abs() < 1e-9);
    assert!(prediction.prob_event > 0.0 && prediction.prob_event < 1.0);
}

#[test]
fn test_repeated_prediction_is_bit_identical() {
    let (pipeline, _test) = common::fit_synthetic_pipeline(400, 42);
    let fields = common::example_request();

    let a = pipeline.predict_record(&fields, DEFAULT_THRESHOLD).unwrap();
    let b = pipeline.predict_record(&fields, DEFAULT_THRESHOLD).unwrap();

    assert_eq!(a.class, b.class);
    assert_eq!(a.prob_event.to_bits(), b.prob_event.to_bits());
    assert_eq!(a.prob_no_event.to_bits(), b.prob_no_event.to_bits());
}

#[test]
fn test_class_matches_threshold_rule() {
    let (pipeline, _test) = common::fit_synthetic_pipeline(400, 42);
    let prediction = pipeline
        .predict_record(&common::example_request(), DEFAULT_THRESHOLD)
        .unwrap();

    assert_eq!(
        prediction.class == 1,
        prediction.prob_event >= DEFAULT_THRESHOLD
    );
}

#[test]
fn test_missing_bmi_is_rejected_not_defaulted() {
    let (pipeline, _test) = common::fit_synthetic_pipeline(400, 42);
    let mut fields = common::example_request();
    fields.remove("bmi");

    let err = pipeline
        .predict_record(&fields, DEFAULT_THRESHOLD)
        .unwrap_err();
    assert!(matches!(err, SchemaError::MissingColumn { .. }));
    assert_eq!(err.column(), "bmi");
}

#[test]
fn test_unseen_work_type_is_rejected() {
    let (pipeline, _test) = common::fit_synthetic_pipeline(400, 42);
    let mut fields = common::example_request();
    fields.insert("work_type".to_string(), "Never worked".to_string());

    let err = pipeline
        .predict_record(&fields, DEFAULT_THRESHOLD)
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnknownLevel { .. }));
    assert_eq!(err.column(), "work_type");
}

#[test]
fn test_split_preserves_prevalence_on_synthetic_data() {
    let df = common::synthetic_stroke_frame(1000, 3);
    let split = stratified_split(&df, "stroke", 0.2, 3).unwrap();

    let prevalence = |frame: &polars::prelude::DataFrame| {
        let y = riskpipe::pipeline::outcome_vector(frame, "stroke").unwrap();
        y.iter().sum::<f64>() / y.len() as f64
    };

    let p = prevalence(&df);
    assert!((prevalence(&split.train) - p).abs() < 0.02);
    assert!((prevalence(&split.test) - p).abs() < 0.02);
}

#[test]
fn test_model_scores_above_chance_on_held_out_data() {
    let (pipeline, test) = common::fit_synthetic_pipeline(800, 42);
    let evaluation = evaluate_frame(&pipeline, &test, DEFAULT_THRESHOLD).unwrap();

    // The generator plants an age/glucose/heart-disease signal.
    assert!(evaluation.auc > 0.6, "AUC was {}", evaluation.auc);
    assert!((evaluation.gini - (2.0 * evaluation.auc - 1.0)).abs() < 1e-12);
}

#[test]
fn test_artifact_roundtrip_preserves_predictions() {
    let (pipeline, _test) = common::fit_synthetic_pipeline(400, 42);
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("model.json");

    pipeline.save(&path).unwrap();
    let reloaded = FittedPipeline::load(&path).unwrap();

    let fields = common::example_request();
    let before = pipeline.predict_record(&fields, DEFAULT_THRESHOLD).unwrap();
    let after = reloaded.predict_record(&fields, DEFAULT_THRESHOLD).unwrap();

    assert_eq!(before.class, after.class);
    assert_eq!(before.prob_event.to_bits(), after.prob_event.to_bits());
}

#[test]
fn test_training_from_csv_file() {
    let mut df = common::synthetic_stroke_frame(300, 9);
    let (_temp_dir, csv_path) = common::create_temp_csv(&mut df);

    let loaded = load_dataset(&csv_path, 100).unwrap();
    assert_eq!(loaded.shape(), (300, 11));

    let split = stratified_split(&loaded, "stroke", 0.2, 9).unwrap();
    assert_eq!(split.train.height() + split.test.height(), 300);
}

#[test]
fn test_training_from_parquet_file() {
    let mut df = common::synthetic_stroke_frame(120, 5);
    let (_temp_dir, parquet_path) = common::create_temp_parquet(&mut df);

    let loaded = load_dataset(&parquet_path, 100).unwrap();
    assert_eq!(loaded.shape(), (120, 11));
}

#[test]
fn test_evaluation_rejects_unharmonized_frame() {
    let (pipeline, test) = common::fit_synthetic_pipeline(400, 42);

    // Relabel a categorical column the way a second, differently-coded
    // source would.
    let mut frame = test.clone();
    let height = frame.height();
    let col = polars::prelude::Column::new("Residence_type".into(), vec!["city"; height]);
    frame.with_column(col).unwrap();

    let err = evaluate_frame(&pipeline, &frame, DEFAULT_THRESHOLD).unwrap_err();
    assert!(err.to_string().contains("Residence_type"));
}
