//! Shared test utilities and fixture generators

use std::collections::HashMap;
use std::path::PathBuf;

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use riskpipe::pipeline::{
    fit_logistic, outcome_vector, sigmoid, stratified_split, ArtifactMetadata, FeatureSpace,
    FitOptions, FittedPipeline,
};
use riskpipe::schema::DatasetSchema;

pub const GENDERS: [&str; 2] = ["Female", "Male"];
pub const YES_NO: [&str; 2] = ["No", "Yes"];
pub const WORK_TYPES: [&str; 3] = ["Government job", "Private job", "Self-employed"];
pub const RESIDENCE_TYPES: [&str; 2] = ["Rural", "Urban"];
pub const SMOKING_STATUSES: [&str; 3] = ["Formerly smoked", "Never smoked", "Smokes"];

/// Pick a level, forcing the first rows to cover every level so no
/// category is absent from the generated data.
fn pick<'a>(levels: &[&'a str], row: usize, rng: &mut StdRng) -> &'a str {
    if row < levels.len() {
        levels[row]
    } else {
        levels[rng.gen_range(0..levels.len())]
    }
}

/// Generate a stroke-like dataset with a real age/glucose/heart-disease
/// signal plus label noise, so a logistic fit converges and scores above
/// chance without the classes being separable. Deterministic per seed.
pub fn synthetic_stroke_frame(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut gender = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut hypertension = Vec::with_capacity(rows);
    let mut heart_disease = Vec::with_capacity(rows);
    let mut ever_married = Vec::with_capacity(rows);
    let mut work_type = Vec::with_capacity(rows);
    let mut residence_type = Vec::with_capacity(rows);
    let mut avg_glucose_level = Vec::with_capacity(rows);
    let mut bmi = Vec::with_capacity(rows);
    let mut smoking_status = Vec::with_capacity(rows);
    let mut stroke = Vec::with_capacity(rows);

    for i in 0..rows {
        let row_age: f64 = rng.gen_range(20.0..90.0);
        let row_glucose: f64 = rng.gen_range(60.0..250.0);
        let row_bmi: f64 = rng.gen_range(16.0..45.0);
        let row_heart = pick(&YES_NO, i, &mut rng);

        gender.push(pick(&GENDERS, i, &mut rng));
        age.push(row_age);
        hypertension.push(pick(&YES_NO, i, &mut rng));
        heart_disease.push(row_heart);
        ever_married.push(pick(&YES_NO, i, &mut rng));
        work_type.push(pick(&WORK_TYPES, i, &mut rng));
        residence_type.push(pick(&RESIDENCE_TYPES, i, &mut rng));
        avg_glucose_level.push(row_glucose);
        bmi.push(row_bmi);
        smoking_status.push(pick(&SMOKING_STATUSES, i, &mut rng));

        let logit = 0.07 * (row_age - 55.0)
            + 0.012 * (row_glucose - 120.0)
            + if row_heart == "Yes" { 0.6 } else { 0.0 }
            - 1.0;
        let p = sigmoid(logit).clamp(0.02, 0.98);
        stroke.push(rng.gen_bool(p) as i32);
    }

    df! {
        "gender" => gender,
        "age" => age,
        "hypertension" => hypertension,
        "heart_disease" => heart_disease,
        "ever_married" => ever_married,
        "work_type" => work_type,
        "Residence_type" => residence_type,
        "avg_glucose_level" => avg_glucose_level,
        "bmi" => bmi,
        "smoking_status" => smoking_status,
        "stroke" => stroke,
    }
    .unwrap()
}

/// Fit a pipeline on synthetic data, returning it with the held-out
/// test partition.
pub fn fit_synthetic_pipeline(rows: usize, seed: u64) -> (FittedPipeline, DataFrame) {
    let df = synthetic_stroke_frame(rows, seed);
    let schema = DatasetSchema::infer(&df, "stroke", &[]).unwrap();
    let split = stratified_split(&df, "stroke", 0.2, seed).unwrap();

    let features = FeatureSpace::fit(&schema, &split.train).unwrap();
    let x = features.transform_frame(&split.train).unwrap();
    let y = outcome_vector(&split.train, "stroke").unwrap();
    let fit = fit_logistic(&x, &y, &features.feature_names, &FitOptions::default()).unwrap();

    let pipeline = FittedPipeline {
        schema,
        features,
        model: fit.model,
        metadata: ArtifactMetadata::new(split.train.height(), fit.iterations),
    };
    (pipeline, split.test)
}

/// The worked example row from the course material.
pub fn example_request() -> HashMap<String, String> {
    [
        ("gender", "Male"),
        ("age", "67"),
        ("hypertension", "No"),
        ("heart_disease", "Yes"),
        ("ever_married", "Yes"),
        ("work_type", "Private job"),
        ("Residence_type", "Urban"),
        ("avg_glucose_level", "228.69"),
        ("bmi", "36.6"),
        ("smoking_status", "Formerly smoked"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// The example row as a URL query string, with fields optionally removed
/// or overridden.
pub fn example_query(remove: &[&str], replace: &[(&str, &str)]) -> String {
    let mut fields = example_request();
    for name in remove {
        fields.remove(*name);
    }
    for (name, value) in replace {
        fields.insert(name.to_string(), value.to_string());
    }

    let mut pairs: Vec<(String, String)> = fields.into_iter().collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v.replace(' ', "%20")))
        .collect::<Vec<_>>()
        .join("&")
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
