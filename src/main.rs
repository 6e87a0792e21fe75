//! Riskpipe CLI entry point
//!
//! Train a logistic risk model on a tabular dataset, score single
//! records, or serve predictions over HTTP from a persisted artifact.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use riskpipe::cli::{default_artifact_path, run_report_path, Cli, Commands};
use riskpipe::pipeline::{
    drop_incomplete_rows, evaluate_frame, fit_logistic, load_dataset, outcome_vector,
    stratified_split, ArtifactMetadata, FeatureSpace, FitOptions, FittedPipeline,
};
use riskpipe::report::{display_coefficients, export_training_run, ExportParams, TrainingSummary};
use riskpipe::schema::{ColumnKind, DatasetSchema};
use riskpipe::serve;
use riskpipe::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_step_time, print_success,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            input,
            outcome,
            artifact,
            test_fraction,
            seed,
            max_iterations,
            tolerance,
            threshold,
            drop_columns,
            infer_schema_length,
            no_report,
        } => run_train(TrainParams {
            input,
            outcome,
            artifact,
            test_fraction,
            seed,
            fit: FitOptions {
                max_iterations,
                tolerance,
            },
            threshold,
            drop_columns,
            infer_schema_length,
            no_report,
        }),
        Commands::Predict {
            artifact,
            fields,
            threshold,
        } => run_predict(&artifact, fields, threshold),
        Commands::Serve {
            artifact,
            bind,
            threshold,
        } => {
            env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
            serve::run(&artifact, &bind, threshold)
        }
    }
}

struct TrainParams {
    input: PathBuf,
    outcome: String,
    artifact: Option<PathBuf>,
    test_fraction: f64,
    seed: u64,
    fit: FitOptions,
    threshold: f64,
    drop_columns: Vec<String>,
    infer_schema_length: usize,
    no_report: bool,
}

fn run_train(params: TrainParams) -> Result<()> {
    let total_start = Instant::now();
    let artifact_path = params
        .artifact
        .clone()
        .unwrap_or_else(|| default_artifact_path(&params.input));

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &params.input,
        &params.outcome,
        &artifact_path,
        params.test_fraction,
        params.seed,
    );

    // Step 1: Load dataset
    print_step_header(1, "Load dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(&params.input, params.infer_schema_length)?;
    finish_with_success(&spinner, "Dataset loaded");
    let (rows, cols) = df.shape();
    print_info(&format!("{} rows, {} columns", rows, cols));
    print_info(&format!(
        "estimated memory: {:.2} MB",
        df.estimated_size() as f64 / (1024.0 * 1024.0)
    ));
    print_step_time(step_start.elapsed());

    // Step 2: Infer schema
    print_step_header(2, "Infer schema");
    let step_start = Instant::now();
    let schema = DatasetSchema::infer(&df, &params.outcome, &params.drop_columns)?;
    let categorical = schema
        .columns
        .iter()
        .filter(|c| matches!(c.kind, ColumnKind::Categorical { .. }))
        .count();
    print_success("Schema inferred");
    print_info(&format!(
        "{} categorical, {} numeric predictors",
        categorical,
        schema.columns.len() - categorical
    ));
    print_step_time(step_start.elapsed());

    // Step 3: Complete-case filter
    print_step_header(3, "Filter incomplete rows");
    let step_start = Instant::now();
    let (df, rows_dropped) = drop_incomplete_rows(&df)?;
    print_success(&format!(
        "{} rows kept, {} dropped as incomplete",
        df.height(),
        rows_dropped
    ));
    print_step_time(step_start.elapsed());

    // Step 4: Stratified split
    print_step_header(4, "Stratified split");
    let step_start = Instant::now();
    let split = stratified_split(&df, &params.outcome, params.test_fraction, params.seed)?;
    print_success(&format!(
        "{} train rows, {} test rows",
        split.train.height(),
        split.test.height()
    ));
    print_step_time(step_start.elapsed());

    // Step 5: Fit preprocessing and model
    print_step_header(5, "Fit pipeline");
    let step_start = Instant::now();
    let features = FeatureSpace::fit(&schema, &split.train)?;
    let x = features.transform_frame(&split.train)?;
    let y = outcome_vector(&split.train, &params.outcome)?;
    let spinner = create_spinner("Running IRLS...");
    let fit = fit_logistic(&x, &y, &features.feature_names, &params.fit)?;
    finish_with_success(
        &spinner,
        &format!(
            "Converged after {} iterations (deviance {:.3})",
            fit.iterations, fit.deviance
        ),
    );
    print_info(&format!("{} transformed features", features.width()));
    print_step_time(step_start.elapsed());

    let pipeline = FittedPipeline {
        schema,
        features,
        model: fit.model,
        metadata: ArtifactMetadata::new(split.train.height(), fit.iterations),
    };

    // Step 6: Evaluate on the held-out partition
    print_step_header(6, "Evaluate");
    let step_start = Instant::now();
    let evaluation = evaluate_frame(&pipeline, &split.test, params.threshold)?;
    print_success(&format!(
        "accuracy {:.3}, AUC {:.3}",
        evaluation.accuracy, evaluation.auc
    ));
    print_step_time(step_start.elapsed());

    // Step 7: Persist artifact and run report
    print_step_header(7, "Persist artifact");
    let step_start = Instant::now();
    pipeline.save(&artifact_path)?;
    print_success(&format!("Artifact written to {}", artifact_path.display()));

    let summary = TrainingSummary {
        rows_total: rows,
        rows_dropped_incomplete: rows_dropped,
        rows_train: split.train.height(),
        rows_test: split.test.height(),
        predictors: pipeline.schema.columns.len(),
        encoded_features: pipeline.features.width(),
        irls_iterations: pipeline.metadata.irls_iterations,
        deviance: fit.deviance,
        evaluation,
    };

    if !params.no_report {
        let report_path = run_report_path(&artifact_path);
        export_training_run(
            &pipeline,
            &summary,
            &report_path,
            &ExportParams {
                input_file: &params.input.display().to_string(),
                outcome_column: &params.outcome,
                seed: params.seed,
                test_fraction: params.test_fraction,
                fit: &params.fit,
                threshold: params.threshold,
            },
        )?;
        print_success(&format!("Run report written to {}", report_path.display()));
    }
    print_step_time(step_start.elapsed());

    summary.display();
    display_coefficients(&pipeline.model, &pipeline.features.feature_names);
    print_completion(total_start.elapsed());

    Ok(())
}

fn run_predict(
    artifact: &std::path::Path,
    fields: Vec<(String, String)>,
    threshold: f64,
) -> Result<()> {
    let pipeline = FittedPipeline::load(artifact)?;
    let fields: HashMap<String, String> = fields.into_iter().collect();

    let prediction = pipeline.predict_record(&fields, threshold)?.rounded();

    println!();
    println!(
        "    {} {}",
        style("🔮").cyan(),
        style("PREDICTION").white().bold()
    );
    println!("    {}", style("─".repeat(30)).dim());
    println!(
        "      Predicted class: {}",
        style(prediction.predicted_class).bold()
    );
    println!("      P(class 0):      {:.3}", prediction.prob_0);
    println!("      P(class 1):      {:.3}", prediction.prob_1);
    println!();

    Ok(())
}
