//! HTTP prediction service
//!
//! The fitted-pipeline artifact is deserialized once at startup and held
//! immutably in shared application state; requests never reload it and
//! no locking is involved. Routes are registered explicitly. Reloading a
//! new artifact is a redeploy.

pub mod handlers;

use std::path::Path;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};

use crate::pipeline::FittedPipeline;

/// Read-only state shared by all workers and requests
pub struct AppState {
    pub pipeline: FittedPipeline,
    pub threshold: f64,
}

/// Load the artifact and run the HTTP server until shutdown.
///
/// An unreadable or malformed artifact is fatal here: the process must
/// not come up without a model to serve.
pub fn run(artifact_path: &Path, bind: &str, threshold: f64) -> Result<()> {
    let pipeline = FittedPipeline::load(artifact_path).with_context(|| {
        format!(
            "failed to load model artifact from {}",
            artifact_path.display()
        )
    })?;

    log::info!(
        "loaded model artifact: {} transformed features, trained {} on {} rows",
        pipeline.features.width(),
        pipeline.metadata.created_at,
        pipeline.metadata.training_rows
    );

    let state = web::Data::new(AppState {
        pipeline,
        threshold,
    });
    let bind_addr = bind.to_string();

    log::info!("listening on http://{}", bind_addr);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(middleware::Logger::default())
                .route("/predict", web::get().to(handlers::predict))
                .route("/health", web::get().to(handlers::health))
        })
        .bind(&bind_addr)?
        .run()
        .await
    })?;

    Ok(())
}
