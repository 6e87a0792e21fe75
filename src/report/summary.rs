//! Training summary report generation

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{Evaluation, LogisticModel};

/// Summary of one training run
#[derive(Debug)]
pub struct TrainingSummary {
    pub rows_total: usize,
    pub rows_dropped_incomplete: usize,
    pub rows_train: usize,
    pub rows_test: usize,
    pub predictors: usize,
    pub encoded_features: usize,
    pub irls_iterations: usize,
    pub deviance: f64,
    pub evaluation: Evaluation,
}

impl TrainingSummary {
    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.rows_total)]);
        table.add_row(vec![
            Cell::new("🗑️  Dropped (incomplete)"),
            Cell::new(self.rows_dropped_incomplete).fg(if self.rows_dropped_incomplete == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("✂️  Train / Test"),
            Cell::new(format!("{} / {}", self.rows_train, self.rows_test)),
        ]);
        table.add_row(vec![
            Cell::new("🔢 Predictors (encoded)"),
            Cell::new(format!("{} ({})", self.predictors, self.encoded_features)),
        ]);
        table.add_row(vec![
            Cell::new("🔁 IRLS iterations"),
            Cell::new(self.irls_iterations),
        ]);
        table.add_row(vec![
            Cell::new("📐 Deviance"),
            Cell::new(format!("{:.3}", self.deviance)),
        ]);
        table.add_row(vec![
            Cell::new("🎯 Accuracy"),
            Cell::new(format!("{:.3}", self.evaluation.accuracy))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let gini_color = if self.evaluation.gini > 0.4 {
            Color::Green
        } else if self.evaluation.gini > 0.2 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new("📈 AUC (Gini)"),
            Cell::new(format!(
                "{:.3} ({:.3})",
                self.evaluation.auc, self.evaluation.gini
            ))
            .fg(gini_color),
        ]);

        let c = &self.evaluation.confusion;
        table.add_row(vec![
            Cell::new("🧮 Confusion TP/FP/TN/FN"),
            Cell::new(format!(
                "{}/{}/{}/{}",
                c.true_positives, c.false_positives, c.true_negatives, c.false_negatives
            )),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}

/// Print the fitted coefficients, largest magnitude first.
pub fn display_coefficients(model: &LogisticModel, feature_names: &[String]) {
    println!();
    println!(
        "    {} {}",
        style("⚖️").cyan(),
        style("COEFFICIENTS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());

    let mut entries: Vec<(&str, f64)> = feature_names
        .iter()
        .map(|n| n.as_str())
        .zip(model.weights.iter().copied())
        .collect();
    entries.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Feature").add_attribute(Attribute::Bold),
        Cell::new("Weight").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("(intercept)").add_attribute(Attribute::Dim),
        Cell::new(format!("{:+.4}", model.intercept)),
    ]);
    for (name, weight) in entries {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:+.4}", weight)).fg(if weight >= 0.0 {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }

    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
