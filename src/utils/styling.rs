//! Terminal styling utilities

use console::style;
use std::path::Path;
use std::time::Duration;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("riskpipe").cyan().bold(),
        style("train · persist · serve").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print the training configuration card
pub fn print_config(
    input: &Path,
    outcome: &str,
    artifact: &Path,
    test_fraction: f64,
    seed: u64,
) {
    println!("    {} {}", style("⚙").cyan(), style("Configuration").bold());
    println!("      Input:         {}", input.display());
    println!("      Outcome:       {}", outcome);
    println!("      Artifact:      {}", artifact.display());
    println!("      Test fraction: {}", test_fraction);
    println!("      Seed:          {}", seed);
}

/// Print a numbered step header
pub fn print_step_header(step: usize, title: &str) {
    println!();
    println!(
        "    {} {}",
        style(format!("[{}]", step)).cyan().bold(),
        style(title).white().bold()
    );
}

/// Print a success line
pub fn print_success(message: &str) {
    println!("    {} {}", style("✔").green().bold(), message);
}

/// Print an informational line
pub fn print_info(message: &str) {
    println!("      {} {}", style("•").dim(), message);
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "      {}",
        style(format!("({:.2}s)", elapsed.as_secs_f64())).dim()
    );
}

/// Print the closing line with the total run time
pub fn print_completion(elapsed: Duration) {
    println!();
    println!("    {}", style("━".repeat(50)).dim());
    println!(
        "    {} {}",
        style("✨").cyan(),
        style(format!("Done in {:.2}s", elapsed.as_secs_f64())).bold()
    );
    println!();
}
