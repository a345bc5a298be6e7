use crate::{print_error, print_success};
use colored::*;
use panhandle_vm::{run_scenario, Scenario, ScenarioReport, StepOutcome};
use std::path::PathBuf;

pub fn handle(files: &[PathBuf], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut failed = 0usize;

    for path in files {
        let scenario = match Scenario::load_from_file(path) {
            Ok(s) => s,
            Err(e) => {
                print_error(&e.to_string());
                failed += 1;
                continue;
            }
        };
        log::info!("running {} ({} steps)", scenario.name, scenario.steps.len());
        let report = run_scenario(&scenario);
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        if !report.passed() {
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} scenarios failed", failed, files.len()).into());
    }
    if !json {
        print_success(&format!("{} scenarios passed", files.len()));
    }
    Ok(())
}

fn print_report(report: &ScenarioReport) {
    println!("{}", report.name.bold());
    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Passed => {
                println!("  {} {:>3} {}", "✓".green(), step.index, step.description.dimmed())
            }
            StepOutcome::Failed(reason) => {
                println!("  {} {:>3} {}", "✗".red().bold(), step.index, step.description);
                println!("        {}", reason.red());
            }
        }
    }
    let skipped = report.total_steps - report.steps.len();
    if skipped > 0 {
        println!("  {} steps not run", skipped);
    }
    println!("  state {}", report.state_digest.dimmed());
}
