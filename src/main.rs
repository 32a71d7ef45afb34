use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use env_logger::Env;
use log::info;
use rust_pattern_hunter::cli::{Args, Command, MatchArgs};
use rust_pattern_hunter::dom::{self, DomNode};
use rust_pattern_hunter::models::MatchConfig;
use rust_pattern_hunter::suite::{CaseOutcome, SuiteRunner};
use rust_pattern_hunter::ExemplarMatcher;
use std::fs::File;
use std::io::Write;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match args.command {
        Command::Match(match_args) => run_match(match_args),
        Command::Suite { dir, report } => run_suite(&dir, report.as_deref()),
    }
}

fn run_match(args: MatchArgs) -> Result<()> {
    let exemplar = dom::parse_snippet_file(&args.element)
        .with_context(|| format!("Failed to load exemplar from {}", args.element))?;
    let document = dom::parse_file(&args.html)
        .with_context(|| format!("Failed to load document from {}", args.html))?;

    let config = MatchConfig {
        match_type: args.match_type,
        match_max_depth: args.max_depth,
        match_tolerance: args.tolerance,
        match_inside_element: None,
    };
    let matcher = ExemplarMatcher::new(exemplar).with_config(config);

    if args.settings {
        println!("{}", serde_json::to_string_pretty(&matcher.settings())?);
    }

    let matches = matcher.find_matches(&document)?;

    let rendered = matches
        .iter()
        .map(dom::outer_html)
        .collect::<Result<Vec<_>, _>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("Number of items found: {}", matches.len().to_string().bold());

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["#", "Element", "Children"]);
        for (i, node) in matches.iter().enumerate() {
            table.add_row(vec![
                (i + 1).to_string(),
                node.summary(),
                node.element_children().len().to_string(),
            ]);
        }
        println!("{table}");
    }

    if let Some(output_path) = args.output {
        info!("Saving matches to {}", output_path);
        let mut file = File::create(&output_path)
            .with_context(|| format!("Failed to create output file {}", output_path))?;
        for html in &rendered {
            writeln!(file, "{}", html)?;
        }
        println!("{}", format!("Saved {} match(es) to {}", rendered.len(), output_path).green());
    }

    Ok(())
}

fn run_suite(dir: &str, report: Option<&str>) -> Result<()> {
    println!("Loading tests from {}...", dir);

    let runner = SuiteRunner::new(dir);
    let summary = runner.run()?;

    for case in &summary.cases {
        let label = format!("correctness.test.{}", case.name);
        let status = match &case.outcome {
            CaseOutcome::Passed { .. } => "pass".green().to_string(),
            CaseOutcome::Failed { matches, expected } => format!(
                "{}\n\tresult: {}  expected: {}",
                "fail".red().bold(),
                matches,
                expected
            ),
            CaseOutcome::Skipped { reason } => format!("{} ({})", "skip".yellow(), reason),
        };
        println!("{:.<40}{}", label, status);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Tests executed", "Passed", "Failed", "Skipped", "Percent passing"]);
    table.add_row(vec![
        summary.executed().to_string(),
        summary.passed().to_string(),
        summary.failed().to_string(),
        summary.skipped().to_string(),
        format!("{:.2}%", summary.percent_passing()),
    ]);
    println!("\n{table}");

    if let Some(path) = report {
        summary.write_to_file(path)?;
        println!("{}", format!("Suite report saved to {}", path).green());
    }

    if summary.failed() > 0 {
        bail!("{} of {} suite case(s) failed", summary.failed(), summary.executed());
    }

    Ok(())
}
