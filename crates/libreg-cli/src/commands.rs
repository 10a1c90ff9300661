use colored::Colorize;
use libreg_gate::GateConfig;
use libreg_registry::Library;
use libreg_types::Condition;
use serde::Serialize;

use crate::cli::*;
use crate::script::{demo_script, load_gate_config, Labels, Script, StepReport};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Run(args) => cmd_run(args, format),
        Command::CheckConfig(args) => cmd_check_config(args, format),
        Command::Demo(args) => cmd_demo(args, format),
    }
}

fn cmd_run(args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let script = Script::load(&args.script)?;
    let config = match &args.config {
        Some(path) => load_gate_config(path)?,
        None => script.gate.clone().unwrap_or_default(),
    };
    tracing::info!(script = %args.script.display(), steps = script.steps.len(), "running script");
    execute(&script, config, format)
}

fn cmd_check_config(args: CheckConfigArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = load_gate_config(&args.path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), args.path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn cmd_demo(args: DemoArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = GateConfig {
        librarian_override: args.librarian_override,
        ..GateConfig::default()
    };
    let script = demo_script(&config)?;
    execute(&script, config, format)
}

#[derive(Serialize)]
struct RunReport {
    steps: Vec<StepReport>,
    books: Vec<BookRow>,
    librarians: Vec<String>,
    receipts: usize,
    journal_head: Option<String>,
    journal_verified: bool,
}

#[derive(Serialize)]
struct BookRow {
    name: String,
    owner: String,
    condition: Condition,
}

fn execute(script: &Script, config: GateConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut labels = Labels::default();
    let mut library = script.library(config, &mut labels);
    let steps = script.apply(&mut library, &mut labels);
    let report = summarize(&library, &labels, steps);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    if let Err(err) = library.journal().verify() {
        anyhow::bail!("journal failed verification: {err}");
    }
    let unmet = report.steps.iter().filter(|s| !s.expectation_met).count();
    if unmet > 0 {
        anyhow::bail!("{unmet} step(s) did not match their expected outcome");
    }
    Ok(())
}

fn summarize(library: &Library, labels: &Labels, steps: Vec<StepReport>) -> RunReport {
    let books = library
        .books()
        .into_iter()
        .map(|view| BookRow {
            name: view.name.to_string(),
            owner: labels.name(&view.owner),
            condition: view.condition,
        })
        .collect();
    let librarians = library
        .librarians()
        .iter()
        .map(|id| labels.name(id))
        .collect();
    let journal = library.journal();
    RunReport {
        steps,
        books,
        librarians,
        receipts: journal.len(),
        journal_head: journal.head().map(|r| r.short_hash()),
        journal_verified: journal.verify().is_ok(),
    }
}

fn print_report(report: &RunReport) {
    for step in &report.steps {
        let status = if step.accepted {
            "✓ accepted".green()
        } else {
            let kind = step
                .rejection
                .map(|k| k.to_string())
                .unwrap_or_else(|| "error".into());
            format!("✗ {kind}").red()
        };
        print!(
            "{:>3}. {:<12} {}  {}",
            step.index,
            step.caller.cyan(),
            step.operation,
            status
        );
        if !step.expectation_met {
            print!("  {}", "(unexpected)".yellow().bold());
        }
        println!();
        if let Some(reason) = &step.reason {
            println!("       {}", reason.dimmed());
        }
    }

    println!("\n{}", "Books".bold());
    if report.books.is_empty() {
        println!("  (none)");
    }
    for book in &report.books {
        let condition = match book.condition {
            Condition::Good => book.condition.to_string().green(),
            Condition::Damaged => book.condition.to_string().red(),
        };
        println!("  {:<24} {:<12} {}", book.name, book.owner.cyan(), condition);
    }

    println!("\n{}", "Librarians".bold());
    for name in &report.librarians {
        println!("  {}", name.cyan());
    }

    let integrity = if report.journal_verified {
        "✓".green()
    } else {
        "✗".red()
    };
    println!(
        "\nJournal: {} receipts, head {}, integrity {}",
        report.receipts.to_string().bold(),
        report.journal_head.as_deref().unwrap_or("-").yellow(),
        integrity
    );
}
