//! CLI entrypoint for tallyho
//!
//! This is the main binary that wires together all layers: config from
//! the infrastructure loader, posts from the thread source, the tally
//! engine from the application layer, and a formatter for the report.

use anyhow::{bail, Result};
use clap::Parser;
use tally_application::{PostSource, RunTallyUseCase};
use tally_domain::PartitionMode;
use tally_infrastructure::{ConfigLoader, TextThreadSource};
use tally_presentation::{
    BbCodeFormatter, Cli, ConsoleFormatter, ConsoleProgress, DisplayMode, JsonFormatter,
    OutputFormat, ReportOptions,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // CLI overrides layer on top of whatever the config files said.
    if let Some(name) = &cli.quest {
        config.quest.name = name.clone();
    }
    if let Some(partition) = &cli.partition {
        // Validate the flag now and store the canonical spelling.
        let mode: PartitionMode = partition.parse()?;
        config.quest.partition = mode.as_str().to_string();
    }

    if cli.show_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let thread = match cli.thread {
        Some(ref path) => path,
        None => bail!("Thread dump path is required. Try: tallyho thread.txt"),
    };

    let quest = config.quest.to_quest()?;
    let behavior = config.tally.to_behavior();

    info!("Starting tally for quest '{}'", quest.name());

    let source = TextThreadSource::new(thread);
    let posts = source.fetch_posts(&quest)?;

    let use_case = RunTallyUseCase::new(behavior);
    let result = if cli.quiet {
        use_case.execute(posts, &quest)?
    } else {
        use_case.execute_with_progress(posts, &quest, &ConsoleProgress)?
    };

    let output = cli.output.unwrap_or_else(|| {
        OutputFormat::parse_config(&config.tally.output).unwrap_or_else(|| {
            warn!(
                "Unknown output format '{}' in config, using console",
                config.tally.output
            );
            OutputFormat::Console
        })
    });
    let display = cli.display.unwrap_or_else(|| {
        DisplayMode::parse_config(&config.tally.display).unwrap_or_else(|| {
            warn!(
                "Unknown display mode '{}' in config, using full",
                config.tally.display
            );
            DisplayMode::Full
        })
    });

    let options = ReportOptions {
        display,
        debug: quest.debug_mode(),
    };

    let report = match output {
        OutputFormat::Console => ConsoleFormatter::format(&result, &options),
        OutputFormat::Bbcode => BbCodeFormatter::format(&result, &options),
        OutputFormat::Json => JsonFormatter::format(&result),
    };

    println!("{}", report);

    Ok(())
}
