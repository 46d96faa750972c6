use anyhow::{Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use riskcards::cli::{Cli, Commands, SignalsArgs, ValidateArgs};
use riskcards::config;
use riskcards::ctx::Ctx;
use riskcards::feed;
use riskcards::io;
use riskcards::pipeline::Pipeline;
use riskcards::signals;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let mut ctx = Ctx::new(
                args.sources.config.clone(),
                args.sources.sources(),
                args.out,
                !args.no_write,
                args.tsv,
                env!("CARGO_PKG_VERSION"),
            );
            Pipeline::standard().run(&mut ctx)?;
            print_summary(&ctx)?;
        }
        Commands::Validate(args) => handle_validate(args)?,
        Commands::Signals(args) => handle_signals(args)?,
    }

    Ok(())
}

fn print_summary(ctx: &Ctx) -> Result<()> {
    let summary = io::summary::format_summary(ctx)?;
    print!("{}", summary);
    if !ctx.warnings.is_empty() {
        println!("warnings:");
        for warning in &ctx.warnings {
            println!("- {}", warning);
        }
    }
    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<()> {
    let report = feed::validate_feed_file(&args.feed)?;
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    if !report.is_ok() {
        for error in &report.errors {
            println!("error: {}", error);
        }
        bail!(
            "feed validation failed with {} error(s): {}",
            report.errors.len(),
            args.feed.display()
        );
    }
    println!("riskcards validate ok: {}", args.feed.display());
    Ok(())
}

fn handle_signals(args: SignalsArgs) -> Result<()> {
    let site = match &args.sources.config {
        Some(path) => config::load_site_config(path)?,
        None => config::load_builtin()?,
    };
    let merged = signals::collect(&args.sources.sources(), &site)?;
    println!("{}", serde_json::to_string_pretty(&merged)?);
    Ok(())
}
