//! raidfile - single-file parity protection and repair
//!
//! Subcommands:
//! - protect: write the .raid parity file and the .crc32 checksum file
//! - verify: list damaged blocks
//! - repair: rebuild damaged blocks in place
//! - simulate: write a randomly damaged .damaged copy
//! - demo: protect, damage a copy, detect, recover, detect again

use anyhow::{Context, Result};
use raidfile::damage::RandomDamage;
use raidfile::reporters::{ConsoleReporter, Reporter};
use raidfile::{workflow, DamageConfig, ProtectionConfig};
use std::path::PathBuf;
use std::process;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let matches = raidfile::args::parse_args();

    match matches.subcommand() {
        Some(("protect", sub_matches)) => handle_protect(sub_matches),
        Some(("verify", sub_matches)) => handle_verify(sub_matches),
        Some(("repair", sub_matches)) => handle_repair(sub_matches),
        Some(("simulate", sub_matches)) => handle_simulate(sub_matches),
        Some(("demo", sub_matches)) => handle_demo(sub_matches),
        Some((cmd, _)) => {
            eprintln!("Unknown command: {}", cmd);
            process::exit(1);
        }
        None => {
            eprintln!("Error: No command specified");
            eprintln!("\nUse 'raidfile --help' for usage information");
            process::exit(1);
        }
    }
}

fn input_file(matches: &clap::ArgMatches) -> PathBuf {
    PathBuf::from(
        matches
            .get_one::<String>("file")
            .expect("file is required"),
    )
}

fn handle_protect(matches: &clap::ArgMatches) -> Result<()> {
    let file = input_file(matches);
    let config = ProtectionConfig::from_args(matches)?;
    let reporter = ConsoleReporter::new(matches.get_flag("quiet"));

    workflow::protect_file(&file, &config, &reporter)
        .with_context(|| format!("Failed to protect {}", file.display()))?;
    Ok(())
}

fn handle_verify(matches: &clap::ArgMatches) -> Result<()> {
    let file = input_file(matches);
    let quiet = matches.get_flag("quiet");
    let reporter = ConsoleReporter::new(quiet);

    let damaged = workflow::verify_file(&file, &reporter)
        .with_context(|| format!("Failed to verify {}", file.display()))?;

    if damaged.is_empty() {
        Ok(())
    } else {
        if !quiet {
            eprintln!("\nRepair is required.");
        }
        process::exit(1);
    }
}

fn handle_repair(matches: &clap::ArgMatches) -> Result<()> {
    let file = input_file(matches);
    let config = ProtectionConfig::from_args(matches)?;
    let quiet = matches.get_flag("quiet");
    let reporter = ConsoleReporter::new(quiet);

    let damaged = workflow::verify_file(&file, &reporter)
        .with_context(|| format!("Failed to verify {}", file.display()))?;
    if damaged.is_empty() {
        reporter.report_complete("All blocks are intact. Repair is not required.");
        return Ok(());
    }

    workflow::repair_file(&file, damaged.indices(), config.group_width, &reporter)
        .with_context(|| format!("Failed to repair {}", file.display()))?;

    let remaining = workflow::verify_file(&file, &reporter)
        .with_context(|| format!("Failed to re-verify {}", file.display()))?;
    if remaining.is_empty() {
        reporter.report_complete("Repair complete.");
        Ok(())
    } else {
        reporter.report_error(&format!(
            "{} damaged blocks could not be recovered",
            remaining.len()
        ));
        process::exit(1);
    }
}

fn handle_simulate(matches: &clap::ArgMatches) -> Result<()> {
    let file = input_file(matches);
    let damage = DamageConfig::from_args(matches);
    let reporter = ConsoleReporter::new(matches.get_flag("quiet"));

    let mut source = RandomDamage::from_config(&damage);
    let (damaged_path, events) = workflow::simulate_damage(&file, &damage, &mut source)
        .with_context(|| format!("Failed to damage a copy of {}", file.display()))?;

    reporter.report_complete(&format!(
        "Wrote {} damage bursts into \"{}\"",
        events.len(),
        damaged_path.display()
    ));
    Ok(())
}

fn handle_demo(matches: &clap::ArgMatches) -> Result<()> {
    let file = input_file(matches);
    let config = ProtectionConfig::from_args(matches)?;
    let damage = DamageConfig::from_args(matches);
    let reporter = ConsoleReporter::new(matches.get_flag("quiet"));

    let mut source = RandomDamage::from_config(&damage);
    let summary = workflow::run_demo(&file, &config, &damage, &mut source, &reporter)
        .with_context(|| format!("Demo failed for {}", file.display()))?;

    reporter.report_complete(&format!(
        "Detected {} damaged blocks before recovery, {} after.",
        summary.detected_before.len(),
        summary.detected_after.len()
    ));

    if summary.is_fully_recovered() {
        Ok(())
    } else {
        process::exit(1);
    }
}
