//! Security report and tag overview.

use clap::Args;
use cipher_vault_sync::analytics::{aggregate_tags, security_report};

use crate::context::Context;
use crate::render::truncate;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ReportArgs, ctx: &Context) -> anyhow::Result<()> {
    let snapshot = ctx.snapshot();
    let report = security_report(&snapshot.entries, &snapshot.vaults, ctx.cipher());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Vaults:     {}", report.vault_count);
    println!("Entries:    {} active, {} in trash", report.active_count, report.trashed_count);
    println!("Favorites:  {}", report.favorite_count);
    println!();
    println!("Password strength");
    println!("  Weak:         {}", report.distribution.weak);
    println!("  Medium:       {}", report.distribution.medium);
    println!("  Strong:       {}", report.distribution.strong);
    println!("  Very Strong:  {}", report.distribution.very_strong);
    println!("  Reused:       {}", report.reused_count);
    println!();
    println!("Recommendations");
    for rec in &report.recommendations {
        println!("  - {rec}");
    }
    if !report.recent.is_empty() {
        println!();
        println!("Recently added");
        for recent in &report.recent {
            println!(
                "  {}  {:<24} {}",
                recent.created_at.format("%Y-%m-%d"),
                truncate(&recent.service_name, 24),
                recent.vault_name
            );
        }
    }
    Ok(())
}

/// Print every tag in use by an active entry.
pub fn run_tags(ctx: &Context) -> anyhow::Result<()> {
    let tags = aggregate_tags(&ctx.snapshot().entries);
    if tags.is_empty() {
        println!("No tags.");
    }
    for tag in tags {
        println!("{tag}");
    }
    Ok(())
}
