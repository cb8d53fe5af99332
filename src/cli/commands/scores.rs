//! `mq scores` command - leaderboard and score management

use clap::{Args, Subcommand};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{load_config, truncate_str};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::scores::{JsonScoreStore, ScoreRecord};

#[derive(Subcommand, Debug)]
pub enum ScoresCommands {
    /// Show the leaderboard, highest score first
    List(ListArgs),

    /// Total points across all recorded sessions
    Total,

    /// Delete every recorded score
    Clear(ClearArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show at most this many entries
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Tabled)]
struct ScoreRow {
    #[tabled(rename = "RANK")]
    rank: usize,
    #[tabled(rename = "PLAYER")]
    player: String,
    #[tabled(rename = "SCORE")]
    score: u32,
    #[tabled(rename = "LABEL")]
    label: String,
    #[tabled(rename = "DATE")]
    date: String,
}

pub fn run(cmd: ScoresCommands, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = JsonScoreStore::new(config.scores_file.clone());
    match cmd {
        ScoresCommands::List(args) => run_list(&store, args, global),
        ScoresCommands::Total => run_total(&store, global),
        ScoresCommands::Clear(args) => run_clear(&store, args),
    }
}

fn run_list(store: &JsonScoreStore, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut records = store.leaderboard().into_diagnostic()?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    let format = effective_format(global.output, true);
    if print_structured(format, &records)? {
        return Ok(());
    }

    if records.is_empty() {
        println!("No scores recorded yet.");
        return Ok(());
    }

    match format {
        OutputFormat::Csv => write_csv(&records),
        OutputFormat::Text => {
            for (i, r) in records.iter().enumerate() {
                println!("{}\t{}\t{}\t{}", i + 1, r.player_name, r.score, r.label);
            }
            Ok(())
        }
        _ => {
            let rows: Vec<ScoreRow> = records
                .iter()
                .enumerate()
                .map(|(i, r)| ScoreRow {
                    rank: i + 1,
                    player: truncate_str(&r.player_name, 20),
                    score: r.score,
                    label: truncate_str(&r.label, 16),
                    date: r.date.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            Ok(())
        }
    }
}

fn write_csv(records: &[ScoreRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer
        .write_record(["rank", "player", "score", "label", "date"])
        .into_diagnostic()?;
    for (i, r) in records.iter().enumerate() {
        writer
            .write_record([
                (i + 1).to_string(),
                r.player_name.clone(),
                r.score.to_string(),
                r.label.clone(),
                r.date.to_rfc3339(),
            ])
            .into_diagnostic()?;
    }
    writer.flush().into_diagnostic()
}

fn run_total(store: &JsonScoreStore, global: &GlobalOpts) -> Result<()> {
    let total = store.total_points().into_diagnostic()?;
    let format = effective_format(global.output, false);
    if print_structured(format, &serde_json::json!({ "total": total }))? {
        return Ok(());
    }
    println!("{}", total);
    Ok(())
}

fn run_clear(store: &JsonScoreStore, args: ClearArgs) -> Result<()> {
    let count = store.load().into_diagnostic()?.len();
    if count == 0 {
        println!("No scores to clear.");
        return Ok(());
    }

    if !args.yes {
        if !std::io::stdin().is_terminal() {
            miette::bail!("Refusing to clear scores without confirmation; pass --yes");
        }
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {} recorded score(s)?", count))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !proceed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.clear().into_diagnostic()?;
    println!("{} Cleared {} score(s)", style("✓").green(), removed);
    Ok(())
}
