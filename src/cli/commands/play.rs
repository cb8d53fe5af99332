//! `mq play` command - replay a scripted measuring session

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::helpers::{load_config, questions_path, signed};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::GlobalOpts;
use crate::core::evaluator::{Advance, Verdict};
use crate::core::measurement::{Measurement, MeasurementKind};
use crate::core::scores::{JsonScoreStore, MemoryScoreStore, ScoreStore};
use crate::core::script::{Script, ScriptRunner, Step, StepReport};
use crate::core::session::{Outcome, Session, SessionSummary};
use crate::entities::question::QuestionSet;

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Script of events to replay (YAML)
    pub script: PathBuf,

    /// Question round to play instead of the built-in one
    #[arg(long, short = 'q')]
    pub questions: Option<PathBuf>,

    /// Player name recorded with the score
    #[arg(long, short = 'p')]
    pub player: Option<String>,

    /// Evaluate on the second tap without waiting for submit
    #[arg(long)]
    pub auto_submit: bool,

    /// Do not write the final score
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
struct StepView<'a> {
    index: usize,
    step: &'a Step,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct PlayReport<'a> {
    player: &'a str,
    steps: Vec<StepView<'a>>,
    summary: &'a SessionSummary,
}

pub fn run(args: PlayArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = load_config(global)?;
    let script = Script::from_file(&args.script)?;

    if let Some(player) = args.player.clone().or_else(|| script.player.clone()) {
        config.player_name = player;
    }
    if args.auto_submit {
        config.auto_submit = true;
    }

    let questions =
        QuestionSet::load(questions_path(args.questions.clone(), &config).as_deref())
            .into_diagnostic()?;
    let store: Box<dyn ScoreStore> = if args.dry_run {
        Box::new(MemoryScoreStore::new())
    } else {
        Box::new(JsonScoreStore::new(config.scores_file.clone()))
    };

    let player = config.player_name.clone();
    let mut session = Session::new(config, questions, store);
    let reports = ScriptRunner::new(&script).run(&script.steps, &mut session);

    let format = effective_format(global.output, false);
    let lines: Vec<String> = reports
        .iter()
        .map(|r| describe_report(r, &session))
        .collect();
    let mode = session.mode();
    let scores_file = session.config().scores_file.clone();
    let summary = session.end();

    let report = PlayReport {
        player: &player,
        steps: reports
            .iter()
            .map(|r| StepView {
                index: r.index + 1,
                step: &r.step,
                outcome: r.result.as_ref().ok(),
                error: r.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect(),
        summary: &summary,
    };
    if print_structured(format, &report)? {
        return Ok(());
    }

    println!(
        "{} {} · player {} · {} questions",
        style("Session").bold(),
        style(&summary.id).dim(),
        style(&player).cyan(),
        summary.total
    );
    for (r, line) in reports.iter().zip(&lines) {
        println!("{:>4}. {:<28} {}", r.index + 1, r.step.to_string(), line);
    }
    println!();
    println!(
        "Score: {} · answered {}/{} · mode {}",
        style(summary.score).bold().green(),
        summary.answered,
        summary.total,
        mode
    );
    if summary.completed {
        if args.dry_run {
            println!("{}", style("Session complete (dry run, score not saved)").yellow());
        } else {
            println!(
                "{} Score saved to {}",
                style("✓").green(),
                scores_file.display()
            );
        }
    }

    Ok(())
}

fn describe_report(report: &StepReport, session: &Session) -> String {
    match &report.result {
        Ok(outcome) => describe_outcome(outcome, session),
        Err(e) => style(format!("error: {}", e)).red().to_string(),
    }
}

fn describe_outcome(outcome: &Outcome, session: &Session) -> String {
    let config = session.config();
    match outcome {
        Outcome::CameraStarted { mode } => format!("camera on ({})", mode),
        Outcome::CameraStopped => "camera off".to_string(),
        Outcome::ReferenceReady { reference, length } => {
            format!("reference {} ready ({} {})", reference, length, config.unit)
        }
        Outcome::FirstPointSet { point } => format!("first point set at {}", point),
        Outcome::CalibrationPointsSet { pixel_distance } => {
            format!("calibration span {:.1} px", pixel_distance)
        }
        Outcome::Calibrated { reference, factor } => {
            style(format!("calibrated with {} ({})", reference, factor))
                .green()
                .to_string()
        }
        Outcome::Measured { measurement } => {
            format!("measured {}", format_measurement(measurement, session))
        }
        Outcome::Evaluated { verdict, advance } => describe_verdict(verdict, advance, session),
        Outcome::PointsReset { mode } => format!("points cleared ({})", mode),
        Outcome::Recalibrating => "recalibrating".to_string(),
        Outcome::Ignored { reason } => style(format!("ignored ({})", reason)).dim().to_string(),
        Outcome::Unchanged => style("no change").dim().to_string(),
    }
}

fn format_measurement(measurement: &Measurement, session: &Session) -> String {
    let config = session.config();
    measurement.format(config.display_precision, &config.unit)
}

fn describe_verdict(verdict: &Verdict, advance: &Advance, session: &Session) -> String {
    let question = session
        .questions()
        .iter()
        .find(|q| q.id == verdict.question_id);
    let kind = question.map(|q| q.kind).unwrap_or(MeasurementKind::Length);
    let measured = format_measurement(
        &Measurement {
            kind,
            value: verdict.measured,
        },
        session,
    );
    let target = question
        .map(|q| q.target_label())
        .unwrap_or_else(|| verdict.target.to_string());

    if verdict.accepted {
        let next = match advance {
            Advance::Completed { final_score } => format!(", round complete with {} points", final_score),
            _ => String::new(),
        };
        style(format!("✓ correct: {} (target {}){}", measured, target, next))
            .green()
            .to_string()
    } else {
        style(format!(
            "✗ try again: {} (target {}, off by {})",
            measured,
            target,
            signed(verdict.delta, 1)
        ))
        .yellow()
        .to_string()
    }
}
