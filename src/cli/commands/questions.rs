//! `mq questions` command - show a question round

use clap::Args;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::{load_config, questions_path, truncate_str};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::question::{MeasurementQuestion, QuestionSet};

#[derive(Args, Debug)]
pub struct QuestionsArgs {
    /// Question file to show instead of the configured round
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

#[derive(Tabled)]
struct QuestionRow {
    #[tabled(rename = "#")]
    id: u32,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "PROMPT")]
    prompt: String,
    #[tabled(rename = "TARGET")]
    target: String,
}

impl From<&MeasurementQuestion> for QuestionRow {
    fn from(q: &MeasurementQuestion) -> Self {
        Self {
            id: q.id,
            kind: q.kind.to_string(),
            prompt: truncate_str(&q.prompt, 48),
            target: q.target_label(),
        }
    }
}

pub fn run(args: QuestionsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let set = QuestionSet::load(questions_path(args.file, &config).as_deref()).into_diagnostic()?;
    let questions: Vec<&MeasurementQuestion> = set.iter().collect();

    let format = effective_format(global.output, true);
    if print_structured(format, &questions)? {
        return Ok(());
    }
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer
                .write_record(["id", "kind", "prompt", "target", "unit", "tolerance"])
                .into_diagnostic()?;
            for q in &questions {
                writer
                    .write_record([
                        q.id.to_string(),
                        q.kind.to_string(),
                        q.prompt.clone(),
                        q.target.to_string(),
                        q.unit.clone(),
                        q.tolerance.to_string(),
                    ])
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Text => {
            for q in &questions {
                println!("{}. [{}] {} - {}", q.id, q.kind, q.prompt, q.target_label());
            }
        }
        _ => {
            let rows: Vec<QuestionRow> = questions.iter().map(|q| QuestionRow::from(*q)).collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
    Ok(())
}
