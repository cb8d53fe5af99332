//! `mq refs` command - list reference objects

use clap::Args;
use miette::{IntoDiagnostic, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::cli::helpers::load_config;
use crate::cli::output::{effective_format, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Args, Debug)]
pub struct RefsArgs {}

#[derive(Tabled)]
struct RefRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "LENGTH")]
    length: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "DECODER")]
    decoder: String,
}

pub fn run(_args: RefsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let format = effective_format(global.output, true);
    if print_structured(format, &config.references)? {
        return Ok(());
    }

    match format {
        OutputFormat::Text => {
            for r in &config.references {
                println!("{}\t{}", r.name, r.length);
            }
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer
                .write_record(["name", "length", "unit", "description", "decoder"])
                .into_diagnostic()?;
            for r in &config.references {
                let decoder = r.name.eq_ignore_ascii_case(&config.decoder_reference);
                writer
                    .write_record([
                        r.name.clone(),
                        r.length.to_string(),
                        config.unit.clone(),
                        r.description.clone().unwrap_or_default(),
                        decoder.to_string(),
                    ])
                    .into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        _ => {
            let rows: Vec<RefRow> = config
                .references
                .iter()
                .map(|r| RefRow {
                    name: r.name.clone(),
                    length: format!("{} {}", r.length, config.unit),
                    description: r.description.clone().unwrap_or_default(),
                    decoder: if r.name.eq_ignore_ascii_case(&config.decoder_reference) {
                        "yes".to_string()
                    } else {
                        String::new()
                    },
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
    Ok(())
}
