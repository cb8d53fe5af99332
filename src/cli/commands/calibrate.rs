//! `mq calibrate` command - scale factor from a reference span

use clap::Args;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{load_config, parse_point};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::GlobalOpts;
use crate::core::calibration::{calibrate, find_reference};
use crate::core::geometry::{euclidean_distance, Point};

#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// First edge of the reference object as x,y pixels
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: Point,

    /// Second edge of the reference object as x,y pixels
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: Point,

    /// Named reference object (see `mq refs`)
    #[arg(long, short = 'r', conflicts_with = "length")]
    pub reference: Option<String>,

    /// Physical length of the span, in the configured unit
    #[arg(long, short = 'l', allow_hyphen_values = true)]
    pub length: Option<f64>,
}

#[derive(Serialize)]
struct CalibrationReport {
    reference: Option<String>,
    length: f64,
    pixel_distance: f64,
    factor: f64,
}

pub fn run(args: CalibrateArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;

    let (reference, length) = match (&args.reference, args.length) {
        (Some(name), _) => {
            let reference = find_reference(&config.references, name).into_diagnostic()?;
            (Some(reference.name.clone()), reference.length)
        }
        (None, Some(length)) => (None, length),
        (None, None) => {
            let reference = config
                .decoder_reference()
                .ok_or_else(|| miette::miette!("No reference given; use --reference or --length"))?;
            (Some(reference.name.clone()), reference.length)
        }
    };

    let factor = calibrate(Some(&args.from), Some(&args.to), length).into_diagnostic()?;
    let report = CalibrationReport {
        reference,
        length,
        pixel_distance: euclidean_distance(&args.from, &args.to),
        factor: factor.value(),
    };

    if print_structured(effective_format(global.output, false), &report)? {
        return Ok(());
    }
    let label = report
        .reference
        .as_deref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default();
    println!(
        "{:.1} px across {} {}{} → {}",
        report.pixel_distance, report.length, config.unit, label, factor
    );
    Ok(())
}
