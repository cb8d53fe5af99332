//! `mq measure` command - one-off length or angle between two points

use clap::{Args, ValueEnum};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::{load_config, parse_point};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::geometry::{euclidean_distance, Point};
use crate::core::measurement::{measure, MeasurementKind};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Length,
    Angle,
}

impl From<KindArg> for MeasurementKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Length => MeasurementKind::Length,
            KindArg::Angle => MeasurementKind::Angle,
        }
    }
}

#[derive(Args, Debug)]
pub struct MeasureArgs {
    /// What to measure
    #[arg(long, short = 'k', default_value = "length")]
    pub kind: KindArg,

    /// Start point as x,y pixels
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: Point,

    /// End point as x,y pixels
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: Point,

    /// Calibration factor in pixels per unit
    #[arg(long, short = 'f', default_value_t = 1.0)]
    pub factor: f64,
}

#[derive(Serialize)]
struct MeasureReport {
    kind: MeasurementKind,
    from: Point,
    to: Point,
    pixel_distance: f64,
    factor: f64,
    value: f64,
    display: String,
}

pub fn run(args: MeasureArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let kind = MeasurementKind::from(args.kind);
    let measurement = measure(kind, &args.from, &args.to, args.factor).into_diagnostic()?;
    let display = measurement.format(config.display_precision, &config.unit);

    let report = MeasureReport {
        kind,
        from: args.from,
        to: args.to,
        pixel_distance: euclidean_distance(&args.from, &args.to),
        factor: args.factor,
        value: measurement.value,
        display,
    };

    let format = effective_format(global.output, false);
    if print_structured(format, &report)? {
        return Ok(());
    }
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer
                .write_record(["kind", "pixel_distance", "factor", "value"])
                .into_diagnostic()?;
            writer
                .write_record([
                    report.kind.to_string(),
                    report.pixel_distance.to_string(),
                    report.factor.to_string(),
                    report.value.to_string(),
                ])
                .into_diagnostic()?;
            writer.flush().into_diagnostic()?;
        }
        _ => println!("{}", report.display),
    }
    Ok(())
}
