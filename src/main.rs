use clap::Parser;
use miette::Result;
use mq::cli::helpers::init_logging;
use mq::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let global = &cli.global;
    match cli.command {
        Commands::Play(args) => mq::cli::commands::play::run(args, global),
        Commands::Measure(args) => mq::cli::commands::measure::run(args, global),
        Commands::Calibrate(args) => mq::cli::commands::calibrate::run(args, global),
        Commands::Questions(args) => mq::cli::commands::questions::run(args, global),
        Commands::Refs(args) => mq::cli::commands::refs::run(args, global),
        Commands::Scores(cmd) => mq::cli::commands::scores::run(cmd, global),
        Commands::Completions(args) => mq::cli::commands::completions::run(args),
    }
}
