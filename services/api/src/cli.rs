use crate::commands::{run_calculate, run_export, CalculateArgs, ExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use roi_estimator::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "ROI Estimator",
    about = "Estimate automation ROI and export reports from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the ROI estimate for a set of inputs
    Calculate(CalculateArgs),
    /// Subscribe an email and write the ROI report to disk
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculate(args),
        Command::Export(args) => run_export(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["roi-estimator-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_calculate_flags() {
        let cli = Cli::try_parse_from([
            "roi-estimator-api",
            "calculate",
            "--team-size",
            "12",
            "--software-cost",
            "$1,000",
            "--json",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Calculate(args)) => {
                assert_eq!(args.inputs.team_size, Some(12.0));
                assert_eq!(args.inputs.software_cost.as_deref(), Some("$1,000"));
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn export_requires_email() {
        assert!(Cli::try_parse_from(["roi-estimator-api", "export"]).is_err());
    }
}
