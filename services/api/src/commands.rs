use crate::infra::{ConfiguredNewsletter, DirectoryReportSink, StdoutClipboard, TerminalShare};
use chrono::Local;
use clap::Args;
use roi_estimator::calculator::{
    compute_roi, CalculatorInput, RawCalculatorInput, RawValue, RoiDisplay,
};
use roi_estimator::config::AppConfig;
use roi_estimator::error::AppError;
use roi_estimator::export::{
    share_results, ExportFlow, ExportPolicy, ExportSession, ShareContent, ShareOutcome,
};
use roi_estimator::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct InputArgs {
    /// Hours per week each person spends on the manual process (10-80)
    #[arg(long)]
    pub(crate) manual_hours: Option<f64>,
    /// Blended hourly labor cost (20-150)
    #[arg(long)]
    pub(crate) hourly_rate: Option<f64>,
    /// People performing the process (1-50)
    #[arg(long)]
    pub(crate) team_size: Option<f64>,
    /// Share of the manual work that can be automated, in percent (10-90)
    #[arg(long)]
    pub(crate) automation_percentage: Option<f64>,
    /// Monthly software subscription; free-form, unparsable entry counts as 0
    #[arg(long)]
    pub(crate) software_cost: Option<String>,
    /// One-time implementation cost; free-form, unparsable entry counts as 0
    #[arg(long)]
    pub(crate) implementation_cost: Option<String>,
}

impl InputArgs {
    pub(crate) fn resolve(&self) -> CalculatorInput {
        RawCalculatorInput {
            manual_hours: self.manual_hours.map(RawValue::Number),
            hourly_rate: self.hourly_rate.map(RawValue::Number),
            team_size: self.team_size.map(RawValue::Number),
            automation_percentage: self.automation_percentage.map(RawValue::Number),
            software_cost: self.software_cost.clone().map(RawValue::Text),
            implementation_cost: self.implementation_cost.clone().map(RawValue::Text),
        }
        .resolve()
    }
}

#[derive(Args, Debug)]
pub(crate) struct CalculateArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
    /// Emit inputs and results as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) inputs: InputArgs,
    /// Email address to subscribe before the report is written
    #[arg(long)]
    pub(crate) email: String,
    /// Directory the report is written into
    #[arg(long, default_value = ".")]
    pub(crate) out: PathBuf,
    /// Also print a shareable message pointing at this URL
    #[arg(long)]
    pub(crate) share_url: Option<String>,
}

pub(crate) fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let input = args.inputs.resolve();

    if args.json {
        let payload = serde_json::json!({
            "inputs": input,
            "results": compute_roi(&input),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload)
                .map_err(|err| AppError::Io(std::io::Error::other(err)))?
        );
        return Ok(());
    }

    render_summary(&input);
    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        inputs,
        email,
        out,
        share_url,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let input = inputs.resolve();
    let sink = Arc::new(DirectoryReportSink::new(out));
    let flow = ExportFlow::new(
        Arc::new(ConfiguredNewsletter::from_config(&config.export)),
        sink.clone(),
        ExportPolicy::from(&config.export),
    );

    let mut session = ExportSession::new();
    session.request_download()?;
    session.set_email(&email)?;

    let file = match session.submit(&flow, &input).await {
        Ok(file) => file,
        Err(err) => {
            if let Some(message) = session.error() {
                eprintln!("{message}");
            }
            return Err(err.into());
        }
    };

    render_summary(&input);
    println!("\nReport written to {}", sink.path_for(&file).display());

    if let Some(url) = share_url {
        let content = ShareContent::from_result(&compute_roi(&input), &url);
        println!("\nShare this estimate:");
        let outcome = share_results(&content, &TerminalShare, &StdoutClipboard)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        if outcome == ShareOutcome::Shared {
            println!("Shared via the system share sheet.");
        }
    }

    Ok(())
}

fn render_summary(input: &CalculatorInput) {
    let display = RoiDisplay::from_result(&compute_roi(input));

    println!("ROI estimate ({})", Local::now().format("%Y-%m-%d"));
    println!(
        "Inputs: {} hrs/week x {} people at ${}/hr, {}% automatable",
        input.manual_hours, input.team_size, input.hourly_rate, input.automation_percentage
    );
    println!(
        "Software: ${}/month, implementation ${}",
        input.software_cost, input.implementation_cost
    );

    println!("\nCurrent manual cost");
    println!("- weekly  {}", display.weekly_manual_cost);
    println!("- monthly {}", display.monthly_manual_cost);
    println!("- yearly  {}", display.yearly_manual_cost);

    println!("\nSavings with automation");
    println!("- time saved per person {}/week", display.time_saved_per_week);
    println!("- weekly  {}", display.weekly_savings);
    println!("- monthly {}", display.monthly_savings);
    println!("- yearly  {}", display.yearly_savings);

    println!("\nInvestment");
    println!("- first-year cost {}", display.first_year_cost);
    println!("- net first-year  {}", display.net_first_year);
    println!("- ROI             {}", display.roi);
    println!("- payback         {}", display.payback_period);

    println!("\nThree-year projection");
    println!("- year 1 {}", display.year1);
    println!("- year 2 {}", display.year2);
    println!("- year 3 {}", display.year3);
    println!("- total  {}", display.three_year_total);
}
