use std::path::PathBuf;

use clap::{Args, Command, FromArgMatches as _};
use log::info;

use crate::context::Context;
use crate::error::HerdError;
use crate::herd::ContextHerdExt;
use crate::log::apply_log_spec;
use crate::metrics::TickMetrics;
use crate::parameters::{ContextParametersExt, Parameters};
use crate::random::ContextRandomExt;
use crate::report::ContextReportExt;

/// Default cli arguments for the herdsim runner
#[derive(Args, Debug, Clone, Default)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path to a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the metrics report. No report is written without it
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Log level (`info`) or comma separated `module=level` filters
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Number of days to simulate, overriding `max_days` from the parameters
    #[arg(short, long)]
    pub days: Option<u64>,
}

fn create_herdsim_cli() -> Command {
    let cli = Command::new("herdsim").about("Simulates a seasonal herd with an endemic disease");
    BaseArgs::augment_args(cli)
}

/// Runs a simulation configured from the command line.
///
/// # Errors
/// Returns an error if argument parsing fails or the run cannot be set up or completed
#[allow(clippy::missing_errors_doc)]
pub fn run_with_args() -> Result<Context, Box<dyn std::error::Error>> {
    let matches = create_herdsim_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(args)
}

/// Sets up a `Context` from `args`, runs it to completion and returns it.
///
/// # Errors
/// Returns an error if the log specification, parameters or report output are invalid, or if
/// the run stopped before simulating every day
pub fn run_with_args_internal(args: BaseArgs) -> Result<Context, Box<dyn std::error::Error>> {
    if let Some(spec) = &args.log_level {
        apply_log_spec(spec)?;
    }

    // Instantiate a context
    let mut context = Context::new();

    let mut parameters = match &args.config {
        Some(path) => {
            info!("Loading parameters from: {}", path.display());
            Parameters::from_json_file(path)?
        }
        None => Parameters::default(),
    };
    if let Some(days) = args.days {
        parameters.max_days = days;
    }
    let max_days = parameters.max_days;
    context.set_parameters(parameters)?;
    context.init_random(args.random_seed);

    // Optionally write the metrics report
    if let Some(output_dir) = args.output_dir {
        context
            .report_options()
            .directory(output_dir)
            .file_prefix(args.file_prefix)
            .overwrite(args.force_overwrite);
        context.add_report::<TickMetrics>("metrics")?;
    }

    context.init_herd()?;
    context.execute();

    let days_run = context.herd().map_or(0, |herd| herd.day());
    if days_run < max_days {
        return Err(Box::new(HerdError::HerdError(format!(
            "run stopped after {days_run} of {max_days} days"
        ))));
    }
    Ok(context)
}
