use crate::commands::{
    run_question_import, run_quota_rebalance, run_quota_validate, QuestionImportArgs,
    QuotaRebalanceArgs, QuotaValidateArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use survey_quota::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Survey Quota Service",
    about = "Run the survey quota service or exercise its workflows from the command line",
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
    /// Rebalance or validate screening quotas stored as JSON files
    Quota {
        #[command(subcommand)]
        command: QuotaCommand,
    },
    /// Work with survey question drafts
    Questions {
        #[command(subcommand)]
        command: QuestionsCommand,
    },
    /// Walk through quota editing and question sync against in-memory adapters
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum QuotaCommand {
    /// Rebalance option targets so they add up to a total
    Rebalance(QuotaRebalanceArgs),
    /// Validate a quota configuration against a screening catalog
    Validate(QuotaValidateArgs),
}

#[derive(Subcommand, Debug)]
enum QuestionsCommand {
    /// Convert a CSV export into question drafts
    Import(QuestionImportArgs),
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
        Command::Quota {
            command: QuotaCommand::Rebalance(args),
        } => run_quota_rebalance(args),
        Command::Quota {
            command: QuotaCommand::Validate(args),
        } => run_quota_validate(args),
        Command::Questions {
            command: QuestionsCommand::Import(args),
        } => run_question_import(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
