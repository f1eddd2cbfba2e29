use clap::Args;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use survey_quota::error::AppError;
use survey_quota::workflows::builder::QuestionCsvImporter;
use survey_quota::workflows::quota::{
    rebalance, validate, QuotaAudience, QuotaOptionTarget, QuotaServiceError, ScreeningQuestion,
};

#[derive(Args, Debug)]
pub(crate) struct QuotaRebalanceArgs {
    /// JSON file holding the option targets of one screening question
    #[arg(long)]
    pub(crate) targets: PathBuf,
    /// Total the option targets must add up to
    #[arg(long)]
    pub(crate) total: u32,
    /// Option the operator just edited; it is never adjusted
    #[arg(long)]
    pub(crate) changed: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct QuotaValidateArgs {
    /// JSON file holding the quota configuration
    #[arg(long)]
    pub(crate) quota: PathBuf,
    /// JSON file holding the screening catalog the selection refers to
    #[arg(long)]
    pub(crate) catalog: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct QuestionImportArgs {
    /// CSV export with `type,text,...` columns
    pub(crate) csv: PathBuf,
    /// Order index assigned to the first imported question
    #[arg(long, default_value_t = 0)]
    pub(crate) start_order: u32,
    /// Print the drafts as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_quota_rebalance(args: QuotaRebalanceArgs) -> Result<(), AppError> {
    let targets: Vec<QuotaOptionTarget> = read_json(&args.targets)?;
    let balanced = rebalance(&targets, args.total, args.changed.as_deref());

    println!("{}", serde_json::to_string_pretty(balanced.as_ref())?);
    Ok(())
}

pub(crate) fn run_quota_validate(args: QuotaValidateArgs) -> Result<(), AppError> {
    let quota: QuotaAudience = read_json(&args.quota)?;
    let catalog: Vec<ScreeningQuestion> = read_json(&args.catalog)?;

    match validate(&quota, &catalog) {
        Some(error) => Err(QuotaServiceError::Validation(error).into()),
        None => {
            println!(
                "Quota is valid ({} screening question(s), total {})",
                quota.screening_questions.len(),
                quota
                    .total_target
                    .map(|total| total.to_string())
                    .unwrap_or_else(|| "unset".to_string())
            );
            Ok(())
        }
    }
}

pub(crate) fn run_question_import(args: QuestionImportArgs) -> Result<(), AppError> {
    let questions = QuestionCsvImporter::from_path(&args.csv, args.start_order)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
        return Ok(());
    }

    println!(
        "Imported {} question(s) from {}",
        questions.len(),
        args.csv.display()
    );
    for question in &questions {
        let detail = if question.question_type.is_matrix() {
            format!("{} rows x {} columns", question.rows.len(), question.columns.len())
        } else if question.question_type.takes_options() {
            format!("{} options", question.options.len())
        } else {
            String::from("free response")
        };
        println!(
            "  {:>3}. [{}] {}{} ({})",
            question.order_index,
            question.question_type.label(),
            question.text,
            if question.required { " *" } else { "" },
            detail
        );
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
