use crate::infra::{
    InMemoryCatalog, InMemoryQuestionStore, InMemoryQuotaRepository, InMemoryVendorDirectory,
    DEMO_VENDOR_ID,
};
use clap::Args;
use std::sync::Arc;
use survey_quota::error::AppError;
use survey_quota::workflows::builder::{
    Question, QuestionSyncRequest, QuestionSyncService, QuestionType, SyncPolicy,
};
use survey_quota::workflows::quota::{
    on_filter_change, validate, AgeQuotaDraft, DemographicQuotas, QuestionSource, QuotaAudience,
    QuotaFilters, QuotaSaveRequest, QuotaService, QuotaSettings, QuotaTargetDraft,
    ScreeningQuestion,
};
use survey_quota::workflows::SurveyId;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Total respondent target used for the quota walkthrough
    #[arg(long, default_value_t = 100)]
    pub(crate) total: u32,
    /// Skip the question sync portion of the demo
    #[arg(long)]
    pub(crate) skip_sync: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { total, skip_sync } = args;
    let survey_id = SurveyId::from("demo-survey");

    println!("Survey quota demo");
    run_quota_walkthrough(&survey_id, total).await?;

    if skip_sync {
        println!("\nQuestion sync skipped (--skip-sync)");
    } else {
        run_sync_walkthrough(&survey_id).await?;
    }

    Ok(())
}

async fn run_quota_walkthrough(survey_id: &SurveyId, total: u32) -> Result<(), AppError> {
    let service = QuotaService::new(
        Arc::new(InMemoryCatalog::default()),
        Arc::new(InMemoryVendorDirectory),
        Arc::new(InMemoryQuotaRepository::default()),
    );

    let mut quota = QuotaAudience::default();
    let catalog = service.screening_catalog(&quota.filters).await?;
    println!(
        "\nSystem catalog ({} / {}): {} question(s)",
        quota.filters.country_code,
        quota.filters.language,
        catalog.len()
    );

    let Some(income) = catalog.iter().find(|question| question.has_options()) else {
        println!("- no option-bearing question available; nothing to balance");
        return Ok(());
    };
    let option_ids: Vec<String> = income
        .options
        .iter()
        .flatten()
        .map(|option| option.id.clone())
        .collect();

    quota.set_enabled(true);
    quota.set_total_target(Some(total));
    quota.toggle_screening_question(income);
    print_targets("Selected", &quota, &income.id);

    if let Some(first) = option_ids.first() {
        let edited = total * 2 / 5;
        apply_edit(&mut quota, &income.id, first, edited);
        report_validation(&quota, &catalog);
    }

    if let Some(second) = option_ids.get(1) {
        apply_edit(&mut quota, &income.id, second, total + total / 2);
        report_validation(&quota, &catalog);

        // Put the overshoot back so the save goes through.
        apply_edit(&mut quota, &income.id, second, 0);
        report_validation(&quota, &catalog);
    }

    let request = QuotaSaveRequest {
        quota: quota.clone(),
        settings: QuotaSettings {
            completed_url: Some("https://panel.example/complete".to_string()),
            terminated_url: Some(String::new()),
            quota_full_url: None,
        },
        demographics: DemographicQuotas {
            age: vec![
                AgeQuotaDraft {
                    row_id: Some("age-1".to_string()),
                    min_age: 18,
                    max_age: 34,
                    target: QuotaTargetDraft::percentage(40.0),
                },
                AgeQuotaDraft {
                    row_id: Some("age-2".to_string()),
                    min_age: 35,
                    max_age: 54,
                    target: QuotaTargetDraft::count(0),
                },
            ],
            ..DemographicQuotas::default()
        },
    };
    let payload = service.save(survey_id, request).await?;
    println!(
        "\nSaved quota for {}: active={} | {} screening question(s) | {} of 2 age rows kept",
        survey_id,
        payload.is_active,
        payload.screening_questions.len(),
        payload.age_quotas.len()
    );

    let vendor_filters = QuotaFilters {
        source: QuestionSource::Vendor,
        vendor_id: Some(DEMO_VENDOR_ID.to_string()),
        ..quota.filters.clone()
    };
    let previous = quota.filters.clone();
    let quota = on_filter_change(&previous, vendor_filters, quota);
    let vendor_catalog = service.screening_catalog(&quota.filters).await?;
    println!(
        "\nSwitched to {} source ({}): selection cleared ({} left), total kept at {:?}, {} vendor question(s) available",
        quota.filters.source.label(),
        DEMO_VENDOR_ID,
        quota.screening_questions.len(),
        quota.total_target,
        vendor_catalog.len()
    );

    Ok(())
}

async fn run_sync_walkthrough(survey_id: &SurveyId) -> Result<(), AppError> {
    let store = Arc::new(InMemoryQuestionStore::default());
    let service = QuestionSyncService::new(store.clone(), SyncPolicy::default());

    println!("\nQuestion sync");
    let drafts = vec![
        Question {
            order_index: 0,
            required: true,
            ..Question::new(QuestionType::Text, "What is your name?")
        },
        Question {
            order_index: 1,
            options: vec!["Email".to_string(), "Phone".to_string()],
            ..Question::new(QuestionType::SingleChoice, "Preferred contact")
        },
        Question {
            order_index: 2,
            ..Question::new(QuestionType::Rating, "How did we do?")
        },
    ];
    let first = service
        .sync(
            survey_id,
            &QuestionSyncRequest {
                original: Vec::new(),
                current: drafts,
            },
        )
        .await?;
    println!(
        "- initial save: {} created, {} updated, {} deleted",
        first.created, first.updated, first.deleted
    );

    let original = first.questions;
    let mut current: Vec<Question> = original
        .iter()
        .filter(|question| question.question_type != QuestionType::Rating)
        .cloned()
        .collect();
    if let Some(contact) = current.get_mut(1) {
        contact.options.push("Text message".to_string());
    }
    current.push(Question {
        order_index: 2,
        ..Question::new(QuestionType::Email, "Where can we reach you?")
    });

    let request = QuestionSyncRequest { original, current };
    let plan = service.plan(&request);
    println!(
        "- edit plan: {} create | {} update | {} delete",
        plan.to_create.len(),
        plan.to_update.len(),
        plan.to_delete.len()
    );

    let second = service.sync(survey_id, &request).await?;
    println!(
        "- second save: {} created, {} updated, {} deleted",
        second.created, second.updated, second.deleted
    );
    for question in store.questions(survey_id) {
        println!(
            "  {} [{}] {}",
            question.id.map(|id| id.to_string()).unwrap_or_default(),
            question.question_type.label(),
            question.text
        );
    }

    Ok(())
}

fn apply_edit(quota: &mut QuotaAudience, question_id: &str, option_id: &str, target: u32) {
    match quota.set_option_target(question_id, option_id, target) {
        Ok(()) => print_targets(&format!("Set {option_id} = {target}"), quota, question_id),
        Err(err) => println!("- edit rejected: {err}"),
    }
}

fn print_targets(heading: &str, quota: &QuotaAudience, question_id: &str) {
    let Some(entry) = quota.selection(question_id) else {
        return;
    };
    let targets: Vec<String> = entry
        .options
        .iter()
        .flatten()
        .map(|option| format!("{}={}", option.option_id, option.target))
        .collect();
    println!(
        "- {heading}: [{}] (sum {} of {})",
        targets.join(", "),
        entry.option_sum(),
        quota
            .total_target
            .map(|total| total.to_string())
            .unwrap_or_else(|| "unset".to_string())
    );
}

fn report_validation(quota: &QuotaAudience, catalog: &[ScreeningQuestion]) {
    match validate(quota, catalog) {
        Some(error) => println!("  ! {error}"),
        None => println!("  quota is valid"),
    }
}
