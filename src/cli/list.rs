//! Admin listing command

use feedback_desk_core::{error::Result, AppConfig, FeedbackRecord};
use tracing::debug;

use super::helpers::{admin_view, FilterArgs, LoginArgs};

const REVIEW_WIDTH: usize = 48;

/// Handle feedback listing command
pub async fn handle(
    config: &AppConfig,
    login: LoginArgs,
    filters: FilterArgs,
    attention_only: bool,
    format: String,
) -> Result<()> {
    let (session, view) = admin_view(config, &login)?;
    let criteria = filters.criteria()?;
    let report = view.report(&session, &criteria).await?;
    debug!(
        "Listing {} of {} stored records",
        report.records.len(),
        report.total_stored
    );

    let records = if attention_only {
        &report.attention
    } else {
        &report.records
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No feedback matches the selected filters.");
        return Ok(());
    }

    println!("{:<20} {:>6}  {}", "Submitted", "Rating", "Review");
    for record in records {
        print_row(record);
    }
    println!();
    println!("{} record(s)", records.len());

    Ok(())
}

fn print_row(record: &FeedbackRecord) {
    println!(
        "{:<20} {:>6}  {}",
        record.timestamp.display(),
        record.rating.value(),
        truncate(&record.review, REVIEW_WIDTH)
    );
    println!("{:>28}{}", "Summary: ", record.ai_summary);
    println!("{:>28}{}", "Action: ", record.ai_recommended_action);
}

/// Shorten to `max` characters, on a char boundary
fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut out: String = flat.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
