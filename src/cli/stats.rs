//! Admin statistics command

use feedback_desk_core::{error::Result, AppConfig};

use super::helpers::{admin_view, FilterArgs, LoginArgs};

/// Handle feedback statistics command
pub async fn handle(
    config: &AppConfig,
    login: LoginArgs,
    filters: FilterArgs,
    format: String,
) -> Result<()> {
    let (session, view) = admin_view(config, &login)?;
    let report = view.report(&session, &filters.criteria()?).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
        return Ok(());
    }

    println!("Feedback Statistics");
    println!("===================");
    if let Some(dates) = report.applied_dates {
        println!("Window:          {} .. {}", dates.start, dates.end);
    }
    let ratings: Vec<String> = report.applied_ratings.iter().map(|r| r.to_string()).collect();
    println!("Ratings:         {}", ratings.join(", "));
    println!("Stored:          {}", report.total_stored);
    println!("Matching:        {}", report.summary.count);
    println!("Average rating:  {:.2}", report.summary.average_rating);
    println!(
        "Low ratings:     {} (rating <= {})",
        report.summary.low_rating_count, config.low_rating_threshold
    );

    Ok(())
}
