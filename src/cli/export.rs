//! Feedback export command

use feedback_desk_core::{error::Result, AppConfig};
use std::{io::Write, path::PathBuf};
use tracing::debug;

use super::helpers::{admin_view, FilterArgs, LoginArgs};

/// Handle feedback export command
pub async fn handle(
    config: &AppConfig,
    login: LoginArgs,
    filters: FilterArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let (session, view) = admin_view(config, &login)?;
    let blob = view.export(&session, &filters.criteria()?).await?;

    match output {
        Some(path) => {
            debug!("Exporting feedback to {}...", path.display());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &blob).await?;
            eprintln!("Exported {} bytes to {}", blob.len(), path.display());
        }
        None => {
            debug!("Exporting feedback to stdout...");
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&blob)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
