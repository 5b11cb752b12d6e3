use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use snapsort_core::{ExifTool, OrganizeProgress, Organizer, OrganizerConfig};

pub fn run(input: PathBuf, output: PathBuf) -> Result<()> {
    let config = OrganizerConfig::new(input, output);
    let organizer = Organizer::new(config, ExifTool::default())?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let summary = organizer.run(Some(&|progress| match progress {
        OrganizeProgress::Start { total } => {
            pb.set_length(total as u64);
            pb.set_message("Organizing");
        }
        OrganizeProgress::Moved { to, .. } => {
            pb.inc(1);
            pb.set_message(format!("{}", to.display()));
        }
        OrganizeProgress::DuplicateRemoved { .. } | OrganizeProgress::Quarantined { .. } => {
            pb.inc(1);
        }
    }))?;
    pb.finish_with_message("done");

    println!(
        "Processed {} files: {} moved, {} duplicates removed, {} quarantined, {} skipped.",
        summary.total, summary.moved, summary.duplicates, summary.quarantined, summary.skipped,
    );
    Ok(())
}
