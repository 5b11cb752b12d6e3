use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::DateTime;
use comfy_table::{presets::UTF8_FULL, Table};
use indicatif::{ProgressBar, ProgressStyle};
use snapsort_core::{remove_duplicates, DedupProgress, DuplicateFinder, RetentionPolicy};

pub fn run(
    directory: PathBuf,
    remove: bool,
    keep_oldest: bool,
    keep_longest_name: bool,
    force: bool,
) -> Result<()> {
    let finder = DuplicateFinder::new(directory)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let groups = finder.find_duplicates(Some(&|progress| match progress {
        DedupProgress::Start { total } => {
            pb.set_length(total as u64);
            pb.set_message("Hashing");
        }
        DedupProgress::Hashed { .. } => {
            pb.inc(1);
        }
        DedupProgress::Complete { .. } => {
            pb.finish_and_clear();
        }
    }))?;

    if groups.is_empty() {
        println!("No duplicate files found.");
        return Ok(());
    }

    for group in &groups {
        println!("\nDuplicate files (hash: {}):", group.digest);
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(["Path", "Size", "Modified"]);
        for member in &group.members {
            let modified = DateTime::from_timestamp(member.mtime, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "?".to_string());
            table.add_row([
                member.path.display().to_string(),
                member.size.to_string(),
                modified,
            ]);
        }
        println!("{table}");
    }

    let total_duplicates: usize = groups.iter().map(|g| g.members.len() - 1).sum();
    println!(
        "\nFound {} duplicate groups ({} removable files).",
        groups.len(),
        total_duplicates
    );

    if !remove {
        println!("Re-run with --remove to delete duplicates.");
        return Ok(());
    }

    if !force && !confirm(total_duplicates)? {
        println!("Aborted.");
        return Ok(());
    }

    let policy = if keep_longest_name {
        RetentionPolicy::LongestName
    } else if keep_oldest {
        RetentionPolicy::KeepOldest
    } else {
        RetentionPolicy::KeepNewest
    };

    let summary = remove_duplicates(&groups, policy);
    println!(
        "Kept {} files, removed {}, {} failed.",
        summary.kept, summary.removed, summary.failed
    );
    Ok(())
}

fn confirm(count: usize) -> Result<bool> {
    print!("\nAre you sure you want to remove {count} duplicate files? (yes/no): ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
