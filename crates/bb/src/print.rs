use bb_core::report::{BackportStatus, BranchReport};
use bb_core::sync::SyncSummary;
use bb_core::types::{PullRequest, Repo};
use owo_colors::{OwoColorize, Stream};

pub fn summary(repo: &Repo, summary: &SyncSummary) {
    println!(
        "{}: fetched {}, wrote {}, skipped {} ({} pages)",
        repo.if_supports_color(Stream::Stdout, |text| text.bold()),
        summary.fetched,
        summary.written,
        summary.skipped,
        summary.pages
    );
}

pub fn report(repo: &Repo, report: &BranchReport) {
    println!(
        "{} {} (merge base {})",
        repo.if_supports_color(Stream::Stdout, |text| text.bold()),
        report.branch,
        report.merge_base.short()
    );
    for commit in &report.commits {
        println!(
            "  {}  {}  {}{}",
            commit.sha.short(),
            status(commit.status),
            commit.title,
            pr_suffix(repo, commit.backport_pr.as_ref().or(commit.primary_pr.as_ref()))
        );
    }

    if !report.branch_only.is_empty() {
        println!("\nonly on {}:", report.branch);
        for commit in &report.branch_only {
            println!(
                "  {}  {}{}",
                commit.sha.short(),
                commit.title,
                pr_suffix(repo, commit.pull_request.as_ref())
            );
        }
    }

    println!(
        "\n{} backported, {} in progress, {} not backported, {} excluded",
        report.count(BackportStatus::Backported),
        report.count(BackportStatus::InProgress),
        report.count(BackportStatus::NotBackported),
        report.count(BackportStatus::Excluded)
    );
}

fn status(status: BackportStatus) -> String {
    let label = format!("{:<14}", status_label(status));
    match status {
        BackportStatus::Backported => label
            .if_supports_color(Stream::Stdout, |text| text.green())
            .to_string(),
        BackportStatus::InProgress => label
            .if_supports_color(Stream::Stdout, |text| text.yellow())
            .to_string(),
        BackportStatus::NotBackported => label
            .if_supports_color(Stream::Stdout, |text| text.red())
            .to_string(),
        BackportStatus::Excluded => label
            .if_supports_color(Stream::Stdout, |text| text.dimmed())
            .to_string(),
    }
}

fn status_label(status: BackportStatus) -> &'static str {
    match status {
        BackportStatus::Backported => "backported",
        BackportStatus::InProgress => "in progress",
        BackportStatus::NotBackported => "not backported",
        BackportStatus::Excluded => "excluded",
    }
}

fn pr_suffix(repo: &Repo, pr: Option<&PullRequest>) -> String {
    pr.map(|pr| format!("  {}", repo.pull_request_url(pr.number)))
        .unwrap_or_default()
}
