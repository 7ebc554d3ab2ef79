//! Comment text posted on pull requests.

use std::fmt::Write;

use crate::compliance::{ComplianceReport, RuleKind};
use crate::types::{LabelSet, PrNumber};

pub fn empty_body(login: &str) -> String {
    format!(
        "Hello @{login}, thank you for your contribution!\n\n\
         This pull request has an empty description, so it is being closed. \
         Please fill in the pull request template, tick the checklist, and open a new pull request."
    )
}

pub fn checklist_not_ticked(login: &str, marker: &str) -> String {
    format!(
        "Hello @{login}, thank you for your contribution!\n\n\
         The checklist in the description is not ticked (`{marker}` was not found), so this \
         pull request is being closed. Please read the contributing guidelines, tick the \
         checklist, and open a new pull request."
    )
}

/// `numbers` must already be sorted ascending.
pub fn too_many_open_prs(login: &str, numbers: &[PrNumber], cap: usize) -> String {
    let listed = numbers
        .iter()
        .map(PrNumber::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Hello @{login}, thank you for your contribution!\n\n\
         You already have {count} open pull request(s): {listed}. Contributors may have at \
         most {cap} open pull request(s) at a time, so this one is being closed. Please get \
         your open pull requests merged or closed before opening a new one.",
        count = numbers.len(),
    )
}

pub fn extensionless_files(login: &str, files: &[String]) -> String {
    let mut body = format!(
        "Hello @{login}, thank you for your contribution!\n\n\
         Every file must have an extension. These files have none:\n"
    );
    for file in files {
        let _ = writeln!(body, "- `{file}`");
    }
    body.push_str("\nThis pull request is being closed. Please fix the file names and open a new pull request.");
    body
}

/// Summary of the violations behind newly added requirement labels.
pub fn compliance_summary(login: &str, report: &ComplianceReport, added: &LabelSet) -> String {
    let mut body = format!(
        "Hello @{login}, thank you for your contribution!\n\n\
         Automated review found the following issues:\n"
    );

    if let Some(missing) = report
        .missing_test()
        .filter(|violation| added.contains(violation.rule.label()))
    {
        let _ = write!(
            body,
            "\n**Missing tests**\n- {}. Add a `test_*.py` or `*_test.py` file.\n",
            missing.message
        );
    }

    for (title, rule) in [
        ("Missing doctest examples", RuleKind::MissingDoctestExample),
        ("Missing type annotations", RuleKind::MissingAnnotations),
        ("Non-descriptive names", RuleKind::NonDescriptiveName),
    ] {
        let entries: Vec<String> = report
            .findings_for(added)
            .filter(|(_, v)| v.rule == rule)
            .map(|(path, v)| format!("- `{}:{}`: {}", path, v.location.line, v.message))
            .collect();
        if entries.is_empty() {
            continue;
        }
        let _ = write!(body, "\n**{title}**\n{}\n", entries.join("\n"));
    }

    body.push_str("\nPlease address these and push again; the labels update automatically.");
    body
}
