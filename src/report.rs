use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{Analysis, Task, TeamMember};

const NOTICE: &str = "This review is for process improvement, not blame.";
const DISCLAIMER: &str = "Insights are for management improvement, not individual blame.";

pub fn render_team_table(task: &Task) -> String {
    let mut output = String::new();
    let width = task
        .team
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let _ = writeln!(output, "Team working on {}", task.name);
    let _ = writeln!(
        output,
        "{:<8} {:<width$} {:>9} {:>7} {:<8}",
        "Role", "Name", "Late Days", "Updates", "Workload"
    );
    for member in task.team.iter() {
        let _ = writeln!(
            output,
            "{:<8} {:<width$} {:>9} {:>7} {:<8}",
            member.role.label(),
            member.name,
            member.late_days,
            member.updates,
            member.workload.label()
        );
    }

    output
}

fn write_tier(output: &mut String, heading: &str, members: &[TeamMember], remark: &str) {
    if members.is_empty() {
        return;
    }
    let _ = writeln!(output, "**{heading}**");
    for member in members {
        let _ = writeln!(output, "- {}: {}", member.name, remark);
    }
    let _ = writeln!(output);
}

pub fn build_report(analysis: &Analysis, generated_at: DateTime<Utc>, disclaimer: bool) -> String {
    let result = &analysis.classification;
    let mut output = String::new();

    let _ = writeln!(output, "# Task Review: {}", analysis.task_name);
    let _ = writeln!(
        output,
        "Category {} (generated {})",
        analysis.category,
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "> {NOTICE}");
    let _ = writeln!(output);

    let _ = writeln!(output, "## Executive Summary");
    let _ = writeln!(output, "{}", analysis.narrative);
    let _ = writeln!(output);

    let _ = writeln!(output, "## Team Contribution Overview");
    write_tier(
        &mut output,
        "Worked Very Well",
        &result.best,
        "Timely delivery, strong output, good communication",
    );
    write_tier(
        &mut output,
        "Worked Acceptably",
        &result.acceptable,
        "Minor delays but overall reliable contribution",
    );
    write_tier(
        &mut output,
        "Needs Attention (Process Support Required)",
        &result.needs_attention,
        "Delays or overload affected task progress",
    );

    let _ = writeln!(output, "## Observations");
    let _ = writeln!(output, "- Average delay: {:.1} days", result.average_late_days);
    let _ = writeln!(
        output,
        "- Actual work completed (team average): {:.0}%",
        result.average_done
    );
    let _ = writeln!(output, "- People giving very few updates: {}", result.low_update_count);
    let _ = writeln!(output, "- People overloaded with work: {}", result.overloaded_count);
    let _ = writeln!(output);

    let _ = writeln!(output, "## Main Reasons for Delay");
    for reason in analysis.reasons.iter() {
        let _ = writeln!(output, "- {reason}");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Suggestions for Next Time");
    for suggestion in analysis.suggestions.iter() {
        let _ = writeln!(output, "- {suggestion}");
    }

    if disclaimer {
        let _ = writeln!(output);
        let _ = writeln!(output, "_{DISCLAIMER}_");
    }

    output
}

pub fn render_json(analysis: &Analysis) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
