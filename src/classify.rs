use crate::error::{InsightError, InsightResult};
use crate::models::{ClassificationResult, TeamMember, Workload};

pub fn is_best(member: &TeamMember) -> bool {
    member.late_days <= 1 && member.done >= 90 && member.quality >= 4.5
}

pub fn is_acceptable(member: &TeamMember) -> bool {
    member.late_days <= 2 && member.done >= 80 && member.quality >= 4.0
}

pub fn needs_attention(member: &TeamMember) -> bool {
    member.late_days >= 3 || member.done < 70
}

pub fn is_low_update(member: &TeamMember) -> bool {
    member.updates <= 1
}

pub fn is_overloaded(member: &TeamMember) -> bool {
    member.workload == Workload::High
}

fn select(team: &[TeamMember], predicate: fn(&TeamMember) -> bool) -> Vec<TeamMember> {
    team.iter().filter(|m| predicate(m)).cloned().collect()
}

fn mean(team: &[TeamMember], field: fn(&TeamMember) -> u32) -> f64 {
    let total: f64 = team.iter().map(|m| f64::from(field(m))).sum();
    total / team.len() as f64
}

/// Sorts the team into tiers and computes team-wide aggregates.
///
/// Tiers are evaluated independently, so a member can land in several tiers
/// or in none.
pub fn classify_team(task_name: &str, team: &[TeamMember]) -> InsightResult<ClassificationResult> {
    if team.is_empty() {
        return Err(InsightError::EmptyTeam {
            task: task_name.to_string(),
        });
    }

    let result = ClassificationResult {
        best: select(team, is_best),
        acceptable: select(team, is_acceptable),
        needs_attention: select(team, needs_attention),
        average_late_days: mean(team, |m| m.late_days),
        average_done: mean(team, |m| m.done),
        low_update_count: team.iter().filter(|m| is_low_update(m)).count(),
        overloaded_count: team.iter().filter(|m| is_overloaded(m)).count(),
    };

    tracing::debug!(
        task = task_name,
        best = result.best.len(),
        acceptable = result.acceptable.len(),
        needs_attention = result.needs_attention.len(),
        "classified team"
    );

    Ok(result)
}
