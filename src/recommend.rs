use crate::classify;
use crate::error::{InsightError, InsightResult};
use crate::models::{Analysis, Category, ClassificationResult, Task};

pub const LATE_WORK: &str = "Work was completed later than planned.";
pub const OVERLOAD: &str = "Too much work assigned to few people.";
pub const LATE_REPORTING: &str = "Problems were reported late.";
pub const SLOW_PROGRESS: &str = "Progress was slower than expected.";

type ReasonRule = (fn(&ClassificationResult) -> bool, &'static str);

fn mostly_late(result: &ClassificationResult) -> bool {
    result.average_late_days > 1.5
}

fn overloaded(result: &ClassificationResult) -> bool {
    result.overloaded_count >= 2
}

fn quiet(result: &ClassificationResult) -> bool {
    result.low_update_count >= 2
}

fn behind(result: &ClassificationResult) -> bool {
    result.average_done < 80.0
}

/// Checked in display order.
const REASON_RULES: [ReasonRule; 4] = [
    (mostly_late, LATE_WORK),
    (overloaded, OVERLOAD),
    (quiet, LATE_REPORTING),
    (behind, SLOW_PROGRESS),
];

pub fn delay_reasons(result: &ClassificationResult) -> Vec<&'static str> {
    REASON_RULES
        .iter()
        .filter(|(applies, _)| applies(result))
        .map(|&(_, reason)| reason)
        .collect()
}

pub fn suggestions(category: Category) -> &'static [&'static str; 3] {
    match category {
        Category::Sales => &[
            "Balance field workload evenly",
            "Weekly mandatory progress update",
            "Early alert if follow-up is delayed",
        ],
        Category::Hr => &[
            "Parallel interview scheduling",
            "Reduce overload on junior HR staff",
            "Weekly hiring target review",
        ],
        Category::It => &[
            "Break features into smaller deliveries",
            "Start testing earlier",
            "Mid-week progress review",
        ],
        Category::LeadGen => &[
            "Improve field visit planning",
            "Early escalation for delays",
            "Balance region-wise workload",
        ],
    }
}

pub fn executive_summary(task: &Task) -> InsightResult<String> {
    match task.category {
        Category::Sales | Category::LeadGen => {
            let target = task.target.ok_or_else(|| InsightError::MissingQuota {
                task: task.name.clone(),
                field: "target",
            })?;
            let achieved = task.achieved.ok_or_else(|| InsightError::MissingQuota {
                task: task.name.clone(),
                field: "achieved",
            })?;
            Ok(format!(
                "Target performance is not fully achieved. Result is {achieved} out of {target}. \
                 Delays and uneven workload reduced conversion efficiency."
            ))
        }
        Category::Hr => Ok("Hiring progress is slower than expected due to overload \
                            and delayed candidate processing."
            .to_string()),
        Category::It => Ok("Feature delivery is at risk due to backend delays \
                            affecting testing and rollout."
            .to_string()),
    }
}

/// Runs the full analysis for one task. Only called on an explicit request.
pub fn analyze(task: &Task) -> InsightResult<Analysis> {
    tracing::info!(task = %task.name, category = %task.category, "running task analysis");

    let classification = classify::classify_team(&task.name, &task.team)?;
    let narrative = executive_summary(task)?;
    let reasons = delay_reasons(&classification);
    let suggestions = suggestions(task.category).to_vec();

    Ok(Analysis {
        task_name: task.name.clone(),
        category: task.category,
        narrative,
        reasons,
        suggestions,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::sample_tasks;

    fn aggregates(late: f64, done: f64, low_updates: usize, overloaded: usize) -> ClassificationResult {
        ClassificationResult {
            best: Vec::new(),
            acceptable: Vec::new(),
            needs_attention: Vec::new(),
            average_late_days: late,
            average_done: done,
            low_update_count: low_updates,
            overloaded_count: overloaded,
        }
    }

    #[test]
    fn sales_sample_has_single_overload_reason() {
        let task = &sample_tasks()[0];
        let analysis = analyze(task).unwrap();
        assert_eq!(analysis.reasons, vec![OVERLOAD]);
    }

    #[test]
    fn reasons_keep_fixed_order() {
        let reasons = delay_reasons(&aggregates(2.0, 50.0, 3, 4));
        assert_eq!(reasons, vec![LATE_WORK, OVERLOAD, LATE_REPORTING, SLOW_PROGRESS]);
    }

    #[test]
    fn reason_text_is_fixed() {
        let reasons = delay_reasons(&aggregates(2.0, 50.0, 3, 4));
        assert_eq!(
            reasons,
            vec![
                "Work was completed later than planned.",
                "Too much work assigned to few people.",
                "Problems were reported late.",
                "Progress was slower than expected.",
            ]
        );
    }

    #[test]
    fn reasons_may_be_empty() {
        assert!(delay_reasons(&aggregates(1.5, 80.0, 1, 1)).is_empty());
    }

    #[test]
    fn reason_thresholds() {
        assert_eq!(delay_reasons(&aggregates(1.51, 80.0, 0, 0)), vec![LATE_WORK]);
        assert_eq!(delay_reasons(&aggregates(0.0, 80.0, 2, 0)), vec![LATE_REPORTING]);
        assert_eq!(delay_reasons(&aggregates(0.0, 79.9, 0, 0)), vec![SLOW_PROGRESS]);
    }

    #[test]
    fn suggestions_are_stable_per_category() {
        for category in [Category::Sales, Category::Hr, Category::It, Category::LeadGen] {
            assert_eq!(suggestions(category), suggestions(category));
            assert_eq!(suggestions(category).len(), 3);
        }
        assert_eq!(suggestions(Category::It)[1], "Start testing earlier");
    }

    #[test]
    fn unknown_category_label_never_reaches_lookup() {
        let lookup = "Finance".parse::<Category>().map(suggestions);
        assert_eq!(lookup, Err(InsightError::UnknownCategory("Finance".to_string())));
    }

    #[test]
    fn quota_narrative_reports_progress() {
        let task = &sample_tasks()[3];
        let summary = executive_summary(task).unwrap();
        assert!(summary.contains("Result is 6 out of 10."));
    }

    #[test]
    fn hr_narrative_ignores_missing_quota() {
        let task = &sample_tasks()[1];
        assert_eq!(task.target, None);
        let summary = executive_summary(task).unwrap();
        assert!(summary.starts_with("Hiring progress is slower than expected"));
    }

    #[test]
    fn quota_task_without_achieved_fails() {
        let mut task = sample_tasks().remove(0);
        task.achieved = None;
        assert_eq!(
            executive_summary(&task),
            Err(InsightError::MissingQuota {
                task: task.name.clone(),
                field: "achieved",
            })
        );
    }

    #[test]
    fn lead_gen_task_without_target_fails() {
        let mut task = sample_tasks().remove(3);
        task.target = None;
        assert_eq!(
            executive_summary(&task),
            Err(InsightError::MissingQuota {
                task: task.name.clone(),
                field: "target",
            })
        );
        assert!(matches!(
            analyze(&task),
            Err(InsightError::MissingQuota { field: "target", .. })
        ));
    }

    #[test]
    fn analysis_of_empty_team_fails() {
        let mut task = sample_tasks().remove(2);
        task.team.clear();
        assert!(matches!(analyze(&task), Err(InsightError::EmptyTeam { .. })));
    }

    #[test]
    fn it_analysis_collects_everything() {
        let task = &sample_tasks()[2];
        let analysis = analyze(task).unwrap();
        assert_eq!(analysis.category, Category::It);
        assert!(analysis.narrative.starts_with("Feature delivery is at risk"));
        assert_eq!(analysis.suggestions, suggestions(Category::It).to_vec());
        // 2 High workloads; average done 84
        assert_eq!(analysis.reasons, vec![OVERLOAD]);
    }
}
