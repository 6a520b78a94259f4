use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum InsightError {
    #[error("task '{task}' has no team members to analyze")]
    EmptyTeam { task: String },

    #[error("unknown task category '{0}' (expected Sales, HR, IT or LeadGen)")]
    UnknownCategory(String),

    #[error("unknown team role '{0}' (expected Admin, Senior or Junior)")]
    UnknownRole(String),

    #[error("unknown workload '{0}' (expected Low, Medium or High)")]
    UnknownWorkload(String),

    #[error("task '{task}' is a quota task but has no {field} value")]
    MissingQuota { task: String, field: &'static str },

    #[error("task '{0}' not found")]
    TaskNotFound(String),

    #[error("task '{0}' is defined more than once")]
    DuplicateTask(String),

    #[error("rows for task '{task}' disagree on {field}")]
    InconsistentTask { task: String, field: &'static str },
}

pub type InsightResult<T> = Result<T, InsightError>;
