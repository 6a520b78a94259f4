use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::InsightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Admin,
    Senior,
    Junior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Workload {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Sales,
    #[serde(rename = "HR")]
    Hr,
    #[serde(rename = "IT")]
    It,
    LeadGen,
}

impl Category {
    /// Sales and lead generation tasks carry a numeric target.
    pub fn is_quota(self) -> bool {
        matches!(self, Category::Sales | Category::LeadGen)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Sales => "Sales",
            Category::Hr => "HR",
            Category::It => "IT",
            Category::LeadGen => "LeadGen",
        }
    }
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Senior => "Senior",
            Role::Junior => "Junior",
        }
    }
}

impl Workload {
    pub fn label(self) -> &'static str {
        match self {
            Workload::Low => "Low",
            Workload::Medium => "Medium",
            Workload::High => "High",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = InsightError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [
            Category::Sales,
            Category::Hr,
            Category::It,
            Category::LeadGen,
        ]
        .into_iter()
        .find(|category| category.label().eq_ignore_ascii_case(trimmed))
        .ok_or_else(|| InsightError::UnknownCategory(trimmed.to_string()))
    }
}

impl FromStr for Role {
    type Err = InsightError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Role::Admin, Role::Senior, Role::Junior]
            .into_iter()
            .find(|role| role.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InsightError::UnknownRole(trimmed.to_string()))
    }
}

impl FromStr for Workload {
    type Err = InsightError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Workload::Low, Workload::Medium, Workload::High]
            .into_iter()
            .find(|workload| workload.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InsightError::UnknownWorkload(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    pub role: Role,
    pub name: String,
    pub late_days: u32,
    pub updates: u32,
    pub workload: Workload,
    pub done: u32,
    pub quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub name: String,
    pub category: Category,
    pub target: Option<u32>,
    pub achieved: Option<u32>,
    pub team: Vec<TeamMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub best: Vec<TeamMember>,
    pub acceptable: Vec<TeamMember>,
    pub needs_attention: Vec<TeamMember>,
    pub average_late_days: f64,
    pub average_done: f64,
    pub low_update_count: usize,
    pub overloaded_count: usize,
}

/// Everything the renderer needs after an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub task_name: String,
    pub category: Category,
    pub narrative: String,
    pub reasons: Vec<&'static str>,
    pub suggestions: Vec<&'static str>,
    pub classification: ClassificationResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_known_labels() {
        assert_eq!("Sales".parse::<Category>(), Ok(Category::Sales));
        assert_eq!("hr".parse::<Category>(), Ok(Category::Hr));
        assert_eq!(" IT ".parse::<Category>(), Ok(Category::It));
        assert_eq!("LeadGen".parse::<Category>(), Ok(Category::LeadGen));
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_eq!(
            "Marketing".parse::<Category>(),
            Err(InsightError::UnknownCategory("Marketing".to_string()))
        );
    }

    #[test]
    fn role_and_workload_round_labels() {
        assert_eq!("Senior".parse::<Role>(), Ok(Role::Senior));
        assert_eq!("high".parse::<Workload>(), Ok(Workload::High));
        assert!(matches!(
            "Extreme".parse::<Workload>(),
            Err(InsightError::UnknownWorkload(_))
        ));
        assert!(matches!("Intern".parse::<Role>(), Err(InsightError::UnknownRole(_))));
    }

    #[test]
    fn only_sales_and_lead_gen_are_quota_tasks() {
        assert!(Category::Sales.is_quota());
        assert!(Category::LeadGen.is_quota());
        assert!(!Category::Hr.is_quota());
        assert!(!Category::It.is_quota());
    }
}
