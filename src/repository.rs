use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::error::{InsightError, InsightResult};
use crate::models::{Category, Role, TeamMember, Task, Workload};

/// Read-only source of tasks, loaded once and queried by name.
pub trait TaskRepository {
    fn task_names(&self) -> Vec<&str>;
    fn fetch_task(&self, name: &str) -> InsightResult<&Task>;
}

/// In-memory catalog that keeps tasks in load order.
#[derive(Debug, Default, Clone)]
pub struct TaskCatalog {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
}

impl TaskCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, task: Task) -> InsightResult<()> {
        if self.index.contains_key(&task.name) {
            return Err(InsightError::DuplicateTask(task.name));
        }
        self.index.insert(task.name.clone(), self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskRepository for TaskCatalog {
    fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.name.as_str()).collect()
    }

    fn fetch_task(&self, name: &str) -> InsightResult<&Task> {
        self.index
            .get(name)
            .map(|&position| &self.tasks[position])
            .ok_or_else(|| InsightError::TaskNotFound(name.to_string()))
    }
}

fn member(
    role: Role,
    name: &str,
    late_days: u32,
    updates: u32,
    workload: Workload,
    done: u32,
    quality: f64,
) -> TeamMember {
    TeamMember {
        role,
        name: name.to_string(),
        late_days,
        updates,
        workload,
        done,
        quality,
    }
}

/// The four built-in company tasks.
pub fn sample_tasks() -> Vec<Task> {
    use Role::{Admin, Junior, Senior};
    use Workload::{High, Low, Medium};

    vec![
        Task {
            name: "Sell 100 Fertilizer Boxes (Sales)".to_string(),
            category: Category::Sales,
            target: Some(100),
            achieved: Some(88),
            team: vec![
                member(Admin, "Sales Head", 1, 3, Medium, 90, 4.5),
                member(Senior, "Senior A", 0, 4, Medium, 95, 4.7),
                member(Senior, "Senior B", 2, 2, High, 80, 3.8),
                member(Junior, "Junior A", 1, 3, High, 85, 4.0),
                member(Junior, "Junior B", 0, 4, Medium, 92, 4.6),
                member(Junior, "Junior C", 3, 1, High, 65, 3.2),
            ],
        },
        Task {
            name: "Hire Warehouse Staff (HR)".to_string(),
            category: Category::Hr,
            target: None,
            achieved: None,
            team: vec![
                member(Admin, "HR Head", 0, 3, Low, 95, 4.6),
                member(Senior, "Senior HR 1", 2, 2, High, 75, 3.9),
                member(Senior, "Senior HR 2", 1, 3, Medium, 85, 4.2),
                member(Junior, "HR Exec A", 3, 1, High, 60, 3.4),
                member(Junior, "HR Exec B", 1, 2, Medium, 80, 4.0),
            ],
        },
        Task {
            name: "Website Price Negotiation Feature (IT)".to_string(),
            category: Category::It,
            target: None,
            achieved: None,
            team: vec![
                member(Admin, "IT Head", 0, 4, Medium, 100, 4.8),
                member(Senior, "Backend Lead", 3, 2, High, 70, 3.6),
                member(Senior, "Frontend Lead", 0, 3, Medium, 90, 4.5),
                member(Junior, "Developer A", 1, 3, Medium, 85, 4.2),
                member(Junior, "Developer B", 2, 2, High, 75, 3.8),
            ],
        },
        Task {
            name: "Onboard 10 B2B Clients in Akola (Lead Gen)".to_string(),
            category: Category::LeadGen,
            target: Some(10),
            achieved: Some(6),
            team: vec![
                member(Admin, "Lead Gen Head", 0, 3, Medium, 90, 4.5),
                member(Senior, "Regional Manager", 2, 2, High, 70, 3.7),
                member(Senior, "Marketing Lead", 1, 3, Medium, 80, 4.0),
                member(Junior, "Field Exec A", 3, 1, High, 60, 3.3),
                member(Junior, "Field Exec B", 1, 2, Medium, 85, 4.1),
            ],
        },
    ]
}

pub fn sample_catalog() -> InsightResult<TaskCatalog> {
    let mut catalog = TaskCatalog::new();
    for task in sample_tasks() {
        catalog.insert(task)?;
    }
    Ok(catalog)
}

/// One team member row of a task CSV file.
#[derive(Debug, serde::Deserialize)]
pub struct CsvRow {
    pub task: String,
    pub category: String,
    pub target: Option<u32>,
    pub achieved: Option<u32>,
    pub role: String,
    pub name: String,
    pub late_days: u32,
    pub updates: u32,
    pub workload: String,
    pub done: u32,
    pub quality: f64,
}

impl CsvRow {
    pub fn to_member(&self) -> InsightResult<TeamMember> {
        Ok(TeamMember {
            role: self.role.parse()?,
            name: self.name.clone(),
            late_days: self.late_days,
            updates: self.updates,
            workload: self.workload.parse()?,
            done: self.done,
            quality: self.quality,
        })
    }
}

/// Groups member rows into tasks, keeping first-seen task order and row order.
pub fn tasks_from_rows(rows: Vec<CsvRow>) -> InsightResult<Vec<Task>> {
    let mut tasks: Vec<Task> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let category: Category = row.category.parse()?;
        let member = row.to_member()?;

        match positions.get(&row.task) {
            Some(&position) => {
                let task = &mut tasks[position];
                let field = if task.category != category {
                    Some("category")
                } else if task.target != row.target {
                    Some("target")
                } else if task.achieved != row.achieved {
                    Some("achieved")
                } else {
                    None
                };
                if let Some(field) = field {
                    return Err(InsightError::InconsistentTask {
                        task: row.task,
                        field,
                    });
                }
                task.team.push(member);
            }
            None => {
                positions.insert(row.task.clone(), tasks.len());
                tasks.push(Task {
                    name: row.task,
                    category,
                    target: row.target,
                    achieved: row.achieved,
                    team: vec![member],
                });
            }
        }
    }

    Ok(tasks)
}

pub fn read_csv_rows<R: Read>(reader: R) -> anyhow::Result<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid team row {}", line + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn catalog_from_csv<R: Read>(reader: R) -> anyhow::Result<TaskCatalog> {
    let rows = read_csv_rows(reader)?;
    let mut catalog = TaskCatalog::new();
    for task in tasks_from_rows(rows)? {
        catalog.insert(task)?;
    }
    Ok(catalog)
}

pub fn load_csv(path: &Path) -> anyhow::Result<TaskCatalog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let catalog = catalog_from_csv(file)
        .with_context(|| format!("failed to load tasks from {}", path.display()))?;
    tracing::info!(tasks = catalog.len(), path = %path.display(), "loaded task catalog from csv");
    Ok(catalog)
}
