use std::collections::HashMap;

use anyhow::Context;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Task, TeamMember};
use crate::repository::{self, TaskCatalog};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn to_db(value: u32, column: &str) -> anyhow::Result<i32> {
    i32::try_from(value).with_context(|| format!("{column} value {value} is too large"))
}

fn from_db(value: i32, column: &str) -> anyhow::Result<u32> {
    u32::try_from(value).with_context(|| format!("{column} value {value} is negative"))
}

/// Member values as stored, with every integer already range-checked.
#[derive(Debug)]
struct MemberRow<'a> {
    position: i32,
    role: &'static str,
    name: &'a str,
    late_days: i32,
    updates: i32,
    workload: &'static str,
    done: i32,
    quality: f64,
}

fn member_rows(team: &[TeamMember]) -> anyhow::Result<Vec<MemberRow<'_>>> {
    team.iter()
        .enumerate()
        .map(|(position, member)| -> anyhow::Result<MemberRow> {
            Ok(MemberRow {
                position: i32::try_from(position).context("team is too large")?,
                role: member.role.label(),
                name: &member.name,
                late_days: to_db(member.late_days, "late_days")?,
                updates: to_db(member.updates, "updates")?,
                workload: member.workload.label(),
                done: to_db(member.done, "done")?,
                quality: member.quality,
            })
        })
        .collect()
}

/// Upserts a task and replaces its whole team. Returns the number of members written.
pub async fn store_task(pool: &PgPool, task: &Task) -> anyhow::Result<u64> {
    let target = task.target.map(|v| to_db(v, "target")).transpose()?;
    let achieved = task.achieved.map(|v| to_db(v, "achieved")).transpose()?;
    let rows = member_rows(&task.team)
        .with_context(|| format!("invalid team for task '{}'", task.name))?;

    let mut tx = pool.begin().await?;

    let task_id: Uuid = sqlx::query(
        r#"
        INSERT INTO task_insight.tasks (id, name, category, target, achieved)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (name) DO UPDATE
        SET category = EXCLUDED.category, target = EXCLUDED.target, achieved = EXCLUDED.achieved
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&task.name)
    .bind(task.category.label())
    .bind(target)
    .bind(achieved)
    .fetch_one(&mut *tx)
    .await?
    .try_get("id")?;

    sqlx::query("DELETE FROM task_insight.team_members WHERE task_id = $1")
        .bind(task_id)
        .execute(&mut *tx)
        .await?;

    let mut written = 0u64;
    for row in rows.iter() {
        let result = sqlx::query(
            r#"
            INSERT INTO task_insight.team_members
            (id, task_id, position, role, name, late_days, updates, workload, done, quality)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(row.position)
        .bind(row.role)
        .bind(row.name)
        .bind(row.late_days)
        .bind(row.updates)
        .bind(row.workload)
        .bind(row.done)
        .bind(row.quality)
        .execute(&mut *tx)
        .await?;

        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    for task in repository::sample_tasks() {
        let changed = store_task(pool, &task).await?;
        tracing::info!(task = %task.name, members = changed, "seeded task");
    }
    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<u64> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let rows = repository::read_csv_rows(file)?;
    let tasks = repository::tasks_from_rows(rows)?;

    let mut imported = 0u64;
    for task in tasks.iter() {
        imported += store_task(pool, task).await?;
    }

    tracing::info!(tasks = tasks.len(), members = imported, "imported team csv");
    Ok(imported)
}

/// Reads every task and member once into an in-memory catalog.
pub async fn load_catalog(pool: &PgPool) -> anyhow::Result<TaskCatalog> {
    let task_rows = sqlx::query(
        "SELECT id, name, category, target, achieved \
         FROM task_insight.tasks \
         ORDER BY seq",
    )
    .fetch_all(pool)
    .await
    .context("failed to read tasks")?;

    let mut tasks = Vec::new();
    let mut positions: HashMap<Uuid, usize> = HashMap::new();

    for row in task_rows {
        let category: String = row.try_get("category")?;
        let target: Option<i32> = row.try_get("target")?;
        let achieved: Option<i32> = row.try_get("achieved")?;

        positions.insert(row.try_get("id")?, tasks.len());
        tasks.push(Task {
            name: row.try_get("name")?,
            category: category.parse()?,
            target: target.map(|v| from_db(v, "target")).transpose()?,
            achieved: achieved.map(|v| from_db(v, "achieved")).transpose()?,
            team: Vec::new(),
        });
    }

    let team_rows = sqlx::query(
        "SELECT task_id, role, name, late_days, updates, workload, done, quality \
         FROM task_insight.team_members \
         ORDER BY task_id, position, name",
    )
    .fetch_all(pool)
    .await
    .context("failed to read team members")?;

    for row in team_rows {
        let task_id: Uuid = row.try_get("task_id")?;
        let Some(&position) = positions.get(&task_id) else {
            continue;
        };
        let role: String = row.try_get("role")?;
        let workload: String = row.try_get("workload")?;

        tasks[position].team.push(TeamMember {
            role: role.parse()?,
            name: row.try_get("name")?,
            late_days: from_db(row.try_get("late_days")?, "late_days")?,
            updates: from_db(row.try_get("updates")?, "updates")?,
            workload: workload.parse()?,
            done: from_db(row.try_get("done")?, "done")?,
            quality: row.try_get("quality")?,
        });
    }

    let mut catalog = TaskCatalog::new();
    for task in tasks {
        catalog.insert(task)?;
    }

    tracing::info!(tasks = catalog.len(), "loaded task catalog from postgres");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;
    use crate::repository::{sample_tasks, TaskRepository};

    #[test]
    fn member_rows_keep_team_order() {
        let task = &sample_tasks()[0];
        let rows = member_rows(&task.team).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].name, "Sales Head");
        assert_eq!(rows[5].name, "Junior C");
        assert_eq!(rows[5].position, 5);
        assert_eq!(rows[5].workload, "High");
        assert_eq!(rows[1].role, "Senior");
    }

    #[test]
    fn oversized_member_value_fails_before_any_write() {
        let mut task = sample_tasks().remove(0);
        task.team[2].late_days = u32::MAX;

        let err = member_rows(&task.team).unwrap_err();
        assert!(err.to_string().contains("late_days"));
    }

    // Runs only when TEST_DATABASE_URL points at a scratch database.
    #[tokio::test]
    async fn reimport_replaces_stored_team() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };
        let pool = PgPool::connect(&url).await.unwrap();
        init_db(&pool).await.unwrap();

        let mut task = sample_tasks().remove(0);
        task.name = format!("Reimport {}", Uuid::new_v4());
        assert_eq!(store_task(&pool, &task).await.unwrap(), 6);

        task.team.retain(|member| member.name != "Junior C");
        assert_eq!(store_task(&pool, &task).await.unwrap(), 5);

        let catalog = load_catalog(&pool).await.unwrap();
        let stored = catalog.fetch_task(&task.name).unwrap();
        assert_eq!(stored.team, task.team);

        let result = classify::classify_team(&stored.name, &stored.team).unwrap();
        assert!((result.average_late_days - 4.0 / 5.0).abs() < 1e-9);
        assert!(result.needs_attention.is_empty());

        sqlx::query("DELETE FROM task_insight.tasks WHERE name = $1")
            .bind(&task.name)
            .execute(&pool)
            .await
            .unwrap();
    }
}
