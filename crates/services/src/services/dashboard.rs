use chrono::NaiveDate;
use db::{
    models::task::Task,
    types::{TaskPriority, TaskStatus},
};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::workflow::{Result, TaskWorkflow};

/// A task whose due date has already passed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct OverdueTask {
    pub task_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub days_overdue: i64,
}

/// A task due within the next week.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DueSoonTask {
    pub task_id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProjectSummary {
    pub project_id: Uuid,
    pub total_tasks: usize,
    pub done_tasks: usize,
    pub progress_percent: u32,
    pub overdue: Vec<OverdueTask>,
    pub due_soon: Vec<DueSoonTask>,
}

const DUE_SOON_WINDOW_DAYS: i64 = 7;

/// Tasks whose due date is strictly before today. Done tasks never count,
/// whatever their date.
pub fn overdue_tasks(tasks: &[Task], today: NaiveDate) -> Vec<OverdueTask> {
    tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .filter_map(|t| t.due_date.map(|d| (t, d)))
        .filter(|(_, d)| *d < today)
        .map(|(t, d)| OverdueTask {
            task_id: t.id,
            project_id: t.project_id,
            title: t.title.clone(),
            status: t.status,
            priority: t.priority,
            due_date: d,
            days_overdue: (today - d).num_days(),
        })
        .collect()
}

/// Tasks due today or within the next seven whole days, not yet done.
pub fn due_soon_tasks(tasks: &[Task], today: NaiveDate) -> Vec<DueSoonTask> {
    tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .filter_map(|t| t.due_date.map(|d| (t, d)))
        .filter(|(_, d)| {
            let days = (*d - today).num_days();
            (0..=DUE_SOON_WINDOW_DAYS).contains(&days)
        })
        .map(|(t, d)| DueSoonTask {
            task_id: t.id,
            project_id: t.project_id,
            title: t.title.clone(),
            status: t.status,
            priority: t.priority,
            due_date: d,
            days_until_due: (d - today).num_days(),
        })
        .collect()
}

/// Completion ratio as a rounded percentage. An empty set reads as 0,
/// not 100.
pub fn progress_percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u32
}

pub async fn project_summary<C: ConnectionTrait>(
    db: &C,
    project_id: Uuid,
    today: NaiveDate,
) -> Result<ProjectSummary> {
    let tasks = TaskWorkflow::list_tasks(db, project_id).await?;
    let done_tasks = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count();
    Ok(ProjectSummary {
        project_id,
        total_tasks: tasks.len(),
        done_tasks,
        progress_percent: progress_percent(done_tasks, tasks.len()),
        overdue: overdue_tasks(&tasks, today),
        due_soon: due_soon_tasks(&tasks, today),
    })
}
