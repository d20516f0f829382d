use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{exists, next_stamp, now, opt_ts_column, ts_column, ts_to_sql, Database};
use crate::error::{EntityKind, Error, Result, ValidationError};
use crate::models::{
    CreateTaskInput, DeleteInput, DeleteResult, Task, ToggleTaskCompletionInput, UpdateTaskInput,
};

const TASK_COLUMNS: &str = "id, title, description, due_date, is_completed, assigned_to, \
                            category_id, created_at, updated_at";

fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_date: opt_ts_column(row, 3)?,
        is_completed: row.get(4)?,
        assigned_to: row.get(5)?,
        category_id: row.get(6)?,
        created_at: ts_column(row, 7)?,
        updated_at: ts_column(row, 8)?,
    })
}

/// A task may only be pointed at members and categories that exist right now.
fn check_reference(conn: &Connection, entity: EntityKind, id: Option<i64>) -> Result<()> {
    match id {
        Some(id) if !exists(conn, entity, id)? => {
            Err(ValidationError::MissingReference { entity, id }.into())
        }
        _ => Ok(()),
    }
}

fn find_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    Ok(conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            [id],
            row_to_task,
        )
        .optional()?)
}

impl Database {
    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        input.validate()?;

        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            check_reference(&tx, EntityKind::FamilyMember, input.assigned_to)?;
            check_reference(&tx, EntityKind::Category, input.category_id)?;

            let created_at = ts_to_sql(&now());
            let task = tx.query_row(
                &format!(
                    "INSERT INTO tasks (title, description, due_date, is_completed, assigned_to,
                                        category_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6, ?6)
                     RETURNING {TASK_COLUMNS}"
                ),
                params![
                    input.title,
                    input.description,
                    input.due_date.as_ref().map(ts_to_sql),
                    input.assigned_to,
                    input.category_id,
                    created_at,
                ],
                row_to_task,
            )?;
            tx.commit()?;

            tracing::debug!("Created task {} ({})", task.id, task.title);
            Ok(task)
        })
    }

    pub fn get_tasks(&self) -> Result<Vec<Task>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
            let tasks = stmt
                .query_map([], row_to_task)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Option<Task>> {
        self.with_connection(|conn| find_task(conn, id))
    }

    /// Applies the fields present in `input` and refreshes `updated_at`.
    pub fn update_task(&self, input: UpdateTaskInput) -> Result<Task> {
        input.validate()?;

        self.with_connection(|conn| {
            let tx = conn.transaction()?;

            let current =
                find_task(&tx, input.id)?.ok_or_else(|| Error::not_found(EntityKind::Task, input.id))?;

            check_reference(&tx, EntityKind::FamilyMember, input.assigned_to.as_value().copied())?;
            check_reference(&tx, EntityKind::Category, input.category_id.as_value().copied())?;

            let previous_stamp = current.updated_at;
            let mut updated = input.apply(current);
            updated.updated_at = next_stamp(previous_stamp);

            tx.execute(
                "UPDATE tasks
                 SET title = ?2,
                     description = ?3,
                     due_date = ?4,
                     is_completed = ?5,
                     assigned_to = ?6,
                     category_id = ?7,
                     updated_at = ?8
                 WHERE id = ?1",
                params![
                    updated.id,
                    updated.title,
                    updated.description,
                    updated.due_date.as_ref().map(ts_to_sql),
                    updated.is_completed,
                    updated.assigned_to,
                    updated.category_id,
                    ts_to_sql(&updated.updated_at),
                ],
            )?;
            tx.commit()?;

            tracing::debug!("Updated task {}", updated.id);
            Ok(updated)
        })
    }

    /// Deleting a task that does not exist succeeds.
    pub fn delete_task(&self, input: DeleteInput) -> Result<DeleteResult> {
        self.with_connection(|conn| {
            let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", [input.id])?;
            tracing::debug!("Deleted task {} (removed: {})", input.id, removed);
            Ok(DeleteResult { success: true })
        })
    }

    pub fn toggle_task_completion(&self, input: ToggleTaskCompletionInput) -> Result<Task> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;

            let mut task =
                find_task(&tx, input.id)?.ok_or_else(|| Error::not_found(EntityKind::Task, input.id))?;
            task.is_completed = input.is_completed;
            task.updated_at = next_stamp(task.updated_at);

            tx.execute(
                "UPDATE tasks SET is_completed = ?2, updated_at = ?3 WHERE id = ?1",
                params![task.id, task.is_completed, ts_to_sql(&task.updated_at)],
            )?;
            tx.commit()?;

            tracing::debug!("Marked task {} as {}", task.id, task.state().as_str());
            Ok(task)
        })
    }
}
