use rusqlite::{params, OptionalExtension, Row};

use super::{now, ts_column, ts_to_sql, Database};
use crate::error::{EntityKind, Error, Result};
use crate::models::{Category, CreateCategoryInput, DeleteInput, DeleteResult, UpdateCategoryInput};

const CATEGORY_COLUMNS: &str = "id, name, description, color, created_at";

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
        created_at: ts_column(row, 4)?,
    })
}

impl Database {
    pub fn create_category(&self, input: CreateCategoryInput) -> Result<Category> {
        input.validate()?;

        self.with_connection(|conn| {
            let category = conn.query_row(
                &format!(
                    "INSERT INTO categories (name, description, color, created_at)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {CATEGORY_COLUMNS}"
                ),
                params![input.name, input.description, input.color, ts_to_sql(&now())],
                row_to_category,
            )?;
            tracing::debug!("Created category {} ({})", category.id, category.name);
            Ok(category)
        })
    }

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id"))?;
            let categories = stmt
                .query_map([], row_to_category)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(categories)
        })
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
                    [id],
                    row_to_category,
                )
                .optional()?)
        })
    }

    pub fn update_category(&self, input: UpdateCategoryInput) -> Result<Category> {
        input.validate()?;

        self.with_connection(|conn| {
            let tx = conn.transaction()?;

            let current = tx
                .query_row(
                    &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
                    [input.id],
                    row_to_category,
                )
                .optional()?
                .ok_or_else(|| Error::not_found(EntityKind::Category, input.id))?;

            let updated = input.apply(current);
            tx.execute(
                "UPDATE categories SET name = ?2, description = ?3, color = ?4 WHERE id = ?1",
                params![updated.id, updated.name, updated.description, updated.color],
            )?;
            tx.commit()?;

            tracing::debug!("Updated category {}", updated.id);
            Ok(updated)
        })
    }

    /// Clears the category from every task, then removes it. Idempotent.
    pub fn delete_category(&self, input: DeleteInput) -> Result<DeleteResult> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let cleared = tx.execute(
                "UPDATE tasks SET category_id = NULL, updated_at = MAX(updated_at, ?2)
                 WHERE category_id = ?1",
                params![input.id, ts_to_sql(&now())],
            )?;
            let removed = tx.execute("DELETE FROM categories WHERE id = ?1", [input.id])?;
            tx.commit()?;

            tracing::debug!(
                "Deleted category {} (removed: {}, tasks cleared: {})",
                input.id,
                removed,
                cleared
            );
            Ok(DeleteResult { success: true })
        })
    }
}
