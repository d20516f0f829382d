use rusqlite::{params, OptionalExtension, Row};

use super::{now, ts_column, ts_to_sql, Database};
use crate::error::{EntityKind, Error, Result};
use crate::models::{
    CreateFamilyMemberInput, DeleteInput, DeleteResult, FamilyMember, UpdateFamilyMemberInput,
};

const MEMBER_COLUMNS: &str = "id, name, email, avatar_url, created_at";

fn row_to_member(row: &Row<'_>) -> rusqlite::Result<FamilyMember> {
    Ok(FamilyMember {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        avatar_url: row.get(3)?,
        created_at: ts_column(row, 4)?,
    })
}

impl Database {
    pub fn create_family_member(&self, input: CreateFamilyMemberInput) -> Result<FamilyMember> {
        input.validate()?;

        self.with_connection(|conn| {
            let member = conn.query_row(
                &format!(
                    "INSERT INTO family_members (name, email, avatar_url, created_at)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {MEMBER_COLUMNS}"
                ),
                params![input.name, input.email, input.avatar_url, ts_to_sql(&now())],
                row_to_member,
            )?;
            tracing::debug!("Created family member {} ({})", member.id, member.name);
            Ok(member)
        })
    }

    pub fn get_family_members(&self) -> Result<Vec<FamilyMember>> {
        self.with_connection(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {MEMBER_COLUMNS} FROM family_members ORDER BY id"))?;
            let members = stmt
                .query_map([], row_to_member)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(members)
        })
    }

    pub fn get_family_member(&self, id: i64) -> Result<Option<FamilyMember>> {
        self.with_connection(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {MEMBER_COLUMNS} FROM family_members WHERE id = ?1"),
                    [id],
                    row_to_member,
                )
                .optional()?)
        })
    }

    pub fn update_family_member(&self, input: UpdateFamilyMemberInput) -> Result<FamilyMember> {
        input.validate()?;

        self.with_connection(|conn| {
            let tx = conn.transaction()?;

            let current = tx
                .query_row(
                    &format!("SELECT {MEMBER_COLUMNS} FROM family_members WHERE id = ?1"),
                    [input.id],
                    row_to_member,
                )
                .optional()?
                .ok_or_else(|| Error::not_found(EntityKind::FamilyMember, input.id))?;

            let updated = input.apply(current);
            tx.execute(
                "UPDATE family_members SET name = ?2, email = ?3, avatar_url = ?4 WHERE id = ?1",
                params![updated.id, updated.name, updated.email, updated.avatar_url],
            )?;
            tx.commit()?;

            tracing::debug!("Updated family member {}", updated.id);
            Ok(updated)
        })
    }

    /// Unassigns every task pointing at the member, then removes the member,
    /// in one transaction. Deleting a member that does not exist succeeds.
    pub fn delete_family_member(&self, input: DeleteInput) -> Result<DeleteResult> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let unassigned = tx.execute(
                "UPDATE tasks SET assigned_to = NULL, updated_at = MAX(updated_at, ?2)
                 WHERE assigned_to = ?1",
                params![input.id, ts_to_sql(&now())],
            )?;
            let removed = tx.execute("DELETE FROM family_members WHERE id = ?1", [input.id])?;
            tx.commit()?;

            tracing::debug!(
                "Deleted family member {} (removed: {}, tasks unassigned: {})",
                input.id,
                removed,
                unassigned
            );
            Ok(DeleteResult { success: true })
        })
    }
}
