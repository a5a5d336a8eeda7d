//! Member repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Member::validate()` before SQL mutations.
//! - List ordering is deterministic: `compare_names` on `full_name`, then id.
//! - Hard delete removes only the member row; attendance history is kept.

use crate::model::member::{Member, MemberId};
use crate::report::collate::compare_names;
use crate::repo::common::{
    bool_to_int, ensure_connection_ready, format_date, parse_date, parse_flag, parse_uuid,
};
use crate::repo::{EntityKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    id,
    full_name,
    phone,
    birth_date,
    joined_on,
    is_active,
    is_professed
FROM members";

/// Query options for listing members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberListQuery {
    /// Skip members whose `is_active` flag is cleared.
    pub active_only: bool,
}

impl MemberListQuery {
    pub fn active_only() -> Self {
        Self { active_only: true }
    }
}

/// Repository interface for member CRUD operations.
pub trait MemberRepository {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    fn set_member_active(&self, id: MemberId, is_active: bool) -> RepoResult<()>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "members")?;
        Ok(Self { conn })
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        member.validate()?;

        self.conn.execute(
            "INSERT INTO members (
                id,
                full_name,
                phone,
                birth_date,
                joined_on,
                is_active,
                is_professed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                member.id.to_string(),
                member.full_name.as_str(),
                member.phone.as_deref(),
                format_date(member.birth_date),
                format_date(member.joined_on),
                bool_to_int(member.is_active),
                bool_to_int(member.is_professed),
            ],
        )?;

        Ok(member.id)
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;

        let changed = self.conn.execute(
            "UPDATE members
             SET
                full_name = ?1,
                phone = ?2,
                birth_date = ?3,
                joined_on = ?4,
                is_active = ?5,
                is_professed = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?7;",
            params![
                member.full_name.as_str(),
                member.phone.as_deref(),
                format_date(member.birth_date),
                format_date(member.joined_on),
                bool_to_int(member.is_active),
                bool_to_int(member.is_professed),
                member.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(not_found(member.id));
        }
        Ok(())
    }

    fn set_member_active(&self, id: MemberId, is_active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members
             SET
                is_active = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![bool_to_int(is_active), id.to_string()],
        )?;

        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM members WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL}
             WHERE (?1 = 0 OR is_active = 1)
             ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(query.active_only)])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        members.sort_by(|left, right| compare_names(&left.full_name, &right.full_name));
        Ok(members)
    }
}

fn not_found(id: MemberId) -> RepoError {
    RepoError::NotFound {
        entity: EntityKind::Member,
        id,
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let id_text: String = row.get("id")?;
    let birth_text: String = row.get("birth_date")?;
    let joined_text: String = row.get("joined_on")?;

    let member = Member {
        id: parse_uuid(&id_text, "members.id")?,
        full_name: row.get("full_name")?,
        phone: row.get("phone")?,
        birth_date: parse_date(&birth_text, "members.birth_date")?,
        joined_on: parse_date(&joined_text, "members.joined_on")?,
        is_active: parse_flag(row.get("is_active")?, "members.is_active")?,
        is_professed: parse_flag(row.get("is_professed")?, "members.is_professed")?,
    };
    member.validate()?;
    Ok(member)
}
