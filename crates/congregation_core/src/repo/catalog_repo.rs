//! Class and meeting repositories over SQLite.
//!
//! Both collections share one implementation type because they have the
//! same lifecycle: create, rename, hard delete, list by `compare_names`.

use crate::model::catalog::{Class, ClassId, Meeting, MeetingId};
use crate::report::collate::compare_names;
use crate::repo::common::{ensure_connection_ready, format_date, parse_date, parse_uuid};
use crate::repo::{EntityKind, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Repository interface for classes.
pub trait ClassRepository {
    fn create_class(&self, class: &Class) -> RepoResult<ClassId>;
    fn rename_class(&self, id: ClassId, name: &str) -> RepoResult<()>;
    fn delete_class(&self, id: ClassId) -> RepoResult<()>;
    fn get_class(&self, id: ClassId) -> RepoResult<Option<Class>>;
    fn list_classes(&self) -> RepoResult<Vec<Class>>;
}

/// Repository interface for meetings.
pub trait MeetingRepository {
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<MeetingId>;
    fn update_meeting(&self, meeting: &Meeting) -> RepoResult<()>;
    fn delete_meeting(&self, id: MeetingId) -> RepoResult<()>;
    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<Meeting>>;
    fn list_meetings(&self) -> RepoResult<Vec<Meeting>>;
}

/// SQLite-backed class/meeting repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "classes")?;
        ensure_connection_ready(conn, "meetings")?;
        Ok(Self { conn })
    }

    fn delete_by_id(&self, table: &str, entity: EntityKind, id: uuid::Uuid) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity, id });
        }
        Ok(())
    }
}

impl ClassRepository for SqliteCatalogRepository<'_> {
    fn create_class(&self, class: &Class) -> RepoResult<ClassId> {
        class.validate()?;
        self.conn.execute(
            "INSERT INTO classes (id, name) VALUES (?1, ?2);",
            params![class.id.to_string(), class.name.as_str()],
        )?;
        Ok(class.id)
    }

    fn rename_class(&self, id: ClassId, name: &str) -> RepoResult<()> {
        Class {
            id,
            name: name.to_string(),
        }
        .validate()?;

        let changed = self.conn.execute(
            "UPDATE classes
             SET
                name = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![name, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Class,
                id,
            });
        }
        Ok(())
    }

    fn delete_class(&self, id: ClassId) -> RepoResult<()> {
        self.delete_by_id("classes", EntityKind::Class, id)
    }

    fn get_class(&self, id: ClassId) -> RepoResult<Option<Class>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM classes WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            return Ok(Some(Class {
                id: parse_uuid(&id_text, "classes.id")?,
                name: row.get(1)?,
            }));
        }
        Ok(None)
    }

    fn list_classes(&self) -> RepoResult<Vec<Class>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM classes ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut classes = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            classes.push(Class {
                id: parse_uuid(&id_text, "classes.id")?,
                name: row.get(1)?,
            });
        }
        classes.sort_by(|left, right| compare_names(&left.name, &right.name));
        Ok(classes)
    }
}

impl MeetingRepository for SqliteCatalogRepository<'_> {
    fn create_meeting(&self, meeting: &Meeting) -> RepoResult<MeetingId> {
        meeting.validate()?;
        self.conn.execute(
            "INSERT INTO meetings (id, name, scheduled_on) VALUES (?1, ?2, ?3);",
            params![
                meeting.id.to_string(),
                meeting.name.as_str(),
                meeting.scheduled_on.map(format_date),
            ],
        )?;
        Ok(meeting.id)
    }

    fn update_meeting(&self, meeting: &Meeting) -> RepoResult<()> {
        meeting.validate()?;
        let changed = self.conn.execute(
            "UPDATE meetings
             SET
                name = ?1,
                scheduled_on = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![
                meeting.name.as_str(),
                meeting.scheduled_on.map(format_date),
                meeting.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: EntityKind::Meeting,
                id: meeting.id,
            });
        }
        Ok(())
    }

    fn delete_meeting(&self, id: MeetingId) -> RepoResult<()> {
        self.delete_by_id("meetings", EntityKind::Meeting, id)
    }

    fn get_meeting(&self, id: MeetingId) -> RepoResult<Option<Meeting>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, scheduled_on FROM meetings WHERE id = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            let scheduled_text: Option<String> = row.get(2)?;
            return Ok(Some(Meeting {
                id: parse_uuid(&id_text, "meetings.id")?,
                name: row.get(1)?,
                scheduled_on: parse_optional_date(scheduled_text)?,
            }));
        }
        Ok(None)
    }

    fn list_meetings(&self) -> RepoResult<Vec<Meeting>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, scheduled_on
             FROM meetings
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut meetings = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get(0)?;
            let scheduled_text: Option<String> = row.get(2)?;
            meetings.push(Meeting {
                id: parse_uuid(&id_text, "meetings.id")?,
                name: row.get(1)?,
                scheduled_on: parse_optional_date(scheduled_text)?,
            });
        }
        meetings.sort_by(|left, right| compare_names(&left.name, &right.name));
        Ok(meetings)
    }
}

fn parse_optional_date(value: Option<String>) -> RepoResult<Option<NaiveDate>> {
    value
        .map(|text| parse_date(&text, "meetings.scheduled_on"))
        .transpose()
}
