//! Class and meeting management use-cases.

use crate::model::catalog::{normalize_catalog_name, Class, ClassId, Meeting, MeetingId};
use crate::repo::catalog_repo::{ClassRepository, MeetingRepository};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use uuid::Uuid;

/// Service facade for class/meeting reference data.
pub struct CatalogService<R> {
    repo: R,
}

impl<R: ClassRepository + MeetingRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_class(&self, name: &str) -> RepoResult<Class> {
        let class = Class {
            id: Uuid::new_v4(),
            name: normalize_catalog_name(name)?,
        };
        self.repo.create_class(&class)?;
        Ok(class)
    }

    /// Renames a class. Existing attendance keeps the old embedded name.
    pub fn rename_class(&self, id: ClassId, name: &str) -> RepoResult<Class> {
        let name = normalize_catalog_name(name)?;
        self.repo.rename_class(id, &name)?;
        Ok(Class { id, name })
    }

    pub fn delete_class(&self, id: ClassId) -> RepoResult<()> {
        self.repo.delete_class(id)
    }

    pub fn list_classes(&self) -> RepoResult<Vec<Class>> {
        self.repo.list_classes()
    }

    pub fn create_meeting(
        &self,
        name: &str,
        scheduled_on: Option<NaiveDate>,
    ) -> RepoResult<Meeting> {
        let meeting = Meeting {
            id: Uuid::new_v4(),
            name: normalize_catalog_name(name)?,
            scheduled_on,
        };
        self.repo.create_meeting(&meeting)?;
        Ok(meeting)
    }

    /// Replaces meeting name and date. Existing attendance keeps the old
    /// embedded name.
    pub fn update_meeting(
        &self,
        id: MeetingId,
        name: &str,
        scheduled_on: Option<NaiveDate>,
    ) -> RepoResult<Meeting> {
        let meeting = Meeting {
            id,
            name: normalize_catalog_name(name)?,
            scheduled_on,
        };
        self.repo.update_meeting(&meeting)?;
        Ok(meeting)
    }

    pub fn delete_meeting(&self, id: MeetingId) -> RepoResult<()> {
        self.repo.delete_meeting(id)
    }

    pub fn list_meetings(&self) -> RepoResult<Vec<Meeting>> {
        self.repo.list_meetings()
    }
}
