//! Member use-case service.
//!
//! # Responsibility
//! - Turn member form submissions into validated repository writes.
//! - Expose both lifecycles: deactivate/reactivate and hard delete.
//!
//! # Invariants
//! - Input is normalized before it reaches the repository.
//! - Service layer remains storage-agnostic.

use crate::model::member::{Member, MemberId, MemberInput};
use crate::repo::member_repo::{MemberListQuery, MemberRepository};
use crate::repo::RepoResult;
use uuid::Uuid;

/// Use-case service wrapper for member operations.
pub struct MemberService<R: MemberRepository> {
    repo: R,
}

impl<R: MemberRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new member and returns the stored shape.
    pub fn create_member(&self, input: &MemberInput) -> RepoResult<Member> {
        let member = Member::from_input(Uuid::new_v4(), input.normalized()?);
        self.repo.create_member(&member)?;
        Ok(member)
    }

    /// Replaces every editable field of an existing member.
    pub fn update_member(&self, id: MemberId, input: &MemberInput) -> RepoResult<Member> {
        let member = Member::from_input(id, input.normalized()?);
        self.repo.update_member(&member)?;
        Ok(member)
    }

    pub fn deactivate_member(&self, id: MemberId) -> RepoResult<()> {
        self.repo.set_member_active(id, false)
    }

    pub fn reactivate_member(&self, id: MemberId) -> RepoResult<()> {
        self.repo.set_member_active(id, true)
    }

    /// Permanently removes the member row. Attendance history is untouched.
    pub fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        self.repo.delete_member(id)
    }

    pub fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.repo.get_member(id)
    }

    pub fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        self.repo.list_members(query)
    }
}
