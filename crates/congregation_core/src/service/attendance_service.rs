//! Attendance batch preparation.
//!
//! # Responsibility
//! - Validate an attendance sheet selection before any write is attempted.
//! - Denormalize member/class/meeting names into record drafts.
//!
//! # Invariants
//! - Validation failures never reach the store.
//! - Selected member ids that no longer resolve to a known member are
//!   skipped; a selection that resolves to nobody is rejected.
//! - Drafts are produced in member id order.

use crate::identity::IdentityProvider;
use crate::model::attendance::AttendanceDraft;
use crate::model::catalog::{Class, ClassId, Meeting, MeetingId};
use crate::model::member::{Member, MemberId};
use crate::store::StoreError;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors returned when saving an attendance sheet.
#[derive(Debug)]
pub enum AttendanceSaveError {
    MeetingNotSelected,
    ClassNotSelected,
    NoMembersSelected,
    NotAuthenticated,
    /// Selected meeting is not in the current meeting snapshot.
    UnknownMeeting(MeetingId),
    /// Selected class is not in the current class snapshot.
    UnknownClass(ClassId),
    /// None of the selected members is in the current member snapshot.
    NoKnownMembers,
    /// A previous save of the same sheet has not finished.
    SaveInProgress,
    Store(StoreError),
}

impl AttendanceSaveError {
    /// Whether the failure was a local validation rejection (no write
    /// attempted) rather than a store failure.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

impl Display for AttendanceSaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeetingNotSelected => write!(f, "select a meeting before saving"),
            Self::ClassNotSelected => write!(f, "select a class before saving"),
            Self::NoMembersSelected => write!(f, "no member was marked as present"),
            Self::NotAuthenticated => write!(f, "no authenticated user"),
            Self::UnknownMeeting(id) => write!(f, "meeting not found: {id}"),
            Self::UnknownClass(id) => write!(f, "class not found: {id}"),
            Self::NoKnownMembers => write!(f, "none of the selected members exists anymore"),
            Self::SaveInProgress => write!(f, "attendance save already in progress"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AttendanceSaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AttendanceSaveError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Selection made on an attendance sheet.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceSelection<'a> {
    pub meeting_id: Option<MeetingId>,
    pub class_id: Option<ClassId>,
    pub present: &'a BTreeSet<MemberId>,
}

/// Reference data the selection is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceContext<'a> {
    pub members: &'a [Member],
    pub classes: &'a [Class],
    pub meetings: &'a [Meeting],
}

/// Validates a selection and builds one draft per resolvable member.
pub fn build_attendance_batch(
    selection: AttendanceSelection<'_>,
    context: AttendanceContext<'_>,
    identity: &dyn IdentityProvider,
) -> Result<Vec<AttendanceDraft>, AttendanceSaveError> {
    let meeting_id = selection
        .meeting_id
        .ok_or(AttendanceSaveError::MeetingNotSelected)?;
    let class_id = selection
        .class_id
        .ok_or(AttendanceSaveError::ClassNotSelected)?;
    if selection.present.is_empty() {
        return Err(AttendanceSaveError::NoMembersSelected);
    }
    let recorded_by = identity
        .current_user_id()
        .ok_or(AttendanceSaveError::NotAuthenticated)?;

    let class = context
        .classes
        .iter()
        .find(|class| class.id == class_id)
        .ok_or(AttendanceSaveError::UnknownClass(class_id))?;
    let meeting = context
        .meetings
        .iter()
        .find(|meeting| meeting.id == meeting_id)
        .ok_or(AttendanceSaveError::UnknownMeeting(meeting_id))?;

    let members_by_id: HashMap<MemberId, &Member> = context
        .members
        .iter()
        .map(|member| (member.id, member))
        .collect();

    let drafts = selection
        .present
        .iter()
        .filter_map(|member_id| members_by_id.get(member_id))
        .map(|member| AttendanceDraft {
            member_id: member.id,
            member_name: member.full_name.clone(),
            class_id: class.id,
            class_name: class.name.clone(),
            meeting_id: meeting.id,
            meeting_name: meeting.name.clone(),
            recorded_by: recorded_by.clone(),
        })
        .collect::<Vec<_>>();

    if drafts.is_empty() {
        return Err(AttendanceSaveError::NoKnownMembers);
    }
    Ok(drafts)
}
