//! Camp administration: rooms, laborers, contractors, staff, and attendance.
//!
//! Every service shares one [`CampRepository`]. The room allocation rule lives in
//! [`AllocationService`]; the other services maintain the records it reads.

pub mod allocation;
pub mod attendance;
pub mod contractors;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod laborers;
pub mod memory;
pub mod router;
pub mod staff;
pub mod store;
pub(crate) mod extract;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

use std::sync::Arc;

pub use allocation::AllocationService;
pub use attendance::AttendanceService;
pub use contractors::ContractorService;
pub use domain::{
    AllocationOutcome, AllocationRequest, AttendanceEntry, AttendanceFilter, AttendanceId,
    AttendanceRecord, AttendanceReport, AttendanceStatus, AttendanceSummary, AttendanceView,
    Contractor, ContractorId, ContractorSubmission, ContractorSummary, ContractorUpdate,
    DashboardSummary, DeallocationOutcome, DocumentKind, DocumentReference, Laborer, LaborerId,
    LaborerRegistration, LaborerUpdate, LaborerView, NewRoom, RecordStatus, Room, RoomId,
    RoomOccupant, RoomSummary, RoomUpdate, StaffId, StaffSubmission, StaffUpdate, StaffUser,
    StatusChange,
};
pub use error::CampError;
pub use laborers::LaborerService;
pub use memory::InMemoryCampRepository;
pub use router::camp_router;
pub use staff::StaffService;
pub use store::{CampRepository, CampTables, RepositoryError};

/// All camp services wired to the same repository.
pub struct CampAdministration<R> {
    pub allocation: AllocationService<R>,
    pub laborers: LaborerService<R>,
    pub contractors: ContractorService<R>,
    pub staff: StaffService<R>,
    pub attendance: AttendanceService<R>,
    repository: Arc<R>,
}

impl<R> CampAdministration<R>
where
    R: CampRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            allocation: AllocationService::new(repository.clone()),
            laborers: LaborerService::new(repository.clone()),
            contractors: ContractorService::new(repository.clone()),
            staff: StaffService::new(repository.clone()),
            attendance: AttendanceService::new(repository.clone()),
            repository,
        }
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, CampError> {
        let summary = self.repository.read(dashboard::summarize)?;
        Ok(summary)
    }
}
