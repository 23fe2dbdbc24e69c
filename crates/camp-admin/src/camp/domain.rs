use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Store-generated room identifier.
    RoomId
);
numeric_id!(
    /// Store-generated laborer identifier, assigned at registration.
    LaborerId
);
numeric_id!(ContractorId);
numeric_id!(StaffId);
numeric_id!(AttendanceId);

/// Lifecycle status shared by laborers, contractors, and staff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Suspended,
}

impl RecordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Active => "Active",
            RecordStatus::Suspended => "Suspended",
        }
    }
}

/// Body of the status endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StatusChange {
    pub status: RecordStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub active: bool,
}

/// Active room with its occupancy computed from laborer rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub occupancy: u32,
}

impl RoomSummary {
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

/// Insert payload. Capacity is signed so that non-positive values reach validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRoom {
    pub name: String,
    pub capacity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

/// Projection of a laborer returned when listing a room's occupants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomOccupant {
    pub id: LaborerId,
    pub name: String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    pub laborer_ids: Vec<LaborerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub room: RoomSummary,
    pub allocated: Vec<LaborerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeallocationOutcome {
    pub laborer_id: LaborerId,
    /// Room the laborer was released from; `None` when they were already unassigned.
    pub released_from: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Photo,
    SelfDeclaration,
    MedicalCertificate,
    AppointmentLetter,
    AadhaarFront,
    Additional,
}

/// Reference to an uploaded file. Upload storage itself lives outside this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReference {
    pub kind: DocumentKind,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Laborer {
    pub id: LaborerId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub blood_group: Option<String>,
    pub designation: String,
    pub mobile_number: String,
    pub email: Option<String>,
    pub aadhaar_number: Option<String>,
    pub contractor_id: Option<ContractorId>,
    pub reported_to: Option<String>,
    pub documents: Vec<DocumentReference>,
    /// Current room, referenced by name. Written only by allocation and room renames.
    pub room: Option<String>,
    pub status: RecordStatus,
    pub active: bool,
    pub registered_at: DateTime<Utc>,
}

impl Laborer {
    /// Whole years between the date of birth and `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.date_of_birth.year();
        if (today.month(), today.day()) < (self.date_of_birth.month(), self.date_of_birth.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    pub fn occupant(&self) -> RoomOccupant {
        RoomOccupant {
            id: self.id,
            name: self.name.clone(),
            mobile_number: self.mobile_number.clone(),
        }
    }

    pub fn view(&self, today: NaiveDate) -> LaborerView {
        LaborerView {
            age: self.age_on(today),
            laborer: self.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LaborerView {
    #[serde(flatten)]
    pub laborer: Laborer,
    pub age: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborerRegistration {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    #[serde(default)]
    pub blood_group: Option<String>,
    pub designation: String,
    pub mobile_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub aadhaar_number: Option<String>,
    #[serde(default)]
    pub contractor_id: Option<ContractorId>,
    #[serde(default)]
    pub reported_to: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentReference>,
}

/// Keeps an explicit `null` apart from an omitted field: omitted is `None`,
/// `null` is `Some(None)`.
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial profile edit. Room assignment is deliberately absent.
///
/// Optional fields take `Some(None)` (JSON `null`, or blank text) to clear the
/// stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LaborerUpdate {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<Option<String>>,
    pub designation: Option<String>,
    pub mobile_number: Option<String>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub aadhaar_number: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub contractor_id: Option<Option<ContractorId>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub reported_to: Option<Option<String>>,
    pub documents: Option<Vec<DocumentReference>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contractor {
    pub id: ContractorId,
    pub name: String,
    pub company_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub reference_from: Option<String>,
    pub status: RecordStatus,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractorSummary {
    #[serde(flatten)]
    pub contractor: Contractor,
    pub total_laborers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractorSubmission {
    pub name: String,
    pub company_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub reference_from: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractorUpdate {
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub reference_from: Option<Option<String>>,
}

/// Login-management entry for site staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffUser {
    pub id: StaffId,
    pub name: String,
    pub designation: String,
    pub phone: String,
    pub email: String,
    pub status: RecordStatus,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffSubmission {
    pub name: String,
    pub designation: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    HalfDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub laborer_id: LaborerId,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub laborer_id: LaborerId,
    pub date: NaiveDate,
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceFilter {
    pub date: Option<NaiveDate>,
    pub contractor_id: Option<ContractorId>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceView {
    pub id: AttendanceId,
    pub laborer_id: LaborerId,
    pub laborer_name: String,
    pub contractor: Option<String>,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total: u32,
    pub present: u32,
    pub late: u32,
    pub absent: u32,
    pub half_day: u32,
    /// Share of present or late records, as a percentage rounded to one decimal.
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub records: Vec<AttendanceView>,
    pub summary: AttendanceSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub rooms: u32,
    pub total_capacity: u64,
    pub occupied_rooms: u32,
    pub total_occupancy: u64,
    pub active_laborers: u32,
    pub suspended_laborers: u32,
    pub unassigned_laborers: u32,
    pub contractors: u32,
    pub staff: u32,
}
