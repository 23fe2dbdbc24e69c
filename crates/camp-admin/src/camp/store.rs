//! Tables backing the camp and the repository contract the services run against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    AttendanceId, AttendanceRecord, Contractor, ContractorId, Laborer, LaborerId, Room, RoomId,
    RoomSummary, StaffId, StaffUser,
};

/// Storage abstraction so services can be exercised against in-memory or failing stores.
///
/// Every mutation goes through [`CampRepository::transaction`]; implementations must apply the
/// unit of work atomically and serialize it against other transactions.
pub trait CampRepository: Send + Sync {
    /// Run a read-only query against a consistent view of the tables.
    fn read<T, F>(&self, query: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&CampTables) -> T;

    /// Run `work` as one transaction. Changes are committed only when it returns `Ok`.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut CampTables) -> Result<T, E>,
        E: From<RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store snapshot is unreadable: {0}")]
    Corrupt(String),
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Sequences {
    room: u64,
    laborer: u64,
    contractor: u64,
    staff: u64,
    attendance: u64,
}

/// Every entity the camp owns, keyed by store-generated id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "TableSnapshot", into = "TableSnapshot")]
pub struct CampTables {
    pub rooms: BTreeMap<RoomId, Room>,
    pub laborers: BTreeMap<LaborerId, Laborer>,
    pub contractors: BTreeMap<ContractorId, Contractor>,
    pub staff: BTreeMap<StaffId, StaffUser>,
    pub attendance: BTreeMap<AttendanceId, AttendanceRecord>,
    sequences: Sequences,
}

impl CampTables {
    pub fn next_room_id(&mut self) -> RoomId {
        self.sequences.room += 1;
        RoomId(self.sequences.room)
    }

    pub fn next_laborer_id(&mut self) -> LaborerId {
        self.sequences.laborer += 1;
        LaborerId(self.sequences.laborer)
    }

    pub fn next_contractor_id(&mut self) -> ContractorId {
        self.sequences.contractor += 1;
        ContractorId(self.sequences.contractor)
    }

    pub fn next_staff_id(&mut self) -> StaffId {
        self.sequences.staff += 1;
        StaffId(self.sequences.staff)
    }

    pub fn next_attendance_id(&mut self) -> AttendanceId {
        self.sequences.attendance += 1;
        AttendanceId(self.sequences.attendance)
    }

    pub fn active_rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values().filter(|room| room.active)
    }

    pub fn active_room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id).filter(|room| room.active)
    }

    pub fn active_room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id).filter(|room| room.active)
    }

    pub fn active_room_by_name(&self, name: &str) -> Option<&Room> {
        self.active_rooms().find(|room| room.name == name)
    }

    /// Active laborers whose current room is `room_name`.
    pub fn occupants<'a>(&'a self, room_name: &'a str) -> impl Iterator<Item = &'a Laborer> + 'a {
        self.active_laborers()
            .filter(move |laborer| laborer.room.as_deref() == Some(room_name))
    }

    pub fn occupancy(&self, room_name: &str) -> u32 {
        self.occupants(room_name).count() as u32
    }

    pub fn room_summary(&self, room: &Room) -> RoomSummary {
        RoomSummary {
            id: room.id,
            name: room.name.clone(),
            capacity: room.capacity,
            occupancy: self.occupancy(&room.name),
        }
    }

    pub fn active_laborers(&self) -> impl Iterator<Item = &Laborer> {
        self.laborers.values().filter(|laborer| laborer.active)
    }

    pub fn active_laborer(&self, id: LaborerId) -> Option<&Laborer> {
        self.laborers.get(&id).filter(|laborer| laborer.active)
    }

    pub fn active_laborer_mut(&mut self, id: LaborerId) -> Option<&mut Laborer> {
        self.laborers.get_mut(&id).filter(|laborer| laborer.active)
    }

    pub fn active_contractors(&self) -> impl Iterator<Item = &Contractor> {
        self.contractors.values().filter(|contractor| contractor.active)
    }

    pub fn active_contractor(&self, id: ContractorId) -> Option<&Contractor> {
        self.contractors.get(&id).filter(|contractor| contractor.active)
    }

    pub fn active_contractor_mut(&mut self, id: ContractorId) -> Option<&mut Contractor> {
        self.contractors.get_mut(&id).filter(|contractor| contractor.active)
    }

    pub fn contractor_headcount(&self, id: ContractorId) -> u32 {
        self.active_laborers()
            .filter(|laborer| laborer.contractor_id == Some(id))
            .count() as u32
    }

    pub fn active_staff(&self) -> impl Iterator<Item = &StaffUser> {
        self.staff.values().filter(|user| user.active)
    }

    pub fn active_staff_mut(&mut self, id: StaffId) -> Option<&mut StaffUser> {
        self.staff.get_mut(&id).filter(|user| user.active)
    }
}

/// On-disk layout: plain row lists plus the id sequences so ids are never reused.
#[derive(Serialize, Deserialize)]
struct TableSnapshot {
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    laborers: Vec<Laborer>,
    #[serde(default)]
    contractors: Vec<Contractor>,
    #[serde(default)]
    staff: Vec<StaffUser>,
    #[serde(default)]
    attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    sequences: Sequences,
}

impl From<TableSnapshot> for CampTables {
    fn from(snapshot: TableSnapshot) -> Self {
        let mut sequences = snapshot.sequences;
        sequences.room = sequences
            .room
            .max(snapshot.rooms.iter().map(|row| row.id.0).max().unwrap_or(0));
        sequences.laborer = sequences
            .laborer
            .max(snapshot.laborers.iter().map(|row| row.id.0).max().unwrap_or(0));
        sequences.contractor = sequences
            .contractor
            .max(snapshot.contractors.iter().map(|row| row.id.0).max().unwrap_or(0));
        sequences.staff = sequences
            .staff
            .max(snapshot.staff.iter().map(|row| row.id.0).max().unwrap_or(0));
        sequences.attendance = sequences
            .attendance
            .max(snapshot.attendance.iter().map(|row| row.id.0).max().unwrap_or(0));

        Self {
            rooms: snapshot.rooms.into_iter().map(|row| (row.id, row)).collect(),
            laborers: snapshot.laborers.into_iter().map(|row| (row.id, row)).collect(),
            contractors: snapshot
                .contractors
                .into_iter()
                .map(|row| (row.id, row))
                .collect(),
            staff: snapshot.staff.into_iter().map(|row| (row.id, row)).collect(),
            attendance: snapshot
                .attendance
                .into_iter()
                .map(|row| (row.id, row))
                .collect(),
            sequences,
        }
    }
}

impl From<CampTables> for TableSnapshot {
    fn from(tables: CampTables) -> Self {
        Self {
            rooms: tables.rooms.into_values().collect(),
            laborers: tables.laborers.into_values().collect(),
            contractors: tables.contractors.into_values().collect(),
            staff: tables.staff.into_values().collect(),
            attendance: tables.attendance.into_values().collect(),
            sequences: tables.sequences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(tables: &mut CampTables, name: &str, capacity: u32) -> RoomId {
        let id = tables.next_room_id();
        tables.rooms.insert(
            id,
            Room {
                id,
                name: name.to_string(),
                capacity,
                active: true,
            },
        );
        id
    }

    #[test]
    fn inactive_rooms_are_hidden_from_name_lookups() {
        let mut tables = CampTables::default();
        let first = room(&mut tables, "R1", 2);
        tables.rooms.get_mut(&first).expect("room exists").active = false;
        let second = room(&mut tables, "R1", 4);

        assert_eq!(
            tables.active_room_by_name("R1").map(|room| room.id),
            Some(second)
        );
        assert!(tables.active_room(first).is_none());
        assert_eq!(tables.active_rooms().count(), 1);
    }

    #[test]
    fn snapshot_round_trip_keeps_sequences_ahead_of_rows() {
        let mut tables = CampTables::default();
        room(&mut tables, "R1", 2);
        let removed = room(&mut tables, "R2", 2);
        tables.rooms.remove(&removed);

        let json = serde_json::to_string(&tables).expect("serializes");
        let mut restored: CampTables = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(restored.rooms.len(), 1);
        assert_eq!(restored.next_room_id(), RoomId(3));
    }

    #[test]
    fn sequences_recover_from_rows_when_missing() {
        let json = r#"{"rooms":[{"id":7,"name":"R7","capacity":3,"active":true}]}"#;
        let mut tables: CampTables = serde_json::from_str(json).expect("deserializes");
        assert_eq!(tables.next_room_id(), RoomId(8));
        assert_eq!(tables.next_laborer_id(), LaborerId(1));
    }
}
