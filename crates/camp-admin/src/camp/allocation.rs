//! Room inventory and the capacity-bounded allocation rule.
//!
//! Occupancy is never stored: it is the number of active laborers whose current room names the
//! room. Allocation checks capacity and writes every laborer inside one store transaction, so a
//! rejected or failed request leaves all assignments untouched.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{
    AllocationOutcome, DeallocationOutcome, LaborerId, NewRoom, RecordStatus, Room, RoomId,
    RoomOccupant, RoomSummary, RoomUpdate,
};
use super::error::CampError;
use super::store::CampRepository;
use super::validation;

pub struct AllocationService<R> {
    repository: Arc<R>,
}

impl<R> AllocationService<R>
where
    R: CampRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Every active room with its computed occupancy.
    pub fn list_rooms(&self) -> Result<Vec<RoomSummary>, CampError> {
        let rooms = self.repository.read(|tables| {
            tables
                .active_rooms()
                .map(|room| tables.room_summary(room))
                .collect()
        })?;
        Ok(rooms)
    }

    /// Active laborers currently assigned to `room_name`. An unknown name yields an empty list.
    pub fn room_occupants(&self, room_name: &str) -> Result<Vec<RoomOccupant>, CampError> {
        let occupants = self.repository.read(|tables| {
            tables
                .occupants(room_name)
                .map(|laborer| laborer.occupant())
                .collect()
        })?;
        Ok(occupants)
    }

    /// Assign `laborer_ids` to the room, all or nothing.
    ///
    /// Laborers already in another room are moved. Laborers already in this room count once.
    pub fn allocate(
        &self,
        room_id: RoomId,
        laborer_ids: &[LaborerId],
    ) -> Result<AllocationOutcome, CampError> {
        let requested: BTreeSet<LaborerId> = laborer_ids.iter().copied().collect();
        if requested.is_empty() {
            return Err(CampError::validation(
                "at least one laborer id is required for allocation",
            ));
        }

        let result = self.repository.transaction(|tables| {
            let room = tables
                .active_room(room_id)
                .cloned()
                .ok_or_else(|| CampError::not_found("room", room_id))?;

            for id in &requested {
                let laborer = tables
                    .active_laborer(*id)
                    .ok_or_else(|| CampError::not_found("laborer", id))?;
                if laborer.status == RecordStatus::Suspended {
                    return Err(CampError::validation(format!(
                        "laborer {id} is suspended and cannot be allocated"
                    )));
                }
            }

            let retained = tables
                .occupants(&room.name)
                .filter(|laborer| !requested.contains(&laborer.id))
                .count() as u32;
            let requested_count = requested.len() as u32;
            if retained + requested_count > room.capacity {
                return Err(CampError::CapacityExceeded {
                    room: room.name.clone(),
                    capacity: room.capacity,
                    retained,
                    requested: requested_count,
                });
            }

            for id in &requested {
                if let Some(laborer) = tables.active_laborer_mut(*id) {
                    laborer.room = Some(room.name.clone());
                }
            }

            Ok(AllocationOutcome {
                room: tables.room_summary(&room),
                allocated: requested.iter().copied().collect(),
            })
        });

        match &result {
            Ok(outcome) => info!(
                room = %outcome.room.name,
                allocated = outcome.allocated.len(),
                occupancy = outcome.room.occupancy,
                capacity = outcome.room.capacity,
                "laborers allocated"
            ),
            Err(err @ CampError::CapacityExceeded { .. }) => {
                warn!(room_id = %room_id, error = %err, "allocation rejected")
            }
            Err(_) => {}
        }
        result
    }

    /// Clear a laborer's room. Succeeds without change when they hold no room.
    pub fn deallocate(&self, laborer_id: LaborerId) -> Result<DeallocationOutcome, CampError> {
        let outcome = self.repository.transaction(|tables| {
            let laborer = tables
                .active_laborer_mut(laborer_id)
                .ok_or_else(|| CampError::not_found("laborer", laborer_id))?;
            Ok::<_, CampError>(DeallocationOutcome {
                laborer_id,
                released_from: laborer.room.take(),
            })
        })?;

        if let Some(room) = &outcome.released_from {
            info!(laborer_id = %laborer_id, room = %room, "laborer deallocated");
        }
        Ok(outcome)
    }

    pub fn insert_room(&self, new_room: NewRoom) -> Result<RoomSummary, CampError> {
        let name = validation::required("room name", &new_room.name)?;
        let capacity = validation::capacity(new_room.capacity)?;

        let summary = self.repository.transaction(|tables| {
            if tables.active_room_by_name(&name).is_some() {
                return Err(CampError::conflict(format!("room '{name}' already exists")));
            }

            let id = tables.next_room_id();
            let room = Room {
                id,
                name: name.clone(),
                capacity,
                active: true,
            };
            let summary = tables.room_summary(&room);
            tables.rooms.insert(id, room);
            Ok(summary)
        })?;

        info!(room_id = %summary.id, room = %summary.name, capacity, "room created");
        Ok(summary)
    }

    /// Rename and/or resize a room.
    ///
    /// A rename rewrites the room reference of every occupant in the same transaction. Capacity
    /// may not drop below the current occupancy.
    pub fn update_room(
        &self,
        room_id: RoomId,
        update: RoomUpdate,
    ) -> Result<RoomSummary, CampError> {
        let new_name = update
            .name
            .as_deref()
            .map(|name| validation::required("room name", name))
            .transpose()?;
        let new_capacity = update.capacity.map(validation::capacity).transpose()?;

        let summary = self.repository.transaction(|tables| {
            let current = tables
                .active_room(room_id)
                .cloned()
                .ok_or_else(|| CampError::not_found("room", room_id))?;
            let occupancy = tables.occupancy(&current.name);

            let renamed = new_name.filter(|name| *name != current.name);
            if let Some(name) = &renamed {
                if tables.active_room_by_name(name).is_some() {
                    return Err(CampError::conflict(format!("room '{name}' already exists")));
                }
            }

            if let Some(capacity) = new_capacity {
                if capacity < occupancy {
                    return Err(CampError::conflict(format!(
                        "room '{}' has {occupancy} occupant(s); capacity cannot drop to {capacity}",
                        current.name
                    )));
                }
            }

            if let Some(name) = &renamed {
                for laborer in tables.laborers.values_mut() {
                    if laborer.room.as_deref() == Some(current.name.as_str()) {
                        laborer.room = Some(name.clone());
                    }
                }
            }

            let room = tables
                .active_room_mut(room_id)
                .ok_or_else(|| CampError::not_found("room", room_id))?;
            if let Some(name) = renamed {
                room.name = name;
            }
            if let Some(capacity) = new_capacity {
                room.capacity = capacity;
            }
            let room = room.clone();
            Ok(tables.room_summary(&room))
        })?;

        info!(
            room_id = %room_id,
            room = %summary.name,
            capacity = summary.capacity,
            "room updated"
        );
        Ok(summary)
    }

    /// Soft-delete a room. Refused while any laborer is still assigned to it.
    pub fn deactivate_room(&self, room_id: RoomId) -> Result<Room, CampError> {
        let room = self.repository.transaction(|tables| {
            let name = tables
                .active_room(room_id)
                .map(|room| room.name.clone())
                .ok_or_else(|| CampError::not_found("room", room_id))?;

            let occupancy = tables.occupancy(&name);
            if occupancy > 0 {
                return Err(CampError::conflict(format!(
                    "room '{name}' still has {occupancy} occupant(s); deallocate them first"
                )));
            }

            let room = tables
                .active_room_mut(room_id)
                .ok_or_else(|| CampError::not_found("room", room_id))?;
            room.active = false;
            Ok(room.clone())
        })?;

        info!(room_id = %room_id, room = %room.name, "room deactivated");
        Ok(room)
    }
}
