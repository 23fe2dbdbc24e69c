use super::domain::{DashboardSummary, RecordStatus};
use super::store::CampTables;

/// Headline counts for the administration dashboard.
pub fn summarize(tables: &CampTables) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    for room in tables.active_rooms() {
        let occupancy = tables.occupancy(&room.name);
        summary.rooms += 1;
        summary.total_capacity += u64::from(room.capacity);
        summary.total_occupancy += u64::from(occupancy);
        if occupancy > 0 {
            summary.occupied_rooms += 1;
        }
    }

    for laborer in tables.active_laborers() {
        match laborer.status {
            RecordStatus::Active => summary.active_laborers += 1,
            RecordStatus::Suspended => summary.suspended_laborers += 1,
        }
        let housed = laborer
            .room
            .as_deref()
            .is_some_and(|name| tables.active_room_by_name(name).is_some());
        if !housed {
            summary.unassigned_laborers += 1;
        }
    }

    summary.contractors = tables.active_contractors().count() as u32;
    summary.staff = tables.active_staff().count() as u32;
    summary
}
