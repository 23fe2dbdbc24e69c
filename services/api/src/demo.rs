use camp_admin::camp::{
    AllocationOutcome, CampAdministration, CampError, InMemoryCampRepository, LaborerId,
    LaborerRegistration, NewRoom, RoomId,
};
use camp_admin::error::AppError;
use chrono::NaiveDate;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Beds in the demo room.
    #[arg(long, default_value_t = 2)]
    pub(crate) capacity: i64,
    /// Laborers registered for the walkthrough; one more than the capacity shows a rejection.
    #[arg(long)]
    pub(crate) laborers: Option<usize>,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            capacity: 2,
            laborers: None,
        }
    }
}

type DemoCamp = CampAdministration<InMemoryCampRepository>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { capacity, laborers } = args;
    let headcount =
        laborers.unwrap_or_else(|| usize::try_from(capacity.max(1)).unwrap_or(1) + 1);

    let camp = CampAdministration::new(Arc::new(InMemoryCampRepository::new()));
    println!("Camp room allocation demo");

    let room = camp.allocation.insert_room(NewRoom {
        name: "R1".to_string(),
        capacity,
    })?;
    println!("- Created room {} with {} beds", room.name, room.capacity);

    let ids = register_crew(&camp, headcount)?;
    println!(
        "- Registered {} laborers (ids {})",
        ids.len(),
        join_ids(&ids)
    );

    let fits = ids.len().min(room.capacity as usize);
    let (first, rest) = ids.split_at(fits);
    if !first.is_empty() {
        report_allocation(&camp, room.id, first)?;
    }

    if let Some(next) = rest.first() {
        report_allocation(&camp, room.id, &[*next])?;

        let released = first[0];
        let outcome = camp.allocation.deallocate(released)?;
        println!(
            "- Deallocated laborer {} from {}",
            released,
            outcome.released_from.as_deref().unwrap_or("no room")
        );
        print_occupancy(&camp, room.id)?;

        report_allocation(&camp, room.id, &[*next])?;
    }

    println!("\nOccupants of {}:", room.name);
    for occupant in camp.allocation.room_occupants(&room.name)? {
        println!(
            "  - #{} {} ({})",
            occupant.id, occupant.name, occupant.mobile_number
        );
    }

    let summary = camp.dashboard()?;
    println!(
        "\nDashboard: {} room(s) | {}/{} beds used | {} unassigned laborer(s)",
        summary.rooms, summary.total_occupancy, summary.total_capacity, summary.unassigned_laborers
    );
    Ok(())
}

fn register_crew(camp: &DemoCamp, headcount: usize) -> Result<Vec<LaborerId>, CampError> {
    (0..headcount)
        .map(|index| {
            let registration = LaborerRegistration {
                name: format!("Demo Laborer {}", index + 1),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1 + (index % 28) as u32)
                    .unwrap_or(NaiveDate::MIN),
                gender: "Male".to_string(),
                blood_group: None,
                designation: "Helper".to_string(),
                mobile_number: format!("90000{:05}", index),
                email: None,
                aadhaar_number: None,
                contractor_id: None,
                reported_to: None,
                documents: Vec::new(),
            };
            camp.laborers
                .register(registration)
                .map(|view| view.laborer.id)
        })
        .collect()
}

/// Capacity rejections are part of the walkthrough; every other failure aborts it.
fn report_allocation(
    camp: &DemoCamp,
    room_id: RoomId,
    ids: &[LaborerId],
) -> Result<Option<AllocationOutcome>, CampError> {
    match camp.allocation.allocate(room_id, ids) {
        Ok(outcome) => {
            println!(
                "- Allocated [{}] to {} -> occupancy {}/{}",
                join_ids(&outcome.allocated),
                outcome.room.name,
                outcome.room.occupancy,
                outcome.room.capacity
            );
            Ok(Some(outcome))
        }
        Err(err @ CampError::CapacityExceeded { .. }) => {
            println!("- Allocation of [{}] rejected: {}", join_ids(ids), err);
            print_occupancy(camp, room_id)?;
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn print_occupancy(camp: &DemoCamp, room_id: RoomId) -> Result<(), CampError> {
    if let Some(room) = camp
        .allocation
        .list_rooms()?
        .into_iter()
        .find(|room| room.id == room_id)
    {
        println!(
            "  {} occupancy {}/{} ({} free)",
            room.name,
            room.occupancy,
            room.capacity,
            room.available()
        );
    }
    Ok(())
}

fn join_ids(ids: &[LaborerId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_the_capacity_walkthrough() {
        run_demo(DemoArgs::default()).expect("demo completes");
    }

    #[test]
    fn demo_rejects_invalid_capacity() {
        let result = run_demo(DemoArgs {
            capacity: 0,
            laborers: None,
        });
        assert!(matches!(
            result,
            Err(AppError::Camp(CampError::Validation(_)))
        ));
    }

    #[test]
    fn capacity_rejection_leaves_room_unchanged() {
        let camp = CampAdministration::new(Arc::new(InMemoryCampRepository::new()));
        let room = camp
            .allocation
            .insert_room(NewRoom {
                name: "R1".to_string(),
                capacity: 1,
            })
            .expect("room inserts");
        let ids = register_crew(&camp, 2).expect("crew registers");

        assert!(report_allocation(&camp, room.id, &ids[..1])
            .expect("allocates")
            .is_some());
        assert!(report_allocation(&camp, room.id, &ids[1..])
            .expect("rejection is reported")
            .is_none());
        assert_eq!(camp.allocation.list_rooms().expect("lists")[0].occupancy, 1);
    }
}
