use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    AllocationOutcome, AllocationRequest, AttendanceEntry, AttendanceFilter, AttendanceRecord,
    AttendanceReport, ContractorId, ContractorSubmission, ContractorSummary, ContractorUpdate,
    DashboardSummary, DeallocationOutcome, LaborerId, LaborerRegistration, LaborerUpdate,
    LaborerView, NewRoom, RecordStatus, RoomId, RoomOccupant, RoomSummary, RoomUpdate, StaffId,
    StaffSubmission, StaffUpdate, StaffUser, StatusChange,
};
use super::error::CampError;
use super::extract::{PathParam, Payload, QueryParams};
use super::store::CampRepository;
use super::CampAdministration;
use crate::auth::{login_handler, require_bearer, Authenticator};

type Camp<R> = State<Arc<CampAdministration<R>>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LaborerListQuery {
    #[serde(default)]
    pub(crate) status: Option<RecordStatus>,
}

/// Router builder exposing the administration API.
///
/// Everything except the login route sits behind the bearer token check.
pub fn camp_router<R>(camp: Arc<CampAdministration<R>>, auth: Arc<Authenticator>) -> Router
where
    R: CampRepository + 'static,
{
    let protected = Router::new()
        .route(
            "/api/v1/rooms",
            get(list_rooms_handler::<R>).post(insert_room_handler::<R>),
        )
        .route(
            "/api/v1/rooms/:room_id",
            put(update_room_handler::<R>).delete(deactivate_room_handler::<R>),
        )
        .route(
            "/api/v1/rooms/by-name/:room_name/laborers",
            get(room_occupants_handler::<R>),
        )
        .route(
            "/api/v1/rooms/:room_id/allocations",
            post(allocate_handler::<R>),
        )
        .route(
            "/api/v1/laborers/:laborer_id/room",
            delete(deallocate_handler::<R>),
        )
        .route(
            "/api/v1/laborers",
            get(list_laborers_handler::<R>).post(register_laborer_handler::<R>),
        )
        .route(
            "/api/v1/laborers/:laborer_id",
            get(get_laborer_handler::<R>)
                .put(update_laborer_handler::<R>)
                .delete(deactivate_laborer_handler::<R>),
        )
        .route(
            "/api/v1/laborers/:laborer_id/status",
            put(laborer_status_handler::<R>),
        )
        .route(
            "/api/v1/contractors",
            get(list_contractors_handler::<R>).post(create_contractor_handler::<R>),
        )
        .route(
            "/api/v1/contractors/:contractor_id",
            put(update_contractor_handler::<R>).delete(deactivate_contractor_handler::<R>),
        )
        .route(
            "/api/v1/contractors/:contractor_id/status",
            put(contractor_status_handler::<R>),
        )
        .route(
            "/api/v1/staff",
            get(list_staff_handler::<R>).post(create_staff_handler::<R>),
        )
        .route(
            "/api/v1/staff/:staff_id",
            put(update_staff_handler::<R>).delete(deactivate_staff_handler::<R>),
        )
        .route(
            "/api/v1/staff/:staff_id/status",
            put(staff_status_handler::<R>),
        )
        .route(
            "/api/v1/attendance",
            get(attendance_report_handler::<R>).post(record_attendance_handler::<R>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_bearer))
        .with_state(camp);

    Router::new()
        .route("/api/v1/login", post(login_handler))
        .with_state(auth)
        .merge(protected)
}

pub(crate) async fn list_rooms_handler<R>(
    State(camp): Camp<R>,
) -> Result<Json<Vec<RoomSummary>>, CampError>
where
    R: CampRepository + 'static,
{
    camp.allocation.list_rooms().map(Json)
}

pub(crate) async fn insert_room_handler<R>(
    State(camp): Camp<R>,
    Payload(new_room): Payload<NewRoom>,
) -> Result<(StatusCode, Json<RoomSummary>), CampError>
where
    R: CampRepository + 'static,
{
    let room = camp.allocation.insert_room(new_room)?;
    Ok((StatusCode::CREATED, Json(room)))
}

pub(crate) async fn update_room_handler<R>(
    State(camp): Camp<R>,
    PathParam(room_id): PathParam<RoomId>,
    Payload(update): Payload<RoomUpdate>,
) -> Result<Json<RoomSummary>, CampError>
where
    R: CampRepository + 'static,
{
    camp.allocation.update_room(room_id, update).map(Json)
}

pub(crate) async fn deactivate_room_handler<R>(
    State(camp): Camp<R>,
    PathParam(room_id): PathParam<RoomId>,
) -> Result<StatusCode, CampError>
where
    R: CampRepository + 'static,
{
    camp.allocation.deactivate_room(room_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn room_occupants_handler<R>(
    State(camp): Camp<R>,
    PathParam(room_name): PathParam<String>,
) -> Result<Json<Vec<RoomOccupant>>, CampError>
where
    R: CampRepository + 'static,
{
    camp.allocation.room_occupants(&room_name).map(Json)
}

pub(crate) async fn allocate_handler<R>(
    State(camp): Camp<R>,
    PathParam(room_id): PathParam<RoomId>,
    Payload(request): Payload<AllocationRequest>,
) -> Result<Json<AllocationOutcome>, CampError>
where
    R: CampRepository + 'static,
{
    camp.allocation
        .allocate(room_id, &request.laborer_ids)
        .map(Json)
}

pub(crate) async fn deallocate_handler<R>(
    State(camp): Camp<R>,
    PathParam(laborer_id): PathParam<LaborerId>,
) -> Result<Json<DeallocationOutcome>, CampError>
where
    R: CampRepository + 'static,
{
    camp.allocation.deallocate(laborer_id).map(Json)
}

pub(crate) async fn list_laborers_handler<R>(
    State(camp): Camp<R>,
    QueryParams(query): QueryParams<LaborerListQuery>,
) -> Result<Json<Vec<LaborerView>>, CampError>
where
    R: CampRepository + 'static,
{
    camp.laborers.list(query.status).map(Json)
}

pub(crate) async fn register_laborer_handler<R>(
    State(camp): Camp<R>,
    Payload(registration): Payload<LaborerRegistration>,
) -> Result<(StatusCode, Json<LaborerView>), CampError>
where
    R: CampRepository + 'static,
{
    let laborer = camp.laborers.register(registration)?;
    Ok((StatusCode::CREATED, Json(laborer)))
}

pub(crate) async fn get_laborer_handler<R>(
    State(camp): Camp<R>,
    PathParam(laborer_id): PathParam<LaborerId>,
) -> Result<Json<LaborerView>, CampError>
where
    R: CampRepository + 'static,
{
    camp.laborers.get(laborer_id).map(Json)
}

pub(crate) async fn update_laborer_handler<R>(
    State(camp): Camp<R>,
    PathParam(laborer_id): PathParam<LaborerId>,
    Payload(update): Payload<LaborerUpdate>,
) -> Result<Json<LaborerView>, CampError>
where
    R: CampRepository + 'static,
{
    camp.laborers.update(laborer_id, update).map(Json)
}

pub(crate) async fn laborer_status_handler<R>(
    State(camp): Camp<R>,
    PathParam(laborer_id): PathParam<LaborerId>,
    Payload(change): Payload<StatusChange>,
) -> Result<Json<LaborerView>, CampError>
where
    R: CampRepository + 'static,
{
    camp.laborers.set_status(laborer_id, change.status).map(Json)
}

pub(crate) async fn deactivate_laborer_handler<R>(
    State(camp): Camp<R>,
    PathParam(laborer_id): PathParam<LaborerId>,
) -> Result<StatusCode, CampError>
where
    R: CampRepository + 'static,
{
    camp.laborers.deactivate(laborer_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_contractors_handler<R>(
    State(camp): Camp<R>,
) -> Result<Json<Vec<ContractorSummary>>, CampError>
where
    R: CampRepository + 'static,
{
    camp.contractors.list().map(Json)
}

pub(crate) async fn create_contractor_handler<R>(
    State(camp): Camp<R>,
    Payload(submission): Payload<ContractorSubmission>,
) -> Result<(StatusCode, Json<ContractorSummary>), CampError>
where
    R: CampRepository + 'static,
{
    let contractor = camp.contractors.create(submission)?;
    Ok((StatusCode::CREATED, Json(contractor)))
}

pub(crate) async fn update_contractor_handler<R>(
    State(camp): Camp<R>,
    PathParam(contractor_id): PathParam<ContractorId>,
    Payload(update): Payload<ContractorUpdate>,
) -> Result<Json<ContractorSummary>, CampError>
where
    R: CampRepository + 'static,
{
    camp.contractors.update(contractor_id, update).map(Json)
}

pub(crate) async fn contractor_status_handler<R>(
    State(camp): Camp<R>,
    PathParam(contractor_id): PathParam<ContractorId>,
    Payload(change): Payload<StatusChange>,
) -> Result<Json<ContractorSummary>, CampError>
where
    R: CampRepository + 'static,
{
    camp.contractors
        .set_status(contractor_id, change.status)
        .map(Json)
}

pub(crate) async fn deactivate_contractor_handler<R>(
    State(camp): Camp<R>,
    PathParam(contractor_id): PathParam<ContractorId>,
) -> Result<StatusCode, CampError>
where
    R: CampRepository + 'static,
{
    camp.contractors.deactivate(contractor_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn list_staff_handler<R>(
    State(camp): Camp<R>,
) -> Result<Json<Vec<StaffUser>>, CampError>
where
    R: CampRepository + 'static,
{
    camp.staff.list().map(Json)
}

pub(crate) async fn create_staff_handler<R>(
    State(camp): Camp<R>,
    Payload(submission): Payload<StaffSubmission>,
) -> Result<(StatusCode, Json<StaffUser>), CampError>
where
    R: CampRepository + 'static,
{
    let user = camp.staff.create(submission)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub(crate) async fn update_staff_handler<R>(
    State(camp): Camp<R>,
    PathParam(staff_id): PathParam<StaffId>,
    Payload(update): Payload<StaffUpdate>,
) -> Result<Json<StaffUser>, CampError>
where
    R: CampRepository + 'static,
{
    camp.staff.update(staff_id, update).map(Json)
}

pub(crate) async fn staff_status_handler<R>(
    State(camp): Camp<R>,
    PathParam(staff_id): PathParam<StaffId>,
    Payload(change): Payload<StatusChange>,
) -> Result<Json<StaffUser>, CampError>
where
    R: CampRepository + 'static,
{
    camp.staff.set_status(staff_id, change.status).map(Json)
}

pub(crate) async fn deactivate_staff_handler<R>(
    State(camp): Camp<R>,
    PathParam(staff_id): PathParam<StaffId>,
) -> Result<StatusCode, CampError>
where
    R: CampRepository + 'static,
{
    camp.staff.deactivate(staff_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn record_attendance_handler<R>(
    State(camp): Camp<R>,
    Payload(entry): Payload<AttendanceEntry>,
) -> Result<(StatusCode, Json<AttendanceRecord>), CampError>
where
    R: CampRepository + 'static,
{
    let record = camp.attendance.record(entry)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub(crate) async fn attendance_report_handler<R>(
    State(camp): Camp<R>,
    QueryParams(filter): QueryParams<AttendanceFilter>,
) -> Result<Json<AttendanceReport>, CampError>
where
    R: CampRepository + 'static,
{
    camp.attendance.report(&filter).map(Json)
}

pub(crate) async fn dashboard_handler<R>(
    State(camp): Camp<R>,
) -> Result<Json<DashboardSummary>, CampError>
where
    R: CampRepository + 'static,
{
    camp.dashboard().map(Json)
}
