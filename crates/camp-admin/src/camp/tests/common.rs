use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::auth::{password, Authenticator};
use crate::camp::domain::{
    ContractorId, ContractorSubmission, LaborerId, LaborerRegistration, NewRoom, RoomId,
};
use crate::camp::store::{CampRepository, CampTables, RepositoryError};
use crate::camp::{camp_router, CampAdministration, InMemoryCampRepository};
use crate::config::AuthConfig;

pub(super) type MemoryCamp = CampAdministration<InMemoryCampRepository>;

pub(super) fn administration() -> MemoryCamp {
    CampAdministration::new(Arc::new(InMemoryCampRepository::new()))
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn registration(name: &str, mobile_number: &str) -> LaborerRegistration {
    LaborerRegistration {
        name: name.to_string(),
        date_of_birth: date(1992, 6, 14),
        gender: "Male".to_string(),
        blood_group: Some("B+".to_string()),
        designation: "Mason".to_string(),
        mobile_number: mobile_number.to_string(),
        email: None,
        aadhaar_number: None,
        contractor_id: None,
        reported_to: Some("Site Engineer".to_string()),
        documents: Vec::new(),
    }
}

/// Register `count` laborers with distinct mobile numbers.
pub(super) fn register_laborers(camp: &MemoryCamp, count: usize) -> Vec<LaborerId> {
    (0..count)
        .map(|index| {
            let mobile = format!("98765432{index:02}");
            camp.laborers
                .register(registration(&format!("Laborer {index}"), &mobile))
                .expect("laborer registers")
                .laborer
                .id
        })
        .collect()
}

pub(super) fn room(camp: &MemoryCamp, name: &str, capacity: i64) -> RoomId {
    camp.allocation
        .insert_room(NewRoom {
            name: name.to_string(),
            capacity,
        })
        .expect("room inserts")
        .id
}

pub(super) fn occupancy(camp: &MemoryCamp, room_id: RoomId) -> u32 {
    camp.allocation
        .list_rooms()
        .expect("rooms list")
        .into_iter()
        .find(|room| room.id == room_id)
        .map(|room| room.occupancy)
        .expect("room listed")
}

pub(super) fn contractor(camp: &MemoryCamp, company: &str) -> ContractorId {
    camp.contractors
        .create(ContractorSubmission {
            name: "Suresh Patil".to_string(),
            company_name: company.to_string(),
            phone: "9123456780".to_string(),
            email: Some("suresh@example.com".to_string()),
            address: None,
            reference_from: None,
        })
        .expect("contractor creates")
        .contractor
        .id
}

pub(super) struct UnavailableRepository;

impl CampRepository for UnavailableRepository {
    fn read<T, F>(&self, _query: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&CampTables) -> T,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut CampTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }
}

pub(super) fn authenticator() -> Arc<Authenticator> {
    Arc::new(Authenticator::from_config(&AuthConfig {
        admin_username: "camp_admin".to_string(),
        admin_password_hash: password::hash_password("stella@2024").expect("hash builds"),
        token_secret: "routing-test-secret".to_string(),
        token_ttl_minutes: 30,
    }))
}

pub(super) fn bearer(auth: &Authenticator) -> String {
    let issued = auth.issue_at("camp_admin", Utc::now()).expect("token signs");
    format!("Bearer {}", issued.token)
}

pub(super) fn router_with<R>(camp: CampAdministration<R>) -> (axum::Router, String)
where
    R: CampRepository + 'static,
{
    let auth = authenticator();
    let token = bearer(&auth);
    (camp_router(Arc::new(camp), auth), token)
}

pub(super) fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("json encodes"))
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
