use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::domain::{
    ContractorId, Laborer, LaborerId, LaborerRegistration, LaborerUpdate, LaborerView,
    RecordStatus,
};
use super::error::CampError;
use super::store::{CampRepository, CampTables};
use super::validation;

/// Registration and profile maintenance for laborers.
///
/// Room assignment is owned by [`super::AllocationService`]; nothing here writes it except
/// deactivation, which releases the room so occupancy stays truthful.
pub struct LaborerService<R> {
    repository: Arc<R>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn require_contractor(tables: &CampTables, id: ContractorId) -> Result<(), CampError> {
    tables
        .active_contractor(id)
        .map(|_| ())
        .ok_or_else(|| CampError::not_found("contractor", id))
}

fn ensure_unique_aadhaar(
    tables: &CampTables,
    aadhaar: Option<&str>,
    except: Option<LaborerId>,
) -> Result<(), CampError> {
    let Some(aadhaar) = aadhaar else {
        return Ok(());
    };
    let taken = tables.active_laborers().any(|laborer| {
        Some(laborer.id) != except && laborer.aadhaar_number.as_deref() == Some(aadhaar)
    });
    if taken {
        return Err(CampError::conflict(
            "a registered laborer already uses this aadhaar number",
        ));
    }
    Ok(())
}

fn validate_birth_date(date_of_birth: NaiveDate) -> Result<NaiveDate, CampError> {
    if date_of_birth > today() {
        return Err(CampError::validation("date of birth cannot be in the future"));
    }
    Ok(date_of_birth)
}

impl<R> LaborerService<R>
where
    R: CampRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn register(&self, registration: LaborerRegistration) -> Result<LaborerView, CampError> {
        let name = validation::required("name", &registration.name)?;
        let date_of_birth = validate_birth_date(registration.date_of_birth)?;
        let gender = validation::required("gender", &registration.gender)?;
        let designation = validation::required("designation", &registration.designation)?;
        let mobile_number = validation::phone("mobile number", &registration.mobile_number)?;
        let email = validation::optional_email(registration.email)?;
        let aadhaar_number = validation::aadhaar(registration.aadhaar_number)?;
        let blood_group = validation::optional(registration.blood_group);
        let reported_to = validation::optional(registration.reported_to);
        let contractor_id = registration.contractor_id;
        let documents = registration.documents;

        let laborer = self.repository.transaction(|tables| {
            if let Some(contractor_id) = contractor_id {
                require_contractor(tables, contractor_id)?;
            }
            ensure_unique_aadhaar(tables, aadhaar_number.as_deref(), None)?;

            let id = tables.next_laborer_id();
            let laborer = Laborer {
                id,
                name,
                date_of_birth,
                gender,
                blood_group,
                designation,
                mobile_number,
                email,
                aadhaar_number,
                contractor_id,
                reported_to,
                documents,
                room: None,
                status: RecordStatus::Active,
                active: true,
                registered_at: Utc::now(),
            };
            tables.laborers.insert(id, laborer.clone());
            Ok::<_, CampError>(laborer)
        })?;

        info!(laborer_id = %laborer.id, name = %laborer.name, "laborer registered");
        Ok(laborer.view(today()))
    }

    /// Active laborers, optionally narrowed to one lifecycle status.
    pub fn list(&self, status: Option<RecordStatus>) -> Result<Vec<LaborerView>, CampError> {
        let today = today();
        let laborers = self.repository.read(|tables| {
            tables
                .active_laborers()
                .filter(|laborer| status.map_or(true, |status| laborer.status == status))
                .map(|laborer| laborer.view(today))
                .collect()
        })?;
        Ok(laborers)
    }

    pub fn get(&self, laborer_id: LaborerId) -> Result<LaborerView, CampError> {
        self.repository
            .read(|tables| tables.active_laborer(laborer_id).map(|l| l.view(today())))?
            .ok_or_else(|| CampError::not_found("laborer", laborer_id))
    }

    pub fn update(
        &self,
        laborer_id: LaborerId,
        update: LaborerUpdate,
    ) -> Result<LaborerView, CampError> {
        let name = update
            .name
            .as_deref()
            .map(|value| validation::required("name", value))
            .transpose()?;
        let date_of_birth = update.date_of_birth.map(validate_birth_date).transpose()?;
        let gender = update
            .gender
            .as_deref()
            .map(|value| validation::required("gender", value))
            .transpose()?;
        let designation = update
            .designation
            .as_deref()
            .map(|value| validation::required("designation", value))
            .transpose()?;
        let mobile_number = update
            .mobile_number
            .as_deref()
            .map(|value| validation::phone("mobile number", value))
            .transpose()?;
        let email = update
            .email
            .map(validation::optional_email)
            .transpose()?;
        let aadhaar_number = update
            .aadhaar_number
            .map(validation::aadhaar)
            .transpose()?;
        let blood_group = validation::clearable(update.blood_group);
        let reported_to = validation::clearable(update.reported_to);

        let laborer = self.repository.transaction(|tables| {
            if tables.active_laborer(laborer_id).is_none() {
                return Err(CampError::not_found("laborer", laborer_id));
            }
            if let Some(Some(contractor_id)) = update.contractor_id {
                require_contractor(tables, contractor_id)?;
            }
            if let Some(Some(number)) = &aadhaar_number {
                ensure_unique_aadhaar(tables, Some(number.as_str()), Some(laborer_id))?;
            }

            let laborer = tables
                .active_laborer_mut(laborer_id)
                .ok_or_else(|| CampError::not_found("laborer", laborer_id))?;
            if let Some(name) = name {
                laborer.name = name;
            }
            if let Some(date_of_birth) = date_of_birth {
                laborer.date_of_birth = date_of_birth;
            }
            if let Some(gender) = gender {
                laborer.gender = gender;
            }
            if let Some(designation) = designation {
                laborer.designation = designation;
            }
            if let Some(mobile_number) = mobile_number {
                laborer.mobile_number = mobile_number;
            }
            if let Some(email) = email {
                laborer.email = email;
            }
            if let Some(aadhaar_number) = aadhaar_number {
                laborer.aadhaar_number = aadhaar_number;
            }
            if let Some(blood_group) = blood_group {
                laborer.blood_group = blood_group;
            }
            if let Some(reported_to) = reported_to {
                laborer.reported_to = reported_to;
            }
            if let Some(contractor_id) = update.contractor_id {
                laborer.contractor_id = contractor_id;
            }
            if let Some(documents) = update.documents {
                laborer.documents = documents;
            }
            Ok(laborer.clone())
        })?;

        info!(laborer_id = %laborer_id, "laborer profile updated");
        Ok(laborer.view(today()))
    }

    pub fn set_status(
        &self,
        laborer_id: LaborerId,
        status: RecordStatus,
    ) -> Result<LaborerView, CampError> {
        let laborer = self.repository.transaction(|tables| {
            let laborer = tables
                .active_laborer_mut(laborer_id)
                .ok_or_else(|| CampError::not_found("laborer", laborer_id))?;
            laborer.status = status;
            Ok::<_, CampError>(laborer.clone())
        })?;

        info!(laborer_id = %laborer_id, status = status.label(), "laborer status changed");
        Ok(laborer.view(today()))
    }

    /// Soft-delete a laborer, releasing any room they hold.
    pub fn deactivate(&self, laborer_id: LaborerId) -> Result<Laborer, CampError> {
        let laborer = self.repository.transaction(|tables| {
            let laborer = tables
                .active_laborer_mut(laborer_id)
                .ok_or_else(|| CampError::not_found("laborer", laborer_id))?;
            laborer.active = false;
            laborer.room = None;
            Ok::<_, CampError>(laborer.clone())
        })?;

        info!(laborer_id = %laborer_id, "laborer deactivated");
        Ok(laborer)
    }
}
