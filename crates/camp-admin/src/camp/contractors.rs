use std::sync::Arc;

use tracing::info;

use super::domain::{
    Contractor, ContractorId, ContractorSubmission, ContractorSummary, ContractorUpdate,
    RecordStatus,
};
use super::error::CampError;
use super::store::{CampRepository, CampTables};
use super::validation;

pub struct ContractorService<R> {
    repository: Arc<R>,
}

fn summarize(tables: &CampTables, contractor: &Contractor) -> ContractorSummary {
    ContractorSummary {
        contractor: contractor.clone(),
        total_laborers: tables.contractor_headcount(contractor.id),
    }
}

impl<R> ContractorService<R>
where
    R: CampRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Active contractors with the number of active laborers they supply.
    pub fn list(&self) -> Result<Vec<ContractorSummary>, CampError> {
        let contractors = self.repository.read(|tables| {
            tables
                .active_contractors()
                .map(|contractor| summarize(tables, contractor))
                .collect()
        })?;
        Ok(contractors)
    }

    pub fn create(&self, submission: ContractorSubmission) -> Result<ContractorSummary, CampError> {
        let name = validation::required("name", &submission.name)?;
        let company_name = validation::required("company name", &submission.company_name)?;
        let phone = validation::phone("phone", &submission.phone)?;
        let email = validation::optional_email(submission.email)?;
        let address = validation::optional(submission.address);
        let reference_from = validation::optional(submission.reference_from);

        let summary = self.repository.transaction(|tables| {
            let id = tables.next_contractor_id();
            let contractor = Contractor {
                id,
                name,
                company_name,
                phone,
                email,
                address,
                reference_from,
                status: RecordStatus::Active,
                active: true,
            };
            let summary = summarize(tables, &contractor);
            tables.contractors.insert(id, contractor);
            Ok::<_, CampError>(summary)
        })?;

        info!(
            contractor_id = %summary.contractor.id,
            company = %summary.contractor.company_name,
            "contractor created"
        );
        Ok(summary)
    }

    pub fn update(
        &self,
        contractor_id: ContractorId,
        update: ContractorUpdate,
    ) -> Result<ContractorSummary, CampError> {
        let name = update
            .name
            .as_deref()
            .map(|value| validation::required("name", value))
            .transpose()?;
        let company_name = update
            .company_name
            .as_deref()
            .map(|value| validation::required("company name", value))
            .transpose()?;
        let phone = update
            .phone
            .as_deref()
            .map(|value| validation::phone("phone", value))
            .transpose()?;
        let email = update
            .email
            .map(validation::optional_email)
            .transpose()?;
        let address = validation::clearable(update.address);
        let reference_from = validation::clearable(update.reference_from);

        let summary = self.repository.transaction(|tables| {
            let contractor = tables
                .active_contractor_mut(contractor_id)
                .ok_or_else(|| CampError::not_found("contractor", contractor_id))?;
            if let Some(name) = name {
                contractor.name = name;
            }
            if let Some(company_name) = company_name {
                contractor.company_name = company_name;
            }
            if let Some(phone) = phone {
                contractor.phone = phone;
            }
            if let Some(email) = email {
                contractor.email = email;
            }
            if let Some(address) = address {
                contractor.address = address;
            }
            if let Some(reference_from) = reference_from {
                contractor.reference_from = reference_from;
            }
            let contractor = contractor.clone();
            Ok::<_, CampError>(summarize(tables, &contractor))
        })?;

        info!(contractor_id = %contractor_id, "contractor updated");
        Ok(summary)
    }

    pub fn set_status(
        &self,
        contractor_id: ContractorId,
        status: RecordStatus,
    ) -> Result<ContractorSummary, CampError> {
        let summary = self.repository.transaction(|tables| {
            let contractor = tables
                .active_contractor_mut(contractor_id)
                .ok_or_else(|| CampError::not_found("contractor", contractor_id))?;
            contractor.status = status;
            let contractor = contractor.clone();
            Ok::<_, CampError>(summarize(tables, &contractor))
        })?;

        info!(contractor_id = %contractor_id, status = status.label(), "contractor status changed");
        Ok(summary)
    }

    /// Soft-delete a contractor. Refused while active laborers still reference them.
    pub fn deactivate(&self, contractor_id: ContractorId) -> Result<Contractor, CampError> {
        let contractor = self.repository.transaction(|tables| {
            if tables.active_contractor(contractor_id).is_none() {
                return Err(CampError::not_found("contractor", contractor_id));
            }
            let headcount = tables.contractor_headcount(contractor_id);
            if headcount > 0 {
                return Err(CampError::conflict(format!(
                    "contractor {contractor_id} still supplies {headcount} active laborer(s)"
                )));
            }

            let contractor = tables
                .active_contractor_mut(contractor_id)
                .ok_or_else(|| CampError::not_found("contractor", contractor_id))?;
            contractor.active = false;
            Ok(contractor.clone())
        })?;

        info!(contractor_id = %contractor_id, "contractor deactivated");
        Ok(contractor)
    }
}
