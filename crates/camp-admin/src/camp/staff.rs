use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{RecordStatus, StaffId, StaffSubmission, StaffUpdate, StaffUser};
use super::error::CampError;
use super::store::{CampRepository, CampTables};
use super::validation;

/// Login-management records for site staff.
pub struct StaffService<R> {
    repository: Arc<R>,
}

fn ensure_unique_email(
    tables: &CampTables,
    email: &str,
    except: Option<StaffId>,
) -> Result<(), CampError> {
    if tables
        .active_staff()
        .any(|user| Some(user.id) != except && user.email == email)
    {
        return Err(CampError::conflict(format!(
            "a staff user with email '{email}' already exists"
        )));
    }
    Ok(())
}

impl<R> StaffService<R>
where
    R: CampRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn list(&self) -> Result<Vec<StaffUser>, CampError> {
        let users = self
            .repository
            .read(|tables| tables.active_staff().cloned().collect())?;
        Ok(users)
    }

    pub fn create(&self, submission: StaffSubmission) -> Result<StaffUser, CampError> {
        let name = validation::required("name", &submission.name)?;
        let designation = validation::required("designation", &submission.designation)?;
        let phone = validation::phone("phone", &submission.phone)?;
        let email = validation::email(&submission.email)?;

        let user = self.repository.transaction(|tables| {
            ensure_unique_email(tables, &email, None)?;
            let now = Utc::now();
            let id = tables.next_staff_id();
            let user = StaffUser {
                id,
                name,
                designation,
                phone,
                email,
                status: RecordStatus::Active,
                active: true,
                created_at: now,
                updated_at: now,
            };
            tables.staff.insert(id, user.clone());
            Ok::<_, CampError>(user)
        })?;

        info!(staff_id = %user.id, email = %user.email, "staff user created");
        Ok(user)
    }

    pub fn update(&self, staff_id: StaffId, update: StaffUpdate) -> Result<StaffUser, CampError> {
        let name = update
            .name
            .as_deref()
            .map(|value| validation::required("name", value))
            .transpose()?;
        let designation = update
            .designation
            .as_deref()
            .map(|value| validation::required("designation", value))
            .transpose()?;
        let phone = update
            .phone
            .as_deref()
            .map(|value| validation::phone("phone", value))
            .transpose()?;
        let email = update
            .email
            .as_deref()
            .map(validation::email)
            .transpose()?;

        let user = self.repository.transaction(|tables| {
            if let Some(email) = &email {
                ensure_unique_email(tables, email, Some(staff_id))?;
            }
            let user = tables
                .active_staff_mut(staff_id)
                .ok_or_else(|| CampError::not_found("staff user", staff_id))?;
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(designation) = designation {
                user.designation = designation;
            }
            if let Some(phone) = phone {
                user.phone = phone;
            }
            if let Some(email) = email {
                user.email = email;
            }
            user.updated_at = Utc::now();
            Ok::<_, CampError>(user.clone())
        })?;

        info!(staff_id = %staff_id, "staff user updated");
        Ok(user)
    }

    pub fn set_status(&self, staff_id: StaffId, status: RecordStatus) -> Result<StaffUser, CampError> {
        let user = self.repository.transaction(|tables| {
            let user = tables
                .active_staff_mut(staff_id)
                .ok_or_else(|| CampError::not_found("staff user", staff_id))?;
            user.status = status;
            user.updated_at = Utc::now();
            Ok::<_, CampError>(user.clone())
        })?;

        info!(staff_id = %staff_id, status = status.label(), "staff status changed");
        Ok(user)
    }

    pub fn deactivate(&self, staff_id: StaffId) -> Result<StaffUser, CampError> {
        let user = self.repository.transaction(|tables| {
            let user = tables
                .active_staff_mut(staff_id)
                .ok_or_else(|| CampError::not_found("staff user", staff_id))?;
            user.active = false;
            user.updated_at = Utc::now();
            Ok::<_, CampError>(user.clone())
        })?;

        info!(staff_id = %staff_id, "staff user deactivated");
        Ok(user)
    }
}
