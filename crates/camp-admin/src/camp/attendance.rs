use std::sync::Arc;

use tracing::info;

use super::domain::{
    AttendanceEntry, AttendanceFilter, AttendanceRecord, AttendanceReport, AttendanceStatus,
    AttendanceSummary, AttendanceView,
};
use super::error::CampError;
use super::store::{CampRepository, CampTables};

pub struct AttendanceService<R> {
    repository: Arc<R>,
}

fn validate_times(entry: &AttendanceEntry) -> Result<(), CampError> {
    match entry.status {
        AttendanceStatus::Absent => {
            if entry.check_in.is_some() || entry.check_out.is_some() {
                return Err(CampError::validation(
                    "absent entries cannot carry check-in or check-out times",
                ));
            }
        }
        _ => {
            if entry.check_in.is_none() {
                return Err(CampError::validation("check-in time is required"));
            }
        }
    }

    if let (Some(check_in), Some(check_out)) = (entry.check_in, entry.check_out) {
        if check_out < check_in {
            return Err(CampError::validation(
                "check-out time cannot be earlier than check-in",
            ));
        }
    }
    Ok(())
}

fn view(tables: &CampTables, record: &AttendanceRecord) -> AttendanceView {
    let laborer = tables.laborers.get(&record.laborer_id);
    let contractor = laborer
        .and_then(|laborer| laborer.contractor_id)
        .and_then(|id| tables.contractors.get(&id))
        .map(|contractor| contractor.company_name.clone());

    AttendanceView {
        id: record.id,
        laborer_id: record.laborer_id,
        laborer_name: laborer
            .map(|laborer| laborer.name.clone())
            .unwrap_or_default(),
        contractor,
        date: record.date,
        check_in: record.check_in,
        check_out: record.check_out,
        status: record.status,
    }
}

fn matches(tables: &CampTables, record: &AttendanceRecord, filter: &AttendanceFilter) -> bool {
    if filter.date.is_some_and(|date| record.date != date) {
        return false;
    }
    if filter.status.is_some_and(|status| record.status != status) {
        return false;
    }
    if let Some(contractor_id) = filter.contractor_id {
        let supplied_by = tables
            .laborers
            .get(&record.laborer_id)
            .and_then(|laborer| laborer.contractor_id);
        if supplied_by != Some(contractor_id) {
            return false;
        }
    }
    true
}

/// Count records per status. The rate treats late arrivals as attended.
pub fn summarize(records: &[AttendanceView]) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        total: records.len() as u32,
        ..AttendanceSummary::default()
    };
    for record in records {
        match record.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::Absent => summary.absent += 1,
            AttendanceStatus::HalfDay => summary.half_day += 1,
        }
    }
    if summary.total > 0 {
        let attended = f64::from(summary.present + summary.late);
        let rate = attended / f64::from(summary.total) * 100.0;
        summary.attendance_rate = (rate * 10.0).round() / 10.0;
    }
    summary
}

impl<R> AttendanceService<R>
where
    R: CampRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Record one day's attendance for a laborer. A second entry for the same day conflicts.
    pub fn record(&self, entry: AttendanceEntry) -> Result<AttendanceRecord, CampError> {
        validate_times(&entry)?;

        let record = self.repository.transaction(|tables| {
            if tables.active_laborer(entry.laborer_id).is_none() {
                return Err(CampError::not_found("laborer", entry.laborer_id));
            }
            let duplicate = tables
                .attendance
                .values()
                .any(|record| record.laborer_id == entry.laborer_id && record.date == entry.date);
            if duplicate {
                return Err(CampError::conflict(format!(
                    "attendance for laborer {} on {} is already recorded",
                    entry.laborer_id, entry.date
                )));
            }

            let id = tables.next_attendance_id();
            let record = AttendanceRecord {
                id,
                laborer_id: entry.laborer_id,
                date: entry.date,
                check_in: entry.check_in,
                check_out: entry.check_out,
                status: entry.status,
            };
            tables.attendance.insert(id, record.clone());
            Ok(record)
        })?;

        info!(
            laborer_id = %record.laborer_id,
            date = %record.date,
            status = ?record.status,
            "attendance recorded"
        );
        Ok(record)
    }

    /// Filtered records, newest date first, with per-status totals.
    pub fn report(&self, filter: &AttendanceFilter) -> Result<AttendanceReport, CampError> {
        let mut records: Vec<AttendanceView> = self.repository.read(|tables| {
            tables
                .attendance
                .values()
                .filter(|record| matches(tables, record, filter))
                .map(|record| view(tables, record))
                .collect()
        })?;
        records.sort_by(|a, b| b.date.cmp(&a.date).then(a.laborer_name.cmp(&b.laborer_name)));

        let summary = summarize(&records);
        Ok(AttendanceReport { records, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camp::domain::{AttendanceId, LaborerId};
    use chrono::NaiveDate;

    fn view_with(status: AttendanceStatus) -> AttendanceView {
        AttendanceView {
            id: AttendanceId(1),
            laborer_id: LaborerId(1),
            laborer_name: "Raj Kumar".to_string(),
            contractor: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).expect("valid"),
            check_in: None,
            check_out: None,
            status,
        }
    }

    #[test]
    fn summary_counts_late_as_attended() {
        let records = vec![
            view_with(AttendanceStatus::Present),
            view_with(AttendanceStatus::Late),
            view_with(AttendanceStatus::Absent),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.attendance_rate, 66.7);
    }

    #[test]
    fn empty_report_has_zero_rate() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.attendance_rate, 0.0);
    }
}
