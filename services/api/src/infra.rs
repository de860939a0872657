use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use school_proxy::error::AppError;
use school_proxy::roster::{RosterImporter, SchoolRoster};
use school_proxy::substitution::{InMemorySchoolStore, ProxyPolicy, SubstitutionService};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type SchoolService = SubstitutionService<InMemorySchoolStore, InMemorySchoolStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Hydrate the store from a roster directory, or from the sample school when none is given.
pub(crate) fn load_roster(dir: Option<&Path>) -> Result<SchoolRoster, AppError> {
    match dir {
        Some(dir) => {
            let roster = RosterImporter::from_dir(dir)?;
            info!(
                roster = %dir.display(),
                teachers = roster.teachers.len(),
                periods = roster.periods.len(),
                lessons = roster.timetable.len(),
                "roster imported"
            );
            Ok(roster)
        }
        None => {
            warn!("no roster directory supplied; serving the sample school");
            Ok(crate::demo::sample_school()?)
        }
    }
}

pub(crate) fn build_service(
    roster: SchoolRoster,
    policy: ProxyPolicy,
) -> (Arc<SchoolService>, Arc<InMemorySchoolStore>) {
    let store = Arc::new(InMemorySchoolStore::new(roster));
    let service = SubstitutionService::new(store.clone(), store.clone(), policy);
    (Arc::new(service), store)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
