pub mod calculations;
pub mod catalog;
pub(crate) mod catalog_validation;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod ranking;
pub mod request;
pub mod schedule;

pub use calculations::conflict::conflicts;
pub use calculations::enumeration::{Enumerator, enumerate};
pub use calculations::statistics::ScheduleStatistics;
pub use catalog::{Catalog, Course, Department, Group, Meeting, Section, SectionSlot};
pub use catalog_validation::CatalogValidationError;
pub use config::{CatalogFormat, ConfigError, ServiceConfig};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteCatalogStore;
pub use persistence::{
    CatalogStore, PersistenceError, load_catalog_from_csv, load_catalog_from_json,
    save_catalog_to_csv, save_catalog_to_json, validate_catalog,
};
pub use ranking::{Comparator, ComparatorFn, rank, resolve_comparator};
pub use request::{CourseRequest, RequestError, ResolvedRequest, resolve_requests};
pub use schedule::{
    Schedule, ScheduleError, ScheduleSearch, ScheduledSection, SearchError, SearchLimits,
    SearchOutcome, find_schedules,
};
