#![cfg(feature = "sqlite")]

mod common;

use common::{courses, lecture, sample_catalog};
use section_scheduler::{
    Catalog, CatalogStore, Course, Department, Group, SqliteCatalogStore, find_schedules,
};
use tempfile::NamedTempFile;

#[test]
fn sqlite_store_round_trip_catalog() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteCatalogStore::new(file.path()).unwrap();
    let catalog = sample_catalog();

    store.save_catalog(&catalog).expect("save catalog");
    let loaded = store
        .load_catalog()
        .expect("load catalog")
        .expect("catalog exists");

    assert_eq!(loaded, catalog);
    let requested = courses(&loaded, &[("CIS", "120"), ("MATH", "104")]);
    assert_eq!(find_schedules(&requested, "early", "minDays").unwrap().len(), 5);
}

#[test]
fn empty_store_has_no_catalog() {
    let store = SqliteCatalogStore::in_memory().unwrap();
    assert!(store.load_catalog().unwrap().is_none());
}

#[test]
fn saving_replaces_previous_catalog() {
    let store = SqliteCatalogStore::in_memory().unwrap();
    store.save_catalog(&sample_catalog()).unwrap();

    let replacement = Catalog::new().with_term("Spring", "2014").with_department(
        Department::new("PHYS").with_course(
            Course::new("PHYS", "150", "Principles of Physics I", 1.5)
                .with_group(Group::new().with_section(lecture("001", "MWF", 11.0, 12.0))),
        ),
    );
    store.save_catalog(&replacement).unwrap();

    let loaded = store.load_catalog().unwrap().unwrap();
    assert_eq!(loaded, replacement);
    assert!(loaded.department("CIS").is_none());
    assert_eq!(loaded.term_label().as_deref(), Some("Spring 2014"));
}

#[test]
fn store_survives_reopening() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteCatalogStore::new(file.path()).unwrap();
        store.save_catalog(&sample_catalog()).unwrap();
    }
    let reopened = SqliteCatalogStore::new(file.path()).unwrap();
    let loaded = reopened.load_catalog().unwrap().unwrap();
    assert_eq!(loaded.course_count(), 3);
}
