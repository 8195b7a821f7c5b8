use super::{CatalogStore, PersistenceError, PersistenceResult};
use crate::catalog::{Catalog, Department};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::info;

#[derive(Serialize, Deserialize)]
struct TermRow {
    semester: Option<String>,
    year: Option<String>,
}

pub struct SqliteCatalogStore {
    connection: Mutex<Connection>,
}

impl SqliteCatalogStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS catalog_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                term_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS departments (
                name TEXT PRIMARY KEY,
                department_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection mutex poisoned".into()))
    }

    fn save_term(&self, tx: &rusqlite::Transaction, catalog: &Catalog) -> PersistenceResult<()> {
        let json = serde_json::to_string(&TermRow {
            semester: catalog.semester.clone(),
            year: catalog.year.clone(),
        })?;
        tx.execute("DELETE FROM catalog_metadata", [])?;
        tx.execute(
            "INSERT INTO catalog_metadata (id, term_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_departments(
        &self,
        tx: &rusqlite::Transaction,
        catalog: &Catalog,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM departments", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO departments (name, department_json) VALUES (?1, ?2)")?;
        for department in catalog.departments() {
            let json = serde_json::to_string(department)?;
            stmt.execute(params![department.name, json])?;
        }
        Ok(())
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn save_catalog(&self, catalog: &Catalog) -> PersistenceResult<()> {
        super::validate_catalog(catalog)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_term(&tx, catalog)?;
        self.save_departments(&tx, catalog)?;
        tx.commit()?;
        info!(
            departments = catalog.departments.len(),
            courses = catalog.course_count(),
            "catalog saved to sqlite"
        );
        Ok(())
    }

    fn load_catalog(&self) -> PersistenceResult<Option<Catalog>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT term_json FROM catalog_metadata WHERE id = 1")?;
        let term_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(term_json) = term_json_opt else {
            return Ok(None);
        };
        let term: TermRow = serde_json::from_str(&term_json)?;

        let mut catalog = Catalog::new();
        catalog.semester = term.semester;
        catalog.year = term.year;

        let mut stmt = conn.prepare("SELECT department_json FROM departments ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        for json in rows {
            let json = json?;
            let department: Department = serde_json::from_str(&json)?;
            catalog.add_department(department);
        }

        super::validate_catalog(&catalog)?;
        info!(
            departments = catalog.departments.len(),
            courses = catalog.course_count(),
            "catalog loaded from sqlite"
        );
        Ok(Some(catalog))
    }
}
