//! SQLite-backed entity graph.
//!
//! Same node/edge model as [`InMemoryGraph`](crate::InMemoryGraph), stored in
//! five tables so an ingested catalog survives restarts. Develops edges are
//! indexed by skill so `apps_for_skills` is a single indexed join.

use crate::loader::{CatalogPlan, LoadReport};
use crate::matching::MatchAccumulator;
use crate::{EntityGraph, GraphCounts, GraphError, GraphResult};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};
use skillbridge_core::catalog::Catalog;
use skillbridge_core::types::{AppMatch, TaughtSkill};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS skills (
    name TEXT PRIMARY KEY,
    category TEXT NOT NULL,
    aliases TEXT NOT NULL DEFAULT '[]',
    source_count INTEGER NOT NULL DEFAULT 0,
    weight REAL NOT NULL DEFAULT 0.5
);

CREATE TABLE IF NOT EXISTS courses (
    code TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    department TEXT NOT NULL,
    description TEXT NOT NULL,
    units REAL
);

CREATE TABLE IF NOT EXISTS applications (
    app_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    description TEXT NOT NULL,
    features TEXT NOT NULL DEFAULT '[]',
    rating REAL,
    price TEXT
);

CREATE TABLE IF NOT EXISTS teaches (
    course_code TEXT NOT NULL,
    skill_name TEXT NOT NULL,
    weight REAL NOT NULL,
    PRIMARY KEY (course_code, skill_name),
    FOREIGN KEY (course_code) REFERENCES courses(code),
    FOREIGN KEY (skill_name) REFERENCES skills(name)
);

CREATE TABLE IF NOT EXISTS develops (
    app_id TEXT NOT NULL,
    skill_name TEXT NOT NULL,
    weight REAL NOT NULL,
    PRIMARY KEY (app_id, skill_name),
    FOREIGN KEY (app_id) REFERENCES applications(app_id),
    FOREIGN KEY (skill_name) REFERENCES skills(name)
);

CREATE INDEX IF NOT EXISTS idx_develops_skill ON develops(skill_name);
CREATE INDEX IF NOT EXISTS idx_teaches_course ON teaches(course_code);
"#;

/// SQLite implementation of [`EntityGraph`].
///
/// Supports both in-memory and file-backed databases.
pub struct SqliteGraph {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteGraph {
    /// Create a new in-memory SQLite graph.
    pub fn open_in_memory() -> GraphResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_with_connection(conn)
    }

    /// Create or open a file-backed SQLite graph.
    pub fn open<P: AsRef<Path>>(path: P) -> GraphResult<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| GraphError::Connection(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> GraphResult<Self> {
        // journal_mode answers with a row, so it goes through query_row.
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> GraphResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| GraphError::Connection(format!("sqlite lock poisoned: {}", e)))
    }

    /// Replace the stored graph with a validated catalog snapshot.
    pub fn import_catalog(&self, catalog: &Catalog) -> GraphResult<LoadReport> {
        let (plan, report) = CatalogPlan::from_catalog(catalog);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM develops; DELETE FROM teaches; DELETE FROM applications;
             DELETE FROM courses; DELETE FROM skills;",
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO skills (name, category, aliases, source_count, weight)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for skill in &plan.skills {
                stmt.execute(params![
                    skill.name,
                    skill.category.as_str(),
                    to_json(&skill.aliases)?,
                    skill.source_count,
                    skill.weight,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO courses (code, title, department, description, units)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for course in &plan.courses {
                stmt.execute(params![
                    course.code,
                    course.title,
                    course.department,
                    course.description,
                    course.units,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO applications (app_id, name, category, description, features, rating, price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for app in &plan.applications {
                stmt.execute(params![
                    app.app_id,
                    app.name,
                    app.category,
                    app.description,
                    to_json(&app.features)?,
                    app.rating,
                    app.price,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO teaches (course_code, skill_name, weight) VALUES (?1, ?2, ?3)",
            )?;
            for edge in &plan.teaches {
                stmt.execute(params![edge.course_code, edge.skill, edge.weight])?;
            }

            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO develops (app_id, skill_name, weight) VALUES (?1, ?2, ?3)",
            )?;
            for edge in &plan.develops {
                stmt.execute(params![edge.app_id, edge.skill, edge.weight])?;
            }
        }

        tx.commit()?;
        info!(
            skills = report.skills,
            courses = report.courses,
            applications = report.applications,
            "catalog imported into sqlite"
        );
        Ok(report)
    }

    fn count(conn: &Connection, sql: &str) -> GraphResult<usize> {
        let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n.max(0) as usize)
    }
}

fn to_json(values: &[String]) -> GraphResult<String> {
    serde_json::to_string(values).map_err(|e| GraphError::Query(e.to_string()))
}

fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}

#[async_trait]
impl EntityGraph for SqliteGraph {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn apps_for_skills(&self, skills: &[String], top_k: usize) -> GraphResult<Vec<AppMatch>> {
        if skills.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut acc = MatchAccumulator::new(skills);
        let requested: Vec<String> = acc.requested().into_iter().map(str::to_string).collect();
        let sql = format!(
            "SELECT d.app_id, a.name, a.category, a.description, d.skill_name, d.weight
             FROM develops d JOIN applications a ON a.app_id = d.app_id
             WHERE d.skill_name IN ({})",
            placeholders(requested.len())
        );

        {
            let conn = self.lock()?;
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(requested.iter()))?;
            while let Some(row) = rows.next()? {
                let app_id: String = row.get(0)?;
                let name: String = row.get(1)?;
                let category: String = row.get(2)?;
                let description: String = row.get(3)?;
                let skill: String = row.get(4)?;
                let weight: f64 = row.get(5)?;
                acc.add_row(&app_id, &name, &category, &description, &skill, weight);
            }
        }

        let matches = acc.finish(top_k);
        debug!(requested = requested.len(), found = matches.len(), "apps for skills");
        Ok(matches)
    }

    async fn active_skills(&self) -> GraphResult<HashSet<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT d.skill_name FROM develops d
             JOIN applications a ON a.app_id = d.app_id
             JOIN skills s ON s.name = d.skill_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    async fn skills_for_course(&self, course_code: &str) -> GraphResult<Vec<TaughtSkill>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT skill_name, weight FROM teaches WHERE course_code = ?1
             ORDER BY weight DESC, skill_name ASC",
        )?;
        let taught = stmt
            .query_map(params![course_code], |row| {
                Ok(TaughtSkill {
                    name: row.get(0)?,
                    weight: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(taught)
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        let conn = self.lock()?;
        Ok(GraphCounts {
            skills: Self::count(&conn, "SELECT COUNT(*) FROM skills")?,
            courses: Self::count(&conn, "SELECT COUNT(*) FROM courses")?,
            applications: Self::count(&conn, "SELECT COUNT(*) FROM applications")?,
            teaches: Self::count(&conn, "SELECT COUNT(*) FROM teaches")?,
            develops: Self::count(&conn, "SELECT COUNT(*) FROM develops")?,
            active_skills: Self::count(&conn, "SELECT COUNT(DISTINCT skill_name) FROM develops")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillbridge_core::types::*;

    fn catalog() -> Catalog {
        Catalog {
            skills: vec![
                Skill::new("Python", SkillCategory::Technical).with_aliases(["py"]),
                Skill::new("Statistics", SkillCategory::Technical),
                Skill::new("Teamwork", SkillCategory::Soft),
            ],
            courses: vec![
                Course {
                    code: "36-200".into(),
                    title: "Reasoning with Data".into(),
                    department: "Statistics".into(),
                    description: "Intro statistics".into(),
                    units: Some(9.0),
                },
                Course {
                    code: "99-999".into(),
                    title: "Placeholder".into(),
                    department: String::new(),
                    description: "not available".into(),
                    units: None,
                },
            ],
            applications: vec![Application {
                app_id: "datavr".into(),
                name: "DataVR".into(),
                category: "Education".into(),
                description: "Charts in VR".into(),
                features: vec!["multiplayer".into()],
                rating: Some(4.1),
                price: Some("$9.99".into()),
            }],
            teaches: vec![
                Teaches { course_code: "36-200".into(), skill: "Statistics".into(), weight: 0.9 },
                Teaches { course_code: "36-200".into(), skill: "Python".into(), weight: 0.4 },
            ],
            develops: vec![
                Develops { app_id: "datavr".into(), skill: "Statistics".into(), weight: 0.7 },
                Develops { app_id: "datavr".into(), skill: "Python".into(), weight: 0.2 },
            ],
        }
    }

    #[tokio::test]
    async fn import_and_query() {
        let graph = SqliteGraph::open_in_memory().unwrap();
        let report = graph.import_catalog(&catalog()).unwrap();
        assert_eq!(report.skipped_courses, vec!["99-999"]);

        let matches = graph
            .apps_for_skills(&["Python".to_string(), "Statistics".to_string()], 5)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_skills, vec!["Python", "Statistics"]);
        assert!((matches[0].score - 0.9).abs() < 1e-9);

        let active = graph.active_skills().await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(!active.contains("Teamwork"));

        let taught = graph.skills_for_course("36-200").await.unwrap();
        assert_eq!(taught[0].name, "Statistics");
        assert!(graph.skills_for_course("99-999").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.db");

        {
            let graph = SqliteGraph::open(&path).unwrap();
            graph.import_catalog(&catalog()).unwrap();
        }

        let graph = SqliteGraph::open(&path).unwrap();
        let counts = graph.counts().await.unwrap();
        assert_eq!(counts.skills, 3);
        assert_eq!(counts.courses, 1);
        assert_eq!(counts.develops, 2);
        assert_eq!(counts.active_skills, 2);
    }

    #[tokio::test]
    async fn reimport_replaces_snapshot() {
        let graph = SqliteGraph::open_in_memory().unwrap();
        graph.import_catalog(&catalog()).unwrap();

        let mut smaller = catalog();
        smaller.develops.truncate(1);
        graph.import_catalog(&smaller).unwrap();

        assert_eq!(graph.counts().await.unwrap().develops, 1);
    }
}
