//! Catalog validation shared by every graph backend.
//!
//! A [`CatalogPlan`] is the subset of a catalog that may enter the graph:
//! placeholder courses removed, edges with unknown endpoints or out-of-range
//! weights dropped, repeated edges collapsed to their first row. Everything
//! dropped is recorded in the [`LoadReport`].

use serde::Serialize;
use skillbridge_core::catalog::Catalog;
use skillbridge_core::types::{check_weight, Application, Course, Develops, Skill, Teaches};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Outcome of loading a catalog into a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub skills: usize,
    pub courses: usize,
    pub applications: usize,
    pub teaches: usize,
    pub develops: usize,
    /// Course codes skipped for having no usable description.
    pub skipped_courses: Vec<String>,
    /// Human-readable reasons for every dropped edge.
    pub skipped_edges: Vec<String>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_courses.is_empty() && self.skipped_edges.is_empty()
    }
}

/// The validated rows of a catalog, ready to insert.
#[derive(Debug, Clone, Default)]
pub struct CatalogPlan {
    pub skills: Vec<Skill>,
    pub courses: Vec<Course>,
    pub applications: Vec<Application>,
    pub teaches: Vec<Teaches>,
    pub develops: Vec<Develops>,
}

impl CatalogPlan {
    /// Validate `catalog`, returning what may be loaded and a report of the rest.
    pub fn from_catalog(catalog: &Catalog) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut plan = CatalogPlan::default();

        let mut skill_names = HashSet::new();
        for skill in &catalog.skills {
            if skill_names.insert(skill.name.as_str()) {
                plan.skills.push(skill.clone());
            }
        }

        let mut course_codes = HashSet::new();
        for course in &catalog.courses {
            if !course.has_usable_description() {
                warn!(course = %course.code, "skipping course without a usable description");
                report.skipped_courses.push(course.code.clone());
                continue;
            }
            if course_codes.insert(course.code.as_str()) {
                plan.courses.push(course.clone());
            }
        }

        let mut app_ids = HashSet::new();
        for app in &catalog.applications {
            if app_ids.insert(app.app_id.as_str()) {
                plan.applications.push(app.clone());
            }
        }

        let mut taught = HashSet::new();
        for edge in &catalog.teaches {
            let label = format!("teaches({} -> {})", edge.course_code, edge.skill);
            if !course_codes.contains(edge.course_code.as_str()) {
                skip_edge(&mut report, label, "unknown or skipped course");
            } else if !skill_names.contains(edge.skill.as_str()) {
                skip_edge(&mut report, label, "unknown skill");
            } else if let Err(e) = check_weight("teaches.weight", edge.weight) {
                skip_edge(&mut report, label, &e.to_string());
            } else if !taught.insert((edge.course_code.as_str(), edge.skill.as_str())) {
                skip_edge(&mut report, label, "duplicate edge, first weight kept");
            } else {
                plan.teaches.push(edge.clone());
            }
        }

        let mut developed = HashSet::new();
        for edge in &catalog.develops {
            let label = format!("develops({} -> {})", edge.app_id, edge.skill);
            if !app_ids.contains(edge.app_id.as_str()) {
                skip_edge(&mut report, label, "unknown application");
            } else if !skill_names.contains(edge.skill.as_str()) {
                skip_edge(&mut report, label, "unknown skill");
            } else if let Err(e) = check_weight("develops.weight", edge.weight) {
                skip_edge(&mut report, label, &e.to_string());
            } else if !developed.insert((edge.app_id.as_str(), edge.skill.as_str())) {
                skip_edge(&mut report, label, "duplicate edge, first weight kept");
            } else {
                plan.develops.push(edge.clone());
            }
        }

        report.skills = plan.skills.len();
        report.courses = plan.courses.len();
        report.applications = plan.applications.len();
        report.teaches = plan.teaches.len();
        report.develops = plan.develops.len();

        debug!(
            skills = report.skills,
            courses = report.courses,
            applications = report.applications,
            skipped_courses = report.skipped_courses.len(),
            skipped_edges = report.skipped_edges.len(),
            "catalog validated"
        );

        (plan, report)
    }
}

fn skip_edge(report: &mut LoadReport, label: String, reason: &str) {
    warn!(edge = %label, reason, "skipping edge");
    report.skipped_edges.push(format!("{}: {}", label, reason));
}
