//! In-memory entity graph on petgraph.
//!
//! Nodes live in a directed `Graph`; three `HashMap` indices map course codes,
//! skill names and application ids to petgraph node indices. The graph is
//! built once and then only read, so queries take `&self` without locking.

use crate::loader::{CatalogPlan, LoadReport};
use crate::matching::MatchAccumulator;
use crate::{EntityGraph, GraphCounts, GraphError, GraphResult};
use async_trait::async_trait;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use skillbridge_core::catalog::Catalog;
use skillbridge_core::types::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Node payload.
#[derive(Debug, Clone)]
pub enum EntityNode {
    Skill(Skill),
    Course(Course),
    Application(Application),
}

/// Edge payload. Direction is always towards the skill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relation {
    Teaches { weight: f64 },
    Develops { weight: f64 },
}

/// Petgraph-backed implementation of the entity graph.
pub struct InMemoryGraph {
    graph: Graph<EntityNode, Relation>,
    skills: HashMap<String, NodeIndex>,
    courses: HashMap<String, NodeIndex>,
    applications: HashMap<String, NodeIndex>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            skills: HashMap::new(),
            courses: HashMap::new(),
            applications: HashMap::new(),
        }
    }

    /// Build a graph from a catalog, skipping placeholder courses and bad edges.
    pub fn from_catalog(catalog: &Catalog) -> (Self, LoadReport) {
        let (plan, mut report) = CatalogPlan::from_catalog(catalog);
        let mut graph = Self::new();

        for skill in plan.skills {
            graph.add_skill(skill);
        }
        for course in plan.courses {
            graph.add_course(course);
        }
        for app in plan.applications {
            graph.add_application(app);
        }
        for edge in &plan.teaches {
            if let Err(e) = graph.add_teaches(edge) {
                report.teaches -= 1;
                report.skipped_edges.push(e.to_string());
            }
        }
        for edge in &plan.develops {
            if let Err(e) = graph.add_develops(edge) {
                report.develops -= 1;
                report.skipped_edges.push(e.to_string());
            }
        }

        debug!(
            nodes = graph.graph.node_count(),
            edges = graph.graph.edge_count(),
            "in-memory graph built"
        );
        (graph, report)
    }

    /// Add a skill. Returns `false` if a skill with that name already exists.
    pub fn add_skill(&mut self, skill: Skill) -> bool {
        if self.skills.contains_key(&skill.name) {
            return false;
        }
        let name = skill.name.clone();
        let idx = self.graph.add_node(EntityNode::Skill(skill));
        self.skills.insert(name, idx);
        true
    }

    /// Add a course. Courses without a usable description are refused.
    pub fn add_course(&mut self, course: Course) -> bool {
        if !course.has_usable_description() {
            warn!(course = %course.code, "refusing course without a usable description");
            return false;
        }
        if self.courses.contains_key(&course.code) {
            return false;
        }
        let code = course.code.clone();
        let idx = self.graph.add_node(EntityNode::Course(course));
        self.courses.insert(code, idx);
        true
    }

    pub fn add_application(&mut self, app: Application) -> bool {
        if self.applications.contains_key(&app.app_id) {
            return false;
        }
        let id = app.app_id.clone();
        let idx = self.graph.add_node(EntityNode::Application(app));
        self.applications.insert(id, idx);
        true
    }

    /// Add or re-weight a course → skill edge.
    pub fn add_teaches(&mut self, edge: &Teaches) -> GraphResult<()> {
        let from = endpoint(&self.courses, "course", &edge.course_code)?;
        let to = endpoint(&self.skills, "skill", &edge.skill)?;
        let weight = valid_weight(&edge.course_code, &edge.skill, edge.weight)?;
        self.set_edge(from, to, Relation::Teaches { weight });
        Ok(())
    }

    /// Add or re-weight an application → skill edge.
    pub fn add_develops(&mut self, edge: &Develops) -> GraphResult<()> {
        let from = endpoint(&self.applications, "application", &edge.app_id)?;
        let to = endpoint(&self.skills, "skill", &edge.skill)?;
        let weight = valid_weight(&edge.app_id, &edge.skill, edge.weight)?;
        self.set_edge(from, to, Relation::Develops { weight });
        Ok(())
    }

    fn set_edge(&mut self, from: NodeIndex, to: NodeIndex, relation: Relation) {
        if let Some(edge_idx) = self.graph.find_edge(from, to) {
            self.graph[edge_idx] = relation;
        } else {
            self.graph.add_edge(from, to, relation);
        }
    }

    pub fn skill(&self, name: &str) -> Option<&Skill> {
        match self.skills.get(name).map(|idx| &self.graph[*idx]) {
            Some(EntityNode::Skill(skill)) => Some(skill),
            _ => None,
        }
    }

    pub fn course(&self, code: &str) -> Option<&Course> {
        match self.courses.get(code).map(|idx| &self.graph[*idx]) {
            Some(EntityNode::Course(course)) => Some(course),
            _ => None,
        }
    }

    pub fn application(&self, app_id: &str) -> Option<&Application> {
        match self.applications.get(app_id).map(|idx| &self.graph[*idx]) {
            Some(EntityNode::Application(app)) => Some(app),
            _ => None,
        }
    }

    fn count_edges(&self, develops: bool) -> usize {
        self.graph
            .edge_weights()
            .filter(|r| matches!(r, Relation::Develops { .. }) == develops)
            .count()
    }

    fn active_skill_names(&self) -> HashSet<String> {
        self.skills
            .iter()
            .filter(|(_, idx)| {
                self.graph
                    .edges_directed(**idx, Direction::Incoming)
                    .any(|e| matches!(e.weight(), Relation::Develops { .. }))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn endpoint(
    index: &HashMap<String, NodeIndex>,
    kind: &'static str,
    key: &str,
) -> GraphResult<NodeIndex> {
    index
        .get(key)
        .copied()
        .ok_or_else(|| GraphError::UnknownEndpoint {
            kind,
            key: key.to_string(),
        })
}

fn valid_weight(from: &str, to: &str, weight: f64) -> GraphResult<f64> {
    check_weight("weight", weight).map_err(|_| GraphError::InvalidWeight {
        edge: format!("{} -> {}", from, to),
        weight,
    })
}

#[async_trait]
impl EntityGraph for InMemoryGraph {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn apps_for_skills(&self, skills: &[String], top_k: usize) -> GraphResult<Vec<AppMatch>> {
        if skills.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut acc = MatchAccumulator::new(skills);
        let requested: Vec<String> = acc.requested().into_iter().map(str::to_string).collect();
        for skill in requested {
            let Some(&skill_idx) = self.skills.get(&skill) else {
                continue;
            };
            for edge in self.graph.edges_directed(skill_idx, Direction::Incoming) {
                let Relation::Develops { weight } = *edge.weight() else {
                    continue;
                };
                if let EntityNode::Application(app) = &self.graph[edge.source()] {
                    acc.add(app, &skill, weight);
                }
            }
        }

        let matches = acc.finish(top_k);
        debug!(requested = skills.len(), found = matches.len(), "apps for skills");
        Ok(matches)
    }

    async fn active_skills(&self) -> GraphResult<HashSet<String>> {
        Ok(self.active_skill_names())
    }

    async fn skills_for_course(&self, course_code: &str) -> GraphResult<Vec<TaughtSkill>> {
        let Some(&course_idx) = self.courses.get(course_code) else {
            return Ok(Vec::new());
        };

        let mut taught: Vec<TaughtSkill> = self
            .graph
            .edges_directed(course_idx, Direction::Outgoing)
            .filter_map(|edge| match (*edge.weight(), &self.graph[edge.target()]) {
                (Relation::Teaches { weight }, EntityNode::Skill(skill)) => Some(TaughtSkill {
                    name: skill.name.clone(),
                    weight,
                }),
                _ => None,
            })
            .collect();
        taught.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(taught)
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        Ok(GraphCounts {
            skills: self.skills.len(),
            courses: self.courses.len(),
            applications: self.applications.len(),
            teaches: self.count_edges(false),
            develops: self.count_edges(true),
            active_skills: self.active_skill_names().len(),
        })
    }
}
