//! Retriever behaviour against a scripted skill index and a real in-memory graph.

use async_trait::async_trait;
use skillbridge_core::catalog::Catalog;
use skillbridge_core::types::*;
use skillbridge_graph::{EntityGraph, GraphCounts, GraphResult, InMemoryGraph};
use skillbridge_rag::prelude::*;
use skillbridge_vectors::VectorResult;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Skill index answering from fixed tables.
#[derive(Default)]
struct ScriptedIndex {
    related: HashMap<String, Vec<SkillMatch>>,
    similarity: HashMap<String, HashMap<String, f64>>,
    fail_related: bool,
    fail_nearest: bool,
    delay: Option<Duration>,
    nearest_calls: AtomicUsize,
}

impl ScriptedIndex {
    fn related(mut self, query: &str, skills: &[(&str, f64)]) -> Self {
        self.related.insert(
            query.to_string(),
            skills.iter().map(|(n, s)| SkillMatch::new(*n, *s)).collect(),
        );
        self
    }

    fn similar(mut self, query: &str, skills: &[(&str, f64)]) -> Self {
        self.similarity.insert(
            query.to_string(),
            skills.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
        );
        self
    }

    fn nearest_calls(&self) -> usize {
        self.nearest_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SkillIndex for ScriptedIndex {
    async fn find_related(&self, query: &str, top_k: usize) -> VectorResult<Vec<SkillMatch>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_related {
            return Err(VectorError::Connection("index offline".into()));
        }
        let mut related = self.related.get(query).cloned().unwrap_or_default();
        related.truncate(top_k);
        Ok(related)
    }

    async fn find_nearest_among(
        &self,
        query: &str,
        candidates: &HashSet<String>,
        top_k: usize,
        min_similarity: f64,
    ) -> VectorResult<Vec<SkillMatch>> {
        self.nearest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_nearest {
            return Err(VectorError::Connection("index offline".into()));
        }
        let Some(table) = self.similarity.get(query) else {
            return Ok(Vec::new());
        };
        let mut nearest: Vec<SkillMatch> = table
            .iter()
            .filter(|(name, sim)| candidates.contains(*name) && **sim >= min_similarity)
            .map(|(name, sim)| SkillMatch::new(name.clone(), *sim))
            .collect();
        nearest.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap()
                .then_with(|| a.name.cmp(&b.name))
        });
        nearest.truncate(top_k);
        Ok(nearest)
    }
}

/// Wraps a graph, optionally hiding active skills, and counts cache loads.
struct ObservedGraph {
    inner: InMemoryGraph,
    hide_active: bool,
    active_calls: AtomicUsize,
}

impl ObservedGraph {
    fn new(inner: InMemoryGraph) -> Self {
        Self {
            inner,
            hide_active: false,
            active_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EntityGraph for ObservedGraph {
    fn name(&self) -> &str {
        "observed"
    }

    async fn apps_for_skills(&self, skills: &[String], top_k: usize) -> GraphResult<Vec<AppMatch>> {
        self.inner.apps_for_skills(skills, top_k).await
    }

    async fn active_skills(&self) -> GraphResult<HashSet<String>> {
        self.active_calls.fetch_add(1, Ordering::SeqCst);
        if self.hide_active {
            return Ok(HashSet::new());
        }
        self.inner.active_skills().await
    }

    async fn skills_for_course(&self, course_code: &str) -> GraphResult<Vec<TaughtSkill>> {
        self.inner.skills_for_course(course_code).await
    }

    async fn counts(&self) -> GraphResult<GraphCounts> {
        self.inner.counts().await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const CATALOG: &str = r#"{
  "skills": [
    {"name": "Python", "category": "technical"},
    {"name": "Programming", "category": "technical"},
    {"name": "Design", "category": "domain"},
    {"name": "Statistics", "category": "technical"},
    {"name": "Anatomy", "category": "domain"},
    {"name": "Public Speaking", "category": "soft"}
  ],
  "courses": [
    {"code": "15-112", "title": "Fundamentals of Programming", "department": "CS",
     "description": "Programming and problem solving in Python"},
    {"code": "36-200", "title": "Reasoning with Data", "department": "STAT",
     "description": "Introductory statistics"}
  ],
  "applications": [
    {"app_id": "codevr", "name": "CodeVR", "category": "Education"},
    {"app_id": "blocks", "name": "BlockCoder", "category": "Education"},
    {"app_id": "sketch", "name": "SketchSpace", "category": "Creativity"},
    {"app_id": "chart", "name": "ChartRoom", "category": "Productivity"},
    {"app_id": "body", "name": "BodyWorks", "category": "Medical"},
    {"app_id": "stage", "name": "Stage Fright", "category": "Education"}
  ],
  "teaches": [
    {"course_code": "15-112", "skill": "Python", "weight": 0.9},
    {"course_code": "15-112", "skill": "Programming", "weight": 0.7},
    {"course_code": "36-200", "skill": "Statistics", "weight": 0.8}
  ],
  "develops": [
    {"app_id": "codevr", "skill": "Python", "weight": 0.9},
    {"app_id": "codevr", "skill": "Programming", "weight": 0.8},
    {"app_id": "blocks", "skill": "Programming", "weight": 0.6},
    {"app_id": "sketch", "skill": "Design", "weight": 0.7},
    {"app_id": "chart", "skill": "Statistics", "weight": 0.5},
    {"app_id": "body", "skill": "Anatomy", "weight": 0.9},
    {"app_id": "stage", "skill": "Public Speaking", "weight": 0.4}
  ]
}"#;

fn graph() -> InMemoryGraph {
    let catalog = Catalog::from_json_str(CATALOG).unwrap();
    let (graph, report) = InMemoryGraph::from_catalog(&catalog);
    assert!(report.is_clean());
    graph
}

/// Scenario A/B graph: Python ← CodeVR (0.9), taught by 15-112; plus
/// Programming ← CodeVR (0.8) for the bridge.
fn scenario_graph() -> InMemoryGraph {
    let catalog = Catalog::from_json_str(
        r#"{
          "skills": [
            {"name": "Python", "category": "technical"},
            {"name": "Programming", "category": "technical"}
          ],
          "courses": [
            {"code": "15-112", "title": "Fundamentals of Programming", "department": "CS",
             "description": "Programming in Python"}
          ],
          "applications": [{"app_id": "codevr", "name": "CodeVR", "category": "Education"}],
          "teaches": [{"course_code": "15-112", "skill": "Python", "weight": 0.9}],
          "develops": [{"app_id": "codevr", "skill": "Programming", "weight": 0.8}]
        }"#,
    )
    .unwrap();
    InMemoryGraph::from_catalog(&catalog).0
}

async fn retriever(index: ScriptedIndex, graph: InMemoryGraph) -> HybridRetriever {
    retriever_with(index, graph, RetrieverConfig::default()).await
}

async fn retriever_with(
    index: ScriptedIndex,
    graph: InMemoryGraph,
    config: RetrieverConfig,
) -> HybridRetriever {
    HybridRetriever::new(Arc::new(index), Arc::new(graph), config)
        .await
        .unwrap()
}

fn names(retrieval: &Retrieval) -> Vec<&str> {
    retrieval.applications.iter().map(|a| a.name.as_str()).collect()
}

fn assert_sorted(retrieval: &Retrieval) {
    for pair in retrieval.applications.windows(2) {
        assert!(pair[0].score >= pair[1].score, "not sorted: {:?}", names(retrieval));
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_direct_skill_match() {
    let mut g = InMemoryGraph::new();
    g.add_skill(Skill::new("Python", SkillCategory::Technical));
    g.add_course(Course {
        code: "15-112".into(),
        title: "Fundamentals of Programming".into(),
        department: "CS".into(),
        description: "Programming in Python".into(),
        units: Some(12.0),
    });
    g.add_application(Application {
        app_id: "codevr".into(),
        name: "CodeVR".into(),
        category: "Education".into(),
        description: String::new(),
        features: vec![],
        rating: None,
        price: None,
    });
    g.add_develops(&Develops { app_id: "codevr".into(), skill: "Python".into(), weight: 0.9 })
        .unwrap();
    g.add_teaches(&Teaches { course_code: "15-112".into(), skill: "Python".into(), weight: 0.8 })
        .unwrap();

    let index = ScriptedIndex::default().related("python programming", &[("Python", 0.82)]);
    let r = retriever(index, g).await;
    let result = r.retrieve("python programming", 8).await.unwrap();

    assert_eq!(result.len(), 1);
    let app = &result.applications[0];
    assert_eq!(app.name, "CodeVR");
    assert_eq!(app.matched_skills, vec!["Python"]);
    assert!((app.score - 0.9).abs() < 1e-9);
    assert_eq!(app.retrieval_source, RetrievalSource::DirectSkillMatch);
    assert!(app.bridge_explanation.is_none());
}

#[tokio::test]
async fn scenario_b_semantic_bridge() {
    let index = ScriptedIndex::default()
        .similar("quantum computing", &[("Programming", 0.4), ("Python", 0.2)]);
    let r = retriever(index, scenario_graph()).await;
    let result = r.retrieve("quantum computing", 8).await.unwrap();

    assert!(result.bridge_attempted);
    assert_eq!(result.len(), 1);
    let app = &result.applications[0];
    assert_eq!(app.name, "CodeVR");
    assert!((app.score - 0.32).abs() < 1e-9);
    assert!((app.graph_score - 0.8).abs() < 1e-9);
    assert_eq!(app.retrieval_source, RetrievalSource::SemanticBridge);
    assert_eq!(app.bridge_explanation.as_deref(), Some("Related to 'Programming'"));
}

#[tokio::test]
async fn scenario_c_empty_cache_refreshes_once_then_gives_up() {
    let mut observed = ObservedGraph::new(graph());
    observed.hide_active = true;
    let observed = Arc::new(observed);

    let index = Arc::new(
        ScriptedIndex::default()
            .related("python", &[("Python", 0.9)])
            .similar("python", &[("Programming", 0.9)]),
    );
    let r = HybridRetriever::new(index.clone(), observed.clone(), RetrieverConfig::default())
        .await
        .unwrap();
    assert_eq!(observed.active_calls.load(Ordering::SeqCst), 1);

    let result = r.retrieve("python", 8).await.unwrap();
    assert_eq!(observed.active_calls.load(Ordering::SeqCst), 2);
    assert!(result.bridge_attempted);
    assert!(!result.is_degraded());
    assert_eq!(names(&result), vec!["CodeVR"]);
    assert_eq!(index.nearest_calls(), 0);

    let nothing = r.retrieve("unknown words", 8).await.unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn scenario_c_cache_built_before_graph_was_populated() {
    let index: Arc<dyn SkillIndex> = Arc::new(
        ScriptedIndex::default().similar("quantum computing", &[("Programming", 0.4)]),
    );
    let graph: Arc<dyn EntityGraph> = Arc::new(scenario_graph());
    let cache = Arc::new(ActiveSkillCache::empty(Arc::clone(&graph)));
    let r = HybridRetriever::with_cache(index, graph, cache.clone(), RetrieverConfig::default())
        .unwrap();

    let result = r.retrieve("quantum computing", 8).await.unwrap();
    assert_eq!(cache.generation(), 1);
    assert_eq!(names(&result), vec!["CodeVR"]);
    assert!(result.applications[0].is_bridged());
}

#[tokio::test]
async fn scenario_d_bridge_below_threshold_contributes_nothing() {
    let index = ScriptedIndex::default()
        .similar("underwater basket weaving", &[("Programming", 0.34), ("Design", 0.1)]);
    let r = retriever(index, graph()).await;
    let result = r.retrieve("underwater basket weaving", 8).await.unwrap();

    assert!(result.bridge_attempted);
    assert!(result.is_empty());

    let index = ScriptedIndex::default()
        .related("sketching", &[("Design", 0.7)])
        .similar("sketching", &[("Programming", 0.3)]);
    let r = retriever(index, graph()).await;
    let result = r.retrieve("sketching", 8).await.unwrap();
    assert_eq!(names(&result), vec!["SketchSpace"]);
    assert!(result.applications.iter().all(|a| !a.is_bridged()));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn never_exceeds_top_k_and_is_sorted() {
    let index = ScriptedIndex::default().related(
        "stem",
        &[
            ("Python", 0.9),
            ("Programming", 0.8),
            ("Design", 0.7),
            ("Statistics", 0.6),
            ("Anatomy", 0.5),
            ("Public Speaking", 0.4),
        ],
    );
    let r = retriever(index, graph()).await;

    for top_k in 0..8 {
        let result = r.retrieve("stem", top_k).await.unwrap();
        assert!(result.len() <= top_k);
        assert_sorted(&result);
    }

    let all = r.retrieve("stem", 10).await.unwrap();
    assert_eq!(all.len(), 6);
    assert_eq!(all.applications[0].name, "CodeVR");
    assert!((all.applications[0].score - 1.7).abs() < 1e-9);
}

#[tokio::test]
async fn direct_hits_win_over_bridge() {
    // Direct finds CodeVR only; the bridge would find CodeVR and BlockCoder.
    let index = ScriptedIndex::default()
        .related("learn python", &[("Python", 0.9)])
        .similar("learn python", &[("Programming", 0.9)]);
    let r = retriever(index, graph()).await;
    let result = r.retrieve("learn python", 8).await.unwrap();

    assert_eq!(names(&result), vec!["CodeVR", "BlockCoder"]);
    let code = &result.applications[0];
    assert_eq!(code.retrieval_source, RetrievalSource::DirectSkillMatch);
    assert_eq!(code.matched_skills, vec!["Python"]);
    assert!((code.score - 0.9).abs() < 1e-9);

    let blocks = &result.applications[1];
    assert_eq!(blocks.retrieval_source, RetrievalSource::SemanticBridge);
    assert!((blocks.score - 0.54).abs() < 1e-9);
}

#[tokio::test]
async fn bridged_scores_never_exceed_graph_scores() {
    let index = ScriptedIndex::default().similar(
        "making things",
        &[("Design", 0.8), ("Programming", 0.5), ("Statistics", 0.36)],
    );
    let r = retriever(index, graph()).await;
    let result = r.retrieve("making things", 8).await.unwrap();

    assert_eq!(result.len(), 4);
    for app in &result.applications {
        assert!(app.is_bridged());
        assert!(app.score <= app.graph_score);
    }
    assert_sorted(&result);
}

#[tokio::test]
async fn retrieval_is_idempotent() {
    let index = ScriptedIndex::default()
        .related("data", &[("Statistics", 0.9)])
        .similar("data", &[("Programming", 0.5), ("Design", 0.5)]);
    let r = retriever(index, graph()).await;

    let first = r.retrieve("data", 8).await.unwrap();
    for _ in 0..5 {
        assert_eq!(r.retrieve("data", 8).await.unwrap(), first);
    }
}

#[tokio::test]
async fn bridge_skipped_when_direct_is_plentiful() {
    let index = ScriptedIndex::default()
        .related("stem", &[("Python", 0.9), ("Programming", 0.8), ("Design", 0.7)])
        .similar("stem", &[("Anatomy", 0.99)]);
    let r = retriever(index, graph()).await;
    let result = r.retrieve("stem", 8).await.unwrap();

    assert_eq!(result.len(), 3);
    assert!(!result.bridge_attempted);
    assert!(result.applications.iter().all(|a| !a.is_bridged()));
}

#[tokio::test]
async fn bridge_trigger_is_configurable() {
    let scripted = || {
        ScriptedIndex::default()
            .related("code", &[("Python", 0.9)])
            .similar("code", &[("Design", 0.9)])
    };

    let disabled = RetrieverConfig::default().with_bridge_trigger(0);
    let r = retriever_with(scripted(), graph(), disabled).await;
    let result = r.retrieve("code", 8).await.unwrap();
    assert!(!result.bridge_attempted);
    assert_eq!(names(&result), vec!["CodeVR"]);

    let eager = RetrieverConfig::default().with_bridge_trigger(1);
    let r = retriever_with(scripted(), graph(), eager).await;
    assert!(!r.retrieve("code", 8).await.unwrap().bridge_attempted);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bridge_failure_degrades_to_direct_results() {
    let mut index = ScriptedIndex::default().related("python", &[("Python", 0.9)]);
    index.fail_nearest = true;
    let r = retriever(index, graph()).await;
    let result = r.retrieve("python", 8).await.unwrap();

    assert_eq!(names(&result), vec!["CodeVR"]);
    assert!(result.is_degraded());
    assert!(matches!(
        result.warnings[0],
        RetrievalWarning::BridgePassFailed { .. }
    ));
}

#[tokio::test]
async fn bridge_failure_can_be_fatal() {
    let mut index = ScriptedIndex::default().related("python", &[("Python", 0.9)]);
    index.fail_nearest = true;
    let config = RetrieverConfig::default().with_bridge_failure_policy(BridgeFailurePolicy::Fail);
    let r = retriever_with(index, graph(), config).await;

    let err = r.retrieve("python", 8).await.unwrap_err();
    assert!(matches!(err, RetrievalError::VectorIndex(_)));
}

#[tokio::test]
async fn direct_failure_propagates() {
    let index = ScriptedIndex {
        fail_related: true,
        ..Default::default()
    };
    let r = retriever(index, graph()).await;

    let err = r.retrieve("python", 8).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn invalid_config_rejected_at_construction() {
    let config = RetrieverConfig::default().with_bridge_min_similarity(2.0);
    let result = HybridRetriever::new(
        Arc::new(ScriptedIndex::default()),
        Arc::new(graph()),
        config,
    )
    .await;
    assert!(matches!(result, Err(RetrievalError::Config(_))));
}

#[tokio::test]
async fn deadline_cancels_slow_retrieval() {
    let index = ScriptedIndex {
        delay: Some(Duration::from_millis(500)),
        ..Default::default()
    };
    let r = retriever(index, graph()).await;

    let err = r
        .retrieve_within("python", 8, Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(matches!(err, RetrievalError::DeadlineExceeded(_)));
}

// ---------------------------------------------------------------------------
// Course path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn course_results_go_through_skills() {
    let r = retriever(ScriptedIndex::default(), graph()).await;
    let result = r.retrieve_for_course("15-112", 8).await.unwrap();

    assert_eq!(names(&result), vec!["CodeVR", "BlockCoder"]);
    assert_eq!(result.applications[0].matched_skills, vec!["Python", "Programming"]);
    assert!(result.applications.iter().all(|a| !a.is_bridged()));
    assert_eq!(result.course.as_deref(), Some("15-112"));

    let unknown = r.retrieve_for_course("00-000", 8).await.unwrap();
    assert!(unknown.is_empty());
    assert!(unknown.course.is_none());
}

#[tokio::test]
async fn recommend_detects_course_codes() {
    let index = ScriptedIndex::default().related("what helps with 99-123", &[("Anatomy", 0.8)]);
    let r = retriever(index, graph()).await;

    let by_course = r.recommend("apps for 36-200?", 8).await.unwrap();
    assert_eq!(names(&by_course), vec!["ChartRoom"]);
    assert_eq!(by_course.course.as_deref(), Some("36-200"));

    // Unknown course code falls back to hybrid retrieval.
    let hybrid = r.recommend("what helps with 99-123", 8).await.unwrap();
    assert_eq!(names(&hybrid), vec!["BodyWorks"]);
    assert!(hybrid.course.is_none());
    let json = serde_json::to_value(&hybrid).unwrap();
    assert!(json.get("course").is_none());
}

#[tokio::test]
async fn fallback_explanations_cover_every_candidate() {
    let index = ScriptedIndex::default()
        .related("learn python", &[("Python", 0.9)])
        .similar("learn python", &[("Programming", 0.9)]);
    let r = retriever(index, graph()).await;
    let result = r.retrieve("learn python", 8).await.unwrap();

    let digest = candidate_digest(&result.applications);
    assert!(digest.contains("- BlockCoder (Education): matches Programming [Note: Related to 'Programming']"));

    let recs = explain_or_fallback(&FallbackExplainer, "learn python", &result.applications).await;
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].reasoning, FALLBACK_REASONING);
}
