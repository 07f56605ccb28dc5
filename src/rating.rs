//! Player rating module.
//!
//! Ratings are named composites built as weighted sums of raw attributes
//! and of other composites. Composites form a directed acyclic graph: if
//! `overall` reads `shooting`, then `shooting` is resolved first. The graph
//! is checked for cycles before anything is evaluated.
//!
//! Rosters are ranked by the `overall` rating of the default model.

use crate::attributes::{Attribute, Attributes};
use crate::error::SimError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Interned name of a composite rating.
///
/// # Examples
///
/// ```rust
/// use hoopsim::RatingId;
///
/// let a = RatingId::from_str("overall");
/// let b: RatingId = "overall".into();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "overall");
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RatingId(Arc<str>);

impl RatingId {
    pub fn from_str(s: &str) -> Self {
        Self(Arc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RatingId {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl std::fmt::Display for RatingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for RatingId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RatingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(RatingId(Arc::from(s)))
    }
}

/// One input of a rating formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RatingTerm {
    Attribute(Attribute),
    Rating(RatingId),
}

/// A weighted sum of terms, normalized by the total weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    terms: Vec<(RatingTerm, f64)>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, attribute: Attribute, weight: f64) -> Self {
        self.terms.push((RatingTerm::Attribute(attribute), weight));
        self
    }

    pub fn rating(mut self, rating: impl Into<RatingId>, weight: f64) -> Self {
        self.terms.push((RatingTerm::Rating(rating.into()), weight));
        self
    }

    fn depends_on(&self) -> impl Iterator<Item = &RatingId> {
        self.terms.iter().filter_map(|(term, _)| match term {
            RatingTerm::Rating(id) => Some(id),
            RatingTerm::Attribute(_) => None,
        })
    }
}

/// A set of rating formulas, resolved in dependency order.
///
/// # Examples
///
/// ```rust
/// use hoopsim::{Attribute, Attributes, RatingModel};
///
/// let model = RatingModel::standard();
/// let attrs = Attributes::uniform(0.7).unwrap();
/// let overall = model.overall(&attrs).unwrap();
/// assert!((overall - 0.7).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingModel {
    formulas: HashMap<RatingId, Formula>,
}

impl RatingModel {
    pub const OVERALL: &'static str = "overall";

    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in model used to rank rosters.
    pub fn standard() -> Self {
        let mut model = Self::new();
        model.define(
            "shooting",
            Formula::new()
                .attribute(Attribute::MidRange, 0.4)
                .attribute(Attribute::ThreePoint, 0.4)
                .attribute(Attribute::FreeThrow, 0.2),
        );
        model.define(
            "finishing",
            Formula::new()
                .attribute(Attribute::InsideScoring, 0.5)
                .attribute(Attribute::Dunk, 0.3)
                .attribute(Attribute::Strength, 0.2),
        );
        model.define(
            "defense",
            Formula::new()
                .attribute(Attribute::InsideDefense, 0.5)
                .attribute(Attribute::PerimeterDefense, 0.5),
        );
        model.define(
            "rebounding",
            Formula::new()
                .attribute(Attribute::OffensiveRebound, 0.4)
                .attribute(Attribute::DefensiveRebound, 0.4)
                .attribute(Attribute::Height, 0.2),
        );
        model.define(
            "playmaking",
            Formula::new()
                .attribute(Attribute::Assist, 0.6)
                .attribute(Attribute::Turnover, 0.4),
        );
        model.define(
            "athleticism",
            Formula::new()
                .attribute(Attribute::Speed, 0.5)
                .attribute(Attribute::Strength, 0.3)
                .attribute(Attribute::Height, 0.2),
        );
        model.define(
            Self::OVERALL,
            Formula::new()
                .rating("shooting", 0.2)
                .rating("finishing", 0.2)
                .rating("defense", 0.2)
                .rating("rebounding", 0.15)
                .rating("playmaking", 0.15)
                .rating("athleticism", 0.1),
        );
        model
    }

    /// Define or replace a rating formula.
    pub fn define(&mut self, id: impl Into<RatingId>, formula: Formula) {
        self.formulas.insert(id.into(), formula);
    }

    pub fn contains(&self, id: &RatingId) -> bool {
        self.formulas.contains_key(id)
    }

    /// Resolve every rating for one attribute set.
    pub fn evaluate(&self, attributes: &Attributes) -> Result<HashMap<RatingId, f64>, SimError> {
        let order = self.build_graph()?.topological_sort()?;
        let mut resolved: HashMap<RatingId, f64> = HashMap::with_capacity(order.len());
        for id in order {
            let formula = self
                .formulas
                .get(&id)
                .ok_or_else(|| SimError::UnknownRating(id.clone()))?;
            let mut total = 0.0;
            let mut weight_sum = 0.0;
            for (term, weight) in &formula.terms {
                let value = match term {
                    RatingTerm::Attribute(attribute) => attributes.get(*attribute),
                    RatingTerm::Rating(dep) => *resolved
                        .get(dep)
                        .ok_or_else(|| SimError::UnknownRating(dep.clone()))?,
                };
                total += value * weight;
                weight_sum += weight;
            }
            let value = if weight_sum > 0.0 { total / weight_sum } else { 0.0 };
            resolved.insert(id, value);
        }
        Ok(resolved)
    }

    /// Resolve a single rating.
    pub fn rate(&self, attributes: &Attributes, id: &RatingId) -> Result<f64, SimError> {
        self.evaluate(attributes)?
            .remove(id)
            .ok_or_else(|| SimError::UnknownRating(id.clone()))
    }

    pub fn overall(&self, attributes: &Attributes) -> Result<f64, SimError> {
        self.rate(attributes, &RatingId::from_str(Self::OVERALL))
    }

    fn build_graph(&self) -> Result<RatingGraph, SimError> {
        let mut graph = RatingGraph::new();
        for (id, formula) in &self.formulas {
            graph.add_node(id.clone());
            for dep in formula.depends_on() {
                if !self.formulas.contains_key(dep) {
                    return Err(SimError::UnknownRating(dep.clone()));
                }
                graph.add_edge(id.clone(), dep.clone());
            }
        }
        Ok(graph)
    }
}

/// Dependency DAG between rating formulas.
///
/// Edges run from a dependency to its dependent, so a topological order
/// lists dependencies first.
struct RatingGraph {
    graph: DiGraph<RatingId, ()>,
    node_map: HashMap<RatingId, NodeIndex>,
}

impl RatingGraph {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    fn add_node(&mut self, id: RatingId) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&id) {
            idx
        } else {
            let idx = self.graph.add_node(id.clone());
            self.node_map.insert(id, idx);
            idx
        }
    }

    /// `from` reads `to`.
    fn add_edge(&mut self, from: RatingId, to: RatingId) {
        let from_idx = self.add_node(from);
        let to_idx = self.add_node(to);
        self.graph.add_edge(to_idx, from_idx, ());
    }

    fn detect_cycles(&self) -> Result<(), SimError> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        // Sorted start order keeps the reported path stable across runs.
        let mut starts: Vec<NodeIndex> = self.graph.node_indices().collect();
        starts.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));

        for node in starts {
            if !visited.contains(&node) {
                let mut path = Vec::new();
                if let Some(cycle) = self.dfs(node, &mut visited, &mut rec_stack, &mut path) {
                    return Err(cycle);
                }
            }
        }
        Ok(())
    }

    fn dfs(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        rec_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<RatingId>,
    ) -> Option<SimError> {
        visited.insert(node);
        rec_stack.insert(node);
        path.push(self.graph[node].clone());

        for neighbor in self
            .graph
            .neighbors_directed(node, petgraph::Direction::Outgoing)
        {
            if !visited.contains(&neighbor) {
                if let Some(cycle) = self.dfs(neighbor, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(&neighbor) {
                let closing = self.graph[neighbor].clone();
                let start = path.iter().position(|id| id == &closing).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(closing);
                return Some(SimError::Cycle { path: cycle });
            }
        }

        rec_stack.remove(&node);
        path.pop();
        None
    }

    fn topological_sort(&self) -> Result<Vec<RatingId>, SimError> {
        self.detect_cycles()?;
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => Err(SimError::Cycle {
                path: vec![self.graph[cycle.node_id()].clone()],
            }),
        }
    }
}
