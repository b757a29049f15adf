//! Search stage pipeline.
//!
//! Executed plans compose into a linear pipeline of stages: the head stage
//! produces an initial candidate vertex set (typically the index pass) and
//! every following stage narrows it (typically the graph pass, then any
//! post-filters). An empty intermediate candidate set short-circuits the
//! rest of the pipeline, and cancellation is honored at stage boundaries.
//!
//! The planner core does not execute queries; stages wrap whatever engine
//! calls the surrounding service makes.

use crate::context::{CancellationToken, SearchContext};
use crate::error::PlanResult;

/// An opaque handle to a candidate vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(u64);

impl VertexId {
    /// Creates a vertex ID from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for VertexId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One stage of a search pipeline.
pub trait SearchStage {
    /// Produces this stage's own candidate set from scratch.
    fn produce(&self) -> PlanResult<Vec<VertexId>>;

    /// Narrows a candidate set produced upstream.
    fn refine(&self, candidates: Vec<VertexId>) -> PlanResult<Vec<VertexId>>;
}

/// A [`SearchStage`] built from two closures.
pub struct FnStage<P, R>
where
    P: Fn() -> PlanResult<Vec<VertexId>>,
    R: Fn(Vec<VertexId>) -> PlanResult<Vec<VertexId>>,
{
    produce: P,
    refine: R,
}

impl<P, R> FnStage<P, R>
where
    P: Fn() -> PlanResult<Vec<VertexId>>,
    R: Fn(Vec<VertexId>) -> PlanResult<Vec<VertexId>>,
{
    /// Wraps a produce and a refine callback as a stage.
    pub const fn new(produce: P, refine: R) -> Self {
        Self { produce, refine }
    }
}

impl<P, R> SearchStage for FnStage<P, R>
where
    P: Fn() -> PlanResult<Vec<VertexId>>,
    R: Fn(Vec<VertexId>) -> PlanResult<Vec<VertexId>>,
{
    fn produce(&self) -> PlanResult<Vec<VertexId>> {
        (self.produce)()
    }

    fn refine(&self, candidates: Vec<VertexId>) -> PlanResult<Vec<VertexId>> {
        (self.refine)(candidates)
    }
}

/// An ordered pipeline of search stages.
pub struct SearchPipeline {
    stages: Vec<Box<dyn SearchStage>>,
    cancellation: CancellationToken,
    max_results: Option<usize>,
}

impl SearchPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new(), cancellation: CancellationToken::new(), max_results: None }
    }

    /// Creates a pipeline bound to a planning session: the candidate cap
    /// comes from the session's configured `max_result_size` and the
    /// session's cancellation token is honored at stage boundaries.
    #[must_use]
    pub fn for_context(ctx: &SearchContext<'_>) -> Self {
        Self::new()
            .with_max_results(ctx.config().max_result_size)
            .with_cancellation(ctx.cancellation().clone())
    }

    /// Attaches a cancellation token checked between stages.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Caps the final candidate set.
    #[must_use]
    pub const fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Appends a stage to the end of the pipeline.
    pub fn push(&mut self, stage: Box<dyn SearchStage>) {
        self.stages.push(stage);
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the pipeline: the head stage produces, the rest refine.
    ///
    /// An empty candidate set stops refinement early; cancellation is
    /// honored at stage boundaries and returns the candidates accumulated
    /// so far.
    pub fn execute(&self) -> PlanResult<Vec<VertexId>> {
        let Some((head, rest)) = self.stages.split_first() else {
            return Ok(Vec::new());
        };

        let mut candidates = head.produce()?;

        for stage in rest {
            if candidates.is_empty() || self.cancellation.is_cancelled() {
                break;
            }
            candidates = stage.refine(candidates)?;
        }

        if let Some(max) = self.max_results {
            candidates.truncate(max);
        }

        Ok(candidates)
    }
}

impl Default for SearchPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("stages", &self.stages.len())
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}
