use serde::Serialize;
use tokio::sync::mpsc;

use crate::matching::{MatchedJob, RankedBy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStage {
    ParsingResume,
    LoadingJobs,
    Prefiltering,
    Profiling,
    Ranking,
}

/// Progress of a match run, as streamed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEvent {
    Stage { stage: MatchStage, message: String },
    JobsLoaded { count: usize },
    Prefiltered { count: usize },
    Match { rank: usize, job: Box<MatchedJob> },
    Done { total: usize, ranked_by: RankedBy },
    Error { message: String },
}

impl MatchEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            MatchEvent::Stage { .. } => "stage",
            MatchEvent::JobsLoaded { .. } => "jobs_loaded",
            MatchEvent::Prefiltered { .. } => "prefiltered",
            MatchEvent::Match { .. } => "match",
            MatchEvent::Done { .. } => "done",
            MatchEvent::Error { .. } => "error",
        }
    }

    pub fn stage(stage: MatchStage, message: impl Into<String>) -> Self {
        MatchEvent::Stage {
            stage,
            message: message.into(),
        }
    }
}

/// Optional event sink. A closed receiver only means the client went away.
#[derive(Clone, Default)]
pub struct EventSink(Option<mpsc::Sender<MatchEvent>>);

impl EventSink {
    pub fn new(tx: mpsc::Sender<MatchEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub async fn emit(&self, event: MatchEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event).await;
        }
    }
}
