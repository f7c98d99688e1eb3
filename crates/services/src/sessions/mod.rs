mod choices;
mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the drill subsystem.
pub use crate::error::SessionError;
pub use choices::{QuestionMode, generate_choices};
pub use plan::{DrillItem, DrillPlan, DrillSource, QueueBuilder};
pub use progress::SessionProgress;
pub use service::{DrillAnswer, DrillSession, DrillSummary, SessionRating};
pub use workflow::{DrillAnswerResult, DrillLoopService};
