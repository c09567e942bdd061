//! Turns a model's answer into a verified edit of a broken declaration

mod engine;
mod error;
mod prompt;
mod response;

pub use engine::{FixAction, RepairEngine, RepairOutcome, RepairRequest, SkipReason};
pub use error::{RepairError, RepairParseError, RepairResult};
pub use prompt::repair_messages;
pub use response::{parse_response, strip_code_fences, RepairResponse};
