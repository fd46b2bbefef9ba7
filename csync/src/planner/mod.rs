//! Study planning
//!
//! [`PlanningSession`] turns a syllabus into a plan and refines it by chat.
//! [`PlanRepl`] drives a session from the terminal.

mod repl;
mod session;

pub use repl::PlanRepl;
pub use session::{
    CALENDAR_CONFIRMATION, ChatRole, ChatTurn, NO_PLAN_FALLBACK, NO_REPLY_FALLBACK, PlannerError, PlanningSession,
    SessionState, TurnOutcome,
};
