pub mod board;
pub mod contact;
pub mod due;
pub mod guideline;
pub mod links;
pub mod projection;
pub mod recurrence;
pub mod report;
pub mod search;
pub mod task;
pub mod template;
pub mod user;
pub mod workflow;
