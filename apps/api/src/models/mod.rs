pub mod cache;
pub mod job;
pub mod resume;
