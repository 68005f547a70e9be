pub mod cache;
pub mod handlers;
pub mod hash;
pub mod refresh;
pub mod repository;
