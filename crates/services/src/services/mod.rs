pub mod auth;
pub mod dashboard;
pub mod project;
pub mod team;
pub mod todo;
pub mod workflow;
