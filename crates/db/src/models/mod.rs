pub mod ids;
pub mod project;
pub mod session;
pub mod task;
pub mod task_todo;
pub mod team;
pub mod user;
