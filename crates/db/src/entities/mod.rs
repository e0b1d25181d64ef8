pub mod project;
pub mod project_team;
pub mod session;
pub mod task;
pub mod task_todo;
pub mod team;
pub mod team_member;
pub mod user;
