pub mod activity;
pub mod attendance;
pub mod role;
pub mod rule;
pub mod salary;
pub mod teacher;
pub mod violation;
