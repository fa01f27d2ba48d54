pub mod attendance;
pub mod rule;
pub mod salary;
pub mod teacher;
