pub mod attendance;
pub mod payroll;
pub mod rule_engine;
pub mod settlement;
