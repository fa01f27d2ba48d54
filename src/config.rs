use crate::core::attendance::AttendancePolicy;
use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Attendance policy
    pub shift_start: NaiveTime,
    pub grace_minutes: i64,

    // Funds pool seeded on first balance read
    pub seed_balance: f64,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_payroll_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            shift_start: NaiveTime::parse_from_str(
                &env::var("SHIFT_START").unwrap_or_else(|_| "09:00".to_string()),
                "%H:%M",
            )
            .expect("SHIFT_START must be HH:MM"),
            grace_minutes: env::var("GRACE_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap(),

            seed_balance: env::var("SEED_BALANCE")
                .unwrap_or_else(|_| "1000000".to_string())
                .parse()
                .unwrap(),

            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
            rate_payroll_per_min: env::var("RATE_PAYROLL_PER_MIN")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
        }
    }

    pub fn attendance_policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            shift_start: self.shift_start,
            grace_minutes: self.grace_minutes,
        }
    }
}
