use crate::api::attendance::{CheckInRequest, CheckOutRequest};
use crate::api::rule::{CreateRule, ViolationListResponse, ViolationQuery};
use crate::api::salary::{
    GenerateSalariesRequest, PaySalaryRequest, SalaryListResponse, SalaryQuery,
};
use crate::api::teacher::{
    AttendanceHistoryQuery, AttendanceHistoryResponse, CreateTeacher, TeacherListResponse,
    TeacherQuery, UpdateTeacher,
};
use crate::core::attendance::CheckInOutcome;
use crate::core::rule_engine::EngineReport;
use crate::core::settlement::PaymentReceipt;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, DailyAttendanceEntry};
use crate::model::rule::{PenaltyType, Rule};
use crate::model::salary::{DeductionDetail, OrganizationBalance, SalaryStatus, SalaryTransaction};
use crate::model::teacher::{ContractType, TeacherProfile, TeacherStatus};
use crate::model::violation::Violation;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Teacher Workforce Management API",
        version = "1.0.0",
        description = r#"
## Teacher Workforce Management System

This API powers the staff-management core of a school back office.

### 🔹 Key Features
- **Teacher Management**
  - Create, update, list, and view teacher profiles; terminate contracts
- **Attendance**
  - Daily check-in/check-out with automatic lateness grading
- **Conduct Rules**
  - Define penalty rules over a small condition language and enforce them
    against the day's attendance
- **Payroll**
  - Generate monthly salary records with violation deductions and settle
    them against the organization balance

### 🔐 Security
All endpoints require **JWT Bearer authentication** issued by the identity
service. Money-moving operations are restricted to **Admin**.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::teacher::create_teacher,
        crate::api::teacher::list_teachers,
        crate::api::teacher::get_teacher,
        crate::api::teacher::update_teacher,
        crate::api::teacher::terminate_teacher,
        crate::api::teacher::attendance_history,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,

        crate::api::rule::create_rule,
        crate::api::rule::list_rules,
        crate::api::rule::delete_rule,
        crate::api::rule::run_engine,
        crate::api::rule::list_violations,

        crate::api::salary::generate_salaries,
        crate::api::salary::pay_salary,
        crate::api::salary::list_salaries,
        crate::api::salary::get_balance
    ),
    components(
        schemas(
            CreateTeacher,
            UpdateTeacher,
            TeacherQuery,
            TeacherProfile,
            TeacherListResponse,
            ContractType,
            TeacherStatus,
            AttendanceHistoryQuery,
            AttendanceHistoryResponse,
            CheckInRequest,
            CheckOutRequest,
            CheckInOutcome,
            AttendanceRecord,
            AttendanceStatus,
            DailyAttendanceEntry,
            CreateRule,
            Rule,
            PenaltyType,
            Violation,
            ViolationQuery,
            ViolationListResponse,
            EngineReport,
            GenerateSalariesRequest,
            PaySalaryRequest,
            PaymentReceipt,
            SalaryQuery,
            SalaryStatus,
            SalaryTransaction,
            SalaryListResponse,
            DeductionDetail,
            OrganizationBalance
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Teacher", description = "Teacher profile management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Rules", description = "Conduct rule and violation APIs"),
        (name = "Salary", description = "Payroll and settlement APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
