use crate::{
    api::{attendance, rule, salary, teacher},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    // money-moving endpoints get their own, much tighter limit
    let payroll_limiter = Arc::new(build_limiter(config.rate_payroll_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/teachers")
                    // /teachers
                    .service(
                        web::resource("")
                            .route(web::post().to(teacher::create_teacher))
                            .route(web::get().to(teacher::list_teachers)),
                    )
                    // /teachers/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(teacher::get_teacher))
                            .route(web::put().to(teacher::update_teacher))
                            .route(web::delete().to(teacher::terminate_teacher)),
                    )
                    // /teachers/{id}/attendance
                    .service(
                        web::resource("/{id}/attendance")
                            .route(web::get().to(teacher::attendance_history)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::check_in))
                            .route(web::put().to(attendance::check_out))
                            .route(web::get().to(attendance::today)),
                    ),
            )
            .service(
                web::scope("/rules")
                    // /rules
                    .service(
                        web::resource("")
                            .route(web::post().to(rule::create_rule))
                            .route(web::get().to(rule::list_rules)),
                    )
                    // /rules/engine
                    .service(web::resource("/engine").route(web::post().to(rule::run_engine)))
                    // /rules/{id}
                    .service(web::resource("/{id}").route(web::delete().to(rule::delete_rule))),
            )
            // /violations
            .service(web::resource("/violations").route(web::get().to(rule::list_violations)))
            .service(
                web::scope("/salary")
                    // /salary/generate
                    .service(
                        web::resource("/generate")
                            .wrap(payroll_limiter.clone())
                            .route(web::post().to(salary::generate_salaries)),
                    )
                    // /salary/balance
                    .service(web::resource("/balance").route(web::get().to(salary::get_balance)))
                    // /salary/{id}/pay
                    .service(
                        web::resource("/{id}/pay")
                            .wrap(payroll_limiter)
                            .route(web::post().to(salary::pay_salary)),
                    )
                    // /salary
                    .service(web::resource("").route(web::get().to(salary::list_salaries))),
            ),
    );
}
