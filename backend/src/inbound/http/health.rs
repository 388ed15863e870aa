//! Liveness and readiness checks shared by every service process.
//!
//! Both answer with a small JSON body naming the service so that a check
//! aimed at the wrong port is easy to spot in logs.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

/// Readiness and liveness flags for one service process.
///
/// A fresh state is live but not ready; `main` marks it ready once
/// migrations have run and the HTTP server is bound.
#[derive(Debug)]
pub struct HealthState {
    service: &'static str,
    ready: AtomicBool,
    live: AtomicBool,
}

impl HealthState {
    pub fn new(service: &'static str) -> Self {
        Self {
            service,
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness from now on, used while draining at shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn health_response(&self, healthy: bool) -> HttpResponse {
        let mut response = if healthy {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(HealthBody {
                service: self.service,
                status: if healthy { "ok" } else { "unavailable" },
            })
    }
}

/// Body returned by both checks.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthBody {
    #[schema(example = "menu")]
    pub service: &'static str,
    #[schema(example = "ok")]
    pub status: &'static str,
}

/// Readiness check: 200 once the service can take traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Service is ready", body = HealthBody),
        (status = 503, description = "Service is still starting", body = HealthBody)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.health_response(state.is_ready())
}

/// Liveness check: 200 until [`HealthState::mark_unhealthy`] is called.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Service is alive", body = HealthBody),
        (status = 503, description = "Service is shutting down", body = HealthBody)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.health_response(state.is_alive())
}
