use crate::{
    api::{attendance, office_location, remote_request, shift},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    protected: Limiter,
    clock: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            protected: build_limiter(config.rate_protected_per_min)?,
            clock: build_limiter(config.rate_clock_per_min)?,
        })
    }
}

fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit of {requests_per_min}/min"))?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiters: &Limiters) {
    let clock_limiter = limiters.clock.clone();

    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/clock-in")
                            .wrap(clock_limiter.clone())
                            .route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out")
                            .wrap(clock_limiter.clone())
                            .route(web::post().to(attendance::clock_out)),
                    )
                    .service(web::resource("/active").route(web::get().to(attendance::active)))
                    .service(web::resource("/history").route(web::get().to(attendance::history))),
            )
            .service(
                web::resource("/shift-window").route(web::get().to(attendance::shift_window)),
            )
            .service(
                web::scope("/remote-requests")
                    // /remote-requests
                    .service(
                        web::resource("")
                            .wrap(clock_limiter.clone())
                            .route(web::post().to(remote_request::create_request)),
                    )
                    .service(
                        web::resource("/mine").route(web::get().to(remote_request::my_pending)),
                    )
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(remote_request::pending_for_me)),
                    )
                    // /remote-requests/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(remote_request::approve_request)),
                    )
                    // /remote-requests/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(remote_request::reject_request)),
                    ),
            )
            .service(
                web::scope("/shifts")
                    .service(
                        web::resource("")
                            .route(web::get().to(shift::list_shifts))
                            .route(web::post().to(shift::create_shift)),
                    )
                    .service(web::resource("/mine").route(web::get().to(shift::my_shifts)))
                    // /shifts/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(shift::update_shift))
                            .route(web::delete().to(shift::delete_shift)),
                    ),
            )
            .service(
                web::scope("/office-locations")
                    .service(
                        web::resource("")
                            .route(web::get().to(office_location::list_locations))
                            .route(web::post().to(office_location::create_location)),
                    )
                    // /office-locations/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(office_location::update_location))
                            .route(web::delete().to(office_location::delete_location)),
                    ),
            ),
    );
}
