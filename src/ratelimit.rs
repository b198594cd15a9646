use anyhow::Context;
use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use std::{num::NonZeroU32, time::Duration};

// The league site is a small venue server; stay well below anything it would notice.
const REQ_PER_SEC: NonZeroU32 = nonzero!(4u32);
const MS_BETWEEN_REQ: Duration = Duration::from_millis(250);

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub struct RateLimiter {
    req_per_sec: SpecificGovernorRateLimiter,
    ms_between_req: SpecificGovernorRateLimiter,
}

impl RateLimiter {
    pub fn new() -> anyhow::Result<Self> {
        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(REQ_PER_SEC));

        // No two requests closer than Y ms.
        let ms_between_req = GovernorRateLimiter::direct(
            Quota::with_period(MS_BETWEEN_REQ).context("request spacing must be non-zero")?,
        );

        Ok(RateLimiter {
            req_per_sec,
            ms_between_req,
        })
    }

    pub async fn wait_until_ready(&self) {
        // Per-second budget first, then spacing; the spacing check is the strict
        // one and lets a single caller through every Y ms.
        self.req_per_sec.until_ready().await;
        self.ms_between_req.until_ready().await;
    }
}
