use time::{OffsetDateTime, Time, UtcOffset};
use tracing::debug;

use crate::{
    error::AppResult,
    stats::dto::{AdminStats, PublicStats},
    store::Store,
};

/// Midnight of `now`'s day in the given offset.
pub fn start_of_day(now: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    now.to_offset(offset).replace_time(Time::MIDNIGHT)
}

/// Midnight of today on the server clock, or in UTC when the local offset
/// cannot be read.
pub fn start_of_today(now: OffsetDateTime) -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    start_of_day(now, offset)
}

pub async fn admin_stats(store: &dyn Store, now: OffsetDateTime) -> AppResult<AdminStats> {
    let today = start_of_today(now);
    let counts = store.counts(today).await?;
    debug!(?counts, %today, "admin stats computed");
    Ok(counts.into())
}

pub async fn public_stats(store: &dyn Store, now: OffsetDateTime) -> AppResult<PublicStats> {
    Ok(store.counts(start_of_today(now)).await?.into())
}
