//! Merge per-profile libraries into ranked rows
//!
//! Pure and synchronous. Rows are ordered by lifetime hours (descending),
//! then lower-cased name, then app id, so equal inputs always produce the same
//! output regardless of the order libraries were fetched in.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::identifier::SteamId;
use crate::{AggregateRow, GameEntry};

/// Decimal places kept on summed hours
pub const HOURS_DECIMAL_PLACES: u32 = 1;

#[derive(Debug, Default)]
struct Bucket<'a> {
    name: String,
    hours_forever: Decimal,
    hours_recent: Decimal,
    owners: HashSet<&'a SteamId>,
}

/// Aggregate libraries keyed by the profile that owns them
///
/// Sums both measures per app id over every entry, counts distinct owning
/// profiles (duplicate entries within one library count once toward
/// `owners_count` but both add hours), and keeps the first non-empty name in
/// input order. Sums are rounded half-to-even to one decimal place.
///
/// Each profile contributes at most one library: when the same identity
/// appears more than once, only its first library is used.
pub fn aggregate<'a, I, L>(libraries: I) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = (&'a SteamId, &'a L)>,
    L: AsRef<[GameEntry]> + ?Sized + 'a,
{
    let mut buckets: HashMap<&'a str, Bucket<'a>> = HashMap::new();
    let mut seen: HashSet<&'a SteamId> = HashSet::new();

    for (owner, library) in libraries {
        if !seen.insert(owner) {
            warn!(steam_id = %owner, "Ignoring repeated library for the same profile");
            continue;
        }
        for game in library.as_ref() {
            let bucket = buckets.entry(game.app_id.as_str()).or_default();
            if bucket.name.is_empty() && !game.name.is_empty() {
                bucket.name = game.name.clone();
            }
            bucket.hours_forever += game.hours_forever;
            bucket.hours_recent += game.hours_recent;
            bucket.owners.insert(owner);
        }
    }

    let mut rows: Vec<AggregateRow> = buckets
        .into_iter()
        .map(|(app_id, bucket)| AggregateRow {
            app_id: app_id.to_string(),
            name: bucket.name,
            hours_forever: bucket.hours_forever.round_dp(HOURS_DECIMAL_PLACES),
            hours_recent: bucket.hours_recent.round_dp(HOURS_DECIMAL_PLACES),
            owners_count: bucket.owners.len(),
        })
        .collect();

    rows.sort_by(compare_rows);
    rows
}

/// Report order: lifetime hours desc, lower-cased name asc, app id asc
pub fn compare_rows(a: &AggregateRow, b: &AggregateRow) -> Ordering {
    b.hours_forever
        .cmp(&a.hours_forever)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.app_id.cmp(&b.app_id))
}
