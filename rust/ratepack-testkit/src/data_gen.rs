//! Data generation utilities for testing.

use ratepack_store::Rating;

/// Rating values drawn by [`generate_ratings`]: half-star steps from 0.5 to 5.0.
pub const RATING_SCALE: [f64; 10] = [0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

/// Generates `count` random ratings from `users` users on `items` items.
///
/// User ids are `1..=users` and item ids are `1000 + 1..=items`, so user and item ids
/// never collide. The same `(user, item)` pair may occur more than once. With
/// `timestamps`, each rating gets a timestamp drawn from a range narrow enough to
/// produce ties; otherwise the timestamp is `None`.
///
/// The output depends only on the arguments.
pub fn generate_ratings(
    seed: u64,
    users: usize,
    items: usize,
    count: usize,
    timestamps: bool,
) -> Vec<Rating> {
    assert!(users > 0 && items > 0, "need at least one user and item");
    let mut rng = fastrand::Rng::with_seed(seed);
    let ts_range = (count as i64 / 2).max(1);
    (0..count)
        .map(|_| {
            let user = rng.i64(1..=users as i64);
            let item = 1000 + rng.i64(1..=items as i64);
            let value = RATING_SCALE[rng.usize(..RATING_SCALE.len())];
            let rating = Rating::new(user, item, value);
            if timestamps {
                rating.with_timestamp(1_600_000_000 + rng.i64(0..ts_range))
            } else {
                rating
            }
        })
        .collect()
}
