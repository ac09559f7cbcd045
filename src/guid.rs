//! Pseudo-unique id generation.
//!
//! Ids are UUID-v4 shaped (`xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx`) and derived
//! from the wall clock, a monotonic timer and randomness. They are not
//! cryptographically secure.

use chrono::Utc;
use rand::Rng;
use std::sync::OnceLock;
use std::time::Instant;

const TEMPLATE: &str = "xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx";

static TIMER_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Generate a new id.
pub fn guid() -> String {
    let origin = *TIMER_ORIGIN.get_or_init(Instant::now);
    let mut seed = Utc::now().timestamp_millis() as f64 + origin.elapsed().as_secs_f64() * 1000.0;
    let mut rng = rand::thread_rng();

    TEMPLATE
        .chars()
        .map(|c| match c {
            'x' | 'y' => {
                let r = ((seed + rng.gen::<f64>() * 16.0) % 16.0) as u32;
                seed = (seed / 16.0).floor();
                let digit = if c == 'x' { r } else { (r & 0x3) | 0x8 };
                char::from_digit(digit, 16).unwrap_or('0')
            }
            other => other,
        })
        .collect()
}

/// Whether `id` has the shape produced by [`guid`].
pub fn is_guid(id: &str) -> bool {
    id.len() == TEMPLATE.len()
        && id.chars().zip(TEMPLATE.chars()).all(|(c, t)| match t {
            'x' => c.is_ascii_digit() || ('a'..='f').contains(&c),
            'y' => matches!(c, '8' | '9' | 'a' | 'b'),
            other => c == other,
        })
}
