use rand::Rng;
use std::time::Duration;

use crate::config::DelayRange;

/// Uniform pick in `[min, max]`, inclusive on both ends
pub fn pick_delay<R: Rng + ?Sized>(range: DelayRange, rng: &mut R) -> Duration {
    let secs = if range.max <= range.min {
        range.min
    } else {
        rng.gen_range(range.min..=range.max)
    };
    Duration::from_secs(secs)
}

/// Sleep a random time from `range`, announcing it as a pause between `what`
pub async fn sleep_between(range: DelayRange, what: &str) {
    let delay = pick_delay(range, &mut rand::thread_rng());
    if delay.is_zero() {
        return;
    }
    println!("Sleep for {} seconds between {what}", delay.as_secs());
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_pick_stays_in_inclusive_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = DelayRange { min: 3, max: 5 };
        let picks: Vec<u64> = (0..200).map(|_| pick_delay(range, &mut rng).as_secs()).collect();
        assert!(picks.iter().all(|s| (3..=5).contains(s)));
        assert!(picks.contains(&3) && picks.contains(&5));
    }

    #[test]
    fn test_degenerate_range_is_fixed() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            pick_delay(DelayRange { min: 4, max: 4 }, &mut rng),
            Duration::from_secs(4)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_between_waits_the_picked_time() {
        let start = tokio::time::Instant::now();
        sleep_between(DelayRange { min: 2, max: 2 }, "actions").await;
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }
}
