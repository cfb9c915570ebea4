use std::cmp::Ordering;

/// Strikes emitted per game unless configured otherwise.
pub const DEFAULT_STRIKE_COUNT: usize = 2;

/// Anything carrying a parsed numeric strike.
pub trait Strike {
    fn strike(&self) -> Option<f64>;
}

impl Strike for f64 {
    fn strike(&self) -> Option<f64> {
        self.is_finite().then_some(*self)
    }
}

/// The `count` candidates nearest to `target`, ordered by distance and then
/// by strike so equidistant strikes resolve to the lower one.
///
/// Candidates without a strike are ignored; no candidates yields an empty list.
pub fn select_closest<'a, T, I>(target: f64, candidates: I, count: usize) -> Vec<&'a T>
where
    T: Strike + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut ranked: Vec<(f64, f64, &'a T)> = candidates
        .into_iter()
        .filter_map(|c| c.strike().map(|s| ((s - target).abs(), s, c)))
        .collect();

    ranked.sort_by(|a, b| match a.0.total_cmp(&b.0) {
        Ordering::Equal => a.1.total_cmp(&b.1),
        other => other,
    });

    ranked.into_iter().take(count).map(|(_, _, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equidistant_prefers_lower_strike() {
        let strikes = [7.0, 6.5, 6.0];
        let picked: Vec<f64> = select_closest(6.25, &strikes, 2).into_iter().copied().collect();
        assert_eq!(picked, vec![6.0, 6.5]);
    }

    #[test]
    fn test_count_and_empty() {
        let strikes = [220.0, 221.0, 223.0, 226.0];
        let picked: Vec<f64> = select_closest(221.5, &strikes, 3).into_iter().copied().collect();
        assert_eq!(picked, vec![221.0, 220.0, 223.0]);

        let none: [f64; 0] = [];
        assert!(select_closest(5.0, &none, 2).is_empty());
        assert!(select_closest(5.0, &strikes, 0).is_empty());
    }

    #[test]
    fn test_candidates_without_strike_are_ignored() {
        let strikes = [f64::NAN, 4.5];
        let picked: Vec<f64> = select_closest(3.0, &strikes, 2).into_iter().copied().collect();
        assert_eq!(picked, vec![4.5]);
    }
}
