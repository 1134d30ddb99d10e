//! Gap filling along the date axis.
//!
//! `None` and `NaN` both count as missing. Present values are never changed.

fn missing(v: Option<f64>) -> bool {
    v.map_or(true, f64::is_nan)
}

/// Replace each missing value with the most recent earlier present value.
///
/// Leading gaps (nothing present yet) stay `None`.
pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    values
        .iter()
        .map(|&v| {
            if missing(v) {
                last
            } else {
                last = v;
                v
            }
        })
        .collect()
}

/// Replace each missing value with the next later present value.
///
/// Trailing gaps stay `None`.
pub fn backward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut next = None;
    let mut out: Vec<Option<f64>> = values
        .iter()
        .rev()
        .map(|&v| {
            if missing(v) {
                next
            } else {
                next = v;
                v
            }
        })
        .collect();
    out.reverse();
    out
}

/// Forward-fill, then backward-fill whatever leading gap remains.
pub fn fill_gaps(values: &[Option<f64>]) -> Vec<Option<f64>> {
    backward_fill(&forward_fill(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_fill_carries_last_value() {
        let v = [Some(1.0), None, Some(f64::NAN), Some(4.0), None];
        assert_eq!(
            forward_fill(&v),
            vec![Some(1.0), Some(1.0), Some(1.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn forward_fill_leaves_leading_gap() {
        let v = [None, None, Some(3.0)];
        assert_eq!(forward_fill(&v), vec![None, None, Some(3.0)]);
    }

    #[test]
    fn backward_fill_covers_leading_gap() {
        let v = [None, None, Some(3.0), None];
        assert_eq!(backward_fill(&v), vec![Some(3.0), Some(3.0), Some(3.0), None]);
    }

    #[test]
    fn fill_gaps_handles_both_ends() {
        let v = [None, Some(2.0), None, Some(5.0), None];
        assert_eq!(
            fill_gaps(&v),
            vec![Some(2.0), Some(2.0), Some(2.0), Some(5.0), Some(5.0)]
        );
    }

    #[test]
    fn all_missing_stays_missing() {
        let v = [None, Some(f64::NAN)];
        assert_eq!(fill_gaps(&v), vec![None, None]);
    }
}
