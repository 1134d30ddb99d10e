//! Per-instrument derived columns: return, realized volatility, activity.

/// Close-to-close percentage return: `close[t] / close[t-1] - 1`.
///
/// `None` at the first row, and wherever either close is missing.
pub fn pct_return(close: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let ret = match (i.checked_sub(1).and_then(|p| close[p]), close[i]) {
            (Some(prev), Some(cur)) => Some(cur / prev - 1.0),
            _ => None,
        };
        out.push(ret);
    }
    out
}

/// Rolling sample standard deviation (divide by N-1) over `window` rows.
///
/// A row gets a value only when all `window` trailing values, itself
/// included, are present. Shorter windows never produce a value.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];

    if window < 2 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let start = i + 1 - window;
        let slice = &values[start..=i];

        let mut sum = 0.0;
        let mut complete = true;
        for v in slice {
            match v {
                Some(x) if !x.is_nan() => sum += x,
                _ => {
                    complete = false;
                    break;
                }
            }
        }
        if !complete {
            continue;
        }

        let mean = sum / window as f64;
        let variance = slice
            .iter()
            .flatten()
            .map(|x| {
                let diff = x - mean;
                diff * diff
            })
            .sum::<f64>()
            / (window - 1) as f64;

        result[i] = Some(variance.sqrt());
    }

    result
}

/// `true` where the close moved versus the previous row.
///
/// The first row has no previous close and is `false`. A missing close on
/// either side compares as unequal.
pub fn active_flags(close: &[Option<f64>]) -> Vec<bool> {
    let mut out = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let active = match i.checked_sub(1) {
            None => false,
            Some(p) => match (close[p], close[i]) {
                (Some(prev), Some(cur)) => cur != prev,
                _ => true,
            },
        };
        out.push(active);
    }
    out
}
