//! Descriptive and two-sample statistics over percentage columns.
//!
//! Note: `median` reorders the input slice.

use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with the N-1 denominator. Zero for fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        let a = values[n / 2 - 1];
        let b = values[n / 2];
        (a + b) / 2.0
    }
}

pub fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTest {
    pub t_stat: f64,
    pub p_value: f64,
    pub df: f64,
}

/// Independent two-sample Student's t-test with pooled variance, two-sided.
///
/// Returns `None` when either group has fewer than two values or the pooled
/// standard error is zero.
pub fn student_t_test(a: &[f64], b: &[f64]) -> Option<TTest> {
    let (n1, n2) = (a.len(), b.len());
    if n1 < 2 || n2 < 2 {
        return None;
    }
    let df = (n1 + n2 - 2) as f64;
    let pooled_var = pooled_variance(a, b);
    let se = (pooled_var * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    if !se.is_finite() || se <= 0.0 {
        return None;
    }
    let t_stat = (mean(a) - mean(b)) / se;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = (2.0 * dist.sf(t_stat.abs())).clamp(0.0, 1.0);
    Some(TTest {
        t_stat,
        p_value,
        df,
    })
}

fn pooled_variance(a: &[f64], b: &[f64]) -> f64 {
    let (n1, n2) = (a.len(), b.len());
    if n1 + n2 <= 2 {
        return 0.0;
    }
    let num = (n1.saturating_sub(1)) as f64 * sample_variance(a)
        + (n2.saturating_sub(1)) as f64 * sample_variance(b);
    num / (n1 + n2 - 2) as f64
}

pub fn pooled_std(a: &[f64], b: &[f64]) -> f64 {
    pooled_variance(a, b).sqrt()
}

/// Cohen's d with the pooled standard deviation; 0 when that deviation is 0.
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let sd = pooled_std(a, b);
    if !sd.is_finite() || sd == 0.0 {
        return 0.0;
    }
    (mean(a) - mean(b)) / sd
}

pub fn format_p_value(p: f64) -> String {
    if p < 0.0001 {
        "<0.0001".to_string()
    } else {
        format!("{:.4}", p)
    }
}
