use kira_cellcohort::schema::v1::{FrequencyRow, Population, Response, Sample, Sex};
use kira_cellcohort::scores::frequency::{
    compute_frequencies, sample_frequencies, summary_statistics,
};

fn sample(id: &str, counts: [Option<u64>; 5]) -> Sample {
    Sample {
        sample: id.to_string(),
        project: "P1".to_string(),
        subject: format!("SUB_{}", id),
        age: 60,
        sex: Sex::M,
        condition: "melanoma".to_string(),
        treatment: "tr1".to_string(),
        sample_type: "PBMC".to_string(),
        time_from_treatment_start: 0,
        response: Response::Unknown,
        b_cell: counts[0],
        cd8_t_cell: counts[1],
        cd4_t_cell: counts[2],
        nk_cell: counts[3],
        monocyte: counts[4],
    }
}

fn pct(rows: &[FrequencyRow], sample: &str, population: Population) -> f64 {
    rows.iter()
        .find(|r| r.sample == sample && r.population == population)
        .map(|r| r.percentage)
        .unwrap()
}

#[test]
fn two_equal_populations_split_evenly() {
    let s = sample("S1", [Some(100), Some(100), Some(0), Some(0), Some(0)]);
    let rows = sample_frequencies(&s);
    assert_eq!(rows.len(), 5);
    assert_eq!(pct(&rows, "S1", Population::BCell), 50.0);
    assert_eq!(pct(&rows, "S1", Population::Cd8TCell), 50.0);
    assert_eq!(pct(&rows, "S1", Population::Cd4TCell), 0.0);
    assert_eq!(pct(&rows, "S1", Population::NkCell), 0.0);
    assert_eq!(pct(&rows, "S1", Population::Monocyte), 0.0);
    assert!(rows.iter().all(|r| r.total_count == 200));
}

#[test]
fn percentages_sum_to_hundred() {
    let samples = vec![
        sample("S1", [Some(100), Some(200), Some(300), Some(400), Some(500)]),
        sample("S2", [Some(12), Some(7), Some(3), Some(0), Some(1)]),
        sample("S3", [Some(1), Some(1), Some(1), None, None]),
        sample("S4", [Some(9000), Some(12), Some(4444), Some(1), Some(731)]),
    ];
    let rows = compute_frequencies(&samples, 2).unwrap();
    for s in &samples {
        let sum: f64 = rows
            .iter()
            .filter(|r| r.sample == s.sample)
            .map(|r| r.percentage)
            .sum();
        // five values each rounded to 2 decimals
        assert!((sum - 100.0).abs() <= 0.025 + 1e-9, "{} sums to {}", s.sample, sum);
    }
}

#[test]
fn empty_sample_yields_zero_rows_not_missing_rows() {
    let samples = vec![
        sample("S1", [None, None, None, None, None]),
        sample("S2", [Some(0), Some(0), Some(0), Some(0), Some(0)]),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    assert_eq!(rows.len(), 10);
    assert!(rows.iter().all(|r| r.percentage == 0.0 && r.total_count == 0));
}

#[test]
fn missing_counts_are_zero_in_total() {
    let s = sample("S1", [Some(30), None, Some(70), None, None]);
    let rows = sample_frequencies(&s);
    assert_eq!(pct(&rows, "S1", Population::BCell), 30.0);
    assert_eq!(pct(&rows, "S1", Population::Cd4TCell), 70.0);
    let cd8 = rows
        .iter()
        .find(|r| r.population == Population::Cd8TCell)
        .unwrap();
    assert_eq!(cd8.count, 0);
    assert_eq!(cd8.total_count, 100);
}

#[test]
fn huge_counts_saturate_the_total() {
    let s = sample("S1", [Some(u64::MAX), Some(1), None, None, None]);
    let rows = sample_frequencies(&s);
    assert!(rows.iter().all(|r| r.total_count == u64::MAX));
    assert_eq!(pct(&rows, "S1", Population::BCell), 100.0);
    assert_eq!(pct(&rows, "S1", Population::Cd8TCell), 0.0);
}

#[test]
fn output_preserves_input_order() {
    let samples = vec![
        sample("S3", [Some(1), Some(2), Some(3), Some(4), Some(5)]),
        sample("S1", [Some(5), Some(4), Some(3), Some(2), Some(1)]),
        sample("S2", [Some(1), Some(1), Some(1), Some(1), Some(1)]),
    ];
    let rows = compute_frequencies(&samples, 3).unwrap();
    let order: Vec<&str> = rows.iter().step_by(5).map(|r| r.sample.as_str()).collect();
    assert_eq!(order, vec!["S3", "S1", "S2"]);
    let pops: Vec<Population> = rows.iter().take(5).map(|r| r.population).collect();
    assert_eq!(pops, Population::ALL.to_vec());
}

#[test]
fn permutation_gives_same_rows() {
    let samples = vec![
        sample("S1", [Some(10), Some(20), Some(30), Some(40), Some(50)]),
        sample("S2", [Some(7), None, Some(3), Some(0), Some(11)]),
        sample("S3", [Some(0), Some(0), Some(0), Some(0), Some(0)]),
    ];
    let mut reversed = samples.clone();
    reversed.reverse();

    let key = |r: &FrequencyRow| (r.sample.clone(), r.population);
    let mut a = compute_frequencies(&samples, 0).unwrap();
    let mut b = compute_frequencies(&reversed, 0).unwrap();
    a.sort_by_key(key);
    b.sort_by_key(key);
    assert_eq!(a, b);

    // idempotent
    let again = compute_frequencies(&samples, 0).unwrap();
    assert_eq!(compute_frequencies(&samples, 0).unwrap(), again);
}

#[test]
fn summary_statistics_per_population() {
    let samples = vec![
        sample("S1", [Some(50), Some(50), Some(0), Some(0), Some(0)]),
        sample("S2", [Some(10), Some(90), Some(0), Some(0), Some(0)]),
        sample("S3", [Some(30), Some(70), Some(0), Some(0), Some(0)]),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    let summary = summary_statistics(&rows);
    assert_eq!(summary.len(), 5);
    let b = &summary[0];
    assert_eq!(b.population, Population::BCell);
    assert_eq!(b.mean, 30.0);
    assert_eq!(b.std, 20.0);
    assert_eq!(b.min, 10.0);
    assert_eq!(b.max, 50.0);
    assert_eq!(b.median, 30.0);
    assert!(summary_statistics(&[]).is_empty());
}
