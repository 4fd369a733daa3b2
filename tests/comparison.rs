use kira_cellcohort::schema::v1::{ComparisonOutcome, Population, Response, Sample, Sex, Significance};
use kira_cellcohort::scores::comparison::{
    CohortKey, INSUFFICIENT_DATA, compare_response, group_stats_by,
};
use kira_cellcohort::scores::frequency::compute_frequencies;

/// Sample whose cd8 share is `cd8` percent, the rest being B cells.
fn sample(id: &str, treatment: &str, response: Response, cd8: u64) -> Sample {
    Sample {
        sample: id.to_string(),
        project: "P1".to_string(),
        subject: format!("SUB_{}", id),
        age: 55,
        sex: Sex::F,
        condition: "melanoma".to_string(),
        treatment: treatment.to_string(),
        sample_type: "PBMC".to_string(),
        time_from_treatment_start: 0,
        response,
        b_cell: Some(100 - cd8),
        cd8_t_cell: Some(cd8),
        cd4_t_cell: Some(0),
        nk_cell: Some(0),
        monocyte: Some(0),
    }
}

#[test]
fn single_point_groups_report_insufficient_data() {
    let samples = vec![
        sample("S1", "tr1", Response::Responder, 60),
        sample("S2", "tr1", Response::NonResponder, 20),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    let ComparisonOutcome::Compared(table) = compare_response(&rows, &samples) else {
        panic!("expected a comparison table");
    };
    assert_eq!(table.len(), 5);
    let cd8 = table
        .iter()
        .find(|r| r.population == Population::Cd8TCell)
        .unwrap();
    assert_eq!(cd8.mean_difference, 40.0);
    assert_eq!(cd8.responder_std, 0.0);
    assert_eq!(cd8.t_stat, None);
    assert_eq!(cd8.p_value, None);
    assert_eq!(cd8.cohens_d, 0.0);
    assert_eq!(cd8.significance, Significance::Insufficient);
}

#[test]
fn one_sided_split_yields_no_table() {
    let samples = vec![
        sample("S1", "tr1", Response::Responder, 60),
        sample("S2", "tr1", Response::Responder, 50),
        sample("S3", "tr1", Response::Unknown, 10),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    assert_eq!(
        compare_response(&rows, &samples),
        ComparisonOutcome::Insufficient(INSUFFICIENT_DATA.to_string())
    );
    assert_eq!(
        compare_response(&[], &[]),
        ComparisonOutcome::Insufficient(INSUFFICIENT_DATA.to_string())
    );
}

#[test]
fn clear_separation_is_significant() {
    let samples = vec![
        sample("R1", "tr1", Response::Responder, 60),
        sample("R2", "tr1", Response::Responder, 62),
        sample("R3", "tr1", Response::Responder, 58),
        sample("N1", "tr1", Response::NonResponder, 20),
        sample("N2", "tr1", Response::NonResponder, 22),
        sample("N3", "tr1", Response::NonResponder, 18),
        sample("U1", "tr1", Response::Unknown, 99),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    let ComparisonOutcome::Compared(table) = compare_response(&rows, &samples) else {
        panic!("expected a comparison table");
    };
    let cd8 = table
        .iter()
        .find(|r| r.population == Population::Cd8TCell)
        .unwrap();
    assert_eq!(cd8.responder_n, 3);
    assert_eq!(cd8.non_responder_n, 3);
    assert_eq!(cd8.responder_mean, 60.0);
    assert_eq!(cd8.non_responder_mean, 20.0);
    assert_eq!(cd8.mean_difference, 40.0);
    // pooled sd = 2, se = 2 * sqrt(2/3)
    let t = cd8.t_stat.unwrap();
    assert!((t - 40.0 / (2.0 * (2.0f64 / 3.0).sqrt())).abs() < 1e-9);
    assert!(cd8.p_value.unwrap() < 0.001);
    assert_eq!(cd8.significance, Significance::VeryHigh);
    assert!((cd8.cohens_d - 20.0).abs() < 1e-9);

    // constant zero populations: no variance, no test
    let nk = table
        .iter()
        .find(|r| r.population == Population::NkCell)
        .unwrap();
    assert_eq!(nk.significance, Significance::Insufficient);
    assert_eq!(nk.cohens_d, 0.0);
}

#[test]
fn group_stats_by_treatment() {
    let samples = vec![
        sample("S1", "tr1", Response::Responder, 60),
        sample("S2", "tr1", Response::NonResponder, 20),
        sample("S3", "tr2", Response::Responder, 35),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    let stats = group_stats_by(&rows, &samples, CohortKey::Treatment);
    assert_eq!(stats.len(), 10);

    let tr1_cd8 = stats
        .iter()
        .find(|g| g.cohort == "tr1" && g.population == Population::Cd8TCell)
        .unwrap();
    assert_eq!(tr1_cd8.n, 2);
    assert_eq!(tr1_cd8.mean, 40.0);
    assert_eq!(tr1_cd8.min, 20.0);
    assert_eq!(tr1_cd8.max, 60.0);
    assert_eq!(tr1_cd8.median, 40.0);

    let tr2_cd8 = stats
        .iter()
        .find(|g| g.cohort == "tr2" && g.population == Population::Cd8TCell)
        .unwrap();
    assert_eq!(tr2_cd8.n, 1);
    assert_eq!(tr2_cd8.mean, 35.0);
    assert_eq!(tr2_cd8.std, 0.0);

    let cohorts: Vec<&str> = stats.iter().map(|g| g.cohort.as_str()).collect();
    assert_eq!(&cohorts[..5], &["tr1"; 5]);
    assert_eq!(&cohorts[5..], &["tr2"; 5]);
}

#[test]
fn group_stats_by_response_uses_labels() {
    let samples = vec![
        sample("S1", "tr1", Response::Responder, 60),
        sample("S2", "tr1", Response::NonResponder, 20),
    ];
    let rows = compute_frequencies(&samples, 0).unwrap();
    let stats = group_stats_by(&rows, &samples, CohortKey::Response);
    assert!(stats.iter().any(|g| g.cohort == "responder"));
    assert!(stats.iter().any(|g| g.cohort == "non-responder"));
    assert!(group_stats_by(&[], &samples, CohortKey::Response).is_empty());
}
