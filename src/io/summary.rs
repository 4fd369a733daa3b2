use crate::ctx::Ctx;
use crate::math::stats::format_p_value;
use crate::schema::v1::ComparisonOutcome;

pub fn format_summary(ctx: &Ctx) -> String {
    let version = env!("CARGO_PKG_VERSION");
    let mut out = String::new();
    out.push_str(&format!("kira-cellcohort v{}\n", version));
    out.push_str(&format!("Store: {} ({})\n", ctx.db_path.display(), ctx.store_status));
    out.push_str(&format!(
        "Cohort: {} of {} samples, filter={}\n",
        ctx.cohort.len(),
        ctx.samples.len(),
        ctx.effective_filter()
    ));

    if !ctx.summary.is_empty() {
        out.push_str("Mean frequency:");
        for s in &ctx.summary {
            out.push_str(&format!(" {}={:.2}%", s.population, s.mean));
        }
        out.push('\n');
    }

    match &ctx.response {
        Some(ComparisonOutcome::Compared(rows)) => {
            let significant: Vec<String> = rows
                .iter()
                .filter(|r| r.p_value.is_some_and(|p| p < 0.05))
                .map(|r| {
                    format!(
                        "{} ({}, p={})",
                        r.population,
                        r.significance,
                        r.p_value.map(format_p_value).unwrap_or_default()
                    )
                })
                .collect();
            if significant.is_empty() {
                out.push_str("Responder vs non-responder: no significant differences\n");
            } else {
                out.push_str(&format!(
                    "Responder vs non-responder: {}\n",
                    significant.join(", ")
                ));
            }
        }
        Some(ComparisonOutcome::Insufficient(reason)) => {
            out.push_str(&format!("Responder vs non-responder: {}\n", reason));
        }
        None => {}
    }

    if let Some(baseline) = &ctx.baseline {
        out.push_str(&format!("Baseline cohort: {} samples\n", baseline.n_samples));
    }

    if !ctx.warnings.is_empty() {
        out.push_str(&format!("Warnings: {}\n", ctx.warnings.len()));
    }
    out
}
