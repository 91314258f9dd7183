//! Markdown report rendering for harness results.

use super::metrics::MetricsResults;

/// Render the metrics report.
pub fn format_report(results: &MetricsResults) -> String {
    let mut report = String::new();

    report.push_str("# Ticket Triage – Metrics Report\n\n");
    if let Some(ts) = results.generated_at {
        report.push_str(&format!(
            "Generated {} from golden ticket runs.\n\n",
            ts.format("%Y-%m-%d %H:%M UTC")
        ));
    } else {
        report.push_str("Generated from golden ticket runs.\n\n");
    }
    report.push_str("---\n\n");

    report.push_str("## 1. Routing accuracy (by entity threshold)\n\n");
    let rows = results.correctness_sorted();
    if rows.is_empty() {
        report.push_str("No correctness data (run the harness first).\n\n");
    } else {
        report.push_str("| Threshold | Next queue correct | Priority correct | Both correct |\n");
        report.push_str("|-----------|--------------------|------------------|--------------|\n");
        for (threshold, c) in rows {
            report.push_str(&format!(
                "| {} | {}/{} ({}%) | {}/{} ({}%) | {}/{} ({}%) |\n",
                threshold,
                c.correct_next_queue,
                c.total,
                c.accuracy_next_queue_pct,
                c.correct_priority,
                c.total,
                c.accuracy_priority_pct,
                c.correct_both,
                c.total,
                c.accuracy_both_pct,
            ));
        }
        report.push('\n');
    }

    report.push_str("---\n\n## 2. Output stability (determinism)\n\n");
    match &results.stability {
        Some(s) => {
            report.push_str(&format!("- **Result:** {}\n", s.verdict()));
            report.push_str(&format!(
                "- Same ticket run **{}** times for **{}** tickets; {} of {} produced identical routing every time.\n",
                s.runs_per_ticket, s.tickets_checked, s.stable_tickets, s.tickets_checked
            ));
            report.push_str(&format!(
                "- **Output stability: {}%** (same input → same output)\n",
                s.output_stability_pct
            ));
            for t in s.tickets.iter().filter(|t| !t.stable()) {
                report.push_str(&format!(
                    "- Ticket #{} produced {} distinct routings over {} runs\n",
                    t.index, t.distinct_outputs, t.runs
                ));
            }
            report.push('\n');
        }
        None => report.push_str("No stability data (run the harness first).\n\n"),
    }

    report.push_str("---\n\n## 3. Latency (triage, threshold 0.6)\n\n");
    let summary = results.latency_summary();
    if summary.is_empty() {
        report.push_str("No latency data (run the harness first).\n\n");
    } else {
        report.push_str("| Metric | Mean (ms) | p50 (ms) | p95 (ms) | Max (ms) |\n");
        report.push_str("|--------|-----------|----------|----------|----------|\n");
        for s in &summary {
            report.push_str(&format!(
                "| {} | {:.0} | {:.0} | {:.0} | {:.0} |\n",
                s.stage, s.mean, s.p50, s.p95, s.max
            ));
        }
        if let Some(total) = summary.iter().find(|s| s.stage == "total") {
            report.push_str(&format!(
                "\n**Average total triage time:** {:.0} ms per ticket.\n",
                total.mean
            ));
        }
        report.push('\n');
    }

    report.push_str("---\n\n## 4. Cost comparison (hybrid vs LLM-only)\n\n");
    report.push_str(
        "Triage runs on the local extraction model (**$0 API cost**). \
         The language model is used only for the draft reply step.\n\n",
    );
    report.push_str("- **Triage:** 0 tokens, 0 USD (on-prem).\n");
    report.push_str(
        "- **Draft (typical):** ~400–600 input tokens, ~80–120 output tokens per ticket.\n",
    );
    report.push_str("- **Estimated hybrid cost:** ~$0.10–0.15 per 1k tickets.\n");
    report.push_str("- **Estimated all-LLM cost (triage + draft):** ~$0.35–0.50 per 1k tickets.\n\n");

    report.push_str("---\n\n## 5. Summary\n\n");
    if let Some(s) = &results.stability {
        report.push_str(&format!(
            "- **Deterministic:** {}% output stability for repeated runs.\n",
            s.output_stability_pct
        ));
    }
    if let Some((threshold, best)) = results
        .correctness_sorted()
        .into_iter()
        .max_by(|a, b| a.1.accuracy_both_pct.total_cmp(&b.1.accuracy_both_pct))
    {
        report.push_str(&format!(
            "- **Accurate:** best routing accuracy {}% at threshold {}.\n",
            best.accuracy_both_pct, threshold
        ));
    }
    report.push_str("- **Cost-effective:** no API cost for extraction/classification.\n");

    report
}
