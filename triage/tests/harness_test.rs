//! Integration tests for the golden-set metrics harness

mod common;

use std::sync::Arc;

use common::{golden_path, service_with, Fault, KeywordExtractor};
use triage::benchmark::{format_report, StabilityResult};
use triage::{
    load_golden_tickets, GoldenTicket, HarnessConfig, HarnessError, MetricsHarness,
    MetricsResults, Preset, Priority, Queue, RoutingDecision, TicketMemory,
};

fn refund_ticket() -> GoldenTicket {
    GoldenTicket {
        preset: Preset::Billing,
        text: "Customer wants refund for invoice #123".into(),
        expected_routing: RoutingDecision::new(Queue::BillingOps, Priority::P2),
    }
}

#[tokio::test]
async fn test_refund_ticket_counts_as_both_correct() {
    let (service, _) = service_with(Arc::new(KeywordExtractor::new()));
    let golden = vec![refund_ticket()];
    let config = HarnessConfig {
        thresholds: vec![0.6],
        ..Default::default()
    };
    let harness = MetricsHarness::new(&service, &golden, config);

    let correctness = harness.run_correctness().await.unwrap();
    assert_eq!(correctness.len(), 1);
    let (threshold, acc) = &correctness[0];
    assert_eq!(*threshold, 0.6);
    assert_eq!(acc.total, 1);
    assert_eq!(acc.correct_both, 1);
    assert_eq!(acc.accuracy_both_pct, 100.0);
}

#[tokio::test]
async fn test_full_run_over_golden_fixture() {
    let golden = load_golden_tickets(&golden_path()).unwrap();
    assert_eq!(golden.len(), 45);
    for preset in Preset::ALL {
        assert_eq!(golden.iter().filter(|t| t.preset == preset).count(), 15);
    }

    let (service, memory) = service_with(Arc::new(KeywordExtractor::new()));
    let harness = MetricsHarness::new(&service, &golden, HarnessConfig::default());
    let results = harness.run().await.unwrap();

    assert_eq!(results.thresholds, vec![0.5, 0.6, 0.7, 0.75]);
    let keys: Vec<&str> = results.correctness_sorted().iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, vec!["0.5", "0.6", "0.7", "0.75"]);
    for (_, acc) in results.correctness_sorted() {
        assert_eq!(acc.total, 45);
        assert!(acc.correct_both <= acc.correct_next_queue.min(acc.correct_priority));
    }
    // the keyword extractor ignores the threshold, so every pass agrees
    let first = &results.correctness["0.5"];
    assert_eq!(&results.correctness["0.75"], first);

    let stability = results.stability.as_ref().unwrap();
    assert!(stability.passed);
    assert_eq!(stability.tickets_checked, 5);
    assert_eq!(stability.runs_per_ticket, 10);
    assert_eq!(stability.output_stability_pct, 100.0);

    assert_eq!(results.latency.len(), 45);
    assert!(results.latency.iter().all(|t| t.total >= 0.0));
    assert_eq!(memory.len(), 20);

    let report = format_report(&results);
    assert!(report.contains("**Result:** PASS"));
}

#[tokio::test]
async fn test_out_of_range_stability_indices_are_skipped() {
    let (service, _) = service_with(Arc::new(KeywordExtractor::new()));
    let golden = vec![refund_ticket()];
    let harness = MetricsHarness::new(&service, &golden, HarnessConfig::default());
    let stability: StabilityResult = harness.run_stability().await.unwrap();
    assert_eq!(stability.tickets_checked, 1);
    assert!(stability.passed);
}

#[tokio::test]
async fn test_nondeterministic_provider_fails_stability() {
    let (service, _) = service_with(Arc::new(KeywordExtractor::with_fault(Fault::Flaky)));
    let golden = vec![refund_ticket()];
    let config = HarnessConfig {
        stability_indices: vec![0],
        stability_runs: 4,
        ..Default::default()
    };
    let harness = MetricsHarness::new(&service, &golden, config);
    let stability = harness.run_stability().await.unwrap();
    assert!(!stability.passed);
    assert_eq!(stability.verdict(), "FAIL");
    assert_eq!(stability.tickets[0].distinct_outputs, 2);
}

#[tokio::test]
async fn test_provider_failure_halts_run() {
    let (service, _) =
        service_with(Arc::new(KeywordExtractor::with_fault(Fault::ClassifyUnavailable)));
    let golden = vec![refund_ticket()];
    let harness = MetricsHarness::new(&service, &golden, HarnessConfig::default());
    match harness.run().await {
        Err(HarnessError::Triage {
            index, threshold, ..
        }) => {
            assert_eq!(index, 0);
            assert_eq!(threshold, 0.5);
        }
        other => panic!("expected triage failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_results_file_feeds_report() {
    let (service, _) = service_with(Arc::new(KeywordExtractor::new()));
    let golden = vec![refund_ticket()];
    let results = MetricsHarness::new(&service, &golden, HarnessConfig::default())
        .run()
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".metrics_results.json");
    results.write_to(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["correctness"]["0.6"]["correct_both"].is_number());
    assert_eq!(raw["stability"]["passed"], true);
    assert_eq!(raw["latency"].as_array().unwrap().len(), 1);

    let loaded = MetricsResults::read_from(&path).unwrap();
    let report = format_report(&loaded);
    assert!(report.contains("| 0.6 | 1/1 (100%) | 1/1 (100%) | 1/1 (100%) |"));
}

#[tokio::test]
async fn test_unknown_preset_runs_with_default_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("golden.json");
    std::fs::write(
        &path,
        r#"[{"preset": "enterprise", "text": "How do I rotate an API token?",
             "expected_routing": {"next_queue": "general_support", "priority": "P3"}}]"#,
    )
    .unwrap();

    let golden = load_golden_tickets(&path).unwrap();
    assert_eq!(golden[0].preset, Preset::SaasSupport);

    let (service, _) = service_with(Arc::new(KeywordExtractor::new()));
    let config = HarnessConfig {
        thresholds: vec![0.6],
        stability_runs: 2,
        ..Default::default()
    };
    let results = MetricsHarness::new(&service, &golden, config)
        .run()
        .await
        .unwrap();
    assert_eq!(results.correctness["0.6"].correct_both, 1);
    assert!(results.stability.unwrap().passed);
}
