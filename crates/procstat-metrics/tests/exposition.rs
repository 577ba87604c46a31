//! End-to-end exposition scenarios.
//!
//! Payloads go in as raw JSON exactly as a producer would send them; the
//! assertions are on the rendered Prometheus text.

use procstat_metrics::{Collector, WorkerPoolCollector};
use serde_json::json;

fn collector_with_x() -> Collector {
    let mut collector = Collector::with_prefix("").unwrap();
    collector.register_type("x", |t| Box::new(WorkerPoolCollector::new(t)));
    collector
}

fn cluster_payload(type_name: &str) -> String {
    let worker_status: Vec<_> = [10, 11]
        .iter()
        .enumerate()
        .map(|(index, pid)| {
            json!({
                "pid": pid,
                "index": index,
                "phase": 3,
                "booted": true,
                "last_checkin": "2026-10-19T10:00:00Z",
                "last_status": {"running": 4, "backlog": 1, "max_threads": 4, "pool_capacity": 0}
            })
        })
        .collect();

    json!({
        "type": type_name,
        "workers": 2,
        "booted_workers": 2,
        "old_workers": 0,
        "phase": 3,
        "worker_status": worker_status
    })
    .to_string()
}

#[test]
fn single_process_payload() {
    let mut collector = collector_with_x();
    collector
        .process(r#"{"type":"x","running":3,"backlog":4,"pool_capacity":0,"max_threads":3}"#)
        .unwrap();

    let text = collector.render();
    assert!(text.contains("x_running_count{index=\"0\",pid=\"-1\"} 3\n"));
    assert!(text.contains("x_backlog_count{index=\"0\",pid=\"-1\"} 4\n"));
    assert!(text.contains("x_max_threads_count{index=\"0\",pid=\"-1\"} 3\n"));
    assert!(text.contains("x_pool_capacity{index=\"0\",pid=\"-1\"} 0\n"));
}

#[test]
fn clustered_payload() {
    let mut collector = collector_with_x();
    collector.process(&cluster_payload("x")).unwrap();

    let text = collector.render();
    assert!(text.contains("x_workers_count 2\n"));
    assert!(text.contains("x_booted_count 2\n"));
    assert!(text.contains("x_old_count 0\n"));
    for (index, pid) in [(0, 10), (1, 11)] {
        assert!(text.contains(&format!("x_running_count{{index=\"{index}\",pid=\"{pid}\"}} 4\n")));
        assert!(text.contains(&format!("x_backlog_count{{index=\"{index}\",pid=\"{pid}\"}} 1\n")));
    }
}

#[test]
fn builtin_puma_names() {
    let mut collector = Collector::with_prefix("").unwrap();
    collector.process(&cluster_payload("puma")).unwrap();

    let text = collector.render();
    assert!(text.contains("# HELP puma_cluster_workers_count Configured workers count\n"));
    assert!(text.contains("# TYPE puma_cluster_workers_count gauge\n"));
    assert!(text.contains("puma_cluster_workers_count 2\n"));
    assert!(text.contains("puma_worker_max_threads_count{index=\"1\",pid=\"11\"} 4\n"));
    assert!(text.contains("puma_worker_pool_capacity{index=\"0\",pid=\"10\"} 0\n"));
}

#[test]
fn reprocessing_is_idempotent() {
    let mut collector = collector_with_x();
    let payload = cluster_payload("x");
    collector.process(&payload).unwrap();
    let first = collector.render();
    collector.process(&payload).unwrap();
    assert_eq!(collector.render(), first);
}

#[test]
fn exact_rendering_of_single_payload() {
    let mut collector = collector_with_x();
    collector
        .process(r#"{"type":"x","running":3,"backlog":4}"#)
        .unwrap();
    assert_eq!(
        collector.render(),
        "# HELP x_backlog_count Backlog size\n\
         # TYPE x_backlog_count gauge\n\
         x_backlog_count{index=\"0\",pid=\"-1\"} 4\n\
         # HELP x_running_count Active threads count\n\
         # TYPE x_running_count gauge\n\
         x_running_count{index=\"0\",pid=\"-1\"} 3\n"
    );
}

#[test]
fn missing_fields_do_not_reset() {
    let mut collector = collector_with_x();
    collector
        .process(r#"{"type":"x","running":3,"backlog":4}"#)
        .unwrap();
    collector.process(r#"{"type":"x","running":1}"#).unwrap();

    let text = collector.render();
    assert!(text.contains("x_running_count{index=\"0\",pid=\"-1\"} 1\n"));
    assert!(text.contains("x_backlog_count{index=\"0\",pid=\"-1\"} 4\n"));
}

#[test]
fn custom_labels_on_job_counters() {
    let mut collector = Collector::with_prefix("").unwrap();
    for payload in [
        json!({"type": "sidekiq", "name": "String", "success": true, "duration": 0.5,
               "custom_labels": {"service": "service1"}}),
        json!({"type": "sidekiq", "name": "FalseClass", "success": false, "duration": 0.1,
               "custom_labels": {"service": "service1"}}),
    ] {
        collector.process(&payload.to_string()).unwrap();
    }

    let text = collector.render();
    assert!(text.contains(r#"sidekiq_failed_jobs_total{job_name="FalseClass",service="service1"} 1"#));
    assert!(text.contains(r#"sidekiq_jobs_total{job_name="String",service="service1"} 1"#));
    assert!(text.contains(r#"sidekiq_job_duration_seconds_total{job_name="FalseClass",service="service1"}"#));
}

#[test]
fn custom_labels_split_buckets_between_deployments() {
    let mut collector = collector_with_x();
    collector
        .process(r#"{"type":"x","running":2,"custom_labels":{"deploy":"blue"}}"#)
        .unwrap();
    collector
        .process(r#"{"type":"x","running":5,"custom_labels":{"deploy":"green"}}"#)
        .unwrap();

    let text = collector.render();
    assert!(text.contains("x_running_count{deploy=\"blue\",index=\"0\",pid=\"-1\"} 2\n"));
    assert!(text.contains("x_running_count{deploy=\"green\",index=\"0\",pid=\"-1\"} 5\n"));
    assert_eq!(text.matches("# HELP x_running_count").count(), 1);
}

#[test]
fn delayed_job_counters() {
    let mut collector = Collector::with_prefix("").unwrap();
    collector
        .process(r#"{"type":"delayed_job","name":"Class","success":true,"duration":2}"#)
        .unwrap();
    collector
        .process(r#"{"type":"delayed_job","name":"Object","success":false,"duration":1}"#)
        .unwrap();

    let text = collector.render();
    assert!(text.contains("delayed_failed_jobs_total{job_name=\"Object\"} 1\n"));
    assert!(text.contains("delayed_jobs_total{job_name=\"Class\"} 1\n"));
    assert!(text.contains("delayed_job_duration_seconds_total{job_name=\"Class\"} 2\n"));
}

#[test]
fn unknown_type_leaves_other_metrics_alone() {
    let mut collector = collector_with_x();
    collector.process(&cluster_payload("x")).unwrap();
    let before = collector.render();

    collector
        .process(r#"{"type":"never_seen","workers":100,"running":100}"#)
        .unwrap();
    assert_eq!(collector.render(), before);
    assert!(collector.type_names().contains(&"never_seen"));
}

#[test]
fn overlapping_owners_render_one_series() {
    let mut collector = Collector::with_prefix("").unwrap();
    collector.register_type("puma_worker", |t| Box::new(WorkerPoolCollector::new(t)));
    collector.process(r#"{"type":"puma","running":3}"#).unwrap();
    collector.process(r#"{"type":"puma_worker","running":9}"#).unwrap();

    let text = collector.render();
    let series: Vec<&str> = text
        .lines()
        .filter(|line| line.starts_with("puma_worker_running_count{"))
        .collect();
    assert_eq!(series, vec![r#"puma_worker_running_count{index="0",pid="-1"} 3"#]);
    assert_eq!(text.matches("# TYPE puma_worker_running_count ").count(), 1);
}

#[test]
fn process_stats_payload() {
    let mut collector = Collector::with_prefix("").unwrap();
    let payload = json!({
        "type": "process",
        "process_type": "web",
        "pid": 4242,
        "rss": 81920000,
        "v8_heap_count": 1,
        "major_gc_ops_total": 12,
        "minor_gc_ops_total": 40
    });
    collector.process(&payload.to_string()).unwrap();

    let text = collector.render();
    assert!(text.contains("v8_heap_count{pid=\"4242\",type=\"web\"} 1\n"));
    assert!(text.contains("rss{pid=\"4242\",type=\"web\"} 81920000\n"));
    assert!(text.contains("# TYPE minor_gc_ops_total counter\n"));
    assert!(text.contains("minor_gc_ops_total{pid=\"4242\",type=\"web\"} 40\n"));
}
