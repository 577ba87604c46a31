//! Collectors pick up the process-wide prefix at construction. The prefix is
//! global, so this lives in its own test binary.

use procstat_core::set_default_prefix;
use procstat_metrics::Collector;

#[test]
fn collector_uses_process_prefix() {
    set_default_prefix("app_").unwrap();

    let mut collector = Collector::new();
    assert_eq!(collector.prefix(), "app_");
    collector
        .process(r#"{"type":"puma","running":3}"#)
        .unwrap();

    let text = collector.render();
    assert!(text.contains("# HELP app_puma_worker_running_count Active threads count\n"));
    assert!(text.contains("app_puma_worker_running_count{index=\"0\",pid=\"-1\"} 3\n"));
    assert!(set_default_prefix("late_").is_err());
}
