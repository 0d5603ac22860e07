// ==========================================
// 批量导入 - 端到端测试
// ==========================================
// 场景: 部分失败 / 条目截断 / 截止时间
// ==========================================


use cargo_logistics::config::ImportConfig;
use test_helpers::{manifest_request, test_env};

#[tokio::test]
async fn test_partial_failure_keeps_remaining_entries() {
    let env = test_env();
    let api = env.import_api();

    let good_a = env.write_file("first.csv", &["ITEM NO,TOTAL CTNS", "A-1,10"]);
    let bad = env.write_file("broken.csv", &["ITEM NO,TOTAL CTNS"]); // 只有表头
    let good_b = env.write_file("third.csv", &["ITEM NO,TOTAL CTNS", "B-1,5"]);

    let report = api
        .upload_batch(vec![
            manifest_request(good_a, "first.csv"),
            manifest_request(bad, "broken.csv"),
            manifest_request(good_b, "third.csv"),
        ])
        .await;

    assert!(!report.ok);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.total, 3);

    // 结果保持提交顺序，失败行带行号与原因
    assert!(report.results[0].ok);
    assert!(!report.results[1].ok);
    assert!(report.results[1].message.starts_with("Row 2:"));
    assert!(
        report.results[1].message.contains("No rows detected"),
        "got {}",
        report.results[1].message
    );
    assert!(report.results[2].ok);

    // 失败条目不影响其它条目落库
    assert_eq!(env.count("SELECT COUNT(*) FROM shipments"), 2);
}

#[tokio::test]
async fn test_batch_truncates_beyond_entry_limit() {
    let env = test_env();
    let config = ImportConfig {
        max_batch_entries: 2,
        ..env.default_config()
    };
    let api = env.import_api_with(config);

    let requests = (1..=4)
        .map(|i| {
            let name = format!("m{i}.csv");
            let path = env.write_file(&name, &["ITEM NO,TOTAL CTNS", "A-1,1"]);
            manifest_request(path, &name)
        })
        .collect();

    let report = api.upload_batch(requests).await;
    assert!(!report.ok);
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.succeeded, 2);
    assert_eq!(report.summary.truncated, 2);
    assert_eq!(env.count("SELECT COUNT(*) FROM shipments"), 2);
}

#[tokio::test]
async fn test_deadline_skips_unstarted_entries() {
    let env = test_env();
    let config = ImportConfig {
        batch_deadline_secs: 0, // 立即过期
        ..env.default_config()
    };
    let api = env.import_api_with(config);

    let path = env.write_file("late.csv", &["ITEM NO,TOTAL CTNS", "A-1,1"]);
    let report = api
        .upload_batch(vec![manifest_request(path, "late.csv")])
        .await;

    assert_eq!(report.summary.failed, 1);
    assert_eq!(
        report.results[0].message,
        "Row 1: skipped: deadline exceeded"
    );
    assert_eq!(env.count("SELECT COUNT(*) FROM shipments"), 0);
}
