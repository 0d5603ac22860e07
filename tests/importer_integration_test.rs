// ==========================================
// 舱单导入 - 集成测试
// ==========================================
// 场景: 表头同义词 / 文件名派生跟踪号 / 新建与覆盖两种模式 /
//       客户归属 / 空数据文件
// ==========================================


use cargo_logistics::api::ApiError;
use cargo_logistics::engine::ImportMode;
use test_helpers::{insert_customer, manifest_request, test_env};

#[tokio::test]
async fn test_header_synonyms_produce_identical_shipments() {
    let env = test_env();
    let api = env.import_api();

    let a = env.write_file(
        "variant_a.csv",
        &[
            "ITEM NO.,DESCRIPTION,TOTAL CTNS,QTY/CTN,TOTALQTY,TOTAL CBM,TOTAL GW",
            "A-1,Shoes,10,20,200,12.5,300",
            "A-2,Bags,5,10,50,3.0,120",
        ],
    );
    let b = env.write_file(
        "variant_b.csv",
        &[
            "Item No,Desc,CTNS TOTAL,Qty Per Carton,Total Qty,Total CBM,Total Gross Weight",
            "A-1,Shoes,10,20,200,12.5,300",
            "A-2,Bags,5,10,50,3.0,120",
        ],
    );

    let out_a = api
        .upload_manifest(manifest_request(a, "variant_a.csv"))
        .await
        .unwrap();
    let out_b = api
        .upload_manifest(manifest_request(b, "variant_b.csv"))
        .await
        .unwrap();

    assert_eq!(out_a.totals, out_b.totals);
    assert_eq!(out_a.totals.cartons, 15);
    assert_eq!(out_a.totals.total_qty, 250);
    assert!((out_a.totals.total_cbm - 15.5).abs() < 1e-9);
    assert!((out_a.totals.total_gw - 420.0).abs() < 1e-9);
    assert_eq!(out_a.item_count, 2);
}

#[tokio::test]
async fn test_tracking_number_and_description_from_filename() {
    let env = test_env();
    let api = env.import_api();

    let file = env.write_file(
        "March Report (final).csv",
        &["ITEM NO,TOTAL CTNS", "A-1,10"],
    );
    let out = api
        .upload_manifest(manifest_request(file, "March Report (final).csv"))
        .await
        .unwrap();

    assert_eq!(out.tracking_number, "MarchReportfinal");

    let described = env.count(
        "SELECT COUNT(*) FROM shipments \
         WHERE product_description = 'Imported from March Report (final).csv (1 items)'",
    );
    assert_eq!(described, 1);
}

#[tokio::test]
async fn test_create_new_mode_appends_suffix_on_collision() {
    let env = test_env();
    let api = env.import_api();

    let lines = &["ITEM NO,TOTAL CTNS", "A-1,10"];
    for expected in ["REPORT", "REPORT-2", "REPORT-3"] {
        let file = env.write_file("REPORT.csv", lines);
        let out = api
            .upload_manifest(manifest_request(file, "REPORT.csv"))
            .await
            .unwrap();
        assert_eq!(out.tracking_number, expected);
        assert!(out.created);
    }
    assert_eq!(env.count("SELECT COUNT(*) FROM shipments"), 3);
}

#[tokio::test]
async fn test_overwrite_mode_is_idempotent() {
    let env = test_env();
    let api = env.import_api();

    let file = env.write_file(
        "WEEKLY.csv",
        &["ITEM NO,TOTAL CTNS,TOTAL CBM", "A-1,10,5.0", "A-2,5,2.5"],
    );
    let mut request = manifest_request(file, "WEEKLY.csv");
    request.mode = ImportMode::OverwriteExisting;

    // 首次：覆盖目标不存在，退化为新建
    let first = api.upload_manifest(request.clone()).await.unwrap();
    assert!(first.created);

    // 再导两次：命中同一跟踪号，明细整组重建
    for _ in 0..2 {
        let again = api.upload_manifest(request.clone()).await.unwrap();
        assert!(!again.created);
        assert_eq!(again.shipment_id, first.shipment_id);
        assert_eq!(again.tracking_number, "WEEKLY");
    }

    assert_eq!(env.count("SELECT COUNT(*) FROM shipments"), 1);
    assert_eq!(env.count("SELECT COUNT(*) FROM shipment_items"), 2);
}

#[tokio::test]
async fn test_customer_resolution_via_shipping_code_column() {
    let env = test_env();
    let api = env.import_api();
    let user_id = insert_customer(&env, "Rami", "70123456", "RK7");

    let file = env.write_file(
        "with_code.csv",
        &[
            "ITEM NO,TOTAL CTNS,SHIPPING CODE",
            "A-1,10,rk7", // 大小写不敏感
        ],
    );
    let out = api
        .upload_manifest(manifest_request(file, "with_code.csv"))
        .await
        .unwrap();

    assert_eq!(out.user_id, Some(user_id));
    let code = out.customer_tracking_code.unwrap();
    assert!(code.starts_with("rk7"), "got {code}");
    assert_eq!(code.len(), "rk7".len() + 4); // 前缀 + 4 位随机数
}

#[tokio::test]
async fn test_explicit_user_assignment_without_code_column() {
    let env = test_env();
    let api = env.import_api();
    let user_id = insert_customer(&env, "Rami", "70123456", "RK7");

    // 表格没有 shipping code 列，归属完全来自表单指派
    let file = env.write_file("assigned.csv", &["ITEM NO,TOTAL CTNS", "A-1,10"]);
    let mut request = manifest_request(file, "assigned.csv");
    request.user_id = Some(user_id);

    let out = api.upload_manifest(request).await.unwrap();
    assert_eq!(out.user_id, Some(user_id));
    // 短码前缀来自该客户档案里的 shipping code
    assert!(out.customer_tracking_code.unwrap().starts_with("rk7"));
}

#[tokio::test]
async fn test_explicit_user_wins_over_code_column() {
    let env = test_env();
    let api = env.import_api();
    let rami = insert_customer(&env, "Rami", "70123456", "RK7");
    insert_customer(&env, "Dana", "71999888", "DN1");

    let file = env.write_file(
        "claimed.csv",
        &["ITEM NO,TOTAL CTNS,SHIPPING CODE", "A-1,10,DN1"],
    );
    let mut request = manifest_request(file, "claimed.csv");
    request.user_id = Some(rami);

    let out = api.upload_manifest(request).await.unwrap();
    assert_eq!(out.user_id, Some(rami));
    assert!(out.customer_tracking_code.unwrap().starts_with("rk7"));
}

#[tokio::test]
async fn test_unregistered_shipping_code_leaves_shipment_unassigned() {
    let env = test_env();
    let api = env.import_api();

    let file = env.write_file(
        "orphan.csv",
        &["ITEM NO,TOTAL CTNS,SHIPPING CODE", "A-1,10,ZZ99"],
    );
    let out = api
        .upload_manifest(manifest_request(file, "orphan.csv"))
        .await
        .unwrap();

    assert_eq!(out.user_id, None);
    // shipping code 仍然快照在货运单上，客户注册后可回溯
    assert_eq!(
        env.count("SELECT COUNT(*) FROM shipments WHERE shipping_code = 'ZZ99'"),
        1
    );
}

#[tokio::test]
async fn test_header_only_file_reports_no_rows() {
    let env = test_env();
    let api = env.import_api();

    let file = env.write_file("empty.csv", &["ITEM NO,TOTAL CTNS"]);
    let err = api
        .upload_manifest(manifest_request(file, "empty.csv"))
        .await
        .unwrap_err();

    match err {
        ApiError::ImportError(msg) => assert!(msg.contains("No rows detected"), "got {msg}"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(env.count("SELECT COUNT(*) FROM shipments"), 0);
}

#[tokio::test]
async fn test_import_writes_audit_log() {
    let env = test_env();
    let api = env.import_api();

    let file = env.write_file("audited.csv", &["ITEM NO,TOTAL CTNS", "A-1,1"]);
    let mut request = manifest_request(file, "audited.csv");
    request.actor_id = Some(42);
    api.upload_manifest(request).await.unwrap();

    assert_eq!(
        env.count(
            "SELECT COUNT(*) FROM logs WHERE action_type = 'shipments_import' AND actor_id = 42"
        ),
        1
    );
}

#[tokio::test]
async fn test_xlsx_merged_totals_count_once() {
    // 真实 XLSX：TOTAL CBM 列 C2:C4 纵向合并，只有首行带值 12。
    // merge-aware 策略下续行写占位符，合计只计一次
    let env = test_env();
    let api = env.import_api();

    let fixture = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/merged_totals.xlsx");
    let out = api
        .upload_manifest(manifest_request(fixture, "merged_totals.xlsx"))
        .await
        .unwrap();

    assert_eq!(out.item_count, 3);
    assert!((out.totals.total_cbm - 12.0).abs() < 1e-9);
    assert_eq!(out.totals.cartons, 17);
    // 合并区续行的占位符不是数值，入库为 NULL
    assert_eq!(
        env.count("SELECT COUNT(*) FROM shipment_items WHERE total_cbm IS NULL"),
        2
    );
}

#[tokio::test]
async fn test_csv_totals_fall_back_to_downward_fill() {
    // CSV 没有合并元数据：total_cbm 空行继承上值（历史行为），
    // 文本列同样向下填充
    let env = test_env();
    let api = env.import_api();

    let file = env.write_file(
        "merged.csv",
        &[
            "ITEM NO,TOTAL CTNS,TOTAL CBM",
            "A-1,10,12.0",
            ",5,", // item_no 与 total_cbm 继承上一行
        ],
    );
    let out = api
        .upload_manifest(manifest_request(file, "merged.csv"))
        .await
        .unwrap();

    assert!((out.totals.total_cbm - 24.0).abs() < 1e-9);
    assert_eq!(
        env.count("SELECT COUNT(*) FROM shipment_items WHERE item_no = 'A-1'"),
        2
    );
}
