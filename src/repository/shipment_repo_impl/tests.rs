use super::core::ShipmentRepositoryImpl;
use crate::db::init_schema;
use crate::domain::shipment::{
    NewShipment, NewShipmentItem, ShipmentOverwrite, ShipmentStatus,
};
use crate::repository::shipment_repo::ShipmentRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn test_repo() -> ShipmentRepositoryImpl {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    ShipmentRepositoryImpl::new(Arc::new(Mutex::new(conn)))
}

fn sample_shipment(tracking: &str) -> NewShipment {
    NewShipment {
        user_id: None,
        tracking_number: tracking.to_string(),
        customer_tracking_code: None,
        container_number: Some("UETU7636640".to_string()),
        shipping_code: None,
        product_description: "Imported from manifest (2 items)".to_string(),
        cartons: 15,
        total_qty: 250,
        cbm: 0.0,
        total_cbm: 15.5,
        weight: None,
        gross_weight: Some(420.0),
        total_gw: 420.0,
        total_amount: 0.0,
        status: ShipmentStatus::EnRoute,
    }
}

fn sample_items() -> Vec<NewShipmentItem> {
    vec![
        NewShipmentItem {
            item_no: Some("A-1".to_string()),
            description: Some("Shoes".to_string()),
            cartons: Some(10),
            total_qty: Some(200),
            ..Default::default()
        },
        NewShipmentItem {
            item_no: Some("A-2".to_string()),
            description: Some("Bags".to_string()),
            cartons: Some(5),
            total_qty: Some(50),
            ..Default::default()
        },
    ]
}

#[tokio::test]
async fn test_create_and_find_by_tracking() {
    let repo = test_repo();
    let id = repo
        .create_shipment(sample_shipment("MANIFEST"), sample_items())
        .await
        .unwrap();

    assert!(repo.tracking_exists("MANIFEST").await.unwrap());
    assert!(!repo.tracking_exists("OTHER").await.unwrap());

    let found = repo.find_by_tracking("MANIFEST").await.unwrap().unwrap();
    assert_eq!(found.shipment_id, id);
    assert_eq!(found.cartons, 15);
    assert_eq!(found.status, ShipmentStatus::EnRoute);

    let items = repo.list_items(id).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_no.as_deref(), Some("A-1"));
}

#[tokio::test]
async fn test_duplicate_tracking_rejected() {
    let repo = test_repo();
    repo.create_shipment(sample_shipment("DUP"), vec![])
        .await
        .unwrap();
    let err = repo
        .create_shipment(sample_shipment("DUP"), vec![])
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("tracking_number"), "unexpected error: {msg}");
}

#[tokio::test]
async fn test_overwrite_replaces_items_and_keeps_identity() {
    let repo = test_repo();
    let id = repo
        .create_shipment(sample_shipment("REPORT"), sample_items())
        .await
        .unwrap();

    let update = ShipmentOverwrite {
        product_description: "Imported from manifest (1 items)".to_string(),
        cartons: 3,
        total_qty: 30,
        cbm: 0.0,
        total_cbm: 2.0,
        weight: None,
        gross_weight: None,
        total_gw: 0.0,
        total_amount: 0.0,
        status: ShipmentStatus::EnRoute,
    };
    let new_items = vec![NewShipmentItem {
        item_no: Some("B-9".to_string()),
        cartons: Some(3),
        ..Default::default()
    }];

    let hit = repo
        .overwrite_shipment("REPORT", update, new_items)
        .await
        .unwrap();
    assert_eq!(hit, Some(id));

    let after = repo.find_by_tracking("REPORT").await.unwrap().unwrap();
    assert_eq!(after.shipment_id, id); // 主键不变
    assert_eq!(after.cartons, 3);
    assert_eq!(
        after.container_number.as_deref(),
        Some("UETU7636640") // 身份字段不被覆盖
    );

    let items = repo.list_items(id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item_no.as_deref(), Some("B-9"));
}

#[tokio::test]
async fn test_overwrite_missing_tracking_is_noop() {
    let repo = test_repo();
    let update = ShipmentOverwrite {
        product_description: String::new(),
        cartons: 0,
        total_qty: 0,
        cbm: 0.0,
        total_cbm: 0.0,
        weight: None,
        gross_weight: None,
        total_gw: 0.0,
        total_amount: 0.0,
        status: ShipmentStatus::EnRoute,
    };
    let hit = repo
        .overwrite_shipment("NOPE", update, vec![])
        .await
        .unwrap();
    assert_eq!(hit, None);
}

#[tokio::test]
async fn test_update_status() {
    let repo = test_repo();
    let id = repo
        .create_shipment(sample_shipment("S1"), vec![])
        .await
        .unwrap();

    assert!(repo
        .update_status(id, &ShipmentStatus::Arrived)
        .await
        .unwrap());
    let after = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(after.status, ShipmentStatus::Arrived);

    assert!(!repo
        .update_status(9999, &ShipmentStatus::Arrived)
        .await
        .unwrap());
}
