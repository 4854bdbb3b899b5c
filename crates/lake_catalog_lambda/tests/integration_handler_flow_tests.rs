use std::collections::HashSet;

use lake_catalog_core::contract::FeedRef;
use lake_catalog_core::custom_resource::ResponseStatus;
use lake_catalog_core::grants::CatalogResource;
use lake_catalog_lambda::handlers::dead_letter::handle_dead_letter_event;
use lake_catalog_lambda::handlers::grants::{handle_grant_event, InvocationContext};
use lake_catalog_lambda::handlers::partition::{handle_partition_event, RecordOutcome};
use lake_catalog_lambda::relay::relay_notification;
use lake_catalog_lambda::test_helpers::{
    AccessCall, CapturingPublisher, CapturingResponseSender, JsonDescriptor, RecordingAccessControl,
    RecordingCatalog,
};
use serde_json::{json, Value};

const TOPIC: &str = "arn:aws:sns:eu-west-1:111122223333:dih-replies";

fn table() -> FeedRef {
    FeedRef::parse("NYK_SDW_2#WH_SOURCE_SYSTEM_DIM").expect("valid feed")
}

fn table_descriptor() -> Value {
    json!({
        "Columns": [
            {"Name": "source_system_id", "Type": "int"},
            {"Name": "source_system_name", "Type": "string"}
        ],
        "Location": "s3://lake/sdw/NYK_SDW_2/WH_SOURCE_SYSTEM_DIM",
        "InputFormat": "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat",
        "OutputFormat": "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat",
        "Compressed": false,
        "NumberOfBuckets": -1,
        "SerdeInfo": {
            "SerializationLibrary": "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe",
            "Parameters": {"serialization.format": "1"}
        },
        "Parameters": {"classification": "parquet"},
        "StoredAsSubDirectories": false
    })
}

fn catalog() -> RecordingCatalog {
    RecordingCatalog::new().with_table(table(), JsonDescriptor::from_value(table_descriptor()))
}

fn notification() -> Value {
    json!({
        "notify_type": "dih_file_create_success",
        "feed": "NYK_SDW_2#WH_SOURCE_SYSTEM_DIM",
        "publish_ts": "20211118 11:06:40",
        "partition_value_list": ["EMEA", "2021-09-13"],
        "rec_count": "1956678",
        "success_flg": "Y",
        "partition_key": ["region", "dw_bus_dt"],
        "partition_prefix": "s3://lake/sdw/NYK_SDW_2/WH_SOURCE_SYSTEM_DIM/region=EMEA/dw_bus_dt=2021-09-13"
    })
}

fn queue_event(bodies: &[String]) -> Value {
    let records: Vec<Value> = bodies
        .iter()
        .enumerate()
        .map(|(index, body)| {
            json!({
                "messageId": format!("message-{index}"),
                "eventSource": "aws:sqs",
                "awsRegion": "eu-west-1",
                "body": body,
            })
        })
        .collect();
    json!({ "Records": records })
}

#[test]
fn new_partition_inherits_every_descriptor_attribute_but_location() {
    let catalog = catalog();
    let publisher = CapturingPublisher::new();

    handle_partition_event(
        &queue_event(&[notification().to_string()]),
        TOPIC,
        &catalog,
        &publisher,
    )
    .expect("registration should succeed");

    let partitions = catalog.partitions();
    assert_eq!(partitions.len(), 1);
    let (created_on, partition) = &partitions[0];
    assert_eq!(created_on, &table());
    assert_eq!(partition.values, vec!["EMEA", "2021-09-13"]);

    let source = table_descriptor();
    let source = source.as_object().expect("descriptor object");
    let created = &partition.storage_descriptor.0;
    assert_eq!(created.len(), source.len());
    for (attribute, value) in source {
        if attribute == "Location" {
            assert_eq!(
                created[attribute],
                "s3://lake/sdw/NYK_SDW_2/WH_SOURCE_SYSTEM_DIM/region=EMEA/dw_bus_dt=2021-09-13"
            );
        } else {
            assert_eq!(&created[attribute], value, "{attribute} must be inherited");
        }
    }
}

#[test]
fn redelivered_notification_succeeds_both_times() {
    let catalog = catalog();
    let publisher = CapturingPublisher::new();
    let event = queue_event(&[notification().to_string()]);

    let first = handle_partition_event(&event, TOPIC, &catalog, &publisher)
        .expect("first delivery should succeed");
    let second = handle_partition_event(&event, TOPIC, &catalog, &publisher)
        .expect("second delivery must not raise");

    assert!(matches!(first[0], RecordOutcome::Created { .. }));
    assert!(matches!(second[0], RecordOutcome::AlreadyExists { .. }));
    let notify_types: Vec<_> = publisher
        .messages()
        .into_iter()
        .map(|message| message["notify_type"].clone())
        .collect();
    assert_eq!(
        notify_types,
        vec![json!("dih_glue_add_ptn_success"), json!("dih_glue_add_ptn_success")]
    );
}

#[test]
fn non_success_notifications_touch_nothing() {
    let catalog = catalog();
    let publisher = CapturingPublisher::new();
    let bodies: Vec<String> = ["dih_file_create_failure", "dih_glue_add_ptn_success", ""]
        .iter()
        .map(|notify_type| {
            let mut body = notification();
            body["notify_type"] = json!(notify_type);
            body.to_string()
        })
        .collect();

    let outcomes = handle_partition_event(&queue_event(&bodies), TOPIC, &catalog, &publisher)
        .expect("skipped records are not errors");

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes
        .iter()
        .all(|outcome| matches!(outcome, RecordOutcome::Skipped { .. })));
    assert!(catalog.partitions().is_empty());
    assert!(catalog.lookups().is_empty());
    assert!(publisher.requests().is_empty());
}

#[test]
fn relay_returns_normally_when_publishing_fails() {
    let publisher = CapturingPublisher::failing();
    let message = notification().as_object().cloned().expect("object");

    relay_notification(&publisher, TOPIC, "subject", &message, Some("eu-west-1"));

    let requests = publisher.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].attributes["partition_value_list"], "\"EMEA,2021-09-13\"");
    assert_eq!(requests[0].attributes["success_flg"], "\"Y\"");
}

#[test]
fn grant_shares_database_and_each_table() {
    let access = RecordingAccessControl::new();
    let sender = CapturingResponseSender::new();
    let context = InvocationContext {
        log_stream_name: "stream".to_string(),
    };

    let reply = handle_grant_event(
        json!({
            "external_account": "111122223333",
            "database_name": "testdb",
            "table_name_list": ["temp", "temp2"]
        }),
        &context,
        &access,
        &sender,
    )
    .expect("direct grant never errors");
    assert_eq!(reply["statusCode"], 200);

    let calls = access.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(
        &calls[0],
        AccessCall::Grant(entry)
            if entry.resource == CatalogResource::Database { name: "testdb".to_string() }
                && entry.permissions == vec!["DESCRIBE"]
                && entry.permissions_with_grant_option == vec!["DESCRIBE"]
    ));
    let AccessCall::BatchGrant(entries) = &calls[1] else {
        panic!("expected one batch grant call");
    };
    assert_eq!(entries.len(), 2);
    let ids: HashSet<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    for entry in entries {
        assert_eq!(entry.principal, "111122223333");
        assert_eq!(entry.permissions, vec!["ALL"]);
        assert_eq!(entry.permissions_with_grant_option, vec!["ALL"]);
    }
}

#[test]
fn lifecycle_delete_revokes_and_answers_through_callback() {
    let access = RecordingAccessControl::new();
    let sender = CapturingResponseSender::new();
    let context = InvocationContext {
        log_stream_name: "2026/10/16/[$LATEST]feed".to_string(),
    };

    let reply = handle_grant_event(
        json!({
            "RequestType": "Delete",
            "ResponseURL": "https://callbacks.example/presigned",
            "StackId": "arn:aws:cloudformation:eu-west-1:111122223333:stack/share/1",
            "RequestId": "req-9",
            "LogicalResourceId": "ShareTables",
            "PhysicalResourceId": "2026/10/15/[$LATEST]old",
            "ResourceProperties": {
                "Input": {
                    "external_account": "111122223333",
                    "database_name": "testdb",
                    "table_name_list": ["temp", "temp2"]
                }
            }
        }),
        &context,
        &access,
        &sender,
    )
    .expect("lifecycle event is well formed");
    assert!(reply.get("statusCode").is_none());

    let calls = access.calls();
    assert_eq!(calls.len(), 2);
    let AccessCall::BatchRevoke(entries) = &calls[0] else {
        panic!("tables are revoked first");
    };
    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .all(|entry| entry.permissions == vec!["ALL"]
            && entry.permissions_with_grant_option == vec!["ALL"]));
    assert!(matches!(&calls[1], AccessCall::Revoke(_)));

    let responses = sender.responses();
    assert_eq!(responses.len(), 1);
    let (_, response) = &responses[0];
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.physical_resource_id, "2026/10/15/[$LATEST]old");
    assert_eq!(response.request_id, "req-9");
}

#[test]
fn dead_letter_batch_survives_malformed_record() {
    let publisher = CapturingPublisher::new();
    let mut bodies: Vec<String> = (0..5)
        .map(|index| {
            let mut body = notification();
            body["rec_count"] = json!(index.to_string());
            body.to_string()
        })
        .collect();
    bodies[2] = "not json at all".to_string();

    let summary = handle_dead_letter_event(&queue_event(&bodies), TOPIC, &publisher)
        .expect("event is well formed");

    assert_eq!(summary.relayed, 4);
    assert_eq!(summary.failed, 1);
    let rec_counts: Vec<_> = publisher
        .messages()
        .into_iter()
        .map(|message| {
            assert_eq!(message["notify_type"], "dih_glue_add_ptn_failure");
            message["rec_count"].clone()
        })
        .collect();
    assert_eq!(
        rec_counts,
        vec![json!("0"), json!("1"), json!("3"), json!("4")]
    );
}
