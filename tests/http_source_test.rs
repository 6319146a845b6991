use anyhow::Result;
use httpmock::prelude::*;
use sg_checkup::{generate, CheckupError, DataSource, HttpDataSource, Status};
use std::collections::HashMap;
use std::time::Duration;

fn facts() -> serde_json::Value {
    serde_json::json!([
        {
            "arn": "arn:aws:ec2:us-west-2:123456789012:security-group/sg-web",
            "name": "web",
            "public_ips": ["54.1.2.3"],
            "in_use": true,
            "is_default": false,
            "port_range_specs": ["22,80,443,3306"],
            "is_large_public_block": false,
            "large_range_count": false,
            "is_restricted": false,
            "internal_only": false
        },
        {
            "arn": "arn:aws:ec2:us-east-1:123456789012:security-group/sg-default",
            "name": "default",
            "public_ips": [],
            "in_use": false,
            "is_default": true,
            "port_range_specs": [],
            "is_large_public_block": false,
            "large_range_count": false,
            "is_restricted": true,
            "internal_only": false
        },
        {
            "arn": "arn:aws:ec2:us-east-1:123456789012:security-group/sg-db",
            "name": "db",
            "public_ips": [],
            "in_use": true,
            "is_default": false,
            "port_range_specs": ["5432"],
            "is_large_public_block": false,
            "large_range_count": false,
            "is_restricted": false,
            "internal_only": true
        }
    ])
}

fn source(server: &MockServer) -> HttpDataSource {
    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), "Bearer test-token".to_string());
    HttpDataSource::new(&server.url("/api"), &headers, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_generate_over_http() -> Result<()> {
    let server = MockServer::start();
    let helpers_mock = server.mock(|when, then| {
        when.method(POST).path("/api/helpers");
        then.status(204);
    });
    let groups_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/security-groups")
            .header("Authorization", "Bearer test-token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(facts());
    });
    let import_mock = server.mock(|when, then| {
        when.method(GET).path("/api/imports/latest");
        then.status(200).json_body(serde_json::json!({
            "imported_at": "2024-05-01T10:00:00Z",
            "organization": "Acme Corp"
        }));
    });

    let report = generate(&source(&server), None).await?;

    helpers_mock.assert();
    groups_mock.assert();
    import_mock.assert();

    let order: Vec<(Status, &str)> = report
        .rows
        .iter()
        .map(|r| (r.status, r.name.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![
            (Status::Red, "web"),
            (Status::Yellow, "db"),
            (Status::Green, "default"),
        ]
    );
    assert_eq!(
        report.rows[0].notes,
        vec![
            "Allows traffic from anywhere on TCP ports (3306)",
            "Contains 1 public IP address(es)",
        ]
    );
    assert_eq!(report.rows[1].notes, vec!["No public IP addresses found"]);
    assert_eq!(report.metadata.account_id, "123456789012");
    assert_eq!(report.metadata.organization, "Acme Corp");
    Ok(())
}

#[tokio::test]
async fn test_custom_safe_ports_change_the_rating() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/helpers");
        then.status(200);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/security-groups");
        then.status(200).json_body(facts());
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/imports/latest");
        then.status(200).json_body(serde_json::json!({
            "imported_at": "2024-05-01T10:00:00Z",
            "organization": "OrgDummyImport"
        }));
    });

    let report = generate(&source(&server), Some(&[22, 80, 443, 3306, 5432])).await?;

    let web = report.rows.iter().find(|r| r.name == "web").unwrap();
    assert_eq!(web.status, Status::Green);
    assert_eq!(report.metadata.organization, "<NONE>");
    Ok(())
}

#[tokio::test]
async fn test_missing_import_is_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/helpers");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/security-groups");
        then.status(200).json_body(facts());
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/imports/latest");
        then.status(404);
    });

    let err = generate(&source(&server), None).await.unwrap_err();

    assert!(matches!(err.root_cause(), CheckupError::NotFoundError { .. }));
    assert!(err.to_string().starts_with("Failed to load metadata"));
}

#[tokio::test]
async fn test_helper_failure_aborts_before_querying() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/helpers");
        then.status(500);
    });
    let groups_mock = server.mock(|when, then| {
        when.method(GET).path("/api/security-groups");
        then.status(200).json_body(facts());
    });

    let err = generate(&source(&server), None).await.unwrap_err();

    assert!(matches!(err.root_cause(), CheckupError::SetupError { .. }));
    groups_mock.assert_hits(0);
}

#[tokio::test]
async fn test_malformed_rows_are_scan_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/security-groups");
        then.status(200)
            .json_body(serde_json::json!([{"arn": "arn:aws:ec2:us-east-1:1:x", "name": 3}]));
    });

    let err = source(&server)
        .fetch_security_group_facts()
        .await
        .unwrap_err();
    assert!(matches!(err, CheckupError::ScanError { .. }));
}

#[tokio::test]
async fn test_server_error_is_query_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/security-groups");
        then.status(503);
    });

    let err = source(&server)
        .fetch_security_group_facts()
        .await
        .unwrap_err();
    assert!(matches!(err, CheckupError::QueryError { .. }));
}

#[tokio::test]
async fn test_bad_port_range_aborts_report() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/helpers");
        then.status(204);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/security-groups");
        then.status(200).json_body(serde_json::json!([{
            "arn": "arn:aws:ec2:us-east-1:123456789012:security-group/sg-bad",
            "name": "bad",
            "in_use": true,
            "is_default": false,
            "port_range_specs": ["8080-80"]
        }]));
    });
    let import_mock = server.mock(|when, then| {
        when.method(GET).path("/api/imports/latest");
        then.status(200).json_body(serde_json::json!({
            "imported_at": "2024-05-01T10:00:00Z",
            "organization": "Acme"
        }));
    });

    let err = generate(&source(&server), None).await.unwrap_err();

    assert!(matches!(
        err.root_cause(),
        CheckupError::PortRangeError { group, .. } if group == "bad"
    ));
    import_mock.assert_hits(0);
}

#[tokio::test]
async fn test_unreachable_source_is_connection_error() {
    let source =
        HttpDataSource::new("http://127.0.0.1:1/api", &HashMap::new(), Duration::from_secs(2))
            .unwrap();

    let err = source.ensure_helpers().await.unwrap_err();
    assert!(matches!(err, CheckupError::ConnectionError { .. }));
}
