//! Integration tests for Borealis MCP
//!
//! A mockito server stands in for the Dataverse API so the full path from
//! operation to rendered text is exercised without network access.

use borealis_mcp::config::DataverseConfig;
use borealis_mcp::dataverse::{DataverseClient, FileFetch, FileRejection};
use borealis_mcp::mcp::gateway::{self, TokenAuth};
use borealis_mcp::mcp::server::McpServer;
use borealis_mcp::models::SearchRequest;
use borealis_mcp::operations;
use borealis_mcp::utils::API_KEY_HEADER;
use mockito::Matcher;
use std::sync::Arc;

const API_KEY: &str = "0123456789abcdef";

fn client_for(server: &mockito::ServerGuard, api_key: Option<&str>) -> DataverseClient {
    let mut config = DataverseConfig::with_base_url(format!("{}/api", server.url()));
    if let Some(key) = api_key {
        config = config.api_key(key);
    }
    DataverseClient::new(&config).expect("client")
}

fn search_body() -> String {
    serde_json::json!({
        "status": "OK",
        "data": {
            "total_count": 42,
            "items": [
                {
                    "type": "dataset",
                    "name": "Lake Ontario Water Quality",
                    "url": "https://borealisdata.ca/dataset.xhtml?persistentId=doi:10.5683/SP3/ABC123",
                    "global_id": "doi:10.5683/SP3/ABC123",
                    "description": "Monthly samples from 12 stations.",
                    "authors": ["Smith, Jane"],
                    "published_at": "2021-04-01T00:00:00Z"
                },
                {
                    "type": "dataverse",
                    "name": "University of Toronto Dataverse",
                    "url": "https://borealisdata.ca/dataverse/toronto"
                }
            ]
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_search_renders_results() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "water".into()),
            Matcher::UrlEncoded("per_page".into(), "2".into()),
            Matcher::UrlEncoded("subtree".into(), "toronto".into()),
            Matcher::UrlEncoded("fq".into(), "state:Ontario".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let request = SearchRequest::new("water")
        .per_page(2)
        .subtree("toronto")
        .province("Ontario");
    let text = operations::search_datasets(&client, &request).await;

    mock.assert_async().await;
    assert!(text.starts_with("Found 42 results for 'water'\nShowing 2 results:\n\n"));
    assert!(text.contains("1. **Lake Ontario Water Quality**\n   Type: dataset\n"));
    assert!(text.contains("   DOI: https://doi.org/10.5683/SP3/ABC123\n"));
    assert!(text.contains("2. **University of Toronto Dataverse**\n   Type: dataverse\n"));
    assert!(text.contains("   URL: https://borealisdata.ca/dataverse/toronto\n"));
    assert!(text.contains("(Showing 2 of 42 total results."));
}

#[tokio::test]
async fn test_search_zero_results() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"OK","data":{"total_count":0,"items":[]}}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::search_datasets(&client, &SearchRequest::new("xyzzy")).await;
    assert_eq!(text, "No results found for query: 'xyzzy'");
}

#[tokio::test]
async fn test_unauthorized_retries_once_without_key() {
    let mut server = mockito::Server::new_async().await;
    let with_key = server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, API_KEY)
        .with_status(401)
        .with_body(r#"{"status":"ERROR","message":"Bad api key"}"#)
        .expect(1)
        .create_async()
        .await;
    let without_key = server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, Matcher::Missing)
        .with_status(401)
        .with_body(r#"{"status":"ERROR","message":"Unauthorized"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Some(API_KEY));
    let text = operations::search_datasets(&client, &SearchRequest::new("water")).await;

    with_key.assert_async().await;
    without_key.assert_async().await;
    assert!(text.starts_with("HTTP error occurred: 401\nAPI Response: "));
    assert!(text.ends_with("Note: Searches of published datasets don't require authentication."));
}

#[tokio::test]
async fn test_unauthorized_retry_can_succeed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, API_KEY)
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, Matcher::Missing)
        .with_status(200)
        .with_body(search_body())
        .create_async()
        .await;

    let client = client_for(&server, Some(API_KEY));
    let text = operations::search_datasets(&client, &SearchRequest::new("water")).await;
    assert!(text.starts_with("Found 42 results"));
}

#[tokio::test]
async fn test_short_key_never_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, Matcher::Missing)
        .with_status(200)
        .with_body(search_body())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Some("short"));
    operations::search_datasets(&client, &SearchRequest::new("water")).await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_envelope_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ERROR","message":"Solr down"}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::search_datasets(&client, &SearchRequest::new("water")).await;
    assert_eq!(text, "Error: API returned status 'ERROR'");
}

#[tokio::test]
async fn test_metadata_normalizes_doi_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/datasets/:persistentId/metadata")
        .match_query(Matcher::UrlEncoded(
            "persistentId".into(),
            "doi:10.34990/FK2/ABC123".into(),
        ))
        .match_header("accept", "application/ld+json")
        .with_status(200)
        .with_body(
            serde_json::json!({
                "status": "OK",
                "data": {
                    "@id": "https://doi.org/10.34990/FK2/ABC123",
                    "title": "Survey of Ontario Wetlands",
                    "schema:datePublished": "2019-06-30"
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text =
        operations::get_dataset_metadata(&client, "https://doi.org/10.34990/FK2/ABC123").await;

    mock.assert_async().await;
    assert!(text.starts_with("# Dataset Metadata\n\n**Title:** Survey of Ontario Wetlands\n\n"));
    assert!(text.contains("**Publication Date:** 2019\n\n"));
}

#[tokio::test]
async fn test_metadata_unauthorized_retries_without_key() {
    let mut server = mockito::Server::new_async().await;
    let with_key = server
        .mock("GET", "/api/datasets/:persistentId/metadata")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, API_KEY)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let without_key = server
        .mock("GET", "/api/datasets/:persistentId/metadata")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"status":"OK","data":{"title":"Public Dataset"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Some(API_KEY));
    let text = operations::get_dataset_metadata(&client, "doi:10.5683/SP3/PUB").await;
    with_key.assert_async().await;
    without_key.assert_async().await;
    assert!(text.contains("**Title:** Public Dataset\n"));
}

#[tokio::test]
async fn test_file_listing_unauthorized_retries_without_key() {
    let mut server = mockito::Server::new_async().await;
    let with_key = server
        .mock("GET", "/api/datasets/77/versions/:latest/files")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, API_KEY)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let without_key = server
        .mock("GET", "/api/datasets/77/versions/:latest/files")
        .match_query(Matcher::Any)
        .match_header(API_KEY_HEADER, Matcher::Missing)
        .with_status(200)
        .with_body(
            r#"{"status":"OK","totalCount":1,"data":[{"label":"readme.txt","dataFile":{"id":5,"filename":"readme.txt","filesize":10}}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Some(API_KEY));
    let text = operations::list_dataset_files(&client, "77", 20, 0, None).await;
    with_key.assert_async().await;
    without_key.assert_async().await;
    assert!(text.contains("## 1. readme.txt\n"));
}

#[tokio::test]
async fn test_metadata_numeric_id_and_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/datasets/12345/metadata")
        .with_status(404)
        .with_body(r#"{"status":"ERROR","message":"Dataset not found"}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_metadata(&client, "12345").await;
    assert_eq!(
        text,
        "Dataset not found: 12345\nPlease check the DOI or dataset ID and try again."
    );
}

#[tokio::test]
async fn test_file_listing_with_filter() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/datasets/:persistentId/versions/:latest/files")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("persistentId".into(), "doi:10.5683/SP3/ABC123".into()),
            Matcher::UrlEncoded("limit".into(), "20".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "status": "OK",
                "totalCount": 2,
                "data": [
                    {
                        "label": "readme.txt",
                        "restricted": false,
                        "dataFile": {"id": 1, "filename": "readme.txt", "friendlyType": "Plain Text", "filesize": 512}
                    },
                    {
                        "label": "survey.sav",
                        "restricted": true,
                        "dataFile": {"id": 2, "filename": "survey.sav", "friendlyType": "SPSS SAV", "filesize": 2048}
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text =
        operations::list_dataset_files(&client, "10.5683/SP3/ABC123", 20, 0, Some("SPSS")).await;
    assert!(text.contains("**Showing:** Files matching 'SPSS'\n**Results:** 1 file(s) found\n"));
    assert!(text.contains("## 1. survey.sav\n"));
    assert!(text.contains("**Access:** Restricted (authentication required)\n"));
    assert!(!text.contains("readme.txt"));

    let text = operations::list_dataset_files(&client, "10.5683/SP3/ABC123", 20, 0, Some("pdf")).await;
    assert_eq!(text, "No files found matching 'pdf' in this dataset.");
}

#[tokio::test]
async fn test_binary_file_rejected_without_request() {
    let mut server = mockito::Server::new_async().await;
    let head = server
        .mock("HEAD", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let get = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let fetch = client.fetch_file("276461", "survey.sav").await.unwrap();
    assert_eq!(fetch, FileFetch::Rejected(FileRejection::BinaryFormat));
    head.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn test_oversized_file_rejected_after_head() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/7")
        .with_status(200)
        .with_body(vec![b'x'; 5 * 1024 * 1024 + 1])
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/access/datafile/7")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "7", "big.csv").await;
    assert!(text.starts_with("⚠️ Cannot retrieve 'big.csv' - File too large (5.0 MB)"));
    get.assert_async().await;
}

#[tokio::test]
async fn test_file_at_size_limit_is_fetched() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/8")
        .with_status(200)
        .with_body(vec![b'x'; 5 * 1024 * 1024])
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/access/datafile/8")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("a,b\n1,2")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "8", "small.csv").await;
    get.assert_async().await;
    assert!(text.contains("   1 | a,b\n   2 | 1,2\n"));
}

#[tokio::test]
async fn test_encoded_head_still_checks_size() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/12")
        .with_status(200)
        .with_header("content-encoding", "gzip")
        .with_body(vec![b'x'; 6 * 1024 * 1024])
        .create_async()
        .await;
    let get = server
        .mock("GET", "/api/access/datafile/12")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "12", "packed.csv").await;
    assert!(text.starts_with("⚠️ Cannot retrieve 'packed.csv' - File too large (6.0 MB)"));
    get.assert_async().await;
}

#[tokio::test]
async fn test_download_stops_past_size_limit() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/13")
        .with_status(405)
        .create_async()
        .await;
    server
        .mock("GET", "/api/access/datafile/13")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(vec![b'x'; 6 * 1024 * 1024])
        .create_async()
        .await;

    let client = client_for(&server, None);
    let fetch = client.fetch_file("13", "huge.txt").await.unwrap();
    match fetch {
        FileFetch::Rejected(FileRejection::TooLarge { bytes }) => {
            assert!(bytes > 5 * 1024 * 1024);
        }
        other => panic!("expected size rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_utf8_file_with_nul_is_shown() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/14")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/api/access/datafile/14")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body(b"id,name\n1,padded\x00\n".to_vec())
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "14", "data.csv").await;
    assert!(text.starts_with("# File: data.csv\n"));
    assert!(text.contains("   1 | id,name\n   2 | 1,padded\u{0}\n"));
}

#[tokio::test]
async fn test_head_transport_failure_is_network_error() {
    let config = DataverseConfig::with_base_url("http://127.0.0.1:9/api");
    let client = DataverseClient::new(&config).expect("client");
    let text = operations::get_dataset_file(&client, "15", "notes.txt").await;
    assert!(text.starts_with("Network error occurred: "));
}

#[tokio::test]
async fn test_long_file_truncated() {
    let body = (1..=250)
        .map(|i| format!("{},value", i))
        .collect::<Vec<_>>()
        .join("\n");

    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/9")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("GET", "/api/access/datafile/9")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "9", "rows.csv").await;
    assert!(text.contains("**Total lines:** 250\n"));
    assert!(text.contains(" 100 | 100,value\n"));
    assert!(!text.contains("101,value"));
    assert!(text.ends_with("... (150 more lines not shown)"));
}

#[tokio::test]
async fn test_restricted_file_envelope() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/10")
        .with_status(403)
        .create_async()
        .await;
    server
        .mock("GET", "/api/access/datafile/10")
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"ERROR","code":403,"message":"Not authorized"}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "10", "secret.tab").await;
    assert!(text.starts_with("🔒 Cannot access 'secret.tab' - File is restricted"));
}

#[tokio::test]
async fn test_file_forbidden_with_key_retries_once() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/11")
        .with_status(200)
        .create_async()
        .await;
    let with_key = server
        .mock("GET", "/api/access/datafile/11")
        .match_header(API_KEY_HEADER, API_KEY)
        .with_status(403)
        .expect(1)
        .create_async()
        .await;
    let without_key = server
        .mock("GET", "/api/access/datafile/11")
        .match_header(API_KEY_HEADER, Matcher::Missing)
        .with_status(200)
        .with_body("public,data")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, Some(API_KEY));
    let text = operations::get_dataset_file(&client, "11", "open.csv").await;
    with_key.assert_async().await;
    without_key.assert_async().await;
    assert!(text.contains("   1 | public,data\n"));
}

#[tokio::test]
async fn test_file_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("HEAD", "/api/access/datafile/99")
        .with_status(404)
        .create_async()
        .await;
    server
        .mock("GET", "/api/access/datafile/99")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let client = client_for(&server, None);
    let text = operations::get_dataset_file(&client, "99", "gone.csv").await;
    assert_eq!(
        text,
        "File not found (ID: 99). Please check the file ID from list_dataset_files."
    );
}

#[test]
fn test_mcp_server_creation() {
    let client = Arc::new(DataverseClient::new(&DataverseConfig::default()).unwrap());
    let server = McpServer::new(client).expect("server");
    assert_eq!(server.tool_names().len(), 4);
    assert!(server.tool_names().iter().any(|n| n == "get_dataset_file"));
}

#[tokio::test]
async fn test_gateway_auth_and_proxy() {
    let mut upstream = mockito::Server::new_async().await;
    let mcp = upstream
        .mock("POST", "/")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#)
        .expect(1)
        .create_async()
        .await;

    let auth = TokenAuth::new(["secret-token".to_string()].into_iter().collect());
    let (addr, handle) = gateway::start("127.0.0.1:0".parse().unwrap(), &upstream.url(), auth)
        .await
        .expect("gateway");
    let base = format!("http://{}", addr);
    let http = reqwest::Client::new();

    let health = http.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(health.status(), 200);
    let body: serde_json::Value = health.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let missing = http.post(format!("{}/mcp", base)).send().await.unwrap();
    assert_eq!(missing.status(), 401);
    let body: serde_json::Value = missing.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Authorization"));

    let wrong = http
        .post(format!("{}/mcp", base))
        .bearer_auth("nope")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 403);

    let ok = http
        .post(format!("{}/mcp", base))
        .bearer_auth("secret-token")
        .header("content-type", "application/json")
        .body(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), 200);
    assert_eq!(ok.text().await.unwrap(), r#"{"jsonrpc":"2.0","id":1,"result":{}}"#);

    mcp.assert_async().await;
    handle.abort();
}

#[tokio::test]
async fn test_gateway_open_without_tokens() {
    let mut upstream = mockito::Server::new_async().await;
    upstream
        .mock("POST", "/")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let (addr, handle) = gateway::start(
        "127.0.0.1:0".parse().unwrap(),
        &upstream.url(),
        TokenAuth::default(),
    )
    .await
    .expect("gateway");

    let resp = reqwest::Client::new()
        .post(format!("http://{}/mcp", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    handle.abort();
}
