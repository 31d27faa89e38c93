//! Integration tests for sqlplay

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn sqlplay(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("sqlplay");
        cmd.env("SQLPLAY_CONFIG", dir.path().join("config.toml"))
            .env_remove("RUST_LOG");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("SQL code generation"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("sqlplay"));
    }

    #[test]
    fn fingerprint_uses_baseline_config() {
        let dir = TempDir::new().unwrap();
        let query = dir.path().join("query.sql");
        fs::write(&query, "SELECT 1;").unwrap();

        let expected = sqlplay::BuildRequest::new("SELECT 1;").fingerprint();

        sqlplay(&dir)
            .args(["fingerprint", "--query"])
            .arg(&query)
            .assert()
            .success()
            .stdout(predicate::str::diff(format!("{}\n", expected)));
    }

    #[test]
    fn fingerprint_changes_with_config() {
        let dir = TempDir::new().unwrap();
        let query = dir.path().join("query.sql");
        let config = dir.path().join("sqlc.json");
        fs::write(&query, "SELECT 1;").unwrap();
        fs::write(&config, "{\"version\": \"2\"}").unwrap();

        let baseline = sqlplay::BuildRequest::new("SELECT 1;").fingerprint();

        sqlplay(&dir)
            .args(["fingerprint", "--query"])
            .arg(&query)
            .arg("--sqlc-config")
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains(baseline.as_str()).not());
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[generator]"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir).args(["config", "init"]).assert().success();

        let written = fs::read_to_string(dir.path().join("config.toml")).unwrap();
        assert!(written.contains("program = \"sqlc\""));
    }

    #[test]
    fn cache_list_empty() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir)
            .args(["cache", "list", "--root"])
            .arg(dir.path().join("workspaces"))
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached workspaces found"));
    }

    #[test]
    fn cache_show_invalid_fingerprint() {
        let dir = TempDir::new().unwrap();
        sqlplay(&dir)
            .args(["cache", "show", "not-hex"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid SHA"));
    }

    #[test]
    fn build_empty_query_fails() {
        let dir = TempDir::new().unwrap();
        let query = dir.path().join("query.sql");
        fs::write(&query, "").unwrap();

        sqlplay(&dir)
            .args(["build", "--query"])
            .arg(&query)
            .arg("--root")
            .arg(dir.path().join("workspaces"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("empty query"));

        assert!(!dir.path().join("workspaces").exists());
    }

    #[cfg(unix)]
    #[test]
    fn build_with_shell_generator() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("workspaces");
        fs::write(
            dir.path().join("config.toml"),
            r#"
                [generator]
                program = "sh"
                args = ["-c", "mkdir -p db && cp query.sql db/query.sql.go"]
            "#,
        )
        .unwrap();
        let query = dir.path().join("query.sql");
        fs::write(&query, "SELECT 1;").unwrap();

        sqlplay(&dir)
            .args(["build", "--query"])
            .arg(&query)
            .arg("--root")
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::contains("db/query.sql.go"))
            .stdout(predicate::str::contains("\"errored\": false"));

        sqlplay(&dir)
            .args(["cache", "list", "--format", "plain", "--root"])
            .arg(&root)
            .assert()
            .success()
            .stdout(predicate::str::is_match("^[0-9a-f]{64}\n$").unwrap());
    }
}

mod http_tests {
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use sqlplay::build::{
        Artifacts, BuildResponse, BuildRunner, DiagnosticsSink, GenerationError, Generator,
    };
    use sqlplay::cache::{WorkspaceStore, CONFIG_FILE};
    use sqlplay::server::{router, AppState, PlaygroundPage};
    use sqlplay::{BuildRequest, Playground, BASELINE_CONFIG};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Succeeds, fails, panics, or emits an unwritable artifact depending on the query text
    struct Scripted;

    #[async_trait]
    impl Generator for Scripted {
        async fn generate(
            &self,
            source_dir: &Path,
            diagnostics: &mut DiagnosticsSink,
        ) -> Result<Artifacts, GenerationError> {
            let query = std::fs::read_to_string(source_dir.join("query.sql"))
                .map_err(|e| GenerationError::failed(e.to_string()))?;

            if query.contains("PANIC") {
                panic!("unexpected node type");
            }
            if query.contains("ESCAPE") {
                let mut artifacts = Artifacts::new();
                artifacts.insert("../escape.go".to_string(), "package x\n".to_string());
                return Ok(artifacts);
            }
            if query.contains("INVALID") {
                diagnostics
                    .write_line("query.sql:1:1: syntax error")
                    .map_err(|e| GenerationError::failed(e.to_string()))?;
                return Err(GenerationError::failed("errored"));
            }

            let mut artifacts = Artifacts::new();
            artifacts.insert("db/models.go".to_string(), "package db\n".to_string());
            artifacts.insert("db/query.sql.go".to_string(), format!("// {}\n", query));
            Ok(artifacts)
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    fn app(dir: &TempDir) -> Router {
        let playground = Playground::new(
            WorkspaceStore::new(dir.path().join("workspaces")),
            BuildRunner::new(Arc::new(Scripted)),
        );
        router(AppState::new(playground, PlaygroundPage::builtin()), None)
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn generate_returns_outputs() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), r#"{"query": "SELECT 1;"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let response: BuildResponse = serde_json::from_str(&body).unwrap();
        assert!(!response.errored);
        assert_eq!(response.sha, BuildRequest::new("SELECT 1;").fingerprint().as_str());
        let names: Vec<_> = response.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["db/models.go", "db/query.sql.go"]);
        assert_eq!(response.files[1].content_type, "text/x-go");
    }

    #[tokio::test]
    async fn generate_persists_baseline_config() {
        let dir = TempDir::new().unwrap();
        let (_, body) = post_json(app(&dir), r#"{"query": "SELECT 1;"}"#).await;
        let response: BuildResponse = serde_json::from_str(&body).unwrap();

        let persisted = std::fs::read_to_string(
            dir.path()
                .join("workspaces")
                .join(&response.sha)
                .join(CONFIG_FILE),
        )
        .unwrap();
        assert_eq!(persisted, BASELINE_CONFIG);
    }

    #[tokio::test]
    async fn identical_submissions_share_workspace() {
        let dir = TempDir::new().unwrap();
        let body = r#"{"query": "SELECT 1;", "config": "{}"}"#;

        let (_, first) = post_json(app(&dir), body).await;
        let (_, second) = post_json(app(&dir), body).await;
        assert_eq!(first, second);

        let (_, other) = post_json(app(&dir), r#"{"query": "SELECT 2;", "config": "{}"}"#).await;
        assert_ne!(first, other);

        let workspaces = std::fs::read_dir(dir.path().join("workspaces")).unwrap().count();
        assert_eq!(workspaces, 2);
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_io() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), r#"{"query": ""}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("empty query"));
        assert!(!dir.path().join("workspaces").exists());
    }

    #[tokio::test]
    async fn generate_accepts_body_without_content_type() {
        let dir = TempDir::new().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .body(Body::from(r#"{"query":"SELECT 1;"}"#))
            .unwrap();

        let (status, body) = send(app(&dir), request).await;

        assert_eq!(status, StatusCode::OK);
        let response: BuildResponse = serde_json::from_str(&body).unwrap();
        assert!(!response.errored);
        assert_eq!(response.files.len(), 2);
    }

    #[tokio::test]
    async fn host_failure_returns_fixed_500_body() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), r#"{"query": "ESCAPE"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"errored": true, "error": "500: Internal Server Error"})
        );
        assert!(!dir.path().join("workspaces").join("escape.go").exists());
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (status, _) = post_json(app(&dir), r#"{"query": "#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generation_failure_is_ok_with_error() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), r#"{"query": "INVALID"}"#).await;

        assert_eq!(status, StatusCode::OK);
        let response: BuildResponse = serde_json::from_str(&body).unwrap();
        assert!(response.errored);
        assert!(response.error.contains("syntax error"));
        assert!(response.files.is_empty());
    }

    #[tokio::test]
    async fn panic_is_contained_and_server_survives() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, body) = post_json(app.clone(), r#"{"query": "PANIC"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let response: BuildResponse = serde_json::from_str(&body).unwrap();
        assert!(response.errored);
        assert!(response.error.contains("unexpected node type"));

        let (status, body) = post_json(app, r#"{"query": "SELECT 1;"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let response: BuildResponse = serde_json::from_str(&body).unwrap();
        assert!(!response.errored);
    }

    #[tokio::test]
    async fn play_rejects_invalid_fingerprints() {
        let dir = TempDir::new().unwrap();
        let short = "ab".repeat(31);
        let non_hex = "zz".repeat(32);

        for segment in ["", "abc", short.as_str(), non_hex.as_str()] {
            let (status, _) = get(app(&dir), &format!("/p/{}", segment)).await;
            assert!(status.is_client_error(), "{segment:?} gave {status}");
        }
    }

    #[tokio::test]
    async fn play_renders_unknown_fingerprint() {
        let dir = TempDir::new().unwrap();
        let fingerprint = "0".repeat(64);

        let (status, body) = get(app(&dir), &format!("/p/{}", fingerprint)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(&fingerprint));
    }

    #[tokio::test]
    async fn play_renders_built_workspace() {
        let dir = TempDir::new().unwrap();
        let (_, body) =
            post_json(app(&dir), r#"{"query": "SELECT '<b>' AS tag;"}"#).await;
        let response: BuildResponse = serde_json::from_str(&body).unwrap();

        let (status, html) = get(app(&dir), &format!("/p/{}", response.sha)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("query.sql"));
        assert!(html.contains("db/query.sql.go"));
        assert!(html.contains("SELECT '\\u003cb\\u003e' AS tag;"));
        assert!(!html.contains("<b>"));
    }
}
