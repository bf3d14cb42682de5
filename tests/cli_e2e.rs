use assert_cmd::Command;
use predicates::prelude::*;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::{self, JoinHandle};

/// Serves exactly one canned response on a loopback port. The handle yields the
/// request line the binary sent.
fn stub_server(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}/api/v1", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header == "\r\n" || header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }
        if content_length > 0 {
            let mut discard = vec![0u8; content_length];
            std::io::Read::read_exact(&mut reader, &mut discard).unwrap();
        }

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();
        request_line.trim_end().to_string()
    });
    (base_url, handle)
}

fn brigid(workdir: &Path, base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("brigid").unwrap();
    cmd.current_dir(workdir)
        .env("BRIGID_CONFIG", workdir.join("config.json"))
        .env("BRIGID_BASE_URL", base_url)
        .env_remove("BRIGID_API_TOKEN")
        .env_remove("BRIGID_TIMEOUT")
        .env_remove("BRIGID_TEMPLATE_DIR")
        .env_remove("DEBUG")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn version_flag() {
    let dir = tempfile::tempdir().unwrap();
    brigid(dir.path(), "http://127.0.0.1:9/api/v1")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("brigid"));
}

#[test]
fn empty_list_prints_no_results() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = stub_server(200, "[]");
    brigid(dir.path(), &base_url)
        .args(["software", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results matched your filters."));

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/v1/software/?"), "{}", request);
    assert!(request.contains("limit=100"), "{}", request);
}

#[test]
fn list_renders_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = stub_server(
        200,
        r#"{"count": 1, "results": [{"id": 1, "machine_name": "brigid", "name": "Brigid"}]}"#,
    );
    brigid(dir.path(), &base_url)
        .args(["software", "list", "--machine-name", "brigid", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Brigid").and(predicate::str::contains("brigid")));

    let request = server.join().unwrap();
    assert!(request.contains("limit=5"), "{}", request);
    assert!(request.contains("machine_name=brigid"), "{}", request);
}

#[test]
fn retrieve_by_id_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = stub_server(
        200,
        r#"{"id": 1, "machine_name": "brigid", "name": "Brigid"}"#,
    );
    brigid(dir.path(), &base_url)
        .args(["software", "retrieve", "1", "--display", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"machine_name\": \"brigid\""));

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /api/v1/software/1/"), "{}", request);
}

#[test]
fn unknown_name_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let (base_url, server) = stub_server(200, "[]");
    brigid(dir.path(), &base_url)
        .args(["software", "retrieve", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Could not find a Software object that matches \"nope\"",
        ));

    let request = server.join().unwrap();
    assert!(request.contains("machine_name=nope"), "{}", request);
}

#[test]
fn disallowed_update_fails_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens on the discard port; any request would fail with a transport error.
    brigid(dir.path(), "http://127.0.0.1:9/api/v1")
        .args(["releases", "update", "brigid:1.0.0"])
        .args(["--sha", "abc", "--set", "version=9.9.9", "--changelog", "x"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("not allowed to be updated: version")
                .and(predicate::str::contains("sha").not())
                .and(predicate::str::contains("changelog").not()),
        );
}

#[test]
fn repeated_update_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    brigid(dir.path(), "http://127.0.0.1:9/api/v1")
        .args(["software", "update", "brigid", "--name", "x", "--set", "name=y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fields given more than once: name"));
}

#[test]
fn malformed_dotenv_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".env"), "<><><>\n").unwrap();
    brigid(dir.path(), "http://127.0.0.1:9/api/v1")
        .arg("settings")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings error: .env:"));
}

#[test]
fn create_reports_field_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("release.yml");
    std::fs::write(&file, "software_id: 1\nsha: abc\n").unwrap();
    let (base_url, server) = stub_server(400, r#"{"version": ["This field is required."]}"#);
    brigid(dir.path(), &base_url)
        .args(["releases", "create"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("version:")
                .and(predicate::str::contains("    This field is required.")),
        );

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /api/v1/releases/"), "{}", request);
}

#[test]
fn settings_masks_the_token() {
    let dir = tempfile::tempdir().unwrap();
    brigid(dir.path(), "http://127.0.0.1:9/api/v1")
        .env("BRIGID_API_TOKEN", "0123456789abcdef")
        .arg("settings")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("****cdef")
                .and(predicate::str::contains("0123456789abcdef").not())
                .and(predicate::str::contains("http://127.0.0.1:9/api/v1")),
        );
}

#[test]
fn bad_timestamp_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    brigid(dir.path(), "http://127.0.0.1:9/api/v1")
        .args(["releases", "list", "--released-after", "last tuesday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("last tuesday"));
}
