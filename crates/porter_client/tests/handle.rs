use std::fs;
use std::time::Duration;

use porter_client::{ClientEvent, ClientHandle, ConvertSettings, ExportFormat, FailureKind};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: String) -> ConvertSettings {
    ConvertSettings {
        base_url,
        ..ConvertSettings::default()
    }
}

fn drain_completions(
    events: &std::sync::mpsc::Receiver<ClientEvent>,
    expected: usize,
) -> Vec<(u64, Result<String, FailureKind>)> {
    let mut completions = Vec::new();
    while completions.len() < expected {
        match events.recv_timeout(Duration::from_secs(10)).expect("event") {
            ClientEvent::JobCompleted { job_id, result } => {
                completions.push((
                    job_id,
                    result.map(|saved| saved.output_name).map_err(|err| err.kind),
                ));
            }
            _ => {}
        }
    }
    completions
}

#[tokio::test(flavor = "multi_thread")]
async fn conversions_complete_in_submission_order() {
    let server = MockServer::start().await;
    // The first file's response is held back; sequential execution must
    // still deliver its completion first.
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(body_string_contains("one.md"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_raw("first", "text/plain"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(body_string_contains("two.md"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("second", "text/plain"))
        .mount(&server)
        .await;

    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let one = input.path().join("one.md");
    let two = input.path().join("two.md");
    fs::write(&one, "# one").unwrap();
    fs::write(&two, "# two").unwrap();

    let (handle, events) =
        ClientHandle::new(settings(server.uri()), output.path().to_path_buf());
    handle.convert(1, one, "one.md", ExportFormat::Text);
    handle.convert(2, two, "two.md", ExportFormat::Text);

    let completions = drain_completions(&events, 2);
    assert_eq!(completions[0].0, 1);
    assert_eq!(completions[1].0, 2);
    assert_eq!(completions[0].1.as_deref(), Ok("one.text"));
    assert_eq!(completions[1].1.as_deref(), Ok("two.text"));

    assert_eq!(
        fs::read_to_string(output.path().join("one.text")).unwrap(),
        "first"
    );
    assert_eq!(
        fs::read_to_string(output.path().join("two.text")).unwrap(),
        "second"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn colliding_output_names_get_a_suffix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("converted", "text/plain"))
        .mount(&server)
        .await;

    let input = TempDir::new().unwrap();
    let nested = input.path().join("nested");
    fs::create_dir(&nested).unwrap();
    let output = TempDir::new().unwrap();
    // Two different sources that derive the same output name.
    let first = input.path().join("report.md");
    let second = nested.join("report.md");
    fs::write(&first, "# a").unwrap();
    fs::write(&second, "# b").unwrap();

    let (handle, events) =
        ClientHandle::new(settings(server.uri()), output.path().to_path_buf());
    handle.convert(1, first, "report.md", ExportFormat::Text);
    handle.convert(2, second, "report.md", ExportFormat::Text);

    let completions = drain_completions(&events, 2);
    assert_eq!(completions[0].1.as_deref(), Ok("report.text"));
    let renamed = completions[1].1.as_deref().unwrap().to_string();
    assert_ne!(renamed, "report.text");
    assert!(renamed.starts_with("report--"));
    assert!(renamed.ends_with(".text"));
    assert!(output.path().join(renamed).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_inputs_fail_without_touching_the_server() {
    let output = TempDir::new().unwrap();
    let (handle, events) = ClientHandle::new(
        settings("http://127.0.0.1:9".to_string()),
        output.path().to_path_buf(),
    );
    handle.convert(
        1,
        std::path::PathBuf::from("/does/not/exist.md"),
        "exist.md",
        ExportFormat::Text,
    );

    let completions = drain_completions(&events, 1);
    assert_eq!(completions[0].0, 1);
    assert_eq!(completions[0].1, Err(FailureKind::Validation));
}
