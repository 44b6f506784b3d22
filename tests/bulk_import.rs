use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use soal::import::{BulkImportClient, ImportError, ImportPreview, RequestError};

struct Captured {
    request_line: String,
    authorization: Option<String>,
    body: Value,
}

// Serves exactly one request with a canned response, returning what it received.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));

    let handle = thread::spawn(move || {
        let stream = accept_within(&listener, Duration::from_secs(10));
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("read request line");

        let mut content_length = 0;
        let mut authorization = None;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).expect("read header");
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim().to_string();
                match name.to_ascii_lowercase().as_str() {
                    "content-length" => content_length = value.parse().expect("content length"),
                    "authorization" => authorization = Some(value),
                    _ => {}
                }
            }
        }

        let mut raw = vec![0; content_length];
        reader.read_exact(&mut raw).expect("read body");

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .expect("write response");
        stream.flush().expect("flush response");

        Captured {
            request_line: request_line.trim_end().to_string(),
            authorization,
            body: serde_json::from_slice(&raw).expect("request body is json"),
        }
    });

    (base_url, handle)
}

// Accepts one connection, panicking instead of blocking if no client shows up.
fn accept_within(listener: &TcpListener, limit: Duration) -> TcpStream {
    listener.set_nonblocking(true).expect("nonblocking listener");
    let deadline = Instant::now() + limit;
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false).expect("blocking stream");
                stream.set_read_timeout(Some(limit)).expect("read timeout");
                return stream;
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                assert!(Instant::now() < deadline, "no request arrived");
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    }
}

const TEXT: &str = "1. Apa ibu kota Indonesia?\na. Surabaya\n*b. Jakarta\n\n2. Tanpa kunci\na. x\nb. y\n\n3. Jelaskan fotosintesis (essay)";

#[test]
fn sends_only_valid_questions() {
    let (base_url, server) = serve_once("201 Created", r#"{"imported": 2}"#);
    let preview = ImportPreview::parse(TEXT, 5);

    let client = BulkImportClient::new(&base_url, "rahasia");
    let report = client
        .import("12", &preview.valid_questions())
        .expect("import succeeds");
    assert_eq!(report.imported, 2);

    let captured = server.join().expect("server thread");
    assert_eq!(captured.request_line, "POST /exams/12/questions/bulk HTTP/1.1");
    assert_eq!(captured.authorization.as_deref(), Some("Bearer rahasia"));

    let questions = captured.body["questions"].as_array().expect("questions array");
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0]["question_text"], "Apa ibu kota Indonesia?");
    assert_eq!(questions[0]["question_type"], "multiple_choice");
    assert_eq!(questions[0]["points"], 5);
    assert_eq!(questions[0]["options"][1]["is_correct"], true);
    assert_eq!(questions[1]["question_type"], "essay");
    assert!(questions[1]["options"].as_array().expect("options").is_empty());
    for q in questions {
        assert!(q.get("valid").is_none());
        assert!(q.get("error").is_none());
    }
}

#[test]
fn count_falls_back_to_batch_size() {
    let (base_url, server) = serve_once("200 OK", "{}");
    let preview = ImportPreview::parse(TEXT, 1);

    let report = BulkImportClient::new(&base_url, "t")
        .import("3", &preview.valid_questions())
        .expect("import succeeds");
    assert_eq!(report.imported, 2);
    server.join().expect("server thread");
}

#[test]
fn server_rejection_is_reported() {
    let (base_url, server) = serve_once("422 Unprocessable Entity", r#"{"message":"exam already started"}"#);
    let preview = ImportPreview::parse(TEXT, 1);

    let err = BulkImportClient::new(&base_url, "t")
        .import("3", &preview.valid_questions())
        .unwrap_err();
    match &err {
        ImportError::Request(RequestError::ServerError { status, message }) => {
            assert_eq!(*status, 422);
            assert_eq!(message.as_deref(), Some("exam already started"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("exam already started"));
    server.join().expect("server thread");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);

    let preview = ImportPreview::parse(TEXT, 1);
    let err = BulkImportClient::with_timeout(&base_url, "t", Duration::from_secs(5))
        .import("3", &preview.valid_questions())
        .unwrap_err();
    assert!(matches!(err, ImportError::Request(RequestError::Http(_))));
    assert!(err.to_string().starts_with("bulk import failed: HTTP request failed"));
}
