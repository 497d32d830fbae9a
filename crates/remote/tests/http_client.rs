use std::time::Duration;

use course_core::{CourseName, CourseSlug, LessonId, SaveIntent};
use remote::{HttpRemoteClient, RemoteConfig, RemoteError, RemoteStateClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves exactly one canned HTTP response and returns the raw request it saw.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut raw = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.expect("read");
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket
            .write_all(response.as_bytes())
            .await
            .expect("write");
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (format!("http://{addr}"), handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= head_end + 4 + content_length
}

fn client_for(base_url: &str) -> HttpRemoteClient {
    let config = RemoteConfig::default()
        .with_base_url(base_url)
        .with_session_cookie("sid=abc123")
        .with_timeout(Duration::from_secs(5));
    HttpRemoteClient::new(&config).expect("build client")
}

#[tokio::test]
async fn save_posts_intent_with_session_cookie() {
    let (base, server) = serve_once("200 OK", r#"{"savedCourses":["Data Science & AI"]}"#).await;
    let client = client_for(&base);

    let name = CourseName::new("Data Science & AI").unwrap();
    let set = client
        .set_saved_course(&name, SaveIntent::Save)
        .await
        .expect("save");
    assert!(set.contains(&name));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/saved-courses "));
    assert!(request.to_ascii_lowercase().contains("cookie: sid=abc123"));
    assert!(request.contains(r#""courseName":"Data Science & AI""#));
    assert!(request.contains(r#""action":"save""#));
}

#[tokio::test]
async fn complete_lesson_targets_course_path() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"enrollments":[{"courseSlug":"web-dev","progress":10,"completedLessons":["l1"]}]}"#,
    )
    .await;
    let client = client_for(&base);

    let slug = CourseSlug::new("web-dev").unwrap();
    let lesson = LessonId::new("l1").unwrap();
    let enrollments = client.complete_lesson(&slug, &lesson).await.expect("complete");
    assert!(enrollments.is_lesson_completed(&slug, &lesson));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/enrollments/web-dev/lessons "));
    assert!(request.contains(r#""lessonId":"l1""#));
}

#[tokio::test]
async fn unauthorized_maps_to_unauthenticated() {
    let (base, server) = serve_once("401 Unauthorized", "{}").await;
    let err = client_for(&base).fetch_saved_courses().await.unwrap_err();
    assert_eq!(err, RemoteError::Unauthenticated);
    server.await.unwrap();
}

#[tokio::test]
async fn conflict_on_enroll_maps_to_already_enrolled() {
    let (base, server) = serve_once("409 Conflict", "{}").await;
    let slug = CourseSlug::new("web-dev").unwrap();
    let err = client_for(&base).create_enrollment(&slug).await.unwrap_err();
    assert_eq!(err, RemoteError::AlreadyEnrolled);
    server.await.unwrap();
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let (base, server) = serve_once("500 Internal Server Error", "{}").await;
    let err = client_for(&base).fetch_enrollments().await.unwrap_err();
    assert_eq!(err, RemoteError::Status(500));
    server.await.unwrap();
}

#[tokio::test]
async fn success_with_wrong_shape_is_malformed() {
    let (base, server) = serve_once("200 OK", r#"{"savedCourses":"nope"}"#).await;
    let err = client_for(&base).fetch_saved_courses().await.unwrap_err();
    assert!(matches!(err, RemoteError::MalformedResponse(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        listener.local_addr().expect("local addr")
    };
    let err = client_for(&format!("http://{addr}"))
        .fetch_saved_courses()
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}
