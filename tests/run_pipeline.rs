// End-to-end tests for AssetProcessor::run against an in-process HTTP server
use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread;

use asset_prep::asset_pipeline::{
    AssetProcessor, EntryStage, ImageConfig, ImageEntry, ImageError, ImageManifest,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba};

struct Route {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

/// Serves exactly `expected_requests` connections, routing on the request path.
fn spawn_server(
    routes: HashMap<&'static str, Route>,
    expected_requests: usize,
) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
    let addr = listener.local_addr().expect("read local addr failed");

    let server = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..expected_requests {
            let (mut stream, _) = listener.accept().expect("accept failed");

            let mut req_buf = [0u8; 2048];
            let n = stream.read(&mut req_buf).unwrap_or(0);
            let request = String::from_utf8_lossy(&req_buf[..n]);
            let path = request
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("/")
                .to_string();

            let (status, content_type, body) = match routes.get(path.as_str()) {
                Some(route) => (route.status, route.content_type, route.body.clone()),
                None => ("404 Not Found", "text/plain", b"not found".to_vec()),
            };

            let mut response = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            )
            .into_bytes();
            response.extend_from_slice(&body);
            let _ = stream.write_all(&response);
            let _ = stream.flush();

            seen.push(path);
        }
        seen
    });

    (format!("http://127.0.0.1:{}", addr.port()), server)
}

fn sample_png() -> Vec<u8> {
    let mut img = RgbImage::new(2, 2);
    img.put_pixel(0, 0, Rgb([255, 255, 255]));
    img.put_pixel(1, 0, Rgb([10, 10, 10]));
    img.put_pixel(0, 1, Rgb([250, 248, 245]));
    img.put_pixel(1, 1, Rgb([0, 0, 0]));

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn local_processor() -> AssetProcessor {
    AssetProcessor::new(ImageConfig {
        use_system_proxy: false,
        ..ImageConfig::default()
    })
    .expect("processor init failed")
}

fn png(body: Vec<u8>) -> Route {
    Route {
        status: "200 OK",
        content_type: "image/png",
        body,
    }
}

#[tokio::test]
async fn run_keys_out_white_and_writes_rgba_png() {
    let mut routes = HashMap::new();
    routes.insert("/art.jpg", png(sample_png()));
    let (base, server) = spawn_server(routes, 1);

    let root = tempfile::tempdir().expect("create temp dir failed");
    let output_dir = root.path().join("src").join("assets").join("images");
    let manifest = ImageManifest::new(vec![ImageEntry::new(
        format!("{}/art.jpg", base),
        "hero-overflow",
    )])
    .expect("manifest should be valid");

    let report = local_processor().run(&manifest, &output_dir).await;
    server.join().expect("server thread failed");

    assert!(report.created_output_dir);
    assert_eq!(report.succeeded(), 1);

    let saved = output_dir.join("hero-overflow.png");
    let decoded = image::open(&saved).expect("reload failed");
    assert_eq!(decoded.color(), image::ColorType::Rgba8);

    let rgba = decoded.to_rgba8();
    assert_eq!(rgba.dimensions(), (2, 2));
    assert_eq!(rgba.get_pixel(0, 0), &Rgba([255, 255, 255, 0]));
    assert_eq!(rgba.get_pixel(1, 0), &Rgba([10, 10, 10, 255]));
    assert_eq!(rgba.get_pixel(0, 1), &Rgba([255, 255, 255, 0]));
    assert_eq!(rgba.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
}

#[tokio::test]
async fn run_continues_past_failures_and_writes_only_successes() {
    let mut routes = HashMap::new();
    routes.insert("/first.png", png(sample_png()));
    routes.insert(
        "/page.png",
        Route {
            status: "200 OK",
            content_type: "text/html",
            body: b"<html><body>moved</body></html>".to_vec(),
        },
    );
    routes.insert("/last.png", png(sample_png()));
    let (base, server) = spawn_server(routes, 4);

    let output = tempfile::tempdir().expect("create temp dir failed");
    let previous = output.path().join("gone.png");
    fs::write(&previous, b"previous asset").expect("seed previous file failed");

    let manifest = ImageManifest::new(vec![
        ImageEntry::new(format!("{}/first.png", base), "first"),
        ImageEntry::new(format!("{}/missing.png", base), "gone"),
        ImageEntry::new(format!("{}/page.png", base), "page"),
        ImageEntry::new(format!("{}/last.png", base), "last"),
    ])
    .expect("manifest should be valid");

    let report = local_processor().run(&manifest, output.path()).await;
    let requested = server.join().expect("server thread failed");

    assert_eq!(
        requested,
        ["/first.png", "/missing.png", "/page.png", "/last.png"],
        "entries must be fetched in manifest order"
    );
    assert!(!report.created_output_dir);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 2);

    let gone = report.outcome("gone").and_then(|o| o.failure()).expect("404 entry fails");
    assert_eq!(gone.stage, EntryStage::Fetching);
    match &gone.error {
        ImageError::Network(msg) => assert!(msg.contains("404")),
        other => panic!("unexpected error: {other}"),
    }

    let page = report.outcome("page").and_then(|o| o.failure()).expect("html entry fails");
    assert_eq!(page.stage, EntryStage::Decoding);
    assert!(matches!(page.error, ImageError::Decode(_)));

    assert!(output.path().join("first.png").is_file());
    assert!(output.path().join("last.png").is_file());
    assert!(!output.path().join("page.png").exists());
    assert_eq!(
        fs::read(&previous).expect("previous file should remain"),
        b"previous asset"
    );

    let pngs = fs::read_dir(output.path())
        .expect("read output dir")
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
        .count();
    // first + last + the untouched pre-existing gone.png
    assert_eq!(pngs, 3);
}

#[tokio::test]
async fn run_creates_directory_even_when_every_fetch_fails() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind failed");
        listener.local_addr().expect("read local addr failed").port()
    };

    let root = tempfile::tempdir().expect("create temp dir failed");
    let output_dir = root.path().join("fresh");
    let manifest = ImageManifest::new(vec![
        ImageEntry::new(format!("http://127.0.0.1:{}/a.png", port), "a"),
        ImageEntry::new("definitely not a url", "b"),
    ])
    .expect("manifest should be valid");

    let report = local_processor().run(&manifest, &output_dir).await;

    assert!(output_dir.is_dir());
    assert_eq!(report.succeeded(), 0);
    assert_eq!(report.failed(), 2);
    assert!(report.failures().all(|(_, f)| {
        f.stage == EntryStage::Fetching && matches!(f.error, ImageError::Network(_))
    }));
    assert_eq!(fs::read_dir(&output_dir).expect("read output dir").count(), 0);
}

#[tokio::test]
async fn run_with_unusable_output_dir_fails_every_entry_at_saving() {
    let mut routes = HashMap::new();
    routes.insert("/art.png", png(sample_png()));
    let (base, server) = spawn_server(routes, 1);

    let root = tempfile::tempdir().expect("create temp dir failed");
    let blocked = root.path().join("blocked");
    fs::write(&blocked, b"a file, not a directory").expect("seed file failed");

    let manifest = ImageManifest::new(vec![ImageEntry::new(format!("{}/art.png", base), "art")])
        .expect("manifest should be valid");

    let report = local_processor().run(&manifest, &blocked).await;
    server.join().expect("server thread failed");

    let failure = report.outcome("art").and_then(|o| o.failure()).expect("entry fails");
    assert_eq!(failure.stage, EntryStage::Saving);
    assert!(matches!(failure.error, ImageError::FileSystem(_)));
}
