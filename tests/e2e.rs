//! End-to-end tests through the public API only: a wiremock server plays
//! both the metadata endpoint and the asset host, the payload is fabricated
//! with the codec's inverse transform, and artifacts land in a temp dir.

use doc88_dl::{Config, DocDownloader, Event, FailureMode, PdfConverter, RawConverter, codec};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOC_ID: &str = "3995949474894";

fn fabricate_payload(host: &str, name: &str, assets: &[&str]) -> String {
    let pages: Vec<serde_json::Value> = assets
        .iter()
        .map(|u| serde_json::json!({ "u": u }))
        .collect();
    let info = serde_json::json!({
        "gif_host": host,
        "name": name,
        "gif_struct": serde_json::to_string(&pages).unwrap(),
    });
    codec::encode(info.to_string().as_bytes())
}

async fn mock_document(server: &MockServer, name: &str, pages: &[(&str, Vec<u8>)]) {
    let assets: Vec<&str> = pages.iter().map(|(asset, _)| *asset).collect();
    let payload = fabricate_payload(&server.uri(), name, &assets);
    Mock::given(method("GET"))
        .and(path("/doc.php"))
        .and(query_param("p_code", DOC_ID))
        .and(query_param("act", "info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(payload))
        .mount(server)
        .await;
    for (asset, body) in pages {
        Mock::given(method("GET"))
            .and(path(format!("/get-{asset}.gif")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(server)
            .await;
    }
}

fn config_for(server: &MockServer, output_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.endpoint.base_url = server.uri();
    config.download.output_dir = output_dir.to_path_buf();
    config.retry.max_attempts = 2;
    config.retry.initial_delay = Duration::from_millis(5);
    config
}

/// Build a tiny PNG so the PDF converter has a real raster to embed.
fn tiny_png(fill: [u8; 3]) -> Vec<u8> {
    use image::{DynamicImage, ImageFormat, RgbImage};
    let mut raster = RgbImage::new(4, 3);
    for pixel in raster.pixels_mut() {
        *pixel = image::Rgb(fill);
    }
    let mut out = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(raster)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[tokio::test]
async fn two_page_document_assembles_in_server_order() {
    let server = MockServer::start().await;
    mock_document(
        &server,
        "Report",
        &[("a1", b"IMG-A1".to_vec()), ("a2", b"IMG-A2".to_vec())],
    )
    .await;

    let temp = tempfile::tempdir().unwrap();
    let downloader =
        DocDownloader::with_converter(config_for(&server, temp.path()), Arc::new(RawConverter))
            .unwrap();

    let mut events = downloader.subscribe();
    let artifact = downloader.download(DOC_ID).await.unwrap();

    // Artifact lives in a directory named after the document.
    assert_eq!(artifact, temp.path().join("Report").join("Report.bin"));
    assert_eq!(std::fs::read(&artifact).unwrap(), b"IMG-A1IMG-A2");

    // The event stream tells the whole story in order.
    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(match event {
            Event::Started { .. } => "started",
            Event::MetadataResolved { total_pages, .. } => {
                assert_eq!(total_pages, 2);
                "metadata"
            }
            Event::PageComplete { .. } => "page",
            Event::Assembling { .. } => "assembling",
            Event::Complete { pages, failed, .. } => {
                assert_eq!((pages, failed), (2, 0));
                "complete"
            }
            other => panic!("unexpected event {other:?}"),
        });
    }
    assert_eq!(
        kinds,
        ["started", "metadata", "page", "page", "assembling", "complete"]
    );
}

#[tokio::test]
async fn pdf_converter_produces_a_real_pdf_artifact() {
    let server = MockServer::start().await;
    mock_document(
        &server,
        "Booklet",
        &[
            ("p0", tiny_png([200, 10, 10])),
            ("p1", tiny_png([10, 200, 10])),
        ],
    )
    .await;

    let temp = tempfile::tempdir().unwrap();
    let downloader =
        DocDownloader::with_converter(config_for(&server, temp.path()), Arc::new(PdfConverter))
            .unwrap();

    let artifact = downloader.download(DOC_ID).await.unwrap();

    assert_eq!(artifact, temp.path().join("Booklet").join("Booklet.pdf"));
    let bytes = std::fs::read(&artifact).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn rerunning_a_document_overwrites_the_previous_artifact() {
    let server = MockServer::start().await;
    mock_document(&server, "Again", &[("a1", b"NEW".to_vec())]).await;

    let temp = tempfile::tempdir().unwrap();
    let dir = temp.path().join("Again");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("Again.bin"), b"OLD-ARTIFACT").unwrap();

    let downloader =
        DocDownloader::with_converter(config_for(&server, temp.path()), Arc::new(RawConverter))
            .unwrap();
    let artifact = downloader.download(DOC_ID).await.unwrap();

    assert_eq!(std::fs::read(&artifact).unwrap(), b"NEW");
}

#[tokio::test]
async fn best_effort_mode_is_honored_end_to_end() {
    let server = MockServer::start().await;
    let payload = fabricate_payload(&server.uri(), "Mixed", &["ok0", "bad", "ok2"]);
    Mock::given(method("GET"))
        .and(path("/doc.php"))
        .and(query_param("p_code", DOC_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(payload))
        .mount(&server)
        .await;
    for (asset, response) in [
        ("ok0", ResponseTemplate::new(200).set_body_bytes(b"A".to_vec())),
        ("bad", ResponseTemplate::new(404)),
        ("ok2", ResponseTemplate::new(200).set_body_bytes(b"C".to_vec())),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/get-{asset}.gif")))
            .respond_with(response)
            .mount(&server)
            .await;
    }

    let temp = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, temp.path());
    config.download.failure_mode = FailureMode::BestEffort;
    let downloader = DocDownloader::with_converter(config, Arc::new(RawConverter)).unwrap();

    let artifact = downloader.download(DOC_ID).await.unwrap();
    assert_eq!(std::fs::read(&artifact).unwrap(), b"AC");
}
