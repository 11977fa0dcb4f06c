mod common;

use common::{gallery_page, listing_page, mount_image, mount_page, EventRecorder};
use libflickgrab::{run_session, DownloadRule, Event, EventBus, Session, View};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use wiremock::MockServer;

fn rule(interval_ms: u64) -> DownloadRule {
    DownloadRule {
        launch_interval: Duration::from_millis(interval_ms),
        count_failed_downloads: false,
    }
}

async fn run_against(
    server: &MockServer,
    download_folder: &Path,
    rule: DownloadRule,
    recorder: &EventRecorder,
) -> Result<(), libflickgrab::GrabError> {
    let mut bus = EventBus::new();
    bus.register(recorder.observer());
    let session = Session::with_base(
        &server.uri(),
        "alice",
        View::Photostream,
        Some(download_folder.to_path_buf()),
        rule,
    )
    .unwrap();
    run_session(&session, &bus).await
}

#[tokio::test]
async fn downloads_every_distinct_image_exactly_once() {
    let server = MockServer::start().await;
    let download_dir = tempdir().unwrap();

    // Two listing pages that share one thumbnail between them.
    mount_page(&server, "/photos/alice", gallery_page(2)).await;
    mount_page(
        &server,
        "/photos/alice/page1",
        listing_page(&[
            format!("{}/imgs/a.jpg", server.uri()),
            format!("{}/imgs/b.jpg", server.uri()),
        ]),
    )
    .await;
    mount_page(
        &server,
        "/photos/alice/page2",
        listing_page(&[
            format!("{}/imgs/b.jpg", server.uri()),
            format!("{}/imgs/c.jpg", server.uri()),
        ]),
    )
    .await;
    mount_image(&server, "/imgs/a_b.jpg", b"image-a").await;
    mount_image(&server, "/imgs/b_b.jpg", b"image-b").await;
    mount_image(&server, "/imgs/c_b.jpg", b"image-c").await;

    let recorder = EventRecorder::new();
    let result = run_against(&server, download_dir.path(), rule(10), &recorder).await;
    assert!(result.is_ok());

    for (name, bytes) in [
        ("a_b.jpg", b"image-a"),
        ("b_b.jpg", b"image-b"),
        ("c_b.jpg", b"image-c"),
    ] {
        let written = tokio::fs::read(download_dir.path().join(name)).await.unwrap();
        assert_eq!(written, bytes, "unexpected contents for {name}");
    }

    let events = recorder.events();
    assert_eq!(events[0], Event::PageCountLoaded);
    assert_eq!(events[1], Event::ImageUrlsLoaded);
    assert_eq!(
        recorder.count(|event| matches!(event, Event::DownloadFinished(_))),
        3
    );
    assert_eq!(
        recorder.count(|event| matches!(event, Event::AllDownloadsFinished)),
        1
    );
    assert_eq!(recorder.count(|event| matches!(event, Event::Error { .. })), 0);

    // The aggregate event closes the run, after the third download.
    assert_eq!(events.last(), Some(&Event::AllDownloadsFinished));
}

#[tokio::test]
async fn an_empty_gallery_never_reports_all_downloads_finished() {
    let server = MockServer::start().await;
    let download_dir = tempdir().unwrap();

    mount_page(&server, "/photos/alice", gallery_page(0)).await;

    let recorder = EventRecorder::new();
    let result = run_against(&server, download_dir.path(), rule(10), &recorder).await;
    assert!(result.is_ok());

    // The page barrier is satisfied immediately with zero pages; with
    // nothing to download there is no aggregate signal either.
    assert_eq!(
        recorder.events(),
        vec![Event::PageCountLoaded, Event::ImageUrlsLoaded]
    );
}

#[tokio::test]
async fn downloads_launch_in_list_order_at_growing_offsets() {
    let server = MockServer::start().await;
    let download_dir = tempdir().unwrap();

    mount_page(&server, "/photos/alice", gallery_page(1)).await;
    mount_page(
        &server,
        "/photos/alice/page1",
        listing_page(&[
            format!("{}/imgs/a.jpg", server.uri()),
            format!("{}/imgs/b.jpg", server.uri()),
            format!("{}/imgs/c.jpg", server.uri()),
        ]),
    )
    .await;
    mount_image(&server, "/imgs/a_b.jpg", b"image-a").await;
    mount_image(&server, "/imgs/b_b.jpg", b"image-b").await;
    mount_image(&server, "/imgs/c_b.jpg", b"image-c").await;

    let recorder = EventRecorder::new();
    let started = Instant::now();
    run_against(&server, download_dir.path(), rule(60), &recorder)
        .await
        .unwrap();

    // Three tasks at 60/120/180ms offsets: the run cannot settle before the
    // last timer has fired.
    assert!(started.elapsed() >= Duration::from_millis(180));

    // Local latency is far below the stagger step, so completions land in
    // launch order, which is the deduplicated list's order.
    let downloaded: Vec<String> = recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            Event::DownloadFinished(image_url) => Some(image_url),
            _ => None,
        })
        .collect();
    assert_eq!(
        downloaded,
        vec![
            format!("{}/imgs/a_b.jpg", server.uri()),
            format!("{}/imgs/b_b.jpg", server.uri()),
            format!("{}/imgs/c_b.jpg", server.uri()),
        ]
    );
}
