//! Split a single video into tagged chapter tracks under ./download.
//!
//! Usage: cargo run --example basic -- https://example.com/watch?v=abc

#[tokio::main]
async fn main() -> chaptersplit::Result<()> {
    let link = std::env::args()
        .nth(1)
        .expect("usage: basic <link>");

    let report = chaptersplit::split(&link).await?;

    for video in &report.videos {
        for track in video.tracks() {
            println!("[{} - {}] {}", track.start, track.end, track.path.display());
        }
    }

    Ok(())
}
