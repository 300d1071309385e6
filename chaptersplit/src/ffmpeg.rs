use std::ffi::OsString;
use std::path::Path;
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{diagnostic, Error, Result};
use crate::timestamp::Timestamp;

const FFMPEG: &str = "ffmpeg";

/// Largest centered square that fits in the frame, whatever its orientation.
const SQUARE_CROP: &str = "crop='min(iw,ih)':'min(iw,ih)'";

/// Check that ffmpeg is installed.
pub async fn check_installed() -> Result<()> {
    Command::new(FFMPEG)
        .arg("-version")
        .output()
        .await
        .map(|_| ())
        .map_err(|_| Error::ToolNotFound { tool: FFMPEG })
}

async fn run(args: Vec<OsString>) -> Result<Output> {
    debug!(?args, "running ffmpeg");
    Command::new(FFMPEG)
        .args(&args)
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ToolNotFound { tool: FFMPEG }
            } else {
                Error::Io(e)
            }
        })
}

/// Copy `[start, end)` of `source` into `dest` without re-encoding.
///
/// Refuses to overwrite `dest`; the caller resolves a free path first.
pub async fn extract_range(
    source: &Path,
    start: Timestamp,
    end: Timestamp,
    dest: &Path,
) -> Result<()> {
    info!(source = %source.display(), %start, %end, dest = %dest.display(), "extracting range");

    let output = run(extract_args(source, start, end, dest)).await?;
    if !output.status.success() {
        return Err(Error::ExtractionFailed {
            path: dest.to_path_buf(),
            diagnostic: diagnostic(&output.stderr),
        });
    }
    Ok(())
}

/// Crop `source` to a centered square and write it to `dest`.
pub async fn crop_to_square(source: &Path, dest: &Path) -> Result<()> {
    info!(source = %source.display(), "cropping cover image");

    let output = run(crop_args(source, dest)).await?;
    if !output.status.success() {
        return Err(Error::Acquisition(format!(
            "ffmpeg crop failed: {}",
            diagnostic(&output.stderr)
        )));
    }
    Ok(())
}

fn extract_args(source: &Path, start: Timestamp, end: Timestamp, dest: &Path) -> Vec<OsString> {
    vec![
        "-nostdin".into(),
        "-n".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        source.into(),
        "-ss".into(),
        start.to_string().into(),
        "-to".into(),
        end.to_string().into(),
        "-c".into(),
        "copy".into(),
        dest.into(),
    ]
}

fn crop_args(source: &Path, dest: &Path) -> Vec<OsString> {
    vec![
        "-nostdin".into(),
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        source.into(),
        "-filter:v".into(),
        SQUARE_CROP.into(),
        "-frames:v".into(),
        "1".into(),
        dest.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_extract_args() {
        let args = strings(extract_args(
            Path::new("/work/Set.mp3"),
            Timestamp::from_secs(10),
            Timestamp::from_secs(124),
            Path::new("/out/Set/Song1.mp3"),
        ));
        assert_eq!(
            args,
            [
                "-nostdin", "-n", "-loglevel", "error", "-i", "/work/Set.mp3", "-ss", "00:00:10",
                "-to", "00:02:04", "-c", "copy", "/out/Set/Song1.mp3",
            ]
        );
    }

    #[test]
    fn test_crop_args_square_filter() {
        let args = strings(crop_args(Path::new("/work/a.webp"), Path::new("/work/a.jpg")));
        assert!(args.windows(2).any(|w| w == ["-filter:v", SQUARE_CROP]));
        assert_eq!(args.last().unwrap(), "/work/a.jpg");
    }
}
