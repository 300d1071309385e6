use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{diagnostic, Error, Result};

const YT_DLP: &str = "yt-dlp";

/// Extensions yt-dlp may use for a written thumbnail.
const IMAGE_EXTENSIONS: &[&str] = &["webp", "jpg", "jpeg", "png"];

/// Return the trimmed link if it is a remote http(s) URL.
///
/// yt-dlp also accepts local paths and pseudo-URLs like `ytsearch:`; those
/// never reach the command line.
pub fn validate_link(link: &str) -> Result<&str> {
    let link = link.trim();
    let remote = link.split_once("://").is_some_and(|(scheme, rest)| {
        !rest.is_empty()
            && (scheme.eq_ignore_ascii_case("https") || scheme.eq_ignore_ascii_case("http"))
    });
    if remote {
        Ok(link)
    } else {
        Err(Error::InvalidLink(link.to_string()))
    }
}

/// Check that yt-dlp is installed.
pub async fn check_installed() -> Result<()> {
    Command::new(YT_DLP)
        .arg("--version")
        .output()
        .await
        .map(|_| ())
        .map_err(|_| Error::ToolNotFound { tool: YT_DLP })
}

/// Run yt-dlp and return its stdout, mapping failures to acquisition errors.
async fn run(args: Vec<OsString>, what: &str) -> Result<Vec<u8>> {
    debug!(?args, "running yt-dlp");
    let output = Command::new(YT_DLP).args(&args).output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ToolNotFound { tool: YT_DLP }
        } else {
            Error::Acquisition(format!("failed to run yt-dlp: {e}"))
        }
    })?;

    if !output.status.success() {
        return Err(Error::Acquisition(format!(
            "yt-dlp {what} failed: {}",
            diagnostic(&output.stderr)
        )));
    }
    Ok(output.stdout)
}

/// Fetch the video's metadata as JSON text.
///
/// yt-dlp runs without a shell and with `--no-exec`, so nothing in the
/// link or the metadata can trigger a command.
pub async fn dump_metadata(link: &str) -> Result<String> {
    let link = validate_link(link)?;
    info!(%link, "fetching metadata");

    let stdout = run(metadata_args(link), "metadata dump").await?;
    let text = String::from_utf8(stdout)
        .map_err(|_| Error::Acquisition("metadata dump is not valid UTF-8".into()))?;
    Ok(text)
}

/// Download the audio track as `<work_dir>/<stem>.<audio_format>`.
pub async fn download_audio(
    link: &str,
    work_dir: &Path,
    stem: &str,
    audio_format: &str,
) -> Result<PathBuf> {
    let link = validate_link(link)?;
    info!(%link, "downloading audio");
    tokio::fs::create_dir_all(work_dir).await?;

    let stdout = run(audio_args(link, work_dir, stem, audio_format), "download").await?;

    // after_move:filepath prints the final path once post-processing is done
    let stdout = String::from_utf8_lossy(&stdout);
    let audio_path = match stdout.lines().map(str::trim).rfind(|l| !l.is_empty()) {
        Some(printed) => printed_file_in(Path::new(printed), work_dir).await?,
        None => find_file_with_stem(work_dir, stem, &[audio_format]).await?,
    };

    debug!(path = %audio_path.display(), "audio downloaded");
    Ok(audio_path)
}

/// Download the video thumbnail into `work_dir` without the media itself.
pub async fn download_thumbnail(link: &str, work_dir: &Path, stem: &str) -> Result<PathBuf> {
    let link = validate_link(link)?;
    info!(%link, "fetching thumbnail");
    tokio::fs::create_dir_all(work_dir).await?;

    let thumb_stem = format!("{stem}.thumb");
    run(thumbnail_args(link, work_dir, &thumb_stem), "thumbnail").await?;

    let path = find_file_with_stem(work_dir, &thumb_stem, IMAGE_EXTENSIONS).await?;
    debug!(path = %path.display(), "thumbnail downloaded");
    Ok(path)
}

fn output_template(work_dir: &Path, stem: &str) -> OsString {
    let mut template = work_dir.join(stem).into_os_string();
    template.push(".%(ext)s");
    template
}

fn metadata_args(link: &str) -> Vec<OsString> {
    ["--dump-json", "--no-download", "--no-exec", "--no-playlist", link]
        .into_iter()
        .map(OsString::from)
        .collect()
}

fn audio_args(link: &str, work_dir: &Path, stem: &str, audio_format: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "--format",
        "ba/b",
        "--extract-audio",
        "--audio-format",
        audio_format,
        "--no-playlist",
        "--no-exec",
        "--print",
        "after_move:filepath",
        "--output",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(output_template(work_dir, stem));
    args.push(link.into());
    args
}

fn thumbnail_args(link: &str, work_dir: &Path, stem: &str) -> Vec<OsString> {
    let mut template = OsString::from("thumbnail:");
    template.push(output_template(work_dir, stem));

    let mut args: Vec<OsString> = [
        "--write-thumbnail",
        "--skip-download",
        "--no-playlist",
        "--no-exec",
        "--output",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(template);
    args.push(link.into());
    args
}

/// Accept a path printed by yt-dlp only if it is an existing file sitting
/// directly in `work_dir`.
async fn printed_file_in(printed: &Path, work_dir: &Path) -> Result<PathBuf> {
    let file = tokio::fs::canonicalize(printed).await.map_err(|e| {
        Error::Acquisition(format!(
            "yt-dlp reported {} but it cannot be opened: {e}",
            printed.display()
        ))
    })?;
    let dir = tokio::fs::canonicalize(work_dir).await?;

    if file.parent() != Some(dir.as_path()) {
        warn!(
            path = %printed.display(),
            work_dir = %work_dir.display(),
            "yt-dlp wrote outside the work directory"
        );
        return Err(Error::Acquisition(format!(
            "yt-dlp wrote {} outside {}",
            printed.display(),
            work_dir.display()
        )));
    }
    Ok(printed.to_path_buf())
}

/// Newest `<stem>.<ext>` in `dir` whose extension is one of `extensions`.
async fn find_file_with_stem(dir: &Path, stem: &str, extensions: &[&str]) -> Result<PathBuf> {
    let mut best: Option<(PathBuf, std::time::SystemTime)> = None;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches_stem = path.file_stem().is_some_and(|s| s == stem);
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if !(matches_stem && matches_ext) {
            continue;
        }
        if let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) {
            if best.as_ref().is_none_or(|(_, t)| modified > *t) {
                best = Some((path, modified));
            }
        }
    }

    best.map(|(p, _)| p).ok_or_else(|| {
        Error::Acquisition(format!(
            "no {} file named {stem} found in {}",
            extensions.join("/"),
            dir.display()
        ))
    })
}
