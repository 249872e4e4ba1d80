//! Runs `YtDlpExtractor` against stand-in yt-dlp scripts.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use vidrelay_core::config::DownloadSettings;
use vidrelay_core::extractor::{ExtractError, MediaExtractor, YtDlpExtractor};

const SUCCESS_SCRIPT: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
dir=$(dirname "$out")
printf 'fake video bytes' > "$dir/Fake title.mp4"
printf '{"title": "Fake title", "filepath": "%s"}\n' "$dir/Fake title.mp4"
"#;

const FAILURE_SCRIPT: &str = r#"#!/bin/sh
echo "WARNING: retrying" >&2
echo "ERROR: [youtube] abc: Private video. Sign in if you've been granted access" >&2
exit 1
"#;

const SLOW_SCRIPT: &str = "#!/bin/sh\nsleep 5\n";

fn write_script(dir: &Path, name: &str, body: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, body)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

fn extractor_for(script: &Path, timeout_secs: Option<u64>) -> YtDlpExtractor {
    YtDlpExtractor::new(&DownloadSettings {
        ytdlp_path: script.to_string_lossy().into_owned(),
        extraction_timeout_secs: timeout_secs,
        ..DownloadSettings::default()
    })
}

// One test function so the scripts are never exec'd while another thread writes one
#[tokio::test]
async fn ytdlp_process_outcomes() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let bin = tmp.path().join("bin");
    let work = tmp.path().join("work");
    std::fs::create_dir_all(&bin)?;
    std::fs::create_dir_all(&work)?;

    let success = write_script(&bin, "ok.sh", SUCCESS_SCRIPT)?;
    let failure = write_script(&bin, "fail.sh", FAILURE_SCRIPT)?;
    let slow = write_script(&bin, "slow.sh", SLOW_SCRIPT)?;

    let media = extractor_for(&success, None)
        .extract("https://youtu.be/abc", &work)
        .await?;
    assert_eq!(media.title, "Fake title");
    assert_eq!(media.path, work.join("Fake title.mp4"));
    assert_eq!(std::fs::read(&media.path)?, b"fake video bytes");

    let err = extractor_for(&failure, None)
        .extract("https://youtu.be/abc", &work)
        .await;
    match err {
        Err(ExtractError::Unavailable(reason)) => {
            assert!(reason.starts_with("ERROR: [youtube] abc: Private video"));
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }

    let err = extractor_for(&slow, Some(1))
        .extract("https://youtu.be/abc", &work)
        .await;
    assert!(matches!(err, Err(ExtractError::TimedOut(_))), "got {err:?}");

    Ok(())
}
