// src/record/command.rs

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::probe::channel_url;

/// Per-broadcast directory and file stem. yt-dlp fills the fields in, so a
/// restart for the same broadcast lands on the same file and resumes it.
const NAME_TEMPLATE: &str = "[%(upload_date)s]_%(title)s(%(id)s)";

/// Output template passed to `-o`:
/// `<dir>/<key>/<name>/<name>.mp4`.
pub fn output_template(output_dir: &Path, key: &str) -> PathBuf {
    output_dir
        .join(key)
        .join(NAME_TEMPLATE)
        .join(format!("{NAME_TEMPLATE}.mp4"))
}

/// Full argument list for a recording run of `key`.
pub fn recording_args(key: &str, ffmpeg: &Path, output_dir: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "-c", "--no-part", "--ffmpeg-location"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(ffmpeg.as_os_str().to_owned());
    args.push("--restrict-filenames".into());
    args.push("-o".into());
    args.push(output_template(output_dir, key).into_os_string());
    args.extend(
        ["--embed-thumbnail", "--merge-output-format", "mp4"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(channel_url(key).into());
    args
}
