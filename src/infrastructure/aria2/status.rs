use super::DownloadView;
use serde::Deserialize;

/// Subset of an `aria2.tell*` status struct. aria2 encodes numbers as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub gid: String,
    pub status: String,
    #[serde(default)]
    pub total_length: String,
    #[serde(default)]
    pub completed_length: String,
    #[serde(default)]
    pub download_speed: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub path: String,
}

impl From<StatusEntry> for DownloadView {
    fn from(entry: StatusEntry) -> Self {
        let total = parse_count(&entry.total_length);
        let completed = parse_count(&entry.completed_length);
        let speed = parse_count(&entry.download_speed);

        let progress = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let name = entry
            .files
            .first()
            .map(|f| base_name(&f.path))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| entry.gid.clone());

        Self {
            gid: entry.gid,
            name,
            total_length: total,
            completed_length: completed,
            download_speed: speed,
            status: display_status(&entry.status).to_string(),
            progress: format!("{:.1}%", progress),
            progress_num: progress,
            speed: format!("{}/s", byte_count_si(speed)),
        }
    }
}

fn parse_count(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

fn base_name(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

fn display_status(raw: &str) -> &str {
    match raw {
        "active" => "Downloading",
        "waiting" => "Queued",
        "paused" => "Paused",
        "complete" => "Completed",
        "error" => "Error",
        "removed" => "Removed",
        other => other,
    }
}

/// Decimal (SI) byte formatting: `999 B`, `1.2 kB`, `3.4 MB`.
pub fn byte_count_si(bytes: i64) -> String {
    const UNIT: i64 = 1000;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['k', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(json: &str) -> StatusEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn active_entry_is_mapped() {
        let view = DownloadView::from(entry(
            r#"{"gid":"2089b05ecca3d829","status":"active","totalLength":"2000","completedLength":"500",
                "downloadSpeed":"1500","files":[{"path":"/srv/downloads/debian.iso"}]}"#,
        ));

        assert_eq!(view.name, "debian.iso");
        assert_eq!(view.status, "Downloading");
        assert_eq!(view.progress, "25.0%");
        assert_eq!(view.progress_num, 25.0);
        assert_eq!(view.speed, "1.5 kB/s");
    }

    #[test]
    fn nameless_entry_falls_back_to_gid() {
        let view = DownloadView::from(entry(
            r#"{"gid":"abc","status":"waiting","totalLength":"0","completedLength":"0","downloadSpeed":"0","files":[{"path":""}]}"#,
        ));

        assert_eq!(view.name, "abc");
        assert_eq!(view.status, "Queued");
        assert_eq!(view.progress, "0.0%");
        assert_eq!(view.speed, "0 B/s");
    }

    #[test]
    fn windows_paths_use_last_segment() {
        assert_eq!(base_name(r"C:\downloads\movie.mkv"), "movie.mkv");
    }

    #[test]
    fn si_units_scale() {
        assert_eq!(byte_count_si(999), "999 B");
        assert_eq!(byte_count_si(1_000), "1.0 kB");
        assert_eq!(byte_count_si(1_234_567), "1.2 MB");
        assert_eq!(byte_count_si(5_000_000_000), "5.0 GB");
    }
}
