use std::path::{self, Path, PathBuf};

use chrono::{DateTime, Local};

/// Build the path of a log file.
///
/// The file is named `<name>.<extension>`, or `<name>_<YYYYmmdd-HHMMSS>.<extension>`
/// when a start time is given. The result is made absolute against the current
/// directory.
pub fn log_file_path(
    directory: &Path,
    name: &str,
    extension: &str,
    started_at: Option<DateTime<Local>>,
) -> std::io::Result<PathBuf> {
    let mut file_name = match started_at {
        Some(t) => format!("{name}_{}", t.format("%Y%m%d-%H%M%S")),
        None => name.to_owned(),
    };
    if !extension.is_empty() {
        file_name.push('.');
        file_name.push_str(extension.trim_start_matches('.'));
    }
    path::absolute(directory.join(file_name))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_log_path() {
        let path = log_file_path(Path::new("/data/logs"), "datalog_02", "csv", None).unwrap();
        assert_eq!(path, PathBuf::from("/data/logs/datalog_02.csv"));
    }

    #[test]
    fn test_format_log_path_with_date() {
        let t = Local
            .with_ymd_and_hms(2022, 1, 6, 14, 5, 9)
            .single()
            .unwrap();
        let path = log_file_path(Path::new("/data"), "run", ".txt", Some(t)).unwrap();
        assert_eq!(path, PathBuf::from("/data/run_20220106-140509.txt"));
    }

    #[test]
    fn test_relative_directory_becomes_absolute() {
        let path = log_file_path(Path::new("logs"), "run", "", None).unwrap();
        assert!(path.is_absolute());
        assert!(path.ends_with("logs/run"));
    }
}
