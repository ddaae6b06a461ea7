//! Append-only question transcript shared by every session of the process.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// One question per line, raw text, newline-terminated.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line. Each line goes out in a single write on an append-mode handle, so
    /// concurrent sessions never interleave within a line.
    pub fn append(&self, line: &str) -> io::Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{line}\n").as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn appends_one_line_per_question() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let transcript = Transcript::new(dir.path().join("orb_log.txt"));
        transcript.append("why?").expect("append");
        transcript.append("what now?").expect("append");
        let content = std::fs::read_to_string(transcript.path()).expect("read");
        assert_eq!(content, "why?\nwhat now?\n");
    }

    #[test]
    fn keeps_existing_content() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("orb_log.txt");
        std::fs::write(&path, "earlier\n").expect("seed");
        Transcript::new(&path).append("later").expect("append");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "earlier\nlater\n");
    }

    #[test]
    fn concurrent_appends_keep_lines_whole() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let transcript = Arc::new(Transcript::new(dir.path().join("orb_log.txt")));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let transcript = Arc::clone(&transcript);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        transcript
                            .append(&format!("session {t} question {i}"))
                            .expect("append");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }
        let content = std::fs::read_to_string(transcript.path()).expect("read");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().all(|l| l.starts_with("session ")));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let transcript = Transcript::new(dir.path().join("missing").join("orb_log.txt"));
        assert!(transcript.append("why?").is_err());
    }
}
