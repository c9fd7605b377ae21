//! Transcript tail reader.
//!
//! Reads a JSONL file backwards in fixed-size chunks so the cost of
//! collecting the last N entries does not grow with the conversation.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result};

/// Bytes read per backward step
const CHUNK_SIZE: u64 = 64 * 1024;

fn is_blank(segment: &[u8]) -> bool {
    segment.iter().all(u8::is_ascii_whitespace)
}

fn count_entries(buf: &[u8]) -> usize {
    buf.split(|b| *b == b'\n').filter(|s| !is_blank(s)).count()
}

/// Return the last `max_lines` non-empty lines of `path`, oldest first
pub fn read_tail_lines(path: &Path, max_lines: usize) -> Result<Vec<String>> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open transcript: {:?}", path))?;
    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat transcript: {:?}", path))?
        .len();

    if max_lines == 0 {
        return Ok(Vec::new());
    }

    let mut pos = len;
    let mut buf: Vec<u8> = Vec::new();

    // One extra entry because the first segment may be cut mid-line
    while pos > 0 && count_entries(&buf) <= max_lines {
        let step = CHUNK_SIZE.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))
            .with_context(|| format!("Failed to seek transcript: {:?}", path))?;
        let mut chunk = vec![0u8; step as usize];
        file.read_exact(&mut chunk)
            .with_context(|| format!("Failed to read transcript: {:?}", path))?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
    }

    let mut segments: Vec<&[u8]> = buf.split(|b| *b == b'\n').collect();
    if pos > 0 && !segments.is_empty() {
        segments.remove(0);
    }

    let lines: Vec<String> = segments
        .into_iter()
        .filter(|s| !is_blank(s))
        .map(|s| String::from_utf8_lossy(s).trim().to_string())
        .collect();

    let skip = lines.len().saturating_sub(max_lines);
    Ok(lines.into_iter().skip(skip).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(n: usize, pad: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..n {
            writeln!(file, "{{\"n\":{},\"pad\":\"{}\"}}", i, "x".repeat(pad)).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn index_of(line: &str) -> usize {
        let v: serde_json::Value = serde_json::from_str(line).unwrap();
        v["n"].as_u64().unwrap() as usize
    }

    #[test]
    fn test_short_file_returns_everything() {
        let file = write_lines(5, 0);
        let lines = read_tail_lines(file.path(), 100).unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(index_of(&lines[0]), 0);
        assert_eq!(index_of(&lines[4]), 4);
    }

    #[test]
    fn test_long_file_returns_tail_only() {
        // Lines larger than a chunk force several backward steps
        let file = write_lines(300, 1000);
        let lines = read_tail_lines(file.path(), 100).unwrap();
        assert_eq!(lines.len(), 100);
        assert_eq!(index_of(&lines[0]), 200);
        assert_eq!(index_of(&lines[99]), 299);
    }

    #[test]
    fn test_lines_spanning_chunks_are_whole() {
        let file = write_lines(4, 100_000);
        let lines = read_tail_lines(file.path(), 2).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(index_of(&lines[0]), 2);
        assert_eq!(index_of(&lines[1]), 3);
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\n\n   \nb\n\n").unwrap();
        let lines = read_tail_lines(file.path(), 10).unwrap();
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_missing_trailing_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "first\nsecond").unwrap();
        let lines = read_tail_lines(file.path(), 1).unwrap();
        assert_eq!(lines, vec!["second".to_string()]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_tail_lines(&dir.path().join("nope.jsonl"), 10).is_err());
    }

    #[test]
    fn test_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_tail_lines(file.path(), 10).unwrap().is_empty());
    }
}
