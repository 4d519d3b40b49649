//! Corpus access and JSON/JSONL record files.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::CorpusRecord;

/// Indexable, length-queryable sequence of corpus records.
pub trait CorpusSource {
    fn len(&self) -> usize;

    /// Record at `index`. Callers stay below [`len`](CorpusSource::len).
    fn record(&self, index: usize) -> &CorpusRecord;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CorpusSource for [CorpusRecord] {
    fn len(&self) -> usize {
        <[CorpusRecord]>::len(self)
    }

    fn record(&self, index: usize) -> &CorpusRecord {
        &self[index]
    }
}

impl CorpusSource for Vec<CorpusRecord> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn record(&self, index: usize) -> &CorpusRecord {
        &self[index]
    }
}

/// Load records from a JSON array file or a JSONL file (one object per line,
/// blank lines ignored). The format is picked from the first non-blank byte.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = std::fs::File::open(path).with_context(|| format!("open {:?}", path))?;
    let mut reader = BufReader::new(file);

    let is_array = {
        let buf = reader.fill_buf().with_context(|| format!("read {:?}", path))?;
        buf.iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|b| *b == b'[')
    };

    if is_array {
        return serde_json::from_reader(reader).with_context(|| format!("parse {:?}", path));
    }

    let mut records = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {:?}", path))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("parse {:?} line {}", path, lineno + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Write records as JSONL.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut writer, record).context("serialize record")?;
        writer.write_all(b"\n")?;
    }
    writer.flush().with_context(|| format!("write {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordId, ResultRecord};

    #[test]
    fn test_slice_and_vec_sources() {
        let records = vec![
            CorpusRecord::new("a", "x", "y"),
            CorpusRecord::new("b", "x", "y"),
        ];
        assert_eq!(CorpusSource::len(&records), 2);
        assert_eq!(records[..1].record(0).id, Some(RecordId::from("a")));
        assert!(CorpusSource::is_empty(&records[..0]));
    }

    #[test]
    fn test_load_jsonl_and_array() {
        let dir = tempfile::tempdir().unwrap();

        let jsonl = dir.path().join("corpus.jsonl");
        std::fs::write(
            &jsonl,
            "{\"id\":\"1\",\"article\":\"a\",\"highlights\":\"h\"}\n\n{\"id\":2,\"article\":\"b\",\"highlights\":\"i\"}\n",
        )
        .unwrap();
        let records: Vec<CorpusRecord> = load_records(&jsonl).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].key(1), "2");

        let array = dir.path().join("corpus.json");
        std::fs::write(&array, "  [{\"article\":\"a\",\"highlights\":\"h\"}]").unwrap();
        let records: Vec<CorpusRecord> = load_records(&array).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, None);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"article\":\"a\"}\nnot json\n").unwrap();
        let err = load_records::<CorpusRecord>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn test_write_then_load_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        let corpus = CorpusRecord::new("9", "article", "ref");
        let results = vec![ResultRecord::from_corpus(&corpus, "sum".to_string())];
        write_jsonl(&path, &results).unwrap();
        let back: Vec<ResultRecord> = load_records(&path).unwrap();
        assert_eq!(back, results);
    }
}
