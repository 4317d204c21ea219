// ============================================================
// Layer 4 — Fold Writer
// ============================================================
// Serializes assembled TrainingRecords into one file per fold,
// in the persona-chat line format the consuming training
// framework's task loader expects:
//
//   1 your persona: jerkass
//   2 your persona: the stoic
//   3 knock knock<TAB>go away|That is not the protocol|maybe
//
// Line numbers restart at 1 for every record; the task loader
// uses the reset to detect record boundaries. The dialogue line
// carries the context, a tab, then the '|'-separated candidate
// list with the true response embedded at its sampled position.
//
// Atomicity:
//   each fold is written to `<name>.tmp` and renamed into place
//   only after every record has been flushed. A run that dies
//   halfway never leaves a half-written fold file looking like
//   a finished one.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::example::TrainingRecord;

/// Render one record into its persona-chat text form,
/// including the trailing newline.
pub fn render_record(record: &TrainingRecord) -> String {
    let mut out = String::new();

    let mut line_no = 1;
    for persona_line in &record.persona {
        out.push_str(&format!("{} your persona: {}\n", line_no, persona_line));
        line_no += 1;
    }

    out.push_str(&format!(
        "{} {}\t{}\n",
        line_no,
        record.context,
        record.candidates.join("|"),
    ));
    out
}

/// Writes fold files into an output directory.
pub struct FoldWriter {
    out_dir: PathBuf,
}

impl FoldWriter {
    /// Create the writer, creating the output directory if needed.
    pub fn new(out_dir: impl Into<PathBuf>) -> Result<Self> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("cannot create output directory '{}'", out_dir.display()))?;
        Ok(Self { out_dir })
    }

    /// Path a given fold will be written to
    pub fn fold_path(&self, fold: usize) -> PathBuf {
        self.out_dir.join(format!("fold_{fold}.txt"))
    }

    /// Write all records of one fold, atomically.
    /// Returns the final path of the fold file.
    pub fn write_fold(&self, fold: usize, records: &[TrainingRecord]) -> Result<PathBuf> {
        let final_path = self.fold_path(fold);
        let tmp_path   = self.out_dir.join(format!("fold_{fold}.txt.tmp"));

        write_records(&tmp_path, records)
            .with_context(|| format!("cannot write fold file '{}'", tmp_path.display()))?;

        fs::rename(&tmp_path, &final_path)
            .with_context(|| format!("cannot finalize fold file '{}'", final_path.display()))?;

        tracing::info!(
            "Wrote fold {}: {} records -> '{}'",
            fold,
            records.len(),
            final_path.display(),
        );
        Ok(final_path)
    }
}

fn write_records(path: &Path, records: &[TrainingRecord]) -> Result<()> {
    let file       = File::create(path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        writer.write_all(render_record(record).as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record() -> TrainingRecord {
        TrainingRecord {
            persona:    vec!["jerkass".into(), "the stoic".into()],
            context:    "knock knock".into(),
            candidates: vec!["go away".into(), "That is not the protocol".into(), "maybe".into()],
            fold:       0,
        }
    }

    #[test]
    fn test_render_format() {
        let rendered = render_record(&sample_record());
        assert_eq!(
            rendered,
            "1 your persona: jerkass\n\
             2 your persona: the stoic\n\
             3 knock knock\tgo away|That is not the protocol|maybe\n"
        );
    }

    #[test]
    fn test_line_numbers_restart_per_record() {
        let rendered = format!(
            "{}{}",
            render_record(&sample_record()),
            render_record(&sample_record())
        );
        // The second record starts again at line 1
        assert_eq!(rendered.matches("1 your persona: jerkass").count(), 2);
    }

    #[test]
    fn test_write_fold_creates_final_file_only() {
        let dir    = TempDir::new().unwrap();
        let writer = FoldWriter::new(dir.path()).unwrap();

        let path = writer.write_fold(3, &[sample_record()]).unwrap();
        assert!(path.ends_with("fold_3.txt"));
        assert!(path.exists());
        // No temp file left behind
        assert!(!dir.path().join("fold_3.txt.tmp").exists());

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("1 your persona: jerkass\n"));
    }
}
