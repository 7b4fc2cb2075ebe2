use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::parser::paragraphs::ParagraphLabel;
use crate::pipeline::DirectiveRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADERS: [&str; 12] = [
    "AD Number",
    "Title",
    "Subject",
    "Published Date",
    "ATA Number",
    "Subject Description",
    "Superseded ADs",
    "(b) Affected ADs",
    "(c) Applicability",
    "(d) Subject",
    "(e) Unsafe Condition",
    "PDF Link",
];

/// Write `records` to a new CSV file in `dir` and return its path.
/// Existing files are never overwritten; the name is numbered instead.
pub fn write_csv(dir: &Path, make: &str, model: &str, records: &[DirectiveRecord]) -> Result<PathBuf> {
    let base = format!("AD_download_{}_{}", make.replace(' ', ""), model.replace(' ', ""));
    let (path, mut file) = create_unique(dir, &base)?;

    file.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(row(record))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "CSV written");
    Ok(path)
}

fn row(record: &DirectiveRecord) -> [String; 12] {
    [
        record.ad_number.clone(),
        record.title.clone(),
        record.subject.clone(),
        record.publication_date.clone(),
        record.fields.ata_code_text().to_string(),
        record.fields.ata_subject_text().to_string(),
        record.fields.superseded_text(),
        record.paragraphs.text(ParagraphLabel::AffectedAds).to_string(),
        record.paragraphs.text(ParagraphLabel::Applicability).to_string(),
        record.paragraphs.text(ParagraphLabel::Subject).to_string(),
        record.paragraphs.text(ParagraphLabel::UnsafeCondition).to_string(),
        format!("=HYPERLINK(\"{}\", \"Open PDF\")", record.pdf_url),
    ]
}

/// `base.csv`, then `base(1).csv`, `base(2).csv`, ... whichever is free first.
fn create_unique(dir: &Path, base: &str) -> Result<(PathBuf, File)> {
    let mut counter = 0;
    loop {
        let name = if counter == 0 {
            format!("{}.csv", base)
        } else {
            format!("{}({}).csv", base, counter)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()))
            }
        }
    }
}
