//! CSV output

use crate::models::{ListingRecord, FIELDS};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Header row followed by one row per record. The header is written even
/// when there are no records.
pub fn write_records<W: Write>(out: W, records: &[ListingRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(FIELDS)
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .write_record(record.to_row())
            .context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Writes `records` to `path`, replacing any existing file
pub fn write_csv(path: &Path, records: &[ListingRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_records(file, records)?;

    info!("Saved {} rows → {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingType, RecordBuilder};

    fn render(records: &[ListingRecord]) -> String {
        let mut out = Vec::new();
        write_records(&mut out, records).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(
            render(&[]),
            "source,listing_type,title,price,location,bedrooms,bathrooms,size_sqm,property_type,url,scraped_at\n"
        );
    }

    #[test]
    fn quotes_fields_with_commas() {
        let record = RecordBuilder::new("BuyRentKenya")
            .listing_type(ListingType::Sale)
            .title("3 Bedroom Apartment")
            .price("KSh 18,500,000")
            .location("Kilimani, Nairobi")
            .build()
            .unwrap();
        let csv = render(&[record]);
        let row = csv.lines().nth(1).unwrap();

        assert!(row.starts_with(
            r#"BuyRentKenya,Sale,3 Bedroom Apartment,"KSh 18,500,000","Kilimani, Nairobi",,,,,,"#
        ));
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = std::env::temp_dir().join(format!("nairobi-scout-writer-{}", std::process::id()));
        let path = dir.join("nested").join("out.csv");

        write_csv(&path, &[]).unwrap();

        assert!(path.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
