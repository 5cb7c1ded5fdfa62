use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Deserialize;

use crate::clock::Date;
use crate::source::DailyClose;

/*
 * File format, one row per ticker and day:
 * ticker,date,close
 * BPAT.BA,2024-09-05,1730.5
 * BPAT.BA,2024-09-06,           // empty close, session with no trade
 */
#[derive(Debug, Deserialize)]
struct CloseRow {
    ticker: String,
    date: Date,
    close: Option<f64>,
}

fn read_rows<R: Read>(reader: R, rows: &mut Vec<(String, DailyClose)>) -> Result<()> {
    let mut rdr = csv::Reader::from_reader(reader);
    for record in rdr.deserialize() {
        let row: CloseRow = record?;
        rows.push((
            row.ticker,
            DailyClose {
                date: row.date,
                close: row.close,
            },
        ));
    }
    Ok(())
}

/// Reads closes from a csv file or from every csv file inside a zip archive.
pub fn load_closes(path: &Path) -> Result<Vec<(String, DailyClose)>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rows = Vec::new();

    let is_zip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    if is_zip {
        let mut zip = zip::ZipArchive::new(file)?;
        for i in 0..zip.len() {
            let zip_file = zip.by_index(i)?;
            if !zip_file.name().ends_with(".csv") {
                debug!("FILE: skipping archive entry {}", zip_file.name());
                continue;
            }
            let name = zip_file.name().to_string();
            read_rows(zip_file, &mut rows).with_context(|| format!("reading {name}"))?;
        }
    } else {
        read_rows(file, &mut rows).with_context(|| format!("reading {}", path.display()))?;
    }

    info!("FILE: loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
