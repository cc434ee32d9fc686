use std::io::{Cursor, Read, Seek, Write};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use sheetsplice_model::{SourcePart, Workbook, WorkbookError, SCHEMA_VERSION};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::parts::{sheet_part_name, SheetEntry, SheetPart, WorkbookPart, WORKBOOK_PART};
use crate::FormatError;

/// Read a workbook package.
///
/// Each sheet remembers the bytes it was read from so [`serialize`] can write
/// them back unchanged while the sheet is untouched.
pub fn parse(bytes: &[u8]) -> Result<Workbook, FormatError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let manifest_bytes = read_part(&mut archive, WORKBOOK_PART)?;
    let manifest: WorkbookPart =
        serde_json::from_slice(&manifest_bytes).map_err(|source| FormatError::Json {
            part: WORKBOOK_PART.to_string(),
            source,
        })?;
    if manifest.schema_version != SCHEMA_VERSION {
        return Err(FormatError::UnsupportedSchema {
            found: manifest.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let mut workbook = Workbook::new();
    workbook.styles = manifest.styles;

    for entry in manifest.sheets {
        let raw = read_part(&mut archive, &entry.part)?;
        let part: SheetPart = serde_json::from_slice(&raw).map_err(|source| FormatError::Json {
            part: entry.part.clone(),
            source,
        })?;
        let mut sheet = part.into_sheet(&entry.part)?;
        sheet.name = entry.name;

        let canonical = canonical_sheet_bytes(&SheetPart::from_sheet(&sheet), &entry.part)?;
        sheet.source_part = Some(SourcePart {
            bytes: Arc::from(raw),
            canonical_digest: Sha256::digest(&canonical).into(),
        });

        log::debug!("package: read sheet `{}` from `{}`", sheet.name, entry.part);
        workbook.push_sheet(sheet).map_err(|err| match err {
            WorkbookError::DuplicateSheet(name) => FormatError::DuplicateSheet(name),
            other => FormatError::Sheet(other),
        })?;
    }

    Ok(workbook)
}

/// Write a workbook package.
///
/// Output is deterministic: entries are stored uncompressed with a fixed
/// timestamp, in manifest order.
pub fn serialize(workbook: &Workbook) -> Result<Vec<u8>, FormatError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default());

    let mut entries = Vec::with_capacity(workbook.sheets.len());
    let mut bodies = Vec::with_capacity(workbook.sheets.len());
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        let part = sheet_part_name(idx);
        let canonical = canonical_sheet_bytes(&SheetPart::from_sheet(sheet), &part)?;
        let body = match &sheet.source_part {
            Some(source) if Sha256::digest(&canonical)[..] == source.canonical_digest[..] => {
                log::debug!("package: sheet `{}` unchanged, reusing original part", sheet.name);
                source.bytes.to_vec()
            }
            _ => canonical,
        };
        entries.push(SheetEntry {
            name: sheet.name.clone(),
            part: part.clone(),
        });
        bodies.push((part, body));
    }

    let manifest = WorkbookPart {
        schema_version: SCHEMA_VERSION,
        sheets: entries,
        styles: workbook.styles.clone(),
    };
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).map_err(|source| FormatError::Json {
            part: WORKBOOK_PART.to_string(),
            source,
        })?;

    zip.start_file(WORKBOOK_PART, options)?;
    zip.write_all(&manifest_bytes)?;
    for (part, body) in bodies {
        log::debug!("package: writing `{part}` ({} bytes)", body.len());
        zip.start_file(part, options)?;
        zip.write_all(&body)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn canonical_sheet_bytes(part: &SheetPart, name: &str) -> Result<Vec<u8>, FormatError> {
    serde_json::to_vec_pretty(part).map_err(|source| FormatError::Json {
        part: name.to_string(),
        source,
    })
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>, FormatError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(FormatError::MissingPart(name.to_string()))
        }
        Err(err) => return Err(err.into()),
    };
    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}
