//! Record extraction
//!
//! Copies each record of a matched package out of the byte source. Bundled
//! records are sliced out of the package's shared bundle stream, which is
//! opened once per package; standalone records are opened by their own
//! content key. Failures are scoped: a missing standalone blob skips that
//! record, a missing bundle skips that package.

use std::io::{Read, Seek};

use crate::key::{AssetKey, ContentKey};
use crate::package::{PackageDescriptor, PackageRecord};
use crate::query::{resolve, Query};
use crate::source::{read_range, ByteSource};
use crate::{Error, Result};

/// Bytes copied for one record
#[derive(Debug, Clone)]
pub struct ExtractedRecord {
    /// Index content key of the package the record came from
    pub package: ContentKey,
    pub record: PackageRecord,
    pub data: Vec<u8>,
}

impl ExtractedRecord {
    pub fn key(&self) -> AssetKey {
        self.record.key
    }

    /// `{package}/{type}/{index}.{type}`, relative to the caller's output root
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.package, self.record.key.file_name())
    }
}

/// A record that could not be copied
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub record: PackageRecord,
    pub reason: String,
}

/// Result of extracting one package
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub files: Vec<ExtractedRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// A package whose bundle could not be opened
#[derive(Debug, Clone)]
pub struct FailedPackage {
    pub index_content_key: ContentKey,
    pub reason: String,
}

/// Result of a whole query run
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub packages: Vec<(ContentKey, Extraction)>,
    pub failed: Vec<FailedPackage>,
    /// Query keys no package matched, in argument form
    pub unresolved: Vec<String>,
}

impl ExtractionReport {
    pub fn file_count(&self) -> usize {
        self.packages.iter().map(|(_, e)| e.files.len()).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.packages.iter().map(|(_, e)| e.skipped.len()).sum()
    }
}

/// Extract every record of one package
///
/// Fails only when the package's bundle cannot be resolved or opened.
pub fn extract<S: ByteSource>(descriptor: &PackageDescriptor, source: &S) -> Result<Extraction> {
    let bundle_key = descriptor.index.bundle_content_key;
    let entry = source.lookup(&bundle_key).ok_or_else(|| {
        Error::BackingResourceUnavailable {
            key: bundle_key,
            reason: "bundle not present in encoding table".to_string(),
        }
    })?;
    let mut bundle = source.open(&entry)?;

    let mut extraction = Extraction::default();

    for record in &descriptor.records {
        let copied = if record.is_bundled() {
            copy_bundled(&mut bundle, record)
        } else {
            copy_standalone(source, record)
        };

        match copied {
            Ok(data) => {
                tracing::debug!(
                    key = %record.key,
                    size = record.size,
                    bundled = record.is_bundled(),
                    "Extracted record"
                );
                extraction.files.push(ExtractedRecord {
                    package: descriptor.index_content_key,
                    record: record.clone(),
                    data,
                });
            }
            Err(e) => {
                tracing::warn!(key = %record.key, "Skipping record: {}", e);
                extraction.skipped.push(SkippedRecord {
                    record: record.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(extraction)
}

fn copy_bundled<R: Read + Seek>(bundle: &mut R, record: &PackageRecord) -> Result<Vec<u8>> {
    read_range(bundle, u64::from(record.offset), record.size as usize)
}

fn copy_standalone<S: ByteSource>(source: &S, record: &PackageRecord) -> Result<Vec<u8>> {
    let entry = source
        .lookup(&record.content_key)
        .ok_or(Error::NotFound(record.content_key))?;
    let mut stream = source.open(&entry)?;

    if u64::from(record.size) > entry.size {
        return Err(Error::Malformed {
            context: "standalone record",
            reason: format!(
                "record size {} exceeds blob size {}",
                record.size, entry.size
            ),
        });
    }

    read_range(&mut stream, 0, record.size as usize)
}

/// Resolve `query` against `descriptors` and extract every match
///
/// Package-level failures are collected in the report rather than returned;
/// only an empty descriptor set fails the call.
pub fn extract_all<S: ByteSource>(
    query: &mut Query,
    descriptors: &[PackageDescriptor],
    source: &S,
) -> Result<ExtractionReport> {
    if descriptors.is_empty() {
        return Err(Error::NoPackages);
    }

    let mut report = ExtractionReport::default();

    for resolved in resolve(query, descriptors) {
        let descriptor = resolved.descriptor;
        match extract(descriptor, source) {
            Ok(extraction) => report
                .packages
                .push((descriptor.index_content_key, extraction)),
            Err(e) => {
                tracing::warn!(
                    package = %descriptor.index_content_key,
                    "Cannot open bundle: {}",
                    e
                );
                report.failed.push(FailedPackage {
                    index_content_key: descriptor.index_content_key,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.unresolved = query.unresolved();
    Ok(report)
}
