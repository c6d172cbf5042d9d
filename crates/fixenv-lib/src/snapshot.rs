//! Downloadable snapshot of a session.
//!
//! A zip holding the original requirements text and the AI explanation, both stored uncompressed.
//! Entry timestamps are pinned to the zip epoch so the same inputs always give the same bytes.

use std::io::{Read, Write};

pub const REQUIREMENTS_ENTRY: &str = "requirements.txt";
pub const EXPLANATION_ENTRY: &str = "ai_explanation.txt";
pub const DEFAULT_FILE_NAME: &str = "FixEnvMini_Snapshot.zip";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
	/// A required entry isn't present in the archive.
	#[error("archive is missing entry {0}.")]
	MissingEntry(&'static str),
	#[error("entry {0} is not valid UTF-8.")]
	NotUtf8(&'static str),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("zip error: {0}")]
	Zip(#[from] zip::result::ZipError),
}

/// Contents read back out of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotContents {
	pub requirements: String,
	pub explanation: String,
}

/// Builds the snapshot archive in memory.
pub fn package(original_text: &str, explanation: &str) -> Result<Vec<u8>, SnapshotError> {
	let options = zip::write::FileOptions::default()
		.compression_method(zip::CompressionMethod::Stored)
		.last_modified_time(zip::DateTime::default());

	let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::<u8>::new()));
	for (name, content) in [(REQUIREMENTS_ENTRY, original_text), (EXPLANATION_ENTRY, explanation)] {
		writer.start_file(name, options)?;
		writer.write_all(content.as_bytes())?;
	}
	let bytes = writer.finish()?.into_inner();

	log::info!("Packaged snapshot ({} bytes)", bytes.len());
	Ok(bytes)
}

/// Reads both entries out of an archive made by [`package`].
pub fn unpack(archive: &[u8]) -> Result<SnapshotContents, SnapshotError> {
	let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive))?;

	fn read_entry<R: std::io::Read + std::io::Seek>(zip: &mut zip::ZipArchive<R>, name: &'static str) -> Result<String, SnapshotError> {
		let mut file = match zip.by_name(name) {
			Ok(f) => f,
			Err(zip::result::ZipError::FileNotFound) => return Err(SnapshotError::MissingEntry(name)),
			Err(e) => return Err(e.into()),
		};
		let mut bytes = Vec::<u8>::new();
		file.read_to_end(&mut bytes)?;
		String::from_utf8(bytes).map_err(|_| SnapshotError::NotUtf8(name))
	}

	Ok(SnapshotContents {
		requirements: read_entry(&mut zip, REQUIREMENTS_ENTRY)?,
		explanation: read_entry(&mut zip, EXPLANATION_ENTRY)?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn archive_round_trips_verbatim() {
		let text = "numpy==1.20\nnumpy==1.25\n\n# trailing whitespace kept   \n";
		let explanation = "Pin numpy to a single version.\nÜnïcode is fine too.";
		let contents = unpack(&package(text, explanation).unwrap()).unwrap();
		assert_eq!(contents.requirements, text);
		assert_eq!(contents.explanation, explanation);
	}

	#[test]
	fn entries_are_in_order() {
		let bytes = package("a==1", "b").unwrap();
		let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
		assert_eq!(zip.len(), 2);
		assert_eq!(zip.by_index(0).unwrap().name(), REQUIREMENTS_ENTRY);
		assert_eq!(zip.by_index(1).unwrap().name(), EXPLANATION_ENTRY);
	}

	#[test]
	fn same_inputs_same_bytes() {
		assert_eq!(package("a==1", "x").unwrap(), package("a==1", "x").unwrap());
	}

	#[test]
	fn empty_texts_are_allowed() {
		let contents = unpack(&package("", "").unwrap()).unwrap();
		assert_eq!(contents, SnapshotContents { requirements: String::new(), explanation: String::new() });
	}

	#[test]
	fn missing_entry_is_reported() {
		let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::<u8>::new()));
		writer.start_file(REQUIREMENTS_ENTRY, zip::write::FileOptions::default()).unwrap();
		let bytes = writer.finish().unwrap().into_inner();
		assert!(matches!(unpack(&bytes), Err(SnapshotError::MissingEntry(EXPLANATION_ENTRY))));
	}
}
