//! directory-tree archiving over the cbf codec
//!
//! maps a filesystem tree onto a dataset (file -> blob, folder -> nested
//! dataset) and back. file contents are never held in memory: compression
//! streams them from disk through the encoder's binary section, extraction
//! writes them out with chunked ranged reads against the archive.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::blob::{Blob, FileSource};
use crate::codec::{decode, encode};
use crate::dataset::{Dataset, Value};
use crate::error::{Error, IoResultExt, Result};

/// pack a directory tree into a cbf archive file
pub fn compress(source: &Path, output: &Path) -> Result<()> {
    let dataset = load_path(source)?;

    let file = File::create(output).with_path(output)?;
    let mut writer = BufWriter::new(file);
    encode(&dataset, &mut writer)?;
    writer.flush().with_path(output)?;

    Ok(())
}

/// build a dataset from a directory (recursive helper)
fn load_path(dir: &Path) -> Result<Dataset> {
    let mut dataset = Dataset::new();

    // sort entries by name so archives are deterministic
    let mut dir_entries: Vec<_> = fs::read_dir(dir)
        .with_path(dir)?
        .collect::<std::io::Result<Vec<_>>>()
        .with_path(dir)?;
    dir_entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    for entry in dir_entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if path.is_dir() {
            dataset.insert(name, load_path(&path)?);
        } else {
            dataset.insert(name, Blob::from(FileSource::new(&path)?));
        }
    }

    Ok(dataset)
}

/// unpack a cbf archive into a directory
///
/// the output directory must not already exist.
pub fn extract(archive: &Path, output: &Path) -> Result<()> {
    let file = File::open(archive).with_path(archive)?;
    let dataset = decode(BufReader::new(file))?;
    extract_path(&dataset, output)
}

/// write a dataset out as a directory (recursive helper)
fn extract_path(dataset: &Dataset, dir: &Path) -> Result<()> {
    fs::create_dir(dir).with_path(dir)?;

    for (name, value) in dataset.iter() {
        let target = dir.join(name);

        match value {
            Value::Blob(blob) => {
                let handle = blob.as_handle().ok_or_else(|| {
                    Error::InvalidFormat("archive blob has no backing stream".to_string())
                })?;

                let mut out = File::create(&target).with_path(&target)?;
                handle.copy_to(&mut out).map_err(|e| match e {
                    Error::Io(source) => Error::File {
                        path: target.clone(),
                        source,
                    },
                    other => other,
                })?;
            }
            Value::Dataset(nested) => {
                extract_path(nested, &target)?;
            }
            other => {
                return Err(Error::InvalidFormat(format!(
                    "archive entry {:?} has type {}, expected blob or dataset",
                    name,
                    other.type_name()
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_directory_tree() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("readme.txt"), b"hello").unwrap();
        fs::write(source.join("empty.bin"), b"").unwrap();
        fs::create_dir(source.join("nested")).unwrap();
        fs::write(source.join("nested").join("data.bin"), vec![7u8; 100_000]).unwrap();
        fs::create_dir(source.join("nested").join("empty_dir")).unwrap();

        let archive = dir.path().join("source.cbf");
        compress(&source, &archive).unwrap();

        let restored = dir.path().join("restored");
        extract(&archive, &restored).unwrap();

        assert_eq!(fs::read(restored.join("readme.txt")).unwrap(), b"hello");
        assert_eq!(fs::read(restored.join("empty.bin")).unwrap(), b"");
        assert_eq!(
            fs::read(restored.join("nested").join("data.bin")).unwrap(),
            vec![7u8; 100_000]
        );
        assert!(restored.join("nested").join("empty_dir").is_dir());
    }

    #[test]
    fn test_compress_missing_source() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("out.cbf");
        let result = compress(&dir.path().join("missing"), &archive);
        assert!(matches!(result, Err(Error::File { .. })));
    }

    #[test]
    fn test_extract_refuses_existing_output() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a"), b"a").unwrap();

        let archive = dir.path().join("a.cbf");
        compress(&source, &archive).unwrap();

        let output = dir.path().join("exists");
        fs::create_dir(&output).unwrap();
        assert!(matches!(
            extract(&archive, &output),
            Err(Error::File { .. })
        ));
    }

    #[test]
    fn test_extract_rejects_non_archive_values() {
        // a valid cbf file whose entries are not all blobs/datasets
        let dir = tempdir().unwrap();
        let mut d = Dataset::new();
        d.insert("oops", 42i64);

        let path = dir.path().join("bad.cbf");
        let mut file = File::create(&path).unwrap();
        encode(&d, &mut file).unwrap();

        let result = extract(&path, &dir.path().join("out"));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_extract_rejects_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.cbf");
        fs::write(&path, b"not a cbf file at all").unwrap();

        let result = extract(&path, &dir.path().join("out"));
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_archive_entry_order_is_sorted() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("b"), b"2").unwrap();
        fs::write(source.join("a"), b"1").unwrap();
        fs::write(source.join("c"), b"3").unwrap();

        let archive = dir.path().join("s.cbf");
        compress(&source, &archive).unwrap();

        let decoded = decode(BufReader::new(File::open(&archive).unwrap())).unwrap();
        let keys: Vec<_> = decoded.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        // payloads land in the same order
        let bytes = fs::read(&archive).unwrap();
        assert_eq!(&bytes[bytes.len() - 3..], b"123");
    }
}
