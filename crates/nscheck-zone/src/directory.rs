//! Directory loading.
//!
//! Every regular file below a zone directory is treated as a zone file.
//! Symbolic links are followed, both to files and to directories.
//! Files are visited in file-name order so repeated loads produce identical
//! stores.

use std::path::Path;

use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::parser::ZoneFileParser;
use crate::store::RecordStore;
use crate::{Result, ZoneError};

/// Parses every file below `dir` (recursively) into one store.
///
/// Files are parsed with no preset origin. The first unreadable entry or
/// malformed file aborts the load.
pub fn parse_directory(dir: impl AsRef<Path>) -> Result<RecordStore> {
    parse_directory_with(&ZoneFileParser::new(), dir.as_ref())
}

/// Like [`parse_directory`], using a configured parser.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn parse_directory_with(parser: &ZoneFileParser, dir: &Path) -> Result<RecordStore> {
    let mut store = RecordStore::new();

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|source| ZoneError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let added = parser.parse_file(entry.path(), &mut store)?;
        debug!(file = %entry.path().display(), records = added, "loaded zone file");
    }

    Ok(store)
}

/// Parses each directory and merges the results in the order given.
pub fn load_directories<P: AsRef<Path>>(dirs: &[P]) -> Result<RecordStore> {
    load_directories_with(&ZoneFileParser::new(), dirs)
}

/// Like [`load_directories`], using a configured parser.
pub fn load_directories_with<P: AsRef<Path>>(
    parser: &ZoneFileParser,
    dirs: &[P],
) -> Result<RecordStore> {
    let mut store = RecordStore::new();
    for dir in dirs {
        store.merge(parse_directory_with(parser, dir.as_ref())?);
    }
    info!(
        directories = dirs.len(),
        records = store.len(),
        "zone directories loaded"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nscheck_proto::RecordType;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, file: &str, content: &str) {
        let path = dir.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_directory_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "b.zone",
            "$ORIGIN zone.tld.\nb A 10.0.0.2\n",
        );
        write(
            dir.path(),
            "a.zone",
            "$ORIGIN zone.tld.\na A 10.0.0.1\n",
        );
        write(
            dir.path(),
            "nested/reverse.zone",
            "$ORIGIN 0.0.10.in-addr.arpa.\n1 PTR a.zone.tld.\n",
        );

        let store = parse_directory(dir.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.count_of_type(RecordType::PTR), 1);

        let a_owners: Vec<String> = store
            .iter_type(RecordType::A)
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(a_owners, vec!["a.zone.tld.", "b.zone.tld."]);
    }

    #[test]
    fn test_origin_does_not_leak_between_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.zone", "$ORIGIN zone.tld.\na A 10.0.0.1\n");
        write(dir.path(), "b.zone", "b A 10.0.0.2\n");

        let err = parse_directory(dir.path()).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_zone_files_are_loaded() {
        use std::os::unix::fs::symlink;

        let shared = TempDir::new().unwrap();
        write(
            shared.path(),
            "fwd.zone",
            "$ORIGIN zone.tld.\nhost A 10.0.0.1\n",
        );
        write(
            shared.path(),
            "reverse/10.0.0.zone",
            "$ORIGIN 0.0.10.in-addr.arpa.\n1 PTR host.zone.tld.\n",
        );

        let dir = TempDir::new().unwrap();
        symlink(shared.path().join("fwd.zone"), dir.path().join("fwd.zone")).unwrap();
        symlink(shared.path().join("reverse"), dir.path().join("reverse")).unwrap();

        let store = parse_directory(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.count_of_type(RecordType::A), 1);
        assert_eq!(store.count_of_type(RecordType::PTR), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.zone"), dir.path().join("link.zone"))
            .unwrap();
        assert!(matches!(
            parse_directory(dir.path()),
            Err(ZoneError::Walk { .. })
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let store = parse_directory(dir.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = parse_directory(dir.path().join("non_existent")).unwrap_err();
        assert!(matches!(err, ZoneError::Walk { .. }));
    }

    #[test]
    fn test_broken_zone() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.zone", "this is not a zone file\n");
        let err = parse_directory(dir.path()).unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("broken.zone"));
    }

    #[test]
    fn test_load_directories_merges_in_order() {
        let forward = TempDir::new().unwrap();
        let reverse = TempDir::new().unwrap();
        write(forward.path(), "fwd.zone", "host.zone.tld. A 10.0.0.1\n");
        write(
            reverse.path(),
            "rev.zone",
            "1.0.0.10.in-addr.arpa. PTR host.zone.tld.\nhost2.zone.tld. A 10.0.0.2\n",
        );

        let store = load_directories(&[forward.path(), reverse.path()]).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.list()[0].name().as_str(), "host.zone.tld.");
        assert_eq!(store.list()[1].record_type(), Some(RecordType::PTR));

        let err = load_directories(&[forward.path().to_path_buf(), forward.path().join("nope")])
            .unwrap_err();
        assert!(matches!(err, ZoneError::Walk { .. }));
    }
}
