//! Page assembly
//!
//! Takes the ordered download results, converts each fetched page through the
//! configured [`PageConverter`], merges the fragments, and writes the final
//! artifact. Pages merge strictly by ascending index; the result slots are
//! positional, so download completion order can never leak into the artifact.

use crate::convert::PageConverter;
use crate::error::{AssemblyError, Error, Result};
use crate::types::PageResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Merge the fetched pages into a single artifact at `path`
///
/// `results` must be in ascending page order (the pipeline builds it that
/// way); failed slots are skipped. A pre-existing artifact is removed only
/// after the merged bytes exist, so a failed assembly leaves any previous
/// artifact untouched.
///
/// Fails with [`AssemblyError::NoPages`] when not a single page is available,
/// and propagates converter failures with the page index attached.
pub fn assemble(
    converter: &dyn PageConverter,
    results: &[PageResult],
    path: &Path,
) -> Result<PathBuf> {
    let mut fragments = Vec::new();
    for result in results {
        let Some(image) = result.image() else {
            continue;
        };
        let fragment = converter.convert_page(&image.bytes).map_err(|e| match e {
            Error::Assembly(AssemblyError::Conversion(reason)) => Error::Assembly(
                AssemblyError::Conversion(format!("page {}: {reason}", image.index)),
            ),
            other => other,
        })?;
        fragments.push(fragment);
    }

    if fragments.is_empty() {
        return Err(Error::Assembly(AssemblyError::NoPages));
    }

    tracing::debug!(pages = fragments.len(), path = %path.display(), "merging pages");
    let artifact = converter.merge_pages(&fragments)?;

    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::write(path, artifact)?;
    Ok(path.to_path_buf())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::RawConverter;
    use crate::types::{PageFailure, PageImage, PageResult};

    fn fetched(index: usize, bytes: &[u8]) -> PageResult {
        PageResult::Fetched(PageImage {
            index,
            bytes: bytes.to_vec(),
        })
    }

    fn failed(index: usize) -> PageResult {
        PageResult::Failed(PageFailure {
            index,
            reason: "server returned status 500".into(),
        })
    }

    #[test]
    fn artifact_follows_slot_order_not_completion_order() {
        // Slots are filled positionally; simulate pages that finished in
        // reverse order by constructing the images out of order first.
        let images = [fetched(2, b"C"), fetched(0, b"A"), fetched(1, b"B")];
        let mut results: Vec<PageResult> = Vec::new();
        for index in 0..3 {
            let slot = images.iter().find(|r| r.index() == index).unwrap();
            results.push(slot.clone());
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.bin");
        assemble(&RawConverter, &results, &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"ABC");
    }

    #[test]
    fn failed_slots_are_skipped() {
        let results = vec![fetched(0, b"A"), failed(1), fetched(2, b"C")];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.bin");
        assemble(&RawConverter, &results, &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"AC");
    }

    #[test]
    fn zero_available_pages_fails_and_writes_nothing() {
        let results = vec![failed(0), failed(1)];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.bin");

        let err = assemble(&RawConverter, &results, &path).unwrap_err();
        assert!(matches!(err, Error::Assembly(AssemblyError::NoPages)));
        assert!(!path.exists());
    }

    #[test]
    fn failed_assembly_leaves_previous_artifact_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.bin");
        fs::write(&path, b"previous run").unwrap();

        let results = vec![failed(0)];
        assemble(&RawConverter, &results, &path).unwrap_err();

        assert_eq!(fs::read(&path).unwrap(), b"previous run");
    }

    #[test]
    fn existing_artifact_is_overwritten_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.bin");
        fs::write(&path, b"stale, much longer than the new artifact").unwrap();

        assemble(&RawConverter, &[fetched(0, b"fresh")], &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"fresh");
    }
}
