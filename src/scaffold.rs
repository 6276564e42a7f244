//! Copying the source scaffold into the scratch project
//!
//! A plain structural copy: every directory and file under the template is recreated at
//! the same relative path in the destination, byte for byte, overwriting files that are
//! already there. Nothing is filtered or templated.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;
use crate::error::scaffold::copy_failed;

/// Copy `template` into the existing directory `destination`; returns the files copied
pub fn generate_files(template: &Path, destination: &Path) -> Result<usize> {
    if !template.is_dir() {
        return Err(copy_failed(
            template.display().to_string(),
            "scaffold template directory does not exist",
        ));
    }
    if !destination.is_dir() {
        return Err(copy_failed(
            destination.display().to_string(),
            "destination directory does not exist",
        ));
    }

    let mut copied = 0;

    for entry in WalkDir::new(template).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map_or_else(|| template.display().to_string(), |p| p.display().to_string());
            copy_failed(path, e.to_string())
        })?;

        let relative = entry
            .path()
            .strip_prefix(template)
            .map_err(|e| copy_failed(entry.path().display().to_string(), e.to_string()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| copy_failed(target.display().to_string(), e.to_string()))?;
        } else {
            fs::copy(entry.path(), &target)
                .map_err(|e| copy_failed(target.display().to_string(), e.to_string()))?;
            copied += 1;
        }
    }

    tracing::debug!(
        template = %template.display(),
        destination = %destination.display(),
        copied,
        "copied scaffold"
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarnessError;
    use crate::test_fixtures::create_scaffold;
    use tempfile::TempDir;

    #[test]
    fn test_copies_tree_preserving_relative_paths() {
        let template = create_scaffold();
        let destination = TempDir::new().unwrap();

        let copied = generate_files(template.path(), destination.path()).unwrap();

        assert_eq!(copied, 2);
        assert!(destination.path().join("tsconfig.json").is_file());
        assert_eq!(
            fs::read(destination.path().join("src/index.tsx")).unwrap(),
            fs::read(template.path().join("src/index.tsx")).unwrap()
        );
    }

    #[test]
    fn test_copies_binary_content_byte_for_byte() {
        let template = TempDir::new().unwrap();
        let bytes: Vec<u8> = (0..=255).collect();
        fs::create_dir_all(template.path().join("assets")).unwrap();
        fs::write(template.path().join("assets/blob.bin"), &bytes).unwrap();
        let destination = TempDir::new().unwrap();

        generate_files(template.path(), destination.path()).unwrap();

        assert_eq!(
            fs::read(destination.path().join("assets/blob.bin")).unwrap(),
            bytes
        );
    }

    #[test]
    fn test_overwrites_existing_files_and_keeps_others() {
        let template = create_scaffold();
        let destination = TempDir::new().unwrap();
        fs::write(destination.path().join("tsconfig.json"), "stale").unwrap();
        fs::write(destination.path().join("package.json"), "{}").unwrap();

        generate_files(template.path(), destination.path()).unwrap();

        let tsconfig = fs::read_to_string(destination.path().join("tsconfig.json")).unwrap();
        assert!(tsconfig.contains("compilerOptions"));
        assert_eq!(
            fs::read_to_string(destination.path().join("package.json")).unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_copies_empty_directories() {
        let template = TempDir::new().unwrap();
        fs::create_dir_all(template.path().join("typings/empty")).unwrap();
        let destination = TempDir::new().unwrap();

        let copied = generate_files(template.path(), destination.path()).unwrap();

        assert_eq!(copied, 0);
        assert!(destination.path().join("typings/empty").is_dir());
    }

    #[test]
    fn test_missing_template_fails() {
        let destination = TempDir::new().unwrap();
        let result = generate_files(&destination.path().join("nope"), destination.path());
        assert!(matches!(
            result,
            Err(HarnessError::ScaffoldCopyFailed { .. })
        ));
    }

    #[test]
    fn test_missing_destination_fails() {
        let template = create_scaffold();
        let result = generate_files(template.path(), &template.path().join("not-created"));
        assert!(matches!(
            result,
            Err(HarnessError::ScaffoldCopyFailed { .. })
        ));
    }
}
