// ABOUTME: Sandboxed filesystem module for the Lisp interpreter (spec §12).
// Provides safe filesystem access with capability-based security using cap-std.

use crate::config::FsConfig;
use cap_std::fs::Dir;

#[cfg(test)]
use std::path::PathBuf;

/// Error type for sandbox operations
#[derive(Debug, Clone)]
pub enum SandboxError {
    PathNotAllowed(String),
    FileNotFound(String),
    FileTooLarge(String),
    IoError(String),
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::PathNotAllowed(path) => {
                write!(f, "Access denied: {} is not in allowed paths", path)
            }
            SandboxError::FileNotFound(path) => {
                write!(f, "File not found: {}", path)
            }
            SandboxError::FileTooLarge(msg) => {
                write!(f, "File too large: {}", msg)
            }
            SandboxError::IoError(msg) => {
                write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SandboxError {}

/// Sandbox for safe file access, uses capability-based security via cap-std.
pub struct Sandbox {
    /// Filesystem sandbox roots
    fs_roots: Vec<Dir>,
    /// Filesystem configuration
    fs_config: FsConfig,
}

impl Sandbox {
    /// Create a new sandbox from configuration
    pub fn new(fs_config: FsConfig) -> Result<Self, SandboxError> {
        let mut fs_roots = Vec::new();

        // Open all allowed paths as capability directories
        for path in &fs_config.allowed_paths {
            // Create directory if it doesn't exist (for output)
            std::fs::create_dir_all(path).map_err(|e| {
                SandboxError::IoError(format!("Cannot create {}: {}", path.display(), e))
            })?;

            // Open as cap-std Dir (gives us capability-based security)
            let dir = Dir::open_ambient_dir(path, cap_std::ambient_authority()).map_err(|e| {
                SandboxError::IoError(format!("Cannot open {}: {}", path.display(), e))
            })?;

            fs_roots.push(dir);
        }

        Ok(Self { fs_roots, fs_config })
    }

    /// Find which root directory should be used for a path.
    /// For reading: tries all roots. For writing: uses first root.
    fn find_root_for_path(
        &self,
        user_path: &str,
        write_mode: bool,
    ) -> Result<(&Dir, usize), SandboxError> {
        // cap-std::Dir will automatically reject .. and absolute paths,
        // this is secure by construction.
        if write_mode {
            if !self.fs_roots.is_empty() {
                return Ok((&self.fs_roots[0], 0));
            }
        } else {
            for (idx, root) in self.fs_roots.iter().enumerate() {
                if root.metadata(user_path).is_ok() {
                    return Ok((root, idx));
                }
            }
            if !self.fs_roots.is_empty() {
                return Ok((&self.fs_roots[0], 0));
            }
        }

        Err(SandboxError::PathNotAllowed(user_path.to_string()))
    }

    fn reject_traversal(path: &str) -> Result<(), SandboxError> {
        if path.starts_with('/') || path.starts_with('\\') || path.contains("..") {
            return Err(SandboxError::PathNotAllowed(path.to_string()));
        }
        Ok(())
    }

    /// Read file contents (safe filesystem access via cap-std)
    pub fn read_file(&self, path: &str) -> Result<String, SandboxError> {
        Self::reject_traversal(path)?;
        let (root, _) = self.find_root_for_path(path, false)?;

        root.read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::FileNotFound(path.to_string())
            } else {
                SandboxError::IoError(format!("Cannot read {}: {}", path, e))
            }
        })
    }

    /// Write file contents (safe filesystem access via cap-std)
    pub fn write_file(&self, path: &str, contents: &str) -> Result<(), SandboxError> {
        Self::reject_traversal(path)?;

        if contents.len() > self.fs_config.max_file_size {
            return Err(SandboxError::FileTooLarge(format!(
                "{} bytes exceeds limit of {} bytes",
                contents.len(),
                self.fs_config.max_file_size
            )));
        }

        let (root, _) = self.find_root_for_path(path, true)?;
        root.write(path, contents)
            .map_err(|e| SandboxError::IoError(format!("Cannot write {}: {}", path, e)))
    }

    /// Check if file exists
    pub fn file_exists(&self, path: &str) -> Result<bool, SandboxError> {
        Self::reject_traversal(path)?;
        let (root, _) = self.find_root_for_path(path, false)?;

        match root.metadata(path) {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SandboxError::IoError(format!("Cannot check {}: {}", path, e))),
        }
    }

    /// Get file size
    pub fn file_size(&self, path: &str) -> Result<u64, SandboxError> {
        Self::reject_traversal(path)?;
        let (root, _) = self.find_root_for_path(path, false)?;

        root.metadata(path).map(|metadata| metadata.len()).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SandboxError::FileNotFound(path.to_string())
            } else {
                SandboxError::IoError(format!("Cannot stat {}: {}", path, e))
            }
        })
    }

    /// List files in a directory
    pub fn list_files(&self, dir: &str) -> Result<Vec<String>, SandboxError> {
        Self::reject_traversal(dir)?;
        let (root, _) = self.find_root_for_path(dir, false)?;

        root.read_dir(dir)
            .map_err(|e| SandboxError::IoError(format!("Cannot list {}: {}", dir, e)))
            .and_then(|entries| {
                entries
                    .map(|entry| {
                        entry
                            .map_err(|e| SandboxError::IoError(e.to_string()))
                            .and_then(|e| {
                                e.file_name().to_str().map(|s| s.to_string()).ok_or_else(|| {
                                    SandboxError::IoError("Invalid UTF-8 in filename".to_string())
                                })
                            })
                    })
                    .collect()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn create_test_sandbox() -> (Sandbox, PathBuf) {
        let test_dir = PathBuf::from("./test_sandbox_temp");
        let _ = fs::remove_dir_all(&test_dir);
        fs::create_dir_all(&test_dir).unwrap();

        let fs_config = FsConfig {
            allowed_paths: vec![test_dir.clone()],
            ..Default::default()
        };

        let sandbox = Sandbox::new(fs_config).unwrap();
        (sandbox, test_dir.clone())
    }

    fn cleanup_test_sandbox(test_dir: &PathBuf) {
        let _ = fs::remove_dir_all(test_dir);
    }

    #[test]
    #[serial]
    fn test_read_file_success() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("test.txt"), "hello world").unwrap();

        let contents = sandbox.read_file("test.txt").unwrap();
        assert_eq!(contents, "hello world");

        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_write_file_success() {
        let (sandbox, test_dir) = create_test_sandbox();

        sandbox.write_file("output.txt", "test data").unwrap();
        let contents = sandbox.read_file("output.txt").unwrap();
        assert_eq!(contents, "test data");

        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_file_exists() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("exists.txt"), "data").unwrap();

        assert!(sandbox.file_exists("exists.txt").unwrap());
        assert!(!sandbox.file_exists("nonexistent.txt").unwrap());

        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_path_traversal_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();

        let result = sandbox.read_file("../../../etc/passwd");
        assert!(matches!(result, Err(SandboxError::PathNotAllowed(_))));

        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_absolute_path_rejected() {
        let (sandbox, test_dir) = create_test_sandbox();

        let result = sandbox.read_file("/etc/passwd");
        assert!(matches!(result, Err(SandboxError::PathNotAllowed(_))));

        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_file_size() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("sized.txt"), "1234567890").unwrap();

        let size = sandbox.file_size("sized.txt").unwrap();
        assert_eq!(size, 10);

        cleanup_test_sandbox(&test_dir);
    }

    #[test]
    #[serial]
    fn test_list_files() {
        let (sandbox, test_dir) = create_test_sandbox();
        fs::write(test_dir.join("file1.txt"), "data1").unwrap();
        fs::write(test_dir.join("file2.txt"), "data2").unwrap();

        let files = sandbox.list_files(".").unwrap();
        assert!(files.contains(&"file1.txt".to_string()));
        assert!(files.contains(&"file2.txt".to_string()));

        cleanup_test_sandbox(&test_dir);
    }
}
