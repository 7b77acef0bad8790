//! Static file reading and content types.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Reads files relative to a base directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Read the whole file at `relative` under the base directory.
    ///
    /// Paths that are absolute or climb with `..` are refused. The read runs
    /// on tokio's blocking pool, so a large file never stalls other
    /// connections.
    pub async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(relative)?;
        if !tokio::fs::metadata(&path).await?.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not a regular file"));
        }
        tokio::fs::read(path).await
    }

    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.as_os_str().is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path escapes the static directory",
            ));
        }
        Ok(self.base_dir.join(relative))
    }
}

/// Content type for a file name, by extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("txt") => "text/plain",
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("xml") => "application/xml",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("old.HTM"), "text/html");
        assert_eq!(content_type_for("a/b/photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("photo.jpg"), "image/jpeg");
        assert_eq!(content_type_for("logo.png"), "image/png");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("app.js"), "application/javascript");
        assert_eq!(content_type_for("site.css"), "text/css");
        assert_eq!(content_type_for("feed.xml"), "application/xml");
        assert_eq!(content_type_for("anim.gif"), "image/gif");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("Makefile"), "application/octet-stream");
    }

    #[tokio::test]
    async fn reads_files_under_base() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/a.txt"), b"hello").unwrap();

        let files = StaticFiles::new(tmp.path());
        assert_eq!(files.read("sub/a.txt").await.unwrap(), b"hello");
        assert_eq!(files.read("./sub/a.txt").await.unwrap(), b"hello");
        assert_eq!(
            files.read("missing.txt").await.unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
        assert_eq!(files.read("sub").await.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn refuses_escaping_paths() {
        let tmp = TempDir::new().unwrap();
        let files = StaticFiles::new(tmp.path().join("inner"));
        for bad in ["../secret", "a/../../b", "/etc/passwd", ""] {
            assert_eq!(
                files.read(bad).await.unwrap_err().kind(),
                io::ErrorKind::PermissionDenied,
                "{bad}"
            );
        }
    }
}
