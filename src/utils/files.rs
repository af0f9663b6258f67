use crate::utils::error::{ Error, Result };

use std::{ fs::File, io::Write, path::Path };

// 将服务器列表写入文件（覆盖已有文件）
pub fn write_serverlist<P>(path: P, serverlist: &str) -> Result<()> where P: AsRef<Path> {
    let path = path.as_ref();
    let wrap = |source| Error::Save { path: path.to_path_buf(), source };
    let mut file = File::create(path).map_err(wrap)?;
    file.write_all(serverlist.as_bytes()).map_err(wrap)?;
    file.flush().map_err(wrap)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("serverlist");
        write_serverlist(&path, "Server = a\nServer = b\n").unwrap();
        write_serverlist(&path, "Server = c\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Server = c\n");
    }

    #[test]
    fn unwritable_path_is_a_save_error() {
        let dir = TempDir::new().unwrap();
        let err = write_serverlist(dir.path().join("no").join("such").join("file"), "x").unwrap_err();
        assert!(matches!(err, Error::Save { .. }));
    }
}
