use std::{ io, path::PathBuf };
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // 网络不可达或返回非成功状态码
    #[error("failed to retrieve server data ({0})")]
    Retrieval(String),

    // 页面或缓存内容格式不对
    #[error("failed to parse server data ({0})")]
    Parse(String),

    // 本地文件系统错误（不是内容解析错误）
    #[error("failed to access cache file {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to cache server data to {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // 负数、NaN 或无穷大
    #[error("invalid age {0}: expected a non-negative number of hours")]
    InvalidAge(f64),

    #[error("failed to save server list to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no servers found")]
    NoResults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_single_line() {
        let err = Error::CacheIo {
            path: PathBuf::from("/tmp/x.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/x.json"));
        assert!(!msg.contains('\n'));
        assert_eq!(Error::NoResults.to_string(), "no servers found");
    }
}
