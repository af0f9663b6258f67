use crate::utils::error::{ Error, Result };
use crate::utils::models::RegistrySnapshot;
use crate::utils::parser::parse_serverlist;

use log::{ info, warn };
use std::{
    env,
    fs,
    io::{ self, Write },
    path::{ Path, PathBuf },
    time::{ Duration, SystemTime },
};
use tempfile::NamedTempFile;

pub const SERVERLIST_URL: &str = "https://privatevpn.com/serverlist";
const USER_AGENT: &str = "Mozilla/5.0";
const CACHE_FILE_NAME: &str = "pvpn_servers.json";

// 上游数据源：获取一份新的服务器列表
pub trait Upstream {
    fn fetch(&self) -> Result<RegistrySnapshot>;
}

// 从PrivateVPN的服务器列表页面获取数据
pub struct HttpUpstream {
    pub url: String,
    // 建立连接的超时
    pub connect_timeout: Duration,
    // 整个请求（包括读取页面内容）的超时
    pub timeout: Duration,
}

impl HttpUpstream {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        HttpUpstream { url: SERVERLIST_URL.to_string(), connect_timeout, timeout }
    }
}

impl Upstream for HttpUpstream {
    fn fetch(&self) -> Result<RegistrySnapshot> {
        let client = reqwest::blocking::Client
            ::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(self.connect_timeout)
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Retrieval(e.to_string()))?;
        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| Error::Retrieval(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Retrieval(format!("{} returned {}", self.url, response.status())));
        }
        let html = response.text().map_err(|e| Error::Retrieval(e.to_string()))?;
        parse_serverlist(&html)
    }
}

// 缓存文件的默认路径：优先 $XDG_CACHE_HOME，否则放在临时目录里
pub fn default_cache_file() -> PathBuf {
    if let Some(dir) = env::var_os("XDG_CACHE_HOME").filter(|d| !d.is_empty()) {
        let dir = PathBuf::from(dir);
        if fs::create_dir_all(&dir).is_ok() {
            return dir.join(CACHE_FILE_NAME);
        }
    }
    let user = env::var("USER").or_else(|_| env::var("USERNAME")).unwrap_or_else(|_| "user".to_string());
    env::temp_dir().join(format!(".{}.{}", user, CACHE_FILE_NAME))
}

pub struct StoreConfig {
    pub cache_file: PathBuf,
    // 0 表示不使用缓存文件
    pub cache_timeout: Duration,
    // 内存中的快照超过这个时间才重新加载
    pub refresh_interval: Duration,
}

// 持有当前进程的服务器列表快照
pub struct RecordStore<U: Upstream> {
    upstream: U,
    config: StoreConfig,
    current: Option<(RegistrySnapshot, SystemTime)>,
    last_cache_error: Option<Error>,
}

impl<U: Upstream> RecordStore<U> {
    pub fn new(upstream: U, config: StoreConfig) -> Self {
        RecordStore { upstream, config, current: None, last_cache_error: None }
    }

    pub fn load(&mut self) -> Result<&RegistrySnapshot> {
        let fresh_enough = match &self.current {
            Some((_, loaded_at)) => age_of(*loaded_at) < self.config.refresh_interval,
            None => false,
        };
        if !fresh_enough {
            let loaded = self.retrieve()?;
            self.current = Some(loaded);
        }
        match &self.current {
            Some((snapshot, _)) => Ok(snapshot),
            None => Err(Error::NoResults),
        }
    }

    // 数据的获取时间（缓存文件的修改时间或者网络获取的时间）
    pub fn retrieved_at(&self) -> Option<SystemTime> {
        self.current.as_ref().map(|(_, t)| *t)
    }

    pub fn invalidate(&mut self) {
        self.current = None;
    }

    pub fn last_cache_error(&self) -> Option<&Error> {
        self.last_cache_error.as_ref()
    }

    fn retrieve(&mut self) -> Result<(RegistrySnapshot, SystemTime)> {
        let caching = !self.config.cache_timeout.is_zero();
        if caching {
            if let Some(cached) = self.read_cache()? {
                return Ok(cached);
            }
        }

        let snapshot = self.upstream.fetch()?;
        let fetched_at = SystemTime::now();
        info!("retrieved {} servers from upstream", snapshot.servers.len());

        if caching {
            // 写缓存失败不影响本次获取到的数据
            match write_cache(&self.config.cache_file, &snapshot) {
                Ok(()) => {
                    self.last_cache_error = None;
                }
                Err(e) => {
                    warn!("{}", e);
                    self.last_cache_error = Some(e);
                }
            }
        }
        Ok((snapshot, fetched_at))
    }

    // 缓存不存在或已过期返回 None
    fn read_cache(&self) -> Result<Option<(RegistrySnapshot, SystemTime)>> {
        let path = &self.config.cache_file;
        let mtime = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::CacheIo { path: path.clone(), source });
            }
        };
        if age_of(mtime) >= self.config.cache_timeout {
            info!("cache file {} is stale", path.display());
            return Ok(None);
        }
        let content = fs
            ::read_to_string(path)
            .map_err(|source| Error::CacheIo { path: path.clone(), source })?;
        let snapshot: RegistrySnapshot = serde_json
            ::from_str(&content)
            .map_err(|e| Error::Parse(format!("cache file {}: {}", path.display(), e)))?;
        info!("loaded {} servers from cache {}", snapshot.servers.len(), path.display());
        Ok(Some((snapshot, mtime)))
    }
}

// 先写临时文件再改名，写到一半的内容不会被当作有效缓存
pub fn write_cache(path: &Path, snapshot: &RegistrySnapshot) -> Result<()> {
    let wrap = |source: io::Error| Error::CacheWrite { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let json = serde_json::to_string(snapshot).map_err(|e| wrap(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    let mut file = NamedTempFile::new_in(dir).map_err(wrap)?;
    file.write_all(json.as_bytes()).map_err(wrap)?;
    file.persist(path).map_err(|e| wrap(e.error))?;
    Ok(())
}

// 时钟回拨时当作刚刚修改
fn age_of(t: SystemTime) -> Duration {
    SystemTime::now().duration_since(t).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::models::ServerRecord;
    use std::{ cell::Cell, thread };
    use tempfile::TempDir;

    struct FakeUpstream {
        calls: Cell<usize>,
        fail: bool,
    }

    impl FakeUpstream {
        fn new() -> Self {
            FakeUpstream { calls: Cell::new(0), fail: false }
        }
    }

    impl Upstream for FakeUpstream {
        fn fetch(&self) -> Result<RegistrySnapshot> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(Error::Retrieval("connection refused".to_string()));
            }
            Ok(
                RegistrySnapshot::new(
                    vec!["Country".to_string(), "Server address".to_string()],
                    vec![
                        ServerRecord::new("Sweden", "SE", "Stockholm", "http://se.example/"),
                        ServerRecord::new("Germany", "DE", "Frankfurt", "http://de.example/")
                    ]
                )
            )
        }
    }

    fn config(dir: &TempDir, cache_secs: u64, refresh_secs: u64) -> StoreConfig {
        StoreConfig {
            cache_file: dir.path().join("servers.json"),
            cache_timeout: Duration::from_secs(cache_secs),
            refresh_interval: Duration::from_secs(refresh_secs),
        }
    }

    #[test]
    fn fresh_fetch_is_cached_and_reloaded_equal() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(FakeUpstream::new(), config(&dir, 300, 0));
        let first = store.load().unwrap().clone();
        assert_eq!(store.upstream.calls.get(), 1);
        assert!(dir.path().join("servers.json").exists());

        // 新的store在缓存有效期内读取缓存，不访问上游
        let mut again = RecordStore::new(FakeUpstream::new(), config(&dir, 300, 0));
        let loaded = again.load().unwrap().clone();
        assert_eq!(again.upstream.calls.get(), 0);
        assert_eq!(loaded, first);
    }

    #[test]
    fn stale_cache_triggers_fetch() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(FakeUpstream::new(), config(&dir, 1, 0));
        store.load().unwrap();
        thread::sleep(Duration::from_millis(1100));

        let mut again = RecordStore::new(FakeUpstream::new(), config(&dir, 1, 0));
        again.load().unwrap();
        assert_eq!(again.upstream.calls.get(), 1);
    }

    #[test]
    fn zero_cache_timeout_skips_cache_file() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(FakeUpstream::new(), config(&dir, 0, 0));
        store.load().unwrap();
        assert!(!dir.path().join("servers.json").exists());
    }

    #[test]
    fn corrupt_cache_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("servers.json"), "{\"title\": \"PrivateVPN").unwrap();
        let mut store = RecordStore::new(FakeUpstream::new(), config(&dir, 300, 0));
        let err = store.load().unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(store.upstream.calls.get(), 0);
    }

    #[test]
    fn refresh_interval_serves_memory_copy() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(FakeUpstream::new(), config(&dir, 0, 60));
        store.load().unwrap();
        store.load().unwrap();
        assert_eq!(store.upstream.calls.get(), 1);

        store.invalidate();
        store.load().unwrap();
        assert_eq!(store.upstream.calls.get(), 2);
    }

    #[test]
    fn zero_refresh_interval_reloads_every_time() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::new(FakeUpstream::new(), config(&dir, 0, 0));
        store.load().unwrap();
        store.load().unwrap();
        assert_eq!(store.upstream.calls.get(), 2);
    }

    #[test]
    fn cache_write_failure_keeps_fresh_data() {
        let dir = TempDir::new().unwrap();
        let cfg = StoreConfig {
            cache_file: dir.path().join("missing-dir").join("servers.json"),
            cache_timeout: Duration::from_secs(300),
            refresh_interval: Duration::ZERO,
        };
        let mut store = RecordStore::new(FakeUpstream::new(), cfg);
        assert_eq!(store.load().unwrap().servers.len(), 2);
        assert!(matches!(store.last_cache_error(), Some(Error::CacheWrite { .. })));
    }

    #[test]
    fn stalled_upstream_times_out() {
        use std::{ io::Read, net::TcpListener, time::Instant };

        // 接受连接、读走请求，但一直不回应
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            thread::sleep(Duration::from_secs(3));
        });

        let mut upstream = HttpUpstream::new(Duration::from_secs(1), Duration::from_millis(500));
        upstream.url = format!("http://{}/serverlist", addr);
        let start = Instant::now();
        let err = upstream.fetch().unwrap_err();
        assert!(matches!(err, Error::Retrieval(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
        server.join().unwrap();
    }

    #[test]
    fn retrieval_error_is_surfaced() {
        let dir = TempDir::new().unwrap();
        let upstream = FakeUpstream { calls: Cell::new(0), fail: true };
        let mut store = RecordStore::new(upstream, config(&dir, 300, 0));
        assert!(matches!(store.load().unwrap_err(), Error::Retrieval(_)));
    }
}
