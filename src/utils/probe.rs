use crate::utils::models::RateResult;

use log::{ debug, warn };
use std::{
    fs,
    io::{ self, Read },
    path::Path,
    process::{ Child, Command, Stdio },
    thread,
    time::{ Duration, Instant },
};
use url::Url;

// 默认下载的文件（追加在服务器地址后面）
pub const DEFAULT_PAYLOAD_PATH: &str = "core/os/x86_64/core.db";

// 单个服务器的测速策略
pub trait Probe: Send + Sync {
    fn probe(&self, url: &str) -> RateResult;
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    // 建立连接的超时
    pub connection_timeout: Duration,
    // 整个下载过程的超时
    pub download_timeout: Duration,
    pub payload_path: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            connection_timeout: Duration::from_secs(5),
            download_timeout: Duration::from_secs(30),
            payload_path: DEFAULT_PAYLOAD_PATH.to_string(),
        }
    }
}

// 没有协议头的地址，默认按 http 处理
pub fn with_scheme(url: &str) -> String {
    if url.contains("://") { url.to_string() } else { format!("http://{}", url) }
}

// 服务器地址 + 下载路径
pub fn payload_url(base: &str, payload_path: &str) -> String {
    let base = with_scheme(base);
    let path = payload_path.trim_start_matches('/');
    if base.ends_with('/') { format!("{}{}", base, path) } else { format!("{}/{}", base, path) }
}

// 普通的请求/响应方式（http、https）
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(config: &ProbeConfig) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client
            ::builder()
            .connect_timeout(config.connection_timeout)
            .timeout(config.download_timeout)
            .build()?;
        Ok(HttpTransport { client })
    }

    fn download(&self, target: &str) -> reqwest::Result<(u64, Duration)> {
        let start_time = Instant::now();
        let mut response = self.client.get(target).send()?.error_for_status()?;
        let size = response.copy_to(&mut io::sink())?;
        Ok((size, start_time.elapsed()))
    }
}

// 通过外部工具（rsync）复制文件，子进程由本线程监督，超时就杀掉
pub struct RsyncTransport {
    pub program: String,
}

impl Default for RsyncTransport {
    fn default() -> Self {
        RsyncTransport { program: "rsync".to_string() }
    }
}

impl RsyncTransport {
    fn download(&self, target: &str, config: &ProbeConfig) -> io::Result<(u64, Duration)> {
        let tmpdir = tempfile::tempdir()?;
        let start_time = Instant::now();
        let child = Command::new(&self.program)
            .args(["-avL", "--no-h", "--no-motd"])
            .arg(format!("--contimeout={}", config.connection_timeout.as_secs().max(1)))
            .arg(format!("--timeout={}", config.download_timeout.as_secs().max(1)))
            .arg(target)
            .arg(tmpdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let succeeded = wait_with_deadline(child, config.download_timeout)?;
        let elapsed = start_time.elapsed();
        if !succeeded {
            return Err(io::Error::new(io::ErrorKind::Other, format!("{} failed", self.program)));
        }
        let file_name = Path::new(&config.payload_path)
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "payload path has no file name"))?;
        let size = fs::metadata(tmpdir.path().join(file_name))?.len();
        Ok((size, elapsed))
    }
}

// 等待子进程结束；超过期限就杀掉并返回失败
fn wait_with_deadline(mut child: Child, limit: Duration) -> io::Result<bool> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.success());
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::new(io::ErrorKind::TimedOut, "transfer timed out"));
        }
        thread::sleep(Duration::from_millis(20));
    }
}

// 按地址的协议选择传输方式；rsync:// 走外部工具，其它走HTTP
pub struct SchemeProbe {
    config: ProbeConfig,
    http: HttpTransport,
    rsync: RsyncTransport,
    ping: bool,
}

impl SchemeProbe {
    pub fn new(config: ProbeConfig) -> reqwest::Result<Self> {
        let http = HttpTransport::new(&config)?;
        Ok(SchemeProbe { config, http, rsync: RsyncTransport::default(), ping: true })
    }

    pub fn without_ping(mut self) -> Self {
        self.ping = false;
        self
    }
}

impl Probe for SchemeProbe {
    fn probe(&self, url: &str) -> RateResult {
        let target = payload_url(url, &self.config.payload_path);
        let parsed = Url::parse(&target).ok();
        let scheme = parsed.as_ref().map(|u| u.scheme().to_string()).unwrap_or_default();

        // 先发一个ping（尽力而为，失败不影响测速）
        let pinger = if self.ping {
            parsed.as_ref().and_then(|u| u.host_str()).and_then(start_ping)
        } else {
            None
        };

        let measured = if scheme == "rsync" {
            self.rsync.download(&target, &self.config).map_err(|e| e.to_string())
        } else {
            self.http.download(&target).map_err(|e| e.to_string())
        };

        if let Some((host, child)) = pinger {
            finish_ping(&host, child);
        }

        match measured {
            Ok((size, elapsed)) => RateResult::measured(url, size, elapsed),
            Err(e) => {
                warn!("{} | rating failed: {}", url, e);
                RateResult::failed(url)
            }
        }
    }
}

fn start_ping(host: &str) -> Option<(String, Child)> {
    let host = host.trim_matches(|c| c == '[' || c == ']');
    match Command::new("ping")
        .args(["-c", "1", "-W", "1", host])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => Some((host.to_string(), child)),
        Err(e) => {
            debug!("{} | failed to start ping: {}", host, e);
            None
        }
    }
}

// 回收ping子进程，还没结束就杀掉
fn finish_ping(host: &str, mut child: Child) {
    match child.try_wait() {
        Ok(Some(status)) => {
            let mut out = String::new();
            if let Some(mut stdout) = child.stdout.take() {
                let _ = stdout.read_to_string(&mut out);
            }
            let summary = out.lines().find(|l| l.contains("packets")).unwrap_or("").trim().to_string();
            debug!("{} | ping {} {}", host, if status.success() { "ok" } else { "failed" }, summary);
        }
        _ => {
            let _ = child.kill();
            let _ = child.wait();
            debug!("{} | no ping response", host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_url_joins_with_single_slash() {
        assert_eq!(payload_url("http://a.example/", "/core/x.db"), "http://a.example/core/x.db");
        assert_eq!(payload_url("http://a.example", "core/x.db"), "http://a.example/core/x.db");
        assert_eq!(payload_url("se-sto.pvdata.host", "core/x.db"), "http://se-sto.pvdata.host/core/x.db");
        assert_eq!(payload_url("rsync://m.example/mirror/", "core/x.db"), "rsync://m.example/mirror/core/x.db");
    }

    #[test]
    fn unreachable_http_server_rates_zero() {
        let config = ProbeConfig {
            connection_timeout: Duration::from_millis(500),
            download_timeout: Duration::from_secs(1),
            payload_path: DEFAULT_PAYLOAD_PATH.to_string(),
        };
        let probe = SchemeProbe::new(config).unwrap().without_ping();
        // 端口1基本不会有服务在监听
        let result = probe.probe("http://127.0.0.1:1/");
        assert_eq!(result.rate, 0.0);
        assert!(result.duration.is_none());
        assert_eq!(result.url, "http://127.0.0.1:1/");
    }

    #[test]
    fn missing_external_tool_rates_zero() {
        let mut probe = SchemeProbe::new(ProbeConfig::default()).unwrap().without_ping();
        probe.rsync = RsyncTransport { program: "rsync-binary-that-does-not-exist".to_string() };
        let result = probe.probe("rsync://127.0.0.1/mirror/");
        assert_eq!(result.rate, 0.0);
        assert!(result.seconds().is_nan());
    }

    // 本地起一个只回应一次的HTTP服务，返回固定长度的内容
    fn serve_once(body_len: usize) -> (String, thread::JoinHandle<String>) {
        use std::io::Write;
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body_len
            );
            stream.write_all(header.as_bytes()).unwrap();
            stream.write_all(&vec![b'x'; body_len]).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{}/", addr), handle)
    }

    #[test]
    fn http_download_measures_bytes_over_time() {
        let body_len = 256 * 1024;
        let (base, server) = serve_once(body_len);
        let config = ProbeConfig {
            connection_timeout: Duration::from_secs(2),
            download_timeout: Duration::from_secs(5),
            payload_path: "core/os/x86_64/core.db".to_string(),
        };
        let rater = SchemeProbe::new(config).unwrap().without_ping();
        let result = rater.probe(&base);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /core/os/x86_64/core.db HTTP/1.1"));
        assert_eq!(result.url, base);
        let elapsed = result.duration.expect("successful download has a duration");
        assert!(result.rate > 0.0);
        let expected = (body_len as f64) / elapsed.as_secs_f64();
        assert!((result.rate - expected).abs() / expected < 1e-9);
    }

    #[cfg(unix)]
    #[test]
    fn rsync_download_measures_copied_file() {
        use std::os::unix::fs::PermissionsExt;

        // 假的 rsync：最后一个参数是目标目录，往里面写一个 4096 字节的 core.db
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-rsync");
        fs::write(
            &script,
            "#!/bin/sh\nfor last; do :; done\nhead -c 4096 /dev/zero > \"$last/core.db\"\n"
        ).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let mut rater = SchemeProbe::new(ProbeConfig::default()).unwrap().without_ping();
        rater.rsync = RsyncTransport { program: script.to_string_lossy().into_owned() };
        let result = rater.probe("rsync://127.0.0.1/mirror/");

        let elapsed = result.duration.expect("successful transfer has a duration");
        assert!(result.rate > 0.0);
        let expected = 4096.0 / elapsed.as_secs_f64();
        assert!((result.rate - expected).abs() / expected < 1e-9);
        assert!(!result.seconds().is_nan());
    }

    #[test]
    fn hung_child_is_killed_at_deadline() {
        let child = Command::new("sleep").arg("5").spawn().unwrap();
        let start = Instant::now();
        let err = wait_with_deadline(child, Duration::from_millis(200)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(4));
    }
}
