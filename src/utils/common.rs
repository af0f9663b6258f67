use chrono::{ DateTime, Utc };
use std::time::{ Duration, SystemTime };

pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// 显示用的时间格式
pub fn display_time(t: DateTime<Utc>) -> String {
    t.format(DISPLAY_TIME_FORMAT).to_string()
}

pub fn display_system_time(t: SystemTime) -> String {
    display_time(DateTime::<Utc>::from(t))
}

// 计算程序运行的总时长
pub fn format_duration(duration: Duration) -> (f64, &'static str) {
    if duration.as_secs() > 0 {
        (duration.as_secs_f64(), "s")
    } else if duration.as_millis() > 0 {
        (duration.as_millis() as f64, "ms")
    } else if duration.as_micros() > 0 {
        (duration.as_micros() as f64, "µs")
    } else {
        (duration.as_nanos() as f64, "ns")
    }
}
