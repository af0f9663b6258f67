use crate::utils::common::{ display_system_time, display_time };
use crate::utils::models::{ RegistrySnapshot, ServerRecord };
use crate::utils::store::SERVERLIST_URL;

use chrono::Utc;
use serde_json::Value;
use std::{ collections::BTreeMap, time::SystemTime };

const WIDTH: usize = 80;
const LABEL_WIDTH: usize = 11;

// 生成命令行的显示文本（参数需要时加引号）
pub fn command_line(program: &str, args: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| shell_quote(a)));
    parts.join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty() &&
        arg.chars().all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

// 生成服务器列表文本；没有服务器时返回 None
pub fn serverlist(
    snapshot: &RegistrySnapshot,
    retrieved_at: SystemTime,
    records: &[ServerRecord],
    include_country: bool,
    cmd: Option<&str>
) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    let title = format!("{:#^width$}", "# PrivateVPN server list #", width = WIDTH);
    let border = "#".repeat(title.len());
    let rows = [
        ("With:", cmd.unwrap_or("?").to_string()),
        ("When:", display_time(Utc::now())),
        ("From:", SERVERLIST_URL.to_string()),
        ("Retrieved:", display_system_time(retrieved_at)),
        ("Last Check:", display_time(snapshot.last_check)),
    ];

    let mut out = format!("{}\n{}\n{}\n\n", border, title, border);
    for (label, value) in rows {
        out.push_str(&format!("# {:<width$} {}\n", label, value, width = LABEL_WIDTH));
    }
    out.push('\n');

    let mut country: Option<String> = None;
    for record in records {
        // 按国家排序时加上国家分组的注释
        if include_country {
            let group = format!("{} [{}]", record.country, record.country_code);
            if country.as_ref() != Some(&group) {
                if country.is_some() {
                    out.push('\n');
                }
                out.push_str(&format!("# {}\n", group));
                country = Some(group);
            }
        }
        out.push_str(&format!("Server = {}\n", record.url));
    }
    Some(out)
}

// 各国家的服务器数量（按国家名称排序）
pub fn country_counts(records: &[ServerRecord]) -> BTreeMap<(String, String), usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry((record.country.clone(), record.country_code.clone())).or_insert(0) += 1;
    }
    counts
}

pub fn country_table(records: &[ServerRecord]) -> String {
    let counts = country_counts(records);
    let name_width = counts
        .keys()
        .map(|(c, _)| c.chars().count())
        .max()
        .unwrap_or(0);
    let count_width = counts
        .values()
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1);
    let mut out = String::new();
    for ((country, code), n) in &counts {
        out.push_str(&format!("{:<nw$} {} {:>cw$}\n", country, code, n, nw = name_width, cw = count_width));
    }
    out
}

// 逐条显示服务器的全部字段
pub fn server_info(records: &[ServerRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let fields = match serde_json::to_value(record) {
            Ok(Value::Object(map)) => map,
            _ => continue,
        };
        let mut keys: Vec<&String> = fields
            .keys()
            .filter(|k| k.as_str() != "url")
            .collect();
        keys.sort();
        let key_width = keys
            .iter()
            .map(|k| k.len())
            .max()
            .unwrap_or(0);

        out.push_str(&format!("{}\n", record.url));
        for key in keys {
            let value = match (key.as_str(), &fields[key]) {
                ("last_sync", _) => record.last_sync.map(display_time).unwrap_or_default(),
                (_, Value::String(s)) => s.clone(),
                (_, other) => other.to_string(),
            };
            out.push_str(&format!("{:<width$} : {}\n", key, value, width = key_width));
        }
        out.push('\n');
    }
    out
}
