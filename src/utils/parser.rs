use crate::utils::country::country_code;
use crate::utils::error::{ Error, Result };
use crate::utils::models::{ RegistrySnapshot, ServerRecord };

use regex::Regex;

// 服务器列表页面中表格的列数：国家-城市、地址、TAP端口、TUN端口、Socks5代理、HTTP代理
const COLUMNS: usize = 6;

// 从服务器列表页面（HTML）中解析出服务器记录
pub fn parse_serverlist(html: &str) -> Result<RegistrySnapshot> {
    let table_re = Regex::new(
        r#"(?is)<table[^>]*class\s*=\s*"[^"]*\btable-deluxe\b[^"]*"[^>]*>(.*?)</table>"#
    ).map_err(|e| Error::Parse(e.to_string()))?;
    let thead_re = Regex::new(r"(?is)<thead[^>]*>(.*?)</thead>").map_err(|e| Error::Parse(e.to_string()))?;
    let th_re = Regex::new(r"(?is)<th\b[^>]*>(.*?)</th>").map_err(|e| Error::Parse(e.to_string()))?;
    let tr_re = Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").map_err(|e| Error::Parse(e.to_string()))?;
    let td_re = Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").map_err(|e| Error::Parse(e.to_string()))?;
    let tag_re = Regex::new(r"(?s)<[^>]*>").map_err(|e| Error::Parse(e.to_string()))?;

    let table = table_re
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse("server table not found, the page format may have changed".to_string()))?;

    let mut headers = Vec::new();
    if let Some(thead) = thead_re.captures(table).and_then(|cap| cap.get(1)) {
        for cap in th_re.captures_iter(thead.as_str()) {
            headers.push(cell_text(&tag_re, &cap[1]).replace('\n', ""));
        }
    }

    let mut servers = Vec::new();
    for row in tr_re.captures_iter(table) {
        let cells: Vec<String> = td_re
            .captures_iter(&row[1])
            .map(|cap| cell_text(&tag_re, &cap[1]))
            .collect();
        if cells.len() != COLUMNS {
            continue;
        }
        // "Sweden - Stockholm" 这种格式，城市可以没有
        let parts: Vec<&str> = cells[0].split('-').collect();
        let country = parts[0].trim();
        let city = parts.get(1).map(|s| s.trim()).unwrap_or("");

        let mut record = ServerRecord::new(country, &country_code(country), city, &cells[1]);
        record.port_tap = cells[2].clone();
        record.port_tun = cells[3].clone();
        record.proxy_socks = cells[4].clone();
        record.proxy_http = cells[5].clone();
        servers.push(record);
    }

    Ok(RegistrySnapshot::new(headers, servers))
}

// 去掉单元格里的标签、实体和多余空白
fn cell_text(tag_re: &Regex, raw: &str) -> String {
    let text = tag_re.replace_all(raw, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<table class="table table-deluxe">
  <thead>
    <tr><th>Country</th><th>Server address</th><th>Port OpenVPN-TAP-UDP</th>
        <th>OpenVPN-TUN-UDP/TCP</th><th>Socks5 Proxy</th><th>HTTP Proxy</th></tr>
  </thead>
  <tbody>
    <tr>
      <td><img src="se.png"> Sweden - Stockholm</td>
      <td>se-sto.pvdata.host</td><td>1194</td><td>1195</td><td>1080</td><td>8080</td>
    </tr>
    <tr>
      <td>USA - New York</td>
      <td>us-nyc.pvdata.host</td><td>1194</td><td>1195</td><td>1080</td><td>8080</td>
    </tr>
    <tr><td>Iceland</td><td>is-rey.pvdata.host</td><td>1194</td><td>1195</td><td>-</td><td>-</td></tr>
    <tr><td colspan="6">Trinidad &amp; Tobago coming soon</td></tr>
  </tbody>
</table>
</body></html>"#;

    #[test]
    fn parses_rows_with_six_cells() {
        let snapshot = parse_serverlist(PAGE).unwrap();
        assert_eq!(snapshot.headers.len(), 6);
        assert_eq!(snapshot.headers[0], "Country");
        assert_eq!(snapshot.servers.len(), 3);
        assert_eq!(snapshot.total, 3);

        let first = &snapshot.servers[0];
        assert_eq!(first.country, "Sweden");
        assert_eq!(first.country_code, "SE");
        assert_eq!(first.city, "Stockholm");
        assert_eq!(first.url, "se-sto.pvdata.host");
        assert_eq!(first.port_tap, "1194");
        assert_eq!(first.proxy_http, "8080");

        assert_eq!(snapshot.servers[1].country_code, "US");
        assert_eq!(snapshot.servers[2].city, "");
        assert_eq!(snapshot.servers[2].proxy_socks, "-");
    }

    #[test]
    fn missing_table_is_a_parse_error() {
        let err = parse_serverlist("<html><table class=\"other\"></table></html>").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn cell_text_strips_tags_and_entities() {
        let tag_re = Regex::new(r"(?s)<[^>]*>").unwrap();
        assert_eq!(cell_text(&tag_re, "  <b>A&amp;B</b>&nbsp;\n"), "A&B");
    }
}
