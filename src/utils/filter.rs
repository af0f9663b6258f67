use crate::utils::error::{ Error, Result };
use crate::utils::models::ServerRecord;

use chrono::{ DateTime, Utc };
use regex::Regex;

// 过滤条件，所有给出的条件都要满足（AND）
#[derive(Debug, Clone)]
pub struct Criteria {
    countries: Option<Vec<String>>,
    protocols: Option<Vec<String>>,
    include: Option<Vec<Regex>>,
    exclude: Option<Vec<Regex>>,
    age_hours: Option<f64>,
    now: DateTime<Utc>,
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|source| Error::InvalidPattern { pattern: p.clone(), source }))
        .collect()
}

// 空列表等同于没给这个条件
fn non_empty(values: &[String]) -> Option<&[String]> {
    if values.is_empty() { None } else { Some(values) }
}

impl Criteria {
    pub fn new(
        countries: &[String],
        protocols: &[String],
        include: &[String],
        exclude: &[String],
        age_hours: Option<f64>
    ) -> Result<Self> {
        if let Some(hours) = age_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(Error::InvalidAge(hours));
            }
        }
        Ok(Criteria {
            countries: non_empty(countries).map(|cs| cs.iter().map(|c| c.to_uppercase()).collect()),
            protocols: non_empty(protocols).map(|ps| ps.to_vec()),
            include: non_empty(include).map(compile).transpose()?,
            exclude: non_empty(exclude).map(compile).transpose()?,
            age_hours,
            now: Utc::now(),
        })
    }

    // 没有任何条件，全部通过
    pub fn all() -> Self {
        Criteria {
            countries: None,
            protocols: None,
            include: None,
            exclude: None,
            age_hours: None,
            now: Utc::now(),
        }
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn matches(&self, record: &ServerRecord) -> bool {
        if let Some(countries) = &self.countries {
            let name = record.country.to_uppercase();
            let code = record.country_code.to_uppercase();
            if !countries.iter().any(|c| *c == name || *c == code) {
                return false;
            }
        }
        if let Some(protocols) = &self.protocols {
            match record.protocol() {
                Some(p) if protocols.iter().any(|wanted| wanted == p) => {}
                _ => {
                    return false;
                }
            }
        }
        // include: 至少匹配一个
        if let Some(include) = &self.include {
            if !include.iter().any(|re| re.is_match(&record.url)) {
                return false;
            }
        }
        // exclude: 一个都不能匹配
        if let Some(exclude) = &self.exclude {
            if exclude.iter().any(|re| re.is_match(&record.url)) {
                return false;
            }
        }
        // 没有 last_sync 的记录永不过期
        if let (Some(hours), Some(last_sync)) = (self.age_hours, record.last_sync) {
            // 按毫秒比较，边界（正好等于）算作通过
            let age_ms = (self.now - last_sync).num_milliseconds() as f64;
            if age_ms > hours * 3_600_000.0 {
                return false;
            }
        }
        true
    }
}

// 惰性过滤的结果，只能消费一次；需要多次遍历时先 collect，或者 clone 一份重新计算
#[derive(Clone)]
pub struct Filtered<'a> {
    records: std::slice::Iter<'a, ServerRecord>,
    criteria: &'a Criteria,
}

impl<'a> Iterator for Filtered<'a> {
    type Item = &'a ServerRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let criteria = self.criteria;
        self.records.find(|record| criteria.matches(record))
    }
}

pub fn filter<'a>(records: &'a [ServerRecord], criteria: &'a Criteria) -> Filtered<'a> {
    Filtered { records: records.iter(), criteria }
}

// 先物化再遍历
pub fn filter_to_vec(records: &[ServerRecord], criteria: &Criteria) -> Vec<ServerRecord> {
    filter(records, criteria).cloned().collect()
}
