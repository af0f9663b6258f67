use crate::utils::models::{ ServerRecord, SortKey };
use crate::utils::rate::Rater;

use std::cmp::Ordering;

// 有值的排在前面，缺失的排在最后
fn present_first<T, F>(a: Option<T>, b: Option<T>, cmp: F) -> Ordering where F: Fn(&T, &T) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn ascending(a: &f64, b: &f64) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

// 排序（稳定排序）；按速度排序时交给测速引擎
pub fn sort<I, R>(records: I, by: SortKey, rater: &R) -> Vec<ServerRecord>
    where I: IntoIterator<Item = ServerRecord>, R: Rater + ?Sized
{
    let mut records: Vec<ServerRecord> = records.into_iter().collect();
    match by {
        SortKey::Age => {
            // 最近同步的在前
            records.sort_by(|a, b| present_first(a.last_sync, b.last_sync, |x, y| y.cmp(x)));
        }
        SortKey::Country => {
            records.sort_by(|a, b| a.country.cmp(&b.country));
        }
        SortKey::CountryCode => {
            records.sort_by(|a, b| a.country_code.cmp(&b.country_code));
        }
        SortKey::Delay => {
            records.sort_by(|a, b| present_first(a.delay, b.delay, ascending));
        }
        SortKey::Score => {
            records.sort_by(|a, b| present_first(a.score, b.score, ascending));
        }
        SortKey::Rate => {
            records = rater.rate(records);
        }
    }
    records
}
