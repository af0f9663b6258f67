use crate::utils::models::{ RateResult, ServerRecord };
use crate::utils::probe::Probe;

use log::{ error, info, warn };
use std::{ collections::HashMap, sync::{ mpsc, Arc } };
use threadpool::ThreadPool;

// 按测速结果排序服务器
pub trait Rater {
    fn rate(&self, records: Vec<ServerRecord>) -> Vec<ServerRecord>;
}

// 线程数：至少1个，且不超过服务器数量
pub fn worker_count(threads: usize, records: usize) -> usize {
    threads.min(records).max(1)
}

pub struct RatingEngine<P: Probe + 'static> {
    probe: Arc<P>,
    threads: usize,
}

impl<P: Probe + 'static> RatingEngine<P> {
    pub fn new(probe: P, threads: usize) -> Self {
        RatingEngine { probe: Arc::new(probe), threads }
    }

    // 并发测速，返回 url -> 结果；每个url都会有一个结果
    pub fn measure(&self, records: &[ServerRecord]) -> HashMap<String, RateResult> {
        let mut rates: HashMap<String, RateResult> = HashMap::with_capacity(records.len());
        if records.is_empty() {
            return rates;
        }

        // 线程池：固定数量的worker从共享队列中取url
        let pool = ThreadPool::new(worker_count(self.threads, records.len()));
        let (tx, rx) = mpsc::channel();

        for record in records {
            info!("rating {}", record.url);
            let tx = tx.clone();
            let probe = Arc::clone(&self.probe);
            let url = record.url.clone();
            pool.execute(move || {
                let result = probe.probe(&url);
                // 接收端在收齐结果之前不会被释放
                let _ = tx.send(result);
            });
        }
        // 释放发送端，所有任务结束后接收端的迭代才会结束
        drop(tx);

        // 按url收集结果，完成顺序无关；收到的数量等于派发的数量才继续
        for result in rx.iter().take(records.len()) {
            rates.insert(result.url.clone(), result);
        }
        pool.join();

        // worker panic 时任务的结果会丢失，按失败处理
        for record in records {
            if !rates.contains_key(&record.url) {
                error!("{} | no rating result received", record.url);
                rates.insert(record.url.clone(), RateResult::failed(&record.url));
            }
        }

        log_rates(records, &rates);
        rates
    }
}

impl<P: Probe + 'static> Rater for RatingEngine<P> {
    fn rate(&self, records: Vec<ServerRecord>) -> Vec<ServerRecord> {
        if records.is_empty() {
            warn!("no servers selected for rating");
            return records;
        }
        let rates = self.measure(&records);
        order_by_rate(records, &rates)
    }
}

// 速度>0的按速度从快到慢（稳定），速度为0的保持原顺序放在最后
pub fn order_by_rate(records: Vec<ServerRecord>, rates: &HashMap<String, RateResult>) -> Vec<ServerRecord> {
    let rate_of = |record: &ServerRecord| rates.get(&record.url).map(|r| r.rate).unwrap_or(0.0);
    let (mut rated, unrated): (Vec<ServerRecord>, Vec<ServerRecord>) = records
        .into_iter()
        .partition(|record| rate_of(record) > 0.0);
    rated.sort_by(|a, b| rate_of(b).total_cmp(&rate_of(a)));
    rated.extend(unrated);
    rated
}

fn log_rates(records: &[ServerRecord], rates: &HashMap<String, RateResult>) {
    let url_len = records
        .iter()
        .map(|r| r.url.len())
        .max()
        .unwrap_or(6)
        .max(6);
    info!("{:<width$}  {:>14}  {:>9}", "Server", "Rate", "Time", width = url_len);
    for record in records {
        if let Some(result) = rates.get(&record.url) {
            info!(
                "{:<width$}  {:8.2} KiB/s  {:7.2} s",
                record.url,
                result.kibps(),
                result.seconds(),
                width = url_len
            );
        }
    }
}
