// 初始化日志（设置日志格式），输出到stderr，避免污染stdout中的服务器列表
pub fn init_logger(verbose: bool) -> Result<(), fern::InitError> {
    let level = if verbose { log::LevelFilter::Info } else { log::LevelFilter::Warn };
    fern::Dispatch
        ::new()
        .format(|out, message, record| {
            out.finish(
                format_args!(
                    "{} {:<5} {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    message
                )
            )
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
