pub mod common; // 公共的函数：时间显示、耗时格式化
pub mod country; // 国家名称 -> 国家代码
pub mod error; // 错误类型
pub mod files; // 保存服务器列表到文件
pub mod filter; // 过滤服务器
pub mod logger; // 日志初始化
pub mod models; // 数据结构
pub mod parser; // 解析服务器列表页面
pub mod probe; // 单个服务器的测速（http、rsync）
pub mod rate; // 并发测速、按速度排序
pub mod serverlist; // 生成服务器列表文本、国家统计、详细信息
pub mod sort; // 排序
pub mod store; // 服务器列表的获取和缓存
