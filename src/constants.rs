/// 每页请求的跑步记录条数
pub const RUN_PAGE_SIZE: u32 = 10;

/// 单个分区最多请求的页数（防止上游分页失控）
pub const RUN_MAX_PAGES: u32 = 20;

/// 上游记录类型过滤参数（"0" 为阳光跑）
pub const RUN_TYPE_SUN_RUN: &str = "0";

/// 上游时间戳使用的固定时区偏移（UTC+8，秒）
pub const UPSTREAM_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// 记录缺少可用时间时使用的默认时刻
pub const MIDNIGHT: &str = "00:00:00";

/// 日期范围结束日的截止时刻
pub const END_OF_DAY: &str = "23:59:59";

/// 请求体大小上限：64 KiB
pub const MAX_BODY_SIZE: usize = 64 * 1024;
