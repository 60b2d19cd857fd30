//! 边界输入校验
//! 在调用聚合核心之前检查会话字段与日期范围，失败时返回面向用户的提示信息。

use serde::Deserialize;

use crate::history::{Credentials, DateRange};

pub const MSG_MISSING_SESSION: &str = "缺少 session 信息";
pub const MSG_MISSING_RANGE: &str = "缺少 startDate / endDate";
pub const MSG_INVALID_RANGE: &str = "日期范围不合法";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    #[serde(default)]
    pub stu_number: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub school_id: Option<String>,
    #[serde(default)]
    pub campus_id: Option<String>,
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// 学号、token、schoolId 必填；campusId 可缺省为空串
pub fn validate_session(session: Option<&SessionInput>) -> Result<Credentials, &'static str> {
    let session = session.ok_or(MSG_MISSING_SESSION)?;
    match (
        required(&session.stu_number),
        required(&session.token),
        required(&session.school_id),
    ) {
        (Some(student_number), Some(token), Some(school_id)) => Ok(Credentials {
            student_number: student_number.to_string(),
            token: token.to_string(),
            school_id: school_id.to_string(),
            campus_id: session.campus_id.clone().unwrap_or_default(),
        }),
        _ => Err(MSG_MISSING_SESSION),
    }
}

/// 两个日期都必须是合法的 YYYY-MM-DD，且起始日不晚于结束日
pub fn parse_date_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<DateRange, &'static str> {
    let (Some(start), Some(end)) = (
        start_date.filter(|s| !s.is_empty()),
        end_date.filter(|s| !s.is_empty()),
    ) else {
        return Err(MSG_MISSING_RANGE);
    };
    DateRange::from_days(start, end).ok_or(MSG_INVALID_RANGE)
}
