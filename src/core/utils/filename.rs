//! 文件名处理
//!
//! 支持 `%date:yyyy-MM-dd%` 形式的日期占位符

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use regex::{Captures, Regex};

use crate::error::Error;

/// 日期占位符, 捕获组为日期格式
const DATE_PLACEHOLDER: &str = r"%date:(.*?)%";

/// 日期格式标记与 strftime 的对应关系, 顺序即替换顺序
const DATE_TOKENS: [(&str, &str); 6] = [
    ("yyyy", "%Y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
];

/// 使用当前本地时间替换日期占位符
pub fn replace_date_placeholders(text: &str) -> Result<String, Error> {
    replace_date_placeholders_at(text, Local::now())
}

/// 使用指定时间替换日期占位符
///
/// 捕获组内不含 `%`, 其余字符按原样输出
pub fn replace_date_placeholders_at(text: &str, now: DateTime<Local>) -> Result<String, Error> {
    let re = Regex::new(DATE_PLACEHOLDER)?;
    let text = re
        .replace_all(text, |caps: &Captures| {
            let format = DATE_TOKENS
                .iter()
                .fold(caps[1].to_string(), |acc, (token, spec)| {
                    acc.replace(token, spec)
                });
            now.format(&format).to_string()
        })
        .into_owned();
    Ok(text)
}

/// 不覆盖已有文件的保存路径
///
/// `name.ext` 已存在时依次尝试 `name_1.ext`, `name_2.ext`, ...
pub fn unique_file_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    let path = dir.join(format!("{name}.{extension}"));
    if !path.exists() {
        return path;
    }

    let mut counter = 1;
    loop {
        let path = dir.join(format!("{name}_{counter}.{extension}"));
        if !path.exists() {
            return path;
        }
        counter += 1;
    }
}
