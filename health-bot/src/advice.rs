//! Length and framing rules for user-facing advice and weekly reports.

pub const DISCLAIMER: &str = "⚠️ 以上內容僅供參考，不構成醫療診斷。";
pub const RECORD_HEADER: &str = "【紀錄日期】";
pub const MAX_ADVICE_CHARS: usize = 400;
pub const MAX_REPORT_CHARS: usize = 200;

/// Record time format used in headers and prompts.
pub const RECORD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn record_header(record_time: &str) -> String {
    format!("{} {}", RECORD_HEADER, record_time)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn strip_disclaimer(text: &str) -> String {
    text.replace(DISCLAIMER, "").trim().to_string()
}

/// Frames model advice as `【紀錄日期】 <time>` + body + two blank lines + disclaimer, at most
/// [`MAX_ADVICE_CHARS`] characters. A header line from the model is replaced by ours and the body
/// is cut to fit.
pub fn normalize_advice(raw: &str, record_time: &str) -> String {
    let text = strip_disclaimer(raw);
    let body = if text.starts_with(RECORD_HEADER) {
        text.split_once('\n')
            .map(|(_, rest)| rest.trim_start().to_string())
            .unwrap_or_default()
    } else {
        text
    };

    let header = record_header(record_time);
    let full = if body.is_empty() {
        header
    } else {
        format!("{}\n{}", header, body)
    };

    let suffix = format!("\n\n\n{}", DISCLAIMER);
    let budget = MAX_ADVICE_CHARS.saturating_sub(suffix.chars().count());
    format!("{}{}", truncate_chars(&full, budget).trim_end(), suffix)
}

/// Ensures the weekly report ends with the disclaimer and stays within [`MAX_REPORT_CHARS`].
pub fn normalize_report(raw: &str) -> String {
    let body = strip_disclaimer(raw);
    let suffix = format!("\n\n{}", DISCLAIMER);
    let budget = MAX_REPORT_CHARS.saturating_sub(suffix.chars().count());
    format!("{}{}", truncate_chars(&body, budget).trim_end(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_header_and_disclaimer() {
        let out = normalize_advice("熱量推估：漢堡 = 500kcal", "2026-10-18 12:30");
        assert!(out.starts_with("【紀錄日期】 2026-10-18 12:30\n熱量推估"));
        assert!(out.ends_with("\n\n\n⚠️ 以上內容僅供參考，不構成醫療診斷。"));
    }

    #[test]
    fn test_replaces_model_header_and_keeps_single_disclaimer() {
        let raw = "【紀錄日期】 2020-01-01 00:00\n睡眠時數：7 小時\n\n⚠️ 以上內容僅供參考，不構成醫療診斷。";
        let out = normalize_advice(raw, "2026-10-18 08:00");
        assert!(out.starts_with("【紀錄日期】 2026-10-18 08:00\n睡眠時數"));
        assert_eq!(out.matches(DISCLAIMER).count(), 1);
    }

    #[test]
    fn test_long_advice_is_truncated_to_limit() {
        let raw = "很".repeat(1000);
        let out = normalize_advice(&raw, "2026-10-18 08:00");
        assert!(out.chars().count() <= MAX_ADVICE_CHARS);
        assert!(out.ends_with(DISCLAIMER));
    }

    #[test]
    fn test_report_disclaimer_appended_once() {
        let out = normalize_report("[健康分析週報]\n本週表現良好。");
        assert!(out.ends_with(DISCLAIMER));
        let again = normalize_report(&out);
        assert_eq!(again, out);
        assert!(normalize_report(&"字".repeat(500)).chars().count() <= MAX_REPORT_CHARS);
    }
}
