use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static KR_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^01[0-9]\d{7,8}$").expect("mobile pattern is valid"));

/// 手机、地区座机 (02 / 0XX)、050X 与 070 号码
static KR_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(01[016789]\d{7,8}|02\d{7,8}|0[3-6][1-5]\d{7,8}|050[2-7]\d{7,8}|070\d{7,8})$")
        .expect("phone pattern is valid")
});

fn digits_only(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 验证韩国手机号格式 (01X + 7~8 位数字，允许连字符)
pub fn validate_kr_mobile(phone: &str) -> AppResult<()> {
    let stripped: String = phone.trim().replace('-', "");
    if !KR_MOBILE.is_match(&stripped) {
        return Err(AppError::ValidationError(
            "Invalid mobile number (expected 010-XXXX-XXXX)".to_string(),
        ));
    }
    Ok(())
}

/// 格式化为带连字符的形式: 010-1234-5678 / 011-123-4567
pub fn format_kr_mobile(phone: &str) -> String {
    let digits = digits_only(phone);
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => phone.trim().to_string(),
    }
}

/// 用于比较的号码键: 去掉连字符和空格后的数字；不是韩国电话号码时返回 None
pub fn kr_phone_key(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() || trimmed.chars().any(|c| !(c.is_ascii_digit() || c == '-' || c == ' ')) {
        return None;
    }
    let digits = digits_only(trimmed);
    KR_PHONE.is_match(&digits).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_kr_mobile() {
        assert!(validate_kr_mobile("010-1234-5678").is_ok());
        assert!(validate_kr_mobile("01012345678").is_ok());
        assert!(validate_kr_mobile("011-123-4567").is_ok());
        assert!(validate_kr_mobile("02-123-4567").is_err());
        assert!(validate_kr_mobile("010-12-345").is_err());
        assert!(validate_kr_mobile("010123456789").is_err());
        assert!(validate_kr_mobile("").is_err());
    }

    #[test]
    fn test_format_kr_mobile() {
        assert_eq!(format_kr_mobile("01012345678"), "010-1234-5678");
        assert_eq!(format_kr_mobile("010-1234-5678"), "010-1234-5678");
        assert_eq!(format_kr_mobile("0111234567"), "011-123-4567");
        assert_eq!(format_kr_mobile(" 12 "), "12");
    }

    #[test]
    fn test_kr_phone_key() {
        assert_eq!(kr_phone_key("010-1234-5678").as_deref(), Some("01012345678"));
        assert_eq!(kr_phone_key("010 1234 5678").as_deref(), Some("01012345678"));
        assert_eq!(kr_phone_key("02-123-4567").as_deref(), Some("021234567"));
        assert_eq!(kr_phone_key("031-123-4567").as_deref(), Some("0311234567"));
        assert_eq!(kr_phone_key("0505-123-4567").as_deref(), Some("05051234567"));
        assert_eq!(kr_phone_key("070-1234-5678").as_deref(), Some("07012345678"));
        assert_eq!(kr_phone_key("+82-10-1234-5678"), None);
        assert_eq!(kr_phone_key("1588-1234"), None);
        assert_eq!(kr_phone_key("없음"), None);
        assert_eq!(kr_phone_key(""), None);
    }
}
