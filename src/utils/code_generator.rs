use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_upper_alnum(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| UPPER_ALNUM[rng.gen_range(0..UPPER_ALNUM.len())] as char)
        .collect()
}

/// 后台订单号: ORD-YYYYMMDD-XXXXXX
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!("ORD-{}-{}", now.format("%Y%m%d"), random_upper_alnum(6))
}

/// 商城订单号: YYYYMMDDHHMMSS-XXXX (4 位数字)
pub fn generate_mall_order_number(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}-{:04}",
        now.format("%Y%m%d%H%M%S"),
        rng.gen_range(0..10_000)
    )
}

/// 优惠券码: CPN + 毫秒时间戳 + 5 位大写字母数字
pub fn generate_coupon_code(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("CPN{}{}", now.timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_order_number_format() {
        let n = generate_order_number(fixed_now());
        assert!(n.starts_with("ORD-20250309-"));
        let suffix = &n["ORD-20250309-".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_mall_order_number_format() {
        let n = generate_mall_order_number(fixed_now());
        assert_eq!(n.len(), 19);
        assert!(n.starts_with("20250309140507-"));
        assert!(n[15..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_coupon_code_format() {
        let now = fixed_now();
        let code = generate_coupon_code(now);
        let prefix = format!("CPN{}", now.timestamp_millis());
        assert!(code.starts_with(&prefix));
        let suffix = &code[prefix.len()..];
        assert_eq!(suffix.len(), 5);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }
}
