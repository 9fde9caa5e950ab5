/// 姓名脱敏：保留首字符，其余每个字符替换为 '*'
pub fn mask_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.count();
            let mut masked = String::with_capacity(first.len_utf8() + rest);
            masked.push(first);
            masked.extend(std::iter::repeat_n('*', rest));
            masked
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_name() {
        assert_eq!(mask_name("홍길동"), "홍**");
        assert_eq!(mask_name("Kim"), "K**");
        assert_eq!(mask_name("A"), "A");
        assert_eq!(mask_name("  "), "");
    }
}
