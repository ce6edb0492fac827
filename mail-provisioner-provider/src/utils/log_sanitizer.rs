//! 日志脱敏
//!
//! Provider 响应会回显记录内容（DKIM 公钥动辄数百字节），调试日志中只保留
//! 有助排查的部分。

/// Longest body kept in a log line, in bytes.
const LOG_LIMIT: usize = 256;
/// DKIM key tag inside a TXT payload.
const DKIM_KEY_TAG: &str = "p=";

/// 不超过 `index` 的最近字符边界
fn char_boundary_at_or_before(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Cut `s` to [`LOG_LIMIT`] bytes, noting the original length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= LOG_LIMIT {
        return s.to_string();
    }
    let cut = char_boundary_at_or_before(s, LOG_LIMIT);
    format!("{}... [{} of {} bytes]", &s[..cut], cut, s.len())
}

/// Replace every DKIM key payload (`p=<base64>`) with its length.
///
/// Only keys of at least 64 base64 characters are elided, so short values
/// such as DMARC `p=quarantine` stay readable.
pub fn elide_dkim_keys(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(LOG_LIMIT * 2));
    let mut rest = s;
    while let Some(pos) = rest.find(DKIM_KEY_TAG) {
        let (head, tail) = rest.split_at(pos + DKIM_KEY_TAG.len());
        out.push_str(head);
        let key_len = tail
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
            .count();
        if key_len >= 64 {
            out.push_str(&format!("<{key_len} chars>"));
        } else {
            out.push_str(&tail[..key_len]);
        }
        rest = &tail[key_len..];
    }
    out.push_str(rest);
    out
}

/// [`elide_dkim_keys`] followed by [`truncate_for_log`].
pub fn sanitize_for_log(s: &str) -> String {
    truncate_for_log(&elide_dkim_keys(s))
}
