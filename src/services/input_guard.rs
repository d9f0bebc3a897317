/*
 * Responsibility
 * - 信頼できない入力をクエリ構築・保存に使う前の無害化と検証
 * - sanitize は変換、contains_injection_pattern は検知のみ (defense-in-depth)
 * - FieldRule: field ごとの長さ境界 + 文字クラスを静的に宣言する
 *
 * Notes
 * - backing store は schemaless なので、構造記号 ($ { } [ ] " ' ; \) と
 *   JS キーワードがそのままクエリ注入になり得る。
 * - 拒否した生の値はログにも応答にも載せない。呼び出し側は field 名と
 *   理由だけを AppError::Validation に渡すこと。
 */

/// Characters with structural meaning in the backing query language.
const STRUCTURAL_CHARS: &[char] = &['$', '{', '}', '[', ']', '"', '\'', ';', '\\'];

/// Keyword denylist, matched case-insensitively as whole words.
const INJECTION_KEYWORDS: &[&str] = &[
    "where",
    "javascript",
    "function",
    "return",
    "var",
    "let",
    "const",
    "eval",
    "settimeout",
    "setinterval",
];

/// Named per-field validation rule: length bounds + character class.
/// Rules are static configuration, not runtime state.
pub struct FieldRule {
    pub field: &'static str,
    pub min_len: usize,
    pub max_len: usize,
    allowed: fn(char) -> bool,
}

pub const PRODUCT_NAME: FieldRule = FieldRule {
    field: "name",
    min_len: 2,
    max_len: 100,
    allowed: is_product_name_char,
};

pub const PRODUCT_DESCRIPTION: FieldRule = FieldRule {
    field: "description",
    min_len: 0,
    max_len: 500,
    allowed: is_printable_char,
};

pub const USER_NAME: FieldRule = FieldRule {
    field: "name",
    min_len: 2,
    max_len: 50,
    allowed: is_person_name_char,
};

pub const SEARCH_QUERY_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;

fn is_product_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.'
}

fn is_person_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == ' '
}

fn is_printable_char(c: char) -> bool {
    !is_control_char(c)
}

fn is_control_char(c: char) -> bool {
    matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}')
}

fn is_structural_char(c: char) -> bool {
    STRUCTURAL_CHARS.contains(&c)
}

/// Strip control characters and the structural denylist, trim whitespace,
/// truncate to `max_len` characters. Mutates; never errors.
pub fn sanitize(text: &str, max_len: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !is_control_char(*c) && !is_structural_char(*c))
        .collect();
    cleaned.trim().chars().take(max_len).collect()
}

/// Detection-only counterpart of `sanitize`: flags text that carries either
/// a structural character or a denylisted keyword as a whole word.
pub fn contains_injection_pattern(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    if text.chars().any(is_structural_char) {
        return true;
    }
    // 単語境界は regex の \b 相当: [A-Za-z0-9_] 以外で区切る
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .any(|w| {
            let w = w.to_ascii_lowercase();
            INJECTION_KEYWORDS.contains(&w.as_str())
        })
}

/// Apply a named rule: length bounds, character class, and the injection
/// denylist on the trimmed text.
pub fn validate(text: &str, rule: &FieldRule) -> bool {
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < rule.min_len || len > rule.max_len {
        return false;
    }
    if !trimmed.chars().all(rule.allowed) {
        return false;
    }
    !contains_injection_pattern(trimmed)
}

/// Email shape check: local@domain.tld, bounded length. A second layer on
/// top of DTO-level checks, not a full RFC parser.
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > EMAIL_MAX_LEN {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty()
        || !local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
    {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
    {
        return false;
    }
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// The backing store's identifier shape: exactly 24 hex characters.
pub fn validate_identifier(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

/// Numeric range check for prices and similar fields.
pub fn validate_number(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_operator_injection() {
        assert!(contains_injection_pattern("$where: function(){return true}"));
        assert!(contains_injection_pattern("a'; drop"));
        assert!(contains_injection_pattern("EVAL(1)"));
        assert!(contains_injection_pattern("setTimeout later"));
    }

    #[test]
    fn plain_product_text_is_clean() {
        assert!(!contains_injection_pattern("Gaming Laptop Pro"));
        assert!(!contains_injection_pattern(""));
        // keyword as a substring of a longer word is not a hit
        assert!(!contains_injection_pattern("whereabouts unknown"));
        assert!(!contains_injection_pattern("returnable item"));
    }

    #[test]
    fn sanitize_strips_structural_and_control_chars() {
        assert_eq!(sanitize("  {\"$gt\": 1}; \u{0007}ok  ", 100), "gt: 1 ok");
        assert_eq!(sanitize("laptop", 100), "laptop");
    }

    #[test]
    fn sanitize_truncates_to_field_maximum() {
        let long = "a".repeat(300);
        assert_eq!(sanitize(&long, SEARCH_QUERY_MAX_LEN).len(), 100);
    }

    #[test]
    fn identifier_must_be_exactly_24_hex_chars() {
        assert!(validate_identifier("507f1f77bcf86cd799439011"));
        assert!(!validate_identifier("not-an-id"));
        // one short / one long
        assert!(!validate_identifier("507f1f77bcf86cd79943901"));
        assert!(!validate_identifier("507f1f77bcf86cd7994390111"));
        assert!(!validate_identifier("507f1f77bcf86cd79943901g"));
    }

    #[test]
    fn product_name_rule() {
        assert!(validate("Gaming Laptop Pro", &PRODUCT_NAME));
        assert!(validate("USB-C_Hub v2.0", &PRODUCT_NAME));
        assert!(!validate("x", &PRODUCT_NAME)); // too short
        assert!(!validate(&"a".repeat(101), &PRODUCT_NAME)); // too long
        assert!(!validate("{$gt: 1}", &PRODUCT_NAME));
        assert!(!validate("name; return 1", &PRODUCT_NAME));
    }

    #[test]
    fn user_name_rule_accepts_letters_and_spaces_only() {
        assert!(validate("Alice Smith", &USER_NAME));
        assert!(!validate("Alice2", &USER_NAME));
        assert!(!validate("A", &USER_NAME));
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("alice@example.com"));
        assert!(validate_email("a.b+tag@sub.example.co"));
        assert!(!validate_email("alice"));
        assert!(!validate_email("alice@"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("alice@example"));
        assert!(!validate_email("alice@.com"));
        assert!(!validate_email(&format!("{}@example.com", "a".repeat(100))));
    }

    #[test]
    fn number_range_rejects_nan_and_out_of_bounds() {
        assert!(validate_number(19.99, 0.01, 999_999.99));
        assert!(!validate_number(0.0, 0.01, 999_999.99));
        assert!(!validate_number(f64::NAN, 0.01, 999_999.99));
        assert!(!validate_number(f64::INFINITY, 0.01, 999_999.99));
    }
}
