/*
 * Responsibility
 * - 24 hex 文字のドキュメント ID 生成 (4 byte 秒刻 timestamp + 8 byte 乱数)
 * - ID の形式検証は input_guard::validate_identifier 側
 */
use chrono::Utc;
use uuid::Uuid;

pub fn generate() -> String {
    let mut bytes = [0u8; 12];
    let secs = Utc::now().timestamp() as u32;
    bytes[..4].copy_from_slice(&secs.to_be_bytes());
    bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
    hex::encode(bytes)
}
