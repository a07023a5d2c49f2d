use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};

/// 生成新的任务令牌明文
pub fn generate_secret() -> String {
    let mut rng = rand::rng();
    let key: [u8; 32] = rng.random();
    general_purpose::URL_SAFE_NO_PAD.encode(key)
}

/// 令牌摘要，存储层只保存摘要
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}
