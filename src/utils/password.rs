use crate::config::Argon2Config;
use crate::errors::{Result, SchoolError};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 哈希密码
pub fn hash_password(password: &str, config: &Argon2Config) -> Result<String> {
    let params = Params::new(
        config.memory_cost,
        config.time_cost,
        config.parallelism,
        None,
    )
    .map_err(|e| SchoolError::validation("password", format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| SchoolError::validation("password", format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 在阻塞线程池中哈希密码；未提供密码（或为空）时生成随机密码
pub async fn hash_or_generate(password: Option<String>, config: Argon2Config) -> Result<String> {
    let password = password
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| generate_random_password(16));

    tokio::task::spawn_blocking(move || hash_password(&password, &config))
        .await
        .map_err(|e| SchoolError::persistence(format!("密码处理失败: {e}")))?
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// 生成随机密码
pub fn generate_random_password(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
