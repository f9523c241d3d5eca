use getrandom::getrandom;

/// Lowercase hex string of `byte_len` random bytes from the OS source.
pub fn random_hex_id(byte_len: usize) -> Result<String, String> {
    let mut bytes = vec![0_u8; byte_len];
    getrandom(&mut bytes).map_err(|err| format!("failed to gather id randomness: {err}"))?;
    Ok(bytes.iter().map(|byte| format!("{byte:02x}")).collect())
}
