use anyhow::anyhow;
use secrecy::SecretString;
use std::{
    fs::{metadata, File},
    io::Read,
};

/// Reads an API token from `file_path`, ignoring surrounding whitespace.
///
/// Unlike key files nothing is generated when the file is missing: tokens are
/// issued by the store, so a missing or empty file is a configuration error.
pub fn read_token(file_path: &str) -> Result<SecretString, anyhow::Error> {
    if metadata(file_path).is_err() {
        return Err(anyhow!("token file {} does not exist", file_path));
    }

    let mut file = File::open(file_path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let token = contents.trim();
    if token.is_empty() {
        return Err(anyhow!("token file {} is empty", file_path));
    }

    Ok(SecretString::from(token.to_string()))
}
