//! BIP-39 mnemonic handling.

use bip39::{Language, Mnemonic};

use crate::error::SdkResult;

/// Derives the 64-byte BIP-39 seed of an English `phrase`, without passphrase.
pub fn mnemonic_to_seed(phrase: &str) -> SdkResult<Vec<u8>> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)?;
    Ok(mnemonic.to_seed("").to_vec())
}

/// Generates a fresh English mnemonic of `word_count` words (12, 15, 18, 21 or 24).
pub fn generate_mnemonic(word_count: usize) -> SdkResult<String> {
    Ok(Mnemonic::generate_in(Language::English, word_count)?.to_string())
}
