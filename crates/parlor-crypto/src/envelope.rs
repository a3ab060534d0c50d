// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-CBC envelope codec for webhook payloads.
//!
//! The platform wraps every callback body in a fixed envelope: 16 random
//! bytes, a 4-byte big-endian message length, the message itself, and the
//! receiver id of the account the callback belongs to, all PKCS#7-padded
//! and encrypted with AES-256-CBC. The key is the base64-decoded encoding
//! key and the IV is its first 16 bytes.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parlor_core::ParlorError;
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const BLOCK: usize = 16;
const RANDOM_PREFIX: usize = 16;
const LENGTH_FIELD: usize = 4;

/// Decrypted envelope contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// The inner message (XML for event callbacks, plaintext for the
    /// verification echo).
    pub message: Vec<u8>,
    /// Receiver id carried after the message.
    pub receiver_id: String,
}

/// A parsed 32-byte envelope key.
#[derive(Clone)]
pub struct EnvelopeKey {
    key: [u8; 32],
}

impl EnvelopeKey {
    /// Parse the platform's 43-character encoding key.
    ///
    /// The platform strips the trailing `=` from the base64 form; it is
    /// re-appended here before decoding. Anything that does not decode to
    /// exactly 32 bytes is rejected.
    pub fn from_encoding_key(encoding_key: &str) -> Result<Self, ParlorError> {
        let padded = format!("{encoding_key}=");
        let bytes = BASE64
            .decode(&padded)
            .map_err(|e| ParlorError::Crypto(format!("encoding key is not base64: {e}")))?;
        let key: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            ParlorError::Crypto(format!("encoding key decodes to {} bytes, want 32", b.len()))
        })?;
        Ok(Self { key })
    }

    fn iv(&self) -> &[u8] {
        &self.key[..BLOCK]
    }

    /// Decrypt a base64 ciphertext and parse the envelope layout.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<Envelope, ParlorError> {
        let mut buf = BASE64
            .decode(ciphertext_b64.trim())
            .map_err(|e| ParlorError::Crypto(format!("ciphertext is not base64: {e}")))?;
        if buf.is_empty() || buf.len() % BLOCK != 0 {
            return Err(ParlorError::Crypto(format!(
                "ciphertext length {} is not a positive multiple of {BLOCK}",
                buf.len()
            )));
        }

        let plaintext = Aes256CbcDec::new((&self.key).into(), self.iv().into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|_| ParlorError::Crypto("AES-256-CBC decryption failed".to_string()))?;

        let unpadded = strip_pkcs7(plaintext)?;
        parse_layout(unpadded)
    }

    /// Build and encrypt an envelope, returning base64 ciphertext.
    pub fn encrypt(&self, message: &[u8], receiver_id: &str) -> Result<String, ParlorError> {
        let msg_len = u32::try_from(message.len())
            .map_err(|_| ParlorError::Crypto("message too large for envelope".to_string()))?;

        let mut plaintext =
            Vec::with_capacity(RANDOM_PREFIX + LENGTH_FIELD + message.len() + receiver_id.len());
        let mut prefix = [0u8; RANDOM_PREFIX];
        rand::thread_rng().fill_bytes(&mut prefix);
        plaintext.extend_from_slice(&prefix);
        plaintext.extend_from_slice(&msg_len.to_be_bytes());
        plaintext.extend_from_slice(message);
        plaintext.extend_from_slice(receiver_id.as_bytes());

        // PKCS#7: always pad, a full block when already aligned.
        let pad = BLOCK - plaintext.len() % BLOCK;
        plaintext.extend(std::iter::repeat(pad as u8).take(pad));

        let len = plaintext.len();
        let ciphertext = Aes256CbcEnc::new((&self.key).into(), self.iv().into())
            .encrypt_padded_mut::<NoPadding>(&mut plaintext, len)
            .map_err(|_| ParlorError::Crypto("AES-256-CBC encryption failed".to_string()))?;

        Ok(BASE64.encode(ciphertext))
    }
}

impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeKey").finish_non_exhaustive()
    }
}

fn strip_pkcs7(plaintext: &[u8]) -> Result<&[u8], ParlorError> {
    let last = *plaintext
        .last()
        .ok_or_else(|| ParlorError::Crypto("empty plaintext".to_string()))?;
    let pad = last as usize;
    if !(1..=BLOCK).contains(&pad) || pad >= plaintext.len() {
        return Err(ParlorError::Crypto(format!("invalid PKCS#7 pad byte {last}")));
    }
    Ok(&plaintext[..plaintext.len() - pad])
}

fn parse_layout(plaintext: &[u8]) -> Result<Envelope, ParlorError> {
    if plaintext.len() < RANDOM_PREFIX + LENGTH_FIELD {
        return Err(ParlorError::Crypto(format!(
            "envelope too short: {} bytes",
            plaintext.len()
        )));
    }
    let len_bytes: [u8; LENGTH_FIELD] = plaintext[RANDOM_PREFIX..RANDOM_PREFIX + LENGTH_FIELD]
        .try_into()
        .map_err(|_| ParlorError::Crypto("envelope length field truncated".to_string()))?;
    let msg_len = u32::from_be_bytes(len_bytes) as usize;

    let msg_start = RANDOM_PREFIX + LENGTH_FIELD;
    let msg_end = msg_start
        .checked_add(msg_len)
        .filter(|end| *end <= plaintext.len())
        .ok_or_else(|| {
            ParlorError::Crypto(format!(
                "declared message length {msg_len} exceeds envelope of {} bytes",
                plaintext.len() - msg_start
            ))
        })?;

    let receiver_id = String::from_utf8(plaintext[msg_end..].to_vec())
        .map_err(|_| ParlorError::Crypto("receiver id is not UTF-8".to_string()))?;

    Ok(Envelope {
        message: plaintext[msg_start..msg_end].to_vec(),
        receiver_id,
    })
}
