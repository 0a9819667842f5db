//! Sealing and opening record envelopes.

use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use vault_common::constants::{IV_SIZE, MAC_SIZE};
use vault_common::platform::RandomSource;
use vault_common::types::{RowId, TableId};
use zeroize::Zeroizing;

use super::keys::TableKeys;
use crate::error::{StorageError, StorageResult};
use crate::record::{self, Record};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// The value stored in a table's B-tree.
///
/// For encrypted tables `ciphertext` is the AES-128-CBC encryption of the
/// encoded record; otherwise it is the encoded record itself. Either way
/// `mac` authenticates `iv ‖ ciphertext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedRecord {
    /// Per-write random initialization vector.
    pub iv: [u8; IV_SIZE],
    /// Encrypted (or, for plain tables, encoded) payload.
    pub ciphertext: Vec<u8>,
    /// HMAC-SHA256 over `iv ‖ ciphertext`.
    pub mac: [u8; MAC_SIZE],
    /// Row id of the sealed record.
    pub row_id: RowId,
    /// Table the record belongs to.
    pub table_id: TableId,
}

/// Serializes, encrypts and authenticates `record`.
///
/// A fresh IV is drawn for every call, so sealing the same record twice
/// yields different envelopes.
pub fn seal(
    keys: &TableKeys,
    record: &Record,
    encrypt: bool,
    rng: &mut dyn RandomSource,
) -> StorageResult<EncryptedRecord> {
    let plaintext = Zeroizing::new(record::encode(record)?);

    let mut iv = [0u8; IV_SIZE];
    rng.fill(&mut iv);

    let ciphertext = if encrypt {
        Aes128CbcEnc::new_from_slices(&keys.enc, &iv)
            .map_err(|e| StorageError::Crypto(format!("cipher init failed: {e}")))?
            .encrypt_padded_vec_mut::<Pkcs7>(&plaintext)
    } else {
        plaintext.to_vec()
    };

    let mac = compute_mac(keys, &iv, &ciphertext)?
        .finalize()
        .into_bytes()
        .into();

    Ok(EncryptedRecord {
        iv,
        ciphertext,
        mac,
        row_id: record.row_id,
        table_id: record.table_id,
    })
}

/// Verifies, decrypts and decodes an envelope.
///
/// The MAC is checked in constant time before anything else. Any failure,
/// including a decoded record whose ids disagree with the envelope, is
/// reported as [`StorageError::IntegrityFailure`] or a codec error.
pub fn open(keys: &TableKeys, envelope: &EncryptedRecord, encrypted: bool) -> StorageResult<Record> {
    let integrity = || StorageError::IntegrityFailure {
        row_id: envelope.row_id,
    };

    compute_mac(keys, &envelope.iv, &envelope.ciphertext)?
        .verify_slice(&envelope.mac)
        .map_err(|_| integrity())?;

    let plaintext = if encrypted {
        let decryptor = Aes128CbcDec::new_from_slices(&keys.enc, &envelope.iv)
            .map_err(|e| StorageError::Crypto(format!("cipher init failed: {e}")))?;
        Zeroizing::new(
            decryptor
                .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
                .map_err(|_| integrity())?,
        )
    } else {
        Zeroizing::new(envelope.ciphertext.clone())
    };

    let record = record::decode(&plaintext)?;
    if record.row_id != envelope.row_id || record.table_id != envelope.table_id {
        return Err(integrity());
    }
    Ok(record)
}

fn compute_mac(keys: &TableKeys, iv: &[u8], payload: &[u8]) -> StorageResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(&keys.mac)
        .map_err(|e| StorageError::Crypto(format!("HMAC init failed: {e}")))?;
    mac.update(iv);
    mac.update(payload);
    Ok(mac)
}
