//! Per-table key derivation and the encrypt-then-MAC record envelope.
//!
//! ```text
//!   master (32 bytes, random at engine start)
//!      │
//!      ├── HMAC(master, "AES" ‖ table_id_le32)[..16] ──▶ enc key (AES-128)
//!      └── HMAC(master, "MAC" ‖ table_id_le32)       ──▶ mac key (HMAC-SHA256)
//!
//!   write:  encode ─▶ PKCS7 pad ─▶ AES-CBC(iv) ─▶ HMAC(iv ‖ ct)
//!   read:   verify HMAC ─▶ decrypt ─▶ unpad ─▶ decode ─▶ check ids
//! ```
//!
//! The MAC is always verified before any decryption is attempted. Every
//! plaintext buffer is wrapped in [`zeroize::Zeroizing`] so it is wiped when
//! the call returns.

mod cipher;
mod keys;

pub use cipher::{open, seal, EncryptedRecord};
pub use keys::{MasterKey, TableKeys};
