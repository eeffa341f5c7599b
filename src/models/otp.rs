use mongodb::bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use crate::utils::get_epoch_ts;

/// Lifecycle state of an otp code. A code starts out ACTIVE and moves to
/// exactly one of the terminal states: USED on successful validation,
/// EXPIRED through the sweep job or lazily during validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OtpStatus {
    Active,
    Used,
    Expired,
}

impl OtpStatus {
    pub fn to_bson(&self) -> anyhow::Result<Bson> {
        let bson = mongodb::bson::to_bson(self)?;
        Ok(bson)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpCode {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub code: String,
    pub owner_id: u32,
    pub operation_id: i64,
    pub status: OtpStatus,
    /// Absolute expiry timestamp fixed at creation, never recomputed
    pub expires_at: u64,
    pub created_ts: u64,
    pub updated_ts: u64,
}

impl OtpCode {
    pub fn new(owner_id: u32, code: &str, operation_id: i64, ttl_seconds: u64) -> Self {
        let ts = get_epoch_ts();
        Self {
            id: ObjectId::new(),
            code: code.to_string(),
            owner_id,
            operation_id,
            status: OtpStatus::Active,
            expires_at: ts + ttl_seconds,
            created_ts: ts,
            updated_ts: ts,
        }
    }
}

/// Singleton configuration governing new issuances. Stored under a fixed
/// _id so concurrent creates race on the primary key instead of an
/// application level existence check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpConfig {
    #[serde(rename = "_id")]
    pub id: i32,
    pub code_length: u32,
    pub ttl_seconds: u64,
}
