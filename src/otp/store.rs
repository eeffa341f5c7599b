use mockall_double::double;
use mongodb::bson::{doc, oid::ObjectId};
use std::sync::Arc;

use crate::{
    constants::*,
    database::is_duplicate_key_error,
    models::otp::{OtpCode, OtpStatus},
    utils::{get_epoch_ts, AppError},
};

#[double]
use crate::database::AppDatabase;

/// Unscoped lookup by the code string alone. Administrative use only,
/// validation must go through the owner scoped variant.
pub async fn find_by_code(
    db: &Arc<AppDatabase>,
    code: &str,
) -> Result<Option<OtpCode>, AppError> {
    let filter = Some(doc! {"code": code});
    let otp_code = db
        .find_one::<OtpCode>(DB_NAME, COLL_OTP_CODES, filter, None)
        .await?;
    Ok(otp_code)
}

/// Owner scoped lookup, the only one validation is allowed to use. A code
/// guessed by another user stays invisible to them.
pub async fn find_by_code_and_owner(
    db: &Arc<AppDatabase>,
    code: &str,
    owner_id: u32,
) -> Result<Option<OtpCode>, AppError> {
    let filter = Some(doc! {"code": code, "ownerId": owner_id});
    let otp_code = db
        .find_one::<OtpCode>(DB_NAME, COLL_OTP_CODES, filter, None)
        .await?;
    Ok(otp_code)
}

/// Insert a freshly issued code. The unique index on the code column covers
/// all statuses, a collision with any existing row comes back as
/// AlreadyExists.
pub async fn save(db: &Arc<AppDatabase>, otp_code: &OtpCode) -> Result<(), AppError> {
    db.insert_one(DB_NAME, COLL_OTP_CODES, otp_code)
        .await
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                AppError::AlreadyExists("Otp code already exists".into())
            } else {
                err.into()
            }
        })?;
    Ok(())
}

/// One atomic bulk transition of every ACTIVE row past its expiry. Returns
/// the number of rows transitioned. Running it again right away transitions
/// zero rows.
pub async fn expire_active_codes(db: &Arc<AppDatabase>, now: u64) -> Result<u64, AppError> {
    let active = OtpStatus::Active.to_bson()?;
    let expired = OtpStatus::Expired.to_bson()?;
    let filter = doc! {"status": active, "expiresAt": {"$lt": now as i64}};
    let update = doc! {"$set": {"status": expired, "updatedTs": now as i64}};
    let result = db
        .update_many(DB_NAME, COLL_OTP_CODES, filter, update)
        .await?;
    Ok(result.modified_count)
}

/// Compare-and-swap ACTIVE -> USED. Returns false when the row is no longer
/// ACTIVE, i.e. the caller lost the race to the sweep or another validation.
pub async fn mark_used(db: &Arc<AppDatabase>, id: ObjectId) -> Result<bool, AppError> {
    transition_from_active(db, id, OtpStatus::Used).await
}

/// Compare-and-swap ACTIVE -> EXPIRED, used for lazy expiry during
/// validation.
pub async fn mark_expired(db: &Arc<AppDatabase>, id: ObjectId) -> Result<bool, AppError> {
    transition_from_active(db, id, OtpStatus::Expired).await
}

async fn transition_from_active(
    db: &Arc<AppDatabase>,
    id: ObjectId,
    target: OtpStatus,
) -> Result<bool, AppError> {
    let ts = get_epoch_ts() as i64;
    let active = OtpStatus::Active.to_bson()?;
    let target = target.to_bson()?;
    let filter = doc! {"_id": id, "status": active};
    let update = doc! {"$set": {"status": target, "updatedTs": ts}};
    let result = db
        .update_one(DB_NAME, COLL_OTP_CODES, filter, update)
        .await?;
    Ok(result.modified_count > 0)
}

/// Cascading cleanup when the owning user is deleted, the only path that
/// ever destroys code rows.
pub async fn delete_by_owner(db: &Arc<AppDatabase>, owner_id: u32) -> Result<u64, AppError> {
    let filter = doc! {"ownerId": owner_id};
    let deleted = db.delete_many(DB_NAME, COLL_OTP_CODES, filter).await?;
    Ok(deleted)
}
