use mockall_double::double;
use mongodb::bson::{doc, Document};
use std::sync::Arc;

use crate::{
    constants::*,
    database::is_duplicate_key_error,
    models::otp::OtpConfig,
    utils::AppError,
};

#[double]
use crate::database::AppDatabase;

/// Read the current otp config, issuance is impossible without one
pub async fn get_otp_config(db: &Arc<AppDatabase>) -> Result<OtpConfig, AppError> {
    let filter = Some(doc! {"_id": OTP_CONFIG_ID});
    let config = db
        .find_one::<OtpConfig>(DB_NAME, COLL_OTP_CONFIG, filter, None)
        .await?
        .ok_or_else(|| {
            tracing::info!("otp config not found");
            AppError::NotFound("Otp config not found".into())
        })?;
    Ok(config)
}

/// Create the singleton config. The fixed _id makes concurrent creates race
/// on the primary key: exactly one insert wins, the others surface the
/// duplicate key error as AlreadyExists.
pub async fn create_otp_config(
    db: &Arc<AppDatabase>,
    code_length: u32,
    ttl_seconds: u64,
) -> Result<OtpConfig, AppError> {
    let config = OtpConfig {
        id: OTP_CONFIG_ID,
        code_length,
        ttl_seconds,
    };
    db.insert_one(DB_NAME, COLL_OTP_CONFIG, &config)
        .await
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                tracing::info!("otp config already exists");
                AppError::AlreadyExists("Otp config already exists".into())
            } else {
                err.into()
            }
        })?;
    tracing::info!("otp config created: {:?}", config);
    Ok(config)
}

/// Partial update: only the supplied fields change, the rest keep their
/// prior values. Codes issued earlier keep the expiry they were created with.
pub async fn update_otp_config(
    db: &Arc<AppDatabase>,
    code_length: Option<u32>,
    ttl_seconds: Option<u64>,
) -> Result<OtpConfig, AppError> {
    let mut set = Document::new();
    if let Some(code_length) = code_length {
        set.insert("codeLength", code_length as i32);
    }
    if let Some(ttl_seconds) = ttl_seconds {
        set.insert("ttlSeconds", ttl_seconds as i64);
    }
    if !set.is_empty() {
        let filter = doc! {"_id": OTP_CONFIG_ID};
        let update = doc! {"$set": set};
        let result = db
            .update_one(DB_NAME, COLL_OTP_CONFIG, filter, update)
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound("Otp config not found".into()));
        }
        tracing::info!("otp config updated");
    }
    get_otp_config(db).await
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::database::UpdateStat;

    fn test_config() -> OtpConfig {
        OtpConfig {
            id: OTP_CONFIG_ID,
            code_length: 6,
            ttl_seconds: 300,
        }
    }

    #[tokio::test]
    async fn test_get_otp_config_not_found() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpConfig>()
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        let db = Arc::new(mock_db);
        let result = get_otp_config(&db).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_otp_config() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_insert_one::<OtpConfig>()
            .withf(|_, _, config| {
                config.id == OTP_CONFIG_ID && config.code_length == 6 && config.ttl_seconds == 300
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let db = Arc::new(mock_db);
        let config = create_otp_config(&db, 6, 300).await.unwrap();
        assert_eq!(config, test_config());
    }

    #[tokio::test]
    async fn test_update_otp_config_partial() {
        // only the supplied field lands in the $set document
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_update_one()
            .with(
                eq(DB_NAME),
                eq(COLL_OTP_CONFIG),
                eq(doc! {"_id": OTP_CONFIG_ID}),
                eq(doc! {"$set": {"ttlSeconds": 600_i64}}),
            )
            .times(1)
            .returning(|_, _, _, _| {
                Ok(UpdateStat {
                    matched_count: 1,
                    modified_count: 1,
                })
            });
        mock_db
            .expect_find_one::<OtpConfig>()
            .times(1)
            .returning(|_, _, _, _| {
                Ok(Some(OtpConfig {
                    id: OTP_CONFIG_ID,
                    code_length: 6,
                    ttl_seconds: 600,
                }))
            });
        let db = Arc::new(mock_db);
        let config = update_otp_config(&db, None, Some(600)).await.unwrap();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.ttl_seconds, 600);
    }

    #[tokio::test]
    async fn test_update_otp_config_absent() {
        let mut mock_db = AppDatabase::default();
        mock_db.expect_update_one().times(1).returning(|_, _, _, _| {
            Ok(UpdateStat {
                matched_count: 0,
                modified_count: 0,
            })
        });
        let db = Arc::new(mock_db);
        let result = update_otp_config(&db, Some(8), None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
