use mockall_double::double;
use std::sync::Arc;

use super::{audit, config, generator, store};
use crate::{
    constants::*,
    models::otp::{OtpCode, OtpConfig, OtpStatus},
    models::user::User,
    notification::{dispatch, NotificationSender},
    utils::{get_epoch_ts, AppError},
};

#[double]
use crate::database::AppDatabase;

/// Issue a new otp code for the given user and operation.
///
/// The code is persisted as an ACTIVE row before anything else happens, the
/// audit record and the notification fan out run as detached tasks after the
/// durable write and can never fail the issuance. The returned code is the
/// secret, it is not re-derivable.
pub async fn issue_code(
    db: &Arc<AppDatabase>,
    user: &User,
    operation_id: i64,
    senders: &[Arc<dyn NotificationSender>],
) -> Result<String, AppError> {
    let config = config::get_otp_config(db).await?;
    let otp_code = persist_new_code(db, user.id, operation_id, &config).await?;
    tracing::info!(
        "generated otp code for user: {}, operation: {}",
        user.username,
        operation_id
    );

    // best effort side paths, failures are contained and logged
    let username = user.username.to_owned();
    let code = otp_code.code.to_owned();
    tokio::spawn(async move {
        if let Err(err) = audit::record_issued(&username, &code, operation_id).await {
            tracing::error!("failed to write otp audit entry: {:?}", err);
        }
    });
    let message = format!("Your verification code: {}", otp_code.code);
    dispatch(&message, user, senders);

    Ok(otp_code.code)
}

async fn persist_new_code(
    db: &Arc<AppDatabase>,
    owner_id: u32,
    operation_id: i64,
    config: &OtpConfig,
) -> Result<OtpCode, AppError> {
    for _ in 0..OTP_MAX_GENERATE_ATTEMPTS {
        let code = generator::generate_code(config.code_length)?;
        let otp_code = OtpCode::new(owner_id, code.as_str(), operation_id, config.ttl_seconds);
        match store::save(db, &otp_code).await {
            Ok(()) => return Ok(otp_code),
            Err(AppError::AlreadyExists(_)) => {
                tracing::warn!("generated otp code collided with an existing one, retrying");
            }
            Err(err) => return Err(err),
        }
    }
    Err(AppError::AnyError(anyhow::anyhow!(
        "could not generate a unique otp code in {OTP_MAX_GENERATE_ATTEMPTS} attempts"
    )))
}

/// Validate a code on behalf of its owner and consume it.
///
/// The lookup is owner scoped, a code issued to someone else reports the
/// same NotFound as a wrong code. A non ACTIVE row reports NotActive before
/// the expiry check so a used code past its ttl still reads as already used.
/// The final transition is a conditional update: when it loses the race to
/// the sweep or a concurrent validation the settled status is re-read and
/// reported, exactly one caller ever wins.
pub async fn validate_code(db: &Arc<AppDatabase>, user: &User, code: &str) -> Result<(), AppError> {
    let otp_code = store::find_by_code_and_owner(db, code, user.id)
        .await?
        .ok_or_else(|| {
            tracing::info!("otp code not found for user: {}", user.id);
            AppError::NotFound("Otp code not found".into())
        })?;

    if otp_code.status != OtpStatus::Active {
        tracing::warn!("attempt to use inactive otp code by user: {}", user.username);
        return Err(AppError::NotActive("Otp code is not active".into()));
    }

    if get_epoch_ts() > otp_code.expires_at {
        // lazy expiry, the sweep has not reached this row yet
        store::mark_expired(db, otp_code.id).await?;
        tracing::warn!("attempt to use expired otp code by user: {}", user.username);
        return Err(AppError::Expired("Otp code expired".into()));
    }

    if !store::mark_used(db, otp_code.id).await? {
        let status = store::find_by_code_and_owner(db, code, user.id)
            .await?
            .map(|settled| settled.status);
        return match status {
            Some(OtpStatus::Expired) => Err(AppError::Expired("Otp code expired".into())),
            _ => Err(AppError::NotActive("Otp code is not active".into())),
        };
    }

    tracing::info!("otp code successfully validated for user: {}", user.username);
    Ok(())
}

/// One sweep pass: a single atomic bulk transition of every ACTIVE row past
/// its expiry. Invoked on a fixed interval by the scheduler job, safe to
/// call directly.
pub async fn sweep(db: &Arc<AppDatabase>) -> Result<u64, AppError> {
    let count = store::expire_active_codes(db, get_epoch_ts()).await?;
    tracing::info!("otp codes expired: {}", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;
    use mongodb::bson::oid::ObjectId;

    use super::*;
    use crate::database::UpdateStat;

    fn test_user() -> User {
        User {
            id: 1,
            username: "tester".to_owned(),
            is_active: true,
            ..Default::default()
        }
    }

    fn test_config() -> OtpConfig {
        OtpConfig {
            id: OTP_CONFIG_ID,
            code_length: 6,
            ttl_seconds: 300,
        }
    }

    fn active_code(expires_at: u64) -> OtpCode {
        OtpCode {
            id: ObjectId::new(),
            code: "Abc123".to_owned(),
            owner_id: 1,
            operation_id: 99,
            status: OtpStatus::Active,
            expires_at,
            created_ts: 0,
            updated_ts: 0,
        }
    }

    #[tokio::test]
    async fn test_issue_code_returns_code_of_configured_length() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpConfig>()
            .times(1)
            .returning(|_, _, _, _| Ok(Some(test_config())));
        mock_db
            .expect_insert_one::<OtpCode>()
            .withf(|_, coll, otp_code| {
                coll == COLL_OTP_CODES
                    && otp_code.status == OtpStatus::Active
                    && otp_code.owner_id == 1
                    && otp_code.operation_id == 99
                    && otp_code.expires_at > otp_code.created_ts
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let db = Arc::new(mock_db);
        let code = issue_code(&db, &test_user(), 99, &[]).await.unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|ch| OTP_CHARSET.contains(ch)));
    }

    #[tokio::test]
    async fn test_issue_code_without_config_fails() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpConfig>()
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        let db = Arc::new(mock_db);
        let result = issue_code(&db, &test_user(), 99, &[]).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_issue_code_surfaces_store_failure() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpConfig>()
            .times(1)
            .returning(|_, _, _, _| Ok(Some(test_config())));
        mock_db
            .expect_insert_one::<OtpCode>()
            .times(1)
            .returning(|_, _, _| {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "connection reset").into())
            });
        let db = Arc::new(mock_db);
        let result = issue_code(&db, &test_user(), 99, &[]).await;
        assert!(matches!(result, Err(AppError::AnyError(_))));
    }

    #[tokio::test]
    async fn test_validate_code_success() {
        let otp_code = active_code(get_epoch_ts() + 60);
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpCode>()
            .times(1)
            .returning(move |_, _, _, _| Ok(Some(otp_code.clone())));
        mock_db.expect_update_one().times(1).returning(|_, _, _, _| {
            Ok(UpdateStat {
                matched_count: 1,
                modified_count: 1,
            })
        });
        let db = Arc::new(mock_db);
        let result = validate_code(&db, &test_user(), "Abc123").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_validate_code_not_found() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpCode>()
            .withf(|_, _, filter, _| {
                // lookup must be owner scoped
                filter
                    .as_ref()
                    .map(|f| f.contains_key("code") && f.contains_key("ownerId"))
                    .unwrap_or(false)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        let db = Arc::new(mock_db);
        let result = validate_code(&db, &test_user(), "Abc123").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_validate_used_code_fails_not_active() {
        let mut used = active_code(get_epoch_ts() - 60);
        used.status = OtpStatus::Used;
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpCode>()
            .times(1)
            .returning(move |_, _, _, _| Ok(Some(used.clone())));
        // no update may be attempted, NotActive wins over Expired for a
        // used code that is also past its ttl
        mock_db.expect_update_one().times(0);
        let db = Arc::new(mock_db);
        let result = validate_code(&db, &test_user(), "Abc123").await;
        assert!(matches!(result, Err(AppError::NotActive(_))));
    }

    #[tokio::test]
    async fn test_validate_expired_code_transitions_lazily() {
        let otp_code = active_code(get_epoch_ts() - 60);
        let id = otp_code.id;
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpCode>()
            .times(1)
            .returning(move |_, _, _, _| Ok(Some(otp_code.clone())));
        mock_db
            .expect_update_one()
            .withf(move |_, _, filter, update| {
                filter.get_object_id("_id").map(|v| v == id).unwrap_or(false)
                    && update
                        .get_document("$set")
                        .and_then(|set| set.get_str("status"))
                        .map(|status| status == "EXPIRED")
                        .unwrap_or(false)
            })
            .times(1)
            .returning(|_, _, _, _| {
                Ok(UpdateStat {
                    matched_count: 1,
                    modified_count: 1,
                })
            });
        let db = Arc::new(mock_db);
        let result = validate_code(&db, &test_user(), "Abc123").await;
        assert!(matches!(result, Err(AppError::Expired(_))));
    }

    #[tokio::test]
    async fn test_validate_lost_race_reports_settled_status() {
        // the row reads ACTIVE but the conditional update loses to the
        // sweep, the re-read observes EXPIRED
        let otp_code = active_code(get_epoch_ts() + 60);
        let mut expired = otp_code.clone();
        expired.status = OtpStatus::Expired;
        let mut seq = Sequence::new();
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_find_one::<OtpCode>()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _, _, _| Ok(Some(otp_code.clone())));
        mock_db
            .expect_update_one()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| {
                Ok(UpdateStat {
                    matched_count: 0,
                    modified_count: 0,
                })
            });
        mock_db
            .expect_find_one::<OtpCode>()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _, _, _| Ok(Some(expired.clone())));
        let db = Arc::new(mock_db);
        let result = validate_code(&db, &test_user(), "Abc123").await;
        assert!(matches!(result, Err(AppError::Expired(_))));
    }

    #[tokio::test]
    async fn test_sweep_reports_transition_count() {
        let mut mock_db = AppDatabase::default();
        mock_db
            .expect_update_many()
            .times(1)
            .returning(|_, _, _, _| {
                Ok(UpdateStat {
                    matched_count: 5,
                    modified_count: 5,
                })
            });
        let db = Arc::new(mock_db);
        let count = sweep(&db).await.unwrap();
        assert_eq!(count, 5);
    }
}
