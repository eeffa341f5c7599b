use mockall_double::double;
use mongodb::bson::doc;
use std::sync::Arc;

use crate::{constants::*, models::user::User, utils::AppError};

#[double]
use crate::database::AppDatabase;

pub mod generate;
pub mod validate;

/// Resolve the authenticated caller to a full user record. Issue and
/// validate both need the contact fields, not just the token claims.
pub(crate) async fn fetch_active_user(
    db: &Arc<AppDatabase>,
    user_id: u32,
) -> Result<User, AppError> {
    let filter = Some(doc! {"id": user_id, "isActive": true});
    let user = db
        .find_one::<User>(DB_NAME, COLL_USERS, filter, None)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found with id: {user_id}")))?;
    Ok(user)
}
