use crate::core::errors::{ApiError, ApiResult};

/// A resource with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> &str;

    /// Human-readable name used in rejection messages.
    fn resource_name(&self) -> &'static str {
        "resource"
    }
}

/// Rejects the mutation unless `actor` owns `resource`.
pub fn assert_owner<R: Owned + ?Sized>(resource: &R, actor: &str) -> ApiResult<()> {
    if resource.owner_id() != actor {
        log::warn!(
            "user {} denied mutation of {} owned by {}",
            actor,
            resource.resource_name(),
            resource.owner_id()
        );
        return Err(ApiError::Unauthorized(format!(
            "User not authorized to modify this {}",
            resource.resource_name()
        )));
    }
    Ok(())
}
