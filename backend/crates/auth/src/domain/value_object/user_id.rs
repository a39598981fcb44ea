//! User ID Value Object

use kernel::id::Id;

pub struct UserMarker;

/// Typed UUID v4 identifier for users
pub type UserId = Id<UserMarker>;
