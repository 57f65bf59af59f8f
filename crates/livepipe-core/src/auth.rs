use crate::ids::UserId;

/// Identity established by a successful session verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

impl AuthenticatedUser {
    pub const fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
