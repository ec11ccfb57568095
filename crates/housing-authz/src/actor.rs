use crate::Role;

pub type UserId = i64;

/// The party making a request.
///
/// `role` is `None` when the credential carried a role outside the closed
/// set; such actors are authenticated but denied every gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { user_id: UserId, role: Option<Role> },
}

impl Actor {
    pub fn user(user_id: UserId, role: Option<Role>) -> Self {
        Actor::User { user_id, role }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Actor::Anonymous => None,
            Actor::User { user_id, .. } => Some(*user_id),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Actor::Anonymous => None,
            Actor::User { role, .. } => *role,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User { .. })
    }

    pub fn is_administrator(&self) -> bool {
        self.role() == Some(Role::Administrator)
    }
}
