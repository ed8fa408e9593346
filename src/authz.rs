//! Owner-or-admin authorization predicate.

use uuid::Uuid;

use crate::models::user::Role;

/// True iff the actor is an admin or owns the resource. Resources without an
/// owner (`owner_id == None`) are modifiable by admins only.
pub fn can_modify(actor_id: Uuid, actor_role: Role, owner_id: Option<Uuid>) -> bool {
    actor_role.is_admin() || owner_id == Some(actor_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_modify_anything() {
        let admin = Uuid::new_v4();
        assert!(can_modify(admin, Role::Admin, Some(Uuid::new_v4())));
        assert!(can_modify(admin, Role::Admin, None));
    }

    #[test]
    fn owner_can_modify_own_resource() {
        let owner = Uuid::new_v4();
        assert!(can_modify(owner, Role::User, Some(owner)));
    }

    #[test]
    fn non_owner_user_is_rejected() {
        let actor = Uuid::new_v4();
        assert!(!can_modify(actor, Role::User, Some(Uuid::new_v4())));
        assert!(!can_modify(actor, Role::User, None));
    }
}
