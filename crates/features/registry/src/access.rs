//! Owner and manager roles.
//!
//! The owner is the only identity allowed to change roles or recover tokens. Depending on
//! the [`AccessPolicy`] fixed at construction, relay mutations are allowed to the owner
//! alone or to the owner and an optional delegated manager.

use crate::error::RegistryError;
use rlist_domain::config::AccessPolicy;
use rlist_domain::{Address, RegistryEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    owner: Address,
    manager: Option<Address>,
    policy: AccessPolicy,
}

impl AccessControl {
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if `owner` is the zero address.
    pub fn new(owner: Address, policy: AccessPolicy) -> Result<Self, RegistryError> {
        let owner = owner.non_zero().ok_or_else(|| RegistryError::invalid("zero owner address"))?;
        Ok(Self { owner, manager: None, policy })
    }

    pub(crate) fn with_manager(mut self, manager: Address) -> Result<Self, RegistryError> {
        if let Some(manager) = manager.non_zero() {
            if self.policy == AccessPolicy::OwnerOnly {
                return Err(RegistryError::invalid("manager set under an owner-only policy"));
            }
            self.manager = Some(manager);
        }
        Ok(self)
    }

    #[must_use]
    pub const fn current_owner(&self) -> Address {
        self.owner
    }

    /// The manager, or [`Address::ZERO`] when none is set.
    #[must_use]
    pub fn current_manager(&self) -> Address {
        self.manager.unwrap_or(Address::ZERO)
    }

    #[must_use]
    pub const fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// # Errors
    /// Returns [`RegistryError::Unauthorized`] unless `caller` is the owner.
    pub fn authorize_owner(&self, caller: Address) -> Result<(), RegistryError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(RegistryError::unauthorized(format!("{caller} is not owner")))
        }
    }

    /// # Errors
    /// Returns [`RegistryError::Unauthorized`] unless `caller` is the owner or the
    /// currently set manager.
    pub fn authorize_owner_or_manager(&self, caller: Address) -> Result<(), RegistryError> {
        if caller == self.owner || self.manager == Some(caller) {
            Ok(())
        } else {
            Err(RegistryError::unauthorized(format!("{caller} is not owner or manager")))
        }
    }

    /// The single gate of relay mutations, resolved through the configured policy.
    ///
    /// # Errors
    /// Returns [`RegistryError::Unauthorized`] if the policy does not admit `caller`.
    pub fn authorize_registry_mutation(&self, caller: Address) -> Result<(), RegistryError> {
        match self.policy {
            AccessPolicy::OwnerOnly => self.authorize_owner(caller),
            AccessPolicy::OwnerOrManager => self.authorize_owner_or_manager(caller),
        }
    }

    pub(crate) fn check_change_owner(
        &self,
        new_owner: Address,
        caller: Address,
    ) -> Result<(), RegistryError> {
        self.authorize_owner(caller)?;
        if new_owner.is_zero() {
            return Err(RegistryError::invalid("zero owner address"));
        }
        if new_owner == self.owner {
            return Err(RegistryError::invalid("same owner"));
        }
        Ok(())
    }

    pub(crate) fn change_owner(&mut self, new_owner: Address) -> RegistryEvent {
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        RegistryEvent::OwnerChanged { previous_owner, new_owner }
    }

    pub(crate) fn check_set_manager(
        &self,
        new_manager: Address,
        caller: Address,
    ) -> Result<(), RegistryError> {
        self.authorize_owner(caller)?;
        if self.policy == AccessPolicy::OwnerOnly {
            return Err(RegistryError::precondition(
                "manager role is disabled by the owner-only policy",
            ));
        }
        if new_manager.is_zero() {
            return Err(RegistryError::invalid("zero manager address"));
        }
        if self.manager == Some(new_manager) {
            return Err(RegistryError::invalid("same manager"));
        }
        Ok(())
    }

    pub(crate) fn set_manager(&mut self, new_manager: Address) -> RegistryEvent {
        self.manager = Some(new_manager);
        RegistryEvent::ManagerChanged { new_manager }
    }

    pub(crate) fn check_dismiss_manager(&self, caller: Address) -> Result<(), RegistryError> {
        self.authorize_owner(caller)?;
        if self.manager.is_none() {
            return Err(RegistryError::precondition("no manager to dismiss"));
        }
        Ok(())
    }

    pub(crate) fn dismiss_manager(&mut self) -> RegistryEvent {
        self.manager = None;
        RegistryEvent::ManagerChanged { new_manager: Address::ZERO }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const OWNER: Address = Address::from_low_u8(1);
    const MANAGER: Address = Address::from_low_u8(2);
    const STRANGER: Address = Address::from_low_u8(3);

    fn managed() -> AccessControl {
        let mut access = AccessControl::new(OWNER, AccessPolicy::OwnerOrManager).unwrap();
        access.check_set_manager(MANAGER, OWNER).unwrap();
        access.set_manager(MANAGER);
        access
    }

    #[test]
    fn zero_owner_is_rejected() {
        let err = AccessControl::new(Address::ZERO, AccessPolicy::OwnerOnly).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "zero owner address");
    }

    #[test]
    fn zero_caller_never_matches_absent_manager() {
        let access = AccessControl::new(OWNER, AccessPolicy::OwnerOrManager).unwrap();
        assert_eq!(access.current_manager(), Address::ZERO);
        let err = access.authorize_owner_or_manager(Address::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn policy_selects_the_mutation_gate() {
        let access = managed();
        assert!(access.authorize_registry_mutation(MANAGER).is_ok());
        assert!(access.authorize_registry_mutation(OWNER).is_ok());
        assert!(access.authorize_registry_mutation(STRANGER).is_err());

        let owner_only = AccessControl::new(OWNER, AccessPolicy::OwnerOnly).unwrap();
        assert!(owner_only.authorize_registry_mutation(OWNER).is_ok());
        assert!(owner_only.authorize_registry_mutation(MANAGER).is_err());
    }

    #[test]
    fn owner_checks_run_before_argument_checks() {
        let access = managed();
        let err = access.check_change_owner(Address::ZERO, MANAGER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);

        let err = access.check_change_owner(OWNER, OWNER).unwrap_err();
        assert_eq!(err.message(), "same owner");
    }

    #[test]
    fn owner_and_manager_may_coincide() {
        let mut access = managed();
        access.check_set_manager(OWNER, OWNER).unwrap();
        assert_eq!(access.set_manager(OWNER), RegistryEvent::ManagerChanged { new_manager: OWNER });
        assert_eq!(access.current_manager(), OWNER);
    }

    #[test]
    fn owner_only_policy_disables_manager_role() {
        let access = AccessControl::new(OWNER, AccessPolicy::OwnerOnly).unwrap();
        let err = access.check_set_manager(MANAGER, OWNER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);

        let err = access.with_manager(MANAGER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn dismiss_requires_a_manager() {
        let mut access = managed();
        access.check_dismiss_manager(OWNER).unwrap();
        assert_eq!(
            access.dismiss_manager(),
            RegistryEvent::ManagerChanged { new_manager: Address::ZERO }
        );

        let err = access.check_dismiss_manager(OWNER).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
    }
}
