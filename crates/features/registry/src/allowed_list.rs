use crate::access::AccessControl;
use crate::error::RegistryError;
use crate::events::{self, EventJournal, JournalRecord};
use crate::recovery::{self, NoTokens, TokenTransfer};
use crate::relays::RelayRegistry;
use crate::snapshot::{RegistrySnapshot, SNAPSHOT_FORMAT};
use parking_lot::Mutex;
use private::Sealed;
use rlist_domain::config::{AccessPolicy, RecipientMode, RegistryConfig};
use rlist_domain::{Address, RegistryEvent, RegistryVersion, Relay, Relays};
use rlist_event_bus::{EventBus, EventBusError};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct NoOwner;
#[derive(Debug)]
pub struct WithOwner(Address);
#[derive(Debug)]
pub struct FromSnapshot(RegistrySnapshot);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoOwner {}
impl Sealed for WithOwner {}
impl Sealed for FromSnapshot {}

/// Builder of a [`RelayAllowedList`].
///
/// A registry starts either fresh from an owner ([`Self::owner`]) or from a persisted
/// [`RegistrySnapshot`] ([`Self::snapshot`]); only those two states can be built.
#[allow(private_bounds)]
pub struct AllowedListBuilder<S: Sealed = NoOwner> {
    state: S,
    config: RegistryConfig,
    tokens: Arc<dyn TokenTransfer>,
    bus: Option<EventBus>,
}

#[allow(private_bounds)]
impl<S: Sealed + fmt::Debug> fmt::Debug for AllowedListBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllowedListBuilder")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

#[allow(private_bounds)]
impl<S: Sealed> AllowedListBuilder<S> {
    /// Token capability used by [`RelayAllowedList::recover_token`]. Defaults to [`NoTokens`].
    #[must_use]
    pub fn tokens(mut self, tokens: Arc<dyn TokenTransfer>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Publishes events on a shared bus instead of a private one.
    #[must_use]
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    fn transition<N: Sealed>(self, state: N) -> AllowedListBuilder<N> {
        AllowedListBuilder { state, config: self.config, tokens: self.tokens, bus: self.bus }
    }
}

impl AllowedListBuilder<NoOwner> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: NoOwner,
            config: RegistryConfig::default(),
            tokens: Arc::new(NoTokens),
            bus: None,
        }
    }

    /// Replaces capacity, policy and recipient mode at once.
    #[must_use]
    pub const fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    #[must_use]
    pub const fn policy(mut self, policy: AccessPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    #[must_use]
    pub const fn recipient_mode(mut self, mode: RecipientMode) -> Self {
        self.config.recovery_recipient = mode;
        self
    }

    #[must_use]
    pub fn owner(self, owner: Address) -> AllowedListBuilder<WithOwner> {
        self.transition(WithOwner(owner))
    }

    /// Restores a persisted registry; the snapshot carries its own configuration.
    #[must_use]
    pub fn snapshot(self, snapshot: RegistrySnapshot) -> AllowedListBuilder<FromSnapshot> {
        self.transition(FromSnapshot(snapshot))
    }
}

impl Default for AllowedListBuilder<NoOwner> {
    fn default() -> Self {
        Self::new()
    }
}

impl AllowedListBuilder<WithOwner> {
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] for a zero owner or a zero capacity.
    pub fn build(self) -> Result<RelayAllowedList, RegistryError> {
        let access = AccessControl::new(self.state.0, self.config.policy)?;
        let relays = RelayRegistry::new(self.config.capacity)?;
        info!(
            owner = %access.current_owner(),
            capacity = relays.capacity(),
            policy = ?access.policy(),
            "Relay allowed list created"
        );
        RelayAllowedList::assemble(
            access,
            relays,
            self.config.recovery_recipient,
            self.tokens,
            self.bus,
        )
    }
}

impl AllowedListBuilder<FromSnapshot> {
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if the snapshot has an unknown format, a
    /// zero owner, a manager under an owner-only policy, empty or duplicate URIs, more
    /// relays than its capacity, or a version lower than its relay count.
    pub fn build(self) -> Result<RelayAllowedList, RegistryError> {
        let snapshot = self.state.0;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(RegistryError::invalid(format!(
                "unsupported snapshot format {}",
                snapshot.format
            )));
        }

        let access =
            AccessControl::new(snapshot.owner, snapshot.policy)?.with_manager(snapshot.manager)?;
        let relays =
            RelayRegistry::from_parts(snapshot.relays, snapshot.capacity, snapshot.version)?;
        info!(
            owner = %access.current_owner(),
            relays = relays.len(),
            version = relays.version(),
            "Relay allowed list restored"
        );
        RelayAllowedList::assemble(
            access,
            relays,
            snapshot.recovery_recipient,
            self.tokens,
            self.bus,
        )
    }
}

struct State {
    access: AccessControl,
    relays: RelayRegistry,
    recipient_mode: RecipientMode,
    journal: EventJournal,
}

/// The relay allowed list.
///
/// One explicitly constructed instance holds the whole registry. Every call locks the
/// state once, validates completely, and only then mutates and emits, so a call either
/// happens entirely or not at all, even when the instance is shared across threads.
///
/// ```rust
/// use rlist_domain::{Address, Relays};
/// use rlist_registry::RelayAllowedList;
///
/// let owner = Address::from_low_u8(1);
/// let list = RelayAllowedList::builder().capacity(2).owner(owner).build().unwrap();
///
/// assert_eq!(list.get_relays(), Relays::Empty);
/// list.add_relay("https://relay.test", "Operator", true, "", owner).unwrap();
/// assert_eq!(list.get_registry_version(), 1);
/// ```
pub struct RelayAllowedList {
    state: Mutex<State>,
    bus: EventBus,
    tokens: Arc<dyn TokenTransfer>,
}

impl fmt::Debug for RelayAllowedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RelayAllowedList")
            .field("access", &state.access)
            .field("relays", &state.relays)
            .field("recipient_mode", &state.recipient_mode)
            .finish_non_exhaustive()
    }
}

impl RelayAllowedList {
    #[must_use]
    pub fn builder() -> AllowedListBuilder {
        AllowedListBuilder::new()
    }

    /// Shorthand for `builder().snapshot(snapshot).build()`.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if the snapshot violates a registry invariant.
    pub fn restore(snapshot: RegistrySnapshot) -> Result<Self, RegistryError> {
        Self::builder().snapshot(snapshot).build()
    }

    fn assemble(
        access: AccessControl,
        relays: RelayRegistry,
        recipient_mode: RecipientMode,
        tokens: Arc<dyn TokenTransfer>,
        bus: Option<EventBus>,
    ) -> Result<Self, RegistryError> {
        let bus = bus.unwrap_or_default();
        bus.subscribe::<RegistryEvent>().map_err(bus_error)?;
        bus.publish_latest(RegistryVersion(relays.version())).map_err(bus_error)?;

        Ok(Self {
            state: Mutex::new(State {
                access,
                relays,
                recipient_mode,
                journal: EventJournal::default(),
            }),
            bus,
            tokens,
        })
    }

    #[must_use]
    pub fn current_owner(&self) -> Address {
        self.state.lock().access.current_owner()
    }

    /// The manager, or [`Address::ZERO`] when none is set.
    #[must_use]
    pub fn current_manager(&self) -> Address {
        self.state.lock().access.current_manager()
    }

    /// Configuration fixed at construction.
    #[must_use]
    pub fn config(&self) -> RegistryConfig {
        let state = self.state.lock();
        RegistryConfig {
            capacity: state.relays.capacity(),
            policy: state.access.policy(),
            recovery_recipient: state.recipient_mode,
        }
    }

    /// Hands ownership to `new_owner`.
    ///
    /// # Errors
    /// [`RegistryError::Unauthorized`] unless `caller` is the owner;
    /// [`RegistryError::InvalidArgument`] for a zero or unchanged owner.
    pub fn change_owner(&self, new_owner: Address, caller: Address) -> Result<(), RegistryError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.access.check_change_owner(new_owner, caller)?;

        let event = state.access.change_owner(new_owner);
        events::emit(&mut state.journal, &self.bus, [event]);
        debug!(%caller, %new_owner, "Owner changed");
        Ok(())
    }

    /// Delegates relay management to `new_manager`.
    ///
    /// # Errors
    /// [`RegistryError::Unauthorized`] unless `caller` is the owner;
    /// [`RegistryError::PreconditionFailed`] under [`AccessPolicy::OwnerOnly`];
    /// [`RegistryError::InvalidArgument`] for a zero or unchanged manager.
    pub fn set_manager(&self, new_manager: Address, caller: Address) -> Result<(), RegistryError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.access.check_set_manager(new_manager, caller)?;

        let event = state.access.set_manager(new_manager);
        events::emit(&mut state.journal, &self.bus, [event]);
        debug!(%caller, %new_manager, "Manager set");
        Ok(())
    }

    /// Removes the manager.
    ///
    /// # Errors
    /// [`RegistryError::Unauthorized`] unless `caller` is the owner;
    /// [`RegistryError::PreconditionFailed`] when no manager is set.
    pub fn dismiss_manager(&self, caller: Address) -> Result<(), RegistryError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.access.check_dismiss_manager(caller)?;

        let event = state.access.dismiss_manager();
        events::emit(&mut state.journal, &self.bus, [event]);
        debug!(%caller, "Manager dismissed");
        Ok(())
    }

    /// Appends a relay and bumps the version.
    ///
    /// # Errors
    /// Checked in this order: [`RegistryError::Unauthorized`],
    /// [`RegistryError::InvalidArgument`] (empty URI), [`RegistryError::AlreadyExists`],
    /// [`RegistryError::CapacityExceeded`], then [`RegistryError::PreconditionFailed`] once the
    /// version counter can no longer advance.
    pub fn add_relay(
        &self,
        uri: impl Into<String>,
        operator: impl Into<String>,
        is_mandatory: bool,
        description: impl Into<String>,
        caller: Address,
    ) -> Result<(), RegistryError> {
        let relay = Relay::new(uri, operator, is_mandatory, description);
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.access.authorize_registry_mutation(caller)?;
        state.relays.check_add(&relay)?;

        let uri = relay.uri.clone();
        let emitted = state.relays.add(relay);
        events::emit(&mut state.journal, &self.bus, emitted);
        debug!(%caller, %uri, version = state.relays.version(), "Relay added");
        Ok(())
    }

    /// Swap-removes the relay with `uri` and bumps the version.
    ///
    /// The last relay takes the removed relay's position.
    ///
    /// # Errors
    /// Checked in this order: [`RegistryError::Unauthorized`],
    /// [`RegistryError::InvalidArgument`] (empty URI), [`RegistryError::NotFound`],
    /// [`RegistryError::PreconditionFailed`] (exhausted version counter).
    pub fn remove_relay(&self, uri: &str, caller: Address) -> Result<(), RegistryError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.access.authorize_registry_mutation(caller)?;
        let index = state.relays.check_remove(uri)?;

        let emitted = state.relays.remove(index);
        events::emit(&mut state.journal, &self.bus, emitted);
        debug!(%caller, uri, index, version = state.relays.version(), "Relay removed");
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] when no relay has this URI.
    pub fn get_relay_by_uri(&self, uri: &str) -> Result<Relay, RegistryError> {
        self.state.lock().relays.get(uri)
    }

    /// All relays in storage order, or [`Relays::Empty`].
    #[must_use]
    pub fn get_relays(&self) -> Relays {
        self.state.lock().relays.list()
    }

    #[must_use]
    pub fn get_relays_amount(&self) -> usize {
        self.state.lock().relays.len()
    }

    #[must_use]
    pub fn get_registry_version(&self) -> u64 {
        self.state.lock().relays.version()
    }

    /// Sends `amount` of `token` held by the registry to a recipient.
    ///
    /// With [`RecipientMode::CallerSpecified`] `recipient` is required; with
    /// [`RecipientMode::Owner`] it may be omitted and must be the owner if given.
    ///
    /// # Errors
    /// [`RegistryError::Unauthorized`] unless `caller` is the owner;
    /// [`RegistryError::InvalidArgument`] for a zero token, a missing or disallowed recipient,
    /// or a token address that is not a contract;
    /// [`RegistryError::TransferFailed`] when the token refuses or reverts.
    pub fn recover_token(
        &self,
        token: Address,
        amount: u128,
        recipient: Option<Address>,
        caller: Address,
    ) -> Result<(), RegistryError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let event = recovery::recover(
            &state.access,
            state.recipient_mode,
            self.tokens.as_ref(),
            token,
            amount,
            recipient,
            caller,
        )?;
        events::emit(&mut state.journal, &self.bus, [event]);
        debug!(%caller, %token, amount, "Token recovered");
        Ok(())
    }

    /// Receives every event emitted after this call.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if a shared bus carries
    /// [`RegistryEvent`] on a watch channel.
    pub fn subscribe(&self) -> Result<broadcast::Receiver<Arc<RegistryEvent>>, EventBusError> {
        self.bus.subscribe()
    }

    /// Follows the registry version.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if a shared bus carries
    /// [`RegistryVersion`] on a broadcast channel.
    pub fn watch_version(&self) -> Result<watch::Receiver<Arc<RegistryVersion>>, EventBusError> {
        self.bus.watch(RegistryVersion(self.get_registry_version()))
    }

    /// Copy of the audit journal.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalRecord> {
        self.state.lock().journal.records().to_vec()
    }

    /// Takes the retained journal records, leaving the journal empty.
    ///
    /// The journal grows with every successful call; long-running hosts drain it
    /// periodically. Later records continue the sequence.
    pub fn drain_journal(&self) -> Vec<JournalRecord> {
        self.state.lock().journal.drain()
    }

    /// Captures the complete state, relays in storage order.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.lock();
        RegistrySnapshot {
            format: SNAPSHOT_FORMAT,
            owner: state.access.current_owner(),
            manager: state.access.current_manager(),
            version: state.relays.version(),
            capacity: state.relays.capacity(),
            policy: state.access.policy(),
            recovery_recipient: state.recipient_mode,
            relays: state.relays.entries().to_vec(),
        }
    }
}

fn bus_error(err: EventBusError) -> RegistryError {
    RegistryError::PreconditionFailed {
        message: err.to_string().into(),
        context: Some("event bus".into()),
    }
}
