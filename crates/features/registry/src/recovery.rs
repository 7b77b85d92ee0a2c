//! Recovery of foreign tokens held by the registry.
//!
//! Token integrations disagree on how they report a transfer: some return `true`, some
//! return nothing, some return `false` instead of failing. Every answer goes through
//! [`settle_transfer`], the one place that turns a [`TransferSignal`] into a result.

use crate::access::AccessControl;
use crate::error::RegistryError;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use rlist_domain::config::RecipientMode;
use rlist_domain::{Address, RegistryEvent};

/// How the external token capability answered a transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSignal {
    /// The token returned a boolean status.
    Returned(bool),
    /// The token completed without a return value.
    NoReturnValue,
    /// The token aborted with a reason.
    Reverted(String),
    /// Nothing able to transfer lives at the token address.
    NotAContract,
}

/// External capability moving tokens out of the registry's own holdings.
///
/// Implementations are called while the registry is locked and must not call back into it.
pub trait TokenTransfer: Send + Sync {
    fn transfer(&self, token: Address, recipient: Address, amount: u128) -> TransferSignal;
}

/// Normalizes a transfer answer into this crate's result type.
///
/// # Errors
/// - [`RegistryError::TransferFailed`] for `Returned(false)` and for reverts, whose reason is
///   passed through verbatim.
/// - [`RegistryError::InvalidArgument`] if the token address is not a contract.
pub fn settle_transfer(signal: TransferSignal) -> Result<(), RegistryError> {
    match signal {
        TransferSignal::Returned(true) | TransferSignal::NoReturnValue => Ok(()),
        TransferSignal::Returned(false) => {
            Err(RegistryError::transfer("token transfer returned false"))
        },
        TransferSignal::Reverted(reason) => Err(RegistryError::transfer(reason)),
        TransferSignal::NotAContract => Err(RegistryError::invalid("eoa token address")),
    }
}

/// Picks the recipient of a recovery according to the configured mode.
pub(crate) fn resolve_recipient(
    mode: RecipientMode,
    owner: Address,
    requested: Option<Address>,
) -> Result<Address, RegistryError> {
    match mode {
        RecipientMode::CallerSpecified => requested
            .and_then(Address::non_zero)
            .ok_or_else(|| RegistryError::invalid("zero recipient address")),
        RecipientMode::Owner => match requested {
            None => Ok(owner),
            Some(recipient) if recipient == owner => Ok(owner),
            Some(recipient) => Err(RegistryError::invalid(format!(
                "recovered tokens go to the owner, not {recipient}"
            ))),
        },
    }
}

/// Runs a full recovery: owner check, argument checks, transfer, event.
pub(crate) fn recover(
    access: &AccessControl,
    mode: RecipientMode,
    tokens: &dyn TokenTransfer,
    token: Address,
    amount: u128,
    recipient: Option<Address>,
    caller: Address,
) -> Result<RegistryEvent, RegistryError> {
    access.authorize_owner(caller)?;
    if token.is_zero() {
        return Err(RegistryError::invalid("zero token address"));
    }
    let recipient = resolve_recipient(mode, access.current_owner(), recipient)?;

    settle_transfer(tokens.transfer(token, recipient, amount))?;

    Ok(RegistryEvent::TokenRecovered { requested_by: caller, token, amount, recipient })
}

/// Capability of a registry that holds no tokens: every address is reported as a
/// non-contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTokens;

impl TokenTransfer for NoTokens {
    fn transfer(&self, _token: Address, _recipient: Address, _amount: u128) -> TransferSignal {
        TransferSignal::NotAContract
    }
}

/// How a token deployed on a [`MemoryLedger`] reports transfers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenBehaviour {
    /// Returns `true` on success.
    #[default]
    Standard,
    /// Returns nothing on success.
    NoReturnValue,
    /// Returns `false` and moves nothing.
    ReturnsFalse,
}

#[derive(Debug, Clone)]
struct TokenInfo {
    symbol: String,
    behaviour: TokenBehaviour,
}

#[derive(Debug, Default)]
struct LedgerState {
    tokens: FxHashMap<Address, TokenInfo>,
    balances: FxHashMap<(Address, Address), u128>,
}

/// In-process token ledger.
///
/// Keeps balances per `(token, holder)` and transfers out of the balance of `holder`, the
/// identity the registry holds its tokens under. An overdraft reverts with
/// `"<symbol>/insufficient-balance"`.
///
/// ```rust
/// use rlist_domain::Address;
/// use rlist_registry::{MemoryLedger, TokenTransfer, TransferSignal};
///
/// let registry = Address::from_low_u8(0xaa);
/// let dai = Address::from_low_u8(0xd0);
/// let ledger = MemoryLedger::new(registry);
/// ledger.deploy(dai, "Dai");
/// ledger.mint(dai, registry, 10);
///
/// let to = Address::from_low_u8(1);
/// assert_eq!(ledger.transfer(dai, to, 4), TransferSignal::Returned(true));
/// assert_eq!(ledger.balance_of(dai, to), 4);
/// assert_eq!(
///     ledger.transfer(dai, to, 7),
///     TransferSignal::Reverted("Dai/insufficient-balance".into())
/// );
/// ```
#[derive(Debug)]
pub struct MemoryLedger {
    holder: Address,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new(holder: Address) -> Self {
        Self { holder, state: Mutex::default() }
    }

    #[must_use]
    pub const fn holder(&self) -> Address {
        self.holder
    }

    /// Registers a standard token at `token`.
    pub fn deploy(&self, token: Address, symbol: impl Into<String>) {
        self.deploy_with(token, symbol, TokenBehaviour::Standard);
    }

    pub fn deploy_with(&self, token: Address, symbol: impl Into<String>, behaviour: TokenBehaviour) {
        self.state.lock().tokens.insert(token, TokenInfo { symbol: symbol.into(), behaviour });
    }

    /// Credits `amount` to `holder`, saturating at `u128::MAX`.
    pub fn mint(&self, token: Address, holder: Address, amount: u128) {
        let mut state = self.state.lock();
        let balance = state.balances.entry((token, holder)).or_default();
        *balance = balance.saturating_add(amount);
    }

    #[must_use]
    pub fn balance_of(&self, token: Address, holder: Address) -> u128 {
        self.state.lock().balances.get(&(token, holder)).copied().unwrap_or(0)
    }
}

impl TokenTransfer for MemoryLedger {
    fn transfer(&self, token: Address, recipient: Address, amount: u128) -> TransferSignal {
        let mut state = self.state.lock();
        let Some(info) = state.tokens.get(&token).cloned() else {
            return TransferSignal::NotAContract;
        };

        if info.behaviour == TokenBehaviour::ReturnsFalse {
            return TransferSignal::Returned(false);
        }

        let available = state.balances.get(&(token, self.holder)).copied().unwrap_or(0);
        if available < amount {
            return TransferSignal::Reverted(format!("{}/insufficient-balance", info.symbol));
        }

        state.balances.insert((token, self.holder), available - amount);
        let credited = state.balances.entry((token, recipient)).or_default();
        *credited = credited.saturating_add(amount);

        match info.behaviour {
            TokenBehaviour::NoReturnValue => TransferSignal::NoReturnValue,
            TokenBehaviour::Standard | TokenBehaviour::ReturnsFalse => TransferSignal::Returned(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const OWNER: Address = Address::from_low_u8(1);
    const OTHER: Address = Address::from_low_u8(2);

    #[test]
    fn settle_transfer_normalizes_every_signal() {
        assert!(settle_transfer(TransferSignal::Returned(true)).is_ok());
        assert!(settle_transfer(TransferSignal::NoReturnValue).is_ok());

        let err = settle_transfer(TransferSignal::Returned(false)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(err.message(), "token transfer returned false");

        let err = settle_transfer(TransferSignal::Reverted("Dai/insufficient-balance".into()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransferFailed);
        assert_eq!(err.message(), "Dai/insufficient-balance");

        let err = settle_transfer(TransferSignal::NotAContract).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "eoa token address");
    }

    #[test]
    fn caller_specified_mode_requires_a_recipient() {
        let mode = RecipientMode::CallerSpecified;
        assert_eq!(resolve_recipient(mode, OWNER, Some(OTHER)).unwrap(), OTHER);

        for requested in [None, Some(Address::ZERO)] {
            let err = resolve_recipient(mode, OWNER, requested).unwrap_err();
            assert_eq!(err.message(), "zero recipient address");
        }
    }

    #[test]
    fn owner_mode_always_pays_the_owner() {
        let mode = RecipientMode::Owner;
        assert_eq!(resolve_recipient(mode, OWNER, None).unwrap(), OWNER);
        assert_eq!(resolve_recipient(mode, OWNER, Some(OWNER)).unwrap(), OWNER);
        assert_eq!(
            resolve_recipient(mode, OWNER, Some(OTHER)).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn ledger_behaviours() {
        let holder = Address::from_low_u8(0xaa);
        let silent = Address::from_low_u8(0xb0);
        let liar = Address::from_low_u8(0xb1);
        let ledger = MemoryLedger::new(holder);
        ledger.deploy_with(silent, "SIL", TokenBehaviour::NoReturnValue);
        ledger.deploy_with(liar, "LIE", TokenBehaviour::ReturnsFalse);
        ledger.mint(silent, holder, 5);
        ledger.mint(liar, holder, 5);

        assert_eq!(ledger.transfer(silent, OWNER, 5), TransferSignal::NoReturnValue);
        assert_eq!(ledger.balance_of(silent, OWNER), 5);
        assert_eq!(ledger.balance_of(silent, holder), 0);

        assert_eq!(ledger.transfer(liar, OWNER, 1), TransferSignal::Returned(false));
        assert_eq!(ledger.balance_of(liar, holder), 5);

        assert_eq!(ledger.transfer(OTHER, OWNER, 1), TransferSignal::NotAContract);
        assert_eq!(NoTokens.transfer(silent, OWNER, 1), TransferSignal::NotAContract);
    }
}
