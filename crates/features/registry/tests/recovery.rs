use rlist_domain::config::RecipientMode;
use rlist_domain::{Address, RegistryEvent};
use rlist_registry::*;
use std::sync::Arc;

const OWNER: Address = Address::from_low_u8(1);
const MANAGER: Address = Address::from_low_u8(2);
const RECIPIENT: Address = Address::from_low_u8(5);
const HOLDER: Address = Address::from_low_u8(0xaa);
const DAI: Address = Address::from_low_u8(0xd0);
const USDT: Address = Address::from_low_u8(0xd1);
const BROKEN: Address = Address::from_low_u8(0xd2);
const EOA: Address = Address::from_low_u8(0xee);

fn ledger() -> Arc<MemoryLedger> {
    let ledger = Arc::new(MemoryLedger::new(HOLDER));
    ledger.deploy(DAI, "Dai");
    ledger.deploy_with(USDT, "USDT", TokenBehaviour::NoReturnValue);
    ledger.deploy_with(BROKEN, "BRK", TokenBehaviour::ReturnsFalse);
    for token in [DAI, USDT, BROKEN] {
        ledger.mint(token, HOLDER, 1_000);
    }
    ledger
}

fn list(mode: RecipientMode, ledger: &Arc<MemoryLedger>) -> RelayAllowedList {
    let list = RelayAllowedList::builder()
        .recipient_mode(mode)
        .tokens(Arc::clone(ledger) as Arc<dyn TokenTransfer>)
        .owner(OWNER)
        .build()
        .unwrap();
    list.set_manager(MANAGER, OWNER).unwrap();
    list
}

#[test]
fn owner_recovers_to_a_named_recipient() {
    let ledger = ledger();
    let list = list(RecipientMode::CallerSpecified, &ledger);

    list.recover_token(DAI, 250, Some(RECIPIENT), OWNER).unwrap();

    assert_eq!(ledger.balance_of(DAI, RECIPIENT), 250);
    assert_eq!(ledger.balance_of(DAI, HOLDER), 750);
    assert_eq!(
        list.journal().last().unwrap().event,
        RegistryEvent::TokenRecovered {
            requested_by: OWNER,
            token: DAI,
            amount: 250,
            recipient: RECIPIENT
        }
    );
}

#[test]
fn tokens_without_return_value_count_as_success() {
    let ledger = ledger();
    let list = list(RecipientMode::CallerSpecified, &ledger);

    list.recover_token(USDT, 1_000, Some(RECIPIENT), OWNER).unwrap();
    assert_eq!(ledger.balance_of(USDT, RECIPIENT), 1_000);
}

#[test]
fn owner_mode_sends_to_the_owner() {
    let ledger = ledger();
    let list = list(RecipientMode::Owner, &ledger);

    list.recover_token(DAI, 10, None, OWNER).unwrap();
    assert_eq!(ledger.balance_of(DAI, OWNER), 10);

    let err = list.recover_token(DAI, 10, Some(RECIPIENT), OWNER).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.balance_of(DAI, RECIPIENT), 0);
}

#[test]
fn recovery_failures_leave_no_trace() {
    let ledger = ledger();
    let list = list(RecipientMode::CallerSpecified, &ledger);
    let journal_len = list.journal().len();

    let cases = [
        (DAI, 1, Some(RECIPIENT), MANAGER, ErrorKind::Unauthorized, None),
        (Address::ZERO, 1, Some(RECIPIENT), OWNER, ErrorKind::InvalidArgument, Some("zero token address")),
        (DAI, 1, None, OWNER, ErrorKind::InvalidArgument, Some("zero recipient address")),
        (DAI, 1, Some(Address::ZERO), OWNER, ErrorKind::InvalidArgument, Some("zero recipient address")),
        (EOA, 1, Some(RECIPIENT), OWNER, ErrorKind::InvalidArgument, Some("eoa token address")),
        (DAI, 5_000, Some(RECIPIENT), OWNER, ErrorKind::TransferFailed, Some("Dai/insufficient-balance")),
        (BROKEN, 1, Some(RECIPIENT), OWNER, ErrorKind::TransferFailed, Some("token transfer returned false")),
    ];

    for (token, amount, recipient, caller, kind, message) in cases {
        let err = list.recover_token(token, amount, recipient, caller).unwrap_err();
        assert_eq!(err.kind(), kind, "{err}");
        if let Some(message) = message {
            assert_eq!(err.message(), message);
        }
    }

    assert_eq!(list.journal().len(), journal_len);
    assert_eq!(ledger.balance_of(DAI, HOLDER), 1_000);
    assert_eq!(ledger.balance_of(BROKEN, HOLDER), 1_000);
}

#[test]
fn default_capability_holds_no_tokens() {
    let list = RelayAllowedList::builder().owner(OWNER).build().unwrap();
    let err = list.recover_token(DAI, 1, Some(RECIPIENT), OWNER).unwrap_err();
    assert_eq!(err.message(), "eoa token address");
}
