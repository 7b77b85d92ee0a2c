use crate::args::Command;
use anyhow::{Context, Result, bail};
use rlist_domain::config::RegistryConfig;
use rlist_domain::{Address, Relays};
use rlist_registry::{RegistryError, RegistrySnapshot, RelayAllowedList};
use rlist_storage::SnapshotStore;
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

pub(crate) async fn run(
    command: Command,
    defaults: RegistryConfig,
    store: &SnapshotStore,
) -> Result<()> {
    match command {
        Command::Init { owner, capacity, policy, recipient } => {
            let config = RegistryConfig {
                capacity: capacity.unwrap_or(defaults.capacity),
                policy: policy.map_or(defaults.policy, Into::into),
                recovery_recipient: recipient.map_or(defaults.recovery_recipient, Into::into),
            };
            init(store, owner, config).await
        },
        Command::Owner => print_line(load(store).await?.current_owner()),
        Command::Manager => print_line(load(store).await?.current_manager()),
        Command::Version => print_line(load(store).await?.get_registry_version()),
        Command::Amount => print_line(load(store).await?.get_relays_amount()),
        Command::List => match load(store).await?.get_relays() {
            Relays::Empty => print_line("no relays configured"),
            Relays::Listed(relays) => relays.iter().try_for_each(print_json),
        },
        Command::Get { uri } => print_json(&load(store).await?.get_relay_by_uri(&uri)?),
        Command::Add { caller, uri, operator, mandatory, description } => {
            mutate(store, |list| list.add_relay(uri, operator, mandatory, description, caller)).await
        },
        Command::Remove { caller, uri } => {
            mutate(store, |list| list.remove_relay(&uri, caller)).await
        },
        Command::ChangeOwner { caller, new_owner } => {
            mutate(store, |list| list.change_owner(new_owner, caller)).await
        },
        Command::SetManager { caller, manager } => {
            mutate(store, |list| list.set_manager(manager, caller)).await
        },
        Command::DismissManager { caller } => mutate(store, |list| list.dismiss_manager(caller)).await,
    }
}

async fn init(store: &SnapshotStore, owner: Address, config: RegistryConfig) -> Result<()> {
    if store.exists().await {
        bail!("a registry already exists at {}", store.path().display());
    }

    let list = RelayAllowedList::builder().config(config).owner(owner).build()?;
    let snapshot = list.snapshot();
    store.save(&snapshot).await.context("Failed to save the new registry")?;
    info!(path = %store.path().display(), %owner, "Registry initialized");
    print_json(&snapshot)
}

async fn load(store: &SnapshotStore) -> Result<RelayAllowedList> {
    let Some(snapshot) = store.load::<RegistrySnapshot>().await? else {
        bail!("no registry at {}; run `rlist init` first", store.path().display());
    };
    RelayAllowedList::restore(snapshot)
        .with_context(|| format!("Snapshot {} is inconsistent", store.path().display()))
}

/// Applies one registry call, persists the result, then prints the emitted events.
async fn mutate<F>(store: &SnapshotStore, call: F) -> Result<()>
where
    F: FnOnce(&RelayAllowedList) -> Result<(), RegistryError>,
{
    let list = load(store).await?;
    call(&list)?;

    store.save(&list.snapshot()).await.context("Failed to save the registry")?;
    list.journal().iter().try_for_each(print_json)
}

fn print_line(value: impl std::fmt::Display) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{value}")?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
