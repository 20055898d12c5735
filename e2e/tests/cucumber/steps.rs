use chrono::Duration;
use cucumber::{given, then, when};
use depot_common::Gold;
use depot_engine::{reconciler::DispatchOutcome, test_utils::fakes::Notice, WorldPos};
use e2e::helpers::{parse_gold, parse_names, stable_id_for};
use log::debug;

use crate::cucumber::DepotWorld;

#[given(expr = "a shop owned by {word} with its chest at {int}, {int}")]
async fn open_shop(world: &mut DepotWorld, owner: String, x: i64, z: i64) {
    world.open_shop(&owner, WorldPos::new(x as f64, z as f64)).await;
}

#[given(expr = "{word} is linked to Discord account {string}")]
fn link_account(world: &mut DepotWorld, name: String, discord_id: String) {
    world.link(&name, &discord_id);
}

#[given(expr = "{word} has not linked a Discord account")]
fn unlinked_account(world: &mut DepotWorld, name: String) {
    world.game.add_stable_id(&name, &stable_id_for(&name));
}

#[given(expr = "{word} has an in-game balance of {word} gold")]
fn in_game_balance(world: &mut DepotWorld, name: String, amount: String) {
    world.set_balance(&name, parse_gold(&amount));
}

#[given(expr = "{word} is standing at {int}, {int}")]
fn stand_at(world: &mut DepotWorld, name: String, x: i64, z: i64) {
    world.move_player(&name, Some(WorldPos::new(x as f64, z as f64)));
}

#[when(expr = "{word} walks to {int}, {int}")]
fn walk_to(world: &mut DepotWorld, name: String, x: i64, z: i64) {
    stand_at(world, name, x, z);
}

#[when(expr = "{word} logs off")]
fn log_off(world: &mut DepotWorld, name: String) {
    world.move_player(&name, None);
}

#[when("the live map goes down")]
fn map_down(world: &mut DepotWorld) {
    world.game.fail_positions(true);
}

#[when("the live map comes back")]
fn map_up(world: &mut DepotWorld) {
    world.game.fail_positions(false);
}

#[when("deposit matching is switched off")]
fn matching_off(world: &mut DepotWorld) {
    world.watcher().switch().set(false);
}

#[when("deposit matching is switched on")]
fn matching_on(world: &mut DepotWorld) {
    world.watcher().switch().set(true);
}

#[when("a poll cycle runs")]
async fn poll_once(world: &mut DepotWorld) {
    world.poll().await;
}

#[when(expr = "{int} poll cycles run")]
async fn poll_many(world: &mut DepotWorld, cycles: u32) {
    for _ in 0..cycles {
        world.poll().await;
    }
}

#[when(expr = "{int} seconds pass")]
fn time_passes(world: &mut DepotWorld, seconds: i64) {
    world.now = world.now + Duration::seconds(seconds);
}

#[when(expr = "{word} drops {word} gold into the chest")]
fn deposit(world: &mut DepotWorld, name: String, amount: String) {
    let amount = parse_gold(&amount);
    let receiver = world.receiver.clone();
    debug!("🌍️ {name} deposits {amount} with {receiver}");
    world.set_balance(&name, world.balance(&name) - amount);
    world.set_balance(&receiver, world.balance(&receiver) + amount);
}

#[when(expr = "{word} spends {word} gold elsewhere")]
fn spend(world: &mut DepotWorld, name: String, amount: String) {
    let amount = parse_gold(&amount);
    world.set_balance(&name, world.balance(&name) - amount);
}

#[then(expr = "a deposit of {word} gold by {word} is credited")]
fn deposit_credited(world: &mut DepotWorld, amount: String, depositor: String) {
    let report = world.last_report();
    let deposit = report.deposit.as_ref().expect("No deposit was matched");
    assert_eq!(deposit.depositor, depositor);
    assert_eq!(deposit.receiver, world.receiver);
    assert_eq!(deposit.amount, parse_gold(&amount));
    assert!(
        matches!(report.outcome, Some(DispatchOutcome::Credited { .. })),
        "Expected the deposit to be credited, got {:?}",
        report.outcome
    );
}

#[then(expr = "the deposit by {word} is not credited")]
fn deposit_not_credited(world: &mut DepotWorld, depositor: String) {
    let report = world.last_report();
    let deposit = report.deposit.as_ref().expect("No deposit was matched");
    assert_eq!(deposit.depositor, depositor);
    assert!(
        matches!(report.outcome, Some(DispatchOutcome::IdentityFailed(_))),
        "Expected an identity failure, got {:?}",
        report.outcome
    );
}

#[then("no deposit is matched")]
fn no_deposit(world: &mut DepotWorld) {
    let report = world.last_report();
    assert!(report.deposit.is_none(), "Expected no deposit, got {:?}", report.deposit);
    assert!(report.outcome.is_none());
}

#[then(expr = "the ledger balance of {word} is {word} gold")]
async fn ledger_balance(world: &mut DepotWorld, name: String, amount: String) {
    let identity = world.discord_id(&name).to_string();
    let balance = world.ledger().balance(&identity).await.expect("Could not read the ledger");
    assert_eq!(balance, parse_gold(&amount), "Unexpected ledger balance for {name} ({identity})");
}

#[then("no ledger account holds any gold")]
async fn empty_ledger(world: &mut DepotWorld) {
    let ledger = world.ledger();
    for identity in world.accounts.values() {
        let balance = ledger.balance(identity).await.expect("Could not read the ledger");
        assert_eq!(balance, Gold::default(), "{identity} holds {balance}");
    }
}

#[then(expr = "the log channel reads {string}")]
fn log_channel_reads(world: &mut DepotWorld, line: String) {
    let lines = world.notifier.log_lines();
    assert!(lines.contains(&line), "Expected '{line}' in the log channel, got {lines:?}");
}

#[then("nothing is posted to the log channel")]
fn log_channel_is_quiet(world: &mut DepotWorld) {
    assert!(world.notifier.log_lines().is_empty());
}

#[then(expr = "{word} is sent a message containing {string}")]
fn direct_message(world: &mut DepotWorld, name: String, text: String) {
    let messages = world.notifier.direct_messages_to(world.discord_id(&name));
    assert!(messages.iter().any(|m| m.contains(&text)), "Expected a message to {name} with '{text}', got {messages:?}");
}

#[then(expr = "{word} is sent nothing")]
fn no_direct_message(world: &mut DepotWorld, name: String) {
    let user = world.discord_id(&name).to_string();
    let sent = world.notifier.notices().into_iter().any(|n| matches!(n, Notice::Direct { user: u, .. } if u == user));
    assert!(!sent, "{name} was sent a message");
}

#[then(expr = "{word} is in the drop-off area")]
fn present(world: &mut DepotWorld, name: String) {
    assert!(world.watcher().presence().is_present(&name), "{name} should be present");
}

#[then(expr = "{word} is not in the drop-off area")]
fn absent(world: &mut DepotWorld, name: String) {
    assert!(!world.watcher().presence().is_present(&name), "{name} should not be present");
}

#[then(expr = "the last balance query was for {string}")]
fn last_balance_query(world: &mut DepotWorld, names: String) {
    let queries = world.game.balance_queries();
    let last = queries.last().expect("No balance query was made");
    assert_eq!(*last, parse_names(&names));
}
