//! Concurrency tests for the shared economy.

use std::sync::Arc;
use std::thread;

use keyopen_economy::{
    Catalog, EconomyConfig, EconomyError, EconomyEvent, Money, SharedEconomy,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const THREADS: u64 = 8;
const OPS_PER_THREAD: usize = 2_000;

fn shared_economy() -> SharedEconomy {
    let config = EconomyConfig::builtin().unwrap();
    SharedEconomy::new(Catalog::new(config.cases), config.starting_balance)
}

#[derive(Default)]
struct Tally {
    spent: Money,
    earned: Money,
    bought: usize,
    sold: usize,
}

#[test]
fn test_concurrent_trading_on_one_account() {
    let eco = Arc::new(shared_economy());
    eco.register("alice", "pw1").unwrap();
    let case_count = eco.catalog().len();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let eco = Arc::clone(&eco);
            thread::spawn(move || {
                let session = eco.authenticate("alice", "pw1").unwrap();
                let mut rng = ChaCha8Rng::seed_from_u64(t);
                let mut tally = Tally::default();

                for op in 0..OPS_PER_THREAD {
                    if op % 2 == 0 {
                        let case_index = op % case_count;
                        let price = eco.catalog().get(case_index).unwrap().price();
                        match eco.purchase_case(&session, case_index, &mut rng) {
                            Ok(_) => {
                                tally.spent += price;
                                tally.bought += 1;
                            }
                            Err(EconomyError::InsufficientFunds { .. }) => {}
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    } else {
                        match eco.sell_item(&session, 0) {
                            Ok(credited) => {
                                tally.earned += credited;
                                tally.sold += 1;
                            }
                            Err(EconomyError::IndexOutOfRange { .. }) => {}
                            Err(other) => panic!("unexpected error: {other}"),
                        }
                    }
                }
                tally
            })
        })
        .collect();

    let tallies: Vec<Tally> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let spent: Money = tallies.iter().map(|t| t.spent).sum();
    let earned: Money = tallies.iter().map(|t| t.earned).sum();
    let bought: usize = tallies.iter().map(|t| t.bought).sum();
    let sold: usize = tallies.iter().map(|t| t.sold).sum();

    let session = eco.authenticate("alice", "pw1").unwrap();
    let account = eco.snapshot(&session).unwrap();

    // Every cent and every item is accounted for.
    assert_eq!(
        account.balance().cents() + spent.cents(),
        Money::from_whole(100).cents() + earned.cents()
    );
    assert_eq!(account.inventory().len(), bought - sold);
}

#[test]
fn test_concurrent_purchases_never_overdraw() {
    let eco = Arc::new(shared_economy());
    eco.register("bob", "pw").unwrap();

    // Chroma costs 2.50: exactly 40 purchases fit in 100.00.
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let eco = Arc::clone(&eco);
            thread::spawn(move || {
                let session = eco.authenticate("bob", "pw").unwrap();
                let mut rng = ChaCha8Rng::seed_from_u64(100 + t);
                let mut bought = 0usize;
                for _ in 0..20 {
                    if eco.purchase_case(&session, 0, &mut rng).is_ok() {
                        bought += 1;
                    }
                }
                bought
            })
        })
        .collect();

    let bought: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let session = eco.authenticate("bob", "pw").unwrap();

    assert_eq!(bought, 40);
    assert_eq!(eco.balance(&session), Ok(Money::ZERO));
    assert_eq!(eco.list_inventory(&session).unwrap().len(), 40);
}

#[test]
fn test_concurrent_registration_one_winner() {
    let eco = Arc::new(shared_economy());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let eco = Arc::clone(&eco);
            thread::spawn(move || eco.register("carol", &format!("pw{t}")).is_ok())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(eco.account_count(), 1);

    let registered = eco
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, EconomyEvent::AccountRegistered { .. }))
        .count();
    assert_eq!(registered, 1);
}

#[test]
fn test_registration_event_precedes_account_activity() {
    for round in 0..50u64 {
        let eco = Arc::new(shared_economy());

        let funders: Vec<_> = (0..4)
            .map(|_| {
                let eco = Arc::clone(&eco);
                thread::spawn(move || loop {
                    if let Ok(session) = eco.authenticate("dana", "pw") {
                        eco.fund_account(&session, Money::ONE).unwrap();
                        break;
                    }
                    thread::yield_now();
                })
            })
            .collect();

        eco.register("dana", "pw").unwrap();
        for funder in funders {
            funder.join().unwrap();
        }

        let events = eco.drain_events();
        assert_eq!(events.len(), 5, "round {round}");
        assert!(
            matches!(events[0], EconomyEvent::AccountRegistered { .. }),
            "round {round}: {:?}",
            events[0]
        );
    }
}
