//! End-to-end scenarios against the bundled catalog.

use keyopen_economy::{Case, Catalog, Economy, EconomyConfig, EconomyError, Item, Money, Rarity};

fn economy(seed: u64) -> Economy {
    let config = EconomyConfig::builtin().unwrap().with_seed(seed);
    Economy::from_config(config).unwrap()
}

#[test]
fn test_buy_then_sell_chroma() {
    let mut eco = economy(42);
    eco.register("alice", "pw1").unwrap();
    let session = eco.authenticate("alice", "pw1").unwrap();
    assert_eq!(eco.balance(&session), Ok(Money::from_whole(100)));

    let listing = eco.list_catalog();
    assert_eq!(listing[0].name, "Chroma Case");
    assert_eq!(listing[0].price, Money::from_parts(2, 50));

    let item = eco.purchase_case(&session, 0).unwrap();
    assert!(eco.case(0).unwrap().items().contains(&item));
    assert_eq!(eco.balance(&session), Ok(Money::from_parts(97, 50)));
    assert_eq!(eco.list_inventory(&session).unwrap().len(), 1);

    let credited = eco.sell_item(&session, 0).unwrap();
    assert_eq!(credited, item.value());
    assert_eq!(
        eco.balance(&session),
        Ok(Money::from_parts(97, 50) + item.value())
    );
    assert!(eco.list_inventory(&session).unwrap().is_empty());
}

#[test]
fn test_sell_out_of_range_changes_nothing() {
    let mut eco = economy(7);
    eco.register("bob", "pw").unwrap();
    let session = eco.authenticate("bob", "pw").unwrap();
    eco.purchase_case(&session, 3).unwrap();
    eco.purchase_case(&session, 3).unwrap();

    let balance = eco.balance(&session).unwrap();
    let lines = eco.list_inventory(&session).unwrap();

    assert_eq!(
        eco.sell_item(&session, 5),
        Err(EconomyError::IndexOutOfRange { index: 5, len: 2 })
    );
    assert_eq!(eco.balance(&session), Ok(balance));
    assert_eq!(eco.list_inventory(&session).unwrap(), lines);
}

#[test]
fn test_insufficient_funds_changes_nothing() {
    let mut eco = economy(3);
    eco.register("carol", "pw").unwrap();
    let session = eco.authenticate("carol", "pw").unwrap();

    // Gamma costs 3.00; 33 purchases leave 1.00.
    for _ in 0..33 {
        eco.purchase_case(&session, 1).unwrap();
    }
    assert_eq!(eco.balance(&session), Ok(Money::ONE));
    let lines = eco.list_inventory(&session).unwrap();
    assert_eq!(lines.len(), 33);

    assert_eq!(
        eco.purchase_case(&session, 1),
        Err(EconomyError::InsufficientFunds {
            required: Money::from_whole(3),
            available: Money::ONE,
        })
    );
    assert_eq!(eco.balance(&session), Ok(Money::ONE));
    assert_eq!(eco.list_inventory(&session).unwrap(), lines);
}

#[test]
fn test_exact_balance_purchase_reaches_zero() {
    let case = Case::new(
        "Exact",
        Money::from_whole(100),
        vec![Item::new("Pebble", Rarity::Blue, Money::from_cents(1))],
    )
    .unwrap();
    let catalog = Catalog::new(vec![case]);
    let mut eco = Economy::seeded(catalog, Money::from_whole(100), 1);
    eco.register("dave", "pw").unwrap();
    let session = eco.authenticate("dave", "pw").unwrap();

    eco.purchase_case(&session, 0).unwrap();
    assert_eq!(eco.balance(&session), Ok(Money::ZERO));
    assert!(matches!(
        eco.purchase_case(&session, 0),
        Err(EconomyError::InsufficientFunds { .. })
    ));
}

#[test]
fn test_long_session_never_negative() {
    let mut eco = economy(1234);
    eco.register("erin", "pw").unwrap();
    let session = eco.authenticate("erin", "pw").unwrap();

    let mut expected = Money::from_whole(100);
    let mut held = 0usize;
    for step in 0..2_000usize {
        let case_index = step % eco.catalog().len();
        let price = eco.case(case_index).unwrap().price();

        match eco.purchase_case(&session, case_index) {
            Ok(_) => {
                expected -= price;
                held += 1;
            }
            Err(EconomyError::InsufficientFunds { available, .. }) => {
                assert!(available < price);
            }
            Err(other) => panic!("unexpected error: {other}"),
        }

        if step % 3 == 0 {
            if let Ok(credited) = eco.sell_item(&session, 0) {
                expected += credited;
                held -= 1;
            }
        }

        assert_eq!(eco.balance(&session), Ok(expected));
    }

    assert_eq!(eco.list_inventory(&session).unwrap().len(), held);
}

#[test]
fn test_gold_drop_is_labelled() {
    let mut eco = economy(0);
    eco.register("frank", "pw").unwrap();
    let session = eco.authenticate("frank", "pw").unwrap();
    eco.fund_account(&session, Money::from_whole(10_000)).unwrap();

    // Dreams & Nightmares at 0.90 a case; 0.5% gold odds.
    let mut gold = None;
    for _ in 0..5_000 {
        let item = eco.purchase_case(&session, 3).unwrap();
        if item.rarity() == Rarity::Gold {
            gold = Some(item);
            break;
        }
    }

    let gold = gold.unwrap();
    assert_eq!(
        gold.to_string(),
        "[GOLD] Rare Special Item Butterfly Knife | Gamma Doppler ($1500.00)"
    );
}
