//! Tests for yields, purchases and catalog indexing.

use mining_economy::{
    AccountRecord, Catalog, CatalogDocument, PurchaseError, PurchaseTarget, Tool, Upgrade,
    apply_purchase, mine_yield,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn catalog() -> Catalog {
    let mut doc = CatalogDocument::default();
    for tool in [
        Tool::new("diamond_pickaxe", "Diamond Pickaxe", 1000, 25, 60),
        Tool::new("stone_pickaxe", "Stone Pickaxe", 25, 2, 8),
        Tool::new("iron_pickaxe", "Iron Pickaxe", 150, 5, 15),
    ] {
        doc.tools.insert(tool.id().clone(), tool);
    }
    for upgrade in [
        Upgrade::new("gold_multiplier_3", "Gold Rush", "Triple gold", 15),
        Upgrade::new("gold_multiplier_2", "Lucky Strike", "Double gold", 5),
    ] {
        doc.upgrades.insert(upgrade.id().clone(), upgrade);
    }
    Catalog::from_document(doc).expect("catalog build failed")
}

#[test]
fn test_starter_range_yields_one_to_four() {
    let record = AccountRecord::create("alice", "10.0.0.1");
    let tool = Tool::new("t", "Test Pickaxe", 0, 1, 5);
    let mut rng = StdRng::seed_from_u64(42);

    let mut seen = [false; 4];
    for _ in 0..10_000 {
        let mined = mine_yield(&record, &tool, &mut rng).expect("mine failed");
        let gold = *mined.gold();
        assert!((1..5).contains(&gold), "gold {gold} out of range");
        seen[(gold - 1) as usize] = true;
    }
    assert!(seen.iter().all(|s| *s), "every value in [1, 5) should appear");
}

#[test]
fn test_diamond_rate_matches_base_chance() {
    let record = AccountRecord::create("bob", "10.0.0.2");
    let tool = Tool::starter();
    let mut rng = StdRng::seed_from_u64(7);

    let trials = 100_000;
    let mut hits = 0u32;
    for _ in 0..trials {
        let mined = mine_yield(&record, &tool, &mut rng).expect("mine failed");
        if mined.found_diamond() {
            assert_eq!(*mined.diamond(), 1);
            hits += 1;
        }
    }

    let rate = f64::from(hits) / f64::from(trials);
    assert!((rate - 0.01).abs() < 0.002, "diamond rate {rate} too far from 0.01");
}

#[test]
fn test_same_seed_same_outcome() {
    let record = AccountRecord::create("carol", "10.0.0.3");
    let tool = Tool::new("t", "Test Pickaxe", 0, 1, 100);
    let first: Vec<_> = {
        let mut rng = StdRng::seed_from_u64(99);
        (0..20)
            .map(|_| mine_yield(&record, &tool, &mut rng).expect("mine failed"))
            .collect()
    };
    let second: Vec<_> = {
        let mut rng = StdRng::seed_from_u64(99);
        (0..20)
            .map(|_| mine_yield(&record, &tool, &mut rng).expect("mine failed"))
            .collect()
    };
    assert_eq!(first, second);
}

#[test]
fn test_resolve_three_tools_two_upgrades() {
    let catalog = catalog();

    let tool_prices: Vec<u64> = (1..=3)
        .map(|i| match catalog.resolve(i) {
            Some(PurchaseTarget::Tool(tool)) => *tool.price(),
            other => panic!("index {i} should be a tool, got {other:?}"),
        })
        .collect();
    assert_eq!(tool_prices, vec![25, 150, 1000]);

    let upgrade_prices: Vec<u64> = (4..=5)
        .map(|i| match catalog.resolve(i) {
            Some(PurchaseTarget::Upgrade(upgrade)) => *upgrade.price(),
            other => panic!("index {i} should be an upgrade, got {other:?}"),
        })
        .collect();
    assert_eq!(upgrade_prices, vec![5, 15]);

    assert!(catalog.resolve(0).is_none());
    assert!(catalog.resolve(6).is_none());
}

#[test]
fn test_tool_purchase_with_exact_gold() {
    let catalog = catalog();
    let target = catalog.resolve(2).expect("iron pickaxe");
    let mut record = AccountRecord::create("dave", "10.0.0.4");
    record.gold = 150;

    let updated = apply_purchase(&record, target).expect("purchase failed");
    assert_eq!(updated.gold, 0);
    assert_eq!(updated.equipped_tool.id(), "iron_pickaxe");
}

#[test]
fn test_tool_purchase_one_short_fails_unchanged() {
    let catalog = catalog();
    let target = catalog.resolve(2).expect("iron pickaxe");
    let mut record = AccountRecord::create("erin", "10.0.0.5");
    record.gold = 149;
    let before = record.clone();

    let result = apply_purchase(&record, target);
    assert_eq!(
        result,
        Err(PurchaseError::InsufficientGold {
            price: 150,
            available: 149
        })
    );
    assert_eq!(record, before);
}

#[test]
fn test_downgrade_and_reequip_allowed() {
    let catalog = catalog();
    let mut record = AccountRecord::create("frank", "10.0.0.6");
    record.gold = 1200;

    let record = apply_purchase(&record, catalog.resolve(3).expect("diamond")).expect("buy");
    let record = apply_purchase(&record, catalog.resolve(1).expect("stone")).expect("downgrade");
    let record = apply_purchase(&record, catalog.resolve(1).expect("stone")).expect("re-equip");
    assert_eq!(record.gold, 1200 - 1000 - 25 - 25);
    assert_eq!(record.equipped_tool.id(), "stone_pickaxe");
}

#[test]
fn test_upgrade_repurchase_appends_duplicate() {
    let catalog = catalog();
    let index = catalog.index_of("gold_multiplier_2").expect("indexed");
    let mut record = AccountRecord::create("gina", "10.0.0.7");
    record.diamond = 12;

    let record = apply_purchase(&record, catalog.resolve(index).expect("upgrade")).expect("first");
    let record = apply_purchase(&record, catalog.resolve(index).expect("upgrade")).expect("second");
    assert_eq!(record.diamond, 2);
    assert_eq!(record.owned_upgrades.len(), 2);
    assert!(record.owned_upgrades.iter().all(|u| u.id() == "gold_multiplier_2"));
}

#[test]
fn test_upgrade_purchase_requires_diamonds() {
    let catalog = catalog();
    let target = catalog.resolve(5).expect("gold rush");
    let mut record = AccountRecord::create("hank", "10.0.0.8");
    record.gold = 10_000;
    record.diamond = 14;

    let result = apply_purchase(&record, target);
    assert!(matches!(
        result,
        Err(PurchaseError::InsufficientDiamonds {
            price: 15,
            available: 14
        })
    ));
}

#[test]
fn test_json_catalog_with_legacy_keys() {
    let catalog = Catalog::from_json_str(
        r#"{
            "pickaxes": {
                "stone": {"id": "stone", "name": "Stone Pickaxe", "price": 25, "minGold": 2, "maxGold": 8}
            },
            "upgrades": {
                "auto_miner": {"id": "auto_miner", "name": "Auto Miner", "description": "Mines for you", "price": 30}
            }
        }"#,
    )
    .expect("parse failed");
    assert_eq!(catalog.tools().len(), 1);
    assert_eq!(*catalog.tools()[0].max_yield(), 8);
    assert_eq!(catalog.index_of("auto_miner"), Some(2));
}

#[test]
fn test_toml_catalog() {
    let catalog = Catalog::from_toml_str(
        r#"
        [tools.stone]
        name = "Stone Pickaxe"
        price = 25
        min_yield = 2
        max_yield = 8

        [upgrades.diamond_chance]
        name = "Keen Eye"
        description = "Better odds of diamonds"
        price = 10
        "#,
    )
    .expect("parse failed");
    assert_eq!(catalog.tools()[0].id(), "stone");
    assert_eq!(catalog.upgrades()[0].id(), "diamond_chance");
}
