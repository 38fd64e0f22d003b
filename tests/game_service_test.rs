//! Tests for game actions over an in-memory store.

use std::sync::Arc;

use mining_game::{
    AccountRepository, Catalog, GameError, GameService, PurchaseError, Store, Tool, Upgrade,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

const SHOP: &str = r#"{
    "pickaxes": {
        "stone_pickaxe": { "name": "Stone Pickaxe", "price": 25, "minGold": 2, "maxGold": 8 },
        "iron_pickaxe": { "name": "Iron Pickaxe", "price": 150, "minGold": 5, "maxGold": 15 }
    },
    "upgrades": {
        "gold_multiplier_2": { "name": "Lucky Strike", "description": "Double gold", "price": 2 },
        "auto_miner": { "name": "Auto Miner", "description": "Mines for you", "price": 5 }
    }
}"#;

fn setup_service() -> GameService {
    let store = Store::open_in_memory().expect("Failed to open store");
    let catalog = Catalog::from_json_str(SHOP).expect("Failed to parse catalog");
    GameService::new(AccountRepository::new(Arc::new(store)), Arc::new(catalog))
}

fn fund(service: &GameService, name: &str, gold: u64, diamond: u64) {
    let repo = service.repository();
    let mut record = repo.get_by_name(name).expect("Lookup failed");
    record.gold = gold;
    record.diamond = diamond;
    repo.save(&record).expect("Save failed");
}

#[test]
fn test_login_trims_and_requires_name() {
    let service = setup_service();
    assert!(matches!(
        service.login("   ", "10.0.0.1"),
        Err(GameError::MissingUsername)
    ));

    let record = service.login("  alice ", "10.0.0.1").expect("Login failed");
    assert_eq!(record.name, "alice");
    assert_eq!(
        service.current_account("10.0.0.1").expect("Lookup failed").name,
        "alice"
    );
}

#[test]
fn test_empty_address_is_anonymous() {
    let service = setup_service();
    service.login("alice", "10.0.0.1").expect("Login failed");
    service.logout("10.0.0.1").expect("Logout failed");

    // The logged-out account carries an empty address but must not match it.
    let account = service.current_account("").expect("Lookup failed");
    assert!(!account.exists());
    assert!(matches!(service.purchase("", 1), Err(GameError::NotLoggedIn)));
}

#[test]
fn test_logout_requires_login() {
    let service = setup_service();
    assert!(matches!(
        service.logout("10.0.0.1"),
        Err(GameError::NotLoggedIn)
    ));
}

#[test]
fn test_mine_credits_account() {
    let service = setup_service();
    service.login("bob", "10.0.0.2").expect("Login failed");
    let mut rng = StdRng::seed_from_u64(1);

    let mut total = 0;
    for _ in 0..10 {
        let outcome = service.mine("10.0.0.2", &mut rng).expect("Mine failed");
        assert!((1..5).contains(outcome.gold_mined()));
        assert!(!outcome.auto_mine());
        total += outcome.gold_mined();
        assert_eq!(outcome.record().gold, total);
    }
    let stored = service.repository().get_by_name("bob").expect("Lookup failed");
    assert_eq!(stored.gold, total);
}

#[test]
fn test_mine_requires_login() {
    let service = setup_service();
    let mut rng = StdRng::seed_from_u64(1);
    assert!(matches!(
        service.mine("10.0.0.3", &mut rng),
        Err(GameError::NotLoggedIn)
    ));
}

#[test]
fn test_mine_reports_auto_miner() {
    let service = setup_service();
    service.login("carol", "10.0.0.4").expect("Login failed");
    fund(&service, "carol", 0, 5);
    service.purchase("10.0.0.4", 4).expect("Purchase failed");

    let mut rng = StdRng::seed_from_u64(3);
    let outcome = service.mine("10.0.0.4", &mut rng).expect("Mine failed");
    assert!(outcome.auto_mine());
}

#[test]
fn test_purchase_tool_by_index() {
    let service = setup_service();
    service.login("dave", "10.0.0.5").expect("Login failed");
    fund(&service, "dave", 30, 0);

    let receipt = service.purchase("10.0.0.5", 1).expect("Purchase failed");
    assert_eq!(receipt.item_name(), "Stone Pickaxe");
    assert_eq!(*receipt.index(), 1);
    assert_eq!(receipt.record().gold, 5);
    assert_eq!(receipt.record().equipped_tool.id(), "stone_pickaxe");

    let stored = service.repository().get_by_name("dave").expect("Lookup failed");
    assert_eq!(stored, *receipt.record());
}

#[test]
fn test_purchase_upgrade_after_tools() {
    let service = setup_service();
    service.login("erin", "10.0.0.6").expect("Login failed");
    fund(&service, "erin", 0, 3);

    // Upgrades follow the two tools, cheapest first.
    let receipt = service.purchase("10.0.0.6", 3).expect("Purchase failed");
    assert_eq!(receipt.item_name(), "Lucky Strike");
    assert_eq!(receipt.record().diamond, 1);
    assert!(receipt.record().has_upgrade("gold_multiplier_2"));
}

#[test]
fn test_purchase_insufficient_gold_changes_nothing() {
    let service = setup_service();
    service.login("frank", "10.0.0.7").expect("Login failed");
    fund(&service, "frank", 149, 0);

    let result = service.purchase("10.0.0.7", 2);
    assert!(matches!(
        result,
        Err(GameError::Purchase(PurchaseError::InsufficientGold {
            price: 150,
            available: 149
        }))
    ));
    let stored = service.repository().get_by_name("frank").expect("Lookup failed");
    assert_eq!(stored.gold, 149);
    assert_eq!(stored.equipped_tool, Tool::starter());
}

#[test]
fn test_purchase_insufficient_diamonds() {
    let service = setup_service();
    service.login("grace", "10.0.0.8").expect("Login failed");
    fund(&service, "grace", 1000, 4);

    assert!(matches!(
        service.purchase("10.0.0.8", 4),
        Err(GameError::Purchase(PurchaseError::InsufficientDiamonds { .. }))
    ));
}

#[test]
fn test_purchase_invalid_index() {
    let service = setup_service();
    service.login("heidi", "10.0.0.9").expect("Login failed");
    fund(&service, "heidi", 1000, 100);

    for index in [0, 5, 999] {
        assert!(matches!(
            service.purchase("10.0.0.9", index),
            Err(GameError::InvalidItem(i)) if i == index
        ));
    }
}

#[test]
fn test_purchase_requires_login() {
    let service = setup_service();
    assert!(matches!(
        service.purchase("10.0.0.10", 1),
        Err(GameError::NotLoggedIn)
    ));
}

#[test]
fn test_duplicate_upgrade_is_charged_again() {
    let service = setup_service();
    service.login("ivan", "10.0.0.11").expect("Login failed");
    fund(&service, "ivan", 0, 4);

    service.purchase("10.0.0.11", 3).expect("First purchase failed");
    let receipt = service.purchase("10.0.0.11", 3).expect("Second purchase failed");
    assert_eq!(receipt.record().diamond, 0);
    assert_eq!(
        receipt.record().owned_upgrades,
        vec![
            Upgrade::new("gold_multiplier_2", "Lucky Strike", "Double gold", 2),
            Upgrade::new("gold_multiplier_2", "Lucky Strike", "Double gold", 2),
        ]
    );
}

#[test]
fn test_scoreboard_sorted_by_gold_then_name() {
    let service = setup_service();
    for (name, gold) in [("zoe", 10), ("amy", 10), ("max", 50), ("nil", 0)] {
        service.login(name, "").expect("Login failed");
        fund(&service, name, gold, 0);
    }

    let names: Vec<String> = service
        .scoreboard()
        .expect("Scoreboard failed")
        .into_iter()
        .map(|record| record.name)
        .collect();
    assert_eq!(names, vec!["max", "amy", "zoe"]);
}
