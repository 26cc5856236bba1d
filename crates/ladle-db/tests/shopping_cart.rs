use ladle_db::Database;
use ladle_db::error::DbError;
use ladle_db::queries::NewRecipe;

fn setup() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.create_user("u-alice", "alice", "alice@example.com", "Alice", "A", "hash")
        .unwrap();
    db.create_user("u-bob", "bob", "bob@example.com", "Bob", "B", "hash")
        .unwrap();
    db.insert_ingredient("i-flour", "flour", "g").unwrap();
    db.insert_ingredient("i-egg", "egg", "pcs").unwrap();
    db.insert_ingredient("i-milk", "milk", "ml").unwrap();

    let breakfast = vec!["00000000-0000-0000-0000-000000000001".to_string()];

    let a_lines = vec![("i-flour".to_string(), 200), ("i-egg".to_string(), 2)];
    db.create_recipe(&NewRecipe {
        id: "r-a",
        author_id: "u-alice",
        name: "recipe a",
        image: b"img",
        description: "",
        cooking_time: 10,
        tag_ids: &breakfast,
        lines: &a_lines,
    })
    .unwrap();

    let b_lines = vec![("i-flour".to_string(), 100), ("i-milk".to_string(), 50)];
    db.create_recipe(&NewRecipe {
        id: "r-b",
        author_id: "u-alice",
        name: "recipe b",
        image: b"img",
        description: "",
        cooking_time: 5,
        tag_ids: &breakfast,
        lines: &b_lines,
    })
    .unwrap();

    db
}

#[test]
fn aggregation_sums_amounts_per_ingredient() {
    let db = setup();
    db.add_cart_entry("u-bob", "r-a").unwrap();
    db.add_cart_entry("u-bob", "r-b").unwrap();

    let list = db.shopping_list("u-bob").unwrap();

    // Ordered by ingredient name: egg, flour, milk.
    assert_eq!(list.len(), 3);
    assert_eq!(
        (list[0].name.as_str(), list[0].total_amount, list[0].measurement_unit.as_str()),
        ("egg", 2, "pcs")
    );
    assert_eq!(
        (list[1].name.as_str(), list[1].total_amount, list[1].measurement_unit.as_str()),
        ("flour", 300, "g")
    );
    assert_eq!(
        (list[2].name.as_str(), list[2].total_amount, list[2].measurement_unit.as_str()),
        ("milk", 50, "ml")
    );
}

#[test]
fn aggregation_is_idempotent_and_scoped_to_the_cart() {
    let db = setup();
    db.add_cart_entry("u-bob", "r-a").unwrap();

    let first = db.shopping_list("u-bob").unwrap();
    let second = db.shopping_list("u-bob").unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.total_amount, b.total_amount);
    }

    // r-b is not in the cart; its milk must not leak in.
    assert!(first.iter().all(|item| item.name != "milk"));
    assert_eq!(first[1].total_amount, 200);

    // Another user's cart is independent.
    assert!(db.shopping_list("u-alice").unwrap().is_empty());
}

#[test]
fn duplicate_cart_entry_is_a_conflict() {
    let db = setup();
    db.add_cart_entry("u-bob", "r-a").unwrap();

    let err = db.add_cart_entry("u-bob", "r-a").unwrap_err();
    assert!(matches!(err, DbError::Conflict("shopping cart entry")));

    // Still exactly one entry worth of flour.
    let list = db.shopping_list("u-bob").unwrap();
    assert_eq!(list[1].total_amount, 200);
}

#[test]
fn removing_an_absent_entry_is_not_found() {
    let db = setup();
    assert!(matches!(
        db.remove_cart_entry("u-bob", "r-a").unwrap_err(),
        DbError::NotFound("shopping cart entry")
    ));

    db.add_cart_entry("u-bob", "r-a").unwrap();
    db.remove_cart_entry("u-bob", "r-a").unwrap();
    assert!(db.shopping_list("u-bob").unwrap().is_empty());
}

#[test]
fn duplicate_favorite_and_follow_are_conflicts() {
    let db = setup();

    db.add_favorite("u-bob", "r-a").unwrap();
    assert!(matches!(
        db.add_favorite("u-bob", "r-a").unwrap_err(),
        DbError::Conflict("favorite")
    ));
    db.remove_favorite("u-bob", "r-a").unwrap();
    assert!(matches!(
        db.remove_favorite("u-bob", "r-a").unwrap_err(),
        DbError::NotFound("favorite")
    ));

    db.add_follow("u-bob", "u-alice").unwrap();
    assert!(db.is_following("u-bob", "u-alice").unwrap());
    assert!(matches!(
        db.add_follow("u-bob", "u-alice").unwrap_err(),
        DbError::Conflict("follow")
    ));
    db.remove_follow("u-bob", "u-alice").unwrap();
    assert!(!db.is_following("u-bob", "u-alice").unwrap());
}

#[test]
fn followed_authors_come_back_ordered_with_their_recipes() {
    let db = setup();
    db.create_user("u-carol", "carol", "carol@example.com", "Carol", "C", "hash")
        .unwrap();

    db.add_follow("u-bob", "u-carol").unwrap();
    db.add_follow("u-bob", "u-alice").unwrap();

    let authors = db.followed_authors("u-bob").unwrap();
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0].username, "alice");
    assert_eq!(authors[1].username, "carol");

    assert_eq!(db.count_recipes_by_author("u-alice").unwrap(), 2);
    assert_eq!(db.recipes_by_author("u-alice", Some(1)).unwrap().len(), 1);
    assert_eq!(db.recipes_by_author("u-alice", None).unwrap().len(), 2);
}
