use pretty_assertions::assert_eq;
use watch_core::{reconcile, Record};

fn at(millis: i64) -> impl Fn() -> i64 {
    move || millis
}

fn stamped(record: Record, millis: i64) -> Record {
    Record {
        change_timestamp: Some(millis),
        ..record
    }
}

fn dropped(record: Record, old_price: f64) -> Record {
    Record {
        old_price: Some(old_price),
        ..record
    }
}

#[test]
fn new_items_are_appended_and_drops_update_in_place() {
    let baseline = vec![Record::new("GPU-A", "1", 300.0)];
    let differences = vec![
        dropped(Record::new("GPU-A", "1", 250.0), 300.0),
        Record::new("CPU-B", "2", 150.0),
    ];

    let next = reconcile(baseline, &differences, &at(1_700));

    assert_eq!(
        next,
        vec![
            stamped(Record::new("GPU-A", "1", 250.0), 1_700),
            stamped(Record::new("CPU-B", "2", 150.0), 1_700),
        ]
    );
}

#[test]
fn appended_records_never_carry_old_price() {
    let differences = vec![dropped(Record::new("GPU-A", "1", 250.0), 300.0)];

    let next = reconcile(Vec::new(), &differences, &at(5));

    assert_eq!(next[0].old_price, None);
}

#[test]
fn later_differences_see_earlier_appends() {
    let differences = vec![
        Record::new("GPU-A", "1", 250.0),
        Record::new("GPU-A", "1", 200.0),
        Record::new("GPU-A", "1", 400.0),
    ];

    let next = reconcile(Vec::new(), &differences, &at(10));

    assert_eq!(next, vec![stamped(Record::new("GPU-A", "1", 200.0), 10)]);
}

#[test]
fn non_drops_are_ignored() {
    let baseline = vec![stamped(Record::new("GPU-A", "1", 300.0), 1)];
    let differences = vec![Record::new("GPU-A", "1", 300.0), Record::new("GPU-A", "1", 350.0)];

    let next = reconcile(baseline.clone(), &differences, &at(99));

    assert_eq!(next, baseline);
}

#[test]
fn items_missing_from_the_catalog_are_kept() {
    let retired = stamped(Record::new("OLD-Z", "9", 42.0).with_original_price(80.0), 3);
    let baseline = vec![retired.clone(), Record::new("GPU-A", "1", 300.0)];
    let differences = vec![dropped(Record::new("GPU-A", "1", 250.0), 300.0)];

    let next = reconcile(baseline, &differences, &at(7));

    assert_eq!(next[0], retired);
    assert_eq!(next.len(), 2);
}

#[test]
fn drop_updates_only_price_and_timestamp() {
    let known = Record::new("GPU-A", "1", 300.0)
        .with_original_price(400.0)
        .with_links("https://shop.example/gpu-a", "https://img.example/gpu-a.png");
    let observed = Record::new("GPU-A", "1", 250.0).with_links("https://elsewhere", "");

    let next = reconcile(vec![known.clone()], &[dropped(observed, 300.0)], &at(11));

    assert_eq!(
        next,
        vec![Record {
            price: 250.0,
            change_timestamp: Some(11),
            ..known
        }]
    );
}

#[test]
fn change_timestamp_never_moves_backwards() {
    let baseline = vec![stamped(Record::new("GPU-A", "1", 300.0), 5_000)];
    let differences = vec![dropped(Record::new("GPU-A", "1", 250.0), 300.0)];

    let next = reconcile(baseline, &differences, &at(4_000));

    assert_eq!(next[0].price, 250.0);
    assert_eq!(next[0].change_timestamp, Some(5_000));
}

#[test]
fn second_pass_with_same_differences_is_a_no_op() {
    let baseline = vec![Record::new("GPU-A", "1", 300.0)];
    let differences = vec![
        dropped(Record::new("GPU-A", "1", 250.0), 300.0),
        Record::new("CPU-B", "2", 150.0),
    ];

    let once = reconcile(baseline, &differences, &at(1));
    let twice = reconcile(once.clone(), &differences, &at(2));

    assert_eq!(twice, once);
}
