mod common;

use common::{date, make_dividend, make_trade};
use portfolio_import::dedup::{reconcile, Deduplicator};
use portfolio_import::models::{RecordId, TradeSide};
use rust_decimal_macros::dec;

#[test]
fn test_natural_key_layout() {
    let dividend = make_dividend(1, "ACC001234", "AAPL", date(2024, 1, 15), dec!(150.25));
    assert_eq!(
        dividend.natural_key().as_str(),
        "2024-01-15|ACC001234|Dividends|AAPL|150.25"
    );

    let trade = make_trade(
        1,
        TradeSide::Buy,
        "ACC1",
        "MSFT",
        date(2024, 2, 1),
        dec!(10),
        dec!(402.5),
    );
    assert_eq!(trade.natural_key().as_str(), "2024-02-01|ACC1|Buy|MSFT|10|402.5");
}

#[test]
fn test_natural_key_ignores_decimal_scale() {
    let a = make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(150.25));
    let b = make_dividend(2, "ACC1", "AAPL", date(2024, 1, 15), dec!(150.250));
    assert_eq!(a.natural_key(), b.natural_key());
}

#[test]
fn test_natural_key_ignores_id_and_currency() {
    let a = make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(10));
    let mut b = make_dividend(9, "ACC1", "AAPL", date(2024, 1, 15), dec!(10)).with_id(RecordId::Persisted(3));
    b.currency = "EUR".to_string();
    assert_eq!(a.natural_key(), b.natural_key());
}

#[test]
fn test_buy_and_sell_are_distinct() {
    let buy = make_trade(1, TradeSide::Buy, "A", "X", date(2024, 1, 1), dec!(1), dec!(10));
    let sell = make_trade(2, TradeSide::Sell, "A", "X", date(2024, 1, 1), dec!(1), dec!(10));
    assert_ne!(buy.natural_key(), sell.natural_key());
}

#[test]
fn test_admit_tracks_seen_keys() {
    let mut dedup = Deduplicator::new();
    let record = make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(1));

    assert!(dedup.admit(&record));
    assert!(!dedup.admit(&record));
    assert!(!dedup.admit(&record.clone().with_id(RecordId::Temporary(9))));
}

#[test]
fn test_seeded_keys_are_not_admitted() {
    let stored = make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(1));
    let mut dedup = Deduplicator::with_existing([stored.natural_key()]);

    assert!(!dedup.admit(&stored));
    assert!(dedup.admit(&make_dividend(2, "ACC1", "KO", date(2024, 1, 15), dec!(1))));
}

#[test]
fn test_existing_keys_mark_duplicates() {
    let stored = vec![
        make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(1)).with_id(RecordId::Persisted(1)),
    ];
    let incoming = vec![
        make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(1)),
        make_dividend(2, "ACC1", "AAPL", date(2024, 1, 16), dec!(1)),
    ];

    let partition = reconcile(&stored, incoming);

    assert_eq!(partition.fresh.len(), 1);
    assert_eq!(partition.fresh[0].id, RecordId::Temporary(2));
    assert_eq!(partition.duplicate_rows(), vec![1]);
}

#[test]
fn test_first_occurrence_in_batch_wins() {
    let incoming = vec![
        make_dividend(1, "ACC1", "AAPL", date(2024, 1, 15), dec!(1)),
        make_dividend(2, "ACC1", "AAPL", date(2024, 1, 15), dec!(1)),
        make_dividend(3, "ACC1", "AAPL", date(2024, 1, 15), dec!(1)),
    ];

    let partition = reconcile(&[], incoming);

    assert_eq!(partition.fresh.len(), 1);
    assert_eq!(partition.fresh[0].id, RecordId::Temporary(1));
    assert_eq!(partition.duplicate_rows(), vec![2, 3]);
}

#[test]
fn test_scan_follows_row_order_not_vector_order() {
    let mut later = make_dividend(5, "ACC1", "AAPL", date(2024, 1, 15), dec!(1));
    later.currency = "EUR".to_string();
    let earlier = make_dividend(2, "ACC1", "AAPL", date(2024, 1, 15), dec!(1));

    let partition = reconcile(&[], vec![later, earlier]);

    assert_eq!(partition.fresh.len(), 1);
    assert_eq!(partition.fresh[0].id, RecordId::Temporary(2));
    assert_eq!(partition.fresh[0].currency, "USD");
    assert_eq!(partition.duplicate_rows(), vec![5]);
}
