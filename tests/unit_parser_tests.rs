use portfolio_import::error::ImportError;
use portfolio_import::parser::{parse, RowParser};

#[test]
fn test_header_keys_each_row() {
    let csv = "Symbol,Amount\nAAPL,1.5\nMSFT,2\n";
    let rows: Vec<_> = parse(csv.as_bytes()).unwrap().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].index(), 1);
    assert_eq!(rows[0].get("Symbol"), Some("AAPL"));
    assert_eq!(rows[1].get("Amount"), Some("2"));
    assert_eq!(rows[1].get("Currency"), None);
}

#[test]
fn test_blank_lines_skipped_without_consuming_index() {
    let csv = "Symbol,Amount\n\nAAPL,1\n,\n  ,  \nMSFT,2\n";
    let rows: Vec<_> = parse(csv.as_bytes()).unwrap().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].index(), 2);
    assert_eq!(rows[1].get("Symbol"), Some("MSFT"));
}

#[test]
fn test_quoted_fields_keep_delimiters() {
    let csv = "Account,Symbol\n\"Smith, J\",\"BRK.B\"\n";
    let row = parse(csv.as_bytes()).unwrap().next().unwrap().unwrap();

    assert_eq!(row.get("Account"), Some("Smith, J"));
    assert_eq!(row.get("Symbol"), Some("BRK.B"));
}

#[test]
fn test_headers_and_values_trimmed() {
    let csv = "\u{feff} Symbol , Amount \n AAPL , 1.5 \n";
    let parser = RowParser::new(csv.as_bytes()).unwrap();
    assert_eq!(parser.headers(), &["Symbol".to_string(), "Amount".to_string()]);

    let row = parser.into_iter().next().unwrap().unwrap();
    assert_eq!(row.get("Symbol"), Some("AAPL"));
    assert_eq!(row.get("Amount"), Some("1.5"));
}

#[test]
fn test_short_row_lacks_trailing_columns() {
    let csv = "Symbol,Amount,Currency\nAAPL,1.5\n";
    let row = parse(csv.as_bytes()).unwrap().next().unwrap().unwrap();

    assert_eq!(row.len(), 2);
    assert!(row.contains("Amount"));
    assert!(!row.contains("Currency"));
}

#[test]
fn test_empty_input_rejected() {
    assert!(matches!(
        RowParser::new("".as_bytes()),
        Err(ImportError::EmptyInput(_))
    ));
}

#[test]
fn test_parser_is_lazy() {
    let csv = "Symbol\nAAPL\nMSFT\nKO\n";
    let mut parser = parse(csv.as_bytes()).unwrap();

    assert_eq!(parser.next().unwrap().unwrap().get("Symbol"), Some("AAPL"));
    let rest: Vec<_> = parser.map(Result::unwrap).collect();
    assert_eq!(rest.len(), 2);
}
