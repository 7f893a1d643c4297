//! Row inclusion test: one ascending merge over filters and fields.

use crate::filter::FilterTable;
use crate::row::Row;

/// Decide whether `row` satisfies every entry of `filters`.
///
/// Both sequences are sorted by column, so a single pass suffices. A filter
/// whose column is absent from the row rejects it. Several filters on the
/// same column are all tested against that column's one field.
pub fn row_matches(filters: &FilterTable, row: &Row) -> bool {
    let entries = filters.entries();
    let fields = row.fields();
    let mut fi = 0;
    let mut ri = 0;

    while fi < entries.len() && ri < fields.len() {
        let filter = &entries[fi];
        let field = &fields[ri];

        if field.column < filter.column {
            ri += 1;
            continue;
        }

        if filter.column < field.column {
            return false;
        }

        if !filters.entry_matches(fi, &field.value) {
            return false;
        }

        // Field cursor stays put: the next filter may target the same column.
        fi += 1;
    }

    fi == entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterEntry;
    use crate::row::Field;
    use memchr::memmem;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn row(fields: &[(u32, &str)]) -> Row {
        Row::new(fields.iter().map(|&(c, v)| Field::new(c, v)).collect()).unwrap()
    }

    fn table(entries: &[(u32, &str)]) -> FilterTable {
        FilterTable::new(
            entries
                .iter()
                .map(|&(c, p)| FilterEntry::new(c, p))
                .collect(),
        )
    }

    /// Per-filter lookup, used as the reference for the merge.
    fn linear_matches(filters: &FilterTable, row: &Row) -> bool {
        filters.entries().iter().all(|f| {
            row.fields()
                .iter()
                .any(|field| {
                    field.column == f.column && memmem::find(&field.value, &f.pattern).is_some()
                })
        })
    }

    #[test]
    fn test_empty_table_passes_everything() {
        let filters = FilterTable::default();
        assert!(row_matches(&filters, &row(&[])));
        assert!(row_matches(&filters, &row(&[(0, "a"), (9, "b")])));
    }

    #[test]
    fn test_substring_match() {
        let r = row(&[(0, "hello"), (1, "world")]);
        assert!(row_matches(&table(&[(1, "orl")]), &r));
        assert!(!row_matches(&table(&[(1, "xyz")]), &r));
    }

    #[test]
    fn test_missing_column_rejects() {
        let r = row(&[(1, "x"), (2, "x")]);
        assert!(!row_matches(&table(&[(3, "x")]), &r));
        assert!(!row_matches(&table(&[(0, "x")]), &r));
    }

    #[test]
    fn test_fields_exhausted_before_filters_rejects() {
        let r = row(&[(0, "a")]);
        assert!(!row_matches(&table(&[(0, "a"), (1, "")]), &r));
    }

    #[test]
    fn test_all_filters_must_match() {
        let r = row(&[(0, "apple"), (2, "banana"), (4, "cherry")]);
        assert!(row_matches(&table(&[(0, "pp"), (4, "err")]), &r));
        assert!(!row_matches(&table(&[(0, "pp"), (4, "nope")]), &r));
    }

    #[test]
    fn test_repeated_column_filters_test_same_field() {
        let r = row(&[(0, "x"), (2, "foobar"), (3, "y")]);
        assert!(row_matches(&table(&[(2, "foo"), (2, "bar")]), &r));
        assert!(!row_matches(&table(&[(2, "foo"), (2, "baz")]), &r));
        assert!(row_matches(&table(&[(2, "foo"), (2, "bar"), (3, "y")]), &r));
    }

    #[test]
    fn test_binary_patterns() {
        let r = row(&[(0, "a\0b")]);
        assert!(row_matches(&table(&[(0, "\0")]), &r));
        assert!(row_matches(&table(&[(0, "")]), &row(&[(0, "")])));
        assert!(!row_matches(&table(&[(0, "abc")]), &row(&[(0, "ab")])));
    }

    #[test]
    fn test_long_value_near_miss() {
        let mut value = vec![b'a'; 1 << 20];
        let pattern: Vec<u8> = std::iter::repeat(b'a').take(1023).chain([b'b']).collect();
        let filters = FilterTable::new(vec![FilterEntry::new(0, pattern.clone())]);
        let miss = Row::new(vec![Field::new(0, value.clone())]).unwrap();
        assert!(!row_matches(&filters, &miss));

        value.extend_from_slice(&pattern);
        let hit = Row::new(vec![Field::new(0, value)]).unwrap();
        assert!(row_matches(&filters, &hit));
    }

    #[test]
    fn test_merge_agrees_with_linear_scan() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let alphabet = b"ab";

        for _ in 0..2000 {
            let mut fields = Vec::new();
            for column in 0..8u32 {
                if rng.gen_bool(0.6) {
                    let len = rng.gen_range(0..4);
                    let value: Vec<u8> = (0..len)
                        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                        .collect();
                    fields.push(Field::new(column, value));
                }
            }
            let r = Row::new(fields).unwrap();

            let filters = FilterTable::new(
                (0..rng.gen_range(0..5))
                    .map(|_| {
                        let len = rng.gen_range(0..3);
                        let pattern: Vec<u8> = (0..len)
                            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                            .collect();
                        FilterEntry::new(rng.gen_range(0..8), pattern)
                    })
                    .collect(),
            );

            assert_eq!(
                row_matches(&filters, &r),
                linear_matches(&filters, &r),
                "row {:?} filters {:?}",
                r,
                filters
            );
        }
    }
}
