//! Side-by-side row layout for cashbook tables

use serde::Serialize;

/// One table row: the i-th incoming and the i-th outgoing entry.
///
/// The two cells are unrelated; pairing is layout only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowPair<'a, T> {
    pub incoming: Option<&'a T>,
    pub outgoing: Option<&'a T>,
}

/// Lay out two lists in parallel rows, blank cells on the shorter side
pub fn pair_rows<'a, T>(incoming: &'a [T], outgoing: &'a [T]) -> Vec<RowPair<'a, T>> {
    let len = incoming.len().max(outgoing.len());
    (0..len)
        .map(|i| RowPair {
            incoming: incoming.get(i),
            outgoing: outgoing.get(i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longer_incoming_side() {
        let incoming = [1, 2, 3];
        let outgoing = [10];
        let rows = pair_rows(&incoming, &outgoing);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].incoming, Some(&1));
        assert_eq!(rows[0].outgoing, Some(&10));
        assert_eq!(rows[1].outgoing, None);
        assert_eq!(rows[2].incoming, Some(&3));
        assert_eq!(rows[2].outgoing, None);
    }

    #[test]
    fn test_longer_outgoing_side() {
        let incoming: [i32; 0] = [];
        let outgoing = [4, 5];
        let rows = pair_rows(&incoming, &outgoing);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.incoming.is_none()));
        assert_eq!(rows[1].outgoing, Some(&5));
    }

    #[test]
    fn test_both_empty() {
        let empty: [u8; 0] = [];
        assert!(pair_rows(&empty, &empty).is_empty());
    }
}
