//! Purchase delivery-note ledger tests
//!
//! DB-free model of the purchase ledger's semantics:
//! - caller-supplied positive-integer numeros, unique and immutable
//! - required free-text line descriptions
//! - stock INCREASE on create, decrease on reversal (inverse of sales)

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    product_id: u32,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
}

fn line(product_id: u32, description: &str, quantity: &str, unit_price: &str) -> Line {
    Line {
        product_id,
        description: description.to_string(),
        quantity: dec(quantity),
        unit_price: dec(unit_price),
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Note {
    numero: i64,
    lines: Vec<Line>,
}

/// In-memory model of the purchase ledger
#[derive(Debug, Clone, PartialEq, Default)]
struct PurchaseLedger {
    stock: BTreeMap<u32, Decimal>,
    notes: BTreeMap<u32, Note>,
    numeros: BTreeSet<i64>,
    next_id: u32,
}

impl PurchaseLedger {
    fn add_product(&mut self, product_id: u32, baseline: &str) {
        self.stock.insert(product_id, dec(baseline));
    }

    fn validate(&self, lines: &[Line]) -> Result<(), &'static str> {
        if lines.is_empty() {
            return Err("empty line set");
        }
        for l in lines {
            if l.description.trim().is_empty() {
                return Err("empty description");
            }
            if l.quantity <= Decimal::ZERO {
                return Err("non-positive quantity");
            }
            if l.unit_price < Decimal::ZERO {
                return Err("negative unit price");
            }
            if !self.stock.contains_key(&l.product_id) {
                return Err("unknown product");
            }
        }
        Ok(())
    }

    /// Create with the supplier's numero; duplicates are the caller's
    /// error, not a race to retry
    fn create(&mut self, numero: i64, lines: Vec<Line>) -> Result<u32, &'static str> {
        if numero <= 0 {
            return Err("non-positive numero");
        }
        self.validate(&lines)?;
        if !self.numeros.insert(numero) {
            return Err("duplicate numero");
        }

        for l in &lines {
            *self.stock.get_mut(&l.product_id).unwrap() += l.quantity;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.notes.insert(id, Note { numero, lines });
        Ok(id)
    }

    /// Full-document edit; numero untouched, reverse-and-reapply inverted
    fn update(&mut self, note_id: u32, new_lines: Vec<Line>) -> Result<(), &'static str> {
        if !self.notes.contains_key(&note_id) {
            return Err("note not found");
        }
        self.validate(&new_lines)?;

        let old_lines = self.notes[&note_id].lines.clone();
        for l in &old_lines {
            *self.stock.get_mut(&l.product_id).unwrap() -= l.quantity;
        }
        for l in &new_lines {
            *self.stock.get_mut(&l.product_id).unwrap() += l.quantity;
        }
        self.notes.get_mut(&note_id).unwrap().lines = new_lines;
        Ok(())
    }

    /// Delete: subtract every current line back out, remove the document
    fn delete(&mut self, note_id: u32) -> Result<(), &'static str> {
        let note = self.notes.remove(&note_id).ok_or("note not found")?;
        for l in &note.lines {
            *self.stock.get_mut(&l.product_id).unwrap() -= l.quantity;
        }
        Ok(())
    }

    fn stock_of(&self, product_id: u32) -> Decimal {
        self.stock[&product_id]
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Receiving goods increases stock
    #[test]
    fn test_purchase_increases_stock() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "50");

        ledger
            .create(4217, vec![line(1, "Sacs 25kg", "10", "8.00")])
            .unwrap();
        assert_eq!(ledger.stock_of(1), dec("60"));
    }

    /// The numero comes from the supplier's paperwork, not a sequence
    #[test]
    fn test_numeros_are_caller_supplied() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "0");

        let a = ledger
            .create(900, vec![line(1, "Premier arrivage", "1", "1.00")])
            .unwrap();
        let b = ledger
            .create(17, vec![line(1, "Second arrivage", "1", "1.00")])
            .unwrap();

        assert_eq!(ledger.notes[&a].numero, 900);
        assert_eq!(ledger.notes[&b].numero, 17);
    }

    /// Reusing a numero is rejected and leaves stock untouched
    #[test]
    fn test_duplicate_numero_rejected() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "0");
        ledger
            .create(42, vec![line(1, "Arrivage", "5", "2.00")])
            .unwrap();
        let before = ledger.clone();

        assert_eq!(
            ledger.create(42, vec![line(1, "Doublon", "3", "2.00")]),
            Err("duplicate numero")
        );
        assert_eq!(ledger, before);
    }

    /// Zero and negative numeros fail format validation
    #[test]
    fn test_non_positive_numero_rejected() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "0");

        assert!(ledger.create(0, vec![line(1, "X", "1", "1.00")]).is_err());
        assert!(ledger.create(-5, vec![line(1, "X", "1", "1.00")]).is_err());
    }

    /// The free-text description is required per line
    #[test]
    fn test_blank_description_rejected() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "10");
        let before = ledger.clone();

        assert_eq!(
            ledger.create(1, vec![line(1, "   ", "5", "2.00")]),
            Err("empty description")
        );
        assert_eq!(ledger, before);
    }

    /// Edit reverses the old lines (decrease) then applies the new ones
    #[test]
    fn test_update_reverses_and_reapplies() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "50");
        let note = ledger
            .create(7, vec![line(1, "Arrivage", "10", "8.00")])
            .unwrap();
        assert_eq!(ledger.stock_of(1), dec("60"));

        // -10 then +4
        ledger
            .update(note, vec![line(1, "Arrivage corrigé", "4", "8.00")])
            .unwrap();
        assert_eq!(ledger.stock_of(1), dec("54"));
    }

    /// Delete subtracts the document's contribution exactly once
    #[test]
    fn test_delete_reverses_once() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "50");
        let note = ledger
            .create(7, vec![line(1, "Arrivage", "10", "8.00")])
            .unwrap();

        ledger.delete(note).unwrap();
        assert_eq!(ledger.stock_of(1), dec("50"));

        let after_first = ledger.clone();
        assert_eq!(ledger.delete(note), Err("note not found"));
        assert_eq!(ledger, after_first);
    }

    /// A stale existence check never licenses a second reversal on the
    /// purchase side either: the removal is the guard, so of two racing
    /// deleters only the winner subtracts the contribution back out
    #[test]
    fn test_racing_deleters_reverse_once() {
        let mut ledger = PurchaseLedger::default();
        ledger.add_product(1, "50");
        let note = ledger
            .create(7, vec![line(1, "Arrivage", "10", "8.00")])
            .unwrap();
        assert_eq!(ledger.stock_of(1), dec("60"));

        let seen_by_a = ledger.notes.contains_key(&note);
        let seen_by_b = ledger.notes.contains_key(&note);
        assert!(seen_by_a && seen_by_b);

        assert!(ledger.delete(note).is_ok());
        assert_eq!(ledger.delete(note), Err("note not found"));
        assert_eq!(ledger.stock_of(1), dec("50"));
    }

    /// Combined direction check: purchases count positive, sales negative.
    /// A product at 50 receiving 10 and shipping 8 lands at 52.
    #[test]
    fn test_combined_direction_arithmetic() {
        let baseline = dec("50");
        let purchased = dec("10");
        let sold = dec("8");

        assert_eq!(baseline + purchased - sold, dec("52"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(|n| Decimal::new(n, 1)) // 0.1 to 1000.0
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100000i64).prop_map(|n| Decimal::new(n, 2)) // 0.00 to 1000.00
    }

    fn line_strategy() -> impl Strategy<Value = Line> {
        (1u32..=3, quantity_strategy(), price_strategy()).prop_map(
            |(product_id, quantity, unit_price)| Line {
                product_id,
                description: "Ligne fournisseur".to_string(),
                quantity,
                unit_price,
            },
        )
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<Line>> {
        prop::collection::vec(line_strategy(), 1..5)
    }

    fn ledger_with_products() -> PurchaseLedger {
        let mut ledger = PurchaseLedger::default();
        for product_id in 1..=3 {
            ledger.add_product(product_id, "0");
        }
        ledger
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Stock invariant, purchase side: stock equals the sum of all
        /// currently-existing purchase lines per product
        #[test]
        fn prop_stock_equals_existing_lines(
            inputs in prop::collection::vec(lines_strategy(), 1..8),
            delete_mask in prop::collection::vec(any::<bool>(), 8)
        ) {
            let mut ledger = ledger_with_products();

            let ids: Vec<u32> = inputs
                .into_iter()
                .enumerate()
                .map(|(i, lines)| ledger.create(i as i64 + 1, lines).unwrap())
                .collect();

            for (id, delete) in ids.iter().zip(delete_mask.iter()) {
                if *delete {
                    ledger.delete(*id).unwrap();
                }
            }

            for product_id in 1..=3 {
                let expected: Decimal = ledger
                    .notes
                    .values()
                    .flat_map(|n| n.lines.iter())
                    .filter(|l| l.product_id == product_id)
                    .map(|l| l.quantity)
                    .sum();
                prop_assert_eq!(ledger.stock_of(product_id), expected);
            }
        }

        /// Reversibility: edit then edit-back restores stock exactly
        #[test]
        fn prop_update_roundtrip_restores_stock(
            original in lines_strategy(),
            replacement in lines_strategy()
        ) {
            let mut ledger = ledger_with_products();
            let note = ledger.create(1, original.clone()).unwrap();
            let snapshot: Vec<Decimal> = (1..=3).map(|p| ledger.stock_of(p)).collect();

            ledger.update(note, replacement).unwrap();
            ledger.update(note, original).unwrap();

            let restored: Vec<Decimal> = (1..=3).map(|p| ledger.stock_of(p)).collect();
            prop_assert_eq!(restored, snapshot);
        }

        /// Distinct caller numeros all succeed; any repeat fails and the
        /// ledger is left exactly as it was
        #[test]
        fn prop_numero_uniqueness_enforced(
            numeros in prop::collection::vec(1i64..50, 2..20)
        ) {
            let mut ledger = ledger_with_products();
            let mut seen = BTreeSet::new();

            for numero in numeros {
                let before = ledger.clone();
                let result = ledger.create(
                    numero,
                    vec![line(1, "Arrivage", "1", "1.00")],
                );
                if seen.insert(numero) {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert_eq!(result, Err("duplicate numero"));
                    prop_assert_eq!(&ledger, &before);
                }
            }
        }

        /// Create followed by delete leaves stock at its pre-call values
        #[test]
        fn prop_create_delete_is_neutral(lines in lines_strategy()) {
            let mut ledger = ledger_with_products();
            let note = ledger.create(1, lines).unwrap();
            ledger.delete(note).unwrap();

            for product_id in 1..=3 {
                prop_assert_eq!(ledger.stock_of(product_id), Decimal::ZERO);
            }
        }
    }
}
