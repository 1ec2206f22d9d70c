//! Pure validation helpers for delivery-note input
//!
//! Kept free of any persistence concern so both the backend services and
//! the DB-free test suites exercise the same rules.

use rust_decimal::Decimal;

/// A line quantity must be strictly positive
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than 0");
    }
    Ok(())
}

/// A line unit price must not be negative
pub fn validate_unit_price(unit_price: Decimal) -> Result<(), &'static str> {
    if unit_price < Decimal::ZERO {
        return Err("Unit price cannot be negative");
    }
    Ok(())
}

/// A delivery note carries at least one line
pub fn validate_line_count(count: usize) -> Result<(), &'static str> {
    if count == 0 {
        return Err("A delivery note requires at least one line");
    }
    Ok(())
}

/// Purchase-note numeros are caller-supplied positive integers
pub fn validate_purchase_numero(numero: i64) -> Result<(), &'static str> {
    if numero <= 0 {
        return Err("Numero must be a positive integer");
    }
    Ok(())
}

/// Purchase lines carry a required free-text description
pub fn validate_line_description(description: &str) -> Result<(), &'static str> {
    if description.trim().is_empty() {
        return Err("Line description cannot be empty");
    }
    Ok(())
}
