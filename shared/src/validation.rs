//! Validation utilities for the Palm Oil Mill Management Platform
//!
//! Includes Indonesia-specific validations for compliance with local
//! document formats (NPWP, vehicle registration plates).

use rust_decimal::Decimal;

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate mill code format (3-10 uppercase alphanumeric)
pub fn validate_mill_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 3 {
        return Err("Mill code must be at least 3 characters");
    }
    if code.len() > 10 {
        return Err("Mill code must be at most 10 characters");
    }
    if !code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return Err("Mill code must be uppercase alphanumeric only");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a percentage value (0-100 inclusive)
pub fn validate_percent(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::from(100) {
        return Err("Percentage must be between 0 and 100");
    }
    Ok(())
}

/// Validate a payroll period string (YYYY-MM)
pub fn validate_payroll_period(period: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = period.split('-').collect();
    if parts.len() != 2 {
        return Err("Payroll period must be in format YYYY-MM");
    }
    if parts[0].len() != 4 || !parts[0].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid year in payroll period");
    }
    if parts[1].len() != 2 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid month in payroll period");
    }
    let month: u32 = parts[1].parse().map_err(|_| "Invalid month in payroll period")?;
    if !(1..=12).contains(&month) {
        return Err("Month must be between 01 and 12");
    }
    Ok(())
}

// ============================================================================
// Indonesia-Specific Validations
// ============================================================================

/// Validate Indonesian phone number format
/// Accepts: 081234567890, 0812-3456-7890, +6281234567890
pub fn validate_indonesian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Domestic format: 9-13 digits starting with 0 (e.g., 081234567890)
    if (9..=13).contains(&digits.len()) && digits.starts_with('0') {
        return Ok(());
    }
    // International format with country code 62
    if (10..=14).contains(&digits.len()) && digits.starts_with("62") {
        return Ok(());
    }

    Err("Invalid Indonesian phone number format")
}

/// Validate NPWP (Nomor Pokok Wajib Pajak, Indonesian tax number)
/// Accepts the classic 15-digit format (with or without punctuation)
/// and the 16-digit format in use since 2024.
pub fn validate_npwp(npwp: &str) -> Result<(), &'static str> {
    let digits: String = npwp.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 15 && digits.len() != 16 {
        return Err("NPWP must be 15 or 16 digits");
    }
    Ok(())
}

/// Validate Indonesian vehicle registration plate
/// Format: 1-2 letter region code, 1-4 digits, 1-3 letter suffix
/// (e.g., "BK 1234 XY", "B 1 A")
pub fn validate_vehicle_plate(plate: &str) -> Result<(), &'static str> {
    let parts: Vec<&str> = plate.split_whitespace().collect();

    if parts.len() != 3 {
        return Err("Vehicle plate must be in format: region number suffix");
    }

    let region = parts[0];
    if region.is_empty()
        || region.len() > 2
        || !region.chars().all(|c| c.is_ascii_uppercase())
    {
        return Err("Invalid region code in vehicle plate");
    }

    let number = parts[1];
    if number.is_empty() || number.len() > 4 || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err("Invalid number in vehicle plate");
    }

    let suffix = parts[2];
    if suffix.is_empty()
        || suffix.len() > 3
        || !suffix.chars().all(|c| c.is_ascii_uppercase())
    {
        return Err("Invalid suffix in vehicle plate");
    }

    Ok(())
}

/// Indonesian provinces with significant palm oil cultivation
pub const PALM_OIL_PROVINCES: &[&str] = &[
    "Riau",
    "Sumatera Utara",
    "Sumatera Selatan",
    "Sumatera Barat",
    "Jambi",
    "Aceh",
    "Bengkulu",
    "Lampung",
    "Kalimantan Barat",
    "Kalimantan Tengah",
    "Kalimantan Timur",
    "Kalimantan Selatan",
    "Sulawesi Barat",
    "Sulawesi Tengah",
    "Papua",
    "Papua Barat",
];

/// Validate province is a known palm-oil-growing region
pub fn validate_palm_oil_province(province: &str) -> Result<(), &'static str> {
    let province_lower = province.to_lowercase();

    if PALM_OIL_PROVINCES
        .iter()
        .any(|p| p.to_lowercase() == province_lower)
    {
        return Ok(());
    }

    Err("Province is not a recognized palm-oil-growing region")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.id").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }

    #[test]
    fn test_validate_mill_code_valid() {
        assert!(validate_mill_code("PKS").is_ok());
        assert!(validate_mill_code("PKS01").is_ok());
        assert!(validate_mill_code("ABCDEFGHIJ").is_ok());
    }

    #[test]
    fn test_validate_mill_code_invalid() {
        assert!(validate_mill_code("PK").is_err()); // Too short
        assert!(validate_mill_code("ABCDEFGHIJK").is_err()); // Too long
        assert!(validate_mill_code("pks").is_err()); // Lowercase
        assert!(validate_mill_code("PK-S").is_err()); // Special char
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_percent() {
        assert!(validate_percent(dec("0")).is_ok());
        assert!(validate_percent(dec("22.5")).is_ok());
        assert!(validate_percent(dec("100")).is_ok());
        assert!(validate_percent(dec("-1")).is_err());
        assert!(validate_percent(dec("100.01")).is_err());
    }

    #[test]
    fn test_validate_payroll_period_valid() {
        assert!(validate_payroll_period("2025-01").is_ok());
        assert!(validate_payroll_period("2024-12").is_ok());
    }

    #[test]
    fn test_validate_payroll_period_invalid() {
        assert!(validate_payroll_period("2025-13").is_err());
        assert!(validate_payroll_period("2025-00").is_err());
        assert!(validate_payroll_period("25-01").is_err());
        assert!(validate_payroll_period("2025/01").is_err());
        assert!(validate_payroll_period("202501").is_err());
    }

    // ========================================================================
    // Indonesia-Specific Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_indonesian_phone_valid() {
        // Standard mobile number
        assert!(validate_indonesian_phone("081234567890").is_ok());
        // With dashes
        assert!(validate_indonesian_phone("0812-3456-7890").is_ok());
        // International format
        assert!(validate_indonesian_phone("+6281234567890").is_ok());
        assert!(validate_indonesian_phone("6281234567890").is_ok());
        // Landline
        assert!(validate_indonesian_phone("0761123456").is_ok());
    }

    #[test]
    fn test_validate_indonesian_phone_invalid() {
        assert!(validate_indonesian_phone("12345").is_err());
        assert!(validate_indonesian_phone("98765432109876").is_err());
        assert!(validate_indonesian_phone("abcdefghij").is_err());
    }

    #[test]
    fn test_validate_npwp_valid() {
        // Classic 15-digit format with punctuation
        assert!(validate_npwp("01.234.567.8-912.345").is_ok());
        // Bare digits
        assert!(validate_npwp("012345678912345").is_ok());
        // 16-digit format
        assert!(validate_npwp("0123456789123456").is_ok());
    }

    #[test]
    fn test_validate_npwp_invalid() {
        assert!(validate_npwp("12345").is_err());
        assert!(validate_npwp("01234567891234567").is_err());
    }

    #[test]
    fn test_validate_vehicle_plate_valid() {
        assert!(validate_vehicle_plate("BK 1234 XY").is_ok());
        assert!(validate_vehicle_plate("B 1 A").is_ok());
        assert!(validate_vehicle_plate("BM 8812 TBS").is_ok());
    }

    #[test]
    fn test_validate_vehicle_plate_invalid() {
        assert!(validate_vehicle_plate("BK1234XY").is_err()); // No spaces
        assert!(validate_vehicle_plate("BKL 1234 XY").is_err()); // Region too long
        assert!(validate_vehicle_plate("BK 12345 XY").is_err()); // Number too long
        assert!(validate_vehicle_plate("bk 1234 xy").is_err()); // Lowercase
    }

    #[test]
    fn test_validate_palm_oil_province() {
        assert!(validate_palm_oil_province("Riau").is_ok());
        assert!(validate_palm_oil_province("sumatera utara").is_ok()); // Case insensitive
        assert!(validate_palm_oil_province("Jakarta").is_err());
        assert!(validate_palm_oil_province("Unknown").is_err());
    }
}
