//! Input validation for API requests.
//!
//! Field-level rules for request bodies, queries, and params. Handlers run
//! these before touching the store and translate failures into 400 responses.

use lazy_static::lazy_static;
use regex::Regex;

/// Fixed color palette for goods and order line items
pub const COLORS: [&str; 7] = ["white", "black", "grey", "blue", "green", "red", "pastel"];

/// Fixed size list for goods and order line items
pub const SIZES: [&str; 7] = ["XXS", "XS", "S", "M", "L", "XL", "XXL"];

/// Gender values for goods
pub const GENDERS: [&str; 3] = ["men", "women", "unisex"];

/// Order status values
pub const ORDER_STATUSES: [&str; 4] = ["processing", "packing", "success", "declined"];

/// Valid feedback rates (half-step increments)
pub const RATE_STEPS: [f64; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5, 5.0];

lazy_static! {
    /// Regex for validating Ukrainian phone numbers (+380 followed by 9-10 digits)
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+380\d{9,10}$").unwrap();

    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();

    /// Regex for validating a comma-separated size filter list
    static ref SIZES_FILTER_REGEX: Regex = Regex::new(
        r"^(XXS|XS|S|M|L|XL|XXL)(,(XXS|XS|S|M|L|XL|XXL))*$"
    ).unwrap();

    /// Regex for validating a "min,max" price range
    static ref PRICE_RANGE_REGEX: Regex = Regex::new(r"^\d+(\.\d+)?,\d+(\.\d+)?$").unwrap();
}

/// Validate a phone number
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone is required".to_string());
    }

    if !PHONE_REGEX.is_match(phone) {
        return Err("Phone number must be +380 followed by 9-10 digits".to_string());
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a password (8-64 characters)
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 64 {
        return Err("Password must be at most 64 characters".to_string());
    }

    Ok(())
}

/// Validate the name supplied at registration (only an upper bound applies)
pub fn validate_register_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > 32 {
        return Err("Name must be at most 32 characters".to_string());
    }

    Ok(())
}

/// Validate a profile name field (2-32 characters)
pub fn validate_profile_name(name: &str, field: &str) -> Result<(), String> {
    let len = name.chars().count();
    if len < 2 {
        return Err(format!("{} must be at least 2 characters", field));
    }

    if len > 32 {
        return Err(format!("{} must be at most 32 characters", field));
    }

    Ok(())
}

/// Validate a city name
pub fn validate_city(city: &str) -> Result<(), String> {
    if city.trim().is_empty() {
        return Err("City is required".to_string());
    }

    Ok(())
}

/// Validate a postal office number
pub fn validate_postal_office(postal_office: i64) -> Result<(), String> {
    if postal_office < 1 {
        return Err("Postal office must be at least 1".to_string());
    }

    Ok(())
}

/// Validate a feedback author name (2-53 characters)
pub fn validate_author(author: &str) -> Result<(), String> {
    let len = author.chars().count();
    if len < 2 {
        return Err("Author must be at least 2 characters".to_string());
    }

    if len > 53 {
        return Err("Author must be at most 53 characters".to_string());
    }

    Ok(())
}

/// Validate a feedback description (non-empty, max 500 characters)
pub fn validate_feedback_description(description: &str) -> Result<(), String> {
    if description.is_empty() {
        return Err("Description is required".to_string());
    }

    if description.chars().count() > 500 {
        return Err("Description must be at most 500 characters".to_string());
    }

    Ok(())
}

/// Validate a feedback rate (half-step increments from 1.0 to 5.0)
pub fn validate_rate(rate: f64) -> Result<(), String> {
    if !RATE_STEPS.contains(&rate) {
        return Err("Rate must be a half-step value between 1 and 5".to_string());
    }

    Ok(())
}

/// Validate a color against the fixed palette
pub fn validate_color(color: &str) -> Result<(), String> {
    if !COLORS.contains(&color) {
        return Err(format!(
            "Invalid color. Must be one of: {}",
            COLORS.join(", ")
        ));
    }

    Ok(())
}

/// Validate a single size against the fixed size list
pub fn validate_size(size: &str) -> Result<(), String> {
    if !SIZES.contains(&size) {
        return Err(format!("Invalid size. Must be one of: {}", SIZES.join(", ")));
    }

    Ok(())
}

/// Validate a gender value
pub fn validate_gender(gender: &str) -> Result<(), String> {
    if !GENDERS.contains(&gender) {
        return Err(format!(
            "Invalid gender. Must be one of: {}",
            GENDERS.join(", ")
        ));
    }

    Ok(())
}

/// Validate an order status value
pub fn validate_order_status(status: &str) -> Result<(), String> {
    if !ORDER_STATUSES.contains(&status) {
        return Err(format!(
            "Invalid status. Must be one of: {}",
            ORDER_STATUSES.join(", ")
        ));
    }

    Ok(())
}

/// Validate a comma-separated size filter list (e.g. "S,M,XL")
pub fn validate_sizes_filter(sizes: &str) -> Result<(), String> {
    if !SIZES_FILTER_REGEX.is_match(sizes) {
        return Err("Invalid sizes filter format".to_string());
    }

    Ok(())
}

/// Parse and validate a "min,max" price range
pub fn parse_price_range(price: &str) -> Result<(f64, f64), String> {
    if !PRICE_RANGE_REGEX.is_match(price) {
        return Err("Price range must be two numbers separated by a comma".to_string());
    }

    let mut parts = price.splitn(2, ',');
    let from: f64 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| "Invalid price range".to_string())?;
    let to: f64 = parts
        .next()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| "Invalid price range".to_string())?;

    if from > to {
        return Err("Price range lower bound exceeds upper bound".to_string());
    }

    Ok((from, to))
}

/// Validate that a required string field is present
pub fn validate_required(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    Ok(())
}

/// Validate a page number (1-indexed)
pub fn validate_page(page: i64) -> Result<(), String> {
    if page < 1 {
        return Err("Page must be at least 1".to_string());
    }

    Ok(())
}

/// Validate an items-per-page value against endpoint-specific bounds
pub fn validate_per_page(per_page: i64, min: i64, max: i64) -> Result<(), String> {
    if per_page < min || per_page > max {
        return Err(format!("perPage must be between {} and {}", min, max));
    }

    Ok(())
}

/// Validate an entity id (positive integer)
pub fn validate_id(id: i64, field: &str) -> Result<(), String> {
    if id < 1 {
        return Err(format!("Invalid {} format", field));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+380501234567").is_ok());
        assert!(validate_phone("+3805012345678").is_ok());

        assert!(validate_phone("").is_err());
        assert!(validate_phone("+38050123456").is_err()); // 8 digits
        assert!(validate_phone("+38050123456789").is_err()); // 11 digits
        assert!(validate_phone("0501234567").is_err());
        assert!(validate_phone("+380abc234567").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password(&"x".repeat(64)).is_ok());

        assert!(validate_password("").is_err());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_rate() {
        assert!(validate_rate(1.0).is_ok());
        assert!(validate_rate(3.5).is_ok());
        assert!(validate_rate(5.0).is_ok());

        assert!(validate_rate(0.5).is_err());
        assert!(validate_rate(3.3).is_err());
        assert!(validate_rate(5.5).is_err());
    }

    #[test]
    fn test_validate_sizes_filter() {
        assert!(validate_sizes_filter("S").is_ok());
        assert!(validate_sizes_filter("S,M,XL").is_ok());
        assert!(validate_sizes_filter("XXS,XXL").is_ok());

        assert!(validate_sizes_filter("").is_err());
        assert!(validate_sizes_filter("S,").is_err());
        assert!(validate_sizes_filter("XXXL").is_err());
        assert!(validate_sizes_filter("s,m").is_err());
    }

    #[test]
    fn test_parse_price_range() {
        assert_eq!(parse_price_range("100,500").unwrap(), (100.0, 500.0));
        assert_eq!(parse_price_range("0,99.5").unwrap(), (0.0, 99.5));

        assert!(parse_price_range("100").is_err());
        assert!(parse_price_range("abc,100").is_err());
        assert!(parse_price_range("500,100").is_err());
        assert!(parse_price_range("-10,100").is_err());
    }

    #[test]
    fn test_validate_color_and_gender() {
        assert!(validate_color("pastel").is_ok());
        assert!(validate_color("magenta").is_err());

        assert!(validate_gender("unisex").is_ok());
        assert!(validate_gender("other").is_err());
    }

    #[test]
    fn test_validate_pagination() {
        assert!(validate_page(1).is_ok());
        assert!(validate_page(0).is_err());

        assert!(validate_per_page(8, 5, 20).is_ok());
        assert!(validate_per_page(4, 5, 20).is_err());
        assert!(validate_per_page(21, 5, 20).is_err());
    }

    #[test]
    fn test_validate_order_status() {
        assert!(validate_order_status("processing").is_ok());
        assert!(validate_order_status("declined").is_ok());
        assert!(validate_order_status("shipped").is_err());
    }

    #[test]
    fn test_validate_profile_name() {
        assert!(validate_profile_name("Al", "firstName").is_ok());
        assert!(validate_profile_name("A", "firstName").is_err());
        assert!(validate_profile_name(&"x".repeat(33), "lastName").is_err());
    }
}
