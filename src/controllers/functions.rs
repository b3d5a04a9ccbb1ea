use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};
use storefront_api::models::{CartItem, Product};

/// Price of one cart line at the product's current price.
pub fn line_total(product: &Product, quantity: i32) -> Decimal {
    product.current_price() * Decimal::from(quantity)
}

/// Sum of line totals over a loaded cart; zero for an empty cart.
pub fn cart_subtotal(lines: &[(CartItem, Product)]) -> Decimal {
    lines
        .iter()
        .map(|(item, product)| line_total(product, item.quantity))
        .sum()
}

/// Percentage discount on a subtotal, in decimal arithmetic, rounded half-up
/// to cents.
pub fn compute_discount(subtotal: Decimal, discount_percent: i32) -> Decimal {
    (subtotal * Decimal::from(discount_percent) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Human-readable order reference: fixed prefix plus six random digits.
/// Uniqueness is the caller's problem; collisions get re-drawn there.
pub fn generate_order_number() -> String {
    let mut rng = rand::rng();
    format!("ORD{}", rng.random_range(100_000..=999_999))
}

/// URL-safe slug: lowercase ASCII alphanumerics with single dashes between
/// runs of anything else. Falls back to "item" for names with no usable
/// characters.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// Deterministic base-plus-counter candidates: "base", "base-1", "base-2", ...
pub fn slug_candidate(base: &str, counter: u32) -> String {
    if counter == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn product(id: i32, price: Decimal, discount_price: Option<Decimal>) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id,
            category_id: 1,
            name: format!("Product {}", id),
            slug: format!("product-{}", id),
            description: String::new(),
            price,
            discount_price,
            stock: 100,
            is_trending: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn cart_item(id: i32, product_id: i32, quantity: i32) -> CartItem {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CartItem {
            id,
            user_id: 1,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    fn two_line_cart() -> Vec<(CartItem, Product)> {
        vec![
            (cart_item(1, 1, 2), product(1, Decimal::new(1000, 2), None)),
            (cart_item(2, 2, 1), product(2, Decimal::new(500, 2), None)),
        ]
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() {
        assert_eq!(cart_subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn subtotal_sums_line_totals() {
        // 10.00 x 2 + 5.00 x 1 = 25.00
        assert_eq!(cart_subtotal(&two_line_cart()), Decimal::new(2500, 2));
    }

    #[test]
    fn line_total_uses_discount_price() {
        let p = product(1, Decimal::new(1000, 2), Some(Decimal::new(800, 2)));
        assert_eq!(line_total(&p, 3), Decimal::new(2400, 2));
    }

    #[test]
    fn ten_percent_off_twenty_five() {
        let subtotal = cart_subtotal(&two_line_cart());
        let discount = compute_discount(subtotal, 10);
        assert_eq!(discount, Decimal::new(250, 2));
        assert_eq!(subtotal - discount, Decimal::new(2250, 2));
    }

    #[test]
    fn zero_percent_discount_is_zero() {
        assert_eq!(compute_discount(Decimal::new(2500, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn discount_rounds_half_up_to_cents() {
        // 3.33 * 5% = 0.1665 -> 0.17
        assert_eq!(
            compute_discount(Decimal::new(333, 2), 5),
            Decimal::new(17, 2)
        );
    }

    #[test]
    fn totals_recompose_to_subtotal() {
        let subtotal = Decimal::new(2500, 2);
        let discount = compute_discount(subtotal, 10);
        let total = subtotal - discount;
        assert_eq!(total + discount, subtotal);
    }

    #[test]
    fn order_number_shape() {
        for _ in 0..50 {
            let number = generate_order_number();
            assert!(number.starts_with("ORD"));
            let digits = &number[3..];
            assert_eq!(digits.len(), 6);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn slugify_normalizes() {
        assert_eq!(slugify("Wireless Mouse"), "wireless-mouse");
        assert_eq!(slugify("  USB-C   Cable!! "), "usb-c-cable");
        assert_eq!(slugify("Déjà Vu"), "d-j-vu");
        assert_eq!(slugify("???"), "item");
    }

    #[test]
    fn slug_candidates_are_base_plus_counter() {
        assert_eq!(slug_candidate("mouse", 0), "mouse");
        assert_eq!(slug_candidate("mouse", 1), "mouse-1");
        assert_eq!(slug_candidate("mouse", 7), "mouse-7");
    }
}
