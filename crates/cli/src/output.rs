//! Terminal output helpers.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use rust_decimal::Decimal;

use bazaar_core::{CartItem, Order, format_money};
use bazaar_storefront::api::{Address, Product};
use bazaar_storefront::services::Totals;

/// Print a line of command output.
pub fn line(text: &str) {
    println!("{text}");
}

/// Print a hint for the user on stderr.
pub fn hint(text: &str) {
    eprintln!("{text}");
}

/// Print an error for the user on stderr.
pub fn error(text: &str) {
    eprintln!("error: {text}");
}

pub fn products(products: &[Product]) {
    if products.is_empty() {
        line("No products found.");
        return;
    }
    for product in products {
        let price = product
            .price
            .or_else(|| product.items.iter().find_map(|i| i.price))
            .map_or_else(|| "-".to_string(), format_money);
        println!(
            "{:>6}  {:<40}  {:>10}  {}",
            product.id,
            product.name,
            price,
            product.category.as_deref().unwrap_or("")
        );
    }
}

pub fn product(product: &Product) {
    println!("{} (#{})", product.name, product.id);
    if let Some(category) = &product.category {
        println!("Category: {category}");
    }
    if !product.description.is_empty() {
        println!("\n{}\n", product.description);
    }
    for item in &product.items {
        let price = product
            .unit_price(item)
            .map_or_else(|| "-".to_string(), format_money);
        let stock = item
            .quantity_in_stock
            .map_or_else(String::new, |n| format!("{n} in stock"));
        println!(
            "  item {:>6}  {:<8}  {:>10}  {}",
            item.id,
            item.size.as_deref().unwrap_or("-"),
            price,
            stock
        );
    }
}

pub fn cart(items: &[CartItem]) {
    if items.is_empty() {
        line("Your cart is empty.");
        return;
    }
    let mut subtotal = Decimal::ZERO;
    for item in items {
        subtotal += item.line_total();
        println!(
            "{:>6}  {:<32}  {:<6}  {:>3} x {:>9}  = {:>10}",
            item.id,
            item.name,
            item.size.as_deref().unwrap_or(""),
            item.quantity,
            format_money(item.price),
            format_money(item.line_total())
        );
    }
    println!("Subtotal: {}", format_money(subtotal));
}

pub fn totals(totals: &Totals) {
    println!("Subtotal: {:>10}", format_money(totals.subtotal));
    println!("Shipping: {:>10}", format_money(totals.shipping));
    println!("Tax:      {:>10}", format_money(totals.tax));
    if !totals.discount.is_zero() {
        println!("Discount: {:>10}", format_money(-totals.discount));
    }
    println!("Total:    {:>10}", format_money(totals.total));
}

pub fn orders(orders: &[Order]) {
    if orders.is_empty() {
        line("No orders yet.");
        return;
    }
    for order in orders {
        println!(
            "{:>6}  {:<16}  {:>10}  {:<12}  {}",
            order.id,
            order.order_number,
            format_money(order.total_amount),
            order.status.name,
            order
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        );
    }
}

pub fn order(order: &Order) {
    println!("Order {} (#{})", order.order_number, order.id);
    println!("Status: {}", order.status.name);
    for line in &order.order_lines {
        println!(
            "  {:<32}  {:>3} x {:>9}",
            line.name.as_deref().unwrap_or("item"),
            line.qty,
            line.price.map_or_else(|| "-".to_string(), format_money)
        );
    }
    println!("Total: {}", format_money(order.total_amount));
}

pub fn addresses(addresses: &[Address]) {
    if addresses.is_empty() {
        line("No saved addresses.");
        return;
    }
    for address in addresses {
        println!(
            "{:>4}{} {}, {}, {} {}{}",
            address.id,
            if address.is_default { "*" } else { " " },
            address.address,
            address.city,
            address.region,
            address.postal_code,
            address
                .country
                .as_ref()
                .and_then(|c| c.form_value())
                .map(|c| format!(", {c}"))
                .unwrap_or_default()
        );
    }
}
