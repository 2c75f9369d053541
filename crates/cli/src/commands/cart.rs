//! Cart commands.

use bazaar_core::{ProductId, ProductItemId, format_money};
use bazaar_storefront::Storefront;
use bazaar_storefront::error::add_breadcrumb;

use super::CartAction;
use crate::error::CliError;
use crate::output;

pub async fn run(shop: &Storefront, action: CartAction) -> Result<(), CliError> {
    let cart = shop.cart();
    match action {
        CartAction::List => output::cart(&cart.get_cart()),
        CartAction::Add { product, item, qty } => {
            let product = shop.catalog().product(ProductId::new(product)).await?;
            let chosen = match item {
                Some(id) => product.item(ProductItemId::new(id)),
                None => product.items.first(),
            }
            .ok_or_else(|| CliError::Usage(format!("{} has no such item", product.name)))?;
            let line = product.to_cart_item(chosen, qty).ok_or_else(|| {
                CliError::Usage(format!("{} has no price and cannot be bought", product.name))
            })?;

            let item_id = line.id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("product_item_id", item_id.as_str())]));
            output::cart(&cart.add_to_cart(line)?);
        }
        CartAction::Remove { item } => {
            output::cart(&cart.remove_from_cart(ProductItemId::new(item))?);
        }
        CartAction::Update { item, qty } => {
            output::cart(&cart.update_quantity(ProductItemId::new(item), qty)?);
        }
        CartAction::Clear => {
            cart.clear_cart()?;
            output::line("Cart cleared.");
        }
    }
    Ok(())
}

pub async fn coupon(shop: &Storefront, code: &str) -> Result<(), CliError> {
    let coupon = shop.cart().validate_coupon(shop.api(), code).await?;
    let totals = shop.checkout().totals(Some(&coupon));
    output::line(&format!(
        "Coupon {} applies: {} off.",
        coupon.code,
        format_money(totals.discount)
    ));
    output::totals(&totals);
    Ok(())
}
