//! Catalog commands.

use bazaar_core::{CategoryId, ProductId};
use bazaar_storefront::Storefront;
use bazaar_storefront::api::ProductQuery;

use super::ProductArgs;
use crate::error::CliError;
use crate::output;

pub async fn products(shop: &Storefront, args: ProductArgs) -> Result<(), CliError> {
    let query = ProductQuery {
        search: args.search,
        category: args.category.map(CategoryId::new),
        page: args.page,
    };

    // A one-shot command has nothing to supersede it, so the debouncer
    // just adds its quiet period and normalizes the term.
    let products = match shop.search().search(query).await? {
        Some(products) => products,
        None => return Ok(()),
    };
    output::products(&products);
    Ok(())
}

pub async fn product(shop: &Storefront, id: i32) -> Result<(), CliError> {
    let product = shop.catalog().product(ProductId::new(id)).await?;
    output::product(&product);
    Ok(())
}

pub async fn categories(shop: &Storefront, random: bool) -> Result<(), CliError> {
    let categories = if random {
        shop.catalog().random_categories().await?
    } else {
        shop.catalog().categories().await?
    };
    for category in categories {
        output::line(&format!("{:>4}  {}", category.id, category.name));
    }
    Ok(())
}
