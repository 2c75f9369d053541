//! Order, address and coupon commands.

use bazaar_core::{CouponStatus, DiscountId, OrderId, StatusId, format_money};
use bazaar_storefront::Storefront;
use bazaar_storefront::api::{AddressInput, DiscountInput, Route};

use super::{AddressAction, DiscountAction, OrderAction, require_route};
use crate::error::CliError;
use crate::output;

pub async fn orders(shop: &Storefront, action: OrderAction) -> Result<(), CliError> {
    require_route(shop, &Route::Orders)?;
    let orders = shop.orders();
    match action {
        OrderAction::List => output::orders(&orders.list_orders().await?),
        OrderAction::Show { id } => output::order(&orders.order(OrderId::new(id)).await?),
        OrderAction::SetStatus { id, status } => {
            require_route(shop, &Route::Admin)?;
            let order = orders
                .update_status(OrderId::new(id), StatusId::new(status))
                .await?;
            output::line(&format!("Order {} is now {}.", order.order_number, order.status.name));
        }
        OrderAction::Statuses => {
            for status in shop.catalog().statuses().await? {
                output::line(&format!("{:>4}  {}", status.id, status.name));
            }
        }
    }
    Ok(())
}

pub async fn addresses(shop: &Storefront, action: AddressAction) -> Result<(), CliError> {
    if !matches!(action, AddressAction::Countries) {
        require_route(shop, &Route::Profile)?;
    }
    match action {
        AddressAction::List => output::addresses(&shop.orders().addresses().await?),
        AddressAction::Add {
            name,
            address,
            city,
            region,
            postal_code,
            phone,
            country,
            default,
        } => {
            let input = AddressInput {
                full_name: name,
                address,
                city,
                region,
                postal_code,
                phone,
                country,
                is_default: default,
            };
            let saved = shop.orders().create_address(&input).await?;
            output::line(&format!("Address {} saved.", saved.id));
        }
        AddressAction::Countries => {
            for country in shop.catalog().countries().await? {
                output::line(&format!(
                    "{:>4}  {:<4}  {}",
                    country.id,
                    country.code.as_deref().unwrap_or(""),
                    country.name
                ));
            }
        }
    }
    Ok(())
}

pub async fn discounts(shop: &Storefront, action: DiscountAction) -> Result<(), CliError> {
    require_route(shop, &Route::Admin)?;
    let discounts = shop.discounts();
    match action {
        DiscountAction::List => {
            for coupon in discounts.list().await? {
                output::line(&format!(
                    "{:<16}  {:>6}%  {:>4}/{:<6}  {:?}",
                    coupon.code,
                    coupon.discount_percentage,
                    coupon.used_count,
                    coupon
                        .usage_limit
                        .map_or_else(|| "-".to_string(), |l| l.to_string()),
                    coupon.status
                ));
            }
        }
        DiscountAction::Show { code } => {
            let coupon = discounts.get(&code).await?;
            output::line(&format!(
                "{}: {}% off, used {} time(s), {:?}",
                coupon.code, coupon.discount_percentage, coupon.used_count, coupon.status
            ));
            if let Some(amount) = coupon.discount_amount {
                output::line(&format!("Fixed amount: {}", format_money(amount)));
            }
        }
        DiscountAction::Create {
            code,
            percentage,
            usage_limit,
            inactive,
        } => {
            let input = DiscountInput {
                code,
                discount_percentage: percentage,
                usage_limit,
                status: if inactive {
                    CouponStatus::Inactive
                } else {
                    CouponStatus::Active
                },
            };
            let coupon = discounts.create(&input).await?;
            output::line(&format!("Coupon {} created.", coupon.code));
        }
        DiscountAction::Delete { id } => {
            discounts.delete(DiscountId::new(id)).await?;
            output::line("Coupon deleted.");
        }
    }
    Ok(())
}
