//! Checkout and payment commands.

use std::collections::BTreeMap;

use bazaar_storefront::Storefront;
use bazaar_storefront::services::{CheckoutForm, CheckoutOutcome};

use super::{CheckoutArgs, PaymentAction};
use crate::error::CliError;
use crate::output;

pub async fn checkout(shop: &Storefront, args: CheckoutArgs) -> Result<(), CliError> {
    let page = shop.checkout().load().await?;

    let coupon = match args.coupon.as_deref() {
        Some(code) => Some(shop.cart().validate_coupon(shop.api(), code).await?),
        None => None,
    };

    let mut form = page.form;
    apply_args(&mut form, &args);

    if args.dry_run {
        output::cart(&page.items);
        output::line("");
        output::totals(&shop.checkout().totals(coupon.as_ref()));
        output::line("");
        output::line(&format!("Ship to: {} <{}>", form.full_name, form.email));
        output::line(&format!(
            "         {}, {}, {} {}, {}",
            form.address, form.city, form.region, form.postal_code, form.country
        ));
        return Ok(());
    }

    match shop.checkout().submit(&form, coupon.as_ref()).await? {
        CheckoutOutcome::Completed { payment_id } => {
            output::line(&format!("Order confirmed (payment {payment_id})."));
        }
        CheckoutOutcome::Redirected { payment_id, .. } => {
            output::line(&format!("Payment {payment_id} is waiting for the provider."));
        }
    }
    Ok(())
}

pub async fn payment(shop: &Storefront, action: PaymentAction) -> Result<(), CliError> {
    let checkout = shop.checkout();
    match action {
        PaymentAction::Complete { params } => {
            let params: BTreeMap<String, String> = params.into_iter().collect();
            let payment_id = checkout.complete_payment(&params).await?;
            output::line(&format!("Payment {payment_id} completed."));
        }
        PaymentAction::Cancel => {
            checkout.cancel_payment().await?;
            output::line("Payment cancelled.");
        }
        PaymentAction::Status => match checkout.pending_payment_id()? {
            Some(id) => output::line(&format!("Payment {id} is waiting for the provider.")),
            None => output::line("No pending payment."),
        },
    }
    Ok(())
}

/// Command-line values win over prefilled ones.
fn apply_args(form: &mut CheckoutForm, args: &CheckoutArgs) {
    let pairs = [
        (&mut form.full_name, &args.name),
        (&mut form.email, &args.email),
        (&mut form.address, &args.address),
        (&mut form.city, &args.city),
        (&mut form.region, &args.region),
        (&mut form.postal_code, &args.postal_code),
        (&mut form.phone, &args.phone),
        (&mut form.country, &args.country),
        (&mut form.notes, &args.notes),
    ];
    for (field, value) in pairs {
        if let Some(value) = value {
            field.clone_from(value);
        }
    }
    if args.payment.is_some() {
        form.payment_method = args.payment;
    }
}
