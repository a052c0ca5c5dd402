//! Checkout and order review commands.

use clap::{Args, Subcommand};

use maplemart_client::AppState;
use maplemart_client::api::OrderRequest;
use maplemart_core::{Order, OrderId, OrderStatus, PaymentInfo, ShippingAddress};

use super::CommandError;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Recipient full name
    #[arg(long)]
    name: String,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// Postal code
    #[arg(long)]
    postal_code: String,

    /// Country
    #[arg(long)]
    country: String,

    /// Payment method label, e.g. `card`
    #[arg(long, default_value = "card")]
    payment_method: String,
}

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List your orders
    List,
    /// Show one of your orders in full
    Show {
        /// Order ID
        id: String,
    },
    /// List every order (admin)
    All,
    /// Change an order's status (admin)
    SetStatus {
        /// Order ID
        id: String,

        /// One of: pending, processing, shipped, delivered, cancelled
        status: String,
    },
}

pub async fn checkout(app: &AppState, args: CheckoutArgs) -> Result<(), CommandError> {
    if !app.session().is_authenticated() {
        return Err(CommandError::NotLoggedIn);
    }

    let request = OrderRequest {
        shipping_address: ShippingAddress {
            full_name: args.name,
            address: args.address,
            city: args.city,
            postal_code: args.postal_code,
            country: args.country,
        },
        payment_info: PaymentInfo {
            method: args.payment_method,
            transaction_id: None,
        },
    };

    let order = app.api().place_order(&request).await?;
    // The server consumed the cart; pick up its new (empty) state
    if let Err(error) = app.cart().fetch().await {
        tracing::warn!(message = error.message(), "could not refresh cart after checkout");
    }

    println!("Order {} placed: {}", order.id, order.total_amount);
    println!("Status: {}", order.status);
    Ok(())
}

pub async fn run(app: &AppState, action: OrdersAction) -> Result<(), CommandError> {
    if !app.session().is_authenticated() {
        return Err(CommandError::NotLoggedIn);
    }

    match action {
        OrdersAction::List => {
            let orders = app.api().my_orders().await?;
            print_orders(&orders);
        }
        OrdersAction::Show { id } => {
            let order = app.api().order(&OrderId::new(id)).await?;
            println!("Order {}", order.id);
            println!("  placed:  {}", order.created_at.format("%Y-%m-%d %H:%M"));
            println!("  status:  {}", order.status);
            println!("  total:   {}", order.total_amount);
            println!(
                "  ship to: {}, {}, {}",
                order.shipping_address.full_name,
                order.shipping_address.city,
                order.shipping_address.country
            );
            for item in &order.items {
                println!(
                    "  {}  {} x {:>10}",
                    item.product.name, item.quantity, item.product.price
                );
            }
        }
        OrdersAction::All => {
            if !app.session().is_admin() {
                return Err(CommandError::NotAdmin);
            }
            let orders = app.api().all_orders().await?;
            print_orders(&orders);
        }
        OrdersAction::SetStatus { id, status } => {
            if !app.session().is_admin() {
                return Err(CommandError::NotAdmin);
            }
            let status: OrderStatus =
                status
                    .parse()
                    .map_err(|_| CommandError::InvalidArgument {
                        field: "status",
                        reason: format!(
                            "expected one of {}",
                            OrderStatus::ALL.map(|s| s.to_string()).join(", ")
                        ),
                    })?;
            let order = app
                .api()
                .update_order_status(&OrderId::new(id), status)
                .await?;
            println!("Order {} is now {}.", order.id, order.status);
        }
    }
    Ok(())
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders.");
        return;
    }
    for order in orders {
        println!(
            "{}  {}  {:>10}  {}  {} item(s)",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            order.total_amount,
            order.status,
            order.items.len()
        );
    }
}
