//! Shopping cart commands.

use clap::Subcommand;

use maplemart_client::AppState;
use maplemart_core::{Cart, ProductId};

use super::CommandError;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart contents
    Show,
    /// Add units of a product
    Add {
        /// Product ID
        id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the exact quantity of a product already in the cart
    Set {
        /// Product ID
        id: String,

        /// New quantity (at least 1)
        quantity: u32,
    },
    /// Remove a product from the cart entirely
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(app: &AppState, action: CartAction) -> Result<(), CommandError> {
    if !app.session().is_authenticated() {
        return Err(CommandError::NotLoggedIn);
    }

    match action {
        CartAction::Show => {
            app.cart().fetch().await?;
            print_cart(&app.cart().cart());
        }
        CartAction::Add { id, quantity } => {
            app.cart().add_item(&ProductId::new(id), quantity).await?;
            print_cart(&app.cart().cart());
        }
        CartAction::Set { id, quantity } => {
            app.cart()
                .set_quantity(&ProductId::new(id), quantity)
                .await?;
            print_cart(&app.cart().cart());
        }
        CartAction::Remove { id } => {
            app.cart().remove_item(&ProductId::new(id)).await?;
            print_cart(&app.cart().cart());
        }
        CartAction::Clear => {
            app.cart().clear().await?;
            println!("Cart cleared.");
        }
    }
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in &cart.items {
        println!(
            "{}  {:40}  {} x {:>10}  = {:>10}",
            item.product.id,
            item.product.name,
            item.quantity,
            item.product.price,
            item.line_total()
        );
    }
    println!(
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    );
}
