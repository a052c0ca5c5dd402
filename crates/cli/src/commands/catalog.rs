//! Catalog browsing and admin product management.

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use maplemart_client::AppState;
use maplemart_client::api::{ProductFilter, ProductInput};
use maplemart_core::{Price, ProductId};

use super::CommandError;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List products, optionally filtered
    List {
        /// Only show products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only show products matching this search term
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one product in full
    Show {
        /// Product ID
        id: String,
    },
    /// Create a product (admin)
    Create(ProductArgs),
    /// Update a product (admin)
    Update {
        /// Product ID
        id: String,

        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product (admin)
    Delete {
        /// Product ID
        id: String,
    },
}

#[derive(Args)]
pub struct ProductArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Product description
    #[arg(long)]
    description: String,

    /// Price, e.g. `19.99`
    #[arg(long)]
    price: String,

    /// Image URL
    #[arg(long)]
    image: String,

    /// Category name
    #[arg(long)]
    category: String,

    /// Units in stock
    #[arg(long)]
    stock: u32,
}

impl ProductArgs {
    fn into_input(self) -> Result<ProductInput, CommandError> {
        let price = self
            .price
            .parse::<Decimal>()
            .map(Price::new)
            .map_err(|e| CommandError::InvalidArgument {
                field: "price",
                reason: e.to_string(),
            })?;
        Ok(ProductInput {
            name: self.name,
            description: self.description,
            price,
            image: self.image,
            category: self.category,
            stock: self.stock,
        })
    }
}

fn require_admin(app: &AppState) -> Result<(), CommandError> {
    if app.session().is_admin() {
        Ok(())
    } else {
        Err(CommandError::NotAdmin)
    }
}

pub async fn run(app: &AppState, action: CatalogAction) -> Result<(), CommandError> {
    match action {
        CatalogAction::List { category, search } => {
            let filter = ProductFilter { category, search };
            let products = app.api().products(&filter).await?;
            if products.is_empty() {
                println!("No products found.");
                return Ok(());
            }
            for product in products {
                println!(
                    "{}  {:40}  {:>10}  {} in stock",
                    product.id, product.name, product.price, product.stock
                );
            }
        }
        CatalogAction::Show { id } => {
            let product = app.api().product(&ProductId::new(id)).await?;
            println!("{}", product.name);
            println!("  id:       {}", product.id);
            println!("  price:    {}", product.price);
            println!("  category: {}", product.category);
            println!("  stock:    {}", product.stock);
            println!("  image:    {}", product.image);
            println!();
            println!("{}", product.description);
        }
        CatalogAction::Create(args) => {
            require_admin(app)?;
            let product = app.api().create_product(&args.into_input()?).await?;
            println!("Created {} ({}).", product.name, product.id);
        }
        CatalogAction::Update { id, product } => {
            require_admin(app)?;
            let updated = app
                .api()
                .update_product(&ProductId::new(id), &product.into_input()?)
                .await?;
            println!("Updated {} ({}).", updated.name, updated.id);
        }
        CatalogAction::Delete { id } => {
            require_admin(app)?;
            let id = ProductId::new(id);
            app.api().delete_product(&id).await?;
            println!("Deleted {id}.");
        }
    }
    Ok(())
}
