//! Storefront command-line client
//!
//! A text renderer over the page controllers: every command restores the
//! persisted session, mounts the relevant page and prints what a browser view
//! would show.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use shared::{format_currency, validate_email, OrderStatus};
use storefront_client::pages::ListView;
use storefront_client::{
    CheckoutOutcome, Config, FileTokenStore, Navigator, Notice, NoticeBoard, NoticeLevel,
    Notifier, OrdersPage, PageState, Route, Router, Storefront,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "storefront", version, about = "Livestock storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Show the cart
    Cart,
    /// Change the quantity of a cart line
    SetQuantity {
        item_id: i64,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove { item_id: i64 },
    /// Place an order for the whole cart
    Checkout,
    /// List orders (sales for farmers)
    Orders,
    /// Confirm or reject a pending order (farmers only)
    SetStatus { order_id: i64, status: OrderStatus },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=info,storefront_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load()?;

    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API base URL: {}", config.api.base_url);

    let storage = Arc::new(FileTokenStore::new(&config.storage.token_path));
    let router = Arc::new(Router::new(Route::Other("/".to_string())));
    let notices = Arc::new(NoticeBoard::new());
    let app = Storefront::new(config, storage, router.clone(), notices.clone());

    let result = run(&app, cli.command).await;

    if router.current() == Route::Login {
        notices.notify(Notice::info("Please log in: storefront login --email <EMAIL>"));
    }
    for notice in notices.drain() {
        match notice.level {
            NoticeLevel::Error => eprintln!("! {}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => println!("* {}", notice.message),
        }
    }

    result
}

async fn run(app: &Storefront, command: Command) -> anyhow::Result<()> {
    if !matches!(command, Command::Login { .. }) {
        if let Err(e) = app.auth().restore().await {
            tracing::warn!("Continuing without a session: {}", e);
        }
    }

    match command {
        Command::Login { email, password } => {
            validate_email(&email).map_err(anyhow::Error::msg)?;
            let session = app.auth().login(&email, &password).await?;
            if let Some(user) = session.user {
                println!(
                    "Signed in as {} ({})",
                    user.email.unwrap_or_default(),
                    user.user_type
                );
            }
        }
        Command::Cart => {
            let page = app.cart_page();
            page.mount().await;
            render_cart(&page.view());
        }
        Command::SetQuantity { item_id, quantity } => {
            let page = app.cart_page();
            page.mount().await;
            if !page.update_quantity(item_id, quantity).await && quantity < 1 {
                println!("Quantity must be at least 1");
            }
            render_cart(&page.view());
        }
        Command::Remove { item_id } => {
            let page = app.cart_page();
            page.mount().await;
            page.remove_item(item_id).await;
            render_cart(&page.view());
        }
        Command::Checkout => {
            let page = app.cart_page();
            page.mount().await;
            if let CheckoutOutcome::Placed(receipt) = page.checkout().await {
                if let Some(order_id) = receipt.order_id {
                    println!("Order #{} created", order_id);
                }
                let orders = app.orders_page();
                orders.mount().await;
                render_orders(&orders);
            }
        }
        Command::Orders => {
            let page = app.orders_page();
            page.mount().await;
            render_orders(&page);
        }
        Command::SetStatus { order_id, status } => {
            let page = app.orders_page();
            page.mount().await;
            if !page.update_order_status(order_id, status).await
                && page.state() != PageState::Redirecting
            {
                println!("Order #{} cannot be set to {}", order_id, status);
            }
            render_orders(&page);
        }
    }

    Ok(())
}

fn render_cart(view: &ListView<shared::CartItem>) {
    match view.state {
        PageState::Redirecting | PageState::Unchecked => {}
        PageState::Loading => println!("Loading cart..."),
        PageState::Failed => println!("Cart could not be loaded."),
        PageState::Empty => {
            println!("Your Cart is Empty");
            println!("Browse animals and add some to your cart!");
        }
        PageState::Ready => {
            println!("Shopping Cart ({} item(s))", view.item_count());
            for item in &view.items {
                println!(
                    "  [{}] {} x{} @ {} = {}",
                    item.id,
                    item.animal.name,
                    item.quantity,
                    format_currency(item.animal.price),
                    format_currency(item.line_total())
                );
            }
            println!("Subtotal: {}", format_currency(view.subtotal()));
            println!("Shipping: Free");
            println!("Total:    {}", format_currency(view.total()));
        }
    }
}

fn render_orders(page: &OrdersPage) {
    let view = page.view();
    let placeholder = match view.state {
        PageState::Redirecting | PageState::Unchecked => return,
        PageState::Loading => "Loading orders...",
        PageState::Failed => "Orders could not be loaded.",
        PageState::Empty => "No orders found.",
        PageState::Ready => "",
    };
    if !placeholder.is_empty() {
        println!("{}", placeholder);
        return;
    }

    println!("{}", page.heading());
    for order in &view.items {
        let date = order
            .created_date()
            .map(|d| d.to_string())
            .unwrap_or_default();
        println!("Order #{} {} [{}]", order.id, date, order.status);
        for item in &order.order_items {
            println!(
                "  {} ({}) {} x {} = {}",
                item.display_name(),
                item.breed(),
                format_currency(item.price),
                item.quantity,
                format_currency(item.subtotal())
            );
        }
        println!("  Total: {}", format_currency(order.total_amount));
        if let Some(address) = &order.shipping_address {
            println!("  Shipping to: {}", address);
        }
        let actions = page.available_actions(order);
        if !actions.is_empty() {
            let labels: Vec<&str> = actions.iter().map(OrderStatus::as_str).collect();
            println!("  Actions: {}", labels.join(", "));
        }
    }
}
