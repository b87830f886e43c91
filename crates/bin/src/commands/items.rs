//! Item commands: list, add, swap, remove and toggle.
//!
//! Swap and remove go through a [`Reconciler`] so the collection stays
//! gap-free, exactly as the admin panel does it.

use vitrina::{
    Payload, Reconciler, Scope,
    backend::{Backend, OrderStore},
    order::NewItem,
    reconcile::{DeleteOutcome, SwapOutcome},
};

use crate::backend::{finish_target, open_target};
use crate::cli::{AddArgs, ItemArgs, ListArgs, SwapArgs, ToggleArgs};
use crate::output::{OutputFormat, print_item, print_items};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Run the `list` command
pub async fn list(args: &ListArgs, format: OutputFormat) -> CmdResult {
    let store = open_target(&args.target).await?;
    let items = if args.public {
        store.fetch_active(args.scope).await?
    } else {
        store.fetch_collection(args.scope).await?
    };
    print_items(&items, format)?;
    Ok(())
}

fn payload_for(args: &AddArgs) -> Result<Payload, Box<dyn std::error::Error>> {
    match (args.scope, args.product_id) {
        (Scope::Products, Some(product_id)) => Ok(Payload::product(product_id)),
        (Scope::Products, None) => Err("products need --product-id".into()),
        (Scope::Carousel, Some(_)) => Err("carousel slides take --title and --image-url".into()),
        (Scope::Carousel, None) => Ok(Payload::Slide {
            title: args.title.clone(),
            image_url: args.image_url.clone(),
            image_mobile_url: args.image_mobile_url.clone(),
        }),
    }
}

/// Run the `add` command
pub async fn add(args: &AddArgs, format: OutputFormat) -> CmdResult {
    let mut new_item = NewItem::new(payload_for(args)?);
    if let Some(order) = args.order {
        new_item = new_item.at(order);
    }

    let store = open_target(&args.target).await?;
    let item = store.create_item(args.scope, new_item).await?;
    finish_target(store.as_ref(), &args.target).await?;
    print_item(&item, format)?;
    Ok(())
}

/// Run the `swap` command
pub async fn swap(args: &SwapArgs, format: OutputFormat) -> CmdResult {
    let store = open_target(&args.target).await?;
    let reconciler = Reconciler::load(store.clone(), args.scope).await?;

    match reconciler.swap(args.dragged, args.target_id).await? {
        SwapOutcome::Unchanged => {
            tracing::info!("Nothing to swap");
        }
        SwapOutcome::Persisted => {
            finish_target(store.as_ref(), &args.target).await?;
        }
        SwapOutcome::Reverted { cause } => {
            return Err(format!("Swap was not saved: {cause}").into());
        }
    }

    print_items(&reconciler.snapshot().await, format)?;
    Ok(())
}

/// Run the `remove` command
pub async fn remove(args: &ItemArgs, format: OutputFormat) -> CmdResult {
    let store = open_target(&args.target).await?;
    let reconciler = Reconciler::load(store.clone(), args.scope).await?;

    let outcome = reconciler.delete(args.id).await;
    if !matches!(outcome, DeleteOutcome::DeleteFailed { .. }) {
        finish_target(store.as_ref(), &args.target).await?;
    }
    match outcome {
        DeleteOutcome::Compacted { shifted } => {
            tracing::info!(shifted = shifted.len(), "Deleted item {}", args.id);
        }
        DeleteOutcome::DeleteFailed { cause } => {
            return Err(format!("Failed to delete item {}: {cause}", args.id).into());
        }
        DeleteOutcome::CompactFailed { cause, .. } => {
            eprintln!("Item {} deleted, but closing the gap failed: {cause}", args.id);
        }
    }

    print_items(&reconciler.snapshot().await, format)?;
    Ok(())
}

/// Run the `toggle` command
pub async fn toggle(args: &ToggleArgs, format: OutputFormat) -> CmdResult {
    let store = open_target(&args.target).await?;
    let item = store.set_active(args.scope, args.id, args.active).await?;
    finish_target(store.as_ref(), &args.target).await?;
    print_item(&item, format)?;
    Ok(())
}
