//! Inventory commands

use super::{HandlerContext, data, require_player};
use crate::probe::EntryPoints;
use panel_bridge_core::command::{ItemGrant, PlayerTarget};
use panel_bridge_core::{BridgeError, Capability, Data, Result};
use serde_json::json;

pub fn give_item(ctx: &mut HandlerContext<'_>, grant: ItemGrant) -> Result<Data> {
    require_player(&*ctx.host, &grant.username)?;
    if !ctx.host.item_exists(&grant.item) {
        return Err(BridgeError::invalid(
            "item",
            format!("unknown item type '{}'", grant.item),
        ));
    }
    let ItemGrant {
        username,
        item,
        count,
    } = &grant;
    let called = EntryPoints::new()
        .primary(Capability::AddItems, |h| h.add_items(username, item, *count))
        .fallback(Capability::AddItem, |h| {
            for _ in 0..*count {
                h.add_item(username, item)?;
            }
            Ok(())
        })
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.info(
        "Item given",
        json!({ "username": username, "item": item, "count": count }),
    );
    Ok(data(json!({
        "username": username,
        "item": item,
        "count": count,
        "method": called.method(),
    })))
}

pub fn remove_item(ctx: &mut HandlerContext<'_>, grant: ItemGrant) -> Result<Data> {
    require_player(&*ctx.host, &grant.username)?;
    let ItemGrant {
        username,
        item,
        count,
    } = &grant;
    let called = EntryPoints::new()
        .primary(Capability::RemoveItems, |h| h.remove_items(username, item, *count))
        .fallback(Capability::RemoveItem, |h| {
            let mut removed = 0;
            while removed < *count && h.remove_item(username, item)? {
                removed += 1;
            }
            Ok(removed)
        })
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({
        "username": username,
        "item": item,
        "requested": count,
        "removed": called.value,
        "method": called.method(),
    })))
}

pub fn get_inventory(ctx: &mut HandlerContext<'_>, target: PlayerTarget) -> Result<Data> {
    require_player(&*ctx.host, &target.username)?;
    let items = ctx
        .host
        .inventory(&target.username)
        .map_err(|fault| BridgeError::fault("player.getInventory", fault.0))?;
    let total: u32 = items.iter().map(|i| i.count).sum();
    Ok(data(json!({
        "username": target.username,
        "count": items.len(),
        "totalItems": total,
        "items": items,
    })))
}

pub fn clear_inventory(ctx: &mut HandlerContext<'_>, target: PlayerTarget) -> Result<Data> {
    require_player(&*ctx.host, &target.username)?;
    let username = target.username.as_str();
    let called = EntryPoints::new()
        .primary(Capability::ClearInventory, |h| h.clear_inventory(username))
        .fallback(Capability::RemoveItem, |h| {
            let mut removed = 0;
            for stack in h.inventory(username)? {
                for _ in 0..stack.count {
                    if h.remove_item(username, &stack.item_type)? {
                        removed += 1;
                    }
                }
            }
            Ok(removed)
        })
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.info(
        "Inventory cleared",
        json!({ "username": username, "removed": called.value }),
    );
    Ok(data(json!({
        "username": username,
        "removed": called.value,
        "method": called.method(),
    })))
}
