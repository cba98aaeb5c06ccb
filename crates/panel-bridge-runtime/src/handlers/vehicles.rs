//! Vehicle commands

use super::{HandlerContext, data, resolve_location};
use crate::host::VehicleInfo;
use crate::probe::EntryPoints;
use panel_bridge_core::command::{SpawnVehicle, VehicleTarget};
use panel_bridge_core::{BridgeError, Capability, Data, Result};
use serde_json::json;

fn require_vehicle(ctx: &HandlerContext<'_>, id: i64) -> Result<VehicleInfo> {
    ctx.host
        .vehicle(id)
        .ok_or_else(|| BridgeError::NotFound(format!("vehicle {}", id)))
}

pub fn spawn_vehicle(ctx: &mut HandlerContext<'_>, spawn: SpawnVehicle) -> Result<Data> {
    let at = resolve_location(&*ctx.host, &spawn.location)?;
    let script = spawn.vehicle.as_str();
    let called = EntryPoints::new()
        .primary(Capability::AddVehicle, |h| h.add_vehicle(script, at))
        .fallback(Capability::SpawnVehicleDebug, |h| h.spawn_vehicle_debug(script, at))
        .call(ctx.host, ctx.caps)?;
    ctx.state.debug.info(
        "Vehicle spawned",
        json!({ "vehicleId": called.value, "vehicle": script }),
    );
    Ok(data(json!({
        "vehicleId": called.value,
        "vehicle": script,
        "x": at.x,
        "y": at.y,
        "method": called.method(),
    })))
}

pub fn remove_vehicle(ctx: &mut HandlerContext<'_>, target: VehicleTarget) -> Result<Data> {
    let id = target.vehicle_id;
    require_vehicle(ctx, id)?;
    let called = EntryPoints::new()
        .primary(Capability::PermanentlyRemoveVehicle, |h| h.remove_vehicle(id))
        .fallback(Capability::RemoveVehicleFromWorld, |h| h.remove_vehicle_from_world(id))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({ "vehicleId": id, "removed": true, "method": called.method() })))
}

pub fn repair_vehicle(ctx: &mut HandlerContext<'_>, target: VehicleTarget) -> Result<Data> {
    let id = target.vehicle_id;
    let before = require_vehicle(ctx, id)?;
    let called = EntryPoints::new()
        .primary(Capability::RepairVehicle, |h| h.repair_vehicle(id))
        .call(ctx.host, ctx.caps)?;
    Ok(data(json!({
        "vehicleId": id,
        "previousCondition": before.condition,
        "method": called.method(),
    })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::run;
    use crate::host::HostApi;
    use crate::sim::SimulatedServer;
    use panel_bridge_core::{Args, BridgeError, Position};

    #[test]
    fn test_spawn_repair_remove() {
        let mut host = SimulatedServer::legacy("servertest").with_player("Bob", Position::new(5.0, 5.0, 0.0));
        let args = Args::new().with("vehicle", "Base.PickUpTruck").with("username", "Bob");
        let data = run(&mut host, "spawnVehicle", args).unwrap();
        assert_eq!(data["method"], "world.addVehicleDebug");
        let id = data["vehicleId"].as_i64().unwrap();
        assert_eq!(host.vehicle(id).unwrap().script, "Base.PickUpTruck");

        let data = run(&mut host, "repairVehicle", Args::new().with("vehicleId", id)).unwrap();
        assert_eq!(data["method"], "vehicle.repair");
        assert_eq!(host.vehicle(id).unwrap().condition, 100.0);

        let data = run(&mut host, "removeVehicle", Args::new().with("vehicleId", id)).unwrap();
        assert_eq!(data["method"], "vehicle.removeFromWorld");
        assert!(host.vehicle(id).is_none());
    }

    #[test]
    fn test_missing_vehicle() {
        let mut host = SimulatedServer::modern("servertest");
        let err = run(&mut host, "repairVehicle", Args::new().with("vehicleId", 999)).unwrap_err();
        assert_eq!(err, BridgeError::NotFound("vehicle 999".into()));
    }
}
