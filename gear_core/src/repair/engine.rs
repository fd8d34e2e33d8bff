use super::{
    LooseMaterial, NoOpReason, RepairAbort, RepairContext, RepairOutcome, RepairResult,
};
use crate::registry::{Registry, Snapshot};
use crate::stat::{ids, StatId};

/// Run one repair attempt against the registry's current snapshot.
///
/// Loose materials are applied first, scaled by the gear's repair efficiency;
/// a kit then covers what damage is left, up to its per-use cap.
pub fn repair(registry: &Registry, ctx: &RepairContext) -> Result<RepairOutcome, RepairAbort> {
    let snapshot = registry.snapshot();
    let gear = ctx.gear();

    let validation = gear.validate(&snapshot);
    if !validation.is_ok() {
        return Err(RepairAbort::InvalidTarget(validation));
    }
    if gear.damage() == 0 {
        return Ok(RepairOutcome::NoOp(NoOpReason::Undamaged));
    }

    let mut consumed = Vec::new();
    let mut rejected = Vec::new();
    let mut raw = 0.0;
    for loose in ctx.materials() {
        match material_value(registry, &snapshot, ctx, loose) {
            Some(amount) => {
                raw += amount;
                consumed.push(loose.clone());
            }
            None => rejected.push(loose.clone()),
        }
    }

    let efficiency = gear
        .stat(&snapshot, &StatId::from(ids::REPAIR_EFFICIENCY))
        .value()
        .unwrap_or(0.0);
    let scaled = if efficiency > 0.0 { raw * efficiency } else { raw };

    let mut damage = gear.damage();
    let by_materials = (scaled.round().max(0.0) as u32).min(damage);
    damage -= by_materials;

    let mut kit = ctx.kit().copied();
    let mut by_kit = 0;
    if let Some(k) = kit.as_mut() {
        if damage > 0 {
            by_kit = k.available_for(damage);
            k.charge -= by_kit;
            damage -= by_kit;
        }
    }

    if by_materials == 0 && by_kit == 0 {
        return Ok(RepairOutcome::NoOp(NoOpReason::NothingToApply));
    }

    Ok(RepairOutcome::Repaired(RepairResult {
        gear: gear.repaired(&snapshot, damage),
        kit,
        consumed,
        rejected,
        restored_by_materials: by_materials,
        restored_by_kit: by_kit,
    }))
}

/// Repair value of one loose item, or `None` when it could not have been
/// used to build any of the gear's parts
fn material_value(
    registry: &Registry,
    snapshot: &Snapshot,
    ctx: &RepairContext,
    loose: &LooseMaterial,
) -> Option<f64> {
    let gear = ctx.gear();
    let found = registry.match_in(snapshot, &loose.item)?;
    let material = found.as_material()?;

    let fits = gear
        .assembly()
        .root_parts()
        .filter_map(|(_, r)| snapshot.part(&r.part))
        .any(|part| material.can_fill(part, gear.gear_type()));
    fits.then(|| material.repair_amount(ctx.mode(), loose.grade, snapshot.constants()))
}
