//! Gravity source loader and query-world cache.
//!
//! This module is responsible for:
//! - Seeding the `gravity_source` table with the demo level.
//! - Converting rows to shared, schema-agnostic definitions.
//! - Building and caching the in-memory `GravityWorld` every move is simulated against.
//!
//! Gravity sources are immutable after `init`, so the world is built once per module instance
//! and reused. Runtime level edits would need an explicit rebuild instead of `OnceLock`.

use crate::schema::{gravity_source, movement_settings, GravitySource, MovementSettingsRow};
use shared::{demo_world, GravitySourceDef, GravityWorld, MovementSettings};
use spacetimedb::{ReducerContext, Table};
use std::sync::OnceLock;

static GRAVITY_WORLD: OnceLock<GravityWorld> = OnceLock::new();

/// Return the cached query world, building it from `gravity_source` rows on first use.
pub fn gravity_world(ctx: &ReducerContext) -> &'static GravityWorld {
    GRAVITY_WORLD.get_or_init(|| {
        let defs: Vec<GravitySourceDef> = ctx.db.gravity_source().iter().map(row_to_def).collect();
        let world = GravityWorld::build(defs);
        log::info!("Built gravity world with {} sources", world.len());
        world
    })
}

/// Replace every gravity source row with the demo level.
pub fn recreate_gravity_sources(ctx: &ReducerContext) {
    for row in ctx.db.gravity_source().iter() {
        ctx.db.gravity_source().id().delete(row.id);
    }
    for def in demo_world() {
        ctx.db.gravity_source().insert(def_to_row(&def));
    }
    log::info!("Seeded {} gravity sources", ctx.db.gravity_source().count());
}

/// The single settings row converted for the stepper.
pub fn movement_settings_for(ctx: &ReducerContext) -> Result<MovementSettings, String> {
    let Some(row) = ctx.db.movement_settings().id().find(1) else {
        return Err("Movement settings row is missing".into());
    };
    let settings = row.to_settings();
    settings.validate()?;
    Ok(settings)
}

pub fn seed_movement_settings(ctx: &ReducerContext) {
    ctx.db.movement_settings().id().delete(1);
    ctx.db
        .movement_settings()
        .insert(MovementSettingsRow::from_settings(1, &MovementSettings::default()));
}

fn row_to_def(row: GravitySource) -> GravitySourceDef {
    GravitySourceDef {
        id: row.id,
        translation: row.translation.into(),
        rotation: row.rotation.into(),
        shape: row.shape.into(),
        strength: row.strength,
        field_radius: row.field_radius,
    }
}

fn def_to_row(def: &GravitySourceDef) -> GravitySource {
    GravitySource {
        id: def.id,
        translation: def.translation.into(),
        rotation: def.rotation.into(),
        shape: def.shape.into(),
        strength: def.strength,
        field_radius: def.field_radius,
    }
}
