//! Applying a `*Delta` onto its corresponding live `*Record`.
//!
//! Every field on a delta struct is optional so only the fields actually
//! present on the wire get overwritten. [`EntityDelta`] is the one
//! exception — it's a bare alias of [`EntityRecord`], so its `Vec` fields
//! (`lights`, `tables`, `methods_list`, `signals_list`) can't distinguish
//! "leave unchanged" from "clear to empty"; an empty vec in the delta is
//! treated as "leave unchanged" (see `DESIGN.md`).

use noodles_wire::records::{
    EntityDelta, EntityRecord, LightDelta, LightRecord, MaterialDelta, MaterialRecord, PlotDelta,
    PlotRecord, TableDelta, TableRecord,
};

pub fn apply_entity_delta(base: &mut EntityRecord, delta: EntityDelta) {
    if delta.name.is_some() {
        base.name = delta.name;
    }
    if delta.parent.is_some() {
        base.parent = delta.parent;
    }
    if delta.transform.is_some() {
        base.transform = delta.transform;
    }
    if delta.render_rep.is_some() {
        base.render_rep = delta.render_rep;
    }
    if delta.text_rep.is_some() {
        base.text_rep = delta.text_rep;
    }
    if delta.web_rep.is_some() {
        base.web_rep = delta.web_rep;
    }
    if !delta.lights.is_empty() {
        base.lights = delta.lights;
    }
    if !delta.tables.is_empty() {
        base.tables = delta.tables;
    }
    if !delta.methods_list.is_empty() {
        base.methods_list = delta.methods_list;
    }
    if !delta.signals_list.is_empty() {
        base.signals_list = delta.signals_list;
    }
    if delta.visible.is_some() {
        base.visible = delta.visible;
    }
    if delta.bounding_box.is_some() {
        base.bounding_box = delta.bounding_box;
    }
}

pub fn apply_plot_delta(base: &mut PlotRecord, delta: PlotDelta) {
    if delta.name.is_some() {
        base.name = delta.name;
    }
    if let Some(v) = delta.table {
        base.table = v;
    }
    if let Some(v) = delta.variant {
        base.variant = v;
    }
    if let Some(v) = delta.methods_list {
        base.methods_list = v;
    }
    if let Some(v) = delta.signals_list {
        base.signals_list = v;
    }
}

pub fn apply_material_delta(base: &mut MaterialRecord, delta: MaterialDelta) {
    if delta.name.is_some() {
        base.name = delta.name;
    }
    if let Some(v) = delta.base_color {
        base.base_color = v;
    }
    if let Some(v) = delta.metallic {
        base.metallic = v;
    }
    if let Some(v) = delta.roughness {
        base.roughness = v;
    }
    if delta.base_color_texture.is_some() {
        base.base_color_texture = delta.base_color_texture;
    }
    if delta.metal_rough_texture.is_some() {
        base.metal_rough_texture = delta.metal_rough_texture;
    }
    if let Some(v) = delta.double_sided {
        base.double_sided = v;
    }
    if let Some(v) = delta.alpha_mode {
        base.alpha_mode = v;
    }
    if delta.alpha_cutoff.is_some() {
        base.alpha_cutoff = delta.alpha_cutoff;
    }
}

pub fn apply_light_delta(base: &mut LightRecord, delta: LightDelta) {
    if delta.name.is_some() {
        base.name = delta.name;
    }
    if let Some(v) = delta.color {
        base.color = v;
    }
    if let Some(v) = delta.intensity {
        base.intensity = v;
    }
    if let Some(v) = delta.variant {
        base.variant = v;
    }
}

pub fn apply_table_delta(base: &mut TableRecord, delta: TableDelta) {
    if delta.name.is_some() {
        base.name = delta.name;
    }
    if delta.meta.is_some() {
        base.meta = delta.meta;
    }
    if delta.columns.is_some() {
        base.columns = delta.columns;
    }
    if let Some(v) = delta.methods_list {
        base.methods_list = v;
    }
    if let Some(v) = delta.signals_list {
        base.signals_list = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_delta_only_overwrites_present_fields() {
        let mut base = PlotRecord {
            name: Some("original".into()),
            table: noodles_ids::ComponentId::new(noodles_ids::ComponentKind::Table, 0, 0),
            variant: noodles_wire::records::PlotVariant::SimplePlot {
                simple_plot: "bar".into(),
            },
            methods_list: vec![],
            signals_list: vec![],
        };
        let delta = PlotDelta {
            name: None,
            table: None,
            variant: None,
            methods_list: None,
            signals_list: None,
        };
        apply_plot_delta(&mut base, delta);
        assert_eq!(base.name.as_deref(), Some("original"));
    }

    #[test]
    fn entity_delta_empty_vec_leaves_lights_unchanged() {
        let mut base = EntityRecord {
            lights: vec![noodles_ids::ComponentId::new(
                noodles_ids::ComponentKind::Light,
                0,
                0,
            )],
            ..Default::default()
        };
        let delta = EntityDelta::default();
        apply_entity_delta(&mut base, delta);
        assert_eq!(base.lights.len(), 1);
    }
}
