//! Extracting the set of component ids a record references, for dangling-
//! reference validation and the reverse-reference index.

use noodles_ids::ComponentId;
use noodles_wire::records::{
    BufferViewRecord, EntityRecord, GeometryRecord, MaterialRecord, PlotRecord, TableRecord,
    TextureRecord,
};

pub fn entity_refs(r: &EntityRecord) -> Vec<(&'static str, ComponentId)> {
    let mut out = Vec::new();
    if let Some(parent) = r.parent {
        out.push(("parent", parent));
    }
    if let Some(rep) = &r.render_rep {
        out.push(("render_rep.geometry", rep.geometry));
    }
    out.extend(r.lights.iter().map(|id| ("lights", *id)));
    out.extend(r.tables.iter().map(|id| ("tables", *id)));
    out.extend(r.methods_list.iter().map(|id| ("methods_list", *id)));
    out.extend(r.signals_list.iter().map(|id| ("signals_list", *id)));
    out
}

pub fn plot_refs(r: &PlotRecord) -> Vec<(&'static str, ComponentId)> {
    let mut out = vec![("table", r.table)];
    out.extend(r.methods_list.iter().map(|id| ("methods_list", *id)));
    out.extend(r.signals_list.iter().map(|id| ("signals_list", *id)));
    out
}

pub fn buffer_view_refs(r: &BufferViewRecord) -> Vec<(&'static str, ComponentId)> {
    vec![("source_buffer", r.source_buffer)]
}

pub fn material_refs(r: &MaterialRecord) -> Vec<(&'static str, ComponentId)> {
    let mut out = Vec::new();
    if let Some(tex) = &r.base_color_texture {
        out.push(("base_color_texture", tex.texture));
    }
    if let Some(tex) = &r.metal_rough_texture {
        out.push(("metal_rough_texture", tex.texture));
    }
    out
}

pub fn texture_refs(r: &TextureRecord) -> Vec<(&'static str, ComponentId)> {
    let mut out = vec![("image", r.image)];
    if let Some(sampler) = r.sampler {
        out.push(("sampler", sampler));
    }
    out
}

pub fn geometry_refs(r: &GeometryRecord) -> Vec<(&'static str, ComponentId)> {
    let mut out = Vec::new();
    for patch in &r.patches {
        for attr in &patch.attributes {
            out.push(("patches[].attributes[].view", attr.view));
        }
        if let Some(indices) = &patch.indices {
            out.push(("patches[].indices.view", indices.view));
        }
        out.push(("patches[].material", patch.material));
    }
    out
}

pub fn table_refs(r: &TableRecord) -> Vec<(&'static str, ComponentId)> {
    let mut out = Vec::new();
    out.extend(r.methods_list.iter().map(|id| ("methods_list", *id)));
    out.extend(r.signals_list.iter().map(|id| ("signals_list", *id)));
    out
}
