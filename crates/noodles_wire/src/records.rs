//! Per-kind component payload shapes.
//!
//! Each `*Record` is the full field set sent in a `*Create` message and
//! stored by the registry as the component's canonical data. Each `*Delta`
//! mirrors the same shape with every field optional: `None` means
//! "unchanged", `Some(v)` means "set to `v`". Clearing an already-set
//! optional field back to empty via update isn't representable in this
//! delta shape — an accepted simplification, recorded in `DESIGN.md`.

use serde::{Deserialize, Serialize};

use noodles_ids::ComponentId;
use noodles_math::RowMajorTransform;

/// A single declared argument to a [`MethodRecord`] or [`SignalRecord`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MethodArg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_hint: Option<String>,
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    #[must_use]
    pub fn is_finite(&self) -> bool {
        noodles_math::is_finite(&self.min) && noodles_math::is_finite(&self.max)
    }
}

// ── Method / Signal ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MethodRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub arguments: Vec<MethodArg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_doc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SignalRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub arguments: Vec<MethodArg>,
}

// Methods and signals are immutable once created (the tag table has no
// update op for either), so they have no delta type.

// ── Entity ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderRepresentation {
    pub geometry: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<RowMajorTransform>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextRepresentation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebRepresentation {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[f32; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EntityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<RowMajorTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_rep: Option<RenderRepresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_rep: Option<TextRepresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_rep: Option<WebRepresentation>,
    #[serde(default)]
    pub lights: Vec<ComponentId>,
    #[serde(default)]
    pub tables: Vec<ComponentId>,
    #[serde(default)]
    pub methods_list: Vec<ComponentId>,
    #[serde(default)]
    pub signals_list: Vec<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

pub type EntityDelta = EntityRecord;

// ── Plot ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PlotVariant {
    SimplePlot { simple_plot: String },
    UrlPlot { url_plot: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub table: ComponentId,
    #[serde(flatten)]
    pub variant: PlotVariant,
    #[serde(default)]
    pub methods_list: Vec<ComponentId>,
    #[serde(default)]
    pub signals_list: Vec<ComponentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlotDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<PlotVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods_list: Option<Vec<ComponentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals_list: Option<Vec<ComponentId>>,
}

// ── Buffer / BufferView ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum BufferSource {
    InlineBytes {
        #[serde(with = "serde_bytes")]
        inline_bytes: Vec<u8>,
    },
    UriBytes {
        uri_bytes: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BufferRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub size: u64,
    #[serde(flatten)]
    pub source: BufferSource,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BufferViewType {
    Unk,
    Geometry,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BufferViewRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_buffer: ComponentId,
    #[serde(rename = "type")]
    pub view_type: BufferViewType,
    pub offset: u64,
    pub length: u64,
}

// ── Material ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextureRef {
    pub texture: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_coord_slot: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal_rough_texture: Option<TextureRef>,
    pub double_sided: bool,
    pub alpha_mode: AlphaMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MaterialDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<[f32; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal_rough_texture: Option<TextureRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_sided: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_mode: Option<AlphaMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f32>,
}

// ── Image / Texture / Sampler ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    BufferSource { buffer_source: ComponentId },
    UriSource { uri_source: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub source: ImageSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub image: ComponentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<ComponentId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MagFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MinFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplerMode {
    Clamp,
    Repeat,
    MirrorRepeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mag_filter: MagFilter,
    pub min_filter: MinFilter,
    pub wrap_s: SamplerMode,
    pub wrap_t: SamplerMode,
}

// ── Light ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LightVariant {
    Point {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<f32>,
    },
    Spot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range: Option<f32>,
        inner_cone_angle: f32,
        outer_cone_angle: f32,
    },
    Directional,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color: [f32; 3],
    pub intensity: f32,
    #[serde(flatten)]
    pub variant: LightVariant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LightDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<LightVariant>,
}

// ── Geometry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeSemantic {
    Position,
    Normal,
    Tangent,
    Texture,
    Color,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeFormat {
    U8,
    U16,
    U32,
    U8Normalized,
    U16Normalized,
    F32,
    Vec2,
    Vec3,
    Vec4,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub view: ComponentId,
    pub semantic: AttributeSemantic,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    pub offset: u64,
    pub stride: u64,
    pub format: AttributeFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_value: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_value: Option<Vec<f32>>,
    #[serde(default)]
    pub normalized: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexFormat {
    U8,
    U16,
    U32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexInfo {
    pub view: ComponentId,
    pub count: u32,
    pub format: IndexFormat,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatchType {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indices: Option<IndexInfo>,
    pub vertex_count: u32,
    pub patch_type: PatchType,
    pub material: ComponentId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub patches: Vec<Patch>,
}

// ── Table ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableColumnType {
    Text,
    Real,
    Integer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: TableColumnType,
}

/// A single value in a table row. NOODLES table cells are one of text,
/// real, or integer per the column's declared [`TableColumnType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Real(f64),
    Integer(i64),
}

pub type TableRow = Vec<CellValue>;
pub type TableKey = u64;

/// The current selection state of a table, as the delegate reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Selection {
    pub name: String,
    #[serde(default)]
    pub row_keys: Vec<TableKey>,
}

/// A row-level mutation a table's delegate performed, carried on the
/// `TableUpdate` broadcast alongside any metadata changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TableRowUpdate {
    Inserted {
        keys: Vec<TableKey>,
        rows: Vec<TableRow>,
    },
    Updated {
        keys: Vec<TableKey>,
        rows: Vec<TableRow>,
    },
    Removed {
        keys: Vec<TableKey>,
    },
    Cleared,
    SelectionUpdated {
        selection: Selection,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TableRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<TableColumnInfo>>,
    #[serde(default)]
    pub methods_list: Vec<ComponentId>,
    #[serde(default)]
    pub signals_list: Vec<ComponentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TableDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<TableColumnInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods_list: Option<Vec<ComponentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signals_list: Option<Vec<ComponentId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_update: Option<TableRowUpdate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_record_roundtrips_through_json() {
        let m = MethodRecord {
            name: "ping".into(),
            doc: Some("replies pong".into()),
            arguments: vec![],
            return_doc: Some("the string pong".into()),
        };
        let bytes = serde_json::to_vec(&m).unwrap();
        let restored: MethodRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(m, restored);
    }

    #[test]
    fn plot_variant_flattens_onto_plot_record() {
        let p = PlotRecord {
            name: Some("p1".into()),
            table: ComponentId::new(noodles_ids::ComponentKind::Table, 0, 0),
            variant: PlotVariant::SimplePlot {
                simple_plot: "bar".into(),
            },
            methods_list: vec![],
            signals_list: vec![],
        };
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(value["simple_plot"], "bar");
        let restored: PlotRecord = serde_json::from_value(value).unwrap();
        assert_eq!(p, restored);
    }

    #[test]
    fn bounding_box_finiteness() {
        let ok = BoundingBox {
            min: [0.0, 0.0, 0.0],
            max: [1.0, 1.0, 1.0],
        };
        assert!(ok.is_finite());
        let bad = BoundingBox {
            min: [f32::NAN, 0.0, 0.0],
            max: [1.0, 1.0, 1.0],
        };
        assert!(!bad.is_finite());
    }
}
