//! The authoritative component registry: one [`Table`] per component kind,
//! reference validation, document snapshotting, and a pending-broadcast
//! queue every mutation feeds so the server can drain and fan it out.

use std::collections::HashMap;

use noodles_ids::{ComponentId, ComponentKind};
use noodles_math::is_finite;
use noodles_wire::records::{
    BufferRecord, BufferViewRecord, EntityDelta, EntityRecord, GeometryRecord, ImageRecord,
    LightDelta, LightRecord, MaterialDelta, MaterialRecord, MethodRecord, PlotDelta, PlotRecord,
    SamplerRecord, SignalRecord, TableDelta, TableRecord, TextureRecord,
};
use noodles_wire::{MethodValue, ServerMessage};

use crate::delta::{
    apply_entity_delta, apply_light_delta, apply_material_delta, apply_plot_delta,
    apply_table_delta,
};
use crate::error::RegistryError;
use crate::refs;
use crate::reverse::ReverseIndex;
use crate::table::Table;

/// The authoritative, single-writer store of every live component in the
/// document. Mutated only from the server's core event loop.
pub struct Registry {
    methods: Table<MethodRecord>,
    signals: Table<SignalRecord>,
    entities: Table<EntityRecord>,
    plots: Table<PlotRecord>,
    buffers: Table<BufferRecord>,
    buffer_views: Table<BufferViewRecord>,
    materials: Table<MaterialRecord>,
    images: Table<ImageRecord>,
    textures: Table<TextureRecord>,
    samplers: Table<SamplerRecord>,
    lights: Table<LightRecord>,
    geometries: Table<GeometryRecord>,
    tables: Table<TableRecord>,
    reverse: ReverseIndex,
    /// `(kind, name) -> [id]`, oldest to newest, so `get_component_id`
    /// answers "most recently created" by taking the last entry. Names
    /// aren't unique, hence the `Vec`.
    name_index: HashMap<(ComponentKind, String), Vec<ComponentId>>,
    /// Methods invocable with no entity/table/plot context, i.e. outside
    /// any single component's own `methods_list`.
    global_methods: Vec<ComponentId>,
    /// Signals that can be emitted with no attached context, mirroring
    /// `global_methods`.
    global_signals: Vec<ComponentId>,
    /// Lifecycle messages produced by mutations since the last
    /// [`drain_pending`](Self::drain_pending), in the order they happened.
    /// A method handler's mutations land here; the server drains and
    /// broadcasts them before sending that invocation's reply, giving the
    /// "broadcasts precede their triggering reply" ordering.
    pending: Vec<ServerMessage>,
    /// IDs of tables created since the last [`drain_pending_table_creates`](Self::drain_pending_table_creates),
    /// so the server can attach a delegate to every new table, not just
    /// ones created before startup.
    pending_table_creates: Vec<ComponentId>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            methods: Table::new(ComponentKind::Method),
            signals: Table::new(ComponentKind::Signal),
            entities: Table::new(ComponentKind::Entity),
            plots: Table::new(ComponentKind::Plot),
            buffers: Table::new(ComponentKind::Buffer),
            buffer_views: Table::new(ComponentKind::BufferView),
            materials: Table::new(ComponentKind::Material),
            images: Table::new(ComponentKind::Image),
            textures: Table::new(ComponentKind::Texture),
            samplers: Table::new(ComponentKind::Sampler),
            lights: Table::new(ComponentKind::Light),
            geometries: Table::new(ComponentKind::Geometry),
            tables: Table::new(ComponentKind::Table),
            reverse: ReverseIndex::new(),
            name_index: HashMap::new(),
            global_methods: Vec::new(),
            global_signals: Vec::new(),
            pending: Vec::new(),
            pending_table_creates: Vec::new(),
        }
    }

    /// Mark `id` invocable with no attached context (`Context::Global`).
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't a live method.
    pub fn attach_global_method(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        if !self.methods.alive(id) {
            return Err(RegistryError::NotFound(id));
        }
        if !self.global_methods.contains(&id) {
            self.global_methods.push(id);
        }
        Ok(())
    }

    #[must_use]
    pub fn global_methods(&self) -> &[ComponentId] {
        &self.global_methods
    }

    /// Mark `id` emittable with no attached context.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't a live signal.
    pub fn attach_global_signal(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        if !self.signals.alive(id) {
            return Err(RegistryError::NotFound(id));
        }
        if !self.global_signals.contains(&id) {
            self.global_signals.push(id);
        }
        Ok(())
    }

    #[must_use]
    pub fn global_signals(&self) -> &[ComponentId] {
        &self.global_signals
    }

    /// Take every lifecycle message queued since the last call, in order.
    pub fn drain_pending(&mut self) -> Vec<ServerMessage> {
        std::mem::take(&mut self.pending)
    }

    /// Take the IDs of every table created since the last call, in order.
    pub fn drain_pending_table_creates(&mut self) -> Vec<ComponentId> {
        std::mem::take(&mut self.pending_table_creates)
    }

    fn push_pending(&mut self, message: ServerMessage) {
        self.pending.push(message);
    }

    #[must_use]
    pub fn alive(&self, id: ComponentId) -> bool {
        match id.kind {
            ComponentKind::Method => self.methods.alive(id),
            ComponentKind::Signal => self.signals.alive(id),
            ComponentKind::Entity => self.entities.alive(id),
            ComponentKind::Plot => self.plots.alive(id),
            ComponentKind::Buffer => self.buffers.alive(id),
            ComponentKind::BufferView => self.buffer_views.alive(id),
            ComponentKind::Material => self.materials.alive(id),
            ComponentKind::Image => self.images.alive(id),
            ComponentKind::Texture => self.textures.alive(id),
            ComponentKind::Sampler => self.samplers.alive(id),
            ComponentKind::Light => self.lights.alive(id),
            ComponentKind::Geometry => self.geometries.alive(id),
            ComponentKind::Table => self.tables.alive(id),
        }
    }

    fn check_refs(&self, refs: &[(&'static str, ComponentId)]) -> Result<(), RegistryError> {
        for &(field, target) in refs {
            if !self.alive(target) {
                return Err(RegistryError::DanglingReference { field, target });
            }
        }
        Ok(())
    }

    fn record_refs(&mut self, referrer: ComponentId, refs: &[(&'static str, ComponentId)]) {
        for &(_, target) in refs {
            self.reverse.add(referrer, target);
        }
    }

    fn require_no_referrers(&self, id: ComponentId) -> Result<(), RegistryError> {
        if self.reverse.is_referenced(id) {
            Err(RegistryError::InUse(id))
        } else {
            Ok(())
        }
    }

    fn index_name(&mut self, kind: ComponentKind, id: ComponentId, name: Option<&str>) {
        if let Some(name) = name {
            self.name_index.entry((kind, name.to_string())).or_default().push(id);
        }
    }

    fn unindex_name(&mut self, kind: ComponentKind, id: ComponentId, name: Option<&str>) {
        let Some(name) = name else { return };
        let key = (kind, name.to_string());
        if let Some(ids) = self.name_index.get_mut(&key) {
            ids.retain(|&existing| existing != id);
            if ids.is_empty() {
                self.name_index.remove(&key);
            }
        }
    }

    /// The most recently created live component of `kind` named `name`, if
    /// any. Names aren't unique; ties are broken in favor of the newest.
    #[must_use]
    pub fn get_component_id(&self, kind: ComponentKind, name: &str) -> Option<ComponentId> {
        self.name_index
            .get(&(kind, name.to_string()))?
            .last()
            .copied()
    }

    // ── Method ───────────────────────────────────────────────────────────

    pub fn create_method(&mut self, record: MethodRecord) -> ComponentId {
        let id = self.methods.insert(record.clone());
        self.index_name(ComponentKind::Method, id, Some(&record.name));
        self.push_pending(ServerMessage::MethodCreate { id, record });
        id
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't live, or
    /// [`RegistryError::InUse`] if another component still references it.
    pub fn delete_method(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.methods.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.methods.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Method, id, Some(&name));
        self.global_methods.retain(|&m| m != id);
        self.push_pending(ServerMessage::MethodDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_method(&self, id: ComponentId) -> Option<&MethodRecord> {
        self.methods.get(id)
    }

    // ── Signal ───────────────────────────────────────────────────────────

    pub fn create_signal(&mut self, record: SignalRecord) -> ComponentId {
        let id = self.signals.insert(record.clone());
        self.index_name(ComponentKind::Signal, id, Some(&record.name));
        self.push_pending(ServerMessage::SignalCreate { id, record });
        id
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't live, or
    /// [`RegistryError::InUse`] if another component still references it.
    pub fn delete_signal(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.signals.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.signals.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Signal, id, Some(&name));
        self.global_signals.retain(|&s| s != id);
        self.push_pending(ServerMessage::SignalDelete { id });
        Ok(())
    }

    /// Emit a signal, broadcasting `SignalInvoke` to every connected client.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't a live signal.
    pub fn invoke_signal(
        &mut self,
        id: ComponentId,
        context: Option<ComponentId>,
        args: Vec<MethodValue>,
    ) -> Result<(), RegistryError> {
        if !self.signals.alive(id) {
            return Err(RegistryError::NotFound(id));
        }
        self.push_pending(ServerMessage::SignalInvoke {
            id,
            context,
            signal_data: args,
        });
        Ok(())
    }

    #[must_use]
    pub fn get_signal(&self, id: ComponentId) -> Option<&SignalRecord> {
        self.signals.get(id)
    }

    // ── Entity ───────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if a referenced
    /// component isn't live, or [`RegistryError::InvalidField`] if the
    /// transform or bounding box contains non-finite values.
    pub fn create_entity(&mut self, record: EntityRecord) -> Result<ComponentId, RegistryError> {
        validate_entity_fields(&record)?;
        let referenced = refs::entity_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.entities.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::Entity, id, record.name.as_deref());
        self.push_pending(ServerMessage::EntityCreate { id, record });
        Ok(id)
    }

    /// An empty delta (`EntityDelta::default()`) is a no-op: no
    /// validation, no mutation, no broadcast.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't live, or any of the
    /// validation errors [`create_entity`](Self::create_entity) can return.
    pub fn update_entity(&mut self, id: ComponentId, delta: EntityDelta) -> Result<(), RegistryError> {
        if delta == EntityDelta::default() {
            return if self.entities.alive(id) { Ok(()) } else { Err(RegistryError::NotFound(id)) };
        }
        let old_name = self.entities.get(id).ok_or(RegistryError::NotFound(id))?.name.clone();
        let mut merged = self.entities.get(id).ok_or(RegistryError::NotFound(id))?.clone();
        apply_entity_delta(&mut merged, delta.clone());
        validate_entity_fields(&merged)?;
        let referenced = refs::entity_refs(&merged);
        self.check_refs(&referenced)?;
        self.reverse.remove_all_from(id);
        self.record_refs(id, &referenced);
        if merged.name != old_name {
            self.unindex_name(ComponentKind::Entity, id, old_name.as_deref());
            self.index_name(ComponentKind::Entity, id, merged.name.as_deref());
        }
        *self.entities.get_mut(id).expect("checked alive above") = merged;
        self.push_pending(ServerMessage::EntityUpdate { id, delta });
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't live, or
    /// [`RegistryError::InUse`] if another component still references it.
    pub fn delete_entity(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.entities.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.entities.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Entity, id, name.as_deref());
        self.push_pending(ServerMessage::EntityDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_entity(&self, id: ComponentId) -> Option<&EntityRecord> {
        self.entities.get(id)
    }

    // ── Plot ─────────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if the referenced table
    /// or any listed method/signal isn't live.
    pub fn create_plot(&mut self, record: PlotRecord) -> Result<ComponentId, RegistryError> {
        let referenced = refs::plot_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.plots.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::Plot, id, record.name.as_deref());
        self.push_pending(ServerMessage::PlotCreate { id, record });
        Ok(id)
    }

    /// An empty delta (`PlotDelta::default()`) is a no-op: no validation,
    /// no mutation, no broadcast.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::DanglingReference`].
    pub fn update_plot(&mut self, id: ComponentId, delta: PlotDelta) -> Result<(), RegistryError> {
        if delta == PlotDelta::default() {
            return if self.plots.alive(id) { Ok(()) } else { Err(RegistryError::NotFound(id)) };
        }
        let old_name = self.plots.get(id).ok_or(RegistryError::NotFound(id))?.name.clone();
        let mut merged = self.plots.get(id).ok_or(RegistryError::NotFound(id))?.clone();
        apply_plot_delta(&mut merged, delta.clone());
        let referenced = refs::plot_refs(&merged);
        self.check_refs(&referenced)?;
        self.reverse.remove_all_from(id);
        self.record_refs(id, &referenced);
        if merged.name != old_name {
            self.unindex_name(ComponentKind::Plot, id, old_name.as_deref());
            self.index_name(ComponentKind::Plot, id, merged.name.as_deref());
        }
        *self.plots.get_mut(id).expect("checked alive above") = merged;
        self.push_pending(ServerMessage::PlotUpdate { id, delta });
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] if `id` isn't live.
    pub fn delete_plot(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.plots.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.reverse.remove_all_from(id);
        self.plots.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Plot, id, name.as_deref());
        self.push_pending(ServerMessage::PlotDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_plot(&self, id: ComponentId) -> Option<&PlotRecord> {
        self.plots.get(id)
    }

    // ── Buffer ───────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self, record: BufferRecord) -> ComponentId {
        let id = self.buffers.insert(record.clone());
        self.index_name(ComponentKind::Buffer, id, record.name.as_deref());
        self.push_pending(ServerMessage::BufferCreate { id, record });
        id
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_buffer(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.buffers.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.buffers.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Buffer, id, name.as_deref());
        self.push_pending(ServerMessage::BufferDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_buffer(&self, id: ComponentId) -> Option<&BufferRecord> {
        self.buffers.get(id)
    }

    // ── BufferView ───────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if `source_buffer` isn't live.
    pub fn create_buffer_view(
        &mut self,
        record: BufferViewRecord,
    ) -> Result<ComponentId, RegistryError> {
        let referenced = refs::buffer_view_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.buffer_views.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::BufferView, id, record.name.as_deref());
        self.push_pending(ServerMessage::BufferViewCreate { id, record });
        Ok(id)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_buffer_view(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.buffer_views.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.buffer_views.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::BufferView, id, name.as_deref());
        self.push_pending(ServerMessage::BufferViewDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_buffer_view(&self, id: ComponentId) -> Option<&BufferViewRecord> {
        self.buffer_views.get(id)
    }

    // ── Material ─────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] or [`RegistryError::InvalidField`].
    pub fn create_material(&mut self, record: MaterialRecord) -> Result<ComponentId, RegistryError> {
        validate_material_fields(&record)?;
        let referenced = refs::material_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.materials.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::Material, id, record.name.as_deref());
        self.push_pending(ServerMessage::MaterialCreate { id, record });
        Ok(id)
    }

    /// An empty delta (`MaterialDelta::default()`) is a no-op: no
    /// validation, no mutation, no broadcast.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`], [`RegistryError::DanglingReference`],
    /// or [`RegistryError::InvalidField`].
    pub fn update_material(
        &mut self,
        id: ComponentId,
        delta: MaterialDelta,
    ) -> Result<(), RegistryError> {
        if delta == MaterialDelta::default() {
            return if self.materials.alive(id) { Ok(()) } else { Err(RegistryError::NotFound(id)) };
        }
        let old_name = self.materials.get(id).ok_or(RegistryError::NotFound(id))?.name.clone();
        let mut merged = self.materials.get(id).ok_or(RegistryError::NotFound(id))?.clone();
        apply_material_delta(&mut merged, delta.clone());
        validate_material_fields(&merged)?;
        let referenced = refs::material_refs(&merged);
        self.check_refs(&referenced)?;
        self.reverse.remove_all_from(id);
        self.record_refs(id, &referenced);
        if merged.name != old_name {
            self.unindex_name(ComponentKind::Material, id, old_name.as_deref());
            self.index_name(ComponentKind::Material, id, merged.name.as_deref());
        }
        *self.materials.get_mut(id).expect("checked alive above") = merged;
        self.push_pending(ServerMessage::MaterialUpdate { id, delta });
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_material(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.materials.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.materials.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Material, id, name.as_deref());
        self.push_pending(ServerMessage::MaterialDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_material(&self, id: ComponentId) -> Option<&MaterialRecord> {
        self.materials.get(id)
    }

    // ── Image ────────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if the image sources
    /// from a buffer that isn't live.
    pub fn create_image(&mut self, record: ImageRecord) -> Result<ComponentId, RegistryError> {
        if let noodles_wire::records::ImageSource::BufferSource { buffer_source } = &record.source {
            self.check_refs(&[("buffer_source", *buffer_source)])?;
        }
        let id = self.images.insert(record.clone());
        if let noodles_wire::records::ImageSource::BufferSource { buffer_source } = &record.source
        {
            self.reverse.add(id, *buffer_source);
        }
        self.index_name(ComponentKind::Image, id, record.name.as_deref());
        self.push_pending(ServerMessage::ImageCreate { id, record });
        Ok(id)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_image(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.images.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.images.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Image, id, name.as_deref());
        self.push_pending(ServerMessage::ImageDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_image(&self, id: ComponentId) -> Option<&ImageRecord> {
        self.images.get(id)
    }

    // ── Texture ──────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if `image` or `sampler` isn't live.
    pub fn create_texture(&mut self, record: TextureRecord) -> Result<ComponentId, RegistryError> {
        let referenced = refs::texture_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.textures.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::Texture, id, record.name.as_deref());
        self.push_pending(ServerMessage::TextureCreate { id, record });
        Ok(id)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_texture(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.textures.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.textures.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Texture, id, name.as_deref());
        self.push_pending(ServerMessage::TextureDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_texture(&self, id: ComponentId) -> Option<&TextureRecord> {
        self.textures.get(id)
    }

    // ── Sampler ──────────────────────────────────────────────────────────

    pub fn create_sampler(&mut self, record: SamplerRecord) -> ComponentId {
        let id = self.samplers.insert(record.clone());
        self.index_name(ComponentKind::Sampler, id, record.name.as_deref());
        self.push_pending(ServerMessage::SamplerCreate { id, record });
        id
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_sampler(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.samplers.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.samplers.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Sampler, id, name.as_deref());
        self.push_pending(ServerMessage::SamplerDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_sampler(&self, id: ComponentId) -> Option<&SamplerRecord> {
        self.samplers.get(id)
    }

    // ── Light ────────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::InvalidField`] if color or intensity is non-finite.
    pub fn create_light(&mut self, record: LightRecord) -> Result<ComponentId, RegistryError> {
        validate_light_fields(&record)?;
        let id = self.lights.insert(record.clone());
        self.index_name(ComponentKind::Light, id, record.name.as_deref());
        self.push_pending(ServerMessage::LightCreate { id, record });
        Ok(id)
    }

    /// An empty delta (`LightDelta::default()`) is a no-op: no
    /// validation, no mutation, no broadcast.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InvalidField`].
    pub fn update_light(&mut self, id: ComponentId, delta: LightDelta) -> Result<(), RegistryError> {
        if delta == LightDelta::default() {
            return if self.lights.alive(id) { Ok(()) } else { Err(RegistryError::NotFound(id)) };
        }
        let old_name = self.lights.get(id).ok_or(RegistryError::NotFound(id))?.name.clone();
        let mut merged = self.lights.get(id).ok_or(RegistryError::NotFound(id))?.clone();
        apply_light_delta(&mut merged, delta.clone());
        validate_light_fields(&merged)?;
        if merged.name != old_name {
            self.unindex_name(ComponentKind::Light, id, old_name.as_deref());
            self.index_name(ComponentKind::Light, id, merged.name.as_deref());
        }
        *self.lights.get_mut(id).expect("checked alive above") = merged;
        self.push_pending(ServerMessage::LightUpdate { id, delta });
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_light(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.lights.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.lights.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Light, id, name.as_deref());
        self.push_pending(ServerMessage::LightDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_light(&self, id: ComponentId) -> Option<&LightRecord> {
        self.lights.get(id)
    }

    // ── Geometry ─────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if any patch references
    /// a buffer view or material that isn't live.
    pub fn create_geometry(&mut self, record: GeometryRecord) -> Result<ComponentId, RegistryError> {
        let referenced = refs::geometry_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.geometries.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::Geometry, id, record.name.as_deref());
        self.push_pending(ServerMessage::GeometryCreate { id, record });
        Ok(id)
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_geometry(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.geometries.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.geometries.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Geometry, id, name.as_deref());
        self.push_pending(ServerMessage::GeometryDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_geometry(&self, id: ComponentId) -> Option<&GeometryRecord> {
        self.geometries.get(id)
    }

    // ── Table ────────────────────────────────────────────────────────────

    /// # Errors
    /// Returns [`RegistryError::DanglingReference`] if a listed method or
    /// signal isn't live.
    pub fn create_table(&mut self, record: TableRecord) -> Result<ComponentId, RegistryError> {
        let referenced = refs::table_refs(&record);
        self.check_refs(&referenced)?;
        let id = self.tables.insert(record.clone());
        self.record_refs(id, &referenced);
        self.index_name(ComponentKind::Table, id, record.name.as_deref());
        self.push_pending(ServerMessage::TableCreate { id, record });
        self.pending_table_creates.push(id);
        Ok(id)
    }

    /// An empty delta (`TableDelta::default()`) is a no-op: no
    /// validation, no mutation, no broadcast.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::DanglingReference`].
    pub fn update_table(&mut self, id: ComponentId, delta: TableDelta) -> Result<(), RegistryError> {
        if delta == TableDelta::default() {
            return if self.tables.alive(id) { Ok(()) } else { Err(RegistryError::NotFound(id)) };
        }
        let old_name = self.tables.get(id).ok_or(RegistryError::NotFound(id))?.name.clone();
        let mut merged = self.tables.get(id).ok_or(RegistryError::NotFound(id))?.clone();
        apply_table_delta(&mut merged, delta.clone());
        let referenced = refs::table_refs(&merged);
        self.check_refs(&referenced)?;
        self.reverse.remove_all_from(id);
        self.record_refs(id, &referenced);
        if merged.name != old_name {
            self.unindex_name(ComponentKind::Table, id, old_name.as_deref());
            self.index_name(ComponentKind::Table, id, merged.name.as_deref());
        }
        *self.tables.get_mut(id).expect("checked alive above") = merged;
        self.push_pending(ServerMessage::TableUpdate { id, delta });
        Ok(())
    }

    /// # Errors
    /// Returns [`RegistryError::NotFound`] or [`RegistryError::InUse`].
    pub fn delete_table(&mut self, id: ComponentId) -> Result<(), RegistryError> {
        let Some(record) = self.tables.get(id) else {
            return Err(RegistryError::NotFound(id));
        };
        let name = record.name.clone();
        self.require_no_referrers(id)?;
        self.reverse.remove_all_from(id);
        self.tables.remove(id).map_err(|_| RegistryError::StaleId(id))?;
        self.unindex_name(ComponentKind::Table, id, name.as_deref());
        self.push_pending(ServerMessage::TableDelete { id });
        Ok(())
    }

    #[must_use]
    pub fn get_table(&self, id: ComponentId) -> Option<&TableRecord> {
        self.tables.get(id)
    }

    // ── Document-wide operations ─────────────────────────────────────────

    #[must_use]
    pub fn ids_by_kind(&self, kind: ComponentKind) -> Vec<ComponentId> {
        match kind {
            ComponentKind::Method => self.methods.ids().collect(),
            ComponentKind::Signal => self.signals.ids().collect(),
            ComponentKind::Entity => self.entities.ids().collect(),
            ComponentKind::Plot => self.plots.ids().collect(),
            ComponentKind::Buffer => self.buffers.ids().collect(),
            ComponentKind::BufferView => self.buffer_views.ids().collect(),
            ComponentKind::Material => self.materials.ids().collect(),
            ComponentKind::Image => self.images.ids().collect(),
            ComponentKind::Texture => self.textures.ids().collect(),
            ComponentKind::Sampler => self.samplers.ids().collect(),
            ComponentKind::Light => self.lights.ids().collect(),
            ComponentKind::Geometry => self.geometries.ids().collect(),
            ComponentKind::Table => self.tables.ids().collect(),
        }
    }

    /// Every live component as a `*Create` message, in [`ComponentKind::SNAPSHOT_ORDER`]
    /// so that by the time any component is described, everything it
    /// references has already appeared earlier in the stream.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        for kind in ComponentKind::SNAPSHOT_ORDER {
            match kind {
                ComponentKind::Method => out.extend(self.methods.iter().map(|(id, r)| {
                    ServerMessage::MethodCreate { id, record: r.clone() }
                })),
                ComponentKind::Signal => out.extend(self.signals.iter().map(|(id, r)| {
                    ServerMessage::SignalCreate { id, record: r.clone() }
                })),
                ComponentKind::Entity => out.extend(self.entities.iter().map(|(id, r)| {
                    ServerMessage::EntityCreate { id, record: r.clone() }
                })),
                ComponentKind::Plot => out.extend(self.plots.iter().map(|(id, r)| {
                    ServerMessage::PlotCreate { id, record: r.clone() }
                })),
                ComponentKind::Buffer => out.extend(self.buffers.iter().map(|(id, r)| {
                    ServerMessage::BufferCreate { id, record: r.clone() }
                })),
                ComponentKind::BufferView => out.extend(self.buffer_views.iter().map(|(id, r)| {
                    ServerMessage::BufferViewCreate { id, record: r.clone() }
                })),
                ComponentKind::Material => out.extend(self.materials.iter().map(|(id, r)| {
                    ServerMessage::MaterialCreate { id, record: r.clone() }
                })),
                ComponentKind::Image => out.extend(self.images.iter().map(|(id, r)| {
                    ServerMessage::ImageCreate { id, record: r.clone() }
                })),
                ComponentKind::Texture => out.extend(self.textures.iter().map(|(id, r)| {
                    ServerMessage::TextureCreate { id, record: r.clone() }
                })),
                ComponentKind::Sampler => out.extend(self.samplers.iter().map(|(id, r)| {
                    ServerMessage::SamplerCreate { id, record: r.clone() }
                })),
                ComponentKind::Light => out.extend(self.lights.iter().map(|(id, r)| {
                    ServerMessage::LightCreate { id, record: r.clone() }
                })),
                ComponentKind::Geometry => out.extend(self.geometries.iter().map(|(id, r)| {
                    ServerMessage::GeometryCreate { id, record: r.clone() }
                })),
                ComponentKind::Table => out.extend(self.tables.iter().map(|(id, r)| {
                    ServerMessage::TableCreate { id, record: r.clone() }
                })),
            }
        }
        out.push(ServerMessage::DocumentUpdate {
            methods_list: self.global_methods.clone(),
            signals_list: self.global_signals.clone(),
        });
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
            + self.signals.len()
            + self.entities.len()
            + self.plots.len()
            + self.buffers.len()
            + self.buffer_views.len()
            + self.materials.len()
            + self.images.len()
            + self.textures.len()
            + self.samplers.len()
            + self.lights.len()
            + self.geometries.len()
            + self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_entity_fields(record: &EntityRecord) -> Result<(), RegistryError> {
    if let Some(t) = &record.transform {
        if !is_finite(t) {
            return Err(RegistryError::InvalidField {
                field: "transform",
                reason: "contains a non-finite value".into(),
            });
        }
    }
    if let Some(bb) = &record.bounding_box {
        if !bb.is_finite() {
            return Err(RegistryError::InvalidField {
                field: "bounding_box",
                reason: "contains a non-finite value".into(),
            });
        }
    }
    Ok(())
}

fn validate_material_fields(record: &MaterialRecord) -> Result<(), RegistryError> {
    if !is_finite(&record.base_color) {
        return Err(RegistryError::InvalidField {
            field: "base_color",
            reason: "contains a non-finite value".into(),
        });
    }
    if !record.metallic.is_finite() || !record.roughness.is_finite() {
        return Err(RegistryError::InvalidField {
            field: "metallic/roughness",
            reason: "must be finite".into(),
        });
    }
    Ok(())
}

fn validate_light_fields(record: &LightRecord) -> Result<(), RegistryError> {
    if !is_finite(&record.color) || !record.intensity.is_finite() {
        return Err(RegistryError::InvalidField {
            field: "color/intensity",
            reason: "must be finite".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_wire::records::{BufferSource, EntityRecord};

    fn buffer(registry: &mut Registry) -> ComponentId {
        registry.create_buffer(BufferRecord {
            name: None,
            size: 16,
            source: BufferSource::InlineBytes {
                inline_bytes: vec![0; 16],
            },
        })
    }

    #[test]
    fn entity_referencing_missing_geometry_is_rejected() {
        let mut registry = Registry::new();
        let bogus_geometry = ComponentId::new(ComponentKind::Geometry, 99, 0);
        let record = EntityRecord {
            render_rep: Some(noodles_wire::records::RenderRepresentation {
                geometry: bogus_geometry,
                instances: None,
            }),
            ..Default::default()
        };
        let err = registry.create_entity(record).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DanglingReference {
                field: "render_rep.geometry",
                target: bogus_geometry,
            }
        );
    }

    #[test]
    fn deleting_a_referenced_buffer_fails_until_the_view_is_gone() {
        let mut registry = Registry::new();
        let buf = buffer(&mut registry);
        let view = registry
            .create_buffer_view(BufferViewRecord {
                name: None,
                source_buffer: buf,
                view_type: noodles_wire::records::BufferViewType::Geometry,
                offset: 0,
                length: 16,
            })
            .unwrap();

        assert_eq!(registry.delete_buffer(buf), Err(RegistryError::InUse(buf)));

        registry.delete_buffer_view(view).unwrap();
        assert!(registry.delete_buffer(buf).is_ok());
    }

    #[test]
    fn stale_id_after_delete_is_not_found_on_second_delete() {
        let mut registry = Registry::new();
        let buf = buffer(&mut registry);
        registry.delete_buffer(buf).unwrap();
        assert_eq!(registry.delete_buffer(buf), Err(RegistryError::NotFound(buf)));
    }

    #[test]
    fn snapshot_orders_buffers_before_buffer_views() {
        let mut registry = Registry::new();
        let buf = buffer(&mut registry);
        registry
            .create_buffer_view(BufferViewRecord {
                name: None,
                source_buffer: buf,
                view_type: noodles_wire::records::BufferViewType::Geometry,
                offset: 0,
                length: 16,
            })
            .unwrap();

        let snapshot = registry.snapshot();
        let buf_pos = snapshot
            .iter()
            .position(|m| matches!(m, ServerMessage::BufferCreate { .. }))
            .unwrap();
        let view_pos = snapshot
            .iter()
            .position(|m| matches!(m, ServerMessage::BufferViewCreate { .. }))
            .unwrap();
        assert!(buf_pos < view_pos);
    }

    #[test]
    fn snapshot_ends_with_a_document_update_listing_global_methods_and_signals() {
        let mut registry = Registry::new();
        let method = registry.create_method(MethodRecord {
            name: "reset_scene".into(),
            ..Default::default()
        });
        let signal = registry.create_signal(SignalRecord {
            name: "on_ready".into(),
            ..Default::default()
        });
        registry.attach_global_method(method).unwrap();
        registry.attach_global_signal(signal).unwrap();

        let snapshot = registry.snapshot();
        match snapshot.last() {
            Some(ServerMessage::DocumentUpdate { methods_list, signals_list }) => {
                assert_eq!(methods_list, &vec![method]);
                assert_eq!(signals_list, &vec![signal]);
            }
            other => panic!("expected a trailing DocumentUpdate, got {other:?}"),
        }
    }

    #[test]
    fn attaching_an_unknown_method_as_global_is_rejected() {
        let mut registry = Registry::new();
        let bogus = ComponentId::new(ComponentKind::Method, 7, 0);
        assert_eq!(registry.attach_global_method(bogus), Err(RegistryError::NotFound(bogus)));
    }

    #[test]
    fn non_finite_transform_is_rejected() {
        let mut registry = Registry::new();
        let mut bad_transform = noodles_math::IDENTITY;
        bad_transform[0] = f32::NAN;
        let record = EntityRecord {
            transform: Some(bad_transform),
            ..Default::default()
        };
        assert!(matches!(
            registry.create_entity(record),
            Err(RegistryError::InvalidField { field: "transform", .. })
        ));
    }

    #[test]
    fn create_and_delete_queue_pending_broadcast_messages() {
        let mut registry = Registry::new();
        let buf = buffer(&mut registry);
        assert_eq!(registry.drain_pending().len(), 1);

        registry.delete_buffer(buf).unwrap();
        let pending = registry.drain_pending();
        assert_eq!(pending.len(), 1);
        assert!(matches!(pending[0], ServerMessage::BufferDelete { id } if id == buf));

        assert!(registry.drain_pending().is_empty());
    }

    #[test]
    fn empty_entity_update_is_a_no_op_with_no_broadcast() {
        let mut registry = Registry::new();
        let id = registry.create_entity(EntityRecord::default()).unwrap();
        registry.drain_pending();

        registry.update_entity(id, EntityDelta::default()).unwrap();
        assert!(registry.drain_pending().is_empty());
    }

    #[test]
    fn invoking_a_signal_broadcasts_signal_invoke_with_its_context_and_args() {
        let mut registry = Registry::new();
        let signal = registry.create_signal(SignalRecord {
            name: "on_click".into(),
            ..Default::default()
        });
        let entity = registry.create_entity(EntityRecord::default()).unwrap();
        registry.drain_pending();

        registry
            .invoke_signal(signal, Some(entity), vec![MethodValue::Integer(42.into())])
            .unwrap();

        let pending = registry.drain_pending();
        assert_eq!(pending.len(), 1);
        assert!(matches!(
            &pending[0],
            ServerMessage::SignalInvoke { id, context, signal_data }
                if *id == signal
                    && *context == Some(entity)
                    && signal_data == &[MethodValue::Integer(42.into())]
        ));
    }

    #[test]
    fn invoking_an_unknown_signal_is_rejected() {
        let mut registry = Registry::new();
        let bogus = ComponentId::new(ComponentKind::Signal, 3, 0);
        let err = registry.invoke_signal(bogus, None, vec![]).unwrap_err();
        assert_eq!(err, RegistryError::NotFound(bogus));
    }

    #[test]
    fn get_component_id_finds_the_most_recently_created_match() {
        let mut registry = Registry::new();
        let first = registry
            .create_entity(EntityRecord {
                name: Some("spinner".into()),
                ..Default::default()
            })
            .unwrap();
        let second = registry
            .create_entity(EntityRecord {
                name: Some("spinner".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            registry.get_component_id(ComponentKind::Entity, "spinner"),
            Some(second)
        );
        assert_eq!(registry.get_component_id(ComponentKind::Entity, "nope"), None);

        registry.delete_entity(second).unwrap();
        assert_eq!(
            registry.get_component_id(ComponentKind::Entity, "spinner"),
            Some(first)
        );

        registry.delete_entity(first).unwrap();
        assert_eq!(registry.get_component_id(ComponentKind::Entity, "spinner"), None);
    }

    #[test]
    fn renaming_via_update_moves_the_name_index_entry() {
        let mut registry = Registry::new();
        let id = registry
            .create_entity(EntityRecord {
                name: Some("before".into()),
                ..Default::default()
            })
            .unwrap();

        registry
            .update_entity(
                id,
                EntityDelta {
                    name: Some("after".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(registry.get_component_id(ComponentKind::Entity, "before"), None);
        assert_eq!(registry.get_component_id(ComponentKind::Entity, "after"), Some(id));
    }
}
