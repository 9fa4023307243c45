//! The message envelope: one variant per wire tag, carrying that tag's
//! payload shape.

use serde::{Deserialize, Serialize};

use noodles_ids::ComponentId;

use crate::records::{
    BufferRecord, BufferViewRecord, EntityDelta, EntityRecord, GeometryRecord, ImageRecord,
    LightDelta, LightRecord, MaterialDelta, MaterialRecord, MethodRecord, PlotDelta, PlotRecord,
    SamplerRecord, SignalRecord, TableDelta, TableRecord, TextureRecord,
};
use crate::tag;

/// A value the client is invoking a method with, or a method reply is
/// carrying back.
pub type MethodValue = ciborium::value::Value;

/// A server→client message, tagged with the wire tag it was (or will be)
/// framed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ServerMessage {
    MethodCreate { id: ComponentId, record: MethodRecord },
    MethodDelete { id: ComponentId },
    SignalCreate { id: ComponentId, record: SignalRecord },
    SignalDelete { id: ComponentId },
    EntityCreate { id: ComponentId, record: EntityRecord },
    EntityUpdate { id: ComponentId, delta: EntityDelta },
    EntityDelete { id: ComponentId },
    PlotCreate { id: ComponentId, record: PlotRecord },
    PlotUpdate { id: ComponentId, delta: PlotDelta },
    PlotDelete { id: ComponentId },
    BufferCreate { id: ComponentId, record: BufferRecord },
    BufferDelete { id: ComponentId },
    BufferViewCreate { id: ComponentId, record: BufferViewRecord },
    BufferViewDelete { id: ComponentId },
    MaterialCreate { id: ComponentId, record: MaterialRecord },
    MaterialUpdate { id: ComponentId, delta: MaterialDelta },
    MaterialDelete { id: ComponentId },
    ImageCreate { id: ComponentId, record: ImageRecord },
    ImageDelete { id: ComponentId },
    TextureCreate { id: ComponentId, record: TextureRecord },
    TextureDelete { id: ComponentId },
    SamplerCreate { id: ComponentId, record: SamplerRecord },
    SamplerDelete { id: ComponentId },
    LightCreate { id: ComponentId, record: LightRecord },
    LightUpdate { id: ComponentId, delta: LightDelta },
    LightDelete { id: ComponentId },
    GeometryCreate { id: ComponentId, record: GeometryRecord },
    GeometryDelete { id: ComponentId },
    TableCreate { id: ComponentId, record: TableRecord },
    TableUpdate { id: ComponentId, delta: TableDelta },
    TableDelete { id: ComponentId },
    DocumentUpdate { methods_list: Vec<ComponentId>, signals_list: Vec<ComponentId> },
    DocumentReset,
    SignalInvoke {
        id: ComponentId,
        context: Option<ComponentId>,
        signal_data: Vec<MethodValue>,
    },
    MethodReply {
        invoke_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<MethodValue>,
        #[serde(skip_serializing_if = "Option::is_none")]
        exception: Option<crate::MethodException>,
    },
    InitDone,
}

impl ServerMessage {
    /// The wire tag this message frames under.
    #[must_use]
    pub fn tag(&self) -> u64 {
        match self {
            ServerMessage::MethodCreate { .. } => tag::METHOD_CREATE,
            ServerMessage::MethodDelete { .. } => tag::METHOD_DELETE,
            ServerMessage::SignalCreate { .. } => tag::SIGNAL_CREATE,
            ServerMessage::SignalDelete { .. } => tag::SIGNAL_DELETE,
            ServerMessage::EntityCreate { .. } => tag::ENTITY_CREATE,
            ServerMessage::EntityUpdate { .. } => tag::ENTITY_UPDATE,
            ServerMessage::EntityDelete { .. } => tag::ENTITY_DELETE,
            ServerMessage::PlotCreate { .. } => tag::PLOT_CREATE,
            ServerMessage::PlotUpdate { .. } => tag::PLOT_UPDATE,
            ServerMessage::PlotDelete { .. } => tag::PLOT_DELETE,
            ServerMessage::BufferCreate { .. } => tag::BUFFER_CREATE,
            ServerMessage::BufferDelete { .. } => tag::BUFFER_DELETE,
            ServerMessage::BufferViewCreate { .. } => tag::BUFFER_VIEW_CREATE,
            ServerMessage::BufferViewDelete { .. } => tag::BUFFER_VIEW_DELETE,
            ServerMessage::MaterialCreate { .. } => tag::MATERIAL_CREATE,
            ServerMessage::MaterialUpdate { .. } => tag::MATERIAL_UPDATE,
            ServerMessage::MaterialDelete { .. } => tag::MATERIAL_DELETE,
            ServerMessage::ImageCreate { .. } => tag::IMAGE_CREATE,
            ServerMessage::ImageDelete { .. } => tag::IMAGE_DELETE,
            ServerMessage::TextureCreate { .. } => tag::TEXTURE_CREATE,
            ServerMessage::TextureDelete { .. } => tag::TEXTURE_DELETE,
            ServerMessage::SamplerCreate { .. } => tag::SAMPLER_CREATE,
            ServerMessage::SamplerDelete { .. } => tag::SAMPLER_DELETE,
            ServerMessage::LightCreate { .. } => tag::LIGHT_CREATE,
            ServerMessage::LightUpdate { .. } => tag::LIGHT_UPDATE,
            ServerMessage::LightDelete { .. } => tag::LIGHT_DELETE,
            ServerMessage::GeometryCreate { .. } => tag::GEOMETRY_CREATE,
            ServerMessage::GeometryDelete { .. } => tag::GEOMETRY_DELETE,
            ServerMessage::TableCreate { .. } => tag::TABLE_CREATE,
            ServerMessage::TableUpdate { .. } => tag::TABLE_UPDATE,
            ServerMessage::TableDelete { .. } => tag::TABLE_DELETE,
            ServerMessage::DocumentUpdate { .. } => tag::DOCUMENT_UPDATE,
            ServerMessage::DocumentReset => tag::DOCUMENT_RESET,
            ServerMessage::SignalInvoke { .. } => tag::SIGNAL_INVOKE,
            ServerMessage::MethodReply { .. } => tag::METHOD_REPLY,
            ServerMessage::InitDone => tag::INIT_DONE,
        }
    }
}

/// The first message a client sends on a new connection, identifying
/// itself before anything else crosses the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntroMessage {
    pub client_name: String,
}

/// A client invoking a method, targeted at an optional context component
/// (an entity, table, or plot the method is scoped to) or the document
/// itself when `context` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvokeMethodMessage {
    pub method: ComponentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ComponentId>,
    #[serde(default)]
    pub args: Vec<MethodValue>,
    pub invoke_id: String,
}

/// A client→server message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMessage {
    Intro(IntroMessage),
    InvokeMethod(InvokeMethodMessage),
}

impl ClientMessage {
    #[must_use]
    pub fn tag(&self) -> u64 {
        match self {
            ClientMessage::Intro(_) => tag::client_to_server::INTRO_MESSAGE,
            ClientMessage::InvokeMethod(_) => tag::client_to_server::INVOKE_METHOD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noodles_ids::ComponentKind;

    #[test]
    fn tags_match_the_message_variant() {
        let msg = ServerMessage::EntityDelete {
            id: ComponentId::new(ComponentKind::Entity, 3, 0),
        };
        assert_eq!(msg.tag(), tag::ENTITY_DELETE);
    }

    #[test]
    fn client_message_tags_are_distinct() {
        let intro = ClientMessage::Intro(IntroMessage {
            client_name: "probe".into(),
        });
        let invoke = ClientMessage::InvokeMethod(InvokeMethodMessage {
            method: ComponentId::new(ComponentKind::Method, 0, 0),
            context: None,
            args: vec![],
            invoke_id: "1".into(),
        });
        assert_ne!(intro.tag(), invoke.tag());
    }
}
