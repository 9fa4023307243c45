//! CBOR array framing: the wire format is a single top-level array
//! alternating `tag, payload, tag, payload, ...`, so a websocket binary
//! frame can carry a batch of messages without repeating framing overhead
//! per message.

use ciborium::value::Value;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::WireError;
use crate::message::ServerMessage;
use crate::tag;

/// Serialize a payload to a CBOR [`Value`] by round-tripping it through
/// `ciborium`'s serializer. Used instead of a direct typed→`Value`
/// conversion so every payload shape goes through the same codepath the
/// wire actually uses.
fn to_value<T: Serialize>(payload: &T) -> Result<Value, WireError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(payload, &mut buf)?;
    let value: Value = ciborium::de::from_reader(buf.as_slice())?;
    Ok(value)
}

fn from_value<T: DeserializeOwned>(tag_num: u64, value: Value) -> Result<T, WireError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&value, &mut buf).map_err(|e| WireError::PayloadShape {
        tag: tag_num,
        source: ciborium::de::Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        )),
    })?;
    ciborium::de::from_reader(buf.as_slice()).map_err(|source| WireError::PayloadShape {
        tag: tag_num,
        source,
    })
}

/// Encode a batch of server messages into one CBOR array frame.
pub fn encode_frame(messages: &[ServerMessage]) -> Result<Vec<u8>, WireError> {
    let mut items = Vec::with_capacity(messages.len() * 2);
    for msg in messages {
        items.push(Value::Integer(msg.tag().into()));
        items.push(to_value(msg)?);
    }
    let array = Value::Array(items);
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&array, &mut buf)?;
    Ok(buf)
}

/// Encode a batch of client messages into one CBOR array frame. The
/// server itself never calls this — it only decodes inbound frames — but
/// anything speaking this protocol as a client needs the other direction.
pub fn encode_client_frame(messages: &[crate::message::ClientMessage]) -> Result<Vec<u8>, WireError> {
    use crate::message::ClientMessage;

    let mut items = Vec::with_capacity(messages.len() * 2);
    for msg in messages {
        items.push(Value::Integer(msg.tag().into()));
        let payload = match msg {
            ClientMessage::Intro(intro) => to_value(intro)?,
            ClientMessage::InvokeMethod(invoke) => to_value(invoke)?,
        };
        items.push(payload);
    }
    let array = Value::Array(items);
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&array, &mut buf)?;
    Ok(buf)
}

/// Decode a CBOR array frame into its `(tag, Value)` pairs, without
/// resolving each payload to a typed [`ServerMessage`] yet. Callers that
/// already know which direction (client or server tag space) they're
/// decoding use this, then dispatch each pair through `decode_payload`.
pub fn decode_raw_frame(bytes: &[u8]) -> Result<Vec<(u64, Value)>, WireError> {
    let value: Value = ciborium::de::from_reader(bytes)?;
    let Value::Array(items) = value else {
        return Err(WireError::NotAFrame);
    };
    if items.len() % 2 != 0 {
        return Err(WireError::UnbalancedFrame);
    }
    items
        .chunks_exact(2)
        .map(|pair| {
            let tag_num = pair[0].as_integer().and_then(|i| u64::try_from(i).ok());
            let tag_num = tag_num.ok_or(WireError::InvalidTag)?;
            Ok((tag_num, pair[1].clone()))
        })
        .collect()
}

/// Decode one client→server payload, given its tag.
pub fn decode_client_payload(
    tag_num: u64,
    value: Value,
) -> Result<crate::message::ClientMessage, WireError> {
    use crate::message::{ClientMessage, IntroMessage, InvokeMethodMessage};

    match tag_num {
        t if t == tag::client_to_server::INTRO_MESSAGE => {
            Ok(ClientMessage::Intro(from_value::<IntroMessage>(t, value)?))
        }
        t if t == tag::client_to_server::INVOKE_METHOD => Ok(ClientMessage::InvokeMethod(
            from_value::<InvokeMethodMessage>(t, value)?,
        )),
        other => Err(WireError::UnknownTag(other)),
    }
}

/// Decode a full client→server frame into an ordered list of messages.
pub fn decode_client_frame(
    bytes: &[u8],
) -> Result<Vec<crate::message::ClientMessage>, WireError> {
    decode_raw_frame(bytes)?
        .into_iter()
        .map(|(t, v)| decode_client_payload(t, v))
        .collect()
}

/// Decode one server→client payload, given its tag. The server itself
/// never calls this — it only encodes — but anything speaking this
/// protocol as a client needs the other direction too.
pub fn decode_server_payload(tag_num: u64, value: Value) -> Result<ServerMessage, WireError> {
    use crate::records::{
        BufferRecord, BufferViewRecord, EntityDelta, EntityRecord, GeometryRecord, ImageRecord,
        LightDelta, LightRecord, MaterialDelta, MaterialRecord, MethodRecord, PlotDelta,
        PlotRecord, SamplerRecord, SignalRecord, TableDelta, TableRecord, TextureRecord,
    };
    use noodles_ids::ComponentId;

    #[derive(serde::Deserialize)]
    struct WithId<R> {
        id: ComponentId,
        #[serde(default)]
        record: Option<R>,
        #[serde(default)]
        delta: Option<R>,
    }
    #[derive(serde::Deserialize)]
    struct JustId {
        id: ComponentId,
    }
    #[derive(serde::Deserialize)]
    struct DocumentUpdate {
        methods_list: Vec<ComponentId>,
        signals_list: Vec<ComponentId>,
    }
    #[derive(serde::Deserialize)]
    struct SignalInvoke {
        id: ComponentId,
        #[serde(default)]
        context: Option<ComponentId>,
        signal_data: Vec<crate::message::MethodValue>,
    }
    #[derive(serde::Deserialize)]
    struct MethodReply {
        invoke_id: String,
        #[serde(default)]
        result: Option<crate::message::MethodValue>,
        #[serde(default)]
        exception: Option<crate::MethodException>,
    }

    macro_rules! with_record {
        ($variant:ident, $record_ty:ty) => {{
            let decoded: WithId<$record_ty> = from_value(tag_num, value)?;
            ServerMessage::$variant {
                id: decoded.id,
                record: decoded.record.ok_or(WireError::NotAFrame)?,
            }
        }};
    }
    macro_rules! with_delta {
        ($variant:ident, $delta_ty:ty) => {{
            let decoded: WithId<$delta_ty> = from_value(tag_num, value)?;
            ServerMessage::$variant {
                id: decoded.id,
                delta: decoded.delta.ok_or(WireError::NotAFrame)?,
            }
        }};
    }
    macro_rules! just_delete {
        ($variant:ident) => {{
            let decoded: JustId = from_value(tag_num, value)?;
            ServerMessage::$variant { id: decoded.id }
        }};
    }

    Ok(match tag_num {
        t if t == tag::METHOD_CREATE => with_record!(MethodCreate, MethodRecord),
        t if t == tag::METHOD_DELETE => just_delete!(MethodDelete),
        t if t == tag::SIGNAL_CREATE => with_record!(SignalCreate, SignalRecord),
        t if t == tag::SIGNAL_DELETE => just_delete!(SignalDelete),
        t if t == tag::ENTITY_CREATE => with_record!(EntityCreate, EntityRecord),
        t if t == tag::ENTITY_UPDATE => with_delta!(EntityUpdate, EntityDelta),
        t if t == tag::ENTITY_DELETE => just_delete!(EntityDelete),
        t if t == tag::PLOT_CREATE => with_record!(PlotCreate, PlotRecord),
        t if t == tag::PLOT_UPDATE => with_delta!(PlotUpdate, PlotDelta),
        t if t == tag::PLOT_DELETE => just_delete!(PlotDelete),
        t if t == tag::BUFFER_CREATE => with_record!(BufferCreate, BufferRecord),
        t if t == tag::BUFFER_DELETE => just_delete!(BufferDelete),
        t if t == tag::BUFFER_VIEW_CREATE => with_record!(BufferViewCreate, BufferViewRecord),
        t if t == tag::BUFFER_VIEW_DELETE => just_delete!(BufferViewDelete),
        t if t == tag::MATERIAL_CREATE => with_record!(MaterialCreate, MaterialRecord),
        t if t == tag::MATERIAL_UPDATE => with_delta!(MaterialUpdate, MaterialDelta),
        t if t == tag::MATERIAL_DELETE => just_delete!(MaterialDelete),
        t if t == tag::IMAGE_CREATE => with_record!(ImageCreate, ImageRecord),
        t if t == tag::IMAGE_DELETE => just_delete!(ImageDelete),
        t if t == tag::TEXTURE_CREATE => with_record!(TextureCreate, TextureRecord),
        t if t == tag::TEXTURE_DELETE => just_delete!(TextureDelete),
        t if t == tag::SAMPLER_CREATE => with_record!(SamplerCreate, SamplerRecord),
        t if t == tag::SAMPLER_DELETE => just_delete!(SamplerDelete),
        t if t == tag::LIGHT_CREATE => with_record!(LightCreate, LightRecord),
        t if t == tag::LIGHT_UPDATE => with_delta!(LightUpdate, LightDelta),
        t if t == tag::LIGHT_DELETE => just_delete!(LightDelete),
        t if t == tag::GEOMETRY_CREATE => with_record!(GeometryCreate, GeometryRecord),
        t if t == tag::GEOMETRY_DELETE => just_delete!(GeometryDelete),
        t if t == tag::TABLE_CREATE => with_record!(TableCreate, TableRecord),
        t if t == tag::TABLE_UPDATE => with_delta!(TableUpdate, TableDelta),
        t if t == tag::TABLE_DELETE => just_delete!(TableDelete),
        t if t == tag::DOCUMENT_UPDATE => {
            let decoded: DocumentUpdate = from_value(tag_num, value)?;
            ServerMessage::DocumentUpdate {
                methods_list: decoded.methods_list,
                signals_list: decoded.signals_list,
            }
        }
        t if t == tag::DOCUMENT_RESET => ServerMessage::DocumentReset,
        t if t == tag::SIGNAL_INVOKE => {
            let decoded: SignalInvoke = from_value(tag_num, value)?;
            ServerMessage::SignalInvoke {
                id: decoded.id,
                context: decoded.context,
                signal_data: decoded.signal_data,
            }
        }
        t if t == tag::METHOD_REPLY => {
            let decoded: MethodReply = from_value(tag_num, value)?;
            ServerMessage::MethodReply {
                invoke_id: decoded.invoke_id,
                result: decoded.result,
                exception: decoded.exception,
            }
        }
        t if t == tag::INIT_DONE => ServerMessage::InitDone,
        other => return Err(WireError::UnknownTag(other)),
    })
}

/// Decode a full server→client frame into an ordered list of messages.
pub fn decode_server_frame(bytes: &[u8]) -> Result<Vec<ServerMessage>, WireError> {
    decode_raw_frame(bytes)?
        .into_iter()
        .map(|(t, v)| decode_server_payload(t, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ClientMessage, IntroMessage};
    use noodles_ids::{ComponentId, ComponentKind};

    #[test]
    fn server_frame_roundtrips_a_single_message() {
        let msg = ServerMessage::EntityDelete {
            id: ComponentId::new(ComponentKind::Entity, 2, 1),
        };
        let bytes = encode_frame(std::slice::from_ref(&msg)).unwrap();
        let pairs = decode_raw_frame(&bytes).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, tag::ENTITY_DELETE);
    }

    #[test]
    fn server_frame_preserves_message_order() {
        let a = ServerMessage::InitDone;
        let b = ServerMessage::DocumentReset;
        let bytes = encode_frame(&[a, b]).unwrap();
        let pairs = decode_raw_frame(&bytes).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, tag::INIT_DONE);
        assert_eq!(pairs[1].0, tag::DOCUMENT_RESET);
    }

    #[test]
    fn client_frame_roundtrips_through_encode_and_decode() {
        use crate::message::InvokeMethodMessage;

        let intro = ClientMessage::Intro(IntroMessage {
            client_name: "probe".into(),
        });
        let invoke = ClientMessage::InvokeMethod(InvokeMethodMessage {
            method: ComponentId::new(ComponentKind::Method, 0, 0),
            context: None,
            args: vec![],
            invoke_id: "1".into(),
        });
        let bytes = encode_client_frame(&[intro.clone(), invoke.clone()]).unwrap();
        let decoded = decode_client_frame(&bytes).unwrap();
        assert_eq!(decoded, vec![intro, invoke]);
    }

    #[test]
    fn server_frame_roundtrips_a_record_bearing_message_through_decode_server_frame() {
        use crate::records::MethodRecord;

        let id = ComponentId::new(ComponentKind::Method, 3, 0);
        let msg = ServerMessage::MethodCreate {
            id,
            record: MethodRecord {
                name: "ping".into(),
                ..Default::default()
            },
        };
        let bytes = encode_frame(std::slice::from_ref(&msg)).unwrap();
        let decoded = decode_server_frame(&bytes).unwrap();
        assert_eq!(decoded, vec![msg]);
    }

    #[test]
    fn client_frame_decodes_intro_message() {
        let mut buf = Vec::new();
        let items = vec![
            Value::Integer(tag::client_to_server::INTRO_MESSAGE.into()),
            to_value(&IntroMessage {
                client_name: "probe".into(),
            })
            .unwrap(),
        ];
        ciborium::ser::into_writer(&Value::Array(items), &mut buf).unwrap();

        let decoded = decode_client_frame(&buf).unwrap();
        assert_eq!(decoded.len(), 1);
        match &decoded[0] {
            ClientMessage::Intro(m) => assert_eq!(m.client_name, "probe"),
            other => panic!("expected Intro, got {other:?}"),
        }
    }

    #[test]
    fn non_array_top_level_value_is_rejected() {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&Value::Integer(5.into()), &mut buf).unwrap();
        assert!(matches!(decode_raw_frame(&buf), Err(WireError::NotAFrame)));
    }

    #[test]
    fn odd_length_array_is_rejected() {
        let mut buf = Vec::new();
        let items = vec![Value::Integer(0.into())];
        ciborium::ser::into_writer(&Value::Array(items), &mut buf).unwrap();
        assert!(matches!(
            decode_raw_frame(&buf),
            Err(WireError::UnbalancedFrame)
        ));
    }
}
