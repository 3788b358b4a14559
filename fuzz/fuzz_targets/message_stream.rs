#![no_main]

use std::sync::Arc;

use codec::{decode_at, encode, CodecLimits, Dispatcher, Message};
use libfuzzer_sys::fuzz_target;
use schema::{Definition, Element, FieldKind, FieldTag, MessageDescriptor};

struct Schemas {
    point: Arc<MessageDescriptor>,
    label: Arc<MessageDescriptor>,
    shape: Arc<MessageDescriptor>,
}

fn schemas() -> Schemas {
    let point = MessageDescriptor::compile(
        1,
        Definition::new()
            .field("x", FieldTag::Float32)
            .field("y", FieldTag::Float32),
    )
    .unwrap();
    let label = MessageDescriptor::compile(
        2,
        Definition::new()
            .field("text", FieldKind::string())
            .field("tags", FieldKind::dynamic_array(Element::String)),
    )
    .unwrap();
    let shape = MessageDescriptor::compile(
        3,
        Definition::new()
            .field("points", FieldKind::dynamic_array(Arc::clone(&point)))
            .field("label", FieldKind::optional(&label))
            .field("state", FieldKind::flags(["open", "filled"]))
            .field("grid", FieldKind::fixed_array(FieldTag::Int16, 4)),
    )
    .unwrap();
    Schemas {
        point,
        label,
        shape,
    }
}

fuzz_target!(|data: &[u8]| {
    let s = schemas();
    let limits = CodecLimits::for_testing();

    let mut dispatcher = Dispatcher::with_limits(limits)
        .with(&s.point, |msg: Message| (1u8, msg))
        .with(&s.label, |msg: Message| (2u8, msg))
        .with(&s.shape, |msg: Message| (3u8, msg));

    if let Ok(Some((tag, msg))) = dispatcher.dispatch(data) {
        let desc = match tag {
            1 => &s.point,
            2 => &s.label,
            _ => &s.shape,
        };
        let bytes = encode(&msg, desc).unwrap();
        assert!(bytes.len() <= data.len());
        assert_eq!(bytes[0], tag);
    }

    // Walk the input as a stream of back-to-back shapes.
    let mut cursor = 0usize;
    while cursor < data.len() {
        let before = cursor;
        if decode_at(data, &mut cursor, data.len(), &s.shape).is_err() {
            assert_eq!(cursor, before);
            break;
        }
        assert!(cursor > before);
    }
});
