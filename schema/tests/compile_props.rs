use proptest::prelude::*;
use schema::{layout_hash, Definition, FieldKind, FieldTag, MessageDescriptor, SchemaError};

fn fields() -> impl Strategy<Value = Vec<(String, FieldTag)>> {
    prop::collection::btree_map("[a-z_]{1,6}", 0usize..8, 0..12)
        .prop_map(|map| {
            map.into_iter()
                .map(|(name, ordinal)| (name, FieldTag::ALL[ordinal]))
                .collect::<Vec<_>>()
        })
        .prop_flat_map(|sorted| Just(sorted).prop_shuffle())
}

fn definition(fields: &[(String, FieldTag)]) -> Definition {
    fields
        .iter()
        .fold(Definition::new(), |def, (name, tag)| def.field(name.clone(), *tag))
}

proptest! {
    #[test]
    fn prop_declaration_order_is_irrelevant(fields in fields(), tag in any::<u8>()) {
        let mut reversed = fields.clone();
        reversed.reverse();

        let a = MessageDescriptor::compile(tag, definition(&fields)).unwrap();
        let b = MessageDescriptor::compile(tag, definition(&reversed)).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(layout_hash(&a), layout_hash(&b));

        let names: Vec<&str> = a.entries().iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        prop_assert_eq!(names, sorted);
    }

    #[test]
    fn prop_primitive_layouts_are_fixed(fields in fields()) {
        let desc = MessageDescriptor::compile(1, definition(&fields)).unwrap();
        let widths: usize = fields.iter().map(|(_, tag)| tag.byte_width()).sum();
        prop_assert_eq!(desc.minimum_byte_length(), 1 + widths);
        prop_assert!(desc.is_fixed_size());
        prop_assert!(!desc.contains_strings());
    }

    #[test]
    fn prop_flag_sets_cap_at_eight(count in 0usize..16) {
        let names: Vec<String> = (0..count).map(|i| format!("f{i}")).collect();
        let result = MessageDescriptor::compile(
            1,
            Definition::new().field("state", FieldKind::flags(names)),
        );
        if count <= 8 {
            prop_assert_eq!(result.unwrap().minimum_byte_length(), 2);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                SchemaError::TooManyFlags { field: "state".to_string(), count }
            );
        }
    }

    #[test]
    fn prop_type_tags_outside_a_byte_are_rejected(value in 256i64..100_000) {
        let err = schema::TypeTag::try_from(value).unwrap_err();
        prop_assert_eq!(err, SchemaError::InvalidTypeTag { value });
    }
}
