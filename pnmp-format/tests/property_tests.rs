//! Property-based tests for PNMP scanner primitives

use pnmp_format::field::truncate_chars;
use pnmp_format::{get_value, ArrayElements, Framed, Limits, Objects, RawObject};
use proptest::prelude::*;

/// Object bodies without quotes, braces or backslashes, so framing is trivial to predict
fn plain_body() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:, .\\-]{0,40}"
}

fn frame_texts(input: &[u8]) -> Vec<String> {
    Objects::new(input)
        .filter_map(|framed| match framed.expect("in-memory read") {
            Framed::Object(object) => Some(object.into_string()),
            Framed::Oversize { .. } => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn concatenated_objects_frame_back(
        bodies in prop::collection::vec(plain_body(), 0..20),
        noise in "[a-z \\n\\]\\[]{0,5}",
    ) {
        let mut input = String::new();
        for body in &bodies {
            input.push_str(&noise);
            input.push('{');
            input.push_str(body);
            input.push('}');
        }
        prop_assert_eq!(frame_texts(input.as_bytes()), bodies);
    }

    #[test]
    fn quoted_braces_never_split_objects(inner in "[a-z{}\\[\\]]{0,30}") {
        let input = format!("{{\"v\":\"{inner}\"}}");
        let expected = vec![format!("\"v\":\"{inner}\"")];
        prop_assert_eq!(frame_texts(input.as_bytes()), expected);
    }

    #[test]
    fn nested_objects_frame_once(depth in 1usize..12) {
        let input = format!("{}{}", "{\"a\":".repeat(depth), "1".to_string() + &"}".repeat(depth));
        let framed = frame_texts(input.as_bytes());
        prop_assert_eq!(framed.len(), 1);
        prop_assert_eq!(framed[0].len(), input.len() - 2);
    }

    #[test]
    fn framing_arbitrary_bytes_never_panics(input in prop::collection::vec(any::<u8>(), 0..512)) {
        let limits = Limits { max_object_bytes: 64, ..Limits::default() };
        for framed in Objects::with_limits(&input[..], &limits) {
            if let Framed::Object(object) = framed.expect("in-memory read") {
                prop_assert!(object.len() <= 64 * 3);
            }
        }
    }

    #[test]
    fn extraction_respects_destination_bound(
        value in "[^\"]{0,60}",
        max_len in 0usize..40,
    ) {
        let text = format!("\"k\":\"{value}\"");
        let extracted = get_value(&text, "k", max_len).expect("key present");
        prop_assert!(extracted.chars().count() <= max_len);
        prop_assert_eq!(extracted.as_str(), truncate_chars(&value, max_len));
    }

    #[test]
    fn extraction_never_panics(text in ".{0,200}", key in "[a-zA-Z@]{1,8}") {
        let _ = get_value(&text, &key, 15);
        let object = RawObject::new(text.clone());
        if let Ok(elements) = object.array(&key) {
            for element in elements {
                prop_assert!(element.text.starts_with('{'), "element does not start with an opening brace");
            }
        }
    }

    #[test]
    fn key_order_does_not_matter(a in "[a-z0-9]{1,10}", b in "[a-z0-9]{1,10}") {
        let forward = format!("\"a\":\"{a}\",\"b\":\"{b}\"");
        let reverse = format!("\"b\":\"{b}\",\"a\":\"{a}\"");
        let from_forward = get_value(&forward, "a", 15).unwrap().into_string();
        let from_reverse = get_value(&reverse, "A", 15).unwrap().into_string();
        prop_assert_eq!(&from_forward, &a);
        prop_assert_eq!(from_forward, from_reverse);
    }

    #[test]
    fn flat_arrays_yield_every_element(calls in prop::collection::vec("[A-Z0-9]{1,9}", 0..15)) {
        let elements: Vec<String> = calls.iter().map(|c| format!("{{\"call\":\"{c}\"}}")).collect();
        let text = format!("[{}]", elements.join(","));
        let found: Vec<String> = ArrayElements::new(&text, 0, 1023)
            .map(|element| get_value(&element.text, "call", 9).unwrap().into_string())
            .collect();
        prop_assert_eq!(found, calls);
    }
}
