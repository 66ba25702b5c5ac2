//! Property tests for the properties file format.

use proptest::prelude::*;

use kvdeploy::domain::entities::PropertiesDocument;

#[derive(Debug, Clone)]
enum LineKind {
    Enabled(String),
    Disabled(String),
    Comment(String),
    Blank(String),
}

fn value() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9,./~_-]{1,24}").unwrap()
}

fn spacing() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("="), Just(" = "), Just("= "), Just("  =  ")]
}

fn line() -> impl Strategy<Value = LineKind> {
    prop_oneof![
        4 => (spacing(), value()).prop_map(|(eq, v)| LineKind::Enabled(format!("{eq}{v}"))),
        2 => (spacing(), value()).prop_map(|(eq, v)| LineKind::Disabled(format!("{eq}{v}"))),
        1 => proptest::string::string_regex("## [a-z ]{0,20}").unwrap().prop_map(LineKind::Comment),
        1 => prop_oneof![Just(String::new()), Just("   ".to_string())].prop_map(LineKind::Blank),
    ]
}

/// Document text with unique keys; key `k{i}` sits on line `i`
fn document() -> impl Strategy<Value = String> {
    document_with("\n")
}

fn document_with(eol: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(line(), 0..24).prop_map(move |lines| {
        let mut text = String::new();
        for (i, line) in lines.into_iter().enumerate() {
            match line {
                LineKind::Enabled(rest) => text.push_str(&format!("k{i}{rest}")),
                LineKind::Disabled(rest) => text.push_str(&format!("#k{i}{rest}")),
                LineKind::Comment(c) | LineKind::Blank(c) => text.push_str(&c),
            }
            text.push_str(eol);
        }
        text
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: an untouched document renders byte-for-byte.
    #[test]
    fn property_render_reproduces_input(text in document()) {
        let doc = PropertiesDocument::parse(&text).unwrap();
        prop_assert_eq!(doc.render(), text);
    }

    /// PROPERTY: CRLF endings survive an untouched round trip.
    #[test]
    fn property_render_reproduces_crlf_input(text in document_with("\r\n")) {
        let doc = PropertiesDocument::parse(&text).unwrap();
        prop_assert_eq!(doc.render(), text);
    }

    /// PROPERTY: setting one key rewrites only that key's line.
    #[test]
    fn property_set_touches_one_line(text in document(), new_value in value()) {
        let mut doc = PropertiesDocument::parse(&text).unwrap();
        let Some(key) = doc.entries().map(|e| e.key().to_string()).next() else {
            return Ok(());
        };

        doc.set(&key, &new_value).unwrap();
        let entry = doc.entries().find(|e| e.key() == key).map(|e| e.value());
        prop_assert_eq!(entry, Some(new_value.as_str()));

        let before: Vec<&str> = text.lines().collect();
        let rendered = doc.render();
        let after: Vec<&str> = rendered.lines().collect();
        prop_assert_eq!(before.len(), after.len());
        let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        prop_assert!(changed.len() <= 1, "changed lines {:?}", changed);
    }

    /// PROPERTY: ensure leaves the key enabled with the given value.
    #[test]
    fn property_ensure_enables(text in document(), new_value in value()) {
        let mut doc = PropertiesDocument::parse(&text).unwrap();
        doc.ensure("k0", &new_value).unwrap();
        prop_assert_eq!(doc.get("k0"), Some(new_value.as_str()));

        let reparsed = PropertiesDocument::parse(&doc.render()).unwrap();
        prop_assert_eq!(reparsed.get("k0"), Some(new_value.as_str()));
    }

    /// PROPERTY: parsing never panics on arbitrary input.
    #[test]
    fn property_parse_never_panics(s in "(?s).{0,256}") {
        let _ = PropertiesDocument::parse(&s);
    }
}
