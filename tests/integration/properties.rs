//! Property-Based Testing for the attribute tree and PATCH engine
//!
//! Generates attribute values and operation inputs with proptest and checks the
//! invariants that must hold for every input, with automatic shrinking.

use crate::common::{self, patch};
use proptest::prelude::*;
use scim_core::patch::PatchOperation;
use serde_json::{Value, json};

/// Strategy for single-valued string attributes of the User schema
fn string_attribute_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "displayName",
        "nickName",
        "title",
        "userType",
        "preferredLanguage",
        "locale",
        "timezone",
        "name.givenName",
        "name.familyName",
        "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:costCenter",
        "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.value",
    ])
}

prop_compose! {
    fn email_strategy()
        (local in "[a-z]{1,12}",
         domain in "[a-z]{1,10}\\.(com|org|net)",
         kind in prop::sample::select(vec!["work", "home", "other"]))
        -> Value {
        json!({"value": format!("{}@{}", local, domain), "type": kind})
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_deep_copy_is_independent(path in string_attribute_strategy(), text in "[A-Za-z ]{1,24}") {
        let schema = common::users();
        let original = common::sample_user().into_inner();
        let before = original.to_json();

        let mut copy = original.deep_copy();
        copy = patch(&schema, &copy, &[PatchOperation::replace(Some(path), json!(text))]).unwrap();
        copy.remove_attribute("emails");

        prop_assert_eq!(original.to_json(), before);
    }

    #[test]
    fn prop_replace_is_idempotent(path in string_attribute_strategy(), text in "[A-Za-z0-9]{1,24}") {
        let schema = common::users();
        let user = common::sample_user().into_inner();
        let operation = PatchOperation::replace(Some(path), json!(text));

        let once = patch(&schema, &user, std::slice::from_ref(&operation)).unwrap();
        let twice = patch(&schema, &once, std::slice::from_ref(&operation)).unwrap();

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_filtered_remove_never_leaves_empty_collection(
        emails in prop::collection::vec(email_strategy(), 1..6)
    ) {
        let schema = common::users();
        let user = common::decode(&schema, &json!({
            "schemas": [common::USER_SCHEMA],
            "userName": "bjensen",
            "emails": emails,
        }));

        let mut operations = Vec::new();
        for kind in ["work", "home", "other"] {
            let present = user
                .to_json()["emails"]
                .as_array()
                .is_some_and(|entries| entries.iter().any(|entry| entry["type"] == kind));
            if present {
                operations.push(PatchOperation::remove(&format!("emails[type eq \"{}\"]", kind)));
            }
        }
        let patched = patch(&schema, &user, &operations).unwrap();

        prop_assert!(!patched.contains("emails"));
        prop_assert!(patched.to_json().get("emails").is_none());
    }

    #[test]
    fn prop_path_less_add_is_idempotent(nick in "[A-Za-z]{1,16}", email in email_strategy()) {
        let schema = common::users();
        let user = common::sample_user().into_inner();
        let operation = PatchOperation::add(None, json!({"nickName": nick, "emails": [email]}));

        let once = patch(&schema, &user, std::slice::from_ref(&operation)).unwrap();
        let twice = patch(&schema, &once, std::slice::from_ref(&operation)).unwrap();

        prop_assert_eq!(once, twice);
    }
}
