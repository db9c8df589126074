//! Storage contract tests
//!
//! Every driver must satisfy the same observable contract. The suite is
//! instantiated once per driver, each with its own fresh media.

use serde_json::json;
use stashkv::medium::{InMemoryCookieJar, InMemoryStore};
use stashkv::{DriverKind, Runtime, Storage, Value, TTL_SUFFIX};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

fn browser_runtime() -> Runtime {
    Runtime::browser()
        .with_local_storage(Arc::new(InMemoryStore::new()))
        .with_cookie_jar(Arc::new(InMemoryCookieJar::new()))
}

macro_rules! contract_tests {
    ($module:ident, $kind:expr, $expected:expr) => {
        mod $module {
            use super::*;

            fn storage() -> Storage {
                let storage = Storage::with_driver(&browser_runtime(), $kind);
                assert_eq!(storage.driver_kind(), $expected);
                storage
            }

            #[test]
            fn test_string_roundtrip() {
                let storage = storage();
                let value = Value::from("this is test value");

                assert!(storage.set("teststorage", value.clone()));
                assert_eq!(storage.get("teststorage"), Some(value));
            }

            #[test]
            fn test_cyrillic_roundtrip() {
                let storage = storage();

                assert!(storage.set("Кириллица", "Ключ и значение"));
                assert!(storage.has("Кириллица"));
                assert!(!storage.has("ДругойКлюч"));
                assert_eq!(storage.get("Кириллица"), Some(Value::from("Ключ и значение")));
            }

            #[test]
            fn test_unicode_roundtrip() {
                let storage = storage();

                assert!(storage.set("⦁", "⦶"));
                assert!(storage.has("⦁"));
                assert!(!storage.has("⦁⦁⦁"));
                assert_eq!(storage.get("⦁"), Some(Value::from("⦶")));
            }

            #[test]
            fn test_object_and_array_roundtrip() {
                let storage = storage();
                let one = Value::from(json!([1, "one"]));
                let two = Value::from(json!({"two": 2}));
                let three = Value::from(json!([{"three": ["one", "two", {"three": 3}]}]));

                assert!(storage.set("teststorageOne", one.clone()));
                assert!(storage.set("teststorageTwo", two.clone()));
                assert!(storage.set("teststorageThree", three.clone()));

                assert_eq!(storage.get("teststorageOne"), Some(one));
                assert_eq!(storage.get("teststorageTwo"), Some(two));
                assert_eq!(storage.get("teststorageThree"), Some(three));
            }

            #[test]
            fn test_primitive_roundtrip() {
                let storage = storage();

                assert!(storage.set("testFalse", false));
                assert!(storage.set("testTrue", true));
                assert!(storage.set("testNull", Value::Null));
                assert!(storage.set("testNumber", 3.25));

                assert!(storage.has("testFalse"));
                assert!(storage.has("testNull"));
                assert_eq!(storage.get("testFalse"), Some(Value::Bool(false)));
                assert_eq!(storage.get("testTrue"), Some(Value::Bool(true)));
                assert_eq!(storage.get("testNull"), Some(Value::Null));
                assert_eq!(storage.get("testNumber"), Some(Value::Number(3.25)));
            }

            #[test]
            fn test_undefined_is_stored_but_reads_as_none() {
                let storage = storage();

                assert!(storage.set("Void", Value::Undefined));
                assert!(storage.has("Void"));
                assert_eq!(storage.get("Void"), None);
            }

            #[test]
            fn test_absent_key() {
                let storage = storage();

                assert_eq!(storage.get("non-existent-key"), None);
                assert!(!storage.has("non-existent-key"));
                assert!(!storage.remove("1234567890asdfghjk"));
            }

            #[test]
            fn test_keys_has_remove() {
                let storage = storage();
                storage.set("teststorageOne", "One");
                storage.set("teststorageTwo", "Two");

                let keys = storage.keys();
                assert!(keys.contains(&"teststorageOne".to_string()));
                assert!(keys.contains(&"teststorageTwo".to_string()));

                assert!(storage.remove("teststorageOne"));
                assert!(!storage.has("teststorageOne"));
                assert!(storage.has("teststorageTwo"));
            }

            #[test]
            fn test_empty() {
                let storage = storage();
                storage.set("teststorageOne", "One");
                storage.set_with_ttl("teststorageTwo", "Two", Duration::from_secs(60));

                assert!(storage.empty());
                assert_eq!(storage.keys(), Vec::<String>::new());
                assert_eq!(storage.physical_len(), 0);

                assert!(!storage.empty());
            }

            #[test]
            fn test_shadow_keys_never_listed() {
                let storage = storage();
                storage.set_with_ttl("a", 1, Duration::from_secs(60));
                storage.set_with_ttl("b", 2, Duration::from_secs(60));
                storage.set("c", 3);

                let mut keys = storage.keys();
                keys.sort();
                assert_eq!(keys, vec!["a", "b", "c"]);
                assert!(keys.iter().all(|k| !k.ends_with(TTL_SUFFIX)));
            }

            #[test]
            fn test_overwrite_drops_old_ttl() {
                let storage = storage();

                storage.set_with_ttl("key", "A", Duration::from_millis(200));
                storage.set("key", "B");
                assert_eq!(storage.get("key"), Some(Value::from("B")));
                assert_eq!(storage.ttl("key"), None);

                sleep(Duration::from_millis(300));
                assert_eq!(storage.get("key"), Some(Value::from("B")));
            }

            #[test]
            fn test_two_second_ttl() {
                let storage = storage();
                let value = Value::from("this is test value with 2s TTL");

                assert!(storage.set_with_ttl("teststorage", value.clone(), Duration::from_secs(2)));
                assert_eq!(storage.get("teststorage"), Some(value.clone()));

                sleep(Duration::from_secs(1));
                assert_eq!(storage.get("teststorage"), Some(value), "record exists after 1 second");

                sleep(Duration::from_millis(1500));
                assert_eq!(storage.get("teststorage"), None, "record is gone after 2.5 seconds");
                assert!(!storage.has("teststorage"));
                assert!(!storage.keys().contains(&"teststorage".to_string()));
            }
        }
    };
}

contract_tests!(persistent, DriverKind::Persistent, DriverKind::Persistent);
contract_tests!(cookie, DriverKind::Cookie, DriverKind::Cookie);
contract_tests!(memory, DriverKind::Memory, DriverKind::Memory);
contract_tests!(auto, DriverKind::Auto, DriverKind::Persistent);

#[test]
fn test_unsupported_preference_falls_back() {
    let runtime = Runtime::browser()
        .with_local_storage(Arc::new(InMemoryStore::restricted()))
        .with_cookie_jar(Arc::new(InMemoryCookieJar::new()));

    let storage = Storage::with_driver(&runtime, DriverKind::Persistent);
    assert_eq!(storage.driver_kind(), DriverKind::Cookie);

    assert!(storage.set("after-fallback", json!({"ok": true})));
    assert_eq!(storage.get("after-fallback"), Some(Value::from(json!({"ok": true}))));
    assert!(storage.remove("after-fallback"));
}

#[test]
fn test_persistent_entries_survive_a_new_facade() {
    let store = Arc::new(InMemoryStore::new());
    let runtime = Runtime::browser().with_local_storage(store.clone());

    {
        let storage = Storage::new(&runtime);
        storage.set("kept", "value");
        storage.set_with_ttl("short", "value", Duration::from_millis(20));
    }

    sleep(Duration::from_millis(50));

    // The startup sweep removes the expired entry before anyone reads it
    let storage = Storage::new(&runtime);
    assert_eq!(storage.physical_len(), 1);
    assert_eq!(storage.get("kept"), Some(Value::from("value")));
}

#[test]
fn test_cookie_shadow_hides_entry_before_native_expiry() {
    let jar = Arc::new(InMemoryCookieJar::new());
    let runtime = Runtime::browser().with_cookie_jar(jar.clone());
    let storage = Storage::new(&runtime);
    assert_eq!(storage.driver_kind(), DriverKind::Cookie);

    storage.set_with_ttl("flash", "msg", Duration::from_millis(100));
    sleep(Duration::from_millis(200));

    // The native max-age (rounded up to 1s) has not fired yet,
    // but the entry is already invisible and gets purged
    assert_eq!(jar.len(), 2);
    assert_eq!(storage.get("flash"), None);
    assert!(jar.is_empty());
}

#[test]
fn test_server_runtime_uses_memory() {
    let storage = Storage::with_driver(&Runtime::server(), DriverKind::Cookie);
    assert_eq!(storage.driver_kind(), DriverKind::Memory);
    assert!(storage.set("k", "v"));
    assert_eq!(storage.get("k"), Some(Value::from("v")));
}
