// Property tests for the form snapshot lifecycle and the rain geometry.
// Native-only: everything runs against the headless platform.

use std::collections::BTreeMap;

use proptest::prelude::*;

use matrix_form::consts::{CELL_SIZE, SNAPSHOT_KEY};
use matrix_form::form::{FormController, FormSnapshot, FormView, RuleValidator, text_length};
use matrix_form::persistence::{MemoryStorage, PersistentStore};
use matrix_form::platform::headless::HeadlessForm;
use matrix_form::rain::RainRenderer;
use matrix_form::settings::{FormSettings, RainSettings};

const FIELDS: [&str; 5] = ["nome", "email", "senha", "pais", "mensagem"];

type Controller = FormController<HeadlessForm, MemoryStorage, RuleValidator>;

fn controller(storage: MemoryStorage) -> Controller {
    FormController::new(
        HeadlessForm::recruitment(),
        PersistentStore::new(storage),
        RuleValidator::recruitment(),
        FormSettings::default(),
    )
}

fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::sample::select(FIELDS.to_vec()).prop_map(str::to_string),
        "[a-z]{1,8}",
    ]
}

proptest! {
    #[test]
    fn hydration_assigns_exactly_matching_keys(
        stored in proptest::collection::btree_map(field_name(), ".{0,20}", 0..8)
    ) {
        let storage = MemoryStorage::new();
        storage.insert_raw(SNAPSHOT_KEY, &serde_json::to_string(&stored).unwrap());
        let mut c = controller(storage);

        let restored = c.hydrate();

        let expected = stored.keys().filter(|k| FIELDS.contains(&k.as_str())).count();
        prop_assert_eq!(restored, expected);
        for name in FIELDS {
            let value = c.view().field_value(name).unwrap();
            let want = stored.get(name).cloned().unwrap_or_default();
            prop_assert_eq!(value, want);
        }
        prop_assert_eq!(c.view().snapshot().len(), FIELDS.len());

        let counter = match stored.get("mensagem") {
            Some(m) if !m.is_empty() => text_length(m).to_string(),
            _ => "0".to_string(),
        };
        prop_assert_eq!(c.view().counter(), Some(counter.as_str()));
    }

    #[test]
    fn unreadable_storage_falls_back(raw in ".*") {
        prop_assume!(serde_json::from_str::<FormSnapshot>(&raw).is_err());
        let storage = MemoryStorage::new();
        storage.insert_raw(SNAPSHOT_KEY, &raw);
        let store = PersistentStore::new(storage);
        prop_assert_eq!(store.get(SNAPSHOT_KEY, FormSnapshot::new()), FormSnapshot::new());

        let mut c = controller(MemoryStorage::new());
        c.store().backend().insert_raw(SNAPSHOT_KEY, &raw);
        prop_assert_eq!(c.hydrate(), 0);
        prop_assert!(c.view().snapshot().iter().all(|(_, v)| v.is_empty()));
    }

    #[test]
    fn saved_snapshot_tracks_every_input(
        edits in proptest::collection::vec(
            (proptest::sample::select(FIELDS.to_vec()), "\\PC{0,30}"),
            1..20,
        )
    ) {
        let mut c = controller(MemoryStorage::new());
        let mut model: BTreeMap<&str, String> = FIELDS.iter().map(|f| (*f, String::new())).collect();

        for (name, value) in edits {
            c.view_mut().set_field(name, &value);
            c.on_input(Some(name));
            model.insert(name, value);

            let saved: FormSnapshot =
                serde_json::from_str(&c.store().backend().raw(SNAPSHOT_KEY).unwrap()).unwrap();
            prop_assert_eq!(&saved, &c.view().snapshot());
            for (field, value) in &model {
                prop_assert_eq!(saved.get(field), Some(value.as_str()));
            }
        }

        let message = c.view().field_value("mensagem").unwrap();
        let counter = text_length(&message).to_string();
        prop_assert_eq!(c.view().counter(), Some(counter.as_str()));

        c.on_reset();
        c.run_deferred();
        prop_assert!(c.store().backend().raw(SNAPSHOT_KEY).is_none());
        prop_assert_eq!(c.view().counter(), Some("0"));
        prop_assert!(c.view().feedback().unwrap().is_none());
    }

    #[test]
    fn resize_reinitializes_every_column(
        start in (0.0f64..4000.0, 0.0f64..3000.0),
        next in (0.0f64..4000.0, 0.0f64..3000.0),
        seed in any::<u64>(),
    ) {
        let mut rain = RainRenderer::new(RainSettings::default(), seed);
        prop_assert!(rain.start(false, start.0, start.1));
        rain.resize(next.0, next.1);

        prop_assert_eq!(rain.columns(), (next.0 / CELL_SIZE).floor() as usize);
        let rows = next.1 / CELL_SIZE;
        for &p in rain.drops().positions() {
            prop_assert!(p >= 1.0 && p <= 1.0 + rows);
        }
    }
}
