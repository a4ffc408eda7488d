use pretty_assertions::assert_eq;
use support_core::FlowOptions;
use support_core::FormStore;
use support_core::NavigationError;
use support_core::Step;
use support_core::translate;
use support_core::validate;
use support_protocol::RecordPatch;
use support_protocol::SupportPayload;
use support_protocol::SupportRecord;
use support_test_support::sample_patch;
use support_test_support::sample_record;

/// Patches that blank exactly one required field.
fn blanking_patches() -> Vec<(&'static str, RecordPatch)> {
    let blank = || Some("   ".to_string());
    vec![
        (
            "name",
            RecordPatch {
                name: blank(),
                ..Default::default()
            },
        ),
        (
            "email",
            RecordPatch {
                email: blank(),
                ..Default::default()
            },
        ),
        (
            "deviceModel",
            RecordPatch {
                device_model: blank(),
                ..Default::default()
            },
        ),
        (
            "issueDescription",
            RecordPatch {
                issue_description: blank(),
                ..Default::default()
            },
        ),
    ]
}

fn walk_to_review(store: &mut FormStore) {
    while store.current_step() != Step::Review {
        store.advance().expect("advance");
    }
}

#[test]
fn jump_is_rejected_whenever_an_earlier_required_field_is_blank() {
    for (field, patch) in blanking_patches() {
        let mut store = FormStore::default();
        store.update(sample_patch());
        walk_to_review(&mut store);
        store.update(patch);

        let err = store.jump_to(Step::Review).expect_err(field);
        match err {
            NavigationError::Incomplete { missing, .. } => assert_eq!(missing, vec![field]),
            other => panic!("unexpected rejection for {field}: {other:?}"),
        }
        assert_eq!(store.jump_to(Step::ClientInfo), Ok(Step::ClientInfo));
        assert_eq!(store.record(), &SupportRecord::default());
    }
}

#[test]
fn progress_is_monotonic_up_to_review() {
    for consent_step in [false, true] {
        let mut store = FormStore::new(FlowOptions { consent_step });
        store.update(sample_patch());
        store.update(RecordPatch {
            privacy_agreed: Some(true),
            ..Default::default()
        });

        let mut last = store.progress();
        assert_eq!(last, 0);
        while store.advance().is_ok() {
            let now = store.progress();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(store.current_step(), Step::Review);
        assert_eq!(last, 100);
    }
}

#[test]
fn client_valid_records_always_pass_the_relay_check() {
    let record = sample_record();
    let steps = [Step::ClientInfo, Step::DeviceInfo, Step::IssueDescription];
    assert_eq!(validate::first_incomplete(&steps, &record), None);
    assert!(SupportPayload::from(&record).missing_required().is_empty());
}

#[test]
fn invalid_email_blocks_the_first_step() {
    let mut store = FormStore::default();
    store.update(sample_patch());
    store.update(RecordPatch {
        email: Some("jane@example".to_string()),
        ..Default::default()
    });
    assert!(matches!(
        store.advance(),
        Err(NavigationError::Incomplete {
            step: Step::ClientInfo,
            ..
        })
    ));
}

#[test]
fn preview_matches_relay_translation() {
    let payload = SupportPayload::from(&sample_record());
    let over_the_wire: SupportPayload =
        serde_json::from_value(serde_json::to_value(&payload).expect("encode")).expect("decode");
    assert_eq!(translate(&payload), translate(&over_the_wire));
}
