//! Collection contract tests, run against both member APIs.

#[macro_use]
mod common;

use common::{main_session, two_function_session, LEAF, MAIN};
use framekit::memory::{FunctionLayout, MemberSpec, MemorySession};
use framekit::{FrameApi, FrameError, FrameKey, StackFrame, StructFrame, UdtFrame};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::json;

fn names<F: StackFrame>(frame: &F) -> Vec<String> {
    frame.iter().map(|v| v.name().to_string()).collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// COUNT AND ITERATION
// ══════════════════════════════════════════════════════════════════════════════

mod count_and_iteration {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_iteration_skips_synthetic_members(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        let visible = with_frame!(session, MAIN, api, |frame| names(&frame));
        assert_eq!(visible, vec!["var_8", "var_4", "arg_0"]);
    }

    #[rstest]
    #[case(MAIN, 3)]
    #[case(LEAF, 2)]
    fn test_len_matches_iteration(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
        #[case] address: u64,
        #[case] expected: usize,
    ) {
        let session = two_function_session();
        let (len, iterated) = with_frame!(session, address, api, |frame| (
            frame.len(),
            frame.iter().count()
        ));
        assert_eq!(len, expected);
        assert_eq!(iterated, expected);
    }

    #[rstest]
    fn test_three_members_without_return_slot(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        // a, b, " s"
        let session = two_function_session();
        let (has_slot, len) = with_frame!(session, LEAF, api, |frame| (
            frame.has_return_slot(),
            frame.len()
        ));
        assert!(!has_slot);
        assert_eq!(len, 2);
    }

    #[rstest]
    fn test_four_members_with_return_slot(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        // x, y, " s", " r"
        let session = MemorySession::new();
        session
            .add_function(
                FunctionLayout::new("f", 0x1000)
                    .locals(8)
                    .saved_registers(8)
                    .return_size(8),
            )
            .unwrap();
        session.add_member(0x1000, MemberSpec::new("x", -16, 4)).unwrap();
        session.add_member(0x1000, MemberSpec::new("y", -12, 4)).unwrap();

        let (has_slot, len) = with_frame!(session, 0x1000, api, |frame| (
            frame.has_return_slot(),
            frame.len()
        ));
        assert!(has_slot);
        assert_eq!(len, 2);
    }

    #[rstest]
    fn test_empty_frame(#[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi) {
        let session = MemorySession::new();
        session
            .add_function(FunctionLayout::new("empty", 0x3000).return_size(8))
            .unwrap();
        let (empty, len, visible) = with_frame!(session, 0x3000, api, |frame| (
            frame.is_empty(),
            frame.len(),
            names(&frame)
        ));
        assert!(empty);
        assert_eq!(len, 0);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_for_loop_over_frame_reference() {
        let session = main_session();
        let frame = UdtFrame::new(&session, session.frame_type(MAIN).unwrap()).unwrap();
        let mut offsets = Vec::new();
        for variable in &frame {
            offsets.push(variable.offset());
        }
        assert_eq!(offsets, vec![-12, -8, 4]);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// LOOKUP
// ══════════════════════════════════════════════════════════════════════════════

mod lookup {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    fn test_offset_round_trip(#[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            let base = frame.base_offset();
            assert_eq!(base, 12);
            for variable in frame.iter() {
                let found = frame.get(variable.offset()).unwrap();
                assert_eq!(found.name(), variable.name());
                assert_eq!(found.native_offset(), variable.offset() + base);
            }
        });
    }

    #[rstest]
    #[case(-12, "var_8")]
    #[case(-10, "var_8")]
    #[case(-8, "var_4")]
    #[case(4, "arg_0")]
    #[case(7, "arg_0")]
    fn test_get_by_offset_finds_covering_member(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
        #[case] offset: i64,
        #[case] expected: &str,
    ) {
        let session = main_session();
        let name = with_frame!(session, MAIN, api, |frame| frame
            .get(offset)
            .unwrap()
            .name()
            .to_string());
        assert_eq!(name, expected);
    }

    #[rstest]
    fn test_get_by_name(#[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            let var = frame.get("var_4").unwrap();
            assert_eq!(var.offset(), -8);
            assert_eq!(var.size(), 4);
            assert_eq!(var.type_name(), Some("int"));
            assert_eq!(var.comment(), Some("counter"));

            let by_string = frame.get(String::from("arg_0")).unwrap();
            assert_eq!(by_string.offset(), 4);
        });
    }

    #[rstest]
    #[case(FrameKey::Offset(-4))]
    #[case(FrameKey::Offset(0))]
    #[case(FrameKey::Name(" s".into()))]
    #[case(FrameKey::Name(" r".into()))]
    fn test_synthetic_members_not_found(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
        #[case] key: FrameKey,
    ) {
        let session = main_session();
        let err = with_frame!(session, MAIN, api, |frame| frame
            .get(&key)
            .unwrap_err()
            .to_string());
        assert_eq!(err, format!("unable to find stack variable from: {}", key));
    }

    #[rstest]
    fn test_return_marker_visible_without_return_slot(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = MemorySession::new();
        session
            .add_function(FunctionLayout::new("odd", 0x5000).locals(8))
            .unwrap();
        session.add_member(0x5000, MemberSpec::new(" r", -8, 8)).unwrap();

        let (len, visible) = with_frame!(session, 0x5000, api, |frame| (
            frame.len(),
            names(&frame)
        ));
        assert_eq!(len, 1);
        assert_eq!(visible, vec![" r"]);
    }

    #[rstest]
    fn test_not_found_reports_user_offset(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        // base offset 8, nothing at native offset 4
        let session = MemorySession::new();
        session
            .add_function(FunctionLayout::new("gap", 0x6000).locals(8))
            .unwrap();
        session.add_member(0x6000, MemberSpec::new("a", -8, 4)).unwrap();

        let err = with_frame!(session, 0x6000, api, |frame| {
            assert_eq!(frame.base_offset(), 8);
            frame.get(-4).unwrap_err()
        });
        assert!(matches!(err, FrameError::NotFound(FrameKey::Offset(-4))));
        assert_eq!(err.to_string(), "unable to find stack variable from: -4");
    }

    #[rstest]
    fn test_offset_overflow_is_not_found(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        let err = with_frame!(session, MAIN, api, |frame| frame.get(i64::MAX).unwrap_err());
        assert!(matches!(err, FrameError::NotFound(FrameKey::Offset(i64::MAX))));
    }

    #[rstest]
    fn test_unknown_name_not_found(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        let err = with_frame!(session, MAIN, api, |frame| frame.get("var_99").unwrap_err());
        assert_eq!(err.to_string(), "unable to find stack variable from: var_99");
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// KEY TYPES
// ══════════════════════════════════════════════════════════════════════════════

mod key_types {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case(json!(1.5))]
    #[case(json!({"offset": -8}))]
    #[case(json!([-8]))]
    #[case(json!(null))]
    #[case(json!(true))]
    fn test_rejected_dynamic_keys(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
        #[case] key: serde_json::Value,
    ) {
        let session = main_session();
        let (get_err, delete_err, len) = with_frame!(session, MAIN, api, |frame| (
            frame.get(&key).unwrap_err(),
            frame.delete(&key).unwrap_err(),
            frame.len()
        ));
        assert!(matches!(get_err, FrameError::InvalidKeyType(_)));
        assert!(matches!(delete_err, FrameError::InvalidKeyType(_)));
        assert_eq!(len, 3);
    }

    #[rstest]
    fn test_accepted_dynamic_keys(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            assert_eq!(frame.get(&json!(-8)).unwrap().name(), "var_4");
            assert_eq!(frame.get(&json!("arg_0")).unwrap().offset(), 4);
        });
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// DELETE
// ══════════════════════════════════════════════════════════════════════════════

mod delete {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case(FrameKey::Name("var_4".into()))]
    #[case(FrameKey::Offset(-8))]
    #[case(FrameKey::Offset(-6))]
    fn test_delete_then_lookup_not_found(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
        #[case] key: FrameKey,
    ) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            frame.delete(&key).unwrap();
            assert!(matches!(frame.get("var_4"), Err(FrameError::NotFound(_))));
            assert!(matches!(frame.get(-8), Err(FrameError::NotFound(_))));
            assert_eq!(frame.len(), 2);
            assert_eq!(names(&frame), vec!["var_8", "arg_0"]);
        });
    }

    #[rstest]
    fn test_delete_missing_leaves_frame_unchanged(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            let err = frame.delete(100).unwrap_err();
            assert!(matches!(err, FrameError::NotFound(FrameKey::Offset(100))));
            assert_eq!(frame.len(), 3);
        });
    }

    #[rstest]
    fn test_delete_synthetic_member_refused(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            assert!(matches!(frame.delete(" s"), Err(FrameError::NotFound(_))));
            assert!(matches!(frame.delete(0), Err(FrameError::NotFound(_))));
            assert_eq!(frame.native_len(), 5);
        });
    }

    #[rstest]
    fn test_delete_through_variable_view(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = main_session();
        with_frame!(session, MAIN, api, |frame| {
            let arg = frame.get("arg_0").unwrap();
            arg.delete().unwrap();
            assert_eq!(names(&frame), vec!["var_8", "var_4"]);
        });
    }

    #[test]
    fn test_deletion_visible_across_adapters() {
        let session = main_session();
        let by_struct =
            StructFrame::new(&session, session.frame_struct(MAIN).unwrap()).unwrap();
        let by_type = UdtFrame::new(&session, session.frame_type(MAIN).unwrap()).unwrap();

        by_struct.delete("var_8").unwrap();
        assert_eq!(names(&by_type), vec!["var_4", "arg_0"]);

        by_type.delete(4).unwrap();
        assert_eq!(names(&by_struct), vec!["var_4"]);
        assert_eq!(by_struct.len(), by_type.len());
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// IDENTITY
// ══════════════════════════════════════════════════════════════════════════════

mod identity {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_struct_frames_equal_by_struct_id() {
        let session = two_function_session();
        let a = StructFrame::new(&session, session.frame_struct(MAIN).unwrap()).unwrap();
        let b = StructFrame::new(&session, session.frame_struct(MAIN).unwrap()).unwrap();
        let leaf = StructFrame::new(&session, session.frame_struct(LEAF).unwrap()).unwrap();

        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_ne!(a, leaf);
    }

    #[test]
    fn test_udt_frames_equal_by_type_id() {
        let session = two_function_session();
        let a = UdtFrame::new(&session, session.frame_type(MAIN).unwrap()).unwrap();
        let b = UdtFrame::new(&session, session.frame_type(MAIN).unwrap()).unwrap();
        let leaf = UdtFrame::new(&session, session.frame_type(LEAF).unwrap()).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, leaf);
        assert_ne!(a.frame_id(), leaf.frame_id());
    }

    #[test]
    fn test_equality_survives_mutation() {
        let session = main_session();
        let a = UdtFrame::new(&session, session.frame_type(MAIN).unwrap()).unwrap();
        let b = UdtFrame::new(&session, session.frame_type(MAIN).unwrap()).unwrap();
        a.delete("var_4").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_frames_of_different_sessions_differ() {
        let first = main_session();
        let second = main_session();
        let a = StructFrame::new(&first, first.frame_struct(MAIN).unwrap()).unwrap();
        let b = StructFrame::new(&second, second.frame_struct(MAIN).unwrap()).unwrap();
        assert_eq!(a.frame_id(), b.frame_id());
        assert_ne!(a, b);

        let a = UdtFrame::new(&first, first.frame_type(MAIN).unwrap()).unwrap();
        let b = UdtFrame::new(&second, second.frame_type(MAIN).unwrap()).unwrap();
        assert_eq!(a.frame_id(), b.frame_id());
        assert_ne!(a, b);
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// RENAMED SYNTHETIC SLOTS
// ══════════════════════════════════════════════════════════════════════════════

mod renamed_slots {
    use super::*;
    use pretty_assertions::assert_eq;
    use framekit::{FrameVisitor, HiddenMembers};

    struct Counts;

    impl FrameVisitor for Counts {
        type Output = (usize, Vec<String>, bool);

        fn visit<F: StackFrame>(self, frame: &F) -> Self::Output {
            (frame.len(), names(frame), frame.get("__saved").is_err())
        }
    }

    fn renamed_session() -> MemorySession {
        let session = MemorySession::with_hidden(HiddenMembers::new("__saved", "__ret"));
        session
            .add_function(FunctionLayout::new("f", 0x1000).locals(8).return_size(8))
            .unwrap();
        session.add_member(0x1000, MemberSpec::new("a", -8, 4)).unwrap();
        session
    }

    #[rstest]
    fn test_len_matches_iteration_with_renamed_slots(
        #[values(FrameApi::Struct, FrameApi::TypeInfo)] api: FrameApi,
    ) {
        let session = renamed_session();
        let (len, visible, saved_hidden) = session.visit_frame(0x1000, api, Counts).unwrap();
        assert_eq!(len, 1);
        assert_eq!(visible, vec!["a"]);
        assert!(saved_hidden);
    }

    #[test]
    fn test_reserved_names_absent_when_renamed() {
        let session = renamed_session();
        let frame = UdtFrame::with_hidden(
            &session,
            session.frame_type(0x1000).unwrap(),
            session.hidden().clone(),
        )
        .unwrap();
        assert!(matches!(frame.get(" s"), Err(FrameError::NotFound(_))));
        assert_eq!(frame.len(), frame.iter().count());
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ══════════════════════════════════════════════════════════════════════════════

/// Build a frame with one 4-byte local in each selected slot.
fn session_with_slots(slots: &[bool], saved: u64, return_size: u64) -> MemorySession {
    let session = MemorySession::new();
    let local_size = 4 * slots.len() as u64;
    session
        .add_function(
            FunctionLayout::new("prop", 0x7000)
                .locals(local_size)
                .saved_registers(saved)
                .return_size(return_size),
        )
        .unwrap();
    let base = (local_size + saved) as i64;
    for (i, _) in slots.iter().enumerate().filter(|(_, used)| **used) {
        let offset = 4 * i as i64 - base;
        session
            .add_member(0x7000, MemberSpec::new(format!("var_{}", i), offset, 4))
            .unwrap();
    }
    session
}

proptest! {
    #[test]
    fn prop_len_equals_iteration_count(
        slots in proptest::collection::vec(any::<bool>(), 0..16),
        saved in prop_oneof![Just(0u64), Just(4), Just(8)],
        return_size in prop_oneof![Just(0u64), Just(4), Just(8)],
        deletions in proptest::collection::vec(0usize..16, 0..4),
    ) {
        let session = session_with_slots(&slots, saved, return_size);
        let expected = slots.iter().filter(|used| **used).count();

        for api in [FrameApi::Struct, FrameApi::TypeInfo] {
            let (len, iterated) = with_frame!(session, 0x7000, api, |frame| (
                frame.len(),
                frame.iter().count()
            ));
            prop_assert_eq!(len, iterated);
            prop_assert_eq!(len, expected);
        }

        let frame = UdtFrame::new(&session, session.frame_type(0x7000).unwrap()).unwrap();
        for slot in deletions {
            let _ = frame.delete(format!("var_{}", slot));
            prop_assert_eq!(frame.len(), frame.iter().count());
        }
    }
}
