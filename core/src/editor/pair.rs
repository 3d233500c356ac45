//! Paired symbol taps: brackets and quotes entered as one linked pair.

use super::EditorResult;
use crate::context::Commit;
use crate::key::Key;
use crate::session::ImeSession;

/// Insert `left` and `right` as linked inputs around the cursor, or wrap
/// the selected input in them.
///
/// A frozen buffer hands the pair straight to the host.
pub(crate) fn on_pair_tap(session: &mut ImeSession, left: &Key, right: &Key) -> EditorResult {
    let buffer = session.buffer_mut();
    if buffer.is_frozen() {
        return EditorResult::Commit(Commit::PairSymbol {
            left: left.text.clone(),
            right: right.text.clone(),
        });
    }

    buffer.clear_completions();
    buffer.prepare_pair_inputting(left.clone(), right.clone());
    EditorResult::Handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::keys_from;

    fn quotes() -> (Key, Key) {
        (Key::symbol("“"), Key::symbol("”"))
    }

    #[test]
    fn test_pair_on_empty_buffer() {
        let mut session = ImeSession::new();
        let (left, right) = quotes();

        assert_eq!(on_pair_tap(&mut session, &left, &right), EditorResult::Handled);
        let buffer = session.buffer();
        assert_eq!(buffer.text(), "“”");
        assert!(buffer.has_only_one_pair_inputs());
        // The cursor sits between the two symbols.
        assert!(buffer.is_gap_selected());
        assert_eq!(buffer.selected_index(), 2);
    }

    #[test]
    fn test_pair_wraps_selected_input() {
        let mut session = ImeSession::new();
        let buffer = session.buffer_mut();
        buffer.char_pending_or_new().set_keys(keys_from("abc"));
        buffer.confirm_pending_and_select_next();
        let id = buffer.inputs()[1].id();
        buffer.select(id);

        let (left, right) = quotes();
        on_pair_tap(&mut session, &left, &right);
        assert_eq!(session.buffer().text(), "“abc”");
    }

    #[test]
    fn test_second_pair_replaces_first() {
        let mut session = ImeSession::new();
        let (left, right) = quotes();
        on_pair_tap(&mut session, &left, &right);

        let left_id = session.buffer().inputs()[1].id();
        session.buffer_mut().select(left_id);
        on_pair_tap(&mut session, &Key::symbol("《"), &Key::symbol("》"));
        session.buffer_mut().confirm_pending_and_select_last();
        assert_eq!(session.buffer().text(), "《》");
    }

    #[test]
    fn test_frozen_buffer_commits_pair() {
        let mut session = ImeSession::new();
        session.buffer_mut().freeze(true);
        let (left, right) = quotes();

        let result = on_pair_tap(&mut session, &left, &right);
        assert_eq!(
            result,
            EditorResult::Commit(Commit::PairSymbol {
                left: "“".into(),
                right: "”".into()
            })
        );
        assert!(session.buffer().is_empty());
    }
}
