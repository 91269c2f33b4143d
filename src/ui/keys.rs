//! Scoped key subscriptions.
//!
//! A view that wants a key while it is mounted subscribes and keeps the
//! returned [`ListenerGuard`]; dropping the guard (view teardown) removes
//! the subscription. The registry belongs to the app instance, not to the
//! process, and the most recent subscriber for a key takes it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// What a subscribed key asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    NavigateBack,
}

#[derive(Debug)]
struct Slot {
    id: u64,
    code: KeyCode,
    action: KeyAction,
}

type Slots = Rc<RefCell<Vec<Slot>>>;

#[derive(Debug, Default)]
pub struct KeyListeners {
    slots: Slots,
    next_id: Cell<u64>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "the subscription ends when the guard is dropped"]
    pub fn subscribe(&self, code: KeyCode, action: KeyAction) -> ListenerGuard {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.slots.borrow_mut().push(Slot { id, code, action });
        ListenerGuard {
            id,
            slots: Rc::downgrade(&self.slots),
        }
    }

    /// Action for `key`, if a live subscription wants it. Release and repeat
    /// events are ignored so one physical press acts once.
    pub fn dispatch(&self, key: &KeyEvent) -> Option<KeyAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        self.slots
            .borrow()
            .iter()
            .rev()
            .find(|slot| slot.code == key.code)
            .map(|slot| slot.action)
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

/// Keeps one subscription alive.
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    slots: Weak<RefCell<Vec<Slot>>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(slots) = self.slots.upgrade() {
            slots.borrow_mut().retain(|slot| slot.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn subscription_lives_as_long_as_guard() {
        let keys = KeyListeners::new();
        assert_eq!(keys.dispatch(&press(KeyCode::Esc)), None);

        let guard = keys.subscribe(KeyCode::Esc, KeyAction::NavigateBack);
        assert_eq!(
            keys.dispatch(&press(KeyCode::Esc)),
            Some(KeyAction::NavigateBack)
        );
        assert_eq!(keys.dispatch(&press(KeyCode::Enter)), None);

        drop(guard);
        assert!(keys.is_empty());
        assert_eq!(keys.dispatch(&press(KeyCode::Esc)), None);
    }

    #[test]
    fn release_events_are_ignored() {
        let keys = KeyListeners::new();
        let _guard = keys.subscribe(KeyCode::Esc, KeyAction::NavigateBack);
        let mut release = press(KeyCode::Esc);
        release.kind = KeyEventKind::Release;
        assert_eq!(keys.dispatch(&release), None);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let keys = KeyListeners::new();
        let guard = keys.subscribe(KeyCode::Esc, KeyAction::NavigateBack);
        drop(keys);
        drop(guard);
    }

    #[test]
    fn dropping_one_guard_keeps_the_other() {
        let keys = KeyListeners::new();
        let a = keys.subscribe(KeyCode::Esc, KeyAction::NavigateBack);
        let b = keys.subscribe(KeyCode::Esc, KeyAction::NavigateBack);
        drop(a);
        assert_eq!(keys.len(), 1);
        drop(b);
        assert!(keys.is_empty());
    }
}
