use std::cell::RefCell;
use std::rc::Rc;

use gloo::render::{AnimationFrame, request_animation_frame};

type FrameSlot = Rc<RefCell<Option<AnimationFrame>>>;

/// Handle to a running `requestAnimationFrame` loop.
///
/// The loop keeps itself alive until its step reports completion; dropping
/// the handle does not stop it, [`FrameLoop::cancel`] does.
pub(crate) struct FrameLoop {
    slot: FrameSlot,
}

impl FrameLoop {
    pub(crate) fn cancel(&self) {
        self.slot.borrow_mut().take();
    }
}

/// Calls `step` with each frame timestamp until it returns `true`.
pub(crate) fn drive<F>(step: F) -> FrameLoop
where
    F: FnMut(f64) -> bool + 'static,
{
    let slot = FrameSlot::default();
    schedule(slot.clone(), Rc::new(RefCell::new(step)));
    FrameLoop { slot }
}

fn schedule<F>(slot: FrameSlot, step: Rc<RefCell<F>>)
where
    F: FnMut(f64) -> bool + 'static,
{
    let next_slot = slot.clone();
    let handle = request_animation_frame(move |timestamp| {
        let done = (step.borrow_mut())(timestamp);
        if done {
            next_slot.borrow_mut().take();
        } else {
            schedule(next_slot, step);
        }
    });
    *slot.borrow_mut() = Some(handle);
}
