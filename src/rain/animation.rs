//! Self-rescheduling frame loop

use std::cell::RefCell;
use std::rc::Rc;

use super::renderer::RainRenderer;
use crate::platform::{FrameScheduler, Surface};

/// Renderer bound to the surface it paints
pub struct RainAnimation<S> {
    pub renderer: RainRenderer,
    pub surface: S,
}

impl<S: Surface> RainAnimation<S> {
    pub fn new(renderer: RainRenderer, surface: S) -> Self {
        Self { renderer, surface }
    }

    /// Start at the surface's current size; false under reduced motion
    pub fn start(&mut self, reduced_motion: bool) -> bool {
        let (w, h) = self.surface.size();
        self.renderer.start(reduced_motion, w, h)
    }

    /// Pick up a new surface size
    pub fn sync_size(&mut self) {
        let (w, h) = self.surface.size();
        self.renderer.resize(w, h);
    }

    pub fn frame(&mut self) {
        self.renderer.draw(&mut self.surface);
    }
}

/// Draw on the next frame and re-request after every draw, forever.
/// There is no stop: the loop ends with the page.
pub fn request_frame<S, F>(animation: Rc<RefCell<RainAnimation<S>>>, scheduler: Rc<F>)
where
    S: Surface + 'static,
    F: FrameScheduler + 'static,
{
    let next = Rc::clone(&scheduler);
    scheduler.request_frame(Box::new(move |_time| {
        animation.borrow_mut().frame();
        request_frame(animation, next);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::headless::{ManualScheduler, RecordingSurface};
    use crate::rain::RainPhase;
    use crate::settings::RainSettings;

    fn animation(w: f64, h: f64) -> Rc<RefCell<RainAnimation<RecordingSurface>>> {
        let renderer = RainRenderer::new(RainSettings::default(), 3);
        Rc::new(RefCell::new(RainAnimation::new(
            renderer,
            RecordingSurface::new(w, h),
        )))
    }

    #[test]
    fn test_loop_reschedules_every_frame() {
        let anim = animation(160.0, 160.0);
        assert!(anim.borrow_mut().start(false));

        let scheduler = Rc::new(ManualScheduler::new());
        request_frame(Rc::clone(&anim), Rc::clone(&scheduler));
        assert_eq!(scheduler.pending(), 1);

        for frame in 1..=5 {
            assert_eq!(scheduler.run_frame(frame as f64 * 16.7), 1);
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(anim.borrow().surface.texts().count(), 5 * 10);
        assert_eq!(anim.borrow().renderer.phase(), RainPhase::Drawing);
    }

    #[test]
    fn test_resize_between_frames() {
        let anim = animation(160.0, 160.0);
        anim.borrow_mut().start(false);
        let scheduler = Rc::new(ManualScheduler::new());
        request_frame(Rc::clone(&anim), Rc::clone(&scheduler));
        scheduler.run_frame(0.0);

        {
            let mut a = anim.borrow_mut();
            a.surface.set_size(480.0, 100.0);
            a.sync_size();
            a.surface.take_ops();
        }
        scheduler.run_frame(16.0);

        let a = anim.borrow();
        assert_eq!(a.renderer.columns(), 30);
        assert_eq!(a.surface.texts().count(), 30);
    }
}
